//! Session data structures

use serde::{Deserialize, Serialize};

use crate::utils::new_id;

/// Who authored a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Ai,
}

/// A single chat message. Immutable once created; identity is `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub text: String,
    pub sender: Sender,
    /// Displayable reference to an attached image (path or URL)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_ref: Option<String>,
}

impl Message {
    /// Create a user message with a fresh id
    pub fn user(text: impl Into<String>, image_ref: Option<String>) -> Self {
        Self {
            id: new_id(),
            text: text.into(),
            sender: Sender::User,
            image_ref,
        }
    }

    /// Create an AI-turn message with a fresh id
    pub fn ai(text: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            text: text.into(),
            sender: Sender::Ai,
            image_ref: None,
        }
    }
}

/// One persisted conversation thread
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub title: String,
    /// Display-formatted creation date
    pub created_at: String,
    pub messages: Vec<Message>,
}

impl Session {
    /// Create a new session with a fresh id
    pub fn new(
        title: impl Into<String>,
        created_at: impl Into<String>,
        messages: Vec<Message>,
    ) -> Self {
        Self {
            id: new_id(),
            title: title.into(),
            created_at: created_at.into(),
            messages,
        }
    }
}

/// All retained sessions, most recently created first
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct History {
    sessions: Vec<Session>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a session at the front. A session whose id is already present
    /// replaces the old entry so ids stay unique.
    pub fn prepend(&mut self, session: Session) {
        self.sessions.retain(|s| s.id != session.id);
        self.sessions.insert(0, session);
    }

    pub fn get(&self, id: &str) -> Option<&Session> {
        self.sessions.iter().find(|s| s.id == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Session> {
        self.sessions.iter_mut().find(|s| s.id == id)
    }

    /// Session at a position in display order
    pub fn at(&self, index: usize) -> Option<&Session> {
        self.sessions.get(index)
    }

    /// Remove a session by id, returning it if it was present
    pub fn remove(&mut self, id: &str) -> Option<Session> {
        let pos = self.sessions.iter().position(|s| s.id == id)?;
        Some(self.sessions.remove(pos))
    }

    /// Drop later sessions that reuse an earlier session's id.
    /// Returns how many were dropped.
    pub fn dedup_ids(&mut self) -> usize {
        let before = self.sessions.len();
        let mut seen = std::collections::HashSet::new();
        self.sessions.retain(|s| seen.insert(s.id.clone()));
        before - self.sessions.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Session> {
        self.sessions.iter()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Serialize the whole history for storage
    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse a stored history
    pub fn from_json(data: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(data)?)
    }
}

impl<'a> IntoIterator for &'a History {
    type Item = &'a Session;
    type IntoIter = std::slice::Iter<'a, Session>;

    fn into_iter(self) -> Self::IntoIter {
        self.sessions.iter()
    }
}
