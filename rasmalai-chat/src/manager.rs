//! Conversation manager: owns chat history and the active view

use rasmalai_core::config::ChatConfig;
use rasmalai_core::session::{History, HistoryStore, Message, Session};
use rasmalai_core::utils::{display_date, truncate_chars};
use rasmalai_providers::{GenerativeProvider, ImageAttachment, ProviderResult};
use tracing::{debug, error, info, warn};

use crate::turn::PendingTurn;

/// Title shown while no session is active
pub const NEW_CHAT_TITLE: &str = "New Chat";

/// Single state container for every chat session.
///
/// All mutation goes through the methods below, and every change to the
/// history is written back to the store before the method returns.
pub struct ConversationManager {
    history: History,
    active_session_id: Option<String>,
    current_messages: Vec<Message>,
    awaiting_response: bool,
    store: Box<dyn HistoryStore>,
    settings: ChatConfig,
}

impl ConversationManager {
    /// Create a manager, loading any stored history. Starts in the new-chat state.
    pub fn new(store: impl HistoryStore + 'static, settings: ChatConfig) -> Self {
        let history = Self::load_history(&store);
        info!("Loaded {} chat session(s)", history.len());

        let mut manager = Self {
            history,
            active_session_id: None,
            current_messages: Vec::new(),
            awaiting_response: false,
            store: Box::new(store),
            settings,
        };
        manager.start_new_chat();
        manager
    }

    /// Read the stored history. Missing or unreadable data yields an empty history.
    pub fn load_history(store: &dyn HistoryStore) -> History {
        let data = match store.load() {
            Ok(Some(data)) => data,
            Ok(None) => return History::new(),
            Err(e) => {
                warn!("Failed to read chat history, starting empty: {}", e);
                return History::new();
            }
        };

        match History::from_json(&data) {
            Ok(mut history) => {
                let dropped = history.dedup_ids();
                if dropped > 0 {
                    warn!("Dropped {} session(s) with duplicate ids", dropped);
                }
                history
            }
            Err(e) => {
                warn!("Stored chat history is malformed, starting empty: {}", e);
                History::new()
            }
        }
    }

    /// Write the full history to the store. Failures are logged and ignored;
    /// the in-memory state stays authoritative.
    pub fn persist_history(&self) {
        let data = match self.history.to_json() {
            Ok(data) => data,
            Err(e) => {
                warn!("Failed to serialize chat history: {}", e);
                return;
            }
        };
        if let Err(e) = self.store.save(&data) {
            warn!("Failed to persist chat history: {}", e);
        }
    }

    /// Leave the active session and show a fresh greeting
    pub fn start_new_chat(&mut self) {
        self.active_session_id = None;
        self.current_messages = vec![Message::ai(self.settings.greeting.clone())];
    }

    /// Make `id` the active session. Unknown ids are a no-op and return false.
    pub fn select_session(&mut self, id: &str) -> bool {
        let Some(session) = self.history.get(id) else {
            warn!("Ignoring selection of unknown session {}", id);
            return false;
        };

        self.current_messages = session.messages.clone();
        self.active_session_id = Some(session.id.clone());
        true
    }

    /// Delete a session. Deleting the active session returns to a new chat.
    /// Returns whether a session was removed.
    pub fn delete_session(&mut self, id: &str) -> bool {
        let removed = self.history.remove(id).is_some();
        if self.active_session_id.as_deref() == Some(id) {
            self.start_new_chat();
        }
        if removed {
            info!("Deleted session {}", id);
        }
        self.persist_history();
        removed
    }

    /// Record a user turn and hand back the request to dispatch.
    ///
    /// Returns `None` without touching any state when there is nothing to
    /// send or a reply is still outstanding.
    pub fn begin_send(&mut self, text: &str, image: Option<ImageAttachment>) -> Option<PendingTurn> {
        if self.awaiting_response {
            debug!("Ignoring send while a reply is outstanding");
            return None;
        }
        let trimmed = text.trim();
        if trimmed.is_empty() && image.is_none() {
            return None;
        }

        let user_message = Message::user(text, image.as_ref().map(|i| i.preview.clone()));
        self.current_messages.push(user_message);

        let session_id = match self.active_session_id.clone() {
            Some(id) => {
                self.sync_active_session();
                id
            }
            None => {
                let title = if trimmed.is_empty() {
                    self.settings.image_title.clone()
                } else {
                    truncate_chars(text, self.settings.title_max_chars)
                };
                let session = Session::new(
                    title,
                    display_date(&self.settings.date_format),
                    self.current_messages.clone(),
                );
                let id = session.id.clone();
                info!("Created session {} \"{}\"", id, session.title);
                self.history.prepend(session);
                self.active_session_id = Some(id.clone());
                id
            }
        };

        self.persist_history();
        self.awaiting_response = true;

        Some(PendingTurn {
            session_id,
            prompt: text.to_string(),
            image,
        })
    }

    /// Record the outcome of a dispatched turn.
    ///
    /// Failures become an AI-turn message carrying the configured error
    /// notice. The reply is appended to the turn's own session; it is only
    /// mirrored into the current view if that session is still active.
    /// Returns the appended message, or `None` if the session was deleted.
    pub fn complete_send(
        &mut self,
        turn: PendingTurn,
        result: ProviderResult<String>,
    ) -> Option<Message> {
        self.awaiting_response = false;

        let reply = match result {
            Ok(text) => Message::ai(text),
            Err(e) => {
                error!("Request for session {} failed: {}", turn.session_id, e);
                Message::ai(self.settings.error_notice.clone())
            }
        };

        if self.active_session_id.as_deref() == Some(turn.session_id.as_str()) {
            self.current_messages.push(reply.clone());
            self.sync_active_session();
        } else if let Some(session) = self.history.get_mut(&turn.session_id) {
            debug!("Reply for inactive session {}", turn.session_id);
            session.messages.push(reply.clone());
        } else {
            debug!("Discarding reply for deleted session {}", turn.session_id);
            return None;
        }

        self.persist_history();
        Some(reply)
    }

    /// Send a message and wait for the reply.
    ///
    /// Returns the AI-turn message, or `None` if the send was ignored.
    pub async fn send_message(
        &mut self,
        provider: &dyn GenerativeProvider,
        text: &str,
        image: Option<ImageAttachment>,
    ) -> Option<Message> {
        let turn = self.begin_send(text, image)?;
        let result = turn.dispatch(provider).await;
        self.complete_send(turn, result)
    }

    fn sync_active_session(&mut self) {
        let Some(id) = self.active_session_id.as_deref() else {
            return;
        };
        if let Some(session) = self.history.get_mut(id) {
            session.messages = self.current_messages.clone();
        }
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn active_session_id(&self) -> Option<&str> {
        self.active_session_id.as_deref()
    }

    pub fn active_session(&self) -> Option<&Session> {
        self.active_session_id
            .as_deref()
            .and_then(|id| self.history.get(id))
    }

    pub fn current_messages(&self) -> &[Message] {
        &self.current_messages
    }

    pub fn is_awaiting_response(&self) -> bool {
        self.awaiting_response
    }

    /// Heading for the current view
    pub fn current_title(&self) -> &str {
        if self.active_session_id.is_none() {
            return NEW_CHAT_TITLE;
        }
        self.active_session().map_or("Chat", |s| s.title.as_str())
    }
}
