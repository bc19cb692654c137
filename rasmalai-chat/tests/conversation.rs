use async_trait::async_trait;
use rasmalai_chat::ConversationManager;
use rasmalai_core::config::ChatConfig;
use rasmalai_core::session::{
    FileHistoryStore, History, HistoryStore, MemoryHistoryStore, Sender,
};
use rasmalai_core::Error;
use rasmalai_providers::{
    GenerateResponse, GenerativeProvider, ImageAttachment, InlineImage, ProviderError,
    ProviderResult,
};
use std::collections::VecDeque;
use std::sync::Mutex;
use tempfile::TempDir;

/// Provider that replays canned results and records what it was asked.
#[derive(Default)]
struct ScriptedProvider {
    replies: Mutex<VecDeque<ProviderResult<String>>>,
    requests: Mutex<Vec<(String, Option<InlineImage>)>>,
}

impl ScriptedProvider {
    fn new(replies: Vec<ProviderResult<String>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    fn requests(&self) -> Vec<(String, Option<InlineImage>)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerativeProvider for ScriptedProvider {
    async fn generate(
        &self,
        prompt: &str,
        image: Option<InlineImage>,
    ) -> ProviderResult<GenerateResponse> {
        self.requests
            .lock()
            .unwrap()
            .push((prompt.to_string(), image));
        let next = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(format!("echo: {prompt}")));
        next.map(|text| GenerateResponse {
            text,
            finish_reason: Some("STOP".to_string()),
        })
    }

    fn model(&self) -> String {
        "scripted".to_string()
    }
}

/// Store whose writes always fail
struct FullStore;

impl HistoryStore for FullStore {
    fn load(&self) -> rasmalai_core::Result<Option<String>> {
        Ok(None)
    }

    fn save(&self, _data: &str) -> rasmalai_core::Result<()> {
        Err(Error::Storage("quota exceeded".to_string()))
    }
}

fn new_manager(store: &MemoryHistoryStore) -> ConversationManager {
    ConversationManager::new(store.clone(), ChatConfig::default())
}

#[tokio::test]
async fn test_messages_alternate_and_only_grow() {
    let store = MemoryHistoryStore::new();
    let mut manager = new_manager(&store);
    let provider = ScriptedProvider::new(vec![
        Ok("one".to_string()),
        Err(ProviderError::ApiError("boom".to_string())),
        Ok("three".to_string()),
    ]);

    let mut previous = manager.current_messages().to_vec();
    for text in ["first", "second", "third"] {
        manager.send_message(&provider, text, None).await.unwrap();
        let current = manager.current_messages();
        assert_eq!(&current[..previous.len()], previous.as_slice());
        assert_eq!(current.len(), previous.len() + 2);
        previous = current.to_vec();
    }

    let senders: Vec<Sender> = previous.iter().map(|m| m.sender).collect();
    for pair in senders.windows(2) {
        assert_ne!(pair[0], pair[1]);
    }
    assert_eq!(previous[4].text, ChatConfig::default().error_notice);
    assert!(!manager.is_awaiting_response());
}

#[tokio::test]
async fn test_hello_creates_single_front_session() {
    let store = MemoryHistoryStore::new();
    let mut manager = new_manager(&store);
    let provider = ScriptedProvider::default();

    manager.send_message(&provider, "Old chat", None).await;
    manager.start_new_chat();
    manager.send_message(&provider, "Hello", None).await;

    assert_eq!(manager.history().len(), 2);
    let front = manager.history().at(0).unwrap();
    assert_eq!(front.title, "Hello");
    assert_eq!(manager.current_title(), "Hello");
    assert_eq!(provider.requests()[1].0, "Hello");
}

#[tokio::test]
async fn test_failure_is_recorded_and_persisted() {
    let store = MemoryHistoryStore::new();
    let mut manager = new_manager(&store);
    let provider = ScriptedProvider::new(vec![Err(ProviderError::InvalidResponse(
        "empty".to_string(),
    ))]);

    let reply = manager.send_message(&provider, "Hello", None).await.unwrap();

    assert_eq!(reply.sender, Sender::Ai);
    assert_eq!(reply.text, ChatConfig::default().error_notice);
    assert!(!manager.is_awaiting_response());

    let messages = manager.current_messages();
    assert_eq!(messages[messages.len() - 2].text, "Hello");
    assert_eq!(messages.last().unwrap(), &reply);

    let on_disk = History::from_json(&store.contents().unwrap()).unwrap();
    assert_eq!(on_disk.at(0).unwrap().messages, messages);
}

#[tokio::test]
async fn test_select_session_loads_isolated_copy() {
    let store = MemoryHistoryStore::new();
    let mut manager = new_manager(&store);
    let provider = ScriptedProvider::default();

    manager.send_message(&provider, "alpha", None).await;
    let alpha_id = manager.active_session_id().unwrap().to_string();
    manager.start_new_chat();
    manager.send_message(&provider, "beta", None).await;
    let beta_id = manager.active_session_id().unwrap().to_string();

    assert!(manager.select_session(&alpha_id));
    let alpha = manager.history().get(&alpha_id).unwrap().clone();
    assert_eq!(manager.current_messages(), alpha.messages.as_slice());
    assert!(manager.current_messages().iter().all(|m| m.text != "beta"));

    // Sending in alpha leaves beta untouched.
    let beta_before = manager.history().get(&beta_id).unwrap().clone();
    manager.send_message(&provider, "more alpha", None).await;
    assert_eq!(manager.history().get(&beta_id).unwrap(), &beta_before);
    assert_eq!(
        manager.history().get(&alpha_id).unwrap().messages.len(),
        alpha.messages.len() + 2
    );
}

#[tokio::test]
async fn test_reply_after_switch_lands_in_origin_session() {
    let store = MemoryHistoryStore::new();
    let mut manager = new_manager(&store);
    let provider = ScriptedProvider::default();

    manager.send_message(&provider, "other", None).await;
    let other_id = manager.active_session_id().unwrap().to_string();
    manager.start_new_chat();

    let turn = manager.begin_send("slow question", None).unwrap();
    let origin_id = turn.session_id().to_string();
    let result = turn.dispatch(&provider).await;

    // User navigates away before the reply is applied.
    assert!(manager.select_session(&other_id));
    let view_before = manager.current_messages().to_vec();
    let reply = manager.complete_send(turn, result).unwrap();

    assert_eq!(manager.current_messages(), view_before.as_slice());
    assert_eq!(manager.active_session_id(), Some(other_id.as_str()));
    let origin = manager.history().get(&origin_id).unwrap();
    assert_eq!(origin.messages.last().unwrap(), &reply);
    assert_eq!(origin.messages[origin.messages.len() - 2].text, "slow question");
    assert!(!manager.is_awaiting_response());

    let on_disk = History::from_json(&store.contents().unwrap()).unwrap();
    assert_eq!(on_disk.get(&origin_id).unwrap().messages.last().unwrap(), &reply);
}

#[tokio::test]
async fn test_reply_for_deleted_session_is_discarded() {
    let store = MemoryHistoryStore::new();
    let mut manager = new_manager(&store);
    let provider = ScriptedProvider::default();

    let turn = manager.begin_send("doomed", None).unwrap();
    let id = turn.session_id().to_string();
    assert!(manager.delete_session(&id));
    let result = turn.dispatch(&provider).await;

    assert!(manager.complete_send(turn, result).is_none());
    assert!(manager.history().is_empty());
    assert_eq!(manager.current_messages().len(), 1);
    assert!(!manager.is_awaiting_response());
}

#[tokio::test]
async fn test_image_is_encoded_before_dispatch() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("thali.jpg");
    std::fs::write(&path, b"jpeg-bytes").unwrap();

    let store = MemoryHistoryStore::new();
    let mut manager = new_manager(&store);
    let provider = ScriptedProvider::default();

    manager
        .send_message(&provider, "What dish is this?", Some(ImageAttachment::from_path(&path)))
        .await
        .unwrap();

    let requests = provider.requests();
    let image = requests[0].1.as_ref().unwrap();
    assert_eq!(image.mime_type, "image/jpeg");
    assert_eq!(image, &InlineImage::from_bytes(b"jpeg-bytes", "image/jpeg"));

    let user = &manager.current_messages()[1];
    assert_eq!(user.image_ref.as_deref(), Some(path.display().to_string().as_str()));
}

#[tokio::test]
async fn test_unreadable_image_becomes_error_turn() {
    let store = MemoryHistoryStore::new();
    let mut manager = new_manager(&store);
    let provider = ScriptedProvider::default();

    let reply = manager
        .send_message(&provider, "look", Some(ImageAttachment::from_path("/nope/missing.png")))
        .await
        .unwrap();

    assert_eq!(reply.text, ChatConfig::default().error_notice);
    assert!(provider.requests().is_empty());
}

#[tokio::test]
async fn test_history_round_trips_through_file_store() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("history.json");
    let provider = ScriptedProvider::default();

    let mut manager = ConversationManager::new(FileHistoryStore::new(&path), ChatConfig::default());
    manager.send_message(&provider, "first chat", None).await;
    manager.start_new_chat();
    manager.send_message(&provider, "second chat", None).await;
    let expected = manager.history().clone();

    let reloaded = ConversationManager::new(FileHistoryStore::new(&path), ChatConfig::default());
    assert_eq!(reloaded.history(), &expected);
    assert!(reloaded.active_session_id().is_none());
}

#[test]
fn test_corrupt_store_loads_empty() {
    let store = MemoryHistoryStore::with_data("{\"broken\": ");
    let manager = new_manager(&store);
    assert!(manager.history().is_empty());
    assert_eq!(manager.current_messages().len(), 1);
}

#[tokio::test]
async fn test_storage_failure_keeps_memory_state() {
    let mut manager = ConversationManager::new(FullStore, ChatConfig::default());
    let provider = ScriptedProvider::default();

    let reply = manager.send_message(&provider, "still works", None).await.unwrap();

    assert_eq!(reply.text, "echo: still works");
    assert_eq!(manager.history().len(), 1);
    assert_eq!(manager.current_messages().len(), 3);
}
