use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use codespher_chat::services::assistant::{ChatAssistant, analyze_and_create_request};
use codespher_chat::services::completion::{
    ChatMessage, ChatRole, CompletionClient, CompletionError, OpenAiClient,
};
use codespher_chat::services::dialogue::{DialogueDraft, DraftStep};
use codespher_chat::services::extractor::ProjectKind;
use codespher_chat::storage::{
    KeyValueStore, MemoryStore, history::ConversationHistory, settings::Settings,
};
use mockito::Matcher;
use serde_json::json;

const PATH: &str = "/v1/chat/completions";
const SESSION: &str = "visitor-1";

fn reply_body(content: &str) -> String {
    json!({
        "id": "chatcmpl-1",
        "choices": [{ "index": 0, "message": { "role": "assistant", "content": content } }]
    })
    .to_string()
}

fn assistant(server_url: &str, api_key: Option<&str>) -> (ChatAssistant, ConversationHistory) {
    let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
    let settings = Settings::new(store.clone());
    if let Some(key) = api_key {
        settings.set_api_key(key);
    }
    let history = ConversationHistory::new(store.clone(), SESSION);
    let client = OpenAiClient::new(format!("{server_url}{PATH}"), "gpt-3.5-turbo");
    let assistant =
        ChatAssistant::new(Some(Arc::new(client)), settings, store).with_simulated_delay(false);
    (assistant, history)
}

#[tokio::test]
async fn test_client_sends_bearer_and_model() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", PATH)
        .match_header("authorization", "Bearer sk-test")
        .match_body(Matcher::PartialJson(json!({
            "model": "gpt-3.5-turbo",
            "max_tokens": 1000,
            "messages": [{ "role": "user", "content": "مرحبا" }]
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(reply_body("أهلاً"))
        .create_async()
        .await;

    let client = OpenAiClient::new(format!("{}{PATH}", server.url()), "gpt-3.5-turbo");
    let text = client
        .complete("sk-test", &[ChatMessage::new(ChatRole::User, "مرحبا")])
        .await
        .unwrap();

    assert_eq!(text, "أهلاً");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_client_maps_errors() {
    let mut server = mockito::Server::new_async().await;
    let _unauthorized = server
        .mock("POST", PATH)
        .with_status(401)
        .with_body("bad key")
        .create_async()
        .await;

    let client = OpenAiClient::new(format!("{}{PATH}", server.url()), "gpt-3.5-turbo");
    let err = client.complete("sk-bad", &[]).await.unwrap_err();
    assert!(matches!(err, CompletionError::Api { status: 401, .. }));
}

#[tokio::test]
async fn test_client_rejects_empty_choices() {
    let mut server = mockito::Server::new_async().await;
    let _empty = server
        .mock("POST", PATH)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"choices": []}"#)
        .create_async()
        .await;

    let client = OpenAiClient::new(format!("{}{PATH}", server.url()), "gpt-3.5-turbo");
    let err = client.complete("sk-test", &[]).await.unwrap_err();
    assert!(matches!(err, CompletionError::EmptyResponse));
}

#[tokio::test]
async fn test_remote_reply_is_used_and_recorded() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", PATH)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(reply_body("كيف يمكنني مساعدتك؟"))
        .create_async()
        .await;

    let (assistant, history) = assistant(&server.url(), Some("sk-test"));
    let turn = assistant.respond(SESSION, None, "مرحبا").await;

    assert_eq!(turn.reply, "كيف يمكنني مساعدتك؟");
    assert!(turn.request.is_none());
    assert_eq!(history.all().len(), 2);
    mock.assert_async().await;
}

/// Remembers every message list it was asked to complete.
#[derive(Default)]
struct RecordingClient {
    calls: Mutex<Vec<Vec<ChatMessage>>>,
}

#[async_trait]
impl CompletionClient for RecordingClient {
    async fn complete(
        &self,
        _api_key: &str,
        messages: &[ChatMessage],
    ) -> Result<String, CompletionError> {
        self.calls.lock().unwrap().push(messages.to_vec());
        Ok("تمام".to_string())
    }
}

#[tokio::test]
async fn test_context_only_carries_own_session() {
    let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
    let settings = Settings::new(store.clone());
    settings.set_api_key("sk-test");
    let client = Arc::new(RecordingClient::default());
    let assistant = ChatAssistant::new(Some(client.clone()), settings, store)
        .with_simulated_delay(false);

    assistant.respond("visitor-a", None, "اسمي أحمد، هاتف 07701234567").await;
    assistant.respond("visitor-b", None, "مرحبا").await;

    let calls = client.calls.lock().unwrap();
    assert_eq!(calls.len(), 2);
    // system prompt + the new message, nothing from visitor-a
    assert_eq!(calls[1].len(), 2);
    assert!(calls[1].iter().all(|m| !m.content.contains("أحمد")));

    assert_eq!(assistant.history("visitor-a").all().len(), 2);
    assert_eq!(assistant.history("visitor-b").all().len(), 2);
}

#[tokio::test]
async fn test_server_error_falls_back_to_local_reply() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", PATH)
        .with_status(500)
        .with_body("boom")
        .expect(1)
        .create_async()
        .await;

    let (assistant, history) = assistant(&server.url(), Some("sk-test"));
    let turn = assistant.respond(SESSION, None, "مرحبا").await;

    assert!(turn.reply.contains("شكراً لرسالتك"));
    assert_eq!(history.all().len(), 2);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_no_api_key_stays_local() {
    let mut server = mockito::Server::new_async().await;
    let mock = server.mock("POST", PATH).expect(0).create_async().await;

    let (assistant, _) = assistant(&server.url(), None);
    let turn = assistant.respond(SESSION, None, "مرحبا").await;

    assert!(turn.reply.contains("شكراً لرسالتك"));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_open_draft_skips_remote_service() {
    let mut server = mockito::Server::new_async().await;
    let mock = server.mock("POST", PATH).expect(0).create_async().await;

    let (assistant, _) = assistant(&server.url(), Some("sk-test"));
    let draft = DialogueDraft::start(ProjectKind::Website, "أريد موقع");
    let turn = assistant.respond(SESSION, Some(draft), "موقع حجز مواعيد").await;

    assert_eq!(turn.draft.unwrap().step, DraftStep::Customer);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_remote_reply_still_starts_guided_flow() {
    let mut server = mockito::Server::new_async().await;
    let _ok = server
        .mock("POST", PATH)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(reply_body("بالتأكيد!"))
        .create_async()
        .await;

    let (assistant, _) = assistant(&server.url(), Some("sk-test"));
    let turn = assistant.respond(SESSION, None, "أريد تطبيق موبايل لمطعمي").await;

    let draft = turn.draft.expect("guided flow should start");
    assert_eq!(draft.project, ProjectKind::MobileApp);
    assert!(turn.options_widget.is_some());
    assert!(turn.reply.contains("تطبيق موبايل"));
}

#[test]
fn test_analyze_and_create_request() {
    assert!(analyze_and_create_request("قصير").is_none());

    let request = analyze_and_create_request("أريد استشارة بخصوص فكرة جديدة لدي").unwrap();
    assert_eq!(request.kind, "طلب عام");
    assert_eq!(request.service, "General Service");
    assert_eq!(request.estimated_price, "يحدد لاحقاً");

    let request = analyze_and_create_request("نحتاج نظام مخزون بميزانية 900 دولار").unwrap();
    assert_eq!(request.kind, "نظام إدارة");
    assert_eq!(request.estimated_price, "900 دولار");
    assert_eq!(request.estimated_time, "3-6 أسابيع");
}
