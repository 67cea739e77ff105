use std::time::Duration;

use thiserror::Error;

use claudechat_api::{CompletionClient, RequestConfig};
use claudechat_store::{ConversationStore, StoreError};
use claudechat_types::{ConversationMeta, Message, Role};

/// How many messages of context to replay when resuming a conversation.
const RESUME_CONTEXT_MESSAGES: usize = 4;

/// Preview length (in characters) for replayed context lines.
const RESUME_PREVIEW_CHARS: usize = 150;

/// What the operator typed at the prompt, resolved to a session action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    Exit,
    Clear,
    History,
    Empty,
    Turn(String),
}

impl SessionCommand {
    pub fn parse(input: &str) -> Self {
        let trimmed = input.trim();
        match trimmed.to_lowercase().as_str() {
            "exit" | "quit" => SessionCommand::Exit,
            "clear" => SessionCommand::Clear,
            "history" => SessionCommand::History,
            "" => SessionCommand::Empty,
            _ => SessionCommand::Turn(trimmed.to_string()),
        }
    }
}

/// Why a turn did not complete. Completion failures are recoverable (the
/// loop continues after rollback); storage failures are not.
#[derive(Debug, Error)]
pub enum TurnError {
    #[error("completion failed: {0}")]
    Completion(anyhow::Error),
    #[error("completion timed out after {0}s")]
    Timeout(u64),
    #[error(transparent)]
    Storage(#[from] StoreError),
}

/// One live conversation: the in-memory message log, its metadata, and the
/// collaborators needed to run exchanges and persist them.
pub struct ChatSession<C: CompletionClient> {
    meta: ConversationMeta,
    messages: Vec<Message>,
    store: ConversationStore,
    client: C,
    config: RequestConfig,
}

impl<C: CompletionClient> ChatSession<C> {
    pub fn new(
        store: ConversationStore,
        client: C,
        config: RequestConfig,
        meta: ConversationMeta,
        messages: Vec<Message>,
    ) -> Self {
        Self {
            meta,
            messages,
            store,
            client,
            config,
        }
    }

    pub fn id(&self) -> &str {
        &self.meta.id
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    /// Run one exchange: append the user message, call the completion
    /// client with the entire log, and on success append the assistant
    /// reply and persist the full snapshot. On any failure the user
    /// message is rolled back so the log is exactly as it was before the
    /// turn began, and nothing is written to disk.
    pub async fn process_turn(&mut self, user_input: &str) -> Result<String, TurnError> {
        self.messages.push(Message::user(user_input));

        let call = self.client.complete(&self.messages, &self.config);
        let outcome =
            tokio::time::timeout(Duration::from_secs(self.config.timeout_secs), call).await;

        let assistant_text = match outcome {
            Ok(Ok(text)) => text,
            Ok(Err(e)) => {
                self.roll_back_pending_user();
                return Err(TurnError::Completion(e));
            }
            Err(_) => {
                self.roll_back_pending_user();
                return Err(TurnError::Timeout(self.config.timeout_secs));
            }
        };

        self.messages.push(Message::assistant(assistant_text.clone()));

        // The only path that persists. A save failure propagates as fatal;
        // the prior on-disk snapshot stays intact either way.
        self.store.save(&mut self.meta, &self.messages)?;

        Ok(assistant_text)
    }

    /// Remove the unanswered user message appended by a failed turn.
    /// Only ever drops the single most recent entry, and only if it is a
    /// user message.
    fn roll_back_pending_user(&mut self) {
        if self.messages.last().map(|m| m.role) == Some(Role::User) {
            self.messages.pop();
        }
    }

    /// Discard the in-memory history. Session-local: the persisted record
    /// is not touched and will still be there on the next resume.
    pub fn clear_history(&mut self) {
        self.messages.clear();
    }

    /// Numbered rendering of the full in-memory log, for the `history`
    /// command. Presentation only; does not mutate or persist.
    pub fn history_lines(&self) -> Vec<String> {
        self.messages
            .iter()
            .enumerate()
            .map(|(i, msg)| format!("{}. {}: {}", i + 1, msg.role.display_name(), msg.content))
            .collect()
    }

    /// The tail of the log, truncated for display, shown when resuming an
    /// existing conversation.
    pub fn resume_context_lines(&self) -> Vec<String> {
        let start = self.messages.len().saturating_sub(RESUME_CONTEXT_MESSAGES);
        self.messages[start..]
            .iter()
            .map(|msg| {
                format!(
                    "{}: {}",
                    msg.role.display_name(),
                    truncate_chars(&msg.content, RESUME_PREVIEW_CHARS)
                )
            })
            .collect()
    }
}

/// Char-boundary-safe truncation with an ellipsis marker.
fn truncate_chars(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_chars).collect();
        format!("{}...", truncated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use tempfile::TempDir;

    use anyhow::Result;
    use claudechat_store::Catalog;

    /// Completion client that replays a scripted sequence of outcomes.
    struct ScriptedClient {
        script: Mutex<VecDeque<Result<String, String>>>,
    }

    impl ScriptedClient {
        fn new(script: Vec<Result<String, String>>) -> Self {
            Self {
                script: Mutex::new(script.into_iter().collect()),
            }
        }
    }

    #[async_trait]
    impl CompletionClient for ScriptedClient {
        async fn complete(&self, _messages: &[Message], _config: &RequestConfig) -> Result<String> {
            let next = self
                .script
                .lock()
                .unwrap()
                .pop_front()
                .expect("script exhausted");
            next.map_err(|e| anyhow::anyhow!(e))
        }
    }

    /// Client whose call never returns, for exercising the timeout path.
    struct HangingClient;

    #[async_trait]
    impl CompletionClient for HangingClient {
        async fn complete(&self, _messages: &[Message], _config: &RequestConfig) -> Result<String> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(String::new())
        }
    }

    fn test_config() -> RequestConfig {
        RequestConfig {
            timeout_secs: 5,
            ..RequestConfig::default()
        }
    }

    fn new_session<C: CompletionClient>(
        dir: &TempDir,
        client: C,
        messages: Vec<Message>,
    ) -> ChatSession<C> {
        let store = ConversationStore::new(dir.path()).unwrap();
        let meta = ConversationMeta::new("a1b2c3d4");
        ChatSession::new(store, client, test_config(), meta, messages)
    }

    fn load_record(dir: &TempDir, id: &str) -> (Vec<Message>, ConversationMeta) {
        ConversationStore::new(dir.path()).unwrap().load(id).unwrap()
    }

    #[tokio::test]
    async fn test_successful_turn_appends_pair_and_persists() {
        let dir = TempDir::new().unwrap();
        let client = ScriptedClient::new(vec![Ok("Hello!".to_string())]);
        let mut session = new_session(&dir, client, Vec::new());

        let reply = session.process_turn("Hi").await.unwrap();
        assert_eq!(reply, "Hello!");

        assert_eq!(session.message_count(), 2);
        assert_eq!(session.messages()[0].role, Role::User);
        assert_eq!(session.messages()[0].content, "Hi");

        let (persisted, _) = load_record(&dir, "a1b2c3d4");
        assert_eq!(persisted.len(), 2);
        assert_eq!(persisted[1].content, "Hello!");
    }

    #[tokio::test]
    async fn test_failed_turn_rolls_back_and_does_not_persist() {
        let dir = TempDir::new().unwrap();
        let client = ScriptedClient::new(vec![
            Ok("Hello!".to_string()),
            Err("rate limited".to_string()),
        ]);
        let mut session = new_session(&dir, client, Vec::new());

        session.process_turn("Hi").await.unwrap();
        let (_, meta_before) = load_record(&dir, "a1b2c3d4");

        let err = session.process_turn("2+2?").await.unwrap_err();
        assert!(matches!(err, TurnError::Completion(_)));

        // Log is exactly as it was before the failed turn began.
        assert_eq!(session.message_count(), 2);
        assert_eq!(session.messages()[0].content, "Hi");
        assert_eq!(session.messages()[1].content, "Hello!");

        // No record rewrite occurred.
        let (persisted, meta_after) = load_record(&dir, "a1b2c3d4");
        assert_eq!(persisted.len(), 2);
        assert_eq!(meta_after.last_updated, meta_before.last_updated);
    }

    #[tokio::test]
    async fn test_failed_first_turn_leaves_nothing_on_disk() {
        let dir = TempDir::new().unwrap();
        let client = ScriptedClient::new(vec![Err("connection refused".to_string())]);
        let mut session = new_session(&dir, client, Vec::new());

        assert!(session.process_turn("Hi").await.is_err());
        assert_eq!(session.message_count(), 0);

        let store = ConversationStore::new(dir.path()).unwrap();
        assert!(matches!(
            store.load("a1b2c3d4"),
            Err(StoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_timeout_rolls_back_like_any_other_failure() {
        let dir = TempDir::new().unwrap();
        let store = ConversationStore::new(dir.path()).unwrap();
        let meta = ConversationMeta::new("a1b2c3d4");
        let config = RequestConfig {
            timeout_secs: 0,
            ..RequestConfig::default()
        };
        let mut session = ChatSession::new(store, HangingClient, config, meta, Vec::new());

        let err = session.process_turn("Hi").await.unwrap_err();
        assert!(matches!(err, TurnError::Timeout(_)));
        assert_eq!(session.message_count(), 0);
    }

    #[tokio::test]
    async fn test_persisted_record_never_ends_with_user() {
        let dir = TempDir::new().unwrap();
        let client = ScriptedClient::new(vec![
            Ok("Hello!".to_string()),
            Err("boom".to_string()),
            Ok("2+2 equals 4.".to_string()),
        ]);
        let mut session = new_session(&dir, client, Vec::new());

        let _ = session.process_turn("Hi").await;
        let _ = session.process_turn("are you there?").await;
        let _ = session.process_turn("2+2?").await;

        let (persisted, _) = load_record(&dir, "a1b2c3d4");
        assert_eq!(persisted.len(), 4);
        assert_eq!(persisted.last().unwrap().role, Role::Assistant);
    }

    #[tokio::test]
    async fn test_clear_is_session_local() {
        let dir = TempDir::new().unwrap();
        let client = ScriptedClient::new(vec![Ok("Hello!".to_string())]);
        let mut session = new_session(&dir, client, Vec::new());

        session.process_turn("Hi").await.unwrap();
        session.clear_history();
        assert_eq!(session.message_count(), 0);

        // The persisted record is untouched.
        let (persisted, _) = load_record(&dir, "a1b2c3d4");
        assert_eq!(persisted.len(), 2);
    }

    #[tokio::test]
    async fn test_each_turn_updates_catalog_recency() {
        let dir = TempDir::new().unwrap();
        let client = ScriptedClient::new(vec![Ok("Hello!".to_string())]);
        let mut session = new_session(&dir, client, Vec::new());
        session.process_turn("Hi").await.unwrap();

        let store = ConversationStore::new(dir.path()).unwrap();
        let (summaries, total) = Catalog::new(&store).summaries(5).unwrap();
        assert_eq!(total, 1);
        assert_eq!(summaries[0].id, "a1b2c3d4");
        assert_eq!(summaries[0].message_count, 2);
    }

    #[test]
    fn test_command_parsing() {
        assert_eq!(SessionCommand::parse("exit"), SessionCommand::Exit);
        assert_eq!(SessionCommand::parse("QUIT"), SessionCommand::Exit);
        assert_eq!(SessionCommand::parse("clear"), SessionCommand::Clear);
        assert_eq!(SessionCommand::parse("history"), SessionCommand::History);
        assert_eq!(SessionCommand::parse("   "), SessionCommand::Empty);
        assert_eq!(
            SessionCommand::parse("  hello there  "),
            SessionCommand::Turn("hello there".to_string())
        );
    }

    #[test]
    fn test_history_lines_are_numbered() {
        let dir = TempDir::new().unwrap();
        let client = ScriptedClient::new(vec![]);
        let session = new_session(
            &dir,
            client,
            vec![Message::user("Hi"), Message::assistant("Hello!")],
        );

        let lines = session.history_lines();
        assert_eq!(lines, vec!["1. You: Hi", "2. Claude: Hello!"]);
    }

    #[test]
    fn test_resume_context_shows_last_four_truncated() {
        let dir = TempDir::new().unwrap();
        let client = ScriptedClient::new(vec![]);
        let long = "x".repeat(200);
        let session = new_session(
            &dir,
            client,
            vec![
                Message::user("one"),
                Message::assistant("two"),
                Message::user("three"),
                Message::assistant("four"),
                Message::user(long.clone()),
            ],
        );

        let lines = session.resume_context_lines();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("Claude: two"));
        assert!(lines[3].ends_with("..."));
        assert!(lines[3].len() < long.len());
    }

    #[test]
    fn test_truncate_chars_is_boundary_safe() {
        assert_eq!(truncate_chars("héllo", 10), "héllo");
        assert_eq!(truncate_chars("héllo wörld", 4), "héll...");
    }
}
