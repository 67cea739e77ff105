use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use uuid::Uuid;

use chrono::Local;
use claudechat_types::{ConversationMeta, Message};

/// Errors from the conversation store. `NotFound` and `CorruptRecord` are
/// deliberately separate variants: a missing record falls back to "start
/// new", a corrupt one is reported as such.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no stored conversation with id '{0}'")]
    NotFound(String),
    #[error("stored record for conversation '{id}' is corrupt: {reason}")]
    CorruptRecord { id: String, reason: String },
    #[error("storage error: {0}")]
    Io(#[from] io::Error),
}

/// Source of fresh conversation identifiers. Injected so tests can swap in
/// a deterministic sequence.
pub trait IdSource: Send {
    fn next_id(&mut self) -> String;
}

/// Default id source: a v4 UUID truncated to 8 characters, short enough to
/// type while keeping collisions negligible. Collisions are theoretically
/// possible and not actively checked.
pub struct RandomIds;

impl IdSource for RandomIds {
    fn next_id(&mut self) -> String {
        Uuid::new_v4().to_string()[..8].to_string()
    }
}

/// On-disk snapshot of one conversation. Rewritten in full on every save.
#[derive(Debug, Serialize, Deserialize)]
pub struct ConversationRecord {
    pub conversation_id: String,
    pub created_at: String,
    pub last_updated: String,
    pub message_count: usize,
    pub messages: Vec<Message>,
}

/// One row of `list_all` output: everything the resume menu needs without
/// loading the full message log into the caller's hands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationSummary {
    pub id: String,
    pub created_at: String,
    pub last_updated: String,
    pub message_count: usize,
}

/// Durable mapping from conversation id to its message log and metadata.
pub struct ConversationStore {
    dir: PathBuf,
    ids: Box<dyn IdSource>,
}

impl ConversationStore {
    /// Open a store rooted at `dir`, creating the directory if needed.
    pub fn new<P: AsRef<Path>>(dir: P) -> Result<Self, StoreError> {
        Self::with_id_source(dir, Box::new(RandomIds))
    }

    /// Open a store with an explicit id source.
    pub fn with_id_source<P: AsRef<Path>>(
        dir: P,
        ids: Box<dyn IdSource>,
    ) -> Result<Self, StoreError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir, ids })
    }

    /// Produce a fresh conversation id.
    pub fn generate_id(&mut self) -> String {
        self.ids.next_id()
    }

    fn record_path(&self, id: &str) -> PathBuf {
        self.dir.join(format!("conversation_{}.json", id))
    }

    /// Whether a record for `id` currently exists on disk.
    pub fn exists(&self, id: &str) -> bool {
        self.record_path(id).exists()
    }

    /// Persist the full conversation snapshot, refreshing `last_updated`
    /// first. The snapshot is written to a temp file and renamed into place
    /// so a crash mid-write never leaves a truncated record behind.
    pub fn save(
        &self,
        meta: &mut ConversationMeta,
        messages: &[Message],
    ) -> Result<PathBuf, StoreError> {
        meta.last_updated = Local::now().to_rfc3339();

        let record = ConversationRecord {
            conversation_id: meta.id.clone(),
            created_at: meta.created_at.clone(),
            last_updated: meta.last_updated.clone(),
            message_count: messages.len(),
            messages: messages.to_vec(),
        };

        let json = serde_json::to_string_pretty(&record).map_err(|e| StoreError::Io(e.into()))?;

        let path = self.record_path(&meta.id);
        let tmp_path = self.dir.join(format!("conversation_{}.json.tmp", meta.id));
        fs::write(&tmp_path, json)?;
        fs::rename(&tmp_path, &path)?;

        Ok(path)
    }

    /// Load the full record for `id`. A missing file is `NotFound`; a file
    /// that exists but does not parse as a well-formed record is
    /// `CorruptRecord`.
    pub fn load(&self, id: &str) -> Result<(Vec<Message>, ConversationMeta), StoreError> {
        let path = self.record_path(id);
        let json = match fs::read_to_string(&path) {
            Ok(json) => json,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound(id.to_string()));
            }
            Err(e) => return Err(StoreError::Io(e)),
        };

        let record = Self::parse_record(id, &json)?;

        let meta = ConversationMeta {
            id: record.conversation_id,
            created_at: record.created_at,
            last_updated: record.last_updated,
        };
        Ok((record.messages, meta))
    }

    fn parse_record(id: &str, json: &str) -> Result<ConversationRecord, StoreError> {
        let record: ConversationRecord =
            serde_json::from_str(json).map_err(|e| StoreError::CorruptRecord {
                id: id.to_string(),
                reason: e.to_string(),
            })?;

        if record.message_count != record.messages.len() {
            return Err(StoreError::CorruptRecord {
                id: id.to_string(),
                reason: format!(
                    "message_count {} does not match {} stored messages",
                    record.message_count,
                    record.messages.len()
                ),
            });
        }

        Ok(record)
    }

    /// Enumerate every stored conversation. Records that cannot be read or
    /// parsed are skipped so one corrupt file never blocks the listing.
    /// Entries come back in filename order, which keeps enumeration
    /// deterministic across platforms.
    pub fn list_all(&self) -> Result<Vec<ConversationSummary>, StoreError> {
        let mut paths = Vec::new();
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::Io(e)),
        };

        for entry in entries {
            let entry = entry?;
            let path = entry.path();
            let name = match path.file_name().and_then(|n| n.to_str()) {
                Some(name) => name.to_string(),
                None => continue,
            };
            if name.starts_with("conversation_") && name.ends_with(".json") {
                paths.push(path);
            }
        }
        paths.sort();

        let mut summaries = Vec::new();
        for path in paths {
            let Ok(json) = fs::read_to_string(&path) else {
                continue;
            };
            let Ok(record) = Self::parse_record("", &json) else {
                continue;
            };
            summaries.push(ConversationSummary {
                id: record.conversation_id,
                created_at: record.created_at,
                last_updated: record.last_updated,
                message_count: record.message_count,
            });
        }

        Ok(summaries)
    }
}
