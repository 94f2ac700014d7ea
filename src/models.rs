use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DataMode {
    Local,
    Remote,
}

impl DataMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Remote => "remote",
        }
    }
}

// Tasks are immutable once created; they can only be deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl Task {
    pub fn new(text: &str) -> Self {
        Self::with_timestamp(text, Utc::now())
    }

    pub fn with_timestamp(text: &str, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            text: text.to_string(),
            created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub tasks: Vec<Task>,
    pub created_at: DateTime<Utc>,
}

impl Block {
    pub fn new(name: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            tasks: Vec::new(),
            created_at: Utc::now(),
        }
    }

    // Deep copy: every task gets a fresh id and the shared instantiation
    // timestamp. Template and instance never propagate edits to each other.
    pub fn materialize(&self) -> BlockInstance {
        let created_at = Utc::now();
        BlockInstance {
            id: Uuid::new_v4().to_string(),
            block_id: self.id.clone(),
            name: self.name.clone(),
            tasks: self
                .tasks
                .iter()
                .map(|task| Task::with_timestamp(&task.text, created_at))
                .collect(),
            created_at,
        }
    }
}

// `block_id` is a weak reference to the originating template; the instance
// survives on its own once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockInstance {
    pub id: String,
    pub block_id: String,
    pub name: String,
    #[serde(default)]
    pub tasks: Vec<Task>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Document {
    pub todos: Vec<Task>,
    pub blocks: Vec<Block>,
    pub today_blocks: Vec<BlockInstance>,
}

// Derived for display only, never persisted. Template blocks do not feed
// these numbers; only standalone todos and the today board do.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StateStats {
    pub total_items: usize,
    pub today_block_count: usize,
    pub last_created_at: Option<DateTime<Utc>>,
}
