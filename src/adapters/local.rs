use std::fs;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::{params, Connection, OptionalExtension};

use crate::adapters::{require_text, StorageAdapter};
use crate::errors::{AppError, AppResult};
use crate::models::{Block, Document, Task};
use crate::state::normalize;

const SCHEMA_SQL: &str = include_str!("schema.sql");

// Fixed key the serialized document lives under. The pre-v2 value was a
// bare array of todos; normalize migrates it upward on read.
pub const STORAGE_KEY: &str = "goalstreak.data.v2";

// Durable single-key store backed by a SQLite file on the device. Every
// mutation is read-modify-write of the one row under the connection mutex.
// Two processes over the same file race with last-write-wins per whole
// operation; nothing here mitigates that.
#[derive(Debug)]
pub struct LocalStore {
    conn: Mutex<Connection>,
}

impl LocalStore {
    pub fn new(path: &Path) -> AppResult<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|err| AppError::Io(err.to_string()))?;
        }
        let conn = Connection::open(path)?;
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> AppResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| AppError::Internal("local store mutex poisoned".to_string()))
    }

    fn read_document(conn: &Connection) -> AppResult<Document> {
        let raw: Option<String> = conn
            .query_row(
                "SELECT value FROM app_state WHERE key = ?1",
                [STORAGE_KEY],
                |row| row.get(0),
            )
            .optional()?;
        let Some(raw) = raw else {
            return Ok(Document::default());
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Ok(normalize(value)),
            Err(error) => {
                tracing::warn!(error = %error, "stored document is not valid JSON; starting from empty");
                Ok(Document::default())
            }
        }
    }

    fn write_document(conn: &Connection, document: &Document) -> AppResult<()> {
        let value = serde_json::to_string(document)?;
        conn.execute(
            "INSERT OR REPLACE INTO app_state (key, value) VALUES (?1, ?2)",
            params![STORAGE_KEY, value],
        )?;
        Ok(())
    }

    fn mutate(&self, apply: impl FnOnce(&mut Document)) -> AppResult<Document> {
        let conn = self.lock()?;
        let mut document = Self::read_document(&conn)?;
        apply(&mut document);
        Self::write_document(&conn, &document)?;
        Ok(document)
    }
}

impl StorageAdapter for LocalStore {
    fn load_state(&self) -> AppResult<Document> {
        let conn = self.lock()?;
        Self::read_document(&conn)
    }

    fn add_todo(&self, _state: &Document, text: &str) -> AppResult<Document> {
        let text = require_text("task text", text)?;
        self.mutate(|document| document.push_todo_front(Task::new(&text)))
    }

    fn delete_todo(&self, _state: &Document, id: &str) -> AppResult<Document> {
        self.mutate(|document| document.remove_todo(id))
    }

    fn create_block(&self, _state: &Document, name: &str) -> AppResult<Document> {
        let name = require_text("block name", name)?;
        self.mutate(|document| document.push_block_front(Block::new(&name)))
    }

    fn delete_block(&self, _state: &Document, block_id: &str) -> AppResult<Document> {
        self.mutate(|document| document.remove_block(block_id))
    }

    fn add_block_task(&self, _state: &Document, block_id: &str, text: &str) -> AppResult<Document> {
        let text = require_text("task text", text)?;
        self.mutate(|document| document.push_block_task(block_id, Task::new(&text)))
    }

    fn delete_block_task(&self, _state: &Document, block_id: &str, task_id: &str) -> AppResult<Document> {
        self.mutate(|document| document.remove_block_task(block_id, task_id))
    }

    fn add_block_to_today(&self, _state: &Document, block_id: &str) -> AppResult<Document> {
        self.mutate(|document| {
            if let Some(instance) = document.find_block(block_id).map(Block::materialize) {
                document.push_today_front(instance);
            }
        })
    }

    fn remove_today_block(&self, _state: &Document, today_block_id: &str) -> AppResult<Document> {
        self.mutate(|document| document.remove_today_block(today_block_id))
    }

    fn add_today_block_task(&self, _state: &Document, today_block_id: &str, text: &str) -> AppResult<Document> {
        let text = require_text("task text", text)?;
        self.mutate(|document| document.push_today_task(today_block_id, Task::new(&text)))
    }

    fn delete_today_block_task(
        &self,
        _state: &Document,
        today_block_id: &str,
        task_id: &str,
    ) -> AppResult<Document> {
        self.mutate(|document| document.remove_today_task(today_block_id, task_id))
    }
}
