use std::thread;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::adapters::{require_text, StorageAdapter};
use crate::config::RemoteConfig;
use crate::errors::{AppError, AppResult};
use crate::models::{Block, BlockInstance, Document, Task};

// Table-oriented request/response client for a PostgREST-style backend.
// Ids and timestamps are server-assigned; mutations splice the returned
// rows into a copy of the caller's document. No client-side transaction
// wraps multi-row statements.
struct RemoteClient {
    base_url: String,
    key: String,
    agent: ureq::Agent,
}

#[derive(Debug, Deserialize)]
struct TaskRow {
    id: String,
    text: String,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct BlockRow {
    id: String,
    name: String,
    created_at: DateTime<Utc>,
    #[serde(default)]
    block_tasks: Vec<TaskRow>,
}

#[derive(Debug, Deserialize)]
struct TodayBlockRow {
    id: String,
    block_id: String,
    name: String,
    created_at: DateTime<Utc>,
    #[serde(default)]
    today_block_tasks: Vec<TaskRow>,
}

impl From<TaskRow> for Task {
    fn from(row: TaskRow) -> Self {
        Self {
            id: row.id,
            text: row.text,
            created_at: row.created_at,
        }
    }
}

impl From<BlockRow> for Block {
    fn from(row: BlockRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            tasks: row.block_tasks.into_iter().map(Task::from).collect(),
            created_at: row.created_at,
        }
    }
}

impl From<TodayBlockRow> for BlockInstance {
    fn from(row: TodayBlockRow) -> Self {
        Self {
            id: row.id,
            block_id: row.block_id,
            name: row.name,
            tasks: row.today_block_tasks.into_iter().map(Task::from).collect(),
            created_at: row.created_at,
        }
    }
}

#[derive(Serialize)]
struct NewTodo<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct NewBlock<'a> {
    name: &'a str,
}

#[derive(Serialize)]
struct NewBlockTask<'a> {
    block_id: &'a str,
    text: &'a str,
}

#[derive(Serialize)]
struct NewTodayBlock<'a> {
    block_id: &'a str,
    name: &'a str,
}

#[derive(Serialize)]
struct NewTodayBlockTask<'a> {
    today_block_id: &'a str,
    text: &'a str,
}

impl RemoteClient {
    fn new(config: RemoteConfig) -> Self {
        Self {
            base_url: config.url.trim_end_matches('/').to_string(),
            key: config.key,
            agent: ureq::agent(),
        }
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{table}", self.base_url)
    }

    fn authorize(&self, request: ureq::Request) -> ureq::Request {
        request
            .set("apikey", &self.key)
            .set("Authorization", &format!("Bearer {}", self.key))
    }

    fn select<T: DeserializeOwned>(&self, table: &str, query: &[(&str, &str)]) -> AppResult<Vec<T>> {
        let mut request = self.authorize(self.agent.get(&self.table_url(table)));
        for (key, value) in query {
            request = request.query(key, value);
        }
        request
            .call()?
            .into_json()
            .map_err(|error| AppError::Remote(format!("{table} response decode failed: {error}")))
    }

    fn insert<T: DeserializeOwned, B: Serialize>(&self, table: &str, body: &B) -> AppResult<Vec<T>> {
        self.authorize(self.agent.post(&self.table_url(table)))
            .set("Prefer", "return=representation")
            .send_json(body)?
            .into_json()
            .map_err(|error| AppError::Remote(format!("{table} response decode failed: {error}")))
    }

    fn insert_one<T: DeserializeOwned, B: Serialize>(&self, table: &str, body: &B) -> AppResult<T> {
        let mut rows: Vec<T> = self.insert(table, body)?;
        if rows.is_empty() {
            return Err(AppError::Remote(format!("{table} insert returned no rows")));
        }
        Ok(rows.remove(0))
    }

    fn delete(&self, table: &str, filters: &[(&str, &str)]) -> AppResult<()> {
        let mut request = self.authorize(self.agent.delete(&self.table_url(table)));
        for (key, value) in filters {
            request = request.query(key, value);
        }
        request.call()?;
        Ok(())
    }

    fn fetch_todos(&self) -> AppResult<Vec<Task>> {
        let rows: Vec<TaskRow> = self.select(
            "todos",
            &[("select", "id,text,created_at"), ("order", "created_at.desc")],
        )?;
        Ok(rows.into_iter().map(Task::from).collect())
    }

    fn fetch_blocks(&self) -> AppResult<Vec<Block>> {
        let rows: Vec<BlockRow> = self.select(
            "blocks",
            &[
                ("select", "id,name,created_at,block_tasks(id,text,created_at)"),
                ("order", "created_at.desc"),
                ("block_tasks.order", "created_at.asc"),
            ],
        )?;
        Ok(rows.into_iter().map(Block::from).collect())
    }

    fn fetch_today_blocks(&self) -> AppResult<Vec<BlockInstance>> {
        let rows: Vec<TodayBlockRow> = self.select(
            "today_blocks",
            &[
                (
                    "select",
                    "id,block_id,name,created_at,today_block_tasks(id,text,created_at)",
                ),
                ("order", "created_at.desc"),
                ("today_block_tasks.order", "created_at.asc"),
            ],
        )?;
        Ok(rows.into_iter().map(BlockInstance::from).collect())
    }
}

// Construction never fails: with no endpoint configuration the store logs a
// warning and every operation fails with backend-unavailable at first use.
pub struct RemoteStore {
    client: Option<RemoteClient>,
}

impl RemoteStore {
    pub fn new(config: Option<RemoteConfig>) -> Self {
        if config.is_none() {
            tracing::warn!("remote backend selected without endpoint configuration; operations will fail until it is set");
        }
        Self {
            client: config.map(RemoteClient::new),
        }
    }

    fn client(&self) -> AppResult<&RemoteClient> {
        self.client.as_ref().ok_or_else(|| {
            AppError::Unavailable("remote backend is not configured (missing url or key)".to_string())
        })
    }
}

fn join_fetch<T>(result: thread::Result<AppResult<T>>) -> AppResult<T> {
    result.map_err(|_| AppError::Internal("state fetch worker panicked".to_string()))?
}

impl StorageAdapter for RemoteStore {
    fn load_state(&self) -> AppResult<Document> {
        let client = self.client()?;
        let (todos, blocks, today_blocks) = thread::scope(|scope| {
            let todos = scope.spawn(|| client.fetch_todos());
            let blocks = scope.spawn(|| client.fetch_blocks());
            let today_blocks = scope.spawn(|| client.fetch_today_blocks());
            (todos.join(), blocks.join(), today_blocks.join())
        });
        Ok(Document {
            todos: join_fetch(todos)?,
            blocks: join_fetch(blocks)?,
            today_blocks: join_fetch(today_blocks)?,
        })
    }

    fn add_todo(&self, state: &Document, text: &str) -> AppResult<Document> {
        let text = require_text("task text", text)?;
        let client = self.client()?;
        let row: TaskRow = client.insert_one("todos", &NewTodo { text: &text })?;
        let mut next = state.clone();
        next.push_todo_front(row.into());
        Ok(next)
    }

    fn delete_todo(&self, state: &Document, id: &str) -> AppResult<Document> {
        let client = self.client()?;
        let id_filter = format!("eq.{id}");
        client.delete("todos", &[("id", id_filter.as_str())])?;
        let mut next = state.clone();
        next.remove_todo(id);
        Ok(next)
    }

    fn create_block(&self, state: &Document, name: &str) -> AppResult<Document> {
        let name = require_text("block name", name)?;
        let client = self.client()?;
        let row: BlockRow = client.insert_one("blocks", &NewBlock { name: &name })?;
        let mut next = state.clone();
        next.push_block_front(row.into());
        Ok(next)
    }

    fn delete_block(&self, state: &Document, block_id: &str) -> AppResult<Document> {
        let client = self.client()?;
        let id_filter = format!("eq.{block_id}");
        client.delete("blocks", &[("id", id_filter.as_str())])?;
        let mut next = state.clone();
        next.remove_block(block_id);
        Ok(next)
    }

    fn add_block_task(&self, state: &Document, block_id: &str, text: &str) -> AppResult<Document> {
        let text = require_text("task text", text)?;
        let client = self.client()?;
        let row: TaskRow = client.insert_one(
            "block_tasks",
            &NewBlockTask {
                block_id,
                text: &text,
            },
        )?;
        let mut next = state.clone();
        next.push_block_task(block_id, row.into());
        Ok(next)
    }

    fn delete_block_task(&self, state: &Document, block_id: &str, task_id: &str) -> AppResult<Document> {
        let client = self.client()?;
        let id_filter = format!("eq.{task_id}");
        let parent_filter = format!("eq.{block_id}");
        client.delete(
            "block_tasks",
            &[("id", id_filter.as_str()), ("block_id", parent_filter.as_str())],
        )?;
        let mut next = state.clone();
        next.remove_block_task(block_id, task_id);
        Ok(next)
    }

    fn add_block_to_today(&self, state: &Document, block_id: &str) -> AppResult<Document> {
        let Some(template) = state.find_block(block_id) else {
            return Ok(state.clone());
        };
        let client = self.client()?;
        let instance_row: TodayBlockRow = client.insert_one(
            "today_blocks",
            &NewTodayBlock {
                block_id: &template.id,
                name: &template.name,
            },
        )?;

        let task_rows: Vec<TaskRow> = if template.tasks.is_empty() {
            Vec::new()
        } else {
            let copies: Vec<NewTodayBlockTask<'_>> = template
                .tasks
                .iter()
                .map(|task| NewTodayBlockTask {
                    today_block_id: &instance_row.id,
                    text: &task.text,
                })
                .collect();
            match client.insert("today_block_tasks", &copies) {
                Ok(rows) => rows,
                Err(error) => {
                    // All-or-nothing: a failed task copy removes the instance
                    // row it just created.
                    let id_filter = format!("eq.{}", instance_row.id);
                    if let Err(cleanup) = client.delete("today_blocks", &[("id", id_filter.as_str())]) {
                        tracing::warn!(
                            today_block_id = %instance_row.id,
                            error = %cleanup,
                            "failed to remove instance after task copy failure"
                        );
                    }
                    return Err(error);
                }
            }
        };

        let mut instance = BlockInstance::from(instance_row);
        instance.tasks = task_rows.into_iter().map(Task::from).collect();
        let mut next = state.clone();
        next.push_today_front(instance);
        Ok(next)
    }

    fn remove_today_block(&self, state: &Document, today_block_id: &str) -> AppResult<Document> {
        let client = self.client()?;
        let id_filter = format!("eq.{today_block_id}");
        client.delete("today_blocks", &[("id", id_filter.as_str())])?;
        let mut next = state.clone();
        next.remove_today_block(today_block_id);
        Ok(next)
    }

    fn add_today_block_task(&self, state: &Document, today_block_id: &str, text: &str) -> AppResult<Document> {
        let text = require_text("task text", text)?;
        let client = self.client()?;
        let row: TaskRow = client.insert_one(
            "today_block_tasks",
            &NewTodayBlockTask {
                today_block_id,
                text: &text,
            },
        )?;
        let mut next = state.clone();
        next.push_today_task(today_block_id, row.into());
        Ok(next)
    }

    fn delete_today_block_task(
        &self,
        state: &Document,
        today_block_id: &str,
        task_id: &str,
    ) -> AppResult<Document> {
        let client = self.client()?;
        let id_filter = format!("eq.{task_id}");
        let parent_filter = format!("eq.{today_block_id}");
        client.delete(
            "today_block_tasks",
            &[
                ("id", id_filter.as_str()),
                ("today_block_id", parent_filter.as_str()),
            ],
        )?;
        let mut next = state.clone();
        next.remove_today_task(today_block_id, task_id);
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{BlockRow, RemoteStore, TodayBlockRow};
    use crate::adapters::StorageAdapter;
    use crate::errors::AppError;
    use crate::models::{Block, BlockInstance, Document};

    #[test]
    fn unconfigured_store_fails_at_first_use() {
        let store = RemoteStore::new(None);
        let state = Document::default();
        assert!(matches!(store.load_state(), Err(AppError::Unavailable(_))));
        assert!(matches!(store.add_todo(&state, "x"), Err(AppError::Unavailable(_))));
    }

    #[test]
    fn materializing_unknown_block_is_a_noop_before_any_request() {
        let store = RemoteStore::new(None);
        let state = Document::default();
        let next = store.add_block_to_today(&state, "missing").expect("no-op");
        assert_eq!(next, state);
    }

    #[test]
    fn block_rows_map_with_nested_tasks() {
        let row: BlockRow = serde_json::from_value(json!({
            "id": "b1",
            "name": "Morning",
            "created_at": "2024-03-01T08:00:00Z",
            "block_tasks": [
                { "id": "t1", "text": "Stretch", "created_at": "2024-03-01T08:01:00Z" }
            ]
        }))
        .expect("decode block row");
        let block = Block::from(row);
        assert_eq!(block.id, "b1");
        assert_eq!(block.tasks.len(), 1);
        assert_eq!(block.tasks[0].text, "Stretch");
    }

    #[test]
    fn today_block_rows_default_missing_tasks() {
        let row: TodayBlockRow = serde_json::from_value(json!({
            "id": "tb1",
            "block_id": "b1",
            "name": "Morning",
            "created_at": "2024-03-01T08:00:00Z"
        }))
        .expect("decode today block row");
        let instance = BlockInstance::from(row);
        assert_eq!(instance.block_id, "b1");
        assert!(instance.tasks.is_empty());
    }
}
