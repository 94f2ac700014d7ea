use crate::client::DataClient;
use crate::errors::AppResult;
use crate::models::{Document, StateStats};

// Owns the single in-memory document snapshot. Every mutation is one round
// trip through the data client; the snapshot is replaced wholesale on
// success and left untouched on failure. Nothing here is process-global, so
// independent instances stay isolated.
pub struct App {
    client: DataClient,
    state: Document,
}

impl App {
    pub fn new(client: DataClient) -> Self {
        Self {
            client,
            state: Document::default(),
        }
    }

    pub fn state(&self) -> &Document {
        &self.state
    }

    pub fn client(&self) -> &DataClient {
        &self.client
    }

    pub fn load(&mut self) -> bool {
        match self.client.load_state() {
            Ok(document) => {
                self.state = document;
                true
            }
            Err(error) => {
                tracing::error!(error = %error, "failed to load state");
                false
            }
        }
    }

    pub fn add_todo(&mut self, text: &str) -> bool {
        self.apply("add_todo", |client, state| client.add_todo(state, text))
    }

    pub fn delete_todo(&mut self, id: &str) -> bool {
        self.apply("delete_todo", |client, state| client.delete_todo(state, id))
    }

    pub fn create_block(&mut self, name: &str) -> bool {
        self.apply("create_block", |client, state| client.create_block(state, name))
    }

    pub fn delete_block(&mut self, block_id: &str) -> bool {
        self.apply("delete_block", |client, state| client.delete_block(state, block_id))
    }

    pub fn add_block_task(&mut self, block_id: &str, text: &str) -> bool {
        self.apply("add_block_task", |client, state| {
            client.add_block_task(state, block_id, text)
        })
    }

    pub fn delete_block_task(&mut self, block_id: &str, task_id: &str) -> bool {
        self.apply("delete_block_task", |client, state| {
            client.delete_block_task(state, block_id, task_id)
        })
    }

    pub fn add_block_to_today(&mut self, block_id: &str) -> bool {
        self.apply("add_block_to_today", |client, state| {
            client.add_block_to_today(state, block_id)
        })
    }

    pub fn remove_today_block(&mut self, today_block_id: &str) -> bool {
        self.apply("remove_today_block", |client, state| {
            client.remove_today_block(state, today_block_id)
        })
    }

    pub fn add_today_block_task(&mut self, today_block_id: &str, text: &str) -> bool {
        self.apply("add_today_block_task", |client, state| {
            client.add_today_block_task(state, today_block_id, text)
        })
    }

    pub fn delete_today_block_task(&mut self, today_block_id: &str, task_id: &str) -> bool {
        self.apply("delete_today_block_task", |client, state| {
            client.delete_today_block_task(state, today_block_id, task_id)
        })
    }

    fn apply(
        &mut self,
        action: &str,
        op: impl FnOnce(&DataClient, &Document) -> AppResult<Document>,
    ) -> bool {
        match op(&self.client, &self.state) {
            Ok(next) => {
                self.state = next;
                true
            }
            Err(error) => {
                tracing::error!(action, error = %error, "state update failed; keeping current snapshot");
                false
            }
        }
    }

    pub fn stats(&self) -> StateStats {
        let today_task_count: usize = self
            .state
            .today_blocks
            .iter()
            .map(|instance| instance.tasks.len())
            .sum();
        let last_created_at = self
            .state
            .todos
            .iter()
            .map(|todo| todo.created_at)
            .chain(self.state.today_blocks.iter().flat_map(|instance| {
                std::iter::once(instance.created_at)
                    .chain(instance.tasks.iter().map(|task| task.created_at))
            }))
            .max();
        StateStats {
            total_items: self.state.todos.len() + today_task_count,
            today_block_count: self.state.today_blocks.len(),
            last_created_at,
        }
    }
}
