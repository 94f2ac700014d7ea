use crate::adapters::{LocalStore, RemoteStore, StorageAdapter};
use crate::config::Settings;
use crate::errors::AppResult;
use crate::models::{DataMode, Document};

// Holds exactly one storage adapter, chosen at construction time; every
// operation passes through unchanged.
pub struct DataClient {
    mode: DataMode,
    adapter: Box<dyn StorageAdapter>,
}

impl DataClient {
    pub fn new(mode: DataMode, adapter: Box<dyn StorageAdapter>) -> Self {
        Self { mode, adapter }
    }

    pub fn from_settings(settings: &Settings) -> AppResult<Self> {
        match settings.data_mode {
            DataMode::Local => {
                let store = LocalStore::new(&settings.local_store_path())?;
                Ok(Self::new(DataMode::Local, Box::new(store)))
            }
            DataMode::Remote => Ok(Self::new(
                DataMode::Remote,
                Box::new(RemoteStore::new(settings.remote.clone())),
            )),
        }
    }

    pub fn mode(&self) -> DataMode {
        self.mode
    }

    pub fn load_state(&self) -> AppResult<Document> {
        self.adapter.load_state()
    }

    pub fn add_todo(&self, state: &Document, text: &str) -> AppResult<Document> {
        self.adapter.add_todo(state, text)
    }

    pub fn delete_todo(&self, state: &Document, id: &str) -> AppResult<Document> {
        self.adapter.delete_todo(state, id)
    }

    pub fn create_block(&self, state: &Document, name: &str) -> AppResult<Document> {
        self.adapter.create_block(state, name)
    }

    pub fn delete_block(&self, state: &Document, block_id: &str) -> AppResult<Document> {
        self.adapter.delete_block(state, block_id)
    }

    pub fn add_block_task(&self, state: &Document, block_id: &str, text: &str) -> AppResult<Document> {
        self.adapter.add_block_task(state, block_id, text)
    }

    pub fn delete_block_task(&self, state: &Document, block_id: &str, task_id: &str) -> AppResult<Document> {
        self.adapter.delete_block_task(state, block_id, task_id)
    }

    pub fn add_block_to_today(&self, state: &Document, block_id: &str) -> AppResult<Document> {
        self.adapter.add_block_to_today(state, block_id)
    }

    pub fn remove_today_block(&self, state: &Document, today_block_id: &str) -> AppResult<Document> {
        self.adapter.remove_today_block(state, today_block_id)
    }

    pub fn add_today_block_task(&self, state: &Document, today_block_id: &str, text: &str) -> AppResult<Document> {
        self.adapter.add_today_block_task(state, today_block_id, text)
    }

    pub fn delete_today_block_task(
        &self,
        state: &Document,
        today_block_id: &str,
        task_id: &str,
    ) -> AppResult<Document> {
        self.adapter.delete_today_block_task(state, today_block_id, task_id)
    }
}
