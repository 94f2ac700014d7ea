use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::models::{Block, BlockInstance, Document, Task};

// Repairs arbitrary JSON into a well-formed Document. Total and idempotent:
// null and scalars yield an empty document, a bare array is the legacy shape
// and becomes `todos`, objects keep whichever of the three collections
// decode. The legacy migration is one-way upward; stores always re-serialize
// the full three-field shape.
pub fn normalize(raw: Value) -> Document {
    match raw {
        Value::Array(items) => Document {
            todos: decode_items(&items),
            ..Document::default()
        },
        Value::Object(fields) => Document {
            todos: fields.get("todos").map(|value| decode_field(value)).unwrap_or_default(),
            blocks: fields.get("blocks").map(|value| decode_field(value)).unwrap_or_default(),
            today_blocks: fields
                .get("todayBlocks")
                .map(|value| decode_field(value))
                .unwrap_or_default(),
        },
        _ => Document::default(),
    }
}

fn decode_field<T: DeserializeOwned>(value: &Value) -> Vec<T> {
    match value {
        Value::Array(items) => decode_items(items),
        _ => Vec::new(),
    }
}

fn decode_items<T: DeserializeOwned>(items: &[Value]) -> Vec<T> {
    items
        .iter()
        .filter_map(|item| serde_json::from_value(item.clone()).ok())
        .collect()
}

impl Document {
    pub fn find_block(&self, block_id: &str) -> Option<&Block> {
        self.blocks.iter().find(|block| block.id == block_id)
    }

    pub fn push_todo_front(&mut self, task: Task) {
        self.todos.insert(0, task);
    }

    pub fn remove_todo(&mut self, id: &str) {
        self.todos.retain(|task| task.id != id);
    }

    pub fn push_block_front(&mut self, block: Block) {
        self.blocks.insert(0, block);
    }

    // Cascades to every instance materialized from the template.
    pub fn remove_block(&mut self, block_id: &str) {
        self.blocks.retain(|block| block.id != block_id);
        self.today_blocks.retain(|instance| instance.block_id != block_id);
    }

    pub fn push_block_task(&mut self, block_id: &str, task: Task) {
        if let Some(block) = self.blocks.iter_mut().find(|block| block.id == block_id) {
            block.tasks.push(task);
        }
    }

    pub fn remove_block_task(&mut self, block_id: &str, task_id: &str) {
        if let Some(block) = self.blocks.iter_mut().find(|block| block.id == block_id) {
            block.tasks.retain(|task| task.id != task_id);
        }
    }

    pub fn push_today_front(&mut self, instance: BlockInstance) {
        self.today_blocks.insert(0, instance);
    }

    // Never touches the originating template.
    pub fn remove_today_block(&mut self, today_block_id: &str) {
        self.today_blocks.retain(|instance| instance.id != today_block_id);
    }

    pub fn push_today_task(&mut self, today_block_id: &str, task: Task) {
        if let Some(instance) = self
            .today_blocks
            .iter_mut()
            .find(|instance| instance.id == today_block_id)
        {
            instance.tasks.push(task);
        }
    }

    pub fn remove_today_task(&mut self, today_block_id: &str, task_id: &str) {
        if let Some(instance) = self
            .today_blocks
            .iter_mut()
            .find(|instance| instance.id == today_block_id)
        {
            instance.tasks.retain(|task| task.id != task_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use super::normalize;
    use crate::models::{Block, Document, Task};

    fn task_json(id: &str, text: &str) -> Value {
        json!({ "id": id, "text": text, "createdAt": "2024-01-01T00:00:00Z" })
    }

    #[test]
    fn null_and_scalars_become_empty() {
        assert_eq!(normalize(Value::Null), Document::default());
        assert_eq!(normalize(json!(42)), Document::default());
        assert_eq!(normalize(json!("todos")), Document::default());
    }

    #[test]
    fn empty_object_and_empty_array_become_empty() {
        assert_eq!(normalize(json!({})), Document::default());
        assert_eq!(normalize(json!([])), Document::default());
    }

    #[test]
    fn legacy_array_is_read_as_todos() {
        let doc = normalize(json!([task_json("a", "old task")]));
        assert_eq!(doc.todos.len(), 1);
        assert_eq!(doc.todos[0].text, "old task");
        assert!(doc.blocks.is_empty());
        assert!(doc.today_blocks.is_empty());
    }

    #[test]
    fn non_array_fields_are_replaced_with_empty() {
        let doc = normalize(json!({ "todos": "not-an-array", "blocks": 7 }));
        assert_eq!(doc, Document::default());
    }

    #[test]
    fn undecodable_elements_are_skipped() {
        let doc = normalize(json!({ "todos": [task_json("a", "keep"), { "bogus": true }, null] }));
        assert_eq!(doc.todos.len(), 1);
        assert_eq!(doc.todos[0].id, "a");
    }

    #[test]
    fn unknown_fields_are_dropped() {
        let doc = normalize(json!({ "todos": [task_json("a", "x")], "settings": { "theme": "dark" } }));
        assert_eq!(doc.todos.len(), 1);
        assert_eq!(serde_json::to_value(&doc).unwrap().as_object().unwrap().len(), 3);
    }

    #[test]
    fn block_without_tasks_gets_empty_list() {
        let doc = normalize(json!({
            "blocks": [{ "id": "b", "name": "Morning", "createdAt": "2024-01-01T00:00:00Z" }]
        }));
        assert_eq!(doc.blocks.len(), 1);
        assert!(doc.blocks[0].tasks.is_empty());
    }

    #[test]
    fn normalize_is_idempotent() {
        let inputs = vec![
            Value::Null,
            json!([]),
            json!([task_json("a", "x")]),
            json!({}),
            json!({ "todos": "not-an-array" }),
            json!({
                "todos": [task_json("a", "x")],
                "blocks": [{ "id": "b", "name": "B", "tasks": [task_json("t", "y")], "createdAt": "2024-01-01T00:00:00Z" }],
                "todayBlocks": []
            }),
        ];
        for input in inputs {
            let once = normalize(input);
            let twice = normalize(serde_json::to_value(&once).unwrap());
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn remove_block_cascades_to_instances() {
        let mut doc = Document::default();
        let mut morning = Block::new("Morning");
        morning.tasks.push(Task::new("Stretch"));
        let other = Block::new("Evening");
        doc.push_today_front(morning.materialize());
        doc.push_today_front(other.materialize());
        let morning_id = morning.id.clone();
        doc.push_block_front(morning);
        let other_id = other.id.clone();
        doc.push_block_front(other);

        doc.remove_block(&morning_id);

        assert_eq!(doc.blocks.len(), 1);
        assert_eq!(doc.blocks[0].id, other_id);
        assert_eq!(doc.today_blocks.len(), 1);
        assert_eq!(doc.today_blocks[0].block_id, other_id);
    }

    #[test]
    fn remove_today_block_keeps_template() {
        let mut doc = Document::default();
        let mut block = Block::new("Morning");
        block.tasks.push(Task::new("Stretch"));
        let instance = block.materialize();
        let instance_id = instance.id.clone();
        let block_id = block.id.clone();
        doc.push_block_front(block);
        doc.push_today_front(instance);

        doc.remove_today_block(&instance_id);

        assert!(doc.today_blocks.is_empty());
        let template = doc.find_block(&block_id).expect("template survives");
        assert_eq!(template.tasks.len(), 1);
    }

    #[test]
    fn removals_of_unknown_ids_are_noops() {
        let mut doc = Document::default();
        doc.push_todo_front(Task::new("keep"));
        doc.push_block_front(Block::new("Morning"));
        let before = doc.clone();

        doc.remove_todo("missing");
        doc.remove_block("missing");
        doc.remove_block_task("missing", "missing");
        doc.remove_today_block("missing");
        doc.remove_today_task("missing", "missing");

        assert_eq!(doc, before);
    }

    #[test]
    fn task_pushes_to_unknown_parents_are_noops() {
        let mut doc = Document::default();
        doc.push_block_task("missing", Task::new("lost"));
        doc.push_today_task("missing", Task::new("lost"));
        assert_eq!(doc, Document::default());
    }
}
