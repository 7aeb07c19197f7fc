use crate::model::{fresh_id, Tag, TagId};
use crate::storage::{PersistenceBridge, TAGS_KEY};

/// Ordered list of tags, persisted as a unit under its own key on every
/// successful mutation. Tag deletion never cascades into tasks; dangling
/// `tag_ids` are the consumer's problem to skip.
pub struct TagRegistry {
    tags: Vec<Tag>,
    bridge: PersistenceBridge,
}

impl TagRegistry {
    pub fn load(bridge: PersistenceBridge) -> Self {
        let tags = bridge.load(TAGS_KEY).unwrap_or_default();
        TagRegistry { tags, bridge }
    }

    pub fn list(&self) -> &[Tag] {
        &self.tags
    }

    pub fn lookup(&self, id: &str) -> Option<&Tag> {
        self.tags.iter().find(|tag| tag.id == id)
    }

    /// Rejects empty and whitespace-only names; stores the trimmed name.
    pub fn create(&mut self, name: &str) -> Option<TagId> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        let id = fresh_id("tag");
        self.tags.push(Tag {
            id: id.clone(),
            name: name.to_string(),
        });
        self.persist();
        Some(id)
    }

    pub fn rename(&mut self, id: &str, name: &str) {
        let Some(index) = self.tags.iter().position(|tag| tag.id == id) else {
            return;
        };
        self.tags[index].name = name.to_string();
        self.persist();
    }

    pub fn remove(&mut self, id: &str) {
        let Some(index) = self.tags.iter().position(|tag| tag.id == id) else {
            return;
        };
        self.tags.remove(index);
        self.persist();
    }

    fn persist(&self) {
        self.bridge.save(TAGS_KEY, &self.tags);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use std::sync::Arc;

    fn registry() -> (TagRegistry, PersistenceBridge) {
        let bridge = PersistenceBridge::new(Arc::new(MemoryStore::new()));
        (TagRegistry::load(bridge.clone()), bridge)
    }

    #[test]
    fn create_yields_one_tag_with_fresh_id() {
        let (mut tags, _bridge) = registry();
        let id = tags.create("urgent").expect("tag created");
        assert_eq!(tags.list().len(), 1);
        assert_eq!(tags.lookup(&id).map(|t| t.name.as_str()), Some("urgent"));
    }

    #[test]
    fn create_rejects_blank_names() {
        let (mut tags, _bridge) = registry();
        assert!(tags.create("  ").is_none());
        assert!(tags.create("").is_none());
        assert!(tags.list().is_empty());
    }

    #[test]
    fn create_trims_surrounding_whitespace() {
        let (mut tags, _bridge) = registry();
        let id = tags.create("  later  ").expect("tag created");
        assert_eq!(tags.lookup(&id).map(|t| t.name.as_str()), Some("later"));
    }

    #[test]
    fn rename_missing_id_is_a_noop() {
        let (mut tags, _bridge) = registry();
        tags.create("urgent");
        tags.rename("tag-missing", "whatever");
        assert_eq!(tags.list().len(), 1);
        assert_eq!(tags.list()[0].name, "urgent");
    }

    #[test]
    fn remove_missing_id_is_a_noop() {
        let (mut tags, _bridge) = registry();
        tags.create("urgent");
        tags.remove("tag-missing");
        assert_eq!(tags.list().len(), 1);
    }

    #[test]
    fn mutations_persist_the_full_registry() {
        let (mut tags, bridge) = registry();
        let id = tags.create("urgent").expect("tag created");
        tags.rename(&id, "now");
        bridge.flush();
        let stored: Vec<Tag> = bridge.load(TAGS_KEY).expect("registry persisted");
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].name, "now");
    }

    #[test]
    fn registry_reloads_in_insertion_order() {
        let (mut tags, bridge) = registry();
        tags.create("urgent");
        tags.create("later");
        bridge.flush();
        let reloaded = TagRegistry::load(bridge);
        let names: Vec<&str> = reloaded.list().iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, ["urgent", "later"]);
    }
}
