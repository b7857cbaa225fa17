//! In-memory storage implementation.

use super::{BoxFuture, Storage, StorageError, StorageResult};
use crate::workspace::Workspace;
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory storage for testing and ephemeral use.
#[derive(Default)]
pub struct MemoryStorage {
    workspaces: RwLock<HashMap<String, Workspace>>,
}

impl MemoryStorage {
    /// Create a new empty memory storage.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn save(&self, id: &str, workspace: &Workspace) -> BoxFuture<'_, StorageResult<()>> {
        let id = id.to_string();
        let workspace = workspace.clone();
        Box::pin(async move {
            let mut map = self
                .workspaces
                .write()
                .map_err(|e| StorageError::Other(format!("Lock error: {}", e)))?;
            map.insert(id, workspace);
            Ok(())
        })
    }

    fn load(&self, id: &str) -> BoxFuture<'_, StorageResult<Workspace>> {
        let id = id.to_string();
        Box::pin(async move {
            let map = self
                .workspaces
                .read()
                .map_err(|e| StorageError::Other(format!("Lock error: {}", e)))?;
            map.get(&id).cloned().ok_or(StorageError::NotFound(id))
        })
    }

    fn delete(&self, id: &str) -> BoxFuture<'_, StorageResult<()>> {
        let id = id.to_string();
        Box::pin(async move {
            let mut map = self
                .workspaces
                .write()
                .map_err(|e| StorageError::Other(format!("Lock error: {}", e)))?;
            map.remove(&id);
            Ok(())
        })
    }

    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>> {
        Box::pin(async move {
            let map = self
                .workspaces
                .read()
                .map_err(|e| StorageError::Other(format!("Lock error: {}", e)))?;
            Ok(map.keys().cloned().collect())
        })
    }

    fn exists(&self, id: &str) -> BoxFuture<'_, StorageResult<bool>> {
        let id = id.to_string();
        Box::pin(async move {
            let map = self
                .workspaces
                .read()
                .map_err(|e| StorageError::Other(format!("Lock error: {}", e)))?;
            Ok(map.contains_key(&id))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::ShapeKind;
    use crate::storage::tests_support::block_on;

    #[test]
    fn test_save_and_load() {
        let storage = MemoryStorage::new();
        let ws = Workspace::new("Board", 42);

        block_on(storage.save("test", &ws)).unwrap();
        let loaded = block_on(storage.load("test")).unwrap();

        assert_eq!(ws.id, loaded.id);
        assert_eq!(loaded.name, "Board");
        assert_eq!(loaded.created_at, 42);
    }

    #[test]
    fn test_not_found() {
        let storage = MemoryStorage::new();
        let result = block_on(storage.load("nonexistent"));
        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[test]
    fn test_exists_and_delete() {
        let storage = MemoryStorage::new();
        let ws = Workspace::new("Board", 0);

        assert!(!block_on(storage.exists("test")).unwrap());
        block_on(storage.save("test", &ws)).unwrap();
        assert!(block_on(storage.exists("test")).unwrap());

        block_on(storage.delete("test")).unwrap();
        assert!(!block_on(storage.exists("test")).unwrap());
    }

    #[test]
    fn test_list() {
        let storage = MemoryStorage::new();
        let ws = Workspace::new("Board", 0);

        block_on(storage.save("ws1", &ws)).unwrap();
        block_on(storage.save("ws2", &ws)).unwrap();

        let list = block_on(storage.list()).unwrap();
        assert_eq!(list.len(), 2);
        assert!(list.contains(&"ws1".to_string()));
        assert!(list.contains(&"ws2".to_string()));
    }

    #[test]
    fn test_scene_survives_roundtrip() {
        let storage = MemoryStorage::new();
        let mut ws = Workspace::new("Board", 0);
        let a = ws.create_point(0.0, 0.0, Some("A".to_string()));
        let b = ws.create_point(10.0, 0.0, Some("B".to_string()));
        ws.create_shape(ShapeKind::Segment, a, b, None).unwrap();

        block_on(storage.save("test", &ws)).unwrap();
        let loaded = block_on(storage.load("test")).unwrap();

        assert_eq!(loaded.points.len(), 2);
        assert_eq!(loaded.shapes.len(), 1);
    }
}
