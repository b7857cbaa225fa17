//! Storage abstraction for workspace persistence.
//!
//! Workspaces serialize as `{id, name, points, shapes, texts, createdAt}`;
//! undo/redo history and the camera are runtime-only, so a loaded
//! workspace always starts with empty stacks and a default view.

mod memory;

#[cfg(not(target_arch = "wasm32"))]
mod file;

pub use memory::MemoryStorage;

#[cfg(not(target_arch = "wasm32"))]
pub use file::FileStorage;

use crate::workspace::Workspace;
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Workspace not found: {0}")]
    NotFound(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Storage error: {0}")]
    Other(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Boxed future for async operations (compatible with WASM).
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Trait for workspace storage backends.
///
/// Implementations can store workspaces in memory, on the filesystem, or
/// behind whatever the embedding platform offers. On native platforms
/// implementations must be Send + Sync.
#[cfg(not(target_arch = "wasm32"))]
pub trait Storage: Send + Sync {
    /// Save a workspace.
    fn save(&self, id: &str, workspace: &Workspace) -> BoxFuture<'_, StorageResult<()>>;

    /// Load a workspace.
    fn load(&self, id: &str) -> BoxFuture<'_, StorageResult<Workspace>>;

    /// Delete a workspace.
    fn delete(&self, id: &str) -> BoxFuture<'_, StorageResult<()>>;

    /// List all stored workspace ids.
    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>>;

    /// Check whether a workspace exists.
    fn exists(&self, id: &str) -> BoxFuture<'_, StorageResult<bool>>;
}


/// Trait for workspace storage backends (WASM version, no Send + Sync).
#[cfg(target_arch = "wasm32")]
pub trait Storage {
    /// Save a workspace.
    fn save(&self, id: &str, workspace: &Workspace) -> BoxFuture<'_, StorageResult<()>>;

    /// Load a workspace.
    fn load(&self, id: &str) -> BoxFuture<'_, StorageResult<Workspace>>;

    /// Delete a workspace.
    fn delete(&self, id: &str) -> BoxFuture<'_, StorageResult<()>>;

    /// List all stored workspace ids.
    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>>;

    /// Check whether a workspace exists.
    fn exists(&self, id: &str) -> BoxFuture<'_, StorageResult<bool>>;
}
