#![forbid(unsafe_code)]

pub mod content;
pub mod repository;
pub mod sqlite;

pub use content::{ContentSource, DirectoryContentSource, InMemoryContentSource};
pub use repository::{InMemoryRepository, KeyValueStore, Storage, StorageError};
