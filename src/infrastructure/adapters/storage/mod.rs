//! Storage Adapter - 合成音轨存储

mod file_storage;

pub use file_storage::FileTrackStorage;
