//! Durable snapshot of linked credentials

pub mod json_file;

pub use json_file::JsonSnapshotFile;
