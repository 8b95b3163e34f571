//! Storage backends for restaurant documents
//!
//! Every backend implements `restaurant::DocumentStore`; the server picks one
//! from configuration.

pub mod json_file;
pub mod memory;
pub mod seaorm;

pub use json_file::JsonFileStore;
pub use memory::MemoryDocumentStore;
pub use seaorm::SeaOrmDocumentStore;
