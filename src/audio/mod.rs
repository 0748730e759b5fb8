//! Audio ingestion types and PCM payload validation.

pub mod chunk;
pub mod codec;

pub use chunk::{AudioChunk, SourceTag};
