//! Text Query Handlers

use crate::application::error::ApplicationError;
use crate::application::queries::ChunkText;
use crate::domain::{chunk_text, TextSegment};

/// ChunkText Handler - 预览分块结果
pub struct ChunkTextHandler {
    default_max_length: usize,
}

impl ChunkTextHandler {
    pub fn new(default_max_length: usize) -> Self {
        Self { default_max_length }
    }

    pub fn handle(&self, query: ChunkText) -> Result<Vec<TextSegment>, ApplicationError> {
        let max_length = query.max_length.unwrap_or(self.default_max_length);
        Ok(chunk_text(&query.text, max_length)?)
    }
}
