use crate::chunking::ChunkError;
use text_splitter::{ChunkConfig, TextSplitter};

/// Splits text into chunks of at most `chunk_size` characters, with up to
/// `chunk_overlap` characters shared between neighbouring chunks. Splits
/// prefer paragraph, then line, then word boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl TextChunker {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self, ChunkError> {
        if chunk_size == 0 {
            return Err(ChunkError::InvalidChunking(
                "chunk_size must be at least 1".to_string(),
            ));
        }
        if chunk_overlap >= chunk_size {
            return Err(ChunkError::InvalidChunking(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                chunk_overlap, chunk_size
            )));
        }
        Ok(Self {
            chunk_size,
            chunk_overlap,
        })
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    pub fn split(&self, text: &str) -> Result<Vec<String>, ChunkError> {
        let config = ChunkConfig::new(self.chunk_size)
            .with_overlap(self.chunk_overlap)
            .map_err(|e| ChunkError::InvalidChunking(e.to_string()))?;

        Ok(TextSplitter::new(config)
            .chunks(text)
            .map(str::to_owned)
            .collect())
    }
}
