use crate::chunking::{ChunkError, SETUP_FILE};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Side file recorded next to the chunk data so a later session can pick
/// up where chunking left off.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetupData {
    pub encoding_model: Option<String>,
    pub number_of_chunks: usize,
}

impl SetupData {
    /// Reads `setup_data.json` from `folder`, or `None` if it is absent.
    pub fn load(folder: &Path) -> Result<Option<Self>, ChunkError> {
        let path = folder.join(SETUP_FILE);
        if !path.exists() {
            return Ok(None);
        }
        let data = fs::read_to_string(path)?;
        Ok(Some(serde_json::from_str(&data)?))
    }

    pub fn save(&self, folder: &Path) -> Result<(), ChunkError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(folder.join(SETUP_FILE), json)?;
        Ok(())
    }
}
