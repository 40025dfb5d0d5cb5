// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

use crate::index::IndexError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_cbor::Value;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use tracing::debug;

pub const INDEX_MAGIC: &str = "DSIX";
pub const INDEX_FILE_VERSION: u32 = 1;

/// On-disk envelope: a kind tag plus the engine state for that kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexFile {
    pub magic: String,
    pub version: u32,
    pub kind: String,
    pub payload: Value,
}

impl IndexFile {
    pub fn wrap<T: Serialize>(kind: &str, state: &T) -> Result<Self, IndexError> {
        let payload = serde_cbor::value::to_value(state)
            .map_err(|e| IndexError::Format(format!("failed to encode {}: {}", kind, e)))?;

        Ok(Self {
            magic: INDEX_MAGIC.to_string(),
            version: INDEX_FILE_VERSION,
            kind: kind.to_string(),
            payload,
        })
    }

    pub fn unwrap_payload<T: DeserializeOwned>(self) -> Result<T, IndexError> {
        let kind = self.kind;
        serde_cbor::value::from_value(self.payload)
            .map_err(|e| IndexError::Format(format!("corrupt {} payload: {}", kind, e)))
    }

    pub fn write(&self, path: &Path) -> Result<(), IndexError> {
        let mut writer = BufWriter::new(File::create(path)?);
        serde_cbor::to_writer(&mut writer, self)
            .map_err(|e| IndexError::Format(e.to_string()))?;
        writer.flush()?;

        debug!("Wrote {} index to {}", self.kind, path.display());
        Ok(())
    }

    pub fn read(path: &Path) -> Result<Self, IndexError> {
        let reader = BufReader::new(File::open(path)?);
        let file: IndexFile = serde_cbor::from_reader(reader)
            .map_err(|e| IndexError::Format(format!("{}: {}", path.display(), e)))?;

        if file.magic != INDEX_MAGIC {
            return Err(IndexError::Format(format!(
                "{} is not an index file",
                path.display()
            )));
        }
        if file.version > INDEX_FILE_VERSION {
            return Err(IndexError::Format(format!(
                "incompatible version: found {}, expected at most {}",
                file.version, INDEX_FILE_VERSION
            )));
        }

        Ok(file)
    }
}
