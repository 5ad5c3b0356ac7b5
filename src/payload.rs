// Fleetsim - Simulated device fleet telemetry pipeline
//
// Licensed under the MIT license. See LICENSE file for details.

//! Batch serialization and compression
//!
//! Batches are serialized to a JSON array (UTF-8) and gzip-compressed.
//! The compressed bytes are the unit handed to the publisher; encryption
//! is left to the transport.

use std::io::{Read, Write};

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use tracing::debug;

use crate::device::Reading;
use crate::error::{EncodeError, Result};

/// Serializes reading batches into compressed payloads
#[derive(Debug, Clone)]
pub struct PayloadEncoder {
    level: Compression,
}

impl PayloadEncoder {
    /// Create an encoder with the default compression level
    pub fn new() -> Self {
        Self {
            level: Compression::default(),
        }
    }

    /// Create an encoder with an explicit compression level (0-9)
    pub fn with_level(level: u32) -> Self {
        Self {
            level: Compression::new(level),
        }
    }

    /// Serialize a batch to JSON and gzip-compress the bytes.
    ///
    /// Array ordering is preserved from the batch. Both byte counts are
    /// emitted as a structured log event and kept on the returned payload.
    pub fn encode(&self, batch: &[Reading]) -> Result<EncodedPayload> {
        let json = serde_json::to_vec(batch).map_err(EncodeError::Serialize)?;

        let mut gz = GzEncoder::new(Vec::new(), self.level);
        gz.write_all(&json).map_err(EncodeError::Compress)?;
        let bytes = gz.finish().map_err(EncodeError::Compress)?;

        debug!(
            readings = batch.len(),
            uncompressed_bytes = json.len(),
            compressed_bytes = bytes.len(),
            "encoded telemetry batch"
        );

        Ok(EncodedPayload {
            bytes,
            uncompressed_len: json.len(),
        })
    }

    /// Decompress a payload and parse it back into readings.
    ///
    /// Exact inverse of [`PayloadEncoder::encode`], including for the
    /// empty batch.
    pub fn decode(&self, payload: &[u8]) -> Result<Vec<Reading>> {
        let mut json = Vec::new();
        GzDecoder::new(payload)
            .read_to_end(&mut json)
            .map_err(EncodeError::Decompress)?;

        let readings = serde_json::from_slice(&json).map_err(EncodeError::Parse)?;
        Ok(readings)
    }
}

impl Default for PayloadEncoder {
    fn default() -> Self {
        Self::new()
    }
}

/// A compressed batch ready to hand to a publisher
#[derive(Debug, Clone)]
pub struct EncodedPayload {
    bytes: Vec<u8>,
    uncompressed_len: usize,
}

impl EncodedPayload {
    /// Compressed payload bytes
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consume the payload, returning the compressed bytes
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Size of the compressed payload in bytes
    pub fn compressed_len(&self) -> usize {
        self.bytes.len()
    }

    /// Size of the serialized batch before compression
    pub fn uncompressed_len(&self) -> usize {
        self.uncompressed_len
    }

    /// Compression ratio (uncompressed / compressed, higher is better)
    pub fn compression_ratio(&self) -> f64 {
        if self.bytes.is_empty() {
            return 1.0;
        }
        self.uncompressed_len as f64 / self.bytes.len() as f64
    }
}
