//! Transparent zstd compression of version payloads at rest.
//!
//! A payload is compressed only when compression is enabled, it exceeds the
//! byte threshold, and the compressed form is actually smaller. Any failure
//! stores the raw bytes instead.

use folio_core::config::StorageConfig;
use folio_core::errors::{FolioResult, StorageError};

/// Payload bytes as written to `content_versions.payload`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedPayload {
    pub bytes: Vec<u8>,
    pub compressed: bool,
}

/// Compression settings for version payloads.
#[derive(Debug, Clone, Copy)]
pub struct PayloadCodec {
    enabled: bool,
    threshold_bytes: usize,
    level: i32,
}

impl PayloadCodec {
    pub fn new(enabled: bool, threshold_bytes: usize, level: i32) -> Self {
        Self {
            enabled,
            threshold_bytes,
            level,
        }
    }

    pub fn from_config(config: &StorageConfig) -> Self {
        Self::new(
            config.enable_compression,
            config.compression_threshold_bytes,
            config.compression_level,
        )
    }

    pub fn encode(&self, payload: &str) -> EncodedPayload {
        let raw = payload.as_bytes();
        if !self.enabled || raw.len() <= self.threshold_bytes {
            return EncodedPayload::raw(raw);
        }
        match zstd::encode_all(raw, self.level) {
            Ok(compressed) if compressed.len() < raw.len() => EncodedPayload {
                bytes: compressed,
                compressed: true,
            },
            Ok(compressed) => {
                tracing::debug!(
                    raw_bytes = raw.len(),
                    compressed_bytes = compressed.len(),
                    "compression did not shrink payload, storing raw"
                );
                EncodedPayload::raw(raw)
            }
            Err(e) => {
                tracing::warn!(error = %e, "payload compression failed, storing raw");
                EncodedPayload::raw(raw)
            }
        }
    }

    /// Recover the payload text from stored bytes.
    pub fn decode(bytes: &[u8], compressed: bool) -> FolioResult<String> {
        let raw = if compressed {
            zstd::decode_all(bytes).map_err(|e| StorageError::CorruptionDetected {
                details: format!("payload decompression failed: {e}"),
            })?
        } else {
            bytes.to_vec()
        };
        String::from_utf8(raw).map_err(|e| {
            StorageError::CorruptionDetected {
                details: format!("payload is not valid UTF-8: {e}"),
            }
            .into()
        })
    }
}

impl EncodedPayload {
    fn raw(bytes: &[u8]) -> Self {
        Self {
            bytes: bytes.to_vec(),
            compressed: false,
        }
    }
}
