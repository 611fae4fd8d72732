//! Native binary format for persisted artifacts.
//!
//! The format is a 32-byte header followed by a Postcard-encoded payload:
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                    Header (32 bytes)                       │
//! ├────────────────────────────────────────────────────────────┤
//! │                    Payload (variable)                      │
//! └────────────────────────────────────────────────────────────┘
//! ```

use std::fs;
use std::path::Path;

use thiserror::Error;

use super::payload::Payload;

// ============================================================================
// Constants
// ============================================================================

/// Magic bytes identifying a groves artifact file.
pub const MAGIC: &[u8; 4] = b"GRVS";

/// Current format version (major).
pub const CURRENT_VERSION_MAJOR: u8 = 1;

/// Current format version (minor).
pub const CURRENT_VERSION_MINOR: u8 = 0;

/// Size of the format header in bytes.
pub const HEADER_SIZE: usize = 32;

// ============================================================================
// Artifact Kind
// ============================================================================

/// Artifact type identifier stored in the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ArtifactKind {
    /// Random-forest model.
    Forest = 0,
    /// Gradient-boosted tree model.
    Gbdt = 1,
    /// Standardization statistics.
    Scaler = 2,
    /// Label vocabulary.
    LabelEncoder = 3,
}

impl ArtifactKind {
    /// Convert from u8, returning None for unknown values.
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Forest),
            1 => Some(Self::Gbdt),
            2 => Some(Self::Scaler),
            3 => Some(Self::LabelEncoder),
            _ => None,
        }
    }
}

// ============================================================================
// Format Header
// ============================================================================

/// 32-byte header for the native artifact format.
///
/// # Layout
///
/// ```text
/// Offset  Size  Field
/// ------  ----  -----
/// 0       4     Magic ("GRVS")
/// 4       1     Version major
/// 5       1     Version minor
/// 6       1     Artifact kind
/// 7       1     Reserved
/// 8       4     Payload size (bytes, little-endian)
/// 12      4     CRC32 checksum of payload
/// 16      4     Number of features
/// 20      4     Number of classes
/// 24      8     Reserved
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatHeader {
    /// Format version (major).
    pub version_major: u8,
    /// Format version (minor).
    pub version_minor: u8,
    /// Artifact type.
    pub kind: ArtifactKind,
    /// Size of the payload in bytes.
    pub payload_size: u32,
    /// CRC32 checksum of the payload.
    pub checksum: u32,
    /// Number of input features (0 where not applicable).
    pub n_features: u32,
    /// Number of classes (0 where not applicable).
    pub n_classes: u32,
}

impl FormatHeader {
    /// Create a header with the current version.
    pub fn new(kind: ArtifactKind, n_features: u32, n_classes: u32) -> Self {
        Self {
            version_major: CURRENT_VERSION_MAJOR,
            version_minor: CURRENT_VERSION_MINOR,
            kind,
            payload_size: 0,
            checksum: 0,
            n_features,
            n_classes,
        }
    }

    /// Serialize the header to 32 bytes.
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut buf = [0u8; HEADER_SIZE];

        buf[0..4].copy_from_slice(MAGIC);
        buf[4] = self.version_major;
        buf[5] = self.version_minor;
        buf[6] = self.kind as u8;
        // buf[7] reserved
        buf[8..12].copy_from_slice(&self.payload_size.to_le_bytes());
        buf[12..16].copy_from_slice(&self.checksum.to_le_bytes());
        buf[16..20].copy_from_slice(&self.n_features.to_le_bytes());
        buf[20..24].copy_from_slice(&self.n_classes.to_le_bytes());
        // buf[24..32] reserved

        buf
    }

    /// Parse a header from 32 bytes.
    pub fn from_bytes(buf: &[u8; HEADER_SIZE]) -> Result<Self, DeserializeError> {
        if &buf[0..4] != MAGIC {
            return Err(DeserializeError::NotAnArtifact);
        }

        let version_major = buf[4];
        let version_minor = buf[5];
        if version_major > CURRENT_VERSION_MAJOR {
            return Err(DeserializeError::UnsupportedVersion {
                major: version_major,
                minor: version_minor,
            });
        }

        let kind = ArtifactKind::from_u8(buf[6])
            .ok_or_else(|| DeserializeError::CorruptPayload("invalid artifact kind".into()))?;

        let payload_size = u32::from_le_bytes([buf[8], buf[9], buf[10], buf[11]]);
        let checksum = u32::from_le_bytes([buf[12], buf[13], buf[14], buf[15]]);
        let n_features = u32::from_le_bytes([buf[16], buf[17], buf[18], buf[19]]);
        let n_classes = u32::from_le_bytes([buf[20], buf[21], buf[22], buf[23]]);

        Ok(Self {
            version_major,
            version_minor,
            kind,
            payload_size,
            checksum,
            n_features,
            n_classes,
        })
    }
}

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur during serialization.
#[derive(Debug, Error)]
pub enum SerializeError {
    /// I/O error during writing.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Postcard encoding error.
    #[error("encoding error: {0}")]
    Encoding(#[from] postcard::Error),
}

/// Errors that can occur during deserialization.
#[derive(Debug, Error)]
pub enum DeserializeError {
    /// File is not a groves artifact (wrong magic).
    #[error("not a groves artifact file")]
    NotAnArtifact,

    /// Artifact requires a newer format version.
    #[error("artifact requires format version {major}.{minor} or later")]
    UnsupportedVersion { major: u8, minor: u8 },

    /// Payload checksum doesn't match.
    #[error("checksum mismatch: expected {expected:#010x}, got {actual:#010x}")]
    ChecksumMismatch { expected: u32, actual: u32 },

    /// File was truncated or incomplete.
    #[error("file truncated: expected {expected} bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },

    /// Payload is corrupt or malformed.
    #[error("corrupt payload: {0}")]
    CorruptPayload(String),

    /// Artifact kind mismatch (e.g. expected a scaler, found a model).
    #[error("artifact kind mismatch: expected {expected:?}, got {actual:?}")]
    KindMismatch {
        expected: ArtifactKind,
        actual: ArtifactKind,
    },

    /// I/O error during reading.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Postcard decoding error.
    #[error("decoding error: {0}")]
    Decoding(#[from] postcard::Error),
}

// ============================================================================
// Encode / Decode
// ============================================================================

/// Encode a payload with header and checksum.
pub fn encode(kind: ArtifactKind, payload: &Payload) -> Result<Vec<u8>, SerializeError> {
    let payload_bytes = postcard::to_allocvec(payload)?;

    let meta = payload.meta();
    let mut header = FormatHeader::new(kind, meta.n_features, meta.n_classes);
    header.payload_size = payload_bytes.len() as u32;
    header.checksum = crc32fast::hash(&payload_bytes);

    let mut out = Vec::with_capacity(HEADER_SIZE + payload_bytes.len());
    out.extend_from_slice(&header.to_bytes());
    out.extend_from_slice(&payload_bytes);
    Ok(out)
}

/// Decode an artifact, verifying magic, version, kind, and checksum.
pub fn decode(bytes: &[u8], expected: ArtifactKind) -> Result<Payload, DeserializeError> {
    if bytes.len() < HEADER_SIZE {
        return Err(DeserializeError::Truncated {
            expected: HEADER_SIZE,
            actual: bytes.len(),
        });
    }

    let mut header_buf = [0u8; HEADER_SIZE];
    header_buf.copy_from_slice(&bytes[..HEADER_SIZE]);
    let header = FormatHeader::from_bytes(&header_buf)?;

    if header.kind != expected {
        return Err(DeserializeError::KindMismatch {
            expected,
            actual: header.kind,
        });
    }

    let expected_len = HEADER_SIZE + header.payload_size as usize;
    if bytes.len() < expected_len {
        return Err(DeserializeError::Truncated {
            expected: expected_len,
            actual: bytes.len(),
        });
    }

    let payload_bytes = &bytes[HEADER_SIZE..expected_len];
    let actual_checksum = crc32fast::hash(payload_bytes);
    if actual_checksum != header.checksum {
        return Err(DeserializeError::ChecksumMismatch {
            expected: header.checksum,
            actual: actual_checksum,
        });
    }

    Ok(postcard::from_bytes(payload_bytes)?)
}

/// Encode and write an artifact file.
pub fn write_file(
    path: &Path,
    kind: ArtifactKind,
    payload: &Payload,
) -> Result<(), SerializeError> {
    let bytes = encode(kind, payload)?;
    fs::write(path, bytes)?;
    Ok(())
}

/// Read and decode an artifact file.
pub fn read_file(path: &Path, expected: ArtifactKind) -> Result<Payload, DeserializeError> {
    let bytes = fs::read(path)?;
    decode(&bytes, expected)
}

// ============================================================================
// Tests
// ============================================================================
