//! Artifact serialization and the versioned store.
//!
//! Artifacts use a native binary format: a 32-byte header (magic, format
//! version, artifact kind, CRC32 checksum) followed by a Postcard-encoded
//! version-tagged payload. [`ArtifactStore`] maps the four pipeline
//! artifacts to fixed, version-suffixed file names.

pub mod codec;
pub mod convert;
pub mod payload;
mod store;

pub use codec::{
    ArtifactKind, DeserializeError, FormatHeader, SerializeError, CURRENT_VERSION_MAJOR,
    CURRENT_VERSION_MINOR, HEADER_SIZE, MAGIC,
};
pub use payload::{
    ArtifactPayload, EncoderPayload, ForestPayload, GbdtPayload, MetaPayload, Payload, PayloadV1,
    ScalerPayload, TreePayload,
};
pub use store::{ArtifactStore, ARTIFACT_EXT};
