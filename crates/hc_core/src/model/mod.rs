// Model artifact system
// MessagePack + LZ4 envelope with a SHA-256 trailer, immutable versioned
// artifacts, atomic publish and a hot-swappable serving handle.

pub mod artifact;
pub mod serving;
pub mod store;

pub use artifact::{deserialize_artifact, serialize_artifact, ArtifactHeader};
pub use serving::{LoadedModel, ServingModel};
pub use store::{ModelStore, ServingPointer};

/// Envelope format version; bumped when the on-disk layout changes.
pub const ARTIFACT_FORMAT_VERSION: u32 = 1;
