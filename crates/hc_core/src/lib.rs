//! # hc_core - Hand Cricket Gesture Game Core
//!
//! This library implements the core of a gesture-driven hand cricket game:
//! a hand pose encodes a digit (1-10), the digit drives a two-innings
//! turn-based match against a randomized opponent, and misclassified poses
//! feed a correction loop that periodically refits and republishes the
//! classifier.
//!
//! ## Features
//! - Deterministic feature encoding (same landmarks = same vector)
//! - Seedable turn engine opponent (same seed = same match)
//! - Immutable versioned model artifacts with atomic publish
//! - Append-only feedback store consumed by the retraining job

pub mod classifier;
pub mod config;
pub mod corpus;
pub mod digit;
pub mod engine;
pub mod error;
pub mod extract;
pub mod feedback;
pub mod landmarks;
pub mod model;
pub mod pipeline;
pub mod retrain;
pub mod store;
pub mod synthetic;

// Re-export the presentation surface
pub use classifier::KnnClassifier;
pub use config::Config;
pub use corpus::{CorpusSample, TrainingCorpus};
pub use digit::{Digit, InvalidDigit};
pub use engine::{MatchState, Opponent, Outcome, Phase, Side, TurnEngine};
pub use error::{ModelError, StoreError, TrainError};
pub use extract::{DumpExtractor, Frame, FrameSource, LandmarkExtractor, RecordedFrames};
pub use feedback::{FeedbackRecord, FeedbackStore};
pub use landmarks::{FeatureVector, HandLandmarks, Landmark, FEATURE_DIM, LANDMARK_COUNT};
pub use model::{ArtifactHeader, LoadedModel, ModelStore, ServingModel, ServingPointer};
pub use pipeline::GesturePipeline;
pub use retrain::{RetrainOptions, RetrainReport, Retrainer};
pub use store::{FsMetadataStore, FsObjectStore, MetadataStore, ObjectStore};
pub use synthetic::{synthetic_corpus, synthetic_hand, SyntheticExtractor};
