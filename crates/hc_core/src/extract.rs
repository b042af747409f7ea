//! Frame and landmark-extractor seams.
//!
//! The actual hand detector is an external collaborator (a vision model
//! with its own geometry pipeline). The core only depends on the
//! [`LandmarkExtractor`] contract: zero hands is an expected outcome, not
//! an error, and when more than one hand is reported callers take the
//! first one. That tie-break is arbitrary and documented as such; it is
//! not a promise of the "best" hand.

use crate::landmarks::{HandLandmarks, Landmark, LANDMARK_COUNT};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One captured image. The byte format is the extractor's business; the
/// core treats it as an opaque blob (it is also what the feedback store
/// persists).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
    pub bytes: Vec<u8>,
}

impl Frame {
    pub fn new(bytes: Vec<u8>) -> Self {
        Frame { bytes }
    }
}

/// Hand detection contract: every reported hand carries exactly 21
/// ordered keypoints. An empty result means no hand was found.
pub trait LandmarkExtractor: Send + Sync {
    fn detect(&self, frame: &Frame) -> Vec<HandLandmarks>;
}

/// Successive frames on demand; `None` is end of stream.
pub trait FrameSource {
    fn next_frame(&mut self) -> Option<Frame>;
}

/// Extractor over frames that are serialized landmark dumps.
///
/// A capture tool running next to the real camera widget writes one JSON
/// dump per frame: either a single 21-landmark array or an array of such
/// arrays when several hands were in view. This extractor replays those
/// dumps offline, which is how the trainer processes stored feedback
/// images and how the CLI plays recorded sessions.
#[derive(Debug, Default, Clone, Copy)]
pub struct DumpExtractor;

#[derive(Deserialize)]
#[serde(untagged)]
enum LandmarkDump {
    Single(Vec<Landmark>),
    Multi(Vec<Vec<Landmark>>),
}

impl LandmarkExtractor for DumpExtractor {
    fn detect(&self, frame: &Frame) -> Vec<HandLandmarks> {
        let dump: LandmarkDump = match serde_json::from_slice(&frame.bytes) {
            Ok(dump) => dump,
            Err(err) => {
                log::debug!("frame is not a landmark dump ({err}); treating as no hand");
                return Vec::new();
            }
        };
        let hands = match dump {
            LandmarkDump::Single(points) => vec![points],
            LandmarkDump::Multi(hands) => hands,
        };
        hands
            .into_iter()
            .filter_map(|points| {
                let points: Option<[Landmark; LANDMARK_COUNT]> = points.try_into().ok();
                if points.is_none() {
                    log::warn!("landmark dump with wrong point count, dropping hand");
                }
                points.map(HandLandmarks)
            })
            .collect()
    }
}

/// Frame source backed by a recorded list of frames.
#[derive(Debug, Clone)]
pub struct RecordedFrames {
    frames: std::vec::IntoIter<Frame>,
}

impl RecordedFrames {
    pub fn new(frames: Vec<Frame>) -> Self {
        RecordedFrames { frames: frames.into_iter() }
    }

    /// Loads a recording: a JSON array whose elements each become one
    /// frame (re-serialized, so [`DumpExtractor`] can replay them).
    pub fn load(path: &Path) -> Result<Self, crate::error::StoreError> {
        let bytes = std::fs::read(path)?;
        let values: Vec<serde_json::Value> = serde_json::from_slice(&bytes)?;
        let frames = values
            .into_iter()
            .map(|value| Ok(Frame::new(serde_json::to_vec(&value)?)))
            .collect::<Result<Vec<_>, serde_json::Error>>()?;
        log::info!("loaded {} recorded frames from {}", frames.len(), path.display());
        Ok(RecordedFrames::new(frames))
    }
}

impl FrameSource for RecordedFrames {
    fn next_frame(&mut self) -> Option<Frame> {
        self.frames.next()
    }
}
