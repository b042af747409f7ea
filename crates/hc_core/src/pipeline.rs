//! Frame-to-digit classification pipeline.

use crate::digit::Digit;
use crate::error::ModelError;
use crate::extract::{Frame, LandmarkExtractor};
use crate::landmarks::FeatureVector;
use crate::model::ServingModel;
use std::sync::Arc;

/// The live classification path: extractor and serving handle are
/// acquired once here and reused for every frame, never re-opened per
/// call.
pub struct GesturePipeline {
    extractor: Box<dyn LandmarkExtractor>,
    serving: Arc<ServingModel>,
}

impl GesturePipeline {
    pub fn new(extractor: Box<dyn LandmarkExtractor>, serving: Arc<ServingModel>) -> Self {
        GesturePipeline { extractor, serving }
    }

    /// Classifies one frame.
    ///
    /// `Ok(None)` is a detection miss (no hand in frame) - an expected
    /// outcome, the caller shows the next frame. When the extractor
    /// reports several hands the first one is used; that tie-break is
    /// arbitrary by policy, not a quality ranking. The only error is a
    /// missing classifier.
    pub fn classify(&self, frame: &Frame) -> Result<Option<Digit>, ModelError> {
        let Some(hand) = self.extractor.detect(frame).into_iter().next() else {
            return Ok(None);
        };
        let features = FeatureVector::from_landmarks(&hand);
        self.serving.predict(&features).map(Some)
    }

    pub fn serving(&self) -> &Arc<ServingModel> {
        &self.serving
    }
}
