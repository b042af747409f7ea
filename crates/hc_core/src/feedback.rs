//! Human corrections of misclassified gestures.

use crate::digit::Digit;
use crate::error::StoreError;
use crate::extract::Frame;
use crate::model::artifact::current_timestamp;
use crate::store::{FsMetadataStore, FsObjectStore, MetadataStore, ObjectStore};
use serde::{Deserialize, Serialize};
use std::path::Path;
use uuid::Uuid;

/// One correction: the stored image, what the classifier said, and what
/// the human says it should have been. Append-only; only `consumed` ever
/// changes, set by the retraining job once the sample is folded into a
/// published model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackRecord {
    pub id: Uuid,
    /// Unix milliseconds.
    pub timestamp: u64,
    /// What the classifier predicted, if it predicted anything at all.
    pub predicted: Option<Digit>,
    pub corrected: Digit,
    /// Object-store key of the captured image.
    pub image_key: String,
    pub consumed: bool,
}

/// Image blobs plus metadata rows, bundled behind the two store seams.
pub struct FeedbackStore {
    objects: Box<dyn ObjectStore>,
    metadata: Box<dyn MetadataStore>,
}

impl FeedbackStore {
    pub fn new(objects: Box<dyn ObjectStore>, metadata: Box<dyn MetadataStore>) -> Self {
        FeedbackStore { objects, metadata }
    }

    /// Filesystem-backed layout: `<dir>/images/...` + `<dir>/records.jsonl`.
    pub fn open(dir: &Path) -> Self {
        FeedbackStore {
            objects: Box::new(FsObjectStore::new(dir)),
            metadata: Box::new(FsMetadataStore::new(dir.join("records.jsonl"))),
        }
    }

    /// Stores the image, then appends the metadata row. Returns the new
    /// record's id. Never touches existing records.
    pub fn record(
        &self,
        image: &Frame,
        predicted: Option<Digit>,
        corrected: Digit,
    ) -> Result<Uuid, StoreError> {
        let id = Uuid::new_v4();
        let image_key = format!("images/{id}.jpg");
        self.objects.put(&image_key, &image.bytes)?;

        let record = FeedbackRecord {
            id,
            timestamp: current_timestamp(),
            predicted,
            corrected,
            image_key,
            consumed: false,
        };
        self.metadata.insert(&record)?;

        log::info!(
            "recorded feedback {id}: predicted {}, corrected {corrected}",
            predicted.map_or_else(|| "none".to_string(), |d| d.to_string()),
        );
        Ok(id)
    }

    pub fn unconsumed(&self) -> Result<Vec<FeedbackRecord>, StoreError> {
        self.metadata.unconsumed()
    }

    pub fn all(&self) -> Result<Vec<FeedbackRecord>, StoreError> {
        self.metadata.all()
    }

    pub fn fetch_image(&self, record: &FeedbackRecord) -> Result<Frame, StoreError> {
        Ok(Frame::new(self.objects.get(&record.image_key)?))
    }

    pub fn mark_consumed(&self, ids: &[Uuid]) -> Result<(), StoreError> {
        self.metadata.mark_consumed(ids)
    }
}
