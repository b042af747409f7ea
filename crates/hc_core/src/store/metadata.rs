//! Feedback metadata rows: append-only, queryable by the consumed flag.

use crate::error::StoreError;
use crate::feedback::FeedbackRecord;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use uuid::Uuid;

/// Row storage for feedback records. Records are never deleted;
/// `consumed` is the only field that ever changes after insert.
pub trait MetadataStore: Send + Sync {
    /// Appends one record. A failure here affects no other record.
    fn insert(&self, record: &FeedbackRecord) -> Result<(), StoreError>;
    fn all(&self) -> Result<Vec<FeedbackRecord>, StoreError>;
    fn unconsumed(&self) -> Result<Vec<FeedbackRecord>, StoreError>;
    /// Flips `consumed` on the given ids. Unknown ids are ignored.
    fn mark_consumed(&self, ids: &[Uuid]) -> Result<(), StoreError>;
}

/// JSON-lines file store. Every operation that changes state appends a
/// single line: inserts append the record, marking consumed appends a
/// marker with the affected ids. The file is never rewritten, so an
/// insert landing mid-retrain can never be lost to a concurrent mark.
/// Markers are folded onto their records at read time.
#[derive(Debug, Clone)]
pub struct FsMetadataStore {
    path: PathBuf,
}

/// Marker line flipping `consumed` on previously inserted records.
#[derive(Debug, Serialize, Deserialize)]
struct ConsumedMark {
    consumed_ids: Vec<Uuid>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum Row {
    Record(FeedbackRecord),
    Consumed(ConsumedMark),
}

impl FsMetadataStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FsMetadataStore { path: path.into() }
    }

    fn append_line(&self, line: &str) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        file.write_all(line.as_bytes())?;
        file.write_all(b"\n")?;
        file.flush()?;
        file.sync_all()?;
        Ok(())
    }

    fn read_rows(&self) -> Result<Vec<FeedbackRecord>, StoreError> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };
        let mut rows: Vec<FeedbackRecord> = Vec::new();
        let mut marked: HashSet<Uuid> = HashSet::new();
        for (idx, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let row: Row = serde_json::from_str(line)
                .map_err(|_| StoreError::CorruptedRow { line: idx + 1 })?;
            match row {
                Row::Record(record) => rows.push(record),
                Row::Consumed(mark) => marked.extend(mark.consumed_ids),
            }
        }
        for row in rows.iter_mut() {
            if marked.contains(&row.id) {
                row.consumed = true;
            }
        }
        Ok(rows)
    }
}

impl MetadataStore for FsMetadataStore {
    fn insert(&self, record: &FeedbackRecord) -> Result<(), StoreError> {
        self.append_line(&serde_json::to_string(record)?)
    }

    fn all(&self) -> Result<Vec<FeedbackRecord>, StoreError> {
        self.read_rows()
    }

    fn unconsumed(&self) -> Result<Vec<FeedbackRecord>, StoreError> {
        Ok(self.read_rows()?.into_iter().filter(|r| !r.consumed).collect())
    }

    fn mark_consumed(&self, ids: &[Uuid]) -> Result<(), StoreError> {
        if ids.is_empty() {
            return Ok(());
        }
        let mark = ConsumedMark { consumed_ids: ids.to_vec() };
        self.append_line(&serde_json::to_string(&mark)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::digit::Digit;
    use tempfile::TempDir;

    fn record(consumed: bool) -> FeedbackRecord {
        FeedbackRecord {
            id: Uuid::new_v4(),
            timestamp: 1_700_000_000_000,
            predicted: Digit::new(3).ok(),
            corrected: Digit::new(5).unwrap(),
            image_key: "images/x.jpg".to_string(),
            consumed,
        }
    }

    #[test]
    fn insert_appends_and_preserves_order() {
        let dir = TempDir::new().unwrap();
        let store = FsMetadataStore::new(dir.path().join("records.jsonl"));
        let a = record(false);
        let b = record(false);
        store.insert(&a).unwrap();
        store.insert(&b).unwrap();
        let rows = store.all().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].id, a.id);
        assert_eq!(rows[1].id, b.id);
    }

    #[test]
    fn unconsumed_filters_on_the_flag() {
        let dir = TempDir::new().unwrap();
        let store = FsMetadataStore::new(dir.path().join("records.jsonl"));
        store.insert(&record(true)).unwrap();
        let pending = record(false);
        store.insert(&pending).unwrap();
        let rows = store.unconsumed().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, pending.id);
    }

    #[test]
    fn mark_consumed_flips_only_the_given_ids() {
        let dir = TempDir::new().unwrap();
        let store = FsMetadataStore::new(dir.path().join("records.jsonl"));
        let a = record(false);
        let b = record(false);
        store.insert(&a).unwrap();
        store.insert(&b).unwrap();

        store.mark_consumed(&[a.id]).unwrap();

        let rows = store.all().unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().find(|r| r.id == a.id).unwrap().consumed);
        assert!(!rows.iter().find(|r| r.id == b.id).unwrap().consumed);
    }

    #[test]
    fn insert_racing_mark_consumed_loses_no_rows() {
        let dir = TempDir::new().unwrap();
        let store =
            std::sync::Arc::new(FsMetadataStore::new(dir.path().join("records.jsonl")));
        let seeded: Vec<Uuid> = (0..20)
            .map(|_| {
                let r = record(false);
                store.insert(&r).unwrap();
                r.id
            })
            .collect();

        let writer = {
            let store = std::sync::Arc::clone(&store);
            std::thread::spawn(move || {
                for _ in 0..200 {
                    store.insert(&record(false)).unwrap();
                }
            })
        };
        for id in &seeded {
            store.mark_consumed(&[*id]).unwrap();
        }
        writer.join().unwrap();

        let rows = store.all().unwrap();
        assert_eq!(rows.len(), 220);
        for id in &seeded {
            assert!(rows.iter().find(|r| r.id == *id).unwrap().consumed);
        }
    }

    #[test]
    fn mark_consumed_appends_instead_of_rewriting() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("records.jsonl");
        let store = FsMetadataStore::new(&path);
        let a = record(false);
        store.insert(&a).unwrap();
        let before = std::fs::read_to_string(&path).unwrap();

        store.mark_consumed(&[a.id]).unwrap();

        let after = std::fs::read_to_string(&path).unwrap();
        assert!(after.starts_with(&before));
        assert!(after.len() > before.len());
        assert!(store.all().unwrap()[0].consumed);
    }

    #[test]
    fn missing_file_reads_as_empty() {
        let dir = TempDir::new().unwrap();
        let store = FsMetadataStore::new(dir.path().join("records.jsonl"));
        assert!(store.all().unwrap().is_empty());
    }

    #[test]
    fn corrupted_row_is_reported_with_its_line() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("records.jsonl");
        let store = FsMetadataStore::new(&path);
        store.insert(&record(false)).unwrap();
        let mut text = std::fs::read_to_string(&path).unwrap();
        text.push_str("{ not json\n");
        std::fs::write(&path, text).unwrap();
        assert!(matches!(
            store.all(),
            Err(StoreError::CorruptedRow { line: 2 })
        ));
    }
}
