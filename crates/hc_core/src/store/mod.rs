// Durable store contracts for feedback images and metadata rows.
// Filesystem implementations here; the traits are the seam a remote
// bucket/table backend would plug into.

pub mod metadata;
pub mod object;

pub use metadata::{FsMetadataStore, MetadataStore};
pub use object::{FsObjectStore, ObjectStore};

use std::fs::{rename, File};
use std::io::Write;
use std::path::Path;

/// Write-to-temp, fsync, atomic rename. Readers either see the old file
/// or the complete new one, never a partial write.
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let temp_path = path.with_extension("tmp");

    {
        let mut file = File::create(&temp_path)?;
        file.write_all(bytes)?;
        file.flush()?;

        // sync_all ensures data is written to disk (portable fsync)
        file.sync_all()?;
    }

    rename(&temp_path, path)?;

    log::debug!("wrote {} bytes to {:?}", bytes.len(), path);
    Ok(())
}
