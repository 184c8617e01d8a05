//! File-based BlobStore implementation for std environments
//!
//! Each record is stored as a separate file named after its ID. Writes go to a temporary
//! file which is synced and renamed over the record, so a record is never seen half-written.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use super::{BlobStore, RecordId};

/// Error type for FileBlobs operations
#[derive(Debug)]
pub enum FileBlobsError {
    /// I/O error
    Io(io::Error),
}

impl From<io::Error> for FileBlobsError {
    fn from(e: io::Error) -> Self {
        FileBlobsError::Io(e)
    }
}

impl std::fmt::Display for FileBlobsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileBlobsError::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for FileBlobsError {}

/// File-based blob store for testing and desktop environments.
///
/// # Example
///
/// ```ignore
/// let blobs = FileBlobs::new("/var/lib/device-cache")?;
/// let mut cache = DeviceCache::new(blobs)?;
/// ```
#[derive(Debug)]
pub struct FileBlobs {
    /// Base directory for storing record files
    base_path: PathBuf,
}

impl FileBlobs {
    /// Open a store at the given directory.
    ///
    /// Creates the directory if it doesn't exist.
    pub fn new(base_path: impl Into<PathBuf>) -> Result<Self, FileBlobsError> {
        let base_path = base_path.into();
        fs::create_dir_all(&base_path)?;
        Ok(Self { base_path })
    }

    /// Get the base path of the store.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn record_path(&self, id: RecordId) -> PathBuf {
        self.base_path.join(format!("{:05}.blob", id.0))
    }
}

impl BlobStore for FileBlobs {
    type Error = FileBlobsError;

    fn read(&mut self, id: RecordId, buf: &mut [u8]) -> Result<Option<usize>, Self::Error> {
        let data = match fs::read(self.record_path(id)) {
            Ok(data) => data,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let n = data.len().min(buf.len());
        buf[..n].copy_from_slice(&data[..n]);
        Ok(Some(data.len()))
    }

    fn write(&mut self, id: RecordId, data: &[u8]) -> Result<(), Self::Error> {
        let path = self.record_path(id);
        let tmp = path.with_extension("tmp");

        let mut file = fs::File::create(&tmp)?;
        file.write_all(data)?;
        file.sync_all()?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn clear(&mut self) -> Result<(), Self::Error> {
        for entry in fs::read_dir(&self.base_path)? {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "blob" || ext == "tmp") {
                fs::remove_file(path)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_blobs_roundtrip_and_reopen() {
        let dir = tempfile::tempdir().unwrap();

        let mut blobs = FileBlobs::new(dir.path()).unwrap();
        assert_eq!(blobs.read(RecordId(3), &mut []).unwrap(), None);
        blobs.write(RecordId(3), b"value\0").unwrap();
        blobs.write(RecordId(3), b"v2\0").unwrap();
        drop(blobs);

        let mut blobs = FileBlobs::new(dir.path()).unwrap();
        let mut buf = [0u8; 8];
        assert_eq!(blobs.read(RecordId(3), &mut buf).unwrap(), Some(3));
        assert_eq!(&buf[..3], b"v2\0");
        assert!(dir.path().join("00003.blob").exists());
    }

    #[test]
    fn test_file_blobs_clear() {
        let dir = tempfile::tempdir().unwrap();
        let mut blobs = FileBlobs::new(dir.path()).unwrap();
        blobs.write(RecordId(0), &[1, 0]).unwrap();
        blobs.clear().unwrap();
        assert_eq!(blobs.read(RecordId(0), &mut []).unwrap(), None);
    }
}
