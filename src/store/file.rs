//! JSON file secret store
//!
//! The whole [`StoreDocument`] lives in one JSON file. Writes go to a
//! temporary file in the same directory, are flushed to disk and then
//! renamed over the target, so readers only ever see a complete document.
//! Read-check-write sequences are serialised across processes with an
//! exclusive advisory lock on a sibling `.lock` file.

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use tempfile::NamedTempFile;

use super::{SecretStore, StoreDocument};
use crate::error::{error_codes, SecretError, SecretResult};
use crate::secret::{RetiredSecret, RotationMetadata, Secret};

#[derive(Debug, Clone)]
pub struct FileSecretStore {
    path: PathBuf,
    lock_path: PathBuf,
}

impl FileSecretStore {
    /// Open a store at `path`, creating its parent directory if needed.
    ///
    /// The file itself is created by the first rotation; until then the
    /// store reads as empty.
    pub fn open<P: AsRef<Path>>(path: P) -> SecretResult<Self> {
        let path = path.as_ref().to_path_buf();
        let dir = parent_dir(&path);
        fs::create_dir_all(&dir).map_err(|e| {
            SecretError::store_unavailable(
                "open",
                &format!("cannot create {}: {}", dir.display(), e),
                error_codes::STORE_WRITE_FAILED,
            )
        })?;

        let mut lock_name = path.file_name().unwrap_or_default().to_os_string();
        lock_name.push(".lock");
        let lock_path = dir.join(lock_name);

        Ok(Self { path, lock_path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the current document; a missing file is an empty store
    pub fn load(&self) -> SecretResult<StoreDocument> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(StoreDocument::default()),
            Err(e) => {
                return Err(SecretError::store_unavailable(
                    "load",
                    &format!("cannot read {}: {}", self.path.display(), e),
                    error_codes::STORE_READ_FAILED,
                ))
            }
        };

        serde_json::from_str(&raw).map_err(|e| {
            SecretError::store_unavailable(
                "load",
                &format!("{} is not a valid secret store: {}", self.path.display(), e),
                error_codes::STORE_CORRUPTED,
            )
        })
    }

    fn lock(&self) -> SecretResult<File> {
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .open(&self.lock_path)
            .map_err(|e| {
                SecretError::store_unavailable(
                    "lock",
                    &format!("cannot open {}: {}", self.lock_path.display(), e),
                    error_codes::STORE_LOCK_FAILED,
                )
            })?;
        file.lock_exclusive().map_err(|e| {
            SecretError::store_unavailable(
                "lock",
                &format!("cannot lock {}: {}", self.lock_path.display(), e),
                error_codes::STORE_LOCK_FAILED,
            )
        })?;
        Ok(file)
    }

    fn write(&self, document: &StoreDocument) -> SecretResult<()> {
        let write_failed = |e: &dyn std::fmt::Display| {
            SecretError::store_unavailable(
                "set_current",
                &format!("cannot write {}: {}", self.path.display(), e),
                error_codes::STORE_WRITE_FAILED,
            )
        };

        let tmp = NamedTempFile::new_in(parent_dir(&self.path)).map_err(|e| write_failed(&e))?;
        {
            let mut writer = BufWriter::new(tmp.as_file());
            serde_json::to_writer_pretty(&mut writer, document)?;
            writer.flush().map_err(|e| write_failed(&e))?;
        }
        tmp.as_file().sync_all().map_err(|e| write_failed(&e))?;
        tmp.persist(&self.path).map_err(|e| write_failed(&e.error))?;
        Ok(())
    }
}

impl SecretStore for FileSecretStore {
    fn get_current(&self) -> SecretResult<Option<Secret>> {
        Ok(self.load()?.current)
    }

    fn get_previous(&self) -> SecretResult<Option<RetiredSecret>> {
        Ok(self.load()?.previous)
    }

    fn get_metadata(&self) -> SecretResult<RotationMetadata> {
        Ok(self.load()?.metadata)
    }

    fn snapshot(&self) -> SecretResult<StoreDocument> {
        self.load()
    }

    fn set_current(&self, secret: Secret, metadata: RotationMetadata) -> SecretResult<()> {
        let lock = self.lock()?;

        let mut document = self.load()?;
        document.apply(secret, metadata)?;
        let result = self.write(&document);

        // Unlocking also happens when `lock` is dropped
        let _ = lock.unlock();
        result
    }
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
