//! Key file persistence, naming, and reference resolution.
//!
//! A [`KeyStore`] manages one directory of raw key files. The format is the
//! absence of one: a key file holds exactly the key bytes, no header and no
//! length prefix, so the file length *is* the key length.
//!
//! The directory is an explicit constructor argument (tests point it at a
//! temp dir), and the generated-name source is injectable so tests are not
//! tied to the wall clock.

use std::{
    fmt, fs, io,
    path::{Path, PathBuf},
};

use chrono::Utc;
use thiserror::Error;
use zeroize::Zeroizing;

/// Default key directory, relative to the working directory.
pub const DEFAULT_KEY_DIR: &str = "keys";

/// Extension carried by generated key files.
const KEY_FILE_EXT: &str = ".bin";

/// Filesystem errors from the key store, with the offending path attached.
#[derive(Error, Debug)]
pub enum KeyStoreError {
    /// Reading, writing, or creating something under the key directory failed.
    #[error("key store I/O failed at {path}: {source}")]
    Io {
        /// Path the operation was touching.
        path: PathBuf,
        /// Underlying filesystem error.
        source: io::Error,
    },
}

impl KeyStoreError {
    fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }
}

/// A freshly persisted key file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredKey {
    /// Bare file name, suitable as an outgoing key reference.
    pub file_name: String,
    /// Full path of the written file.
    pub path: PathBuf,
}

/// Manages a directory of key files.
///
/// Generated names are derived from UTC wall-clock time at second resolution
/// (`key_<YYYYMMDD_HHMMSS>.bin`). Two keys generated within the same second
/// collide on the name; the single-operator usage accepts that rather than
/// adding locking.
pub struct KeyStore {
    dir: PathBuf,
    name_source: Box<dyn Fn() -> String + Send + Sync>,
}

impl fmt::Debug for KeyStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyStore").field("dir", &self.dir).finish_non_exhaustive()
    }
}

impl Default for KeyStore {
    fn default() -> Self {
        Self::new(DEFAULT_KEY_DIR)
    }
}

impl KeyStore {
    /// Key store over `dir`, naming generated files from the wall clock.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self::with_name_source(dir, || {
            format!("key_{}{KEY_FILE_EXT}", Utc::now().format("%Y%m%d_%H%M%S"))
        })
    }

    /// Key store with an injected generated-name source.
    ///
    /// Tests supply a deterministic source; production uses [`KeyStore::new`].
    pub fn with_name_source(
        dir: impl Into<PathBuf>,
        name_source: impl Fn() -> String + Send + Sync + 'static,
    ) -> Self {
        Self { dir: dir.into(), name_source: Box::new(name_source) }
    }

    /// The key directory this store manages.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// A generated file name from the name source.
    ///
    /// No collision detection: the caller gets whatever the source produces.
    pub fn generated_file_name(&self) -> String {
        (self.name_source)()
    }

    /// Path of `name` inside the key directory.
    pub fn file_path(&self, name: impl AsRef<Path>) -> PathBuf {
        self.dir.join(name)
    }

    /// A generated name together with its path in the key directory.
    pub fn fresh_key_path(&self) -> (String, PathBuf) {
        let name = self.generated_file_name();
        let path = self.file_path(&name);
        (name, path)
    }

    /// Create the key directory if it does not exist yet. Idempotent.
    pub fn ensure_dir(&self) -> Result<(), KeyStoreError> {
        fs::create_dir_all(&self.dir).map_err(|e| KeyStoreError::io(&self.dir, e))
    }

    /// Resolve a user- or protocol-supplied reference to an existing key file.
    ///
    /// Three tiers, first hit wins:
    ///
    /// 1. `input` as a literal path (absolute, or relative to the working
    ///    directory)
    /// 2. `input` as a bare name inside the key directory
    /// 3. the final path segment of `input` inside the key directory
    ///
    /// Tier 3 reconciles references that arrive with stray directory
    /// components from another machine: a received key reference is only a
    /// file name, but an operator may type anything. Returns `None` when
    /// nothing matches; a miss is an ordinary outcome, not an error.
    pub fn resolve(&self, input: &str) -> Option<PathBuf> {
        let literal = Path::new(input);
        if literal.is_file() {
            return Some(literal.to_path_buf());
        }

        let in_dir = self.file_path(input);
        if in_dir.is_file() {
            return Some(in_dir);
        }

        let base = literal.file_name()?;
        let retried = self.dir.join(base);
        if retried.is_file() {
            return Some(retried);
        }

        None
    }

    /// Read all bytes of a key file. The buffer is wiped on drop.
    pub fn load(&self, path: impl AsRef<Path>) -> Result<Zeroizing<Vec<u8>>, KeyStoreError> {
        let path = path.as_ref();
        fs::read(path).map(Zeroizing::new).map_err(|e| KeyStoreError::io(path, e))
    }

    /// Write `key` under `name` in the key directory, creating it on demand.
    ///
    /// Whole-buffer write: the file either appears fully written or not at
    /// all from the caller's point of view. Overwrites an existing file of
    /// the same name.
    pub fn save(&self, name: &str, key: &[u8]) -> Result<PathBuf, KeyStoreError> {
        self.ensure_dir()?;
        let path = self.file_path(name);
        fs::write(&path, key).map_err(|e| KeyStoreError::io(&path, e))?;
        Ok(path)
    }

    /// Persist `key` under a freshly generated name.
    pub fn store_new_key(&self, key: &[u8]) -> Result<StoredKey, KeyStoreError> {
        let file_name = self.generated_file_name();
        let path = self.save(&file_name, key)?;
        Ok(StoredKey { file_name, path })
    }
}
