//! Filesystem-backed key source

use crate::error::Result;
use crate::KeySource;

use std::fs;
use std::io;
use std::path::PathBuf;

/// A key source reading PEM files from a directory
///
/// Resource names are file names relative to the base directory. A
/// missing file is an absent key, not an error.
#[derive(Debug, Clone)]
pub struct FileKeySource {
    base_dir: PathBuf,
}

impl FileKeySource {
    /// Creates a source rooted at the given directory
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    fn path_for(&self, name: &str) -> PathBuf {
        self.base_dir.join(name)
    }
}

impl KeySource for FileKeySource {
    fn read(&self, name: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.path_for(name)) {
            Ok(pem) => Ok(Some(pem)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::debug!("no key file {} under {}", name, self.base_dir.display());
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, name: &str, pem: &str) -> Result<()> {
        let path = self.path_for(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(path, pem)?;
        Ok(())
    }
}
