use std::io::ErrorKind;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::warn;
use uuid::Uuid;

/// Client-side store for the resumability token. Holds the id of the
/// record being onboarded; absent when no onboarding is in progress.
pub struct TokenFile {
    path: PathBuf,
}

impl TokenFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// A token that does not parse is discarded.
    pub fn load(&self) -> Result<Option<Uuid>> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e).with_context(|| format!("reading {}", self.path.display()));
            }
        };

        match raw.trim().parse() {
            Ok(id) => Ok(Some(id)),
            Err(e) => {
                warn!("Discarding unreadable token in {}: {}", self.path.display(), e);
                self.clear()?;
                Ok(None)
            }
        }
    }

    pub fn store(&self, id: Uuid) -> Result<()> {
        std::fs::write(&self.path, id.to_string())
            .with_context(|| format!("writing {}", self.path.display()))
    }

    pub fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("removing {}", self.path.display())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_load_clear() {
        let dir = tempfile::tempdir().unwrap();
        let tokens = TokenFile::new(dir.path().join("token"));
        assert_eq!(tokens.load().unwrap(), None);

        let id = Uuid::new_v4();
        tokens.store(id).unwrap();
        assert_eq!(tokens.load().unwrap(), Some(id));

        tokens.clear().unwrap();
        tokens.clear().unwrap();
        assert_eq!(tokens.load().unwrap(), None);
    }

    #[test]
    fn garbage_is_discarded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token");
        std::fs::write(&path, "not a uuid").unwrap();

        let tokens = TokenFile::new(&path);
        assert_eq!(tokens.load().unwrap(), None);
        assert!(!path.exists());
    }
}
