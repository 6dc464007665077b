use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::error::Error;

const STAGING_DIR: &str = "staging";

/// A blob written to the staging directory, not yet visible at its permanent
/// path. Promotion happens only after the owning database transaction commits.
#[derive(Debug, Clone)]
pub struct StagedFile {
    staging_path: PathBuf,
    final_path: PathBuf,
}

impl StagedFile {
    pub fn final_path(&self) -> &Path {
        &self.final_path
    }
}

pub trait FileStorer {
    fn stage(&self, content: &[u8], extension: &str) -> Result<StagedFile, Error>;
    fn promote(&self, staged: &StagedFile) -> Result<(), Error>;
    fn discard(&self, staged: &StagedFile) -> Result<(), Error>;
}

pub struct LocalStorer {
    root: PathBuf,
}

impl LocalStorer {
    pub fn new(root: &str) -> Self {
        Self { root: PathBuf::from(root) }
    }

    pub fn ensure_dirs(&self) -> Result<(), Error> {
        fs::create_dir_all(self.root.join(STAGING_DIR))?;
        Ok(())
    }
}

impl FileStorer for LocalStorer {
    fn stage(&self, content: &[u8], extension: &str) -> Result<StagedFile, Error> {
        let name = format!("{}.{}", Uuid::new_v4(), extension);
        let staging_path = self.root.join(STAGING_DIR).join(&name);
        let mut file = File::create(&staging_path)?;
        file.write_all(content)?;
        Ok(StagedFile {
            staging_path,
            final_path: self.root.join(name),
        })
    }

    fn promote(&self, staged: &StagedFile) -> Result<(), Error> {
        // same filesystem, so this is an atomic rename
        fs::rename(&staged.staging_path, &staged.final_path)?;
        Ok(())
    }

    fn discard(&self, staged: &StagedFile) -> Result<(), Error> {
        fs::remove_file(&staged.staging_path)?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn temp_storer() -> LocalStorer {
        let root = std::env::temp_dir().join(format!("intake-storer-{}", Uuid::new_v4()));
        let storer = LocalStorer::new(root.to_str().unwrap());
        storer.ensure_dirs().unwrap();
        storer
    }

    #[test]
    fn test_stage_then_promote() {
        let storer = temp_storer();
        let staged = storer.stage(b"%PDF-1.4", "pdf").unwrap();
        assert!(staged.staging_path.exists());
        assert!(!staged.final_path.exists());
        storer.promote(&staged).unwrap();
        assert!(!staged.staging_path.exists());
        assert_eq!(fs::read(staged.final_path()).unwrap(), b"%PDF-1.4");
    }

    #[test]
    fn test_stage_then_discard() {
        let storer = temp_storer();
        let staged = storer.stage(b"%PDF-1.4", "pdf").unwrap();
        storer.discard(&staged).unwrap();
        assert!(!staged.staging_path.exists());
        assert!(!staged.final_path.exists());
    }

    #[test]
    fn test_staged_names_are_unique() {
        let storer = temp_storer();
        let a = storer.stage(b"a", "pdf").unwrap();
        let b = storer.stage(b"b", "pdf").unwrap();
        assert_ne!(a.final_path(), b.final_path());
    }
}
