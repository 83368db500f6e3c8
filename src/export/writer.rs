use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::foundation::error::{StageError, StageResult};

/// Destination for named export artifacts (PNG stills, the encoded animation).
pub trait ArtifactWriter {
    /// Persist `bytes` under the flat file name `name`.
    fn write(&mut self, name: &str, bytes: &[u8]) -> StageResult<()>;
}

fn check_name(name: &str) -> StageResult<()> {
    if name.is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\'])
    {
        return Err(StageError::validation(format!(
            "artifact name '{name}' must be a plain file name"
        )));
    }
    Ok(())
}

/// Writes artifacts into a directory, creating it on first write.
#[derive(Clone, Debug)]
pub struct DirWriter {
    root: PathBuf,
}

impl DirWriter {
    /// Writer rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Output directory.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ArtifactWriter for DirWriter {
    fn write(&mut self, name: &str, bytes: &[u8]) -> StageResult<()> {
        check_name(name)?;
        std::fs::create_dir_all(&self.root)
            .with_context(|| format!("create output directory '{}'", self.root.display()))?;
        let path = self.root.join(name);
        std::fs::write(&path, bytes).with_context(|| format!("write '{}'", path.display()))?;
        tracing::debug!(path = %path.display(), bytes = bytes.len(), "artifact written");
        Ok(())
    }
}

/// Keeps artifacts in memory, keyed by name.
#[derive(Clone, Debug, Default)]
pub struct MemoryWriter {
    files: BTreeMap<String, Vec<u8>>,
}

impl MemoryWriter {
    /// Empty writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes written under `name`.
    pub fn get(&self, name: &str) -> Option<&[u8]> {
        self.files.get(name).map(Vec::as_slice)
    }

    /// Names in lexical order.
    pub fn names(&self) -> Vec<&str> {
        self.files.keys().map(String::as_str).collect()
    }

    /// Number of artifacts.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// True when nothing was written.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Take ownership of the written artifacts.
    pub fn into_files(self) -> BTreeMap<String, Vec<u8>> {
        self.files
    }
}

impl ArtifactWriter for MemoryWriter {
    fn write(&mut self, name: &str, bytes: &[u8]) -> StageResult<()> {
        check_name(name)?;
        self.files.insert(name.to_owned(), bytes.to_vec());
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/writer.rs"]
mod tests;
