//! # Memory Snapshots
//!
//! Copies a live address range into a uniquely-named file so the array can
//! be rebuilt from a stable copy while the host keeps control of the
//! process.
//!
//! Snapshot files are persisted and never deleted by this crate; cleaning
//! the temp directory is left to the OS.

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::Builder;

use crate::config::SnapshotConfig;
use crate::error::Result;
use crate::memory::MemorySource;
use crate::types::Address;

/// An immutable on-disk copy of `len` bytes taken at `address`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemorySnapshot
{
    path: PathBuf,
    address: Address,
    len: usize,
}

impl MemorySnapshot
{
    /// Read `len` bytes at `address` and persist them to a new temp file
    ///
    /// ## Errors
    ///
    /// - `MemoryRead` / `Unsupported` from the memory source
    /// - `Io` if the temp file cannot be created or written
    pub fn capture(source: &dyn MemorySource, address: Address, len: usize, config: &SnapshotConfig) -> Result<Self>
    {
        let bytes = source.read_memory(address, len)?;
        let path = persist_temp(config, ".bin", &bytes)?;
        tracing::debug!(%address, len, path = %path.display(), "captured memory snapshot");
        Ok(MemorySnapshot { path, address, len })
    }

    pub fn path(&self) -> &Path
    {
        &self.path
    }

    pub fn address(&self) -> Address
    {
        self.address
    }

    pub fn len(&self) -> usize
    {
        self.len
    }

    pub fn is_empty(&self) -> bool
    {
        self.len == 0
    }

    /// Read the captured bytes back
    pub fn read(&self) -> Result<Vec<u8>>
    {
        Ok(std::fs::read(&self.path)?)
    }
}

/// Create a kept temp file with the configured prefix and write `bytes` into it
pub(crate) fn persist_temp(config: &SnapshotConfig, suffix: &str, bytes: &[u8]) -> Result<PathBuf>
{
    let (mut file, path) = new_temp(config, suffix)?;
    file.write_all(bytes)?;
    file.flush()?;
    Ok(path)
}

/// Create an empty kept temp file, returning the open handle and its path
pub(crate) fn new_temp(config: &SnapshotConfig, suffix: &str) -> Result<(std::fs::File, PathBuf)>
{
    let dir = config.dir();
    std::fs::create_dir_all(&dir)?;
    let temp = Builder::new().prefix(&config.prefix).suffix(suffix).tempfile_in(&dir)?;
    let (file, path) = temp.keep().map_err(|err| err.error)?;
    Ok((file, path))
}

#[cfg(test)]
mod tests
{
    use super::*;
    use crate::error::MemplotError;
    use crate::memory::SliceMemory;

    fn config_in(dir: &Path) -> SnapshotConfig
    {
        SnapshotConfig {
            temp_dir: Some(dir.to_path_buf()),
            prefix: "snap_".to_string(),
        }
    }

    #[test]
    fn test_capture_writes_exact_bytes()
    {
        let dir = tempfile::tempdir().unwrap();
        let memory = SliceMemory::new(Address::new(0x4000), (0u8..64).collect());

        let snapshot = MemorySnapshot::capture(&memory, Address::new(0x4010), 8, &config_in(dir.path())).unwrap();

        assert_eq!(snapshot.len(), 8);
        assert_eq!(snapshot.read().unwrap(), (16u8..24).collect::<Vec<_>>());
        assert!(snapshot.path().starts_with(dir.path()));
        let name = snapshot.path().file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("snap_"));
    }

    #[test]
    fn test_each_capture_gets_its_own_file()
    {
        let dir = tempfile::tempdir().unwrap();
        let memory = SliceMemory::new(Address::ZERO, vec![7; 4]);
        let config = config_in(dir.path());

        let first = MemorySnapshot::capture(&memory, Address::ZERO, 4, &config).unwrap();
        let second = MemorySnapshot::capture(&memory, Address::ZERO, 4, &config).unwrap();
        assert_ne!(first.path(), second.path());
    }

    #[test]
    fn test_failed_read_leaves_no_file()
    {
        let dir = tempfile::tempdir().unwrap();
        let memory = SliceMemory::new(Address::ZERO, vec![0; 4]);

        let result = MemorySnapshot::capture(&memory, Address::ZERO, 8, &config_in(dir.path()));
        assert!(matches!(result, Err(MemplotError::MemoryRead { .. })));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
