//! In-memory volume simulation
//!
//! The volume aggregate owns the unit store, the allocation table and the
//! root directory, and orchestrates them into the user-facing operations.
//! The directory never touches storage directly; all unit traffic goes
//! through the allocation table.

use log::debug;
use thiserror::Error;

mod alloc;
mod dir;
mod geometry;
mod storage;

pub use alloc::{AllocTable, UnitState};
pub use dir::{DirectoryTable, FileEntry};
pub use geometry::VolumeGeometry;
pub use storage::MemoryUnitStore;

/// Errors surfaced by volume operations
///
/// Every operation either succeeds and mutates state, or fails with one of
/// these and leaves the volume unchanged. `CorruptChain` is the exception:
/// it reports a broken internal invariant rather than a user mistake.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum VolumeError {
    #[error("file not found")]
    NotFound,

    #[error("file already exists")]
    AlreadyExists,

    #[error("not enough free units")]
    InsufficientSpace,

    #[error("unit index {0} is out of range")]
    OutOfRange(u16),

    #[error("block of {0} bytes does not match the unit size")]
    BadBlockLen(usize),

    #[error("allocation chain is corrupt")]
    CorruptChain,

    #[error("invalid volume geometry: {0}")]
    InvalidGeometry(&'static str),
}

/// A device addressed at allocation-unit granularity
pub trait UnitDevice: Send + Sync {
    fn read_unit(&self, index: u16, buf: &mut [u8]) -> Result<(), VolumeError>;
    fn write_unit(&mut self, index: u16, block: &[u8]) -> Result<(), VolumeError>;
    fn unit_size(&self) -> usize;
    fn total_units(&self) -> u16;
}

/// A listing row produced by [`Volume::list`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListEntry {
    pub name: String,
    pub size: u16,
}

/// The volume aggregate: unit store, allocation table and root directory
pub struct Volume {
    device: Box<dyn UnitDevice>,
    geometry: VolumeGeometry,
    table: AllocTable,
    directory: DirectoryTable,
}

impl Volume {
    /// Builds a freshly formatted volume on the given device
    pub fn format(
        device: Box<dyn UnitDevice>,
        geometry: VolumeGeometry,
    ) -> Result<Self, VolumeError> {
        geometry.validate()?;
        if device.total_units() != geometry.total_units || device.unit_size() != geometry.unit_size
        {
            return Err(VolumeError::InvalidGeometry(
                "device dimensions do not match",
            ));
        }

        let table = AllocTable::new(
            geometry.total_units,
            geometry.table_units,
            geometry.dir_units,
        );
        Ok(Self {
            device,
            geometry,
            table,
            directory: DirectoryTable::new(),
        })
    }

    pub fn geometry(&self) -> &VolumeGeometry {
        &self.geometry
    }

    /// Read-only view of the allocation-state table
    pub fn alloc_table(&self) -> &AllocTable {
        &self.table
    }

    /// Number of units currently free
    pub fn free_units(&self) -> usize {
        self.table.free_units()
    }

    /// Looks up a directory entry
    pub fn find(&self, name: &str, ext: &str) -> Option<&FileEntry> {
        self.directory.find(name, ext)
    }

    /// Creates a file holding `content`.
    ///
    /// Fails with `AlreadyExists` before anything is allocated, and with
    /// `InsufficientSpace` before the directory is touched.
    pub fn create(&mut self, name: &str, ext: &str, content: &[u8]) -> Result<(), VolumeError> {
        assert!(
            content.len() <= u16::MAX as usize,
            "file size exceeds the entry field"
        );
        if self.directory.find(name, ext).is_some() {
            return Err(VolumeError::AlreadyExists);
        }

        let size = content.len() as u16;
        let start_unit = self.store_chain(content)?;
        let entry = FileEntry::new(name, ext, size, start_unit, 0);
        let file_name = entry.file_name();
        self.directory.insert(entry)?;
        debug!("created {} ({} bytes)", file_name, size);
        Ok(())
    }

    /// Deletes a file, returning its chain to the free pool
    pub fn delete(&mut self, name: &str, ext: &str) -> Result<(), VolumeError> {
        let entry = *self.directory.find(name, ext).ok_or(VolumeError::NotFound)?;
        if entry.size > 0 {
            self.table.free_chain(entry.start_unit)?;
        }
        self.directory.remove(name, ext)?;
        debug!("deleted {}", entry.file_name());
        Ok(())
    }

    /// Renames a file in place, re-applying the fixed-width truncation and
    /// refusing a destination key that already names another entry
    pub fn rename(&mut self, old: (&str, &str), new: (&str, &str)) -> Result<(), VolumeError> {
        self.directory.rename(old, new)?;
        debug!("renamed {}.{} to {}.{}", old.0, old.1, new.0, new.1);
        Ok(())
    }

    /// Reads a file's full content, truncated to its recorded size
    pub fn read(&self, name: &str, ext: &str) -> Result<Vec<u8>, VolumeError> {
        let entry = self.directory.find(name, ext).ok_or(VolumeError::NotFound)?;
        if entry.size == 0 {
            return Ok(Vec::new());
        }
        let mut content = self.table.read_chain(&*self.device, entry.start_unit)?;
        content.truncate(entry.size as usize);
        Ok(content)
    }

    /// Duplicates a file into a fresh chain.
    ///
    /// The copy is physical: the new file owns units fully disjoint from the
    /// source's chain.
    pub fn duplicate(&mut self, src: (&str, &str), dest: (&str, &str)) -> Result<(), VolumeError> {
        let entry = *self
            .directory
            .find(src.0, src.1)
            .ok_or(VolumeError::NotFound)?;
        if self.directory.find(dest.0, dest.1).is_some() {
            return Err(VolumeError::AlreadyExists);
        }

        let content = self.read(src.0, src.1)?;
        let start_unit = self.store_chain(&content)?;
        let copy = FileEntry::new(dest.0, dest.1, entry.size, start_unit, 0);
        let file_name = copy.file_name();
        self.directory.insert(copy)?;
        debug!("copied {} to {}", entry.file_name(), file_name);
        Ok(())
    }

    /// Lists entries in insertion order
    pub fn list(&self) -> Vec<ListEntry> {
        self.directory
            .iter()
            .map(|entry| ListEntry {
                name: entry.file_name(),
                size: entry.size,
            })
            .collect()
    }

    /// Allocates and writes a fresh chain for `content`, zero-padding the
    /// final block; zero-size content allocates nothing
    fn store_chain(&mut self, content: &[u8]) -> Result<u16, VolumeError> {
        let unit_size = self.geometry.unit_size;
        let needed = content.len().div_ceil(unit_size);
        if needed == 0 {
            return Ok(0);
        }

        let units = self.table.find_free(needed)?;
        let mut padded = content.to_vec();
        padded.resize(needed * unit_size, 0);
        self.table
            .allocate_chain(&mut *self.device, &units, &padded)
    }
}
