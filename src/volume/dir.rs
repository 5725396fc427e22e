//! Directory entries and the root directory table

use super::VolumeError;
use crate::constants::{MAX_EXT_LENGTH, MAX_NAME_LENGTH};

/// Packs a field into a fixed-width, space-padded byte array, truncating
/// anything beyond the width
fn pack<const N: usize>(field: &str) -> [u8; N] {
    let mut packed = [0x20u8; N];
    let bytes = field.as_bytes();
    let len = bytes.len().min(N);
    packed[..len].copy_from_slice(&bytes[..len]);
    packed
}

/// A directory entry with fixed-width name fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileEntry {
    /// File name, space padded
    name: [u8; MAX_NAME_LENGTH],

    /// Extension, space padded
    ext: [u8; MAX_EXT_LENGTH],

    /// File size in bytes
    pub size: u16,

    /// First unit of the file's chain, meaningful only when `size > 0`
    pub start_unit: u16,

    /// Attribute byte
    pub attr: u8,
}

impl FileEntry {
    /// Creates an entry, truncating the name fields to their fixed widths
    pub fn new(name: &str, ext: &str, size: u16, start_unit: u16, attr: u8) -> Self {
        Self {
            name: pack(name),
            ext: pack(ext),
            size,
            start_unit,
            attr,
        }
    }

    /// Replaces the name fields, applying the same truncation as creation
    pub fn set_key(&mut self, name: &str, ext: &str) {
        self.name = pack(name);
        self.ext = pack(ext);
    }

    /// Returns true if the entry is keyed by the given name and extension
    pub fn matches(&self, name: &str, ext: &str) -> bool {
        self.name == pack::<MAX_NAME_LENGTH>(name) && self.ext == pack::<MAX_EXT_LENGTH>(ext)
    }

    /// Returns the composed `name.ext` form
    pub fn file_name(&self) -> String {
        let name_end = self
            .name
            .iter()
            .position(|&b| b == 0x20)
            .unwrap_or(MAX_NAME_LENGTH);
        let ext_end = self
            .ext
            .iter()
            .position(|&b| b == 0x20)
            .unwrap_or(MAX_EXT_LENGTH);

        let name = core::str::from_utf8(&self.name[..name_end]).unwrap_or("");
        let ext = core::str::from_utf8(&self.ext[..ext_end]).unwrap_or("");
        format!("{}.{}", name, ext)
    }
}

/// Insertion-ordered table of live directory entries
///
/// No two live entries ever share a (name, extension) key.
#[derive(Default)]
pub struct DirectoryTable {
    entries: Vec<FileEntry>,
}

impl DirectoryTable {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Linear scan for the entry with the given key
    pub fn find(&self, name: &str, ext: &str) -> Option<&FileEntry> {
        self.entries.iter().find(|entry| entry.matches(name, ext))
    }

    fn position(&self, name: &str, ext: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|entry| entry.matches(name, ext))
    }

    /// Appends an entry; fails if its key is already present
    pub fn insert(&mut self, entry: FileEntry) -> Result<(), VolumeError> {
        if self
            .entries
            .iter()
            .any(|existing| existing.name == entry.name && existing.ext == entry.ext)
        {
            return Err(VolumeError::AlreadyExists);
        }
        self.entries.push(entry);
        Ok(())
    }

    /// Removes and returns the entry with the given key, preserving the
    /// relative order of the remaining entries
    pub fn remove(&mut self, name: &str, ext: &str) -> Result<FileEntry, VolumeError> {
        let index = self.position(name, ext).ok_or(VolumeError::NotFound)?;
        Ok(self.entries.remove(index))
    }

    /// Renames an entry in place.
    ///
    /// Fails if the old key is absent, or if the new key already names a
    /// different live entry. The new fields get the same truncation as entry
    /// creation.
    pub fn rename(&mut self, old: (&str, &str), new: (&str, &str)) -> Result<(), VolumeError> {
        let index = self.position(old.0, old.1).ok_or(VolumeError::NotFound)?;
        if let Some(existing) = self.position(new.0, new.1) {
            if existing != index {
                return Err(VolumeError::AlreadyExists);
            }
        }
        self.entries[index].set_key(new.0, new.1);
        Ok(())
    }

    /// Iterates entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &FileEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncates_name_fields_at_creation() {
        let entry = FileEntry::new("longfilename", "text", 0, 0, 0);
        assert_eq!(entry.file_name(), "longfile.tex");
        assert!(entry.matches("longfilename", "text"));
        assert!(entry.matches("longfile", "tex"));
    }

    #[test]
    fn insert_rejects_duplicate_keys() {
        let mut dir = DirectoryTable::new();
        dir.insert(FileEntry::new("a", "b", 1, 3, 0)).unwrap();
        assert_eq!(
            dir.insert(FileEntry::new("a", "b", 9, 7, 0)),
            Err(VolumeError::AlreadyExists)
        );
        assert_eq!(dir.len(), 1);
    }

    #[test]
    fn keys_collide_after_truncation() {
        let mut dir = DirectoryTable::new();
        dir.insert(FileEntry::new("churchill", "txt", 0, 0, 0))
            .unwrap();
        assert_eq!(
            dir.insert(FileEntry::new("churchilliana", "txt", 0, 0, 0)),
            Err(VolumeError::AlreadyExists)
        );
    }

    #[test]
    fn remove_preserves_the_order_of_survivors() {
        let mut dir = DirectoryTable::new();
        for name in ["one", "two", "three"] {
            dir.insert(FileEntry::new(name, "txt", 0, 0, 0)).unwrap();
        }
        dir.remove("two", "txt").unwrap();

        let names: Vec<String> = dir.iter().map(|entry| entry.file_name()).collect();
        assert_eq!(names, vec!["one.txt", "three.txt"]);
        assert_eq!(dir.remove("two", "txt"), Err(VolumeError::NotFound));
    }

    #[test]
    fn rename_revalidates_key_and_widths() {
        let mut dir = DirectoryTable::new();
        dir.insert(FileEntry::new("first", "txt", 0, 0, 0)).unwrap();
        dir.insert(FileEntry::new("second", "txt", 0, 0, 0)).unwrap();

        assert_eq!(
            dir.rename(("first", "txt"), ("second", "txt")),
            Err(VolumeError::AlreadyExists)
        );
        assert_eq!(
            dir.rename(("missing", "txt"), ("x", "y")),
            Err(VolumeError::NotFound)
        );

        dir.rename(("first", "txt"), ("muchlongername", "text"))
            .unwrap();
        assert_eq!(
            dir.find("muchlongername", "text").unwrap().file_name(),
            "muchlong.tex"
        );
    }

    #[test]
    fn rename_to_the_same_key_is_allowed() {
        let mut dir = DirectoryTable::new();
        dir.insert(FileEntry::new("same", "txt", 4, 9, 0)).unwrap();
        dir.rename(("same", "txt"), ("same", "txt")).unwrap();
        assert_eq!(dir.len(), 1);
        assert_eq!(dir.find("same", "txt").unwrap().start_unit, 9);
    }
}
