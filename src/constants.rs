//! System-wide constants for the simulated volume.

/// Size of one allocation unit in bytes.
pub const UNIT_SIZE: usize = 16;

/// Total number of allocation units on the device.
pub const TOTAL_UNITS: u16 = 4096;

/// Units reserved at the front of the device for the allocator table.
pub const ALLOC_TABLE_UNITS: u16 = 512;

/// Units reserved after the allocator table for directory storage.
pub const DIR_UNITS: u16 = 64;

/// Maximum length of a file name excluding extension.
pub const MAX_NAME_LENGTH: usize = 8;

/// Maximum length of a file extension.
pub const MAX_EXT_LENGTH: usize = 3;
