//! Volume geometry parameters

use super::VolumeError;
use crate::constants::{ALLOC_TABLE_UNITS, DIR_UNITS, TOTAL_UNITS, UNIT_SIZE};

/// Layout parameters of a volume, fixed at startup
#[derive(Debug, Clone, Copy)]
pub struct VolumeGeometry {
    /// Size of each allocation unit in bytes
    pub unit_size: usize,

    /// Total number of allocation units
    pub total_units: u16,

    /// Units reserved for the allocator table at the front of the device
    pub table_units: u16,

    /// Units reserved for directory storage after the allocator table
    pub dir_units: u16,
}

impl Default for VolumeGeometry {
    fn default() -> Self {
        Self {
            unit_size: UNIT_SIZE,
            total_units: TOTAL_UNITS,
            table_units: ALLOC_TABLE_UNITS,
            dir_units: DIR_UNITS,
        }
    }
}

impl VolumeGeometry {
    /// Checks that the layout leaves an allocatable pool
    pub fn validate(&self) -> Result<(), VolumeError> {
        if self.unit_size == 0 {
            return Err(VolumeError::InvalidGeometry("unit size must be non-zero"));
        }
        if self.table_units as u32 + self.dir_units as u32 >= self.total_units as u32 {
            return Err(VolumeError::InvalidGeometry(
                "reserved areas leave no allocatable pool",
            ));
        }
        Ok(())
    }

    /// First unit of the allocatable pool
    pub fn pool_start(&self) -> u16 {
        self.table_units + self.dir_units
    }

    /// Number of allocatable units
    pub fn pool_units(&self) -> u16 {
        self.total_units - self.pool_start()
    }

    /// Raw device capacity in bytes
    pub fn capacity(&self) -> usize {
        self.total_units as usize * self.unit_size
    }
}
