//! In-memory unit store

use super::{UnitDevice, VolumeError};

/// Unit store that keeps every allocation unit in memory
pub struct MemoryUnitStore {
    /// Units of data, each unit_size bytes
    units: Vec<Vec<u8>>,

    /// Size of each unit in bytes
    unit_size: usize,
}

impl MemoryUnitStore {
    /// Creates a zero-filled store with the given dimensions
    pub fn new(total_units: u16, unit_size: usize) -> Self {
        let units = (0..total_units).map(|_| vec![0; unit_size]).collect();
        Self { units, unit_size }
    }

    /// Validates the unit index is within bounds
    fn validate_index(&self, index: u16) -> Result<(), VolumeError> {
        if index as usize >= self.units.len() {
            return Err(VolumeError::OutOfRange(index));
        }
        Ok(())
    }

    /// Validates a block is exactly one unit long
    fn validate_block(&self, block: &[u8]) -> Result<(), VolumeError> {
        if block.len() != self.unit_size {
            return Err(VolumeError::BadBlockLen(block.len()));
        }
        Ok(())
    }
}

impl UnitDevice for MemoryUnitStore {
    /// Reads one unit into the buffer
    fn read_unit(&self, index: u16, buf: &mut [u8]) -> Result<(), VolumeError> {
        self.validate_index(index)?;
        self.validate_block(buf)?;
        buf.copy_from_slice(&self.units[index as usize]);
        Ok(())
    }

    /// Overwrites exactly one unit
    fn write_unit(&mut self, index: u16, block: &[u8]) -> Result<(), VolumeError> {
        self.validate_index(index)?;
        self.validate_block(block)?;
        self.units[index as usize].copy_from_slice(block);
        Ok(())
    }

    /// Returns the size of each unit
    fn unit_size(&self) -> usize {
        self.unit_size
    }

    /// Returns the total number of units
    fn total_units(&self) -> u16 {
        self.units.len() as u16
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_out_of_range_access() {
        let mut store = MemoryUnitStore::new(4, 16);
        let mut buf = [0u8; 16];
        assert_eq!(
            store.read_unit(4, &mut buf),
            Err(VolumeError::OutOfRange(4))
        );
        assert_eq!(store.write_unit(7, &buf), Err(VolumeError::OutOfRange(7)));
    }

    #[test]
    fn rejects_blocks_of_the_wrong_length() {
        let mut store = MemoryUnitStore::new(4, 16);
        assert_eq!(
            store.write_unit(0, &[0u8; 15]),
            Err(VolumeError::BadBlockLen(15))
        );
        assert_eq!(
            store.write_unit(0, &[0u8; 17]),
            Err(VolumeError::BadBlockLen(17))
        );

        let mut short = [0u8; 8];
        assert_eq!(
            store.read_unit(0, &mut short),
            Err(VolumeError::BadBlockLen(8))
        );
    }

    #[test]
    fn round_trips_a_unit() {
        let mut store = MemoryUnitStore::new(4, 4);
        store.write_unit(2, b"abcd").unwrap();

        let mut buf = [0u8; 4];
        store.read_unit(2, &mut buf).unwrap();
        assert_eq!(&buf, b"abcd");

        // neighbours stay zero-filled
        store.read_unit(1, &mut buf).unwrap();
        assert_eq!(&buf, &[0u8; 4]);
    }
}
