//! Allocation-unit state table and chain management

use log::error;

use super::{UnitDevice, VolumeError};

/// Per-unit allocation state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitState {
    /// Unit is unused and available
    Free,

    /// Unit belongs to the reserved allocator-table area
    ReservedTable,

    /// Unit belongs to the reserved directory area
    ReservedDir,

    /// Unit is part of a chain and points at the next unit
    Chained(u16),

    /// Unit terminates a chain
    EndOfChain,

    /// Unit is unusable
    Bad,
}

/// Ordered table of unit states plus the chain algorithms over it
///
/// The table length equals the device's unit count and never changes after
/// construction.
pub struct AllocTable {
    states: Vec<UnitState>,

    /// First unit eligible for allocation
    pool_start: u16,
}

impl AllocTable {
    /// Creates a table with the reserved areas marked and the pool free
    pub fn new(total_units: u16, table_units: u16, dir_units: u16) -> Self {
        let pool_start = table_units + dir_units;
        let states = (0..total_units)
            .map(|index| {
                if index < table_units {
                    UnitState::ReservedTable
                } else if index < pool_start {
                    UnitState::ReservedDir
                } else {
                    UnitState::Free
                }
            })
            .collect();
        Self { states, pool_start }
    }

    /// Returns the state of one unit
    pub fn state(&self, index: u16) -> UnitState {
        self.states[index as usize]
    }

    /// Returns the table length
    pub fn total_units(&self) -> u16 {
        self.states.len() as u16
    }

    /// Counts units currently free
    pub fn free_units(&self) -> usize {
        self.states
            .iter()
            .filter(|state| **state == UnitState::Free)
            .count()
    }

    /// Finds the first `count` free units in ascending index order.
    ///
    /// Allocation is first-fit at the lowest indices and therefore
    /// deterministic. The table is not modified; fewer than `count` free
    /// units is `InsufficientSpace`.
    pub fn find_free(&self, count: usize) -> Result<Vec<u16>, VolumeError> {
        let free: Vec<u16> = (self.pool_start..self.total_units())
            .filter(|&index| self.states[index as usize] == UnitState::Free)
            .take(count)
            .collect();
        if free.len() < count {
            return Err(VolumeError::InsufficientSpace);
        }
        Ok(free)
    }

    /// Writes `content` across `units` and links them into a chain.
    ///
    /// `content` must already be padded to exactly one block per unit. Every
    /// unit gets `Chained(next)` except the last, which becomes `EndOfChain`.
    /// Returns the first unit of the chain. Handing over units that are not
    /// free is a programming error, not a user-facing failure.
    pub fn allocate_chain(
        &mut self,
        dev: &mut dyn UnitDevice,
        units: &[u16],
        content: &[u8],
    ) -> Result<u16, VolumeError> {
        assert!(!units.is_empty(), "cannot allocate an empty chain");
        let unit_size = dev.unit_size();
        assert_eq!(
            content.len(),
            units.len() * unit_size,
            "content must be padded to a whole number of units"
        );
        for &unit in units {
            assert_eq!(
                self.states[unit as usize],
                UnitState::Free,
                "unit {} is not free",
                unit
            );
        }

        for (i, &unit) in units.iter().enumerate() {
            dev.write_unit(unit, &content[i * unit_size..(i + 1) * unit_size])?;
            self.states[unit as usize] = match units.get(i + 1) {
                Some(&next) => UnitState::Chained(next),
                None => UnitState::EndOfChain,
            };
        }

        Ok(units[0])
    }

    /// Releases every unit of the chain starting at `start`.
    ///
    /// Returns the number of units freed. The chain is walked up front, so a
    /// corrupt chain leaves the table untouched.
    pub fn free_chain(&mut self, start: u16) -> Result<usize, VolumeError> {
        let units = self.chain_units(start)?;
        for &unit in &units {
            self.states[unit as usize] = UnitState::Free;
        }
        Ok(units.len())
    }

    /// Reads and concatenates every block of the chain starting at `start`.
    ///
    /// The result includes any padding in the final unit; callers truncate to
    /// the recorded file size.
    pub fn read_chain(&self, dev: &dyn UnitDevice, start: u16) -> Result<Vec<u8>, VolumeError> {
        let units = self.chain_units(start)?;
        let unit_size = dev.unit_size();

        let mut content = Vec::with_capacity(units.len() * unit_size);
        let mut block = vec![0u8; unit_size];
        for &unit in &units {
            dev.read_unit(unit, &mut block)?;
            content.extend_from_slice(&block);
        }
        Ok(content)
    }

    /// Collects the chain's units from `start` through its end marker.
    ///
    /// The walk is bounded by the table length so a cyclic chain is reported
    /// as `CorruptChain` instead of looping forever; the same goes for a link
    /// that lands on a free, reserved or out-of-range unit.
    pub(crate) fn chain_units(&self, start: u16) -> Result<Vec<u16>, VolumeError> {
        let mut units = Vec::new();
        let mut current = start;
        for _ in 0..self.total_units() {
            match self.states.get(current as usize) {
                Some(UnitState::Chained(next)) => {
                    units.push(current);
                    current = *next;
                }
                Some(UnitState::EndOfChain) => {
                    units.push(current);
                    return Ok(units);
                }
                _ => {
                    error!(
                        "chain from unit {} hit unit {} in a non-chain state",
                        start, current
                    );
                    return Err(VolumeError::CorruptChain);
                }
            }
        }
        error!("chain from unit {} exceeded the unit count", start);
        Err(VolumeError::CorruptChain)
    }

    #[cfg(test)]
    pub(crate) fn set_state(&mut self, index: u16, state: UnitState) {
        self.states[index as usize] = state;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::volume::MemoryUnitStore;

    // 2 table units, 1 directory unit, 5 pool units of 4 bytes
    fn small_table() -> (AllocTable, MemoryUnitStore) {
        (AllocTable::new(8, 2, 1), MemoryUnitStore::new(8, 4))
    }

    #[test]
    fn reserved_areas_are_marked_at_construction() {
        let (table, _) = small_table();
        assert_eq!(table.state(0), UnitState::ReservedTable);
        assert_eq!(table.state(1), UnitState::ReservedTable);
        assert_eq!(table.state(2), UnitState::ReservedDir);
        assert_eq!(table.state(3), UnitState::Free);
        assert_eq!(table.state(7), UnitState::Free);
        assert_eq!(table.free_units(), 5);
    }

    #[test]
    fn find_free_is_first_fit_ascending() {
        let (mut table, mut store) = small_table();
        assert_eq!(table.find_free(2).unwrap(), vec![3, 4]);

        table.allocate_chain(&mut store, &[3, 4], &[0u8; 8]).unwrap();
        // the next request skips the chained units
        assert_eq!(table.find_free(2).unwrap(), vec![5, 6]);
    }

    #[test]
    fn find_free_reports_insufficient_space_without_mutation() {
        let (table, _) = small_table();
        assert_eq!(table.find_free(6), Err(VolumeError::InsufficientSpace));
        assert_eq!(table.free_units(), 5);
    }

    #[test]
    fn allocate_chain_links_and_terminates() {
        let (mut table, mut store) = small_table();
        let start = table
            .allocate_chain(&mut store, &[3, 5, 6], b"abcdefghijkl")
            .unwrap();
        assert_eq!(start, 3);
        assert_eq!(table.state(3), UnitState::Chained(5));
        assert_eq!(table.state(5), UnitState::Chained(6));
        assert_eq!(table.state(6), UnitState::EndOfChain);
        assert_eq!(table.state(4), UnitState::Free);
    }

    #[test]
    fn read_chain_concatenates_blocks_in_chain_order() {
        let (mut table, mut store) = small_table();
        table
            .allocate_chain(&mut store, &[3, 5], b"abcdefgh")
            .unwrap();
        assert_eq!(table.read_chain(&store, 3).unwrap(), b"abcdefgh".to_vec());
    }

    #[test]
    fn free_chain_returns_every_unit_to_the_pool() {
        let (mut table, mut store) = small_table();
        table
            .allocate_chain(&mut store, &[3, 4, 5], &[7u8; 12])
            .unwrap();
        assert_eq!(table.free_chain(3).unwrap(), 3);
        assert_eq!(table.free_units(), 5);
        assert_eq!(table.state(4), UnitState::Free);
    }

    #[test]
    fn cyclic_chains_are_reported_not_walked_forever() {
        let (mut table, mut store) = small_table();
        table.allocate_chain(&mut store, &[3, 4], &[0u8; 8]).unwrap();

        // corrupt the tail to point back at the head
        table.set_state(4, UnitState::Chained(3));
        assert_eq!(table.free_chain(3), Err(VolumeError::CorruptChain));
    }

    #[test]
    fn links_onto_non_chain_states_are_corrupt() {
        let (mut table, mut store) = small_table();
        table.allocate_chain(&mut store, &[3], &[0u8; 4]).unwrap();

        // dangling link into a free unit
        table.set_state(3, UnitState::Chained(4));
        assert_eq!(table.read_chain(&store, 3), Err(VolumeError::CorruptChain));

        // link past the end of the device
        table.set_state(3, UnitState::Chained(100));
        assert_eq!(table.free_chain(3), Err(VolumeError::CorruptChain));
    }
}
