use std::io;

use anyhow::Result;
use log::info;

use ramvol::logging;
use ramvol::shell;
use ramvol::volume::{MemoryUnitStore, Volume, VolumeGeometry};

fn main() -> Result<()> {
    logging::init();

    let geometry = VolumeGeometry::default();
    let store = MemoryUnitStore::new(geometry.total_units, geometry.unit_size);
    let mut volume = Volume::format(Box::new(store), geometry)?;
    info!(
        "volume ready: {} units of {} bytes, {} free",
        geometry.total_units,
        geometry.unit_size,
        volume.free_units()
    );

    let stdin = io::stdin();
    shell::run(&mut volume, stdin.lock(), io::stdout())?;

    info!("shell terminated");
    Ok(())
}
