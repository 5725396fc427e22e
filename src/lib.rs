pub mod constants;
pub mod logging;
pub mod shell;
pub mod volume;

pub use volume::{Volume, VolumeError};
