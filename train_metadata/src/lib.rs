pub mod cause_codes;
pub mod loader;
pub mod stations;

use crate::cause_codes::CauseCodeRegistry;
use crate::stations::StationRegistry;

/// Lookup tables loaded once at startup and shared read-only afterwards.
#[derive(Debug, Default, Clone)]
pub struct TrainMetadata {
    pub causes: CauseCodeRegistry,
    pub stations: StationRegistry,
}
