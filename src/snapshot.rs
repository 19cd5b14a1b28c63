//! Serializable point-in-time view of the aggregate.

use serde::{Deserialize, Serialize};

/// Every converted signal value at the moment [`VehicleData::snapshot`]
/// was called, plus the raw odometer/fuel tick counters.
///
/// Snapshots are always recomputed from the raw store; nothing here is
/// cached between calls. Used by the simulator for its JSON wire format and
/// by the CLI for display.
///
/// [`VehicleData::snapshot`]: crate::VehicleData::snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleSnapshot {
    pub rpm: u32,
    pub speed_mph: u32,
    pub speed_kmh: u32,
    pub engine_temp_f: i32,
    pub engine_temp_c: i32,
    pub fuel_gauge: u8,
    pub turn_signals: u8,
    pub neutral: bool,
    pub clutch: bool,
    pub gear: u8,
    pub check_engine: bool,
    pub odometer_mi_x100: u32,
    pub odometer_km_x100: u32,
    pub odometer_ticks: u32,
    pub fuel_fl_oz: u32,
    pub fuel_ml: u32,
    pub fuel_ticks: u32,
}
