//! The capability interface implemented by every change observer.

/// Receives change notifications from a [`VehicleData`](crate::VehicleData)
/// aggregate.
///
/// Every callback slot is present on the trait with a no-op default body;
/// a listener overrides the subset it cares about. Callbacks run
/// synchronously on the writer's thread and are expected to be fast and
/// non-blocking. Signals with two unit representations deliver the imperial
/// callback first, then the metric one.
pub trait VehicleDataListener: Send + Sync {
    /// Engine speed changed, in rotations per minute.
    fn on_rpm_changed(&self, _rpm: u32) {}

    /// Road speed changed, in mph.
    fn on_speed_imperial_changed(&self, _mph: u32) {}

    /// Road speed changed, in km/h.
    fn on_speed_metric_changed(&self, _kmh: u32) {}

    /// Engine temperature changed, in Fahrenheit.
    fn on_engine_temp_imperial_changed(&self, _temp_f: i32) {}

    /// Engine temperature changed, in Celsius.
    fn on_engine_temp_metric_changed(&self, _temp_c: i32) {}

    /// Fuel gauge changed: 0 (empty) to 6 (full).
    fn on_fuel_gauge_changed(&self, _gauge: u8) {}

    /// Turn signal bitmap changed: bit 0 right, bit 1 left.
    fn on_turn_signals_changed(&self, _signals: u8) {}

    /// Neutral indicator changed: true = transmission in neutral.
    fn on_neutral_changed(&self, _neutral: bool) {}

    /// Clutch indicator changed: true = clutch engaged.
    fn on_clutch_changed(&self, _clutch: bool) {}

    /// Current gear changed. Values outside 1..=6 are reported as stored.
    fn on_gear_changed(&self, _gear: u8) {}

    /// Check-engine lamp changed: true = lit.
    fn on_check_engine_changed(&self, _on: bool) {}

    /// Trip odometer changed, in miles x 100.
    fn on_odometer_imperial_changed(&self, _mi_x100: u32) {}

    /// Trip odometer changed, in kilometers x 100.
    fn on_odometer_metric_changed(&self, _km_x100: u32) {}

    /// Fuel consumed changed, in fluid ounces.
    fn on_fuel_imperial_changed(&self, _fl_oz: u32) {}

    /// Fuel consumed changed, in milliliters.
    fn on_fuel_metric_changed(&self, _ml: u32) {}

    /// A frame failed its CRC check. Raw bytes verbatim, delivered on every
    /// report, no change detection.
    fn on_bad_frame(&self, _frame: &[u8]) {}

    /// A frame decoded cleanly but was not recognized. Raw bytes verbatim,
    /// delivered on every report, no change detection.
    fn on_unknown_frame(&self, _frame: &[u8]) {}
}
