//! Fixed-point unit conversions between raw bus values and human-facing
//! imperial/metric units.
//!
//! The scaling factors and the multiply-then-divide order reproduce the
//! arithmetic of the bus firmware exactly. All divisions truncate. Do not
//! reorder the operations: `raw * 125 / 25744` and `raw / 25744 * 125`
//! round differently.

/// Right turn signal bit in the raw turn-signal bitmap.
pub const TURN_SIGNAL_RIGHT: u8 = 0x01;
/// Left turn signal bit in the raw turn-signal bitmap.
pub const TURN_SIGNAL_LEFT: u8 = 0x02;

const TURN_SIGNAL_MASK: u8 = TURN_SIGNAL_RIGHT | TURN_SIGNAL_LEFT;

/// Lowest valid gear reported on the bus.
pub const MIN_GEAR: u8 = 1;
/// Highest valid gear reported on the bus.
pub const MAX_GEAR: u8 = 6;

/// Rotations per minute. Raw unit is RPM x 4.
#[must_use]
pub fn rpm(raw: u32) -> u32 {
    raw / 4
}

/// Speed in mph from the internal speed unit.
#[must_use]
pub fn speed_mph(raw: u32) -> u32 {
    (u64::from(raw) * 125 / (16 * 1609)) as u32
}

/// Speed in km/h from the internal speed unit.
#[must_use]
pub fn speed_kmh(raw: u32) -> u32 {
    raw / 128
}

/// Engine temperature in Fahrenheit. Stored as-is on the bus.
#[must_use]
pub fn engine_temp_f(raw: i32) -> i32 {
    raw
}

/// Engine temperature in Celsius.
#[must_use]
pub fn engine_temp_c(raw: i32) -> i32 {
    (raw - 32) * 5 / 9
}

/// Trip odometer in miles x 100. One raw tick is 0.4 meters.
#[must_use]
pub fn odometer_mi_x100(raw: u32, baseline: u32) -> u32 {
    (u64::from(raw.wrapping_sub(baseline)) * 40 / 1609) as u32
}

/// Trip odometer in kilometers x 100.
#[must_use]
pub fn odometer_km_x100(raw: u32, baseline: u32) -> u32 {
    raw.wrapping_sub(baseline) / 25
}

/// Fuel consumed in fluid ounces. One raw tick is 0.000040 liters.
#[must_use]
pub fn fuel_fl_oz(raw: u32) -> u32 {
    (u64::from(raw) * 338 / 250_000) as u32
}

/// Fuel consumed in milliliters.
#[must_use]
pub fn fuel_ml(raw: u32) -> u32 {
    raw / 25
}

/// Letter code for the dump line: `W` both (hazard), `R` right, `L` left,
/// `x` none.
#[must_use]
pub fn turn_signal_code(raw: u8) -> char {
    if raw & TURN_SIGNAL_MASK == TURN_SIGNAL_MASK {
        'W'
    } else if raw & TURN_SIGNAL_RIGHT != 0 {
        'R'
    } else if raw & TURN_SIGNAL_LEFT != 0 {
        'L'
    } else {
        'x'
    }
}

/// Display character for the current gear; out-of-range gears read as `x`.
#[must_use]
pub fn gear_code(raw: u8) -> char {
    if (MIN_GEAR..=MAX_GEAR).contains(&raw) {
        char::from(b'0' + raw)
    } else {
        'x'
    }
}
