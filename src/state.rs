//! The live state aggregate: latest raw value of every bus signal, change
//! detection, and notification dispatch.

use std::fmt;
use std::fmt::Write as _;
use std::sync::atomic::{AtomicBool, AtomicI32, AtomicU32, AtomicU8, Ordering};
use std::sync::{Mutex, PoisonError};

use arrayvec::ArrayString;
use tracing::{debug, trace};

use crate::diagnostics::{FrameKind, FrameLog, FrameRecord};
use crate::registry::{ListenerHandle, ListenerRegistry};
use crate::snapshot::VehicleSnapshot;
use crate::units;

pub const MAX_DUMP_SIZE: usize = 128;

/// Fixed-size buffer holding the single-line textual dump.
pub type DumpBuffer = ArrayString<MAX_DUMP_SIZE>;

/// Single source of truth for the decoded vehicle signals.
///
/// The decoder writes raw values through the `set_*` accessors; presentation
/// and logging collaborators register a [`VehicleDataListener`] and read
/// through the unit-converted accessors. A write that does not change the
/// stored raw value is a no-op: no state change, no notification.
///
/// Each signal lives in its own atomic cell, so writes to distinct signals
/// may come from different threads without external locking. Writes to the
/// same signal must be serialized by the producer. Dispatch is synchronous:
/// a write accessor returns only after every listener has been invoked.
///
/// [`VehicleDataListener`]: crate::VehicleDataListener
#[derive(Debug, Default)]
pub struct VehicleData {
    // Raw values as reported in the bus stream.
    rpm: AtomicU32,           // RPM x 4
    speed: AtomicU32,         // internal speed unit
    engine_temp: AtomicI32,   // Fahrenheit
    fuel_gauge: AtomicU8,     // 0 (empty) to 6 (full)
    turn_signals: AtomicU8,   // bit 0 right, bit 1 left
    neutral: AtomicBool,
    clutch: AtomicBool,
    gear: AtomicU8,           // 1 to 6 when valid
    check_engine: AtomicBool,
    odometer: AtomicU32,      // ticks, 1 tick = 0.4 m
    fuel: AtomicU32,          // ticks, 1 tick = 0.000040 L
    odometer_baseline: AtomicU32,

    listeners: ListenerRegistry,
    frame_log: Mutex<FrameLog>,
}

impl VehicleData {
    /// Creates an aggregate with every raw field at its zero default and no
    /// listeners registered.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_listener(&self, listener: ListenerHandle) {
        self.listeners.register(listener);
    }

    pub fn unregister_listener(&self, listener: &ListenerHandle) {
        self.listeners.unregister(listener);
    }

    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    // --- engine speed ---

    /// Rotations per minute.
    #[must_use]
    pub fn rpm(&self) -> u32 {
        units::rpm(self.rpm.load(Ordering::Acquire))
    }

    pub fn set_rpm(&self, raw: u32) {
        let old = self.rpm.swap(raw, Ordering::AcqRel);
        if old == raw {
            trace!(raw, "rpm unchanged, dispatch suppressed");
            return;
        }
        let rpm = units::rpm(raw);
        debug!(rpm, "rpm changed");
        self.listeners.dispatch(|l| l.on_rpm_changed(rpm));
    }

    // --- road speed ---

    /// Speed in mph.
    #[must_use]
    pub fn speed_imperial(&self) -> u32 {
        units::speed_mph(self.speed.load(Ordering::Acquire))
    }

    /// Speed in km/h.
    #[must_use]
    pub fn speed_metric(&self) -> u32 {
        units::speed_kmh(self.speed.load(Ordering::Acquire))
    }

    pub fn set_speed(&self, raw: u32) {
        let old = self.speed.swap(raw, Ordering::AcqRel);
        if old == raw {
            trace!(raw, "speed unchanged, dispatch suppressed");
            return;
        }
        let mph = units::speed_mph(raw);
        let kmh = units::speed_kmh(raw);
        debug!(mph, kmh, "speed changed");
        self.listeners.dispatch(|l| {
            l.on_speed_imperial_changed(mph);
            l.on_speed_metric_changed(kmh);
        });
    }

    // --- engine temperature ---

    /// Engine temperature in Fahrenheit.
    #[must_use]
    pub fn engine_temp_imperial(&self) -> i32 {
        units::engine_temp_f(self.engine_temp.load(Ordering::Acquire))
    }

    /// Engine temperature in Celsius.
    #[must_use]
    pub fn engine_temp_metric(&self) -> i32 {
        units::engine_temp_c(self.engine_temp.load(Ordering::Acquire))
    }

    pub fn set_engine_temp(&self, raw: i32) {
        let old = self.engine_temp.swap(raw, Ordering::AcqRel);
        if old == raw {
            trace!(raw, "engine temp unchanged, dispatch suppressed");
            return;
        }
        let temp_f = units::engine_temp_f(raw);
        let temp_c = units::engine_temp_c(raw);
        debug!(temp_f, temp_c, "engine temp changed");
        self.listeners.dispatch(|l| {
            l.on_engine_temp_imperial_changed(temp_f);
            l.on_engine_temp_metric_changed(temp_c);
        });
    }

    // --- fuel gauge ---

    /// Fuel gauge reading: 0 (empty) to 6 (full).
    #[must_use]
    pub fn fuel_gauge(&self) -> u8 {
        self.fuel_gauge.load(Ordering::Acquire)
    }

    pub fn set_fuel_gauge(&self, raw: u8) {
        let old = self.fuel_gauge.swap(raw, Ordering::AcqRel);
        if old == raw {
            return;
        }
        debug!(gauge = raw, "fuel gauge changed");
        self.listeners.dispatch(|l| l.on_fuel_gauge_changed(raw));
    }

    // --- turn signals ---

    /// Turn signal bitmap: bit 0 right, bit 1 left.
    #[must_use]
    pub fn turn_signals(&self) -> u8 {
        self.turn_signals.load(Ordering::Acquire)
    }

    pub fn set_turn_signals(&self, raw: u8) {
        let old = self.turn_signals.swap(raw, Ordering::AcqRel);
        if old == raw {
            return;
        }
        debug!(signals = raw, "turn signals changed");
        self.listeners.dispatch(|l| l.on_turn_signals_changed(raw));
    }

    // --- neutral ---

    /// True when the transmission is in neutral.
    #[must_use]
    pub fn neutral(&self) -> bool {
        self.neutral.load(Ordering::Acquire)
    }

    pub fn set_neutral(&self, raw: bool) {
        let old = self.neutral.swap(raw, Ordering::AcqRel);
        if old == raw {
            return;
        }
        debug!(neutral = raw, "neutral changed");
        self.listeners.dispatch(|l| l.on_neutral_changed(raw));
    }

    // --- clutch ---

    /// True when the clutch is engaged.
    #[must_use]
    pub fn clutch(&self) -> bool {
        self.clutch.load(Ordering::Acquire)
    }

    pub fn set_clutch(&self, raw: bool) {
        let old = self.clutch.swap(raw, Ordering::AcqRel);
        if old == raw {
            return;
        }
        debug!(clutch = raw, "clutch changed");
        self.listeners.dispatch(|l| l.on_clutch_changed(raw));
    }

    // --- gear ---

    /// Current gear as stored. Valid range is 1..=6; anything else means
    /// "unknown" and is rendered as `x` in the dump line.
    #[must_use]
    pub fn gear(&self) -> u8 {
        self.gear.load(Ordering::Acquire)
    }

    pub fn set_gear(&self, raw: u8) {
        let old = self.gear.swap(raw, Ordering::AcqRel);
        if old == raw {
            return;
        }
        debug!(gear = raw, "gear changed");
        self.listeners.dispatch(|l| l.on_gear_changed(raw));
    }

    // --- check engine ---

    /// True when the check-engine lamp is lit.
    #[must_use]
    pub fn check_engine(&self) -> bool {
        self.check_engine.load(Ordering::Acquire)
    }

    pub fn set_check_engine(&self, raw: bool) {
        let old = self.check_engine.swap(raw, Ordering::AcqRel);
        if old == raw {
            return;
        }
        debug!(check_engine = raw, "check engine changed");
        self.listeners.dispatch(|l| l.on_check_engine_changed(raw));
    }

    // --- odometer ---

    /// Trip odometer in miles x 100, relative to the last reset.
    #[must_use]
    pub fn odometer_imperial(&self) -> u32 {
        units::odometer_mi_x100(
            self.odometer.load(Ordering::Acquire),
            self.odometer_baseline.load(Ordering::Acquire),
        )
    }

    /// Trip odometer in kilometers x 100, relative to the last reset.
    #[must_use]
    pub fn odometer_metric(&self) -> u32 {
        units::odometer_km_x100(
            self.odometer.load(Ordering::Acquire),
            self.odometer_baseline.load(Ordering::Acquire),
        )
    }

    /// Raw odometer ticks as reported on the bus.
    #[must_use]
    pub fn odometer_ticks(&self) -> u32 {
        self.odometer.load(Ordering::Acquire)
    }

    pub fn set_odometer(&self, raw: u32) {
        let old = self.odometer.swap(raw, Ordering::AcqRel);
        if old == raw {
            trace!(raw, "odometer unchanged, dispatch suppressed");
            return;
        }
        let baseline = self.odometer_baseline.load(Ordering::Acquire);
        let mi_x100 = units::odometer_mi_x100(raw, baseline);
        let km_x100 = units::odometer_km_x100(raw, baseline);
        debug!(mi_x100, km_x100, "odometer changed");
        self.listeners.dispatch(|l| {
            l.on_odometer_imperial_changed(mi_x100);
            l.on_odometer_metric_changed(km_x100);
        });
    }

    /// Starts a new trip: captures the current raw odometer as the baseline
    /// and notifies every listener with 0 in both unit systems. This is the
    /// one operation that always dispatches, whether or not the baseline
    /// actually moved.
    pub fn reset_odometer(&self) {
        let raw = self.odometer.load(Ordering::Acquire);
        self.odometer_baseline.store(raw, Ordering::Release);
        debug!(baseline = raw, "odometer reset");
        self.listeners.dispatch(|l| {
            l.on_odometer_imperial_changed(0);
            l.on_odometer_metric_changed(0);
        });
    }

    // --- fuel consumption ---

    /// Fuel consumed in fluid ounces.
    #[must_use]
    pub fn fuel_imperial(&self) -> u32 {
        units::fuel_fl_oz(self.fuel.load(Ordering::Acquire))
    }

    /// Fuel consumed in milliliters.
    #[must_use]
    pub fn fuel_metric(&self) -> u32 {
        units::fuel_ml(self.fuel.load(Ordering::Acquire))
    }

    /// Raw fuel ticks as reported on the bus.
    #[must_use]
    pub fn fuel_ticks(&self) -> u32 {
        self.fuel.load(Ordering::Acquire)
    }

    pub fn set_fuel(&self, raw: u32) {
        let old = self.fuel.swap(raw, Ordering::AcqRel);
        if old == raw {
            trace!(raw, "fuel unchanged, dispatch suppressed");
            return;
        }
        let fl_oz = units::fuel_fl_oz(raw);
        let ml = units::fuel_ml(raw);
        debug!(fl_oz, ml, "fuel changed");
        self.listeners.dispatch(|l| {
            l.on_fuel_imperial_changed(fl_oz);
            l.on_fuel_metric_changed(ml);
        });
    }

    // --- diagnostics pass-through ---

    /// Reports a frame that failed its CRC check. Delivered to every
    /// listener on every call; stored signal state is untouched.
    pub fn report_bad_frame(&self, frame: &[u8]) {
        self.frame_log_lock().record(FrameKind::BadCrc, frame);
        trace!(len = frame.len(), "bad frame reported");
        self.listeners.dispatch(|l| l.on_bad_frame(frame));
    }

    /// Reports a frame that decoded cleanly but was not recognized.
    /// Delivered to every listener on every call; stored signal state is
    /// untouched.
    pub fn report_unknown_frame(&self, frame: &[u8]) {
        self.frame_log_lock().record(FrameKind::Unknown, frame);
        trace!(len = frame.len(), "unknown frame reported");
        self.listeners.dispatch(|l| l.on_unknown_frame(frame));
    }

    /// Total corrupted frames reported this session.
    #[must_use]
    pub fn bad_frame_count(&self) -> u32 {
        self.frame_log_lock().bad_frame_count()
    }

    /// Total unrecognized frames reported this session.
    #[must_use]
    pub fn unknown_frame_count(&self) -> u32 {
        self.frame_log_lock().unknown_frame_count()
    }

    /// Copies of the most recently reported frames, oldest first.
    #[must_use]
    pub fn recent_frames(&self) -> Vec<FrameRecord> {
        self.frame_log_lock().recent().to_vec()
    }

    // --- views ---

    /// Point-in-time view of every converted value.
    #[must_use]
    pub fn snapshot(&self) -> VehicleSnapshot {
        let odometer = self.odometer.load(Ordering::Acquire);
        let baseline = self.odometer_baseline.load(Ordering::Acquire);
        let fuel = self.fuel.load(Ordering::Acquire);
        let speed = self.speed.load(Ordering::Acquire);
        let temp = self.engine_temp.load(Ordering::Acquire);

        VehicleSnapshot {
            rpm: units::rpm(self.rpm.load(Ordering::Acquire)),
            speed_mph: units::speed_mph(speed),
            speed_kmh: units::speed_kmh(speed),
            engine_temp_f: units::engine_temp_f(temp),
            engine_temp_c: units::engine_temp_c(temp),
            fuel_gauge: self.fuel_gauge.load(Ordering::Acquire),
            turn_signals: self.turn_signals.load(Ordering::Acquire),
            neutral: self.neutral.load(Ordering::Acquire),
            clutch: self.clutch.load(Ordering::Acquire),
            gear: self.gear.load(Ordering::Acquire),
            check_engine: self.check_engine.load(Ordering::Acquire),
            odometer_mi_x100: units::odometer_mi_x100(odometer, baseline),
            odometer_km_x100: units::odometer_km_x100(odometer, baseline),
            odometer_ticks: odometer,
            fuel_fl_oz: units::fuel_fl_oz(fuel),
            fuel_ml: units::fuel_ml(fuel),
            fuel_ticks: fuel,
        }
    }

    /// Stable single-line summary for logging. Not machine-parsed.
    #[must_use]
    pub fn dump(&self) -> DumpBuffer {
        let mut out = DumpBuffer::new();
        // Cannot overflow: the widest possible line fits MAX_DUMP_SIZE.
        let _ = write!(
            out,
            "RPM:{} SPD:{} ETP:{} FGE:{} TRN:{} CLU/NTR:{}{}{} CHK:{} ODO:{} FUL:{}",
            units::rpm(self.rpm.load(Ordering::Acquire)),
            units::speed_kmh(self.speed.load(Ordering::Acquire)),
            self.engine_temp.load(Ordering::Acquire),
            self.fuel_gauge.load(Ordering::Acquire),
            units::turn_signal_code(self.turn_signals.load(Ordering::Acquire)),
            if self.neutral.load(Ordering::Acquire) { 'N' } else { 'x' },
            if self.clutch.load(Ordering::Acquire) { 'C' } else { 'x' },
            units::gear_code(self.gear.load(Ordering::Acquire)),
            self.check_engine.load(Ordering::Acquire),
            self.odometer.load(Ordering::Acquire),
            self.fuel.load(Ordering::Acquire),
        );
        out
    }

    fn frame_log_lock(&self) -> std::sync::MutexGuard<'_, FrameLog> {
        self.frame_log.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Display for VehicleData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.dump())
    }
}
