use motobus::{ListenerHandle, VehicleData, VehicleDataListener};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Event {
    Rpm(u32),
    SpeedImperial(u32),
    SpeedMetric(u32),
    TempImperial(i32),
    TempMetric(i32),
    FuelGauge(u8),
    TurnSignals(u8),
    Neutral(bool),
    Clutch(bool),
    Gear(u8),
    CheckEngine(bool),
    OdometerImperial(u32),
    OdometerMetric(u32),
    FuelImperial(u32),
    FuelMetric(u32),
    BadFrame(Vec<u8>),
    UnknownFrame(Vec<u8>),
}

type EventLog = Arc<Mutex<Vec<(usize, Event)>>>;

/// Records every callback into a log shared across listeners so delivery
/// order can be asserted across the whole registry.
struct Recorder {
    id: usize,
    log: EventLog,
}

impl Recorder {
    fn register(data: &VehicleData, id: usize, log: &EventLog) -> ListenerHandle {
        let handle: ListenerHandle = Arc::new(Recorder {
            id,
            log: Arc::clone(log),
        });
        data.register_listener(Arc::clone(&handle));
        handle
    }

    fn push(&self, event: Event) {
        self.log.lock().unwrap().push((self.id, event));
    }
}

impl VehicleDataListener for Recorder {
    fn on_rpm_changed(&self, rpm: u32) {
        self.push(Event::Rpm(rpm));
    }
    fn on_speed_imperial_changed(&self, mph: u32) {
        self.push(Event::SpeedImperial(mph));
    }
    fn on_speed_metric_changed(&self, kmh: u32) {
        self.push(Event::SpeedMetric(kmh));
    }
    fn on_engine_temp_imperial_changed(&self, temp_f: i32) {
        self.push(Event::TempImperial(temp_f));
    }
    fn on_engine_temp_metric_changed(&self, temp_c: i32) {
        self.push(Event::TempMetric(temp_c));
    }
    fn on_fuel_gauge_changed(&self, gauge: u8) {
        self.push(Event::FuelGauge(gauge));
    }
    fn on_turn_signals_changed(&self, signals: u8) {
        self.push(Event::TurnSignals(signals));
    }
    fn on_neutral_changed(&self, neutral: bool) {
        self.push(Event::Neutral(neutral));
    }
    fn on_clutch_changed(&self, clutch: bool) {
        self.push(Event::Clutch(clutch));
    }
    fn on_gear_changed(&self, gear: u8) {
        self.push(Event::Gear(gear));
    }
    fn on_check_engine_changed(&self, on: bool) {
        self.push(Event::CheckEngine(on));
    }
    fn on_odometer_imperial_changed(&self, mi_x100: u32) {
        self.push(Event::OdometerImperial(mi_x100));
    }
    fn on_odometer_metric_changed(&self, km_x100: u32) {
        self.push(Event::OdometerMetric(km_x100));
    }
    fn on_fuel_imperial_changed(&self, fl_oz: u32) {
        self.push(Event::FuelImperial(fl_oz));
    }
    fn on_fuel_metric_changed(&self, ml: u32) {
        self.push(Event::FuelMetric(ml));
    }
    fn on_bad_frame(&self, frame: &[u8]) {
        self.push(Event::BadFrame(frame.to_vec()));
    }
    fn on_unknown_frame(&self, frame: &[u8]) {
        self.push(Event::UnknownFrame(frame.to_vec()));
    }
}

fn drain(log: &EventLog) -> Vec<(usize, Event)> {
    std::mem::take(&mut *log.lock().unwrap())
}

mod change_detection_tests {
    use super::*;

    #[test]
    fn test_first_write_notifies_second_identical_write_does_not() {
        let data = VehicleData::new();
        let log: EventLog = EventLog::default();
        Recorder::register(&data, 0, &log);

        data.set_rpm(400);
        assert_eq!(drain(&log), vec![(0, Event::Rpm(100))]);

        data.set_rpm(400);
        assert!(drain(&log).is_empty());

        data.set_rpm(800);
        assert_eq!(drain(&log), vec![(0, Event::Rpm(200))]);
    }

    #[test]
    fn test_unchanged_write_is_silent_for_every_signal() {
        let data = VehicleData::new();
        let log: EventLog = EventLog::default();
        Recorder::register(&data, 0, &log);

        // All defaults written back: nothing changed, nothing delivered.
        data.set_rpm(0);
        data.set_speed(0);
        data.set_engine_temp(0);
        data.set_fuel_gauge(0);
        data.set_turn_signals(0);
        data.set_neutral(false);
        data.set_clutch(false);
        data.set_gear(0);
        data.set_check_engine(false);
        data.set_odometer(0);
        data.set_fuel(0);

        assert!(drain(&log).is_empty());
    }

    #[test]
    fn test_write_converts_before_dispatch() {
        let data = VehicleData::new();
        let log: EventLog = EventLog::default();
        Recorder::register(&data, 0, &log);

        data.set_engine_temp(212);
        assert_eq!(
            drain(&log),
            vec![(0, Event::TempImperial(212)), (0, Event::TempMetric(100))]
        );
    }

    #[test]
    fn test_dual_unit_signals_deliver_imperial_then_metric_per_listener() {
        let data = VehicleData::new();
        let log: EventLog = EventLog::default();
        Recorder::register(&data, 0, &log);
        Recorder::register(&data, 1, &log);

        data.set_speed(7680);
        assert_eq!(
            drain(&log),
            vec![
                (0, Event::SpeedImperial(37)),
                (0, Event::SpeedMetric(60)),
                (1, Event::SpeedImperial(37)),
                (1, Event::SpeedMetric(60)),
            ]
        );
    }
}

mod registry_tests {
    use super::*;

    #[test]
    fn test_listeners_notified_in_registration_order() {
        let data = VehicleData::new();
        let log: EventLog = EventLog::default();
        Recorder::register(&data, 0, &log);
        Recorder::register(&data, 1, &log);
        Recorder::register(&data, 2, &log);

        data.set_gear(2);
        assert_eq!(
            drain(&log),
            vec![
                (0, Event::Gear(2)),
                (1, Event::Gear(2)),
                (2, Event::Gear(2)),
            ]
        );
    }

    #[test]
    fn test_unregistered_listener_receives_nothing() {
        let data = VehicleData::new();
        let log: EventLog = EventLog::default();
        Recorder::register(&data, 0, &log);
        let second = Recorder::register(&data, 1, &log);

        data.unregister_listener(&second);
        assert_eq!(data.listener_count(), 1);

        data.set_neutral(true);
        assert_eq!(drain(&log), vec![(0, Event::Neutral(true))]);
    }

    #[test]
    fn test_register_is_idempotent() {
        let data = VehicleData::new();
        let log: EventLog = EventLog::default();
        let handle = Recorder::register(&data, 0, &log);
        data.register_listener(Arc::clone(&handle));

        assert_eq!(data.listener_count(), 1);
        data.set_clutch(true);
        assert_eq!(drain(&log).len(), 1);
    }

    #[test]
    fn test_unregister_is_idempotent() {
        let data = VehicleData::new();
        let log: EventLog = EventLog::default();
        let handle = Recorder::register(&data, 0, &log);

        data.unregister_listener(&handle);
        data.unregister_listener(&handle);
        assert_eq!(data.listener_count(), 0);

        data.set_check_engine(true);
        assert!(drain(&log).is_empty());
    }
}

mod reset_tests {
    use super::*;

    #[test]
    fn test_reset_always_dispatches_zero_in_both_units() {
        let data = VehicleData::new();
        let log: EventLog = EventLog::default();
        Recorder::register(&data, 0, &log);

        data.set_odometer(4025);
        drain(&log);

        data.reset_odometer();
        assert_eq!(
            drain(&log),
            vec![
                (0, Event::OdometerImperial(0)),
                (0, Event::OdometerMetric(0)),
            ]
        );

        // A second reset with nothing moved still notifies.
        data.reset_odometer();
        assert_eq!(
            drain(&log),
            vec![
                (0, Event::OdometerImperial(0)),
                (0, Event::OdometerMetric(0)),
            ]
        );
    }

    #[test]
    fn test_odometer_changes_after_reset_report_trip_distance() {
        let data = VehicleData::new();
        let log: EventLog = EventLog::default();
        Recorder::register(&data, 0, &log);

        data.set_odometer(4025);
        data.reset_odometer();
        drain(&log);

        data.set_odometer(4025 + 4025);
        assert_eq!(
            drain(&log),
            vec![
                (0, Event::OdometerImperial(100)),
                (0, Event::OdometerMetric(161)),
            ]
        );
    }
}

mod frame_passthrough_tests {
    use super::*;

    #[test]
    fn test_bad_frame_delivered_verbatim_every_time() {
        let data = VehicleData::new();
        let log: EventLog = EventLog::default();
        Recorder::register(&data, 0, &log);

        let frame = [0x0c, 0x10, 0x02, 0xff];
        data.report_bad_frame(&frame);
        data.report_bad_frame(&frame);

        assert_eq!(
            drain(&log),
            vec![
                (0, Event::BadFrame(frame.to_vec())),
                (0, Event::BadFrame(frame.to_vec())),
            ]
        );
    }

    #[test]
    fn test_unknown_frame_delivered_verbatim_every_time() {
        let data = VehicleData::new();
        let log: EventLog = EventLog::default();
        Recorder::register(&data, 0, &log);
        Recorder::register(&data, 1, &log);

        let frame = [0x68, 0x88];
        data.report_unknown_frame(&frame);

        assert_eq!(
            drain(&log),
            vec![
                (0, Event::UnknownFrame(frame.to_vec())),
                (1, Event::UnknownFrame(frame.to_vec())),
            ]
        );
    }

    #[test]
    fn test_frame_reports_do_not_touch_signal_state() {
        let data = VehicleData::new();
        data.set_rpm(400);
        data.report_bad_frame(&[0x01]);
        data.report_unknown_frame(&[0x02]);
        assert_eq!(data.rpm(), 100);
        assert!(data.dump().as_str().contains("RPM:100"));
    }
}

mod isolation_tests {
    use super::*;

    /// Panics on every rpm change; the listeners after it must still fire.
    struct PanickyListener;

    impl VehicleDataListener for PanickyListener {
        fn on_rpm_changed(&self, _rpm: u32) {
            panic!("listener failure");
        }
    }

    #[test]
    fn test_panicking_listener_does_not_block_later_listeners() {
        let data = VehicleData::new();
        let log: EventLog = EventLog::default();
        data.register_listener(Arc::new(PanickyListener));
        Recorder::register(&data, 1, &log);

        data.set_rpm(400);

        assert_eq!(drain(&log), vec![(1, Event::Rpm(100))]);
        // Raw state survived the panic.
        assert_eq!(data.rpm(), 100);
    }

    #[test]
    fn test_panicking_listener_does_not_corrupt_registry() {
        let data = VehicleData::new();
        let log: EventLog = EventLog::default();
        data.register_listener(Arc::new(PanickyListener));
        Recorder::register(&data, 1, &log);

        data.set_rpm(400);
        data.set_rpm(800);

        assert_eq!(
            drain(&log),
            vec![(1, Event::Rpm(100)), (1, Event::Rpm(200))]
        );
        assert_eq!(data.listener_count(), 2);
    }
}
