use motobus::units;

mod rpm_tests {
    use super::*;

    #[test]
    fn test_rpm_scaling() {
        assert_eq!(units::rpm(0), 0);
        assert_eq!(units::rpm(400), 100);
        assert_eq!(units::rpm(4000), 1000);
        // Truncating division, never rounded.
        assert_eq!(units::rpm(403), 100);
    }
}

mod speed_tests {
    use super::*;

    #[test]
    fn test_speed_metric() {
        assert_eq!(units::speed_kmh(0), 0);
        assert_eq!(units::speed_kmh(128 * 60), 60);
        assert_eq!(units::speed_kmh(127), 0);
    }

    #[test]
    fn test_speed_imperial() {
        assert_eq!(units::speed_mph(0), 0);
        // 60 km/h worth of raw units reads as 37 mph with legacy truncation.
        assert_eq!(units::speed_mph(7680), 37);
        // Exact multiple: 411904 * 125 == 25744 * 2000.
        assert_eq!(units::speed_mph(411_904), 2000);
    }

    #[test]
    fn test_speed_imperial_multiply_does_not_overflow() {
        // raw * 125 exceeds u32; the intermediate must be 64-bit.
        assert_eq!(units::speed_mph(257_440_000), 1_250_000);
    }
}

mod temperature_tests {
    use super::*;

    #[test]
    fn test_temperature_imperial_is_raw() {
        assert_eq!(units::engine_temp_f(212), 212);
        assert_eq!(units::engine_temp_f(-40), -40);
    }

    #[test]
    fn test_temperature_metric() {
        assert_eq!(units::engine_temp_c(212), 100);
        assert_eq!(units::engine_temp_c(32), 0);
        assert_eq!(units::engine_temp_c(-40), -40);
    }

    #[test]
    fn test_temperature_metric_truncates_toward_zero() {
        // (0 - 32) * 5 / 9 = -160 / 9, truncated toward zero.
        assert_eq!(units::engine_temp_c(0), -17);
        assert_eq!(units::engine_temp_c(14), -10);
    }
}

mod odometer_tests {
    use super::*;

    #[test]
    fn test_odometer_imperial() {
        assert_eq!(units::odometer_mi_x100(4025, 0), 100);
        assert_eq!(units::odometer_mi_x100(0, 0), 0);
    }

    #[test]
    fn test_odometer_metric() {
        assert_eq!(units::odometer_km_x100(4025, 0), 161);
        assert_eq!(units::odometer_km_x100(24, 0), 0);
    }

    #[test]
    fn test_odometer_baseline_subtracted_before_scaling() {
        assert_eq!(units::odometer_mi_x100(8050, 4025), 100);
        assert_eq!(units::odometer_km_x100(8050, 4025), 161);
        assert_eq!(units::odometer_mi_x100(4025, 4025), 0);
        assert_eq!(units::odometer_km_x100(4025, 4025), 0);
    }

    #[test]
    fn test_odometer_imperial_multiply_does_not_overflow() {
        // 1_609_000_000 * 40 exceeds u32; 1609 * 40_000_000 divides exactly.
        assert_eq!(units::odometer_mi_x100(1_609_000_000, 0), 40_000_000);
    }
}

mod fuel_tests {
    use super::*;

    #[test]
    fn test_fuel_imperial() {
        assert_eq!(units::fuel_fl_oz(0), 0);
        assert_eq!(units::fuel_fl_oz(250_000), 338);
        assert_eq!(units::fuel_fl_oz(25_000), 33);
    }

    #[test]
    fn test_fuel_metric() {
        assert_eq!(units::fuel_ml(0), 0);
        assert_eq!(units::fuel_ml(25_000), 1000);
        assert_eq!(units::fuel_ml(24), 0);
    }

    #[test]
    fn test_fuel_imperial_multiply_does_not_overflow() {
        assert_eq!(units::fuel_fl_oz(250_000_000), 338_000);
    }
}

mod display_code_tests {
    use super::*;

    #[test]
    fn test_turn_signal_codes() {
        assert_eq!(units::turn_signal_code(0), 'x');
        assert_eq!(units::turn_signal_code(1), 'R');
        assert_eq!(units::turn_signal_code(2), 'L');
        assert_eq!(units::turn_signal_code(3), 'W');
    }

    #[test]
    fn test_turn_signal_code_ignores_upper_bits() {
        assert_eq!(units::turn_signal_code(0x83), 'W');
        assert_eq!(units::turn_signal_code(0xfc), 'x');
    }

    #[test]
    fn test_gear_codes() {
        assert_eq!(units::gear_code(1), '1');
        assert_eq!(units::gear_code(3), '3');
        assert_eq!(units::gear_code(6), '6');
    }

    #[test]
    fn test_gear_code_out_of_range_is_unknown() {
        assert_eq!(units::gear_code(0), 'x');
        assert_eq!(units::gear_code(7), 'x');
        assert_eq!(units::gear_code(255), 'x');
    }
}
