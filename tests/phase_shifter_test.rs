//! Integration tests for the Pulsar driver against the mock transport.
//!
//! Run with: cargo test --test phase_shifter_test

use pulsar_daq::transport::{EchoMode, MockTransport};
use pulsar_daq::{OnOff, PhaseBit, PhaseShifter, PulsarError, PHASE_BITS};

fn connect() -> (PhaseShifter<MockTransport>, MockTransport) {
    let mock = MockTransport::new();
    let driver = PhaseShifter::with_transport("pulsar", mock.clone()).unwrap();
    mock.clear_log();
    (driver, mock)
}

#[test]
fn test_all_bits_off_after_construction() {
    let (driver, _mock) = connect();
    for bit in PhaseBit::ALL {
        assert_eq!(driver.get_bit(bit), OnOff::Off, "{bit} should start off");
    }
    assert_eq!(driver.mask().bits(), 0x00);
    assert_eq!(driver.phase_degrees(), 0.0);
}

#[test]
fn test_set_then_get_each_bit() {
    let (mut driver, _mock) = connect();
    for def in &PHASE_BITS {
        let bit: PhaseBit = def.name.parse().unwrap();

        driver.set_bit(bit, true).unwrap();
        assert_eq!(driver.get_bit(bit), OnOff::On);

        driver.set_bit(bit, false).unwrap();
        assert_eq!(driver.get_bit(bit), OnOff::Off);
    }
}

#[test]
fn test_bits_are_independent() {
    for target in PhaseBit::ALL {
        for other in PhaseBit::ALL.into_iter().filter(|b| *b != target) {
            let (mut driver, _mock) = connect();

            driver.set_bit(other, true).unwrap();
            driver.set_bit(target, true).unwrap();
            assert_eq!(driver.get_bit(other), OnOff::On, "{target} on cleared {other}");

            driver.set_bit(target, false).unwrap();
            assert_eq!(driver.get_bit(other), OnOff::On, "{target} off cleared {other}");

            driver.set_bit(other, false).unwrap();
            driver.set_bit(target, true).unwrap();
            assert_eq!(driver.get_bit(other), OnOff::Off, "{target} on set {other}");
        }
    }
}

#[test]
fn test_written_mask_is_or_of_enabled_bits() {
    let (mut driver, mock) = connect();

    // None on
    driver.set_bit(PhaseBit::Phase180, false).unwrap();
    assert_eq!(mock.last_written(), Some(0x00));

    // {1_4, 90} on
    driver.set_bit(PhaseBit::Phase1_4, true).unwrap();
    driver.set_bit(PhaseBit::Phase90, true).unwrap();
    assert_eq!(mock.last_written(), Some(0x41));

    // All on
    for bit in PhaseBit::ALL {
        driver.set_bit(bit, true).unwrap();
    }
    assert_eq!(mock.last_written(), Some(0xFF));
    assert_eq!(driver.mask().bits(), 0xFF);
}

#[test]
fn test_repeated_set_is_not_deduplicated() {
    let (mut driver, mock) = connect();
    driver.set_bit(PhaseBit::Phase5_6, true).unwrap();
    driver.set_bit(PhaseBit::Phase5_6, true).unwrap();

    assert_eq!(driver.mask().bits(), 0x04);
    assert_eq!(mock.written(), vec![0x04, 0x04]);
    assert_eq!(mock.read_back(), vec![0x04, 0x04]);
}

#[test]
fn test_echo_mismatch_is_fatal_and_mask_not_reverted() {
    let (mut driver, mock) = connect();
    driver.set_bit(PhaseBit::Phase2_8, true).unwrap();

    mock.set_mode(EchoMode::Fixed(0x00));
    let err = driver.set_bit(PhaseBit::Phase11_2, true).unwrap_err();

    assert!(err.is_fatal());
    assert!(matches!(
        err,
        PulsarError::EchoMismatch {
            sent: 0x0A,
            received: 0x00
        }
    ));
    assert_eq!(driver.mask().bits(), 0x0A);
    assert_eq!(driver.get_bit(PhaseBit::Phase11_2), OnOff::On);
    // No retry
    assert_eq!(mock.written(), vec![0x02, 0x0A]);
}

#[test]
fn test_echo_after_timeout_does_not_shift_later_round_trips() {
    let (mut driver, mock) = connect();

    mock.set_mode(EchoMode::Late);
    let err = driver.set_bit(PhaseBit::Phase45, true).unwrap_err();
    assert!(err.is_fatal(), "unconfirmed mask must be fatal: {err}");
    assert_eq!(driver.mask().bits(), 0x20);

    mock.set_mode(EchoMode::Echo);
    driver.set_bit(PhaseBit::Phase90, true).unwrap();
    driver.set_bit(PhaseBit::Phase45, false).unwrap();

    assert_eq!(mock.written(), vec![0x20, 0x60, 0x40]);
    assert_eq!(mock.read_back(), vec![0x60, 0x40]);
}

#[test]
fn test_identity_is_constant() {
    let (mut driver, _mock) = connect();
    let identity = driver.identity();
    assert_eq!(identity.serial, 1234);
    assert_eq!(identity.hardware_version, 4321);

    driver.set_bit(PhaseBit::Phase45, true).unwrap();
    driver.set_bit(PhaseBit::Phase180, true).unwrap();
    assert_eq!(driver.identity(), identity);
    assert_eq!(
        serde_json::to_value(identity).unwrap(),
        serde_json::json!({"serial": 1234, "hardware_version": 4321})
    );
}

#[test]
fn test_end_to_end_two_writes() {
    let mock = MockTransport::new();
    let mut driver = PhaseShifter::with_transport("pulsar", mock.clone()).unwrap();

    driver.set_parameter("phase_45", "on").unwrap();
    driver.set_parameter("phase_90", "on").unwrap();

    // Construction write, then one write per set, each echoed
    assert_eq!(mock.written(), vec![0x00, 0x20, 0x60]);
    assert_eq!(mock.read_back(), vec![0x00, 0x20, 0x60]);
    assert!((driver.phase_degrees() - 135.0).abs() < 1e-9);
}

#[test]
fn test_unknown_names_fail_without_io() {
    let (mut driver, mock) = connect();

    assert!(matches!(
        "phase_3".parse::<PhaseBit>(),
        Err(PulsarError::UnknownBit(_))
    ));
    assert!(matches!(
        driver.get_parameter("phase_3"),
        Err(PulsarError::UnknownParameter(_))
    ));
    assert!(matches!(
        driver.set_parameter("phase_3", "on"),
        Err(PulsarError::UnknownParameter(_))
    ));
    assert!(mock.written().is_empty());
}

#[test]
fn test_release_transport() {
    let (mut driver, _mock) = connect();
    driver.set_bit(PhaseBit::Phase22_5, true).unwrap();

    let transport = driver.into_transport();
    assert_eq!(transport.written(), vec![0x10]);
}
