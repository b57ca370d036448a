//! End-to-end session scenarios against the mock transport.

#![allow(clippy::expect_used, clippy::panic, clippy::panic_in_result_fn)]

use openmirror_core::{MirrorError, MirrorResult, MirrorSession, ParamValue};
use openmirror_transport::mock::{MockMirrorTransport, MockOp};

fn init_test_logging() {
    // Errors only mean another test already installed the subscriber.
    let _already_set = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn open_mirror(actuators: usize) -> MirrorResult<(MirrorSession, MockMirrorTransport)> {
    init_test_logging();
    let mock = MockMirrorTransport::new(actuators);
    let session = MirrorSession::open(Box::new(mock.clone()), "BAX153.acfg")?;
    Ok((session, mock))
}

// --- Full control cycle ---

#[test]
fn test_open_send_query_close_cycle() -> MirrorResult<()> {
    let (mut session, mock) = open_mirror(12)?;
    assert_eq!(session.actuator_count(), 12);
    assert_eq!(session.serial(), "BAX153");

    // In-range vector goes through unchanged.
    session.send(&[0.5; 12])?;
    assert_eq!(session.commands()?.snapshot(), vec![0.5; 12]);

    // Out-of-range values saturate at the physical limit instead of failing.
    session.send(&[2.0; 12])?;
    assert_eq!(session.commands()?.snapshot(), vec![1.0; 12]);
    assert_eq!(mock.sent_frames(), vec![vec![0.5; 12], vec![1.0; 12]]);

    // NaN aborts before the buffer is touched.
    let err = session.send(&[f64::NAN; 12]);
    assert!(matches!(err, Err(MirrorError::InvalidValue(_))));
    assert_eq!(session.commands()?.snapshot(), vec![1.0; 12]);

    // Short vector is a dimension error, also before any mutation.
    let err = session.send(&[0.1; 11]);
    assert!(matches!(
        err,
        Err(MirrorError::DimensionMismatch {
            expected: 12,
            actual: 11
        })
    ));
    assert_eq!(mock.sent_frames().len(), 2);

    // Typed read through the registry.
    assert_eq!(session.get("NbOfActuator")?, ParamValue::Integer(12));

    // Read-only attribute rejects the write without touching the device.
    let err = session.set("ItfState", ParamValue::Integer(1));
    assert!(matches!(err, Err(MirrorError::Registry(_))));

    session.close()?;
    assert!(!session.is_open());
    Ok(())
}

// --- Open-time device setup ---

#[test]
fn test_open_disables_vendor_exceptions() -> MirrorResult<()> {
    let (_session, mock) = open_mirror(12)?;
    // The session translates failures itself; the vendor layer must report
    // status codes, not throw.
    assert_eq!(mock.param("UseException"), Some(0.0));
    Ok(())
}

#[test]
fn test_open_starts_with_zeroed_buffer() -> MirrorResult<()> {
    let (session, _mock) = open_mirror(7)?;
    assert_eq!(session.commands()?.snapshot(), vec![0.0; 7]);
    Ok(())
}

#[test]
fn test_open_failure_reports_device_diagnostic() {
    let mock = MockMirrorTransport::new(12);
    mock.fail_on(MockOp::Initialize);
    mock.set_diagnostic(11, "no mirror on this serial");

    let err = MirrorSession::open(Box::new(mock.clone()), "BAX153.acfg");
    match err {
        Err(MirrorError::Device { code, message }) => {
            assert_eq!(code, 11);
            assert_eq!(message, "no mirror on this serial");
        }
        other => panic!("expected Device, got {other:?}"),
    }
    assert!(!mock.is_initialized());
}

// --- Failure handling mid-session ---

#[test]
fn test_failed_send_keeps_attempted_values() -> MirrorResult<()> {
    let (mut session, mock) = open_mirror(3)?;
    session.send(&[0.2, 0.2, 0.2])?;

    mock.fail_on(MockOp::Send);
    mock.set_diagnostic(57, "DAC underflow");
    let err = session.send(&[0.9, 1.5, -0.9]);
    match err {
        Err(MirrorError::Device { code, message }) => {
            assert_eq!(code, 57);
            assert_eq!(message, "DAC underflow");
        }
        other => panic!("expected Device, got {other:?}"),
    }

    // The device state is unknown after a failed send; the buffer shows the
    // clamped attempt so the caller can see what was requested.
    assert_eq!(session.commands()?.snapshot(), vec![0.9, 1.0, -0.9]);

    // The session stays usable once the fault clears.
    mock.succeed_on(MockOp::Send);
    session.send(&[0.0, 0.0, 0.0])?;
    assert_eq!(mock.sent_frames().len(), 2);
    Ok(())
}

#[test]
fn test_reset_returns_to_rest_position() -> MirrorResult<()> {
    let (mut session, mock) = open_mirror(3)?;
    session.send(&[0.7, -0.7, 0.7])?;

    session.reset()?;
    assert_eq!(mock.reset_count(), 1);
    assert_eq!(session.commands()?.snapshot(), vec![0.0; 3]);
    Ok(())
}

#[test]
fn test_stop_keeps_commanded_positions() -> MirrorResult<()> {
    let (mut session, mock) = open_mirror(3)?;
    session.send(&[0.3; 3])?;
    session.stop()?;
    assert_eq!(mock.stop_count(), 1);
    assert_eq!(session.commands()?.snapshot(), vec![0.3; 3]);
    Ok(())
}

// --- Teardown ---

#[test]
fn test_close_releases_exactly_once() -> MirrorResult<()> {
    let (mut session, mock) = open_mirror(3)?;
    session.close()?;
    session.close()?;
    assert_eq!(mock.release_count(), 1);
    Ok(())
}

#[test]
fn test_drop_releases_transport() -> MirrorResult<()> {
    let mock = MockMirrorTransport::new(3);
    {
        let _session = MirrorSession::open(Box::new(mock.clone()), "DM3")?;
        assert!(mock.is_initialized());
    }
    assert!(!mock.is_initialized());
    Ok(())
}

#[test]
fn test_command_buffer_survives_session() -> MirrorResult<()> {
    let mock = MockMirrorTransport::new(3);
    let buffer = {
        let mut session = MirrorSession::open(Box::new(mock), "DM3")?;
        session.send(&[0.4, 0.4, 0.4])?;
        session.commands()?
    };
    assert_eq!(buffer.snapshot(), vec![0.4, 0.4, 0.4]);
    Ok(())
}
