//! Integration tests for framed reads and writes, driven through the mock
//! backend. These cover the externally observable contract: stop
//! conditions, zero-padding, bounded retries, purge semantics, the close
//! lifecycle, and a loopback round-trip.

use pretty_assertions::assert_eq;
use serialframe::port::MockSerialPort;
use serialframe::{FramedPort, PortConfiguration, PortError, ReadOutcome};

/// A port over a fresh mock, with a handle kept for scripting. The open
/// purge runs during construction, so tests enqueue afterwards.
fn mock_port(config: PortConfiguration) -> (MockSerialPort, FramedPort) {
    let mock = MockSerialPort::new("MOCK0");
    let port = FramedPort::with_backend(Box::new(mock.clone()), config).unwrap();
    (mock, port)
}

fn terminated(terminator: u8) -> PortConfiguration {
    PortConfiguration {
        terminator: Some(terminator),
        ..Default::default()
    }
}

#[test]
fn read_stops_when_buffer_is_full() {
    let (mut mock, mut port) = mock_port(PortConfiguration::default());
    mock.enqueue_read(b"abcd");

    let mut buf = [0u8; 4];
    let outcome = port.read(&mut buf).unwrap();

    assert_eq!(outcome, ReadOutcome::Received(4));
    assert_eq!(&buf, b"abcd");
}

#[test]
fn read_stops_at_terminator_with_capacity_left() {
    let (mut mock, mut port) = mock_port(terminated(b'\r'));
    mock.enqueue_read(&[b'a', b'b', b'\r', b'x', b'y']);

    let mut buf = [0u8; 8];
    let outcome = port.read(&mut buf).unwrap();

    assert_eq!(outcome, ReadOutcome::Received(3));
    assert_eq!(&buf[..3], &[b'a', b'b', b'\r']);
    // Zero-filled beyond the delivered bytes.
    assert_eq!(&buf[3..], &[0, 0, 0, 0, 0]);
    // Bytes past the terminator stay queued for the next read.
    assert_eq!(port.bytes_received().unwrap(), 2);
}

#[test]
fn silent_device_reports_nothing_received() {
    let (_mock, mut port) = mock_port(PortConfiguration::default());

    let mut buf = [0u8; 16];
    let outcome = port.read(&mut buf).unwrap();

    assert_eq!(outcome, ReadOutcome::NothingReceived);
    assert_eq!(outcome.len(), 0);
    assert_eq!(buf, [0u8; 16]);
}

#[test]
fn terminated_write_sends_every_byte_once_across_partial_segments() {
    let (mut mock, mut port) = mock_port(terminated(b'\n'));
    mock.set_max_write_chunk(2);

    port.write(b"hello\n").unwrap();

    assert_eq!(mock.written(), b"hello\n");
    assert_eq!(
        mock.write_log(),
        vec![b"he".to_vec(), b"ll".to_vec(), b"o\n".to_vec()]
    );
}

#[test]
fn terminated_write_is_not_truncated_by_a_mid_frame_terminator() {
    let (mut mock, mut port) = mock_port(terminated(b'\n'));
    // The first accepted chunk ends exactly on a terminator-valued byte.
    mock.set_max_write_chunk(2);

    port.write(b"a\nb\n").unwrap();

    assert_eq!(mock.written(), b"a\nb\n");
}

#[test]
fn terminated_write_without_trailing_terminator_fails() {
    let (mut mock, mut port) = mock_port(terminated(b'\n'));

    let err = port.write(b"hello").unwrap_err();

    assert!(matches!(err, PortError::TerminatorMissing));
    // The payload itself still went out exactly once.
    assert_eq!(mock.written(), b"hello");
}

#[test]
fn persistent_write_failure_exhausts_the_retry_budget() {
    let config = PortConfiguration {
        terminator: Some(b'\n'),
        max_transfer_attempts: 4,
        ..Default::default()
    };
    let (mut mock, mut port) = mock_port(config);
    mock.inject_write_faults(100);

    let err = port.write(b"hello\n").unwrap_err();

    match err {
        PortError::AttemptsExhausted {
            attempts,
            bytes_transferred,
        } => {
            assert_eq!(attempts, 4);
            assert_eq!(bytes_transferred, 0);
        }
        other => panic!("expected AttemptsExhausted, got {other:?}"),
    }
}

#[test]
fn read_that_stalls_mid_frame_exhausts_the_retry_budget() {
    let config = PortConfiguration {
        terminator: Some(b'\n'),
        max_transfer_attempts: 3,
        ..Default::default()
    };
    let (mut mock, mut port) = mock_port(config);
    // Two bytes arrive, then the device goes quiet with no terminator.
    mock.enqueue_read(b"ab");

    let mut buf = [0u8; 16];
    let err = port.read(&mut buf).unwrap_err();

    match err {
        PortError::AttemptsExhausted {
            attempts,
            bytes_transferred,
        } => {
            assert_eq!(attempts, 3);
            assert_eq!(bytes_transferred, 2);
        }
        other => panic!("expected AttemptsExhausted, got {other:?}"),
    }
    assert_eq!(&buf[..2], b"ab");
}

#[test]
fn flush_then_no_bytes_pending() {
    let (mut mock, mut port) = mock_port(PortConfiguration::default());
    mock.enqueue_read(b"unread");

    port.flush().unwrap();

    assert_eq!(port.bytes_received().unwrap(), 0);
}

#[test]
fn reset_purges_like_flush() {
    let (mut mock, mut port) = mock_port(PortConfiguration::default());
    mock.enqueue_read(b"unread");

    port.reset().unwrap();

    assert_eq!(port.bytes_received().unwrap(), 0);
    assert_eq!(mock.available_bytes(), 0);
}

#[test]
fn close_is_idempotent_and_fences_every_operation() {
    let (_mock, mut port) = mock_port(PortConfiguration::default());

    port.close();
    assert!(!port.is_open());
    // Second close is a no-op, not an error.
    port.close();

    let mut buf = [0u8; 4];
    assert!(matches!(port.write(b"x\n"), Err(PortError::Closed)));
    assert!(matches!(port.read(&mut buf), Err(PortError::Closed)));
    assert!(matches!(port.flush(), Err(PortError::Closed)));
    assert!(matches!(port.reset(), Err(PortError::Closed)));
    assert!(matches!(port.bytes_received(), Err(PortError::Closed)));
    assert!(matches!(port.wait_for_data(), Err(PortError::Closed)));
    assert!(matches!(port.set_timeout(2), Err(PortError::Closed)));
    assert!(matches!(port.enable_termination(b'\n'), Err(PortError::Closed)));
    assert!(matches!(port.set_read_buffer_size(64), Err(PortError::Closed)));
    assert!(matches!(port.read_frame(), Err(PortError::Closed)));
}

#[test]
fn loopback_roundtrip_returns_the_exact_frame() {
    let (mut mock, mut port) = mock_port(terminated(b'\n'));
    mock.set_loopback(true);

    let frame = b"*IDN? 42\n";
    port.write(frame).unwrap();

    let mut buf = [0u8; 32];
    let outcome = port.read(&mut buf).unwrap();

    assert_eq!(outcome, ReadOutcome::Received(frame.len()));
    assert_eq!(&buf[..frame.len()], frame);
}

#[test]
fn loopback_roundtrip_survives_partial_writes() {
    let (mut mock, mut port) = mock_port(terminated(b'\n'));
    mock.set_loopback(true);
    mock.set_max_write_chunk(3);

    let frame = b"MEAS:VOLT:DC?\n";
    port.write(frame).unwrap();

    let mut buf = [0u8; 32];
    let outcome = port.read(&mut buf).unwrap();

    assert_eq!(&buf[..outcome.len()], frame);
}

#[test]
fn read_frame_uses_the_recorded_buffer_size() {
    let (mut mock, mut port) = mock_port(PortConfiguration::default());
    port.set_read_buffer_size(4).unwrap();
    mock.enqueue_read(b"abcdefgh");

    assert_eq!(port.read_frame().unwrap(), Some(b"abcd".to_vec()));
    assert_eq!(port.read_frame().unwrap(), Some(b"efgh".to_vec()));
    assert_eq!(port.read_frame().unwrap(), None);
}

#[test]
fn read_frame_stops_at_terminator() {
    let (mut mock, mut port) = mock_port(terminated(b'\n'));
    mock.enqueue_read(b"ok\nmore");

    assert_eq!(port.read_frame().unwrap(), Some(b"ok\n".to_vec()));
}

#[test]
fn wait_for_data_is_advisory() {
    let (mut mock, mut port) = mock_port(PortConfiguration::default());

    // No data: returns after its bounded interval without error.
    port.wait_for_data().unwrap();

    mock.enqueue_read(b"x");
    port.wait_for_data().unwrap();
    assert_eq!(port.bytes_received().unwrap(), 1);
}

#[test]
fn termination_must_be_enabled_explicitly() {
    let (mut mock, mut port) = mock_port(PortConfiguration::default());
    // A zero byte in the payload must not act as a terminator by default.
    mock.enqueue_read(&[1, 0, 2, 3]);

    let mut buf = [0u8; 4];
    let outcome = port.read(&mut buf).unwrap();

    assert_eq!(outcome, ReadOutcome::Received(4));
    assert_eq!(&buf, &[1, 0, 2, 3]);
}

#[test]
fn enable_termination_affects_subsequent_reads() {
    let (mut mock, mut port) = mock_port(PortConfiguration::default());
    port.enable_termination(b';').unwrap();
    mock.enqueue_read(b"val=7;rest");

    let mut buf = [0u8; 16];
    let outcome = port.read(&mut buf).unwrap();

    assert_eq!(outcome, ReadOutcome::Received(6));
    assert_eq!(&buf[..6], b"val=7;");
}
