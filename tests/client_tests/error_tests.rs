//! Error Classification Tests

use std::io;

use memwire::MemcacheError;

#[test]
fn test_client_errors() {
    let errors = [
        MemcacheError::Client("bad data chunk".to_string()),
        MemcacheError::UnknownCommand,
        MemcacheError::IllegalInput("key too long".to_string()),
        MemcacheError::Serialization("flags 9".to_string()),
    ];
    for err in &errors {
        assert!(err.is_client_error(), "{:?}", err);
        assert!(!err.is_server_error(), "{:?}", err);
        assert!(!err.is_unknown(), "{:?}", err);
    }
}

#[test]
fn test_server_errors() {
    let errors = [
        MemcacheError::Server("out of memory".to_string()),
        MemcacheError::UnexpectedClose,
    ];
    for err in &errors {
        assert!(err.is_server_error(), "{:?}", err);
        assert!(!err.is_client_error(), "{:?}", err);
    }
}

#[test]
fn test_unknown_and_io() {
    let unknown = MemcacheError::Unknown("WAT".to_string());
    assert!(unknown.is_unknown());
    assert!(!unknown.is_io());

    let reset: MemcacheError = io::Error::new(io::ErrorKind::ConnectionReset, "reset").into();
    assert!(reset.is_io());
    assert!(!reset.is_timeout());
}

#[test]
fn test_timeouts() {
    for kind in [io::ErrorKind::TimedOut, io::ErrorKind::WouldBlock] {
        let err = MemcacheError::from(io::Error::new(kind, "slow"));
        assert!(err.is_timeout());
        assert!(err.is_io());
    }
    assert!(!MemcacheError::UnexpectedClose.is_timeout());
}

#[test]
fn test_display() {
    assert_eq!(
        MemcacheError::Client("bad command line format".to_string()).to_string(),
        "client error: bad command line format"
    );
    assert_eq!(
        MemcacheError::Server("busy".to_string()).to_string(),
        "server error: busy"
    );
    assert_eq!(MemcacheError::UnknownCommand.to_string(), "unknown command");
    assert_eq!(
        MemcacheError::Unknown("WAT".to_string()).to_string(),
        "unknown response: WAT"
    );
}
