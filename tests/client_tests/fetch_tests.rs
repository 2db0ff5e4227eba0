//! Retrieval Command Tests

use std::collections::HashMap;
use std::io;

use memwire::{Config, MemcacheError};

use crate::common::{as_slices, mock_client, mock_client_with, split_at, Step};

// =============================================================================
// get
// =============================================================================

#[test]
fn test_get_hit() {
    let (server, mut client) = mock_client();
    server.script(&[b"VALUE k 0 5\r\nhello\r\nEND\r\n"]);

    assert_eq!(client.get("k").unwrap(), Some(b"hello".to_vec()));
    assert_eq!(server.sent(), b"get k\r\n");
}

#[test]
fn test_get_miss() {
    let (server, mut client) = mock_client();
    server.script(&[b"END\r\n"]);

    assert_eq!(client.get("k").unwrap(), None);
}

#[test]
fn test_get_awkward_chunking() {
    let (server, mut client) = mock_client();
    server.script(&[
        b"VALUE k",
        b" 0 5\r",
        b"\nhello",
        b"\r\n",
        b"END",
        b"\r",
        b"\n",
    ]);

    let found = client.get_many(["k"]).unwrap();
    let mut expected = HashMap::new();
    expected.insert(b"k".to_vec(), b"hello".to_vec());
    assert_eq!(found, expected);
}

#[test]
fn test_get_many_any_two_splits() {
    let response = b"VALUE a 0 3\r\nx\r\n\r\nVALUE b 0 0\r\n\r\nEND\r\n";
    for first in 1..response.len() {
        for second in first + 1..response.len() {
            let (server, mut client) = mock_client();
            let chunks = split_at(response, &[first, second]);
            server.script(&as_slices(&chunks));

            let found = client.get_many(["a", "b"]).unwrap();
            assert_eq!(found.len(), 2, "splits at {} and {}", first, second);
            assert_eq!(found[b"a".as_slice()], b"x\r\n");
            assert!(found[b"b".as_slice()].is_empty());
        }
    }
}

#[test]
fn test_get_value_containing_end_marker() {
    let (server, mut client) = mock_client();
    server.script(&[b"VALUE k 0 5\r\nEND\r\n\r\nEND\r\n"]);

    assert_eq!(client.get("k").unwrap(), Some(b"END\r\n".to_vec()));
}

// =============================================================================
// get_many
// =============================================================================

#[test]
fn test_get_many_empty_does_no_io() {
    let (server, mut client) = mock_client();
    let keys: [&str; 0] = [];

    assert!(client.get_many(keys).unwrap().is_empty());
    assert_eq!(server.connects(), 0);
    assert!(server.sent().is_empty());
}

#[test]
fn test_get_many_partial_hits() {
    let (server, mut client) = mock_client();
    server.script(&[b"VALUE b 0 1\r\n2\r\nEND\r\n"]);

    let found = client.get_many(["a", "b", "c"]).unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[b"b".as_slice()], b"2");
    assert_eq!(server.sent(), b"get a b c\r\n");
}

#[test]
fn test_get_many_strips_prefix_from_results() {
    let (server, mut client) = mock_client_with(Config::builder().key_prefix("ns:").build());
    server.script(&[b"VALUE ns:a 0 1\r\n1\r\nVALUE ns:b 0 1\r\n2\r\nEND\r\n"]);

    let found = client.get_many(["a", "b"]).unwrap();
    assert_eq!(found[b"a".as_slice()], b"1");
    assert_eq!(found[b"b".as_slice()], b"2");
    assert_eq!(server.sent(), b"get ns:a ns:b\r\n");
}

#[test]
fn test_get_many_byte_and_text_keys() {
    let (server, mut client) = mock_client();
    server.script(&[b"VALUE k1 0 1\r\na\r\nVALUE k2 0 1\r\nb\r\nEND\r\n"]);

    let keys: Vec<Vec<u8>> = vec![b"k1".to_vec(), b"k2".to_vec()];
    let found = client.get_many(&keys).unwrap();
    assert_eq!(found.len(), 2);
}

#[test]
fn test_get_many_illegal_key_does_no_io() {
    let (server, mut client) = mock_client();

    let err = client.get_many(["ok", "not ok"]).unwrap_err();
    assert!(matches!(err, MemcacheError::IllegalInput(_)));
    assert_eq!(server.connects(), 0);
}

#[test]
fn test_get_unrequested_key_is_unknown() {
    let (server, mut client) = mock_client();
    server.script(&[b"VALUE other 0 1\r\nx\r\nEND\r\n"]);

    assert!(client.get("k").unwrap_err().is_unknown());
}

// =============================================================================
// gets / gets_many
// =============================================================================

#[test]
fn test_gets_returns_cas_token() {
    let (server, mut client) = mock_client();
    server.script(&[b"VALUE k 0 2 12345\r\nhi\r\nEND\r\n"]);

    assert_eq!(client.gets("k").unwrap(), Some((b"hi".to_vec(), 12345)));
    assert_eq!(server.sent(), b"gets k\r\n");
}

#[test]
fn test_gets_miss() {
    let (server, mut client) = mock_client();
    server.script(&[b"END\r\n"]);

    assert_eq!(client.gets("k").unwrap(), None);
}

#[test]
fn test_gets_many() {
    let (server, mut client) = mock_client();
    server.script(&[b"VALUE a 0 1 1\r\nx\r\nVALUE b 0 1 2\r\ny\r\nEND\r\n"]);

    let found = client.gets_many(["a", "b"]).unwrap();
    assert_eq!(found[b"a".as_slice()], (b"x".to_vec(), 1));
    assert_eq!(found[b"b".as_slice()], (b"y".to_vec(), 2));
}

#[test]
fn test_gets_without_cas_in_reply_is_unknown() {
    let (server, mut client) = mock_client();
    server.script(&[b"VALUE k 0 2\r\nhi\r\nEND\r\n"]);

    assert!(client.gets("k").unwrap_err().is_unknown());
}

// =============================================================================
// Errors on the fetch path
// =============================================================================

#[test]
fn test_get_server_error() {
    let (server, mut client) = mock_client();
    server.script(&[b"SERVER_ERROR out of memory\r\n"]);

    match client.get("k") {
        Err(MemcacheError::Server(msg)) => assert_eq!(msg, "out of memory"),
        other => panic!("Expected Server error, got {:?}", other),
    }
    assert!(!client.is_connected());
}

#[test]
fn test_get_garbage_line() {
    let (server, mut client) = mock_client();
    server.script(&[b"WAT\r\n"]);

    assert!(client.get("k").unwrap_err().is_unknown());
}

#[test]
fn test_get_close_mid_value() {
    let (server, mut client) = mock_client();
    server.script(&[b"VALUE k 0 10\r\nhal"]);

    assert!(matches!(client.get("k"), Err(MemcacheError::UnexpectedClose)));
    assert!(!client.is_connected());
    assert_eq!(server.shutdowns(), 1);
}

// =============================================================================
// Malformed VALUE headers
// =============================================================================

#[test]
fn test_get_length_overflowing_usize() {
    let (server, mut client) = mock_client();
    server.script(&[b"VALUE k 0 18446744073709551615\r\nEND\r\n"]);

    assert!(client.get("k").unwrap_err().is_unknown());
    assert!(!client.is_connected());
}

#[test]
fn test_get_length_over_limit_reads_no_body() {
    let (server, mut client) =
        mock_client_with(Config::builder().max_value_len(1024).build());
    server.script(&[b"VALUE k 0 1025\r\n"]);

    let err = client.get("k").unwrap_err();
    assert!(err.is_unknown(), "{:?}", err);
    assert!(!client.is_connected());
}

#[test]
fn test_get_default_limit_rejects_huge_length() {
    let (server, mut client) = mock_client();
    server.script(&[b"VALUE k 0 99999999999\r\n"]);

    assert!(client.get("k").unwrap_err().is_unknown());
}

#[test]
fn test_get_length_at_limit_is_read() {
    let (server, mut client) = mock_client_with(Config::builder().max_value_len(3).build());
    server.script(&[b"VALUE k 0 3\r\nabc\r\nEND\r\n"]);

    assert_eq!(client.get("k").unwrap(), Some(b"abc".to_vec()));
}

#[test]
fn test_get_malformed_headers() {
    let bad: [&[u8]; 4] = [
        b"VALUE k 0 five\r\n",
        b"VALUE k x 5\r\n",
        b"VALUE k 0 5 1 extra\r\n",
        b"VALUE k 0 -5\r\n",
    ];
    for response in bad {
        let (server, mut client) = mock_client();
        server.script(&[response]);

        let err = client.get("k").unwrap_err();
        assert!(err.is_unknown(), "{:?} for {:?}", err, response);
        assert!(!client.is_connected());
    }
}

#[test]
fn test_ignore_exc_bad_length_is_miss() {
    let (server, mut client) = mock_client_with(Config::builder().ignore_exc(true).build());
    server
        .script(&[b"VALUE k 0 18446744073709551615\r\nEND\r\n"])
        .script(&[b"VALUE k 0 five\r\n"]);

    assert_eq!(client.get("k").unwrap(), None);
    assert!(client.get_many(["k"]).unwrap().is_empty());
    assert_eq!(server.connects(), 2);
}

// =============================================================================
// ignore_exc
// =============================================================================

fn ignoring_client() -> (crate::common::MockServer, memwire::Client) {
    mock_client_with(Config::builder().ignore_exc(true).build())
}

#[test]
fn test_ignore_exc_get_read_failure_is_miss() {
    let (server, mut client) = ignoring_client();
    server.script_steps(vec![Step::Fail(io::ErrorKind::ConnectionReset)]);

    assert_eq!(client.get("k").unwrap(), None);
    assert!(!client.is_connected());
}

#[test]
fn test_ignore_exc_get_many_is_empty() {
    let (server, mut client) = ignoring_client();
    server.script_steps(vec![
        Step::Data(b"VALUE a 0 1\r\n".to_vec()),
        Step::Fail(io::ErrorKind::TimedOut),
    ]);

    assert!(client.get_many(["a", "b"]).unwrap().is_empty());
}

#[test]
fn test_ignore_exc_connect_failure_is_miss() {
    let (server, mut client) = ignoring_client();
    server.fail_connect(io::ErrorKind::ConnectionRefused);

    assert_eq!(client.get("k").unwrap(), None);
    assert_eq!(client.gets("k").unwrap(), None);
}

#[test]
fn test_ignore_exc_protocol_error_is_miss() {
    let (server, mut client) = ignoring_client();
    server.script(&[b"SERVER_ERROR busy\r\n"]);

    assert_eq!(client.get("k").unwrap(), None);
}

#[test]
fn test_ignore_exc_does_not_cover_writes() {
    let (server, mut client) = ignoring_client();
    server.script_steps(vec![Step::Fail(io::ErrorKind::ConnectionReset)]);

    assert!(client.set("k", b"v", 0, false).unwrap_err().is_io());
}

#[test]
fn test_ignore_exc_does_not_cover_illegal_keys() {
    let (_server, mut client) = ignoring_client();

    assert!(matches!(
        client.get("bad key"),
        Err(MemcacheError::IllegalInput(_))
    ));
}

#[test]
fn test_without_ignore_exc_errors_propagate() {
    let (server, mut client) = mock_client();
    server.script_steps(vec![Step::Fail(io::ErrorKind::ConnectionReset)]);

    assert!(client.get("k").unwrap_err().is_io());
}
