//! ClientHello fixtures shared by the protocol and session tests

use super::codec::{read_u16, read_u24};
use super::constants::*;
use super::client_hello::locate_extensions;

/// server_name extension carrying one host name
pub(crate) fn sni_ext(host: &str) -> (u16, Vec<u8>) {
    let host_bytes = host.as_bytes();
    let mut data = Vec::new();
    data.extend_from_slice(&(host_bytes.len() as u16 + 3).to_be_bytes());
    data.push(0);
    data.extend_from_slice(&(host_bytes.len() as u16).to_be_bytes());
    data.extend_from_slice(host_bytes);
    (EXT_SERVER_NAME, data)
}

/// ClientHello record with a 32-byte session id and the given extensions
pub(crate) fn build_client_hello(exts: &[(u16, Vec<u8>)]) -> Vec<u8> {
    build_client_hello_with_session(&[0xAA; 32], exts)
}

pub(crate) fn build_client_hello_with_session(session_id: &[u8], exts: &[(u16, Vec<u8>)]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(&[0x03, 0x03]); // client_version
    body.extend_from_slice(&[0x5a; 32]); // random
    body.push(session_id.len() as u8);
    body.extend_from_slice(session_id);
    body.extend_from_slice(&6u16.to_be_bytes());
    body.extend_from_slice(&[0x13, 0x01, 0x13, 0x02, 0xc0, 0x2f]);
    body.push(1); // compression len
    body.push(0); // null compression

    let mut ext_blob = Vec::new();
    for (typ, data) in exts {
        ext_blob.extend_from_slice(&typ.to_be_bytes());
        ext_blob.extend_from_slice(&(data.len() as u16).to_be_bytes());
        ext_blob.extend_from_slice(data);
    }
    body.extend_from_slice(&(ext_blob.len() as u16).to_be_bytes());
    body.extend_from_slice(&ext_blob);

    let mut handshake = Vec::new();
    handshake.push(HANDSHAKE_CLIENT_HELLO);
    handshake.extend_from_slice(&(body.len() as u32).to_be_bytes()[1..4]);
    handshake.extend_from_slice(&body);

    let mut record = Vec::new();
    record.push(TLS_RECORD_HANDSHAKE);
    record.extend_from_slice(&[0x03, 0x01]);
    record.extend_from_slice(&(handshake.len() as u16).to_be_bytes());
    record.extend_from_slice(&handshake);
    record
}

/// ClientHello of exactly `total_len` bytes: a filler extension is put
/// first and sized so the record comes out at the requested length.
pub(crate) fn build_client_hello_sized(total_len: usize, exts: &[(u16, Vec<u8>)]) -> Vec<u8> {
    let base = build_client_hello(exts).len();
    let filler = total_len
        .checked_sub(base + EXT_HEADER_LEN)
        .expect("requested ClientHello is too small for its extensions");

    let mut all = vec![(0x000d, vec![0x04; filler])];
    all.extend_from_slice(exts);
    let hello = build_client_hello(&all);
    assert_eq!(hello.len(), total_len);
    hello
}

/// (record, handshake, extensions) length fields
pub(crate) fn outer_lengths(hello: &[u8]) -> (u16, u32, u16) {
    let e = locate_extensions(hello).unwrap();
    (
        read_u16(hello, RECORD_LENGTH_POS).unwrap(),
        read_u24(hello, HANDSHAKE_LENGTH_POS).unwrap(),
        read_u16(hello, e).unwrap(),
    )
}
