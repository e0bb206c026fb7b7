//! ClientHello walker
//!
//! Locates the extensions vector of a captured ClientHello record and the
//! extensions inside it. Only TLS 1.0-1.2 style framing is understood: one
//! record, one handshake message, fixed 34-byte version + random prefix.

use std::ops::ControlFlow;

use crate::error::{Result, SmuggleError};
use super::codec::{read_u16, read_u24, read_u8};
use super::constants::*;

/// One `{type, length, data}` triple inside the extensions vector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtensionEntry {
    pub ext_type: u16,
    /// Offset of the type field from the start of the record
    pub offset: usize,
    /// Declared data length
    pub len: u16,
}

impl ExtensionEntry {
    /// Offset of this extension's length field
    pub fn len_pos(&self) -> usize {
        self.offset + 2
    }

    /// Byte range of the extension data
    pub fn data_range(&self) -> std::ops::Range<usize> {
        let start = self.offset + EXT_HEADER_LEN;
        start..start + self.len as usize
    }
}

fn hello_u8(hello: &[u8], pos: usize, what: &str) -> Result<u8> {
    read_u8(hello, pos).map_err(|_| past_end(hello, pos, what))
}

fn hello_u16(hello: &[u8], pos: usize, what: &str) -> Result<u16> {
    read_u16(hello, pos).map_err(|_| past_end(hello, pos, what))
}

fn past_end(hello: &[u8], pos: usize, what: &str) -> SmuggleError {
    SmuggleError::malformed(format!(
        "{} at offset {} runs past end of {}-byte record",
        what,
        pos,
        hello.len()
    ))
}

/// Find the offset of the extensions-vector length field.
///
/// `hello` must hold exactly the populated bytes of the record.
pub fn locate_extensions(hello: &[u8]) -> Result<usize> {
    if hello.len() <= SESSION_ID_LEN_POS {
        return Err(SmuggleError::malformed(format!(
            "record too short for a ClientHello: {} bytes",
            hello.len()
        )));
    }
    if hello[0] != TLS_RECORD_HANDSHAKE {
        return Err(SmuggleError::malformed(format!(
            "not a handshake record (type 0x{:02x})",
            hello[0]
        )));
    }
    if hello[HANDSHAKE_TYPE_POS] != HANDSHAKE_CLIENT_HELLO {
        return Err(SmuggleError::malformed(format!(
            "not a ClientHello (handshake type 0x{:02x})",
            hello[HANDSHAKE_TYPE_POS]
        )));
    }

    let mut pos = SESSION_ID_LEN_POS;
    let session_id_len = hello_u8(hello, pos, "session_id length")? as usize;
    pos += 1 + session_id_len;

    let cipher_suites_len = hello_u16(hello, pos, "cipher_suites length")? as usize;
    pos += 2 + cipher_suites_len;

    let compression_len = hello_u8(hello, pos, "compression_methods length")? as usize;
    pos += 1 + compression_len;

    // The extensions length itself has to be inside the record
    if pos + 2 > hello.len() {
        return Err(past_end(hello, pos, "extensions length"));
    }

    Ok(pos)
}

/// Visit extensions in wire order starting from the vector at `extensions_pos`.
///
/// The walk covers everything up to the end of `hello`, not just the declared
/// vector length. A partial header at the tail, or data running past the
/// end, is malformed. The visitor sees each header before its data is
/// bounds-checked, so it can stop on a match.
pub fn walk_extensions<B>(
    hello: &[u8],
    extensions_pos: usize,
    mut visit: impl FnMut(ExtensionEntry) -> ControlFlow<B>,
) -> Result<Option<B>> {
    let end = hello.len();
    let mut pos = extensions_pos + 2;

    while pos < end {
        if pos + EXT_HEADER_LEN > end {
            return Err(SmuggleError::malformed(format!(
                "truncated extension header at offset {} ({} bytes left)",
                pos,
                end - pos
            )));
        }

        let entry = ExtensionEntry {
            ext_type: read_u16(hello, pos)?,
            offset: pos,
            len: read_u16(hello, pos + 2)?,
        };

        if let ControlFlow::Break(found) = visit(entry) {
            return Ok(Some(found));
        }

        pos += EXT_HEADER_LEN + entry.len as usize;
        if pos > end {
            return Err(SmuggleError::malformed(format!(
                "extension 0x{:04x} at offset {} overruns record by {} bytes",
                entry.ext_type,
                entry.offset,
                pos - end
            )));
        }
    }

    Ok(None)
}

/// Offset of the Padding extension's length field, if one is present
pub fn find_padding_extension(hello: &[u8], extensions_pos: usize) -> Result<Option<usize>> {
    walk_extensions(hello, extensions_pos, |entry| {
        if entry.ext_type == EXT_PADDING {
            ControlFlow::Break(entry.len_pos())
        } else {
            ControlFlow::Continue(())
        }
    })
}

/// All extensions in wire order
pub fn extension_entries(hello: &[u8], extensions_pos: usize) -> Result<Vec<ExtensionEntry>> {
    let mut entries = Vec::new();
    walk_extensions::<()>(hello, extensions_pos, |entry| {
        entries.push(entry);
        ControlFlow::Continue(())
    })?;
    Ok(entries)
}

// ============= Inspection =============

/// Summary of a captured ClientHello, used for logging before a rewrite
#[derive(Debug, Clone)]
pub struct ClientHelloInfo {
    pub total_len: usize,
    pub record_version: u16,
    pub record_len: u16,
    pub handshake_len: u32,
    pub client_version: u16,
    pub session_id_len: u8,
    pub cipher_suite_count: usize,
    pub extensions_pos: usize,
    pub extensions_len: u16,
    pub extensions: Vec<ExtensionEntry>,
    pub sni: Option<String>,
}

impl ClientHelloInfo {
    pub fn parse(hello: &[u8]) -> Result<Self> {
        let extensions_pos = locate_extensions(hello)?;
        let extensions = extension_entries(hello, extensions_pos)?;

        let session_id_len = hello[SESSION_ID_LEN_POS];
        let cipher_suites_len =
            read_u16(hello, SESSION_ID_LEN_POS + 1 + session_id_len as usize)? as usize;

        let sni = extensions
            .iter()
            .find(|e| e.ext_type == EXT_SERVER_NAME)
            .and_then(|e| parse_server_name(&hello[e.data_range()]));

        Ok(Self {
            total_len: hello.len(),
            record_version: read_u16(hello, 1)?,
            record_len: read_u16(hello, RECORD_LENGTH_POS)?,
            handshake_len: read_u24(hello, HANDSHAKE_LENGTH_POS)?,
            client_version: read_u16(hello, CLIENT_VERSION_POS)?,
            session_id_len,
            cipher_suite_count: cipher_suites_len / 2,
            extensions_pos,
            extensions_len: read_u16(hello, extensions_pos)?,
            extensions,
            sni,
        })
    }

    pub fn padding(&self) -> Option<&ExtensionEntry> {
        self.extensions.iter().find(|e| e.ext_type == EXT_PADDING)
    }

    /// Bytes sent after the record only land in the padding data when the
    /// Padding extension is the final one.
    pub fn padding_is_last(&self) -> bool {
        self.extensions.last().is_some_and(|e| e.ext_type == EXT_PADDING)
    }

    pub fn padding_count(&self) -> usize {
        self.extensions.iter().filter(|e| e.ext_type == EXT_PADDING).count()
    }

    /// Length fields that disagree with the record layout. Empty for a
    /// well-formed capture.
    pub fn inconsistencies(&self) -> Vec<String> {
        let mut issues = Vec::new();

        let expected_record = self.total_len - TLS_RECORD_HEADER_LEN;
        if self.record_len as usize != expected_record {
            issues.push(format!(
                "record length {} != {} bytes following the header",
                self.record_len, expected_record
            ));
        }
        if self.handshake_len as usize + HANDSHAKE_HEADER_LEN != self.record_len as usize {
            issues.push(format!(
                "handshake length {} + {} != record length {}",
                self.handshake_len, HANDSHAKE_HEADER_LEN, self.record_len
            ));
        }
        let expected_extensions = self.total_len - self.extensions_pos - 2;
        if self.extensions_len as usize != expected_extensions {
            issues.push(format!(
                "extensions length {} != {} bytes remaining",
                self.extensions_len, expected_extensions
            ));
        }
        let walked: usize = self
            .extensions
            .iter()
            .map(|e| EXT_HEADER_LEN + e.len as usize)
            .sum();
        if walked != self.extensions_len as usize {
            issues.push(format!(
                "extensions sum to {} bytes, vector declares {}",
                walked, self.extensions_len
            ));
        }
        if self.padding_count() > 1 {
            issues.push(format!("{} padding extensions", self.padding_count()));
        }

        issues
    }
}

/// Host name from server_name extension data
fn parse_server_name(data: &[u8]) -> Option<String> {
    if data.len() < 2 {
        return None;
    }
    let list_len = u16::from_be_bytes([data[0], data[1]]) as usize;
    let list_end = std::cmp::min(2 + list_len, data.len());
    let mut pos = 2;

    while pos + 3 <= list_end {
        let name_type = data[pos];
        let name_len = u16::from_be_bytes([data[pos + 1], data[pos + 2]]) as usize;
        pos += 3;
        if pos + name_len > list_end {
            break;
        }
        if name_type == 0
            && name_len > 0
            && let Ok(host) = std::str::from_utf8(&data[pos..pos + name_len])
        {
            return Some(host.to_string());
        }
        pos += name_len;
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::test_vectors::*;

    #[test]
    fn test_locate_extensions() {
        let hello = build_client_hello(&[sni_ext("www.google.com")]);
        // 43 + 1 + 32 (session id) + 2 + 6 (suites) + 1 + 1 (compression)
        assert_eq!(locate_extensions(&hello).unwrap(), 86);
    }

    #[test]
    fn test_locate_extensions_empty_session_id() {
        let mut exts = vec![sni_ext("a.example")];
        exts.push((EXT_PADDING, vec![0; 3]));
        let hello = build_client_hello_with_session(&[], &exts);
        assert_eq!(locate_extensions(&hello).unwrap(), 54);
    }

    #[test]
    fn test_locate_extensions_rejects_wrong_types() {
        let mut hello = build_client_hello(&[sni_ext("x.test")]);
        hello[0] = TLS_RECORD_APPLICATION;
        assert!(matches!(locate_extensions(&hello), Err(SmuggleError::MalformedHello(_))));

        let mut hello = build_client_hello(&[sni_ext("x.test")]);
        hello[HANDSHAKE_TYPE_POS] = 0x02;
        assert!(matches!(locate_extensions(&hello), Err(SmuggleError::MalformedHello(_))));
    }

    #[test]
    fn test_locate_extensions_session_id_overrun() {
        let mut hello = build_client_hello(&[sni_ext("x.test")]);
        hello[SESSION_ID_LEN_POS] = 0xff;
        let err = locate_extensions(&hello).unwrap_err();
        assert!(err.to_string().contains("cipher_suites"));
    }

    #[test]
    fn test_locate_extensions_short_record() {
        let hello = build_client_hello(&[]);
        assert!(locate_extensions(&hello[..43]).is_err());
        // Extensions length field cut in half
        let e = locate_extensions(&hello).unwrap();
        assert!(locate_extensions(&hello[..e + 1]).is_err());
        assert_eq!(locate_extensions(&hello[..e + 2]).unwrap(), e);
    }

    #[test]
    fn test_find_padding_extension() {
        let hello = build_client_hello(&[
            sni_ext("www.google.com"),
            (0x0017, Vec::new()),
            (EXT_PADDING, vec![0; 200]),
            (0x002b, vec![0x02, 0x03, 0x04]),
        ]);
        let e = locate_extensions(&hello).unwrap();
        let pad = find_padding_extension(&hello, e).unwrap().unwrap();
        // 88 + sni (4 + 19) + ems (4) + padding type (2)
        assert_eq!(pad, 88 + 23 + 4 + 2);
        assert_eq!(read_u16(&hello, pad).unwrap(), 200);
    }

    #[test]
    fn test_find_padding_extension_absent() {
        let hello = build_client_hello(&[sni_ext("www.google.com"), (0x0017, Vec::new())]);
        let e = locate_extensions(&hello).unwrap();
        assert_eq!(find_padding_extension(&hello, e).unwrap(), None);

        let hello = build_client_hello(&[]);
        let e = locate_extensions(&hello).unwrap();
        assert_eq!(find_padding_extension(&hello, e).unwrap(), None);
    }

    #[test]
    fn test_find_padding_extension_truncated_header() {
        let mut hello = build_client_hello(&[sni_ext("www.google.com")]);
        hello.extend_from_slice(&[0x00, 0x17]);
        let e = locate_extensions(&hello).unwrap();
        let err = find_padding_extension(&hello, e).unwrap_err();
        assert!(err.to_string().contains("truncated extension header"));
    }

    #[test]
    fn test_find_padding_extension_overrun() {
        let mut hello = build_client_hello(&[(0x0017, Vec::new())]);
        let n = hello.len();
        // Declare 10 data bytes that are not there
        hello[n - 1] = 10;
        let e = locate_extensions(&hello).unwrap();
        assert!(matches!(
            find_padding_extension(&hello, e),
            Err(SmuggleError::MalformedHello(_))
        ));
    }

    #[test]
    fn test_find_padding_stops_before_later_garbage() {
        let mut hello = build_client_hello(&[(EXT_PADDING, vec![0; 4])]);
        hello.extend_from_slice(&[0xaa]);
        let e = locate_extensions(&hello).unwrap();
        assert_eq!(find_padding_extension(&hello, e).unwrap(), Some(e + 4));
        assert!(extension_entries(&hello, e).is_err());
    }

    #[test]
    fn test_client_hello_info() {
        let hello = build_client_hello(&[
            sni_ext("www.google.com"),
            (EXT_PADDING, vec![0; 16]),
        ]);
        let info = ClientHelloInfo::parse(&hello).unwrap();
        assert_eq!(info.total_len, hello.len());
        assert_eq!(info.record_version, 0x0301);
        assert_eq!(info.client_version, 0x0303);
        assert_eq!(info.session_id_len, 32);
        assert_eq!(info.cipher_suite_count, 3);
        assert_eq!(info.extensions.len(), 2);
        assert_eq!(info.sni.as_deref(), Some("www.google.com"));
        assert_eq!(info.padding().map(|p| p.len), Some(16));
        assert!(info.padding_is_last());
        assert!(info.inconsistencies().is_empty());

        let hello = build_client_hello(&[(EXT_PADDING, vec![0; 16]), sni_ext("www.google.com")]);
        let info = ClientHelloInfo::parse(&hello).unwrap();
        assert!(info.padding().is_some());
        assert!(!info.padding_is_last());
    }

    #[test]
    fn test_client_hello_info_reports_inconsistencies() {
        let mut hello = build_client_hello(&[sni_ext("x.test"), (EXT_PADDING, Vec::new())]);
        hello.extend_from_slice(&[0x00, 0x15, 0x00, 0x00]);
        let info = ClientHelloInfo::parse(&hello).unwrap();
        let issues = info.inconsistencies();
        assert!(issues.iter().any(|i| i.starts_with("record length")));
        assert!(issues.iter().any(|i| i.starts_with("extensions length")));
        assert!(issues.iter().any(|i| i.contains("2 padding extensions")));
    }

    #[test]
    fn test_parse_server_name_skips_other_name_types() {
        let mut data = Vec::new();
        data.extend_from_slice(&12u16.to_be_bytes());
        data.push(7);
        data.extend_from_slice(&2u16.to_be_bytes());
        data.extend_from_slice(b"zz");
        data.push(0);
        data.extend_from_slice(&4u16.to_be_bytes());
        data.extend_from_slice(b"host");
        assert_eq!(parse_server_name(&data).as_deref(), Some("host"));
        assert_eq!(parse_server_name(&[0x00]), None);
    }
}
