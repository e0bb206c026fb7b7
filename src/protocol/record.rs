//! TLS record header

use super::constants::{TLS_RECORD_HEADER_LEN, record_type_name};

/// The five bytes that open every TLS record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordHeader {
    pub record_type: u8,
    pub version: u16,
    pub len: u16,
}

impl RecordHeader {
    pub fn parse(header: &[u8; TLS_RECORD_HEADER_LEN]) -> Self {
        Self {
            record_type: header[0],
            version: u16::from_be_bytes([header[1], header[2]]),
            len: u16::from_be_bytes([header[3], header[4]]),
        }
    }

    /// Plausible TLS framing: known content type and a 3.x version
    pub fn looks_like_tls(&self) -> bool {
        record_type_name(self.record_type) != "unknown" && self.version >> 8 == 0x03
    }

    pub fn type_name(&self) -> &'static str {
        record_type_name(self.record_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_record_header() {
        let h = RecordHeader::parse(&[0x16, 0x03, 0x03, 0x00, 0x7a]);
        assert_eq!(h.record_type, 0x16);
        assert_eq!(h.version, 0x0303);
        assert_eq!(h.len, 122);
        assert_eq!(h.type_name(), "handshake");
        assert!(h.looks_like_tls());

        let h = RecordHeader::parse(&[0x15, 0x03, 0x01, 0x00, 0x02]);
        assert_eq!(h.type_name(), "alert");
        assert!(h.looks_like_tls());
    }

    #[test]
    fn test_non_tls_header() {
        assert!(!RecordHeader::parse(b"HTTP/").looks_like_tls());
        assert!(!RecordHeader::parse(&[0x16, 0x02, 0x00, 0x00, 0x01]).looks_like_tls());
    }
}
