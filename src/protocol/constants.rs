//! TLS wire constants for ClientHello rewriting

// ============= Record Layer =============

/// TLS record type: Handshake
pub const TLS_RECORD_HANDSHAKE: u8 = 0x16;
/// TLS record type: Change Cipher Spec
pub const TLS_RECORD_CHANGE_CIPHER: u8 = 0x14;
/// TLS record type: Application Data
pub const TLS_RECORD_APPLICATION: u8 = 0x17;
/// TLS record type: Alert
pub const TLS_RECORD_ALERT: u8 = 0x15;
/// Record header: type (1) + version (2) + length (2)
pub const TLS_RECORD_HEADER_LEN: usize = 5;
/// Maximum plaintext record payload (RFC 8446 §5.1)
pub const MAX_TLS_RECORD_SIZE: usize = 16384;

// ============= Handshake Layer =============

/// Handshake message type: ClientHello
pub const HANDSHAKE_CLIENT_HELLO: u8 = 0x01;
/// Handshake header: type (1) + length (3)
pub const HANDSHAKE_HEADER_LEN: usize = 4;

// ============= ClientHello Layout =============

/// Offset of the record payload length
pub const RECORD_LENGTH_POS: usize = 3;
/// Offset of the handshake message type
pub const HANDSHAKE_TYPE_POS: usize = 5;
/// Offset of the handshake body length
pub const HANDSHAKE_LENGTH_POS: usize = 6;
/// Offset of client_version
pub const CLIENT_VERSION_POS: usize = 9;
/// Offset of the session_id length byte: headers (9) + version (2) + random (32)
pub const SESSION_ID_LEN_POS: usize = 43;

// ============= Extensions =============

/// Extension type: server_name
pub const EXT_SERVER_NAME: u16 = 0x0000;
/// Extension type: padding (RFC 7685)
pub const EXT_PADDING: u16 = 0x0015;
/// Extension header: type (2) + length (2)
pub const EXT_HEADER_LEN: usize = 4;

// ============= Field Limits =============

pub const U16_MAX: usize = 0xFFFF;
pub const U24_MAX: usize = 0xFF_FFFF;

/// Human-readable name of a record content type
pub fn record_type_name(record_type: u8) -> &'static str {
    match record_type {
        TLS_RECORD_HANDSHAKE => "handshake",
        TLS_RECORD_CHANGE_CIPHER => "change_cipher_spec",
        TLS_RECORD_APPLICATION => "application_data",
        TLS_RECORD_ALERT => "alert",
        _ => "unknown",
    }
}
