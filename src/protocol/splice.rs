//! ClientHello rewriter
//!
//! Grows the length fields of a captured ClientHello so that `payload_len`
//! bytes sent right after it are read by the peer as the tail of the
//! Padding extension. The payload itself is never copied into the record.
//!
//! Four fields move together:
//!
//! ```text
//!   [3..5]        record length          + P (+4 if padding is synthesised)
//!   [6..9]        handshake length       + P (+4)
//!   [E..E+2]      extensions length      + P (+4)
//!   [pad+2..+4]   padding length         + P, or a new {0x0015, P} header at L
//! ```
//!
//! A rewrite is planned against the untouched bytes first and only then
//! stored, so every error leaves the buffer exactly as it was.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SmuggleError};
use super::client_hello::{find_padding_extension, locate_extensions};
use super::codec::{add_u16, add_u24, read_u16, read_u24, write_u16, write_u24};
use super::constants::*;

/// How the payload is accounted for inside the ClientHello
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpliceMode {
    /// Payload becomes the data of the Padding extension
    #[default]
    Padding,
    /// Payload is appended to the extensions vector as-is; it has to be
    /// well-formed extension records for the peer to accept it
    Raw,
}

impl std::fmt::Display for SpliceMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SpliceMode::Padding => write!(f, "padding"),
            SpliceMode::Raw => write!(f, "raw"),
        }
    }
}

/// What happens to the Padding extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaddingEdit {
    /// Existing extension; its length field at `len_pos` grows
    Grow { len_pos: usize, old_len: u16, new_len: u16 },
    /// No extension in the capture; a `{0x0015, len}` header goes at `at`
    Append { at: usize, len: u16 },
    /// Raw mode leaves extensions alone
    Untouched,
}

/// Final values of every field a rewrite stores
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplicePlan {
    pub hello_len: usize,
    pub payload_len: usize,
    pub extensions_pos: usize,
    pub record_len: u16,
    pub handshake_len: u32,
    pub extensions_len: u16,
    pub padding: PaddingEdit,
}

impl SplicePlan {
    /// Bytes added to the record on the wire after the ClientHello itself
    pub fn header_growth(&self) -> usize {
        match self.padding {
            PaddingEdit::Append { .. } => EXT_HEADER_LEN,
            PaddingEdit::Grow { .. } | PaddingEdit::Untouched => 0,
        }
    }

    /// Populated length of the rewritten ClientHello
    pub fn new_len(&self) -> usize {
        self.hello_len + self.header_growth()
    }

    pub fn synthesizes_padding(&self) -> bool {
        matches!(self.padding, PaddingEdit::Append { .. })
    }

    /// Store the planned fields into `buf`, which must begin with the
    /// ClientHello the plan was computed from.
    pub fn apply(&self, buf: &mut [u8]) -> Result<usize> {
        let new_len = self.new_len();
        if buf.len() < new_len {
            return Err(SmuggleError::BufferTooSmall {
                needed: new_len,
                capacity: buf.len(),
            });
        }

        write_u16(buf, RECORD_LENGTH_POS, self.record_len)?;
        write_u24(buf, HANDSHAKE_LENGTH_POS, self.handshake_len)?;
        write_u16(buf, self.extensions_pos, self.extensions_len)?;

        match self.padding {
            PaddingEdit::Grow { len_pos, new_len, .. } => {
                write_u16(buf, len_pos, new_len)?;
            }
            PaddingEdit::Append { at, len } => {
                write_u16(buf, at, EXT_PADDING)?;
                write_u16(buf, at + 2, len)?;
            }
            PaddingEdit::Untouched => {}
        }

        Ok(new_len)
    }
}

/// Work out every field a splice of `payload_len` bytes would store.
///
/// `hello` holds exactly the populated ClientHello bytes.
pub fn plan_splice(hello: &[u8], payload_len: usize, mode: SpliceMode) -> Result<SplicePlan> {
    let extensions_pos = locate_extensions(hello)?;

    let padding_pos = match mode {
        SpliceMode::Padding => Some(find_padding_extension(hello, extensions_pos)?),
        SpliceMode::Raw => None,
    };

    let growth = match padding_pos {
        Some(None) => payload_len.checked_add(EXT_HEADER_LEN),
        Some(Some(_)) | None => Some(payload_len),
    }
    .ok_or(SmuggleError::FieldOverflow {
        field: "payload",
        current: payload_len,
        delta: EXT_HEADER_LEN,
        max: U16_MAX,
    })?;

    let record_len = add_u16("record", read_u16(hello, RECORD_LENGTH_POS)?, growth)?;
    let handshake_len = add_u24("handshake", read_u24(hello, HANDSHAKE_LENGTH_POS)?, growth)?;
    let extensions_len = add_u16("extensions", read_u16(hello, extensions_pos)?, growth)?;

    let padding = match padding_pos {
        Some(Some(len_pos)) => {
            let old_len = read_u16(hello, len_pos)?;
            PaddingEdit::Grow {
                len_pos,
                old_len,
                new_len: add_u16("padding", old_len, payload_len)?,
            }
        }
        Some(None) => PaddingEdit::Append {
            at: hello.len(),
            len: add_u16("padding", 0, payload_len)?,
        },
        None => PaddingEdit::Untouched,
    };

    Ok(SplicePlan {
        hello_len: hello.len(),
        payload_len,
        extensions_pos,
        record_len,
        handshake_len,
        extensions_len,
        padding,
    })
}

/// Rewrite `buf[..len]` in place for a payload of `payload_len` bytes sent
/// as Padding data. Returns the new populated length, `len` or `len + 4`.
pub fn splice_payload(buf: &mut [u8], len: usize, payload_len: usize) -> Result<usize> {
    splice_in_place(buf, len, payload_len, SpliceMode::Padding)
}

pub fn splice_in_place(
    buf: &mut [u8],
    len: usize,
    payload_len: usize,
    mode: SpliceMode,
) -> Result<usize> {
    let hello = buf.get(..len).ok_or(SmuggleError::Bounds {
        offset: 0,
        width: len,
        len: buf.len(),
    })?;
    let plan = plan_splice(hello, payload_len, mode)?;
    plan.apply(buf)
}

/// Rewritten copy of `hello`; the input is left untouched
pub fn splice_to_vec(hello: &[u8], payload_len: usize, mode: SpliceMode) -> Result<(Vec<u8>, SplicePlan)> {
    let plan = plan_splice(hello, payload_len, mode)?;
    let mut out = Vec::with_capacity(plan.new_len());
    out.extend_from_slice(hello);
    out.resize(plan.new_len(), 0);
    plan.apply(&mut out)?;
    Ok((out, plan))
}
