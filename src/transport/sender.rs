//! Ordered two-part send: rewritten ClientHello, then the payload

use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::trace;

use crate::error::{Result, SinkError};

/// Byte counts of a completed send
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SendReport {
    pub hello_bytes: usize,
    pub payload_bytes: usize,
    /// Number of write calls the sink needed
    pub writes: usize,
}

impl SendReport {
    pub fn total(&self) -> usize {
        self.hello_bytes + self.payload_bytes
    }
}

/// Write `hello` then `payload` with nothing in between.
///
/// Short writes are retried until the part is fully accepted. A zero-length
/// write means the sink is gone. The payload is never started unless the
/// whole ClientHello went out.
pub async fn send_spliced<W>(sink: &mut W, hello: &[u8], payload: &[u8]) -> Result<SendReport>
where
    W: AsyncWrite + Unpin,
{
    let total = hello.len() + payload.len();
    let mut writes = 0;

    writes += write_part(sink, hello, 0, total).await?;
    writes += write_part(sink, payload, hello.len(), total).await?;
    sink.flush().await.map_err(SinkError::Write)?;

    Ok(SendReport {
        hello_bytes: hello.len(),
        payload_bytes: payload.len(),
        writes,
    })
}

async fn write_part<W>(
    sink: &mut W,
    part: &[u8],
    already_sent: usize,
    total: usize,
) -> std::result::Result<usize, SinkError>
where
    W: AsyncWrite + Unpin,
{
    let mut sent = 0;
    let mut writes = 0;

    while sent < part.len() {
        let n = sink.write(&part[sent..]).await?;
        writes += 1;
        if n == 0 {
            return Err(SinkError::Closed {
                written: already_sent + sent,
                expected: total,
            });
        }
        sent += n;
        if sent < part.len() {
            trace!(accepted = n, remaining = part.len() - sent, "Short write");
        }
    }

    Ok(writes)
}
