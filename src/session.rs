//! One-shot delivery: load, rewrite, connect, send

use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::timeout;
use tracing::{debug, info, trace, warn};

use crate::config::AppConfig;
use crate::error::Result;
use crate::protocol::constants::{MAX_TLS_RECORD_SIZE, TLS_RECORD_HEADER_LEN, U16_MAX};
use crate::protocol::{
    ClientHelloInfo, PaddingEdit, RecordHeader, SpliceMode, SplicePlan, splice_to_vec,
};
use crate::transport::{SendReport, connect_target, resolve_target, send_spliced};
use crate::util::load_blob;

/// Largest ClientHello capture accepted: one full record
pub const MAX_HELLO_LEN: usize = TLS_RECORD_HEADER_LEN + MAX_TLS_RECORD_SIZE;

#[derive(Debug, Clone)]
pub struct SmuggleOutcome {
    pub plan: SplicePlan,
    pub report: SendReport,
    /// First record header the peer answered with, when waiting was enabled
    pub response: Option<RecordHeader>,
}

/// A rewritten ClientHello ready to go out ahead of its payload
#[derive(Debug, Clone)]
pub struct PreparedHello {
    pub bytes: Vec<u8>,
    pub plan: SplicePlan,
}

/// Inspect and rewrite `hello` for `payload_len` bytes. Nothing is sent.
pub fn prepare(hello: &[u8], payload_len: usize, mode: SpliceMode) -> Result<PreparedHello> {
    let info = ClientHelloInfo::parse(hello)?;
    describe_hello(&info, mode);

    let (bytes, plan) = splice_to_vec(hello, payload_len, mode)?;
    describe_plan(&info, &plan, &bytes);

    Ok(PreparedHello { bytes, plan })
}

/// Rewrite `hello` and stream it followed by `payload` into `sink`
pub async fn smuggle<W>(
    hello: &[u8],
    payload: &[u8],
    mode: SpliceMode,
    sink: &mut W,
) -> Result<(SplicePlan, SendReport)>
where
    W: AsyncWrite + Unpin,
{
    let prepared = prepare(hello, payload.len(), mode)?;
    let report = send_spliced(sink, &prepared.bytes, payload).await?;
    Ok((prepared.plan, report))
}

fn describe_hello(info: &ClientHelloInfo, mode: SpliceMode) {
    info!(
        len = info.total_len,
        sni = info.sni.as_deref().unwrap_or("-"),
        extensions = info.extensions.len(),
        padding = ?info.padding().map(|p| p.len),
        "ClientHello loaded"
    );
    debug!(
        record_version = format_args!("0x{:04x}", info.record_version),
        client_version = format_args!("0x{:04x}", info.client_version),
        session_id_len = info.session_id_len,
        cipher_suites = info.cipher_suite_count,
        extensions_pos = info.extensions_pos,
        "ClientHello layout"
    );

    for issue in info.inconsistencies() {
        warn!(issue = %issue, "ClientHello length fields disagree");
    }

    if mode == SpliceMode::Padding && info.padding().is_some() && !info.padding_is_last() {
        warn!("Padding extension is not last; payload will not land inside it");
    }
}

fn describe_plan(info: &ClientHelloInfo, plan: &SplicePlan, rewritten: &[u8]) {
    match plan.padding {
        PaddingEdit::Grow { len_pos, old_len, new_len } => {
            info!(pos = len_pos, old = old_len, new = new_len, "Growing existing padding extension");
        }
        PaddingEdit::Append { at, len } => {
            info!(at, len, "No padding extension, appending one");
            trace!(tail = %hex::encode(&rewritten[at..]), "Appended extension header");
        }
        PaddingEdit::Untouched => {
            info!(payload = plan.payload_len, "Raw mode, extensions left as captured");
        }
    }

    debug!(
        record = format_args!("{} -> {}", info.record_len, plan.record_len),
        handshake = format_args!("{} -> {}", info.handshake_len, plan.handshake_len),
        extensions = format_args!("{} -> {}", info.extensions_len, plan.extensions_len),
        "Length fields"
    );

    if plan.record_len as usize > MAX_TLS_RECORD_SIZE {
        warn!(
            record_len = plan.record_len,
            max = MAX_TLS_RECORD_SIZE,
            "Rewritten record exceeds TLS plaintext limit; peer may reject it"
        );
    }
}

/// Read the first record header the peer sends back within `wait`.
/// A timeout or a closed connection yields `None`.
pub async fn observe_response<R>(reader: &mut R, wait: Duration) -> Result<Option<RecordHeader>>
where
    R: AsyncRead + Unpin,
{
    let mut header = [0u8; TLS_RECORD_HEADER_LEN];
    match timeout(wait, reader.read_exact(&mut header)).await {
        Ok(Ok(_)) => {
            let parsed = RecordHeader::parse(&header);
            info!(
                record_type = parsed.type_name(),
                version = format_args!("0x{:04x}", parsed.version),
                len = parsed.len,
                "Peer responded"
            );
            if !parsed.looks_like_tls() {
                warn!(bytes = %hex::encode(header), "Peer response does not look like TLS");
            }
            Ok(Some(parsed))
        }
        Ok(Err(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
            info!("Peer closed the connection without responding");
            Ok(None)
        }
        Ok(Err(e)) => Err(e.into()),
        Err(_) => {
            debug!(wait_ms = wait.as_millis() as u64, "No response from peer");
            Ok(None)
        }
    }
}

/// Run the whole delivery described by `config`
pub async fn run(config: &AppConfig) -> Result<SmuggleOutcome> {
    let hello = load_blob(&config.input.client_hello, 1, MAX_HELLO_LEN).await?;
    let payload = load_blob(&config.input.payload, 0, U16_MAX).await?;
    info!(
        hello = %config.input.client_hello,
        payload = %config.input.payload,
        payload_len = payload.len(),
        mode = %config.splice.mode,
        "Inputs loaded"
    );

    // Rewrite before touching any sink so input errors have no side effects
    let prepared = prepare(&hello, payload.len(), config.splice.mode)?;

    if let Some(ref path) = config.output.file {
        let mut file = tokio::fs::File::create(path).await?;
        let report = send_spliced(&mut file, &prepared.bytes, &payload).await?;
        file.sync_all().await?;
        info!(file = %path, bytes = report.total(), "Message written");
        return Ok(SmuggleOutcome { plan: prepared.plan, report, response: None });
    }

    let addrs = resolve_target(&config.target.host, config.target.port).await?;
    let mut stream = connect_target(&addrs, config.connect_timeout(), config.network.nodelay).await?;
    let peer = stream.peer_addr()?;
    info!(host = %config.target.host, peer = %peer, "Connected to target");

    let report = send_spliced(&mut stream, &prepared.bytes, &payload).await?;
    info!(
        peer = %peer,
        hello_bytes = report.hello_bytes,
        payload_bytes = report.payload_bytes,
        writes = report.writes,
        "ClientHello and payload sent"
    );

    let response = match config.response_wait() {
        Some(wait) => observe_response(&mut stream, wait).await?,
        None => None,
    };

    if let Err(e) = stream.shutdown().await {
        debug!(error = %e, "Shutdown after send failed");
    }

    Ok(SmuggleOutcome { plan: prepared.plan, report, response })
}
