//! TCP Socket Configuration

use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::{TcpStream, lookup_host};
use tokio::time::timeout;
use socket2::SockRef;
use tracing::{debug, warn};

use crate::error::{Result, SmuggleError};

/// Configure the outgoing socket before the ClientHello is written
pub fn configure_tcp_socket(stream: &TcpStream, nodelay: bool) -> std::io::Result<()> {
    let socket = SockRef::from(stream);

    // Nagle would hold the ClientHello back waiting to coalesce with the payload
    socket.set_nodelay(nodelay)?;

    Ok(())
}

/// Resolve `host:port` to every address the resolver returns, in order
pub async fn resolve_target(host: &str, port: u16) -> Result<Vec<SocketAddr>> {
    let target = format!("{}:{}", host, port);
    let addrs: Vec<SocketAddr> = lookup_host(target.as_str())
        .await
        .map_err(|e| SmuggleError::Connect { addr: target.clone(), source: e })?
        .collect();

    if addrs.is_empty() {
        return Err(SmuggleError::Connect {
            addr: target,
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no addresses resolved"),
        });
    }

    debug!(host = %host, count = addrs.len(), "Resolved target");
    Ok(addrs)
}

/// Connect to the first reachable address, each attempt bounded by `connect_timeout`
pub async fn connect_target(
    addrs: &[SocketAddr],
    connect_timeout: Duration,
    nodelay: bool,
) -> Result<TcpStream> {
    let mut last_err = None;

    for addr in addrs {
        match timeout(connect_timeout, TcpStream::connect(*addr)).await {
            Ok(Ok(stream)) => {
                configure_tcp_socket(&stream, nodelay)?;
                debug!(addr = %addr, nodelay, "Connected");
                return Ok(stream);
            }
            Ok(Err(e)) => {
                warn!(addr = %addr, error = %e, "Connect failed");
                last_err = Some(SmuggleError::Connect { addr: addr.to_string(), source: e });
            }
            Err(_) => {
                warn!(addr = %addr, timeout_ms = connect_timeout.as_millis() as u64, "Connect timed out");
                last_err = Some(SmuggleError::ConnectionTimeout { addr: addr.to_string() });
            }
        }
    }

    Err(last_err.unwrap_or_else(|| SmuggleError::Config("no target addresses".into())))
}
