//! `reachable`: TCP connect test.

use std::io::Write;

use anyhow::{Context, Result};
use tokio::net::TcpStream;

use crate::validation::parse_address;

/// Dials `address` once over TCP and closes the connection.
///
/// Progress lines go to `out`.
///
/// # Errors
///
/// Fails if the address is not `host:port`, or if the dial fails.
pub async fn run_reachable(address: &str, out: &mut impl Write) -> Result<()> {
    let target = parse_address(address).context("the provided address is invalid")?;
    log::debug!("Parsed address host={} port={}", target.host, target.port);

    writeln!(out, "Connecting to: {address}")?;
    let stream = TcpStream::connect((target.host.as_str(), target.port))
        .await
        .context("error dialing address")?;
    if let Ok(peer) = stream.peer_addr() {
        log::info!("Connected to {peer}");
    }
    writeln!(out, "Connection succeeded")?;

    drop(stream);
    writeln!(out, "Connection closed")?;
    Ok(())
}
