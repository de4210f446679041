// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `/chainkit/0.1.0` application stream: a discovered peer opens one
//! substream, writes its `PeerInfo` as a single JSON message, and closes.
//! There is no length prefix and no reply — the searcher reads to EOF and
//! parses what it got.

use ck_core::PeerInfo;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::framing::WireError;

/// The libp2p stream protocol identifier advertised by a chainkit daemon.
pub const PEER_INFO_PROTOCOL: &str = "/chainkit/0.1.0";

/// Writes `info` as a single JSON message and shuts the stream down. The
/// peer on the other end is expected to read until EOF.
pub async fn write_peer_info<W>(stream: &mut W, info: &PeerInfo) -> Result<(), WireError>
where
    W: AsyncWrite + Unpin,
{
    let payload = crate::framing::encode(info)?;
    stream.write_all(&payload).await?;
    stream.shutdown().await?;
    Ok(())
}

/// Reads a stream to EOF and parses the bytes as a [`PeerInfo`].
pub async fn read_peer_info<R>(stream: &mut R) -> Result<PeerInfo, WireError>
where
    R: AsyncRead + Unpin,
{
    let mut buf = Vec::new();
    stream.read_to_end(&mut buf).await?;
    crate::framing::decode(&buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn write_then_read_roundtrips_peer_info() {
        let info = PeerInfo::new("QmNode", 26656);
        let mut buffer = Vec::new();
        write_peer_info(&mut buffer, &info).await.unwrap();

        let mut cursor = std::io::Cursor::new(buffer);
        let back = read_peer_info(&mut cursor).await.unwrap();
        assert_eq!(info, back);
    }
}
