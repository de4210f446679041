// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The combined libp2p behaviour: Kademlia for provide/find-providers,
//! plus two request-response protocols — the `/chainkit/0.1.0`
//! one-shot peer-info exchange, and a supplemented `/chainkit/bundle/0.1.0`
//! protocol used to pull a published bundle's bytes from a provider found
//! via the DHT (the original tool fetched this through go-ipfs's own
//! content routing; we have no such network to ride on, so a provider
//! serves its bundle directly on request).

use async_trait::async_trait;
use ck_core::PeerInfo;
use libp2p::kad;
use libp2p::request_response;
use libp2p::swarm::NetworkBehaviour;
use libp2p::StreamProtocol;
use serde::{Deserialize, Serialize};
use std::io;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::DiscoveryError;

pub fn peer_info_protocol() -> StreamProtocol {
    StreamProtocol::new(ck_wire::PEER_INFO_PROTOCOL)
}

pub fn bundle_protocol() -> StreamProtocol {
    StreamProtocol::new("/chainkit/bundle/0.1.0")
}

#[derive(NetworkBehaviour)]
#[behaviour(to_swarm = "ChainkitEvent")]
pub struct ChainkitBehaviour {
    pub kad: kad::Behaviour<kad::store::MemoryStore>,
    pub peer_info: request_response::Behaviour<PeerInfoCodec>,
    pub bundle: request_response::Behaviour<BundleCodec>,
}

#[derive(Debug)]
pub enum ChainkitEvent {
    Kad(kad::Event),
    PeerInfo(request_response::Event<(), PeerInfo>),
    Bundle(request_response::Event<BundleRequest, BundleResponse>),
}

impl From<kad::Event> for ChainkitEvent {
    fn from(e: kad::Event) -> Self {
        ChainkitEvent::Kad(e)
    }
}

impl From<request_response::Event<(), PeerInfo>> for ChainkitEvent {
    fn from(e: request_response::Event<(), PeerInfo>) -> Self {
        ChainkitEvent::PeerInfo(e)
    }
}

impl From<request_response::Event<BundleRequest, BundleResponse>> for ChainkitEvent {
    fn from(e: request_response::Event<BundleRequest, BundleResponse>) -> Self {
        ChainkitEvent::Bundle(e)
    }
}

/// Codec for the `/chainkit/0.1.0` peer-info exchange. The request side
/// carries no payload — opening the stream at all is the ask; the server
/// half (an announcing node) writes its current `PeerInfo` as one bare
/// JSON message and closes, exactly as `ck_wire::write_peer_info`/
/// `read_peer_info` already do for the raw-stream form of this protocol.
#[derive(Debug, Clone, Default)]
pub struct PeerInfoCodec;

#[async_trait]
impl request_response::Codec for PeerInfoCodec {
    type Protocol = StreamProtocol;
    type Request = ();
    type Response = PeerInfo;

    async fn read_request<T>(&mut self, _: &Self::Protocol, io: &mut T) -> io::Result<()>
    where
        T: AsyncRead + Unpin + Send,
    {
        let mut buf = Vec::new();
        io.read_to_end(&mut buf).await?;
        Ok(())
    }

    async fn read_response<T>(&mut self, _: &Self::Protocol, io: &mut T) -> io::Result<PeerInfo>
    where
        T: AsyncRead + Unpin + Send,
    {
        ck_wire::read_peer_info(io)
            .await
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    async fn write_request<T>(
        &mut self,
        _: &Self::Protocol,
        io: &mut T,
        _req: (),
    ) -> io::Result<()>
    where
        T: AsyncWrite + Unpin + Send,
    {
        io.close().await
    }

    async fn write_response<T>(
        &mut self,
        _: &Self::Protocol,
        io: &mut T,
        res: PeerInfo,
    ) -> io::Result<()>
    where
        T: AsyncWrite + Unpin + Send,
    {
        ck_wire::write_peer_info(io, &res)
            .await
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BundleRequest {
    pub chain_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BundleResponse {
    pub manifest: Vec<u8>,
    pub genesis: Vec<u8>,
    pub image: Vec<u8>,
}

/// Codec for the bundle protocol: each message is `[len: u32 BE][JSON]`,
/// reusing `ck_wire`'s generic framing.
#[derive(Debug, Clone, Default)]
pub struct BundleCodec;

#[async_trait]
impl request_response::Codec for BundleCodec {
    type Protocol = StreamProtocol;
    type Request = BundleRequest;
    type Response = BundleResponse;

    async fn read_request<T>(&mut self, _: &Self::Protocol, io: &mut T) -> io::Result<BundleRequest>
    where
        T: AsyncRead + Unpin + Send,
    {
        let payload = ck_wire::read_message(io)
            .await
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        ck_wire::decode(&payload).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    async fn read_response<T>(
        &mut self,
        _: &Self::Protocol,
        io: &mut T,
    ) -> io::Result<BundleResponse>
    where
        T: AsyncRead + Unpin + Send,
    {
        let payload = ck_wire::read_message(io)
            .await
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        ck_wire::decode(&payload).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    async fn write_request<T>(
        &mut self,
        _: &Self::Protocol,
        io: &mut T,
        req: BundleRequest,
    ) -> io::Result<()>
    where
        T: AsyncWrite + Unpin + Send,
    {
        let payload =
            ck_wire::encode(&req).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        ck_wire::write_message(io, &payload)
            .await
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    async fn write_response<T>(
        &mut self,
        _: &Self::Protocol,
        io: &mut T,
        res: BundleResponse,
    ) -> io::Result<()>
    where
        T: AsyncWrite + Unpin + Send,
    {
        let payload =
            ck_wire::encode(&res).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        ck_wire::write_message(io, &payload)
            .await
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }
}

/// Commands sent from the public API into the swarm-driving task.
#[derive(Debug)]
pub enum Command {
    Dial(libp2p::Multiaddr),
    StartProviding(String),
    FindProviders {
        chain_id: String,
        reply: tokio::sync::oneshot::Sender<Vec<libp2p::PeerId>>,
    },
    RequestPeerInfo {
        peer: libp2p::PeerId,
        reply: tokio::sync::oneshot::Sender<Result<PeerInfo, DiscoveryError>>,
    },
    FetchBundle {
        peer: libp2p::PeerId,
        chain_id: String,
        reply: tokio::sync::oneshot::Sender<Result<BundleResponse, DiscoveryError>>,
    },
    RespondBundle {
        channel: request_response::ResponseChannel<BundleResponse>,
        response: BundleResponse,
    },
}
