// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `DiscoveryNode`: the public API of the P2P Discovery Server (component
//! C3). Wraps a libp2p swarm driven on its own task,
//! reachable through a command channel, following the
//! command/event-channel swarm-loop idiom of `ioi-foundation-ioi-network`'s
//! `networking::libp2p` module.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use ck_core::{ChainId, PeerInfo};
use futures::StreamExt;
use libp2p::kad::{self, store::MemoryStore};
use libp2p::multiaddr::Protocol;
use libp2p::request_response::{self, ProtocolSupport};
use libp2p::swarm::SwarmEvent;
use libp2p::{identity, noise, tcp, yamux, Multiaddr, PeerId, Swarm, SwarmBuilder, Transport};
use parking_lot::Mutex;
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::behaviour::{
    bundle_protocol, peer_info_protocol, BundleRequest, BundleResponse, ChainkitBehaviour,
    ChainkitEvent, Command,
};
use crate::error::DiscoveryError;
use crate::lock::RepoLock;
use crate::state::DiscoveryState;
use crate::store::ContentStore;

/// How long `Peers` waits for the DHT to surface providers before giving
/// up.
pub const FIND_PROVIDERS_TIMEOUT: Duration = Duration::from_secs(10);

/// `Peers` returns at most this many providers, each required to have at
/// least one known multiaddress.
pub const MAX_PEERS: usize = 10;

/// Per-peer multiaddresses learned from Kademlia routing updates and
/// established connections, never from a peer's own self-report. The
/// source [`PeerInfo::ip`] enrichment reads from this map, not from
/// whatever the remote peer claims about itself.
type PeerAddressBook = Arc<Mutex<HashMap<PeerId, Vec<Multiaddr>>>>;

/// Extracts the IPv4 octet-strings out of `addrs`' `/ip4/.../...` components.
fn ipv4_components(addrs: &[Multiaddr]) -> Vec<String> {
    addrs
        .iter()
        .filter_map(|addr| {
            addr.iter().find_map(|proto| match proto {
                Protocol::Ip4(ip) => Some(ip.to_string()),
                _ => None,
            })
        })
        .collect()
}

/// The chainkit IPFS-style bootstrap peer list, unchanged from
/// `discovery/discovery.go`.
pub const BOOTSTRAP_PEERS: &[&str] = &[
    "/ip4/104.131.131.82/tcp/4001/p2p/QmaCpDMGvV2BGHeYERUEnRQAwe3N8SzbUtfsmvsqQLuvuJ",
    "/ip4/104.236.179.241/tcp/4001/p2p/QmSoLPppuBtQSGwKDZT2M73ULpjvfd3aZ6ha4oFGL1KrGM",
    "/ip4/104.236.76.40/tcp/4001/p2p/QmSoLV4Bbm51jM9C4gDYZQ9Cy3U6aXMJDAbzgu2fzaDs64",
];

pub struct DiscoveryNode {
    _lock: RepoLock,
    local_peer_id: PeerId,
    commands: mpsc::Sender<Command>,
    store: Arc<ContentStore>,
    /// Current peer info announced on the membership protocol; a
    /// `parking_lot::Mutex` cell rather than a one-shot so repeated
    /// `Announce` calls update, not replace, the installed handler
    /// (SPEC_FULL.md §6 redesign flag).
    current_info: Arc<Mutex<Option<PeerInfo>>>,
    bootstrapped: Arc<AtomicBool>,
    state: Arc<Mutex<DiscoveryState>>,
    task: tokio::task::JoinHandle<()>,
}

impl DiscoveryNode {
    /// Starts the discovery server rooted at `repo_dir`, listening on
    /// `listen_port` (0 = OS-assigned). Runs the `Uninit -> Locking ->
    /// Initializing -> Online` transition synchronously before returning.
    pub async fn start(repo_dir: &Path, listen_port: u16) -> Result<Self, DiscoveryError> {
        let state = Arc::new(Mutex::new(DiscoveryState::Uninit));
        *state.lock() = DiscoveryState::Locking;
        let lock = RepoLock::acquire(repo_dir)?;

        *state.lock() = DiscoveryState::Initializing;
        let keypair = identity::Keypair::generate_ed25519();
        let local_peer_id = keypair.public().to_peer_id();

        let mut swarm = build_swarm(keypair).map_err(DiscoveryError::Transport)?;
        let listen_addr: Multiaddr = format!("/ip4/0.0.0.0/tcp/{listen_port}")
            .parse()
            .map_err(|e: libp2p::multiaddr::Error| DiscoveryError::Transport(e.to_string()))?;
        swarm
            .listen_on(listen_addr)
            .map_err(|e| DiscoveryError::Transport(e.to_string()))?;

        let (cmd_tx, cmd_rx) = mpsc::channel(128);
        let store = Arc::new(ContentStore::new());
        let current_info = Arc::new(Mutex::new(None));
        let bootstrapped = Arc::new(AtomicBool::new(false));
        let peer_addresses: PeerAddressBook = Arc::new(Mutex::new(HashMap::new()));

        let task = tokio::spawn(run_swarm_loop(
            swarm,
            cmd_rx,
            store.clone(),
            current_info.clone(),
            bootstrapped.clone(),
            peer_addresses.clone(),
        ));

        for addr in BOOTSTRAP_PEERS {
            if let Ok(addr) = addr.parse::<Multiaddr>() {
                let _ = cmd_tx.send(Command::Dial(addr)).await;
            }
        }

        *state.lock() = DiscoveryState::Online;
        info!(%local_peer_id, "discovery server online");

        Ok(Self {
            _lock: lock,
            local_peer_id,
            commands: cmd_tx,
            store,
            current_info,
            bootstrapped,
            state,
            task,
        })
    }

    pub fn local_peer_id(&self) -> PeerId {
        self.local_peer_id
    }

    pub fn state(&self) -> DiscoveryState {
        *self.state.lock()
    }

    /// Waits for at least one bootstrap peer to connect. Gates `Announce`
    /// and `Peers`, matching the `connectedCh` latch semantics.
    pub async fn wait_connected(&self) {
        while !self.bootstrapped.load(Ordering::SeqCst) {
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
    }

    /// Registers `dir` as the local content for `chain_id` and starts
    /// providing it on the DHT. Installs (or updates) the membership
    /// handler that answers `/chainkit/0.1.0` requests with `info`.
    /// Registers `dir` as the local source of truth for `chain_id`. Called
    /// once by `Publish` (`ck-publish`) right after it stages the sandbox
    /// directory and derives the chain ID — distinct from [`Self::announce`],
    /// which broadcasts a peer's membership info and is re-invoked on every
    /// supervisor announce-loop iteration.
    pub fn register_content(&self, chain_id: &ChainId, dir: PathBuf) {
        self.store.register(chain_id, dir);
    }

    /// Installs/updates the membership stream handler's current `PeerInfo`
    /// and provides `chain_id` in the DHT. Repeated calls update (not
    /// replace) the installed handler, per SPEC_FULL.md §6.
    pub async fn announce(&self, chain_id: &ChainId, info: PeerInfo) -> Result<(), DiscoveryError> {
        *self.current_info.lock() = Some(info);
        self.commands
            .send(Command::StartProviding(chain_id.cid_segment().to_string()))
            .await
            .map_err(|_| DiscoveryError::Closed)?;
        Ok(())
    }

    /// Finds peers providing `chain_id`, excluding ourselves, within
    /// [`FIND_PROVIDERS_TIMEOUT`].
    pub async fn peers(&self, chain_id: &ChainId) -> Result<Vec<PeerId>, DiscoveryError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.commands
            .send(Command::FindProviders {
                chain_id: chain_id.cid_segment().to_string(),
                reply: reply_tx,
            })
            .await
            .map_err(|_| DiscoveryError::Closed)?;

        let providers = tokio::time::timeout(FIND_PROVIDERS_TIMEOUT, reply_rx)
            .await
            .map_err(|_| DiscoveryError::FindProvidersTimedOut(FIND_PROVIDERS_TIMEOUT))?
            .map_err(|_| DiscoveryError::Closed)?;

        Ok(providers
            .into_iter()
            .filter(|p| *p != self.local_peer_id)
            .collect())
    }

    /// Requests `peer`'s currently-announced [`PeerInfo`] over the
    /// `/chainkit/0.1.0` protocol. Fails if `peer` has never called
    /// [`DiscoveryNode::announce`] (it has nothing to serve) or is
    /// unreachable.
    pub async fn peer_info(&self, peer: PeerId) -> Result<PeerInfo, DiscoveryError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.commands
            .send(Command::RequestPeerInfo {
                peer,
                reply: reply_tx,
            })
            .await
            .map_err(|_| DiscoveryError::Closed)?;
        reply_rx.await.map_err(|_| DiscoveryError::Closed)?
    }

    /// Fetches a published bundle's manifest/genesis/image bytes from
    /// `peer` (found via [`DiscoveryNode::peers`]).
    pub async fn fetch_bundle(
        &self,
        peer: PeerId,
        chain_id: &ChainId,
    ) -> Result<BundleResponse, DiscoveryError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.commands
            .send(Command::FetchBundle {
                peer,
                chain_id: chain_id.cid_segment().to_string(),
                reply: reply_tx,
            })
            .await
            .map_err(|_| DiscoveryError::Closed)?;
        reply_rx.await.map_err(|_| DiscoveryError::Closed)?
    }

    /// Shuts the server down, releasing the repo lock.
    pub async fn stop(mut self) {
        *self.state.lock() = DiscoveryState::Closed;
        self.task.abort();
        let _ = &mut self.task;
    }
}

fn build_swarm(keypair: identity::Keypair) -> Result<Swarm<ChainkitBehaviour>, String> {
    SwarmBuilder::with_existing_identity(keypair)
        .with_tokio()
        .with_tcp(
            tcp::Config::default(),
            noise::Config::new,
            yamux::Config::default,
        )
        .map_err(|e| e.to_string())?
        .with_behaviour(|key| {
            let peer_id = key.public().to_peer_id();
            let kad = kad::Behaviour::new(peer_id, MemoryStore::new(peer_id));
            let peer_info = request_response::Behaviour::new(
                [(peer_info_protocol(), ProtocolSupport::Full)],
                request_response::Config::default(),
            );
            let bundle = request_response::Behaviour::new(
                [(bundle_protocol(), ProtocolSupport::Full)],
                request_response::Config::default(),
            );
            ChainkitBehaviour {
                kad,
                peer_info,
                bundle,
            }
        })
        .map_err(|e| e.to_string())?
        .build()
}

async fn run_swarm_loop(
    mut swarm: Swarm<ChainkitBehaviour>,
    mut commands: mpsc::Receiver<Command>,
    store: Arc<ContentStore>,
    current_info: Arc<Mutex<Option<PeerInfo>>>,
    bootstrapped: Arc<AtomicBool>,
    peer_addresses: PeerAddressBook,
) {
    let mut pending_finds: HashMap<kad::QueryId, oneshot::Sender<Vec<PeerId>>> = HashMap::new();
    let mut pending_bundles: HashMap<
        request_response::OutboundRequestId,
        oneshot::Sender<Result<BundleResponse, DiscoveryError>>,
    > = HashMap::new();
    let mut pending_peer_info: HashMap<
        request_response::OutboundRequestId,
        (PeerId, oneshot::Sender<Result<PeerInfo, DiscoveryError>>),
    > = HashMap::new();

    loop {
        tokio::select! {
            event = swarm.select_next_some() => handle_swarm_event(
                event,
                &mut swarm,
                &store,
                &current_info,
                &bootstrapped,
                &peer_addresses,
                &mut pending_finds,
                &mut pending_bundles,
                &mut pending_peer_info,
            ),
            cmd = commands.recv() => match cmd {
                Some(cmd) => handle_command(
                    cmd,
                    &mut swarm,
                    &mut pending_finds,
                    &mut pending_bundles,
                    &mut pending_peer_info,
                ),
                None => break,
            }
        }
    }
}

fn handle_command(
    cmd: Command,
    swarm: &mut Swarm<ChainkitBehaviour>,
    pending_finds: &mut HashMap<kad::QueryId, oneshot::Sender<Vec<PeerId>>>,
    pending_bundles: &mut HashMap<
        request_response::OutboundRequestId,
        oneshot::Sender<Result<BundleResponse, DiscoveryError>>,
    >,
    pending_peer_info: &mut HashMap<
        request_response::OutboundRequestId,
        (PeerId, oneshot::Sender<Result<PeerInfo, DiscoveryError>>),
    >,
) {
    match cmd {
        Command::Dial(addr) => {
            if let Err(err) = swarm.dial(addr.clone()) {
                warn!(%addr, %err, "dial failed");
            }
        }
        Command::StartProviding(key) => {
            let record_key = kad::RecordKey::new(&key);
            if let Err(err) = swarm.behaviour_mut().kad.start_providing(record_key) {
                warn!(%err, "failed to start providing chain id");
            }
        }
        Command::FindProviders { chain_id, reply } => {
            let record_key = kad::RecordKey::new(&chain_id);
            let query_id = swarm.behaviour_mut().kad.get_providers(record_key);
            pending_finds.insert(query_id, reply);
        }
        Command::RequestPeerInfo { peer, reply } => {
            let id = swarm.behaviour_mut().peer_info.send_request(&peer, ());
            pending_peer_info.insert(id, (peer, reply));
        }
        Command::FetchBundle {
            peer,
            chain_id,
            reply,
        } => {
            let id = swarm
                .behaviour_mut()
                .bundle
                .send_request(&peer, BundleRequest { chain_id });
            pending_bundles.insert(id, reply);
        }
        Command::RespondBundle { channel, response } => {
            let _ = swarm.behaviour_mut().bundle.send_response(channel, response);
        }
    }
}

fn handle_swarm_event(
    event: SwarmEvent<ChainkitEvent>,
    swarm: &mut Swarm<ChainkitBehaviour>,
    store: &Arc<ContentStore>,
    current_info: &Arc<Mutex<Option<PeerInfo>>>,
    bootstrapped: &Arc<AtomicBool>,
    peer_addresses: &PeerAddressBook,
    pending_finds: &mut HashMap<kad::QueryId, oneshot::Sender<Vec<PeerId>>>,
    pending_bundles: &mut HashMap<
        request_response::OutboundRequestId,
        oneshot::Sender<Result<BundleResponse, DiscoveryError>>,
    >,
    pending_peer_info: &mut HashMap<
        request_response::OutboundRequestId,
        (PeerId, oneshot::Sender<Result<PeerInfo, DiscoveryError>>),
    >,
) {
    match event {
        SwarmEvent::NewListenAddr { address, .. } => {
            debug!(%address, "discovery server listening");
        }
        SwarmEvent::ConnectionEstablished {
            peer_id, endpoint, ..
        } => {
            bootstrapped.store(true, Ordering::SeqCst);
            let addr = endpoint.get_remote_address().clone();
            let mut book = peer_addresses.lock();
            let addrs = book.entry(peer_id).or_default();
            if !addrs.contains(&addr) {
                addrs.push(addr);
            }
        }
        SwarmEvent::Behaviour(ChainkitEvent::Kad(kad::Event::RoutingUpdated {
            peer,
            addresses,
            ..
        })) => {
            let mut book = peer_addresses.lock();
            let entry = book.entry(peer).or_default();
            for addr in addresses.iter() {
                if !entry.contains(addr) {
                    entry.push(addr.clone());
                }
            }
        }
        SwarmEvent::Behaviour(ChainkitEvent::Kad(kad::Event::OutboundQueryProgressed {
            id,
            result: kad::QueryResult::GetProviders(result),
            ..
        })) => {
            if let Some(reply) = pending_finds.remove(&id) {
                let peers = match result {
                    Ok(kad::GetProvidersOk::FoundProviders { providers, .. }) => {
                        let book = peer_addresses.lock();
                        providers
                            .into_iter()
                            .filter(|p| book.get(p).is_some_and(|addrs| !addrs.is_empty()))
                            .take(MAX_PEERS)
                            .collect()
                    }
                    _ => Vec::new(),
                };
                let _ = reply.send(peers);
            }
        }
        SwarmEvent::Behaviour(ChainkitEvent::PeerInfo(request_response::Event::Message {
            message,
            ..
        })) => match message {
            // We are the announcing side: reply with our own current info,
            // or drop the channel (causing the requester's outbound to
            // fail) if we haven't announced anything yet.
            request_response::Message::Request { channel, .. } => {
                if let Some(info) = current_info.lock().clone() {
                    let _ = swarm.behaviour_mut().peer_info.send_response(channel, info);
                }
            }
            request_response::Message::Response {
                request_id,
                response,
            } => {
                if let Some((peer, reply)) = pending_peer_info.remove(&request_id) {
                    // `response.ip` is whatever the remote reported about
                    // itself (always empty, see `PeerInfo::new`). We are
                    // the searcher, so we fill it in ourselves from the
                    // multiaddresses we've observed for `peer`.
                    let mut response = response;
                    if let Some(addrs) = peer_addresses.lock().get(&peer) {
                        response.ip = ipv4_components(addrs);
                    }
                    let _ = reply.send(Ok(response));
                }
            }
        },
        SwarmEvent::Behaviour(ChainkitEvent::PeerInfo(
            request_response::Event::OutboundFailure {
                request_id, error, ..
            },
        )) => {
            if let Some((_, reply)) = pending_peer_info.remove(&request_id) {
                let _ = reply.send(Err(DiscoveryError::Transport(error.to_string())));
            }
        }
        SwarmEvent::Behaviour(ChainkitEvent::Bundle(
            request_response::Event::Message { message, .. },
        )) => match message {
            request_response::Message::Request { request, channel, .. } => {
                serve_bundle_request(swarm, store, request, channel);
            }
            request_response::Message::Response { request_id, response } => {
                if let Some(reply) = pending_bundles.remove(&request_id) {
                    let _ = reply.send(Ok(response));
                }
            }
        },
        SwarmEvent::Behaviour(ChainkitEvent::Bundle(
            request_response::Event::OutboundFailure { request_id, error, .. },
        )) => {
            if let Some(reply) = pending_bundles.remove(&request_id) {
                let _ = reply.send(Err(DiscoveryError::Transport(error.to_string())));
            }
        }
        _ => {}
    }
}

fn serve_bundle_request(
    swarm: &mut Swarm<ChainkitBehaviour>,
    store: &Arc<ContentStore>,
    request: BundleRequest,
    channel: request_response::ResponseChannel<BundleResponse>,
) {
    let chain_id = ck_core::ChainId::new(request.chain_id);
    let Some(dir) = store.resolve(&chain_id) else {
        warn!(chain_id = %chain_id, "bundle requested for unknown chain id");
        return;
    };
    let response = match ContentStore::read_metadata(&dir) {
        Ok((manifest, genesis)) => {
            let image = std::fs::read(ContentStore::image_path(&dir)).unwrap_or_default();
            BundleResponse {
                manifest,
                genesis,
                image,
            }
        }
        Err(err) => {
            warn!(%err, "failed to read bundle from disk");
            return;
        }
    };
    let _ = swarm.behaviour_mut().bundle.send_response(channel, response);
}

/// Cancellation-aware variant: stops the node when `token` fires.
pub async fn run_until_cancelled(node: DiscoveryNode, token: CancellationToken) {
    token.cancelled().await;
    node.stop().await;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ipv4_components_extracts_only_ip4_protocol() {
        let addrs: Vec<Multiaddr> = vec![
            "/ip4/10.0.0.1/tcp/26656".parse().unwrap(),
            "/ip6/::1/tcp/26656".parse().unwrap(),
            "/ip4/10.0.0.2/tcp/26657".parse().unwrap(),
        ];
        assert_eq!(
            ipv4_components(&addrs),
            vec!["10.0.0.1".to_string(), "10.0.0.2".to_string()]
        );
    }

    #[test]
    fn ipv4_components_of_empty_list_is_empty() {
        assert!(ipv4_components(&[]).is_empty());
    }
}
