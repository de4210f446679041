// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Port allocation: a 4-tuple of consecutive local TCP ports for the
//! explorer, the Tendermint RPC/P2P endpoints, and the IPFS swarm.
//! Grounded on the original `project/portmapper.go`.

use std::net::{SocketAddr, TcpListener, TcpStream};
use std::time::Duration;

use thiserror::Error;

/// Minimum port scanned by the allocator.
pub const MIN_PORT: u16 = 42000;
/// Exclusive upper bound of the scanned range.
pub const MAX_PORT: u16 = 60000;
/// Number of consecutive ports a single allocation occupies.
pub const NUM_PORTS: u16 = 4;
/// Step between candidate port ranges.
pub const PORT_STEP: u16 = 10;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PortsError {
    #[error("unable to allocate ports: range {min}-{max} exhausted")]
    PortsUnavailable { min: u16, max: u16 },
}

/// The four consecutive ports handed to a single node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortAllocation {
    pub explorer: u16,
    pub tendermint_rpc: u16,
    pub tendermint_p2p: u16,
    pub ipfs: u16,
}

impl PortAllocation {
    fn from_base(base: u16) -> Self {
        Self {
            explorer: base,
            tendermint_rpc: base + 1,
            tendermint_p2p: base + 2,
            ipfs: base + 3,
        }
    }
}

/// Scans `[MIN_PORT, MAX_PORT)` in `PORT_STEP`-wide strides for the first
/// range where all `NUM_PORTS` ports are simultaneously free, verified by
/// both listening and dialing (a container-held port may happily accept a
/// listen but will still answer a dial).
pub trait PortAllocator {
    fn allocate(&self) -> Result<PortAllocation, PortsError>;
}

/// The default allocator, probing real TCP sockets on `127.0.0.1`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TcpPortAllocator;

impl PortAllocator for TcpPortAllocator {
    fn allocate(&self) -> Result<PortAllocation, PortsError> {
        let mut base = MIN_PORT;
        while base < MAX_PORT {
            if range_available(base, NUM_PORTS) {
                return Ok(PortAllocation::from_base(base));
            }
            base += PORT_STEP;
        }
        Err(PortsError::PortsUnavailable {
            min: MIN_PORT,
            max: MAX_PORT,
        })
    }
}

fn range_available(base: u16, n: u16) -> bool {
    for i in 0..n {
        let port = base + i;
        if !port_free(port) {
            return false;
        }
    }
    true
}

fn port_free(port: u16) -> bool {
    let listener = match TcpListener::bind(("127.0.0.1", port)) {
        Ok(l) => l,
        Err(_) => return false,
    };
    drop(listener);

    // Double-check by attempting a short-lived dial: some container
    // runtimes hold a port such that listen() spuriously succeeds.
    let addr = SocketAddr::from((std::net::Ipv4Addr::LOCALHOST, port));
    match TcpStream::connect_timeout(&addr, Duration::from_millis(50)) {
        Ok(_) => false,
        Err(_) => true,
    }
}

#[cfg(any(test, feature = "test-support"))]
pub mod test_support {
    use super::*;
    use std::sync::atomic::{AtomicU16, Ordering};

    /// A deterministic allocator for tests: hands out disjoint ranges from
    /// an in-memory counter instead of touching real sockets.
    pub struct FakePortAllocator {
        next: AtomicU16,
    }

    impl FakePortAllocator {
        pub fn starting_at(base: u16) -> Self {
            Self {
                next: AtomicU16::new(base),
            }
        }
    }

    impl PortAllocator for FakePortAllocator {
        fn allocate(&self) -> Result<PortAllocation, PortsError> {
            let base = self.next.fetch_add(PORT_STEP, Ordering::SeqCst);
            if base >= MAX_PORT {
                return Err(PortsError::PortsUnavailable {
                    min: MIN_PORT,
                    max: MAX_PORT,
                });
            }
            Ok(PortAllocation::from_base(base))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocates_four_consecutive_ports() {
        let alloc = TcpPortAllocator.allocate().expect("ports available");
        assert_eq!(alloc.tendermint_rpc, alloc.explorer + 1);
        assert_eq!(alloc.tendermint_p2p, alloc.explorer + 2);
        assert_eq!(alloc.ipfs, alloc.explorer + 3);
        assert_eq!(alloc.explorer % PORT_STEP, MIN_PORT % PORT_STEP);
    }

    #[test]
    fn successive_allocations_are_disjoint() {
        use test_support::FakePortAllocator;
        let a = FakePortAllocator::starting_at(MIN_PORT);
        let first = a.allocate().unwrap();
        let second = a.allocate().unwrap();
        assert_ne!(first.explorer, second.explorer);
        assert!(second.explorer >= first.ipfs);
    }

    #[test]
    fn exhausted_range_is_reported() {
        use test_support::FakePortAllocator;
        let a = FakePortAllocator::starting_at(MAX_PORT);
        assert_eq!(
            a.allocate(),
            Err(PortsError::PortsUnavailable {
                min: MIN_PORT,
                max: MAX_PORT
            })
        );
    }
}

#[cfg(test)]
mod proptests {
    use super::test_support::FakePortAllocator;
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    fn tuple_ports(alloc: PortAllocation) -> [u16; 4] {
        [
            alloc.explorer,
            alloc.tendermint_rpc,
            alloc.tendermint_p2p,
            alloc.ipfs,
        ]
    }

    proptest! {
        /// Two allocators racing from disjoint starting ranges never hand
        /// out overlapping port tuples, no matter how their allocations
        /// interleave across threads.
        #[test]
        fn concurrent_allocators_never_overlap(
            base_a in (MIN_PORT..MAX_PORT / 2).prop_map(|b| b - b % PORT_STEP),
            count in 1usize..8,
        ) {
            let span = count as u16 * PORT_STEP;
            let base_b = base_a + span + NUM_PORTS;
            prop_assume!(base_b + span < MAX_PORT);

            let a = Arc::new(FakePortAllocator::starting_at(base_a));
            let b = Arc::new(FakePortAllocator::starting_at(base_b));

            let (a2, b2) = (a.clone(), b.clone());
            let handle_a = std::thread::spawn(move || {
                (0..count)
                    .map(|_| a2.allocate().unwrap())
                    .collect::<Vec<_>>()
            });
            let handle_b = std::thread::spawn(move || {
                (0..count)
                    .map(|_| b2.allocate().unwrap())
                    .collect::<Vec<_>>()
            });

            let allocs_a = handle_a.join().unwrap();
            let allocs_b = handle_b.join().unwrap();

            let mut seen = HashSet::new();
            for alloc in allocs_a.into_iter().chain(allocs_b) {
                for port in tuple_ports(alloc) {
                    prop_assert!(seen.insert(port), "port {port} allocated to two concurrent allocators");
                }
            }
        }
    }
}
