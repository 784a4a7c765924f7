//! Routing trait and default Dijkstra implementation.
//!
//! Route display asks for the shortest path between two nodes picked on the
//! map.  Edge weight is [`Link::length`](crate::Link::length) in metres.
//!
//! [`shortest_path`] is the plain contract: an ordered list of links, empty
//! when the target is unreachable (or equals the source).  The [`Router`]
//! trait wraps it for callers that prefer an error over an empty path and
//! want to swap in another algorithm.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use rv_core::{LinkId, NodeId};

use crate::NetworkError;
use crate::network::Network;

// ── Route ─────────────────────────────────────────────────────────────────────

/// The result of a routing query: links in travel order and their total
/// length.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    pub links:  Vec<LinkId>,
    /// Sum of link lengths in metres.
    pub length: f64,
}

impl Route {
    /// `true` if the source and destination are the same node.
    pub fn is_trivial(&self) -> bool {
        self.links.is_empty()
    }
}

// ── Router trait ──────────────────────────────────────────────────────────────

/// Pluggable routing engine.
pub trait Router: Send + Sync {
    /// Compute a route from `from` to `to`.
    ///
    /// `from == to` yields an empty route; an unreachable target yields
    /// [`NetworkError::NoRoute`].
    fn route(&self, network: &Network, from: NodeId, to: NodeId) -> Result<Route, NetworkError>;
}

// ── DijkstraRouter ────────────────────────────────────────────────────────────

/// Standard Dijkstra over the CSR graph, weighted by link length.
pub struct DijkstraRouter;

impl Router for DijkstraRouter {
    fn route(&self, network: &Network, from: NodeId, to: NodeId) -> Result<Route, NetworkError> {
        for node in [from, to] {
            if node.index() >= network.node_count() {
                return Err(NetworkError::NodeNotFound(node));
            }
        }
        dijkstra(network, from, to)
            .map(|(links, length)| Route { links, length })
            .ok_or(NetworkError::NoRoute { from, to })
    }
}

/// Shortest path from `source` to `target` as an ordered list of links.
///
/// Returns an empty list when no path exists, when `source == target`, or
/// when either node is not part of `network`.
pub fn shortest_path(network: &Network, source: NodeId, target: NodeId) -> Vec<LinkId> {
    if source.index() >= network.node_count() || target.index() >= network.node_count() {
        return Vec::new();
    }
    dijkstra(network, source, target)
        .map(|(links, _)| links)
        .unwrap_or_default()
}

// ── Dijkstra internals ────────────────────────────────────────────────────────

/// Heap entry.  Ordered so that `BinaryHeap` (a max-heap) pops the smallest
/// distance first; ties go to the lower `NodeId` for determinism.
#[derive(Copy, Clone, PartialEq)]
struct Candidate {
    dist: f64,
    node: NodeId,
}

impl Eq for Candidate {}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .dist
            .total_cmp(&self.dist)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Returns `(links, total_length)` or `None` if `to` is unreachable.
///
/// Only nodes with a finite tentative distance ever enter the heap, so the
/// search stops as soon as the reachable part of the graph is exhausted
/// instead of visiting every node.
fn dijkstra(network: &Network, from: NodeId, to: NodeId) -> Option<(Vec<LinkId>, f64)> {
    if from == to {
        return Some((Vec::new(), 0.0));
    }

    let n = network.node_count();
    let mut dist      = vec![f64::INFINITY; n];
    let mut prev_link = vec![LinkId::INVALID; n];

    dist[from.index()] = 0.0;

    let mut heap = BinaryHeap::new();
    heap.push(Candidate { dist: 0.0, node: from });

    while let Some(Candidate { dist: d, node }) = heap.pop() {
        if node == to {
            return Some((reconstruct(network, &prev_link, to), d));
        }

        // Skip stale heap entries.
        if d > dist[node.index()] {
            continue;
        }

        for link in network.out_links(node) {
            let l = network.link(link);
            let next = d + l.length;
            if next < dist[l.to.index()] {
                dist[l.to.index()] = next;
                prev_link[l.to.index()] = link;
                heap.push(Candidate { dist: next, node: l.to });
            }
        }
    }

    None
}

fn reconstruct(network: &Network, prev_link: &[LinkId], to: NodeId) -> Vec<LinkId> {
    let mut links = Vec::new();
    let mut cur = to;
    loop {
        let l = prev_link[cur.index()];
        if l == LinkId::INVALID {
            break;
        }
        links.push(l);
        cur = network.link(l).from;
    }
    links.reverse();
    links
}
