//! Network representation and builder.
//!
//! # Data layout
//!
//! Links are stored in **Compressed Sparse Row (CSR)** order.  Given a
//! `NodeId n`, its outgoing links occupy the slice:
//!
//! ```text
//! links[ node_out_start[n] .. node_out_start[n+1] ]
//! ```
//!
//! `LinkId`s are positions in that sorted order, so iterating a node's
//! outgoing links is a contiguous scan.  Event logs reference links by the
//! string id from the network file; [`Network::link_by_xml_id`] resolves
//! those to the dense id.
//!
//! # Spatial index
//!
//! An R-tree (via `rstar`) maps `(x, y)` to the nearest `NodeId`.  Used to
//! snap picked map positions to nodes before a shortest-path query.

use std::collections::{HashMap, HashSet};

use rstar::{AABB, PointDistance, RTree, RTreeObject};

use rv_core::{LinkId, NodeId, Point};

use crate::{NetworkError, NetworkResult};

// ── R-tree node entry ─────────────────────────────────────────────────────────

#[derive(Clone)]
struct NodeEntry {
    point: [f64; 2],
    id:    NodeId,
}

impl RTreeObject for NodeEntry {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for NodeEntry {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.point[0] - point[0];
        let dy = self.point[1] - point[1];
        dx * dx + dy * dy
    }
}

// ── Nodes and links ───────────────────────────────────────────────────────────

/// A network vertex.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Node {
    pub id:      NodeId,
    /// The `id` attribute from the network file.
    pub xml_id:  String,
    pub pos:     Point,
    pub kind:    Option<String>,
    pub orig_id: Option<String>,
}

/// Link attributes that routing does not need but that the network file
/// carries and that [`write_network`](crate::write_network) reproduces.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LinkAttrs {
    /// Free-flow speed in m/s.
    pub freespeed: f64,
    /// Flow capacity per `capperiod`.
    pub capacity:  f64,
    pub permlanes: f64,
    pub oneway:    bool,
    /// Comma-separated allowed modes, e.g. `"car"`.
    pub modes:     String,
    pub orig_id:   Option<String>,
    pub kind:      Option<String>,
}

impl Default for LinkAttrs {
    fn default() -> Self {
        Self {
            freespeed: 13.89,
            capacity:  3_600.0,
            permlanes: 1.0,
            oneway:    true,
            modes:     "car".to_owned(),
            orig_id:   None,
            kind:      None,
        }
    }
}

/// A directed network edge.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Link {
    pub id:     LinkId,
    /// The `id` attribute from the network file.
    pub xml_id: String,
    pub from:   NodeId,
    pub to:     NodeId,
    /// Length in metres.  Used as the shortest-path edge weight.
    pub length: f64,
    pub attrs:  LinkAttrs,
}

/// Network-level attributes of the `<network>` and `<links>` elements.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NetworkMeta {
    pub name:                 Option<String>,
    /// Capacity period as `HH:MM:SS`.
    pub capperiod:            String,
    pub effective_cell_size:  f64,
    pub effective_lane_width: f64,
}

impl Default for NetworkMeta {
    fn default() -> Self {
        Self {
            name:                 None,
            capperiod:            "01:00:00".to_owned(),
            effective_cell_size:  7.5,
            effective_lane_width: 3.75,
        }
    }
}

// ── Network ───────────────────────────────────────────────────────────────────

/// Directed network in CSR format plus a spatial index for node snapping.
///
/// Immutable once built; do not construct directly, use [`NetworkBuilder`].
pub struct Network {
    pub meta: NetworkMeta,

    nodes: Vec<Node>,

    /// Links sorted by source node.  Indexed by `LinkId`.
    links: Vec<Link>,

    /// CSR row pointer.  Outgoing links of node `n` are at LinkIds
    /// `node_out_start[n] .. node_out_start[n+1]`.  Length = `node_count + 1`.
    node_out_start: Vec<u32>,

    node_index: HashMap<String, NodeId>,
    link_index: HashMap<String, LinkId>,

    spatial_idx: RTree<NodeEntry>,
}

impl Network {
    /// Construct an empty network with no nodes or links.
    pub fn empty() -> Self {
        NetworkBuilder::new().build()
    }

    // ── Dimensions ────────────────────────────────────────────────────────

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    // ── Lookup ────────────────────────────────────────────────────────────

    #[inline]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    #[inline]
    pub fn link(&self, id: LinkId) -> &Link {
        &self.links[id.index()]
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    /// Resolve a node id as written in the network file.
    pub fn node_by_xml_id(&self, xml_id: &str) -> Option<NodeId> {
        self.node_index.get(xml_id).copied()
    }

    /// Resolve a link id as written in the network file (and in event logs).
    pub fn link_by_xml_id(&self, xml_id: &str) -> Option<LinkId> {
        self.link_index.get(xml_id).copied()
    }

    // ── Graph traversal ───────────────────────────────────────────────────

    /// Iterator over the `LinkId`s of all outgoing links from `node`.
    #[inline]
    pub fn out_links(&self, node: NodeId) -> impl Iterator<Item = LinkId> + '_ {
        let start = self.node_out_start[node.index()] as usize;
        let end   = self.node_out_start[node.index() + 1] as usize;
        (start..end).map(|i| LinkId(i as u32))
    }

    #[inline]
    pub fn out_degree(&self, node: NodeId) -> usize {
        let start = self.node_out_start[node.index()] as usize;
        let end   = self.node_out_start[node.index() + 1] as usize;
        end - start
    }

    // ── Spatial queries ───────────────────────────────────────────────────

    /// Return the `NodeId` of the node nearest to `pos`.
    ///
    /// Returns `None` only if the network has no nodes.
    pub fn nearest_node(&self, pos: Point) -> Option<NodeId> {
        self.spatial_idx
            .nearest_neighbor(&[pos.x, pos.y])
            .map(|e| e.id)
    }

    /// Return up to `k` nearest nodes to `pos`, sorted by ascending distance.
    pub fn k_nearest_nodes(&self, pos: Point, k: usize) -> Vec<NodeId> {
        self.spatial_idx
            .nearest_neighbor_iter(&[pos.x, pos.y])
            .take(k)
            .map(|e| e.id)
            .collect()
    }
}

// ── NetworkBuilder ────────────────────────────────────────────────────────────

/// Construct a [`Network`] incrementally, then call [`build`](Self::build).
///
/// Node ids come from the builder's own counter (sequential from 0), so two
/// networks built in the same process never share id state.
///
/// # Example
///
/// ```
/// use rv_core::Point;
/// use rv_network::{LinkAttrs, NetworkBuilder};
///
/// let mut b = NetworkBuilder::new();
/// let a = b.add_node("1", Point::new(0.0, 0.0)).unwrap();
/// let c = b.add_node("2", Point::new(100.0, 0.0)).unwrap();
/// b.add_link("12", a, c, 100.0, LinkAttrs::default()).unwrap();
/// let net = b.build();
/// assert_eq!(net.node_count(), 2);
/// assert_eq!(net.link_count(), 1);
/// ```
pub struct NetworkBuilder {
    meta:       NetworkMeta,
    nodes:      Vec<Node>,
    raw_links:  Vec<RawLink>,
    node_index: HashMap<String, NodeId>,
    link_ids:   HashSet<String>,
}

struct RawLink {
    xml_id: String,
    from:   NodeId,
    to:     NodeId,
    length: f64,
    attrs:  LinkAttrs,
}

impl NetworkBuilder {
    pub fn new() -> Self {
        Self {
            meta:       NetworkMeta::default(),
            nodes:      Vec::new(),
            raw_links:  Vec::new(),
            node_index: HashMap::new(),
            link_ids:   HashSet::new(),
        }
    }

    /// Pre-allocate for the expected number of nodes and links.
    pub fn with_capacity(nodes: usize, links: usize) -> Self {
        Self {
            meta:       NetworkMeta::default(),
            nodes:      Vec::with_capacity(nodes),
            raw_links:  Vec::with_capacity(links),
            node_index: HashMap::with_capacity(nodes),
            link_ids:   HashSet::with_capacity(links),
        }
    }

    pub fn meta_mut(&mut self) -> &mut NetworkMeta {
        &mut self.meta
    }

    /// Add a node and return its `NodeId` (sequential from 0).
    pub fn add_node(&mut self, xml_id: impl Into<String>, pos: Point) -> NetworkResult<NodeId> {
        self.add_node_with(xml_id, pos, None, None)
    }

    /// Add a node carrying the optional `type` and `origid` attributes.
    pub fn add_node_with(
        &mut self,
        xml_id:  impl Into<String>,
        pos:     Point,
        kind:    Option<String>,
        orig_id: Option<String>,
    ) -> NetworkResult<NodeId> {
        let xml_id = xml_id.into();
        if self.node_index.contains_key(&xml_id) {
            return Err(NetworkError::DuplicateId { kind: "node", id: xml_id });
        }
        let id = NodeId(self.nodes.len() as u32);
        self.node_index.insert(xml_id.clone(), id);
        self.nodes.push(Node { id, xml_id, pos, kind, orig_id });
        Ok(id)
    }

    /// Look up a node added earlier by its file id.
    pub fn node_by_xml_id(&self, xml_id: &str) -> Option<NodeId> {
        self.node_index.get(xml_id).copied()
    }

    /// Add a **directed** link from `from` to `to`.
    ///
    /// Both endpoints must already exist and `length` must be finite and
    /// non-negative (it is the shortest-path weight).
    pub fn add_link(
        &mut self,
        xml_id: impl Into<String>,
        from:   NodeId,
        to:     NodeId,
        length: f64,
        attrs:  LinkAttrs,
    ) -> NetworkResult<()> {
        let xml_id = xml_id.into();
        for node in [from, to] {
            if node.index() >= self.nodes.len() {
                return Err(NetworkError::NodeNotFound(node));
            }
        }
        if !length.is_finite() || length < 0.0 {
            return Err(NetworkError::InvalidLength { link: xml_id, length });
        }
        if !self.link_ids.insert(xml_id.clone()) {
            return Err(NetworkError::DuplicateId { kind: "link", id: xml_id });
        }
        self.raw_links.push(RawLink { xml_id, from, to, length, attrs });
        Ok(())
    }

    pub fn node_count(&self) -> usize { self.nodes.len() }
    pub fn link_count(&self) -> usize { self.raw_links.len() }

    /// Consume the builder and produce a [`Network`].
    ///
    /// Time complexity: O(E log E) for the link sort + O(N log N) for the
    /// R-tree bulk load.
    pub fn build(self) -> Network {
        let node_count = self.nodes.len();

        // Stable sort keeps file order among links of the same source node.
        let mut raw = self.raw_links;
        raw.sort_by_key(|l| l.from.0);

        let mut node_out_start = vec![0u32; node_count + 1];
        for l in &raw {
            node_out_start[l.from.index() + 1] += 1;
        }
        for i in 1..=node_count {
            node_out_start[i] += node_out_start[i - 1];
        }
        debug_assert_eq!(node_out_start[node_count] as usize, raw.len());

        let mut link_index = HashMap::with_capacity(raw.len());
        let links: Vec<Link> = raw
            .into_iter()
            .enumerate()
            .map(|(i, l)| {
                let id = LinkId(i as u32);
                link_index.insert(l.xml_id.clone(), id);
                Link {
                    id,
                    xml_id: l.xml_id,
                    from:   l.from,
                    to:     l.to,
                    length: l.length,
                    attrs:  l.attrs,
                }
            })
            .collect();

        let entries: Vec<NodeEntry> = self
            .nodes
            .iter()
            .map(|n| NodeEntry { point: [n.pos.x, n.pos.y], id: n.id })
            .collect();
        let spatial_idx = RTree::bulk_load(entries);

        Network {
            meta: self.meta,
            nodes: self.nodes,
            links,
            node_out_start,
            node_index: self.node_index,
            link_index,
            spatial_idx,
        }
    }
}

impl Default for NetworkBuilder {
    fn default() -> Self {
        Self::new()
    }
}
