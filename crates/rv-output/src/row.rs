//! Plain data row types written by output backends.

use rv_checkpoint::{Checkpoint, CheckpointKind};
use rv_network::Network;

/// One checkpoint with its link given by network-file id.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckpointRow {
    pub person:  String,
    pub time:    f64,
    pub kind:    CheckpointKind,
    pub vehicle: Option<String>,
    /// The link's `id` attribute; `None` for vehicle checkpoints.
    pub link:    Option<String>,
}

impl CheckpointRow {
    /// Resolve `checkpoint.link` through `link_ids`, indexed by `LinkId`.
    pub fn new(checkpoint: &Checkpoint, link_ids: &[String]) -> Self {
        Self {
            person:  checkpoint.person.clone(),
            time:    checkpoint.time,
            kind:    checkpoint.kind,
            vehicle: checkpoint.vehicle.clone(),
            link:    checkpoint.link.and_then(|l| link_ids.get(l.index()).cloned()),
        }
    }
}

/// Network-file ids of every link, indexed by `LinkId`.
pub fn link_ids(network: &Network) -> Vec<String> {
    network.links().iter().map(|l| l.xml_id.clone()).collect()
}
