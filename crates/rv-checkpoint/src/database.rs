//! The finished, read-only checkpoint database.

use crate::checkpoint::Checkpoint;
use crate::PersonMap;

/// Checkpoints grouped by person, plus the time span of the events they were
/// built from.
///
/// Produced by [`build_checkpoints`](crate::build_checkpoints); immutable
/// afterwards, so it can be handed to a renderer on another thread.
#[derive(Debug, Default)]
pub struct CheckpointDatabase {
    /// Per-person sequences in first-seen person order.
    tracks: Vec<Track>,
    index:  PersonMap<usize>,
    bounds: Option<(f64, f64)>,
    len:    usize,
}

#[derive(Debug)]
struct Track {
    person:      String,
    checkpoints: Vec<Checkpoint>,
}

impl CheckpointDatabase {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, checkpoint: Checkpoint) {
        let slot = match self.index.get(&checkpoint.person) {
            Some(&i) => i,
            None => {
                let i = self.tracks.len();
                self.index.insert(checkpoint.person.clone(), i);
                self.tracks.push(Track {
                    person:      checkpoint.person.clone(),
                    checkpoints: Vec::new(),
                });
                i
            }
        };
        self.tracks[slot].checkpoints.push(checkpoint);
        self.len += 1;
    }

    pub(crate) fn observe_time(&mut self, t: f64) {
        self.bounds = Some(match self.bounds {
            Some((lo, hi)) => (lo.min(t), hi.max(t)),
            None => (t, t),
        });
    }

    // ── Queries ───────────────────────────────────────────────────────────

    /// `(min, max)` over every event the database was built from; `None` if
    /// there were none.
    pub fn time_bounds(&self) -> Option<(f64, f64)> {
        self.bounds
    }

    pub fn min_time(&self) -> f64 {
        self.bounds.map_or(0.0, |(lo, _)| lo)
    }

    pub fn max_time(&self) -> f64 {
        self.bounds.map_or(0.0, |(_, hi)| hi)
    }

    /// Total number of checkpoints.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn person_count(&self) -> usize {
        self.tracks.len()
    }

    /// Person ids in the order they first appeared in the log.
    pub fn persons(&self) -> impl Iterator<Item = &str> + '_ {
        self.tracks.iter().map(|t| t.person.as_str())
    }

    /// Checkpoints of `person` in log order; empty for unknown persons.
    pub fn checkpoints(&self, person: &str) -> &[Checkpoint] {
        match self.index.get(person) {
            Some(&i) => &self.tracks[i].checkpoints,
            None => &[],
        }
    }

    /// Every checkpoint, grouped by person.
    pub fn iter(&self) -> impl Iterator<Item = &Checkpoint> + '_ {
        self.tracks.iter().flat_map(|t| t.checkpoints.iter())
    }

    /// The latest checkpoint of `person` at or before `t`.
    pub fn checkpoint_at(&self, person: &str, t: f64) -> Option<&Checkpoint> {
        let cps = self.checkpoints(person);
        let n = cps.partition_point(|c| c.time <= t);
        n.checked_sub(1).map(|i| &cps[i])
    }
}
