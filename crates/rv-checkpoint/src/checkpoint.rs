//! A single state change of one person.

use rv_core::LinkId;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CheckpointKind {
    /// Boarded `vehicle`.
    PersonEnters,
    /// Alighted `vehicle`, or arrived at the end of a leg (`vehicle == None`).
    PersonLeaves,
    LinkEntered,
    LinkLeft,
}

impl CheckpointKind {
    pub fn as_str(self) -> &'static str {
        match self {
            CheckpointKind::PersonEnters => "person_enters",
            CheckpointKind::PersonLeaves => "person_leaves",
            CheckpointKind::LinkEntered => "link_entered",
            CheckpointKind::LinkLeft => "link_left",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Checkpoint {
    pub time:    f64,
    pub person:  String,
    pub vehicle: Option<String>,
    pub link:    Option<LinkId>,
    pub kind:    CheckpointKind,
}

impl Checkpoint {
    pub fn enters(time: f64, person: &str, vehicle: Option<String>) -> Self {
        Self::bare(time, person, vehicle, CheckpointKind::PersonEnters)
    }

    pub fn leaves(time: f64, person: &str, vehicle: Option<String>) -> Self {
        Self::bare(time, person, vehicle, CheckpointKind::PersonLeaves)
    }

    pub fn link(
        time:    f64,
        person:  &str,
        vehicle: Option<String>,
        link:    LinkId,
        entered: bool,
    ) -> Self {
        Self {
            time,
            person: person.to_owned(),
            vehicle,
            link: Some(link),
            kind: if entered { CheckpointKind::LinkEntered } else { CheckpointKind::LinkLeft },
        }
    }

    fn bare(time: f64, person: &str, vehicle: Option<String>, kind: CheckpointKind) -> Self {
        Self { time, person: person.to_owned(), vehicle, link: None, kind }
    }
}
