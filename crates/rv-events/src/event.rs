//! Decoded events.
//!
//! Every decoded `<event>` element becomes one [`Event`].  The movement
//! variants carry the persons and links the checkpoint builder needs; the
//! ensemble variant is handed to the rendering layer unmodified.

use rv_core::{LegMode, LinkId};

/// What happened, independent of the dialect that reported it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EventKind {
    PersonEntersVehicle,
    PersonLeavesVehicle,
    EnteredLink,
    LeftLink,
    Departure,
    Arrival,
    Ensemble,
}

impl EventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::PersonEntersVehicle => "PersonEntersVehicle",
            EventKind::PersonLeavesVehicle => "PersonLeavesVehicle",
            EventKind::EnteredLink => "entered link",
            EventKind::LeftLink => "left link",
            EventKind::Departure => "departure",
            EventKind::Arrival => "arrival",
            EventKind::Ensemble => "ensemble",
        }
    }
}

/// A vehicle (or the person driving it) entered or left a link.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LinkEvent {
    pub time:    f64,
    /// `true` for "entered link", `false` for "left link".
    pub entered: bool,
    pub link:    LinkId,
    pub vehicle: Option<String>,
    pub person:  String,
}

/// A person boarded or alighted a vehicle.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VehicleEvent {
    pub time:    f64,
    pub enters:  bool,
    pub person:  String,
    pub vehicle: String,
}

/// A person started (departure) or finished (arrival) a leg.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LegEvent {
    pub time:      f64,
    pub departure: bool,
    pub person:    String,
    pub link:      Option<LinkId>,
    pub leg_mode:  Option<LegMode>,
}

/// A component joined or left an ensemble.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EnsembleEvent {
    pub time:        f64,
    pub coordinator: String,
    pub member:      String,
    pub ensemble:    String,
    pub membership:  bool,
}

/// One decoded log record.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Event {
    Link(LinkEvent),
    Vehicle(VehicleEvent),
    Leg(LegEvent),
    Ensemble(EnsembleEvent),
}

impl Event {
    #[inline]
    pub fn time(&self) -> f64 {
        match self {
            Event::Link(e) => e.time,
            Event::Vehicle(e) => e.time,
            Event::Leg(e) => e.time,
            Event::Ensemble(e) => e.time,
        }
    }

    pub fn kind(&self) -> EventKind {
        match self {
            Event::Link(e) if e.entered => EventKind::EnteredLink,
            Event::Link(_) => EventKind::LeftLink,
            Event::Vehicle(e) if e.enters => EventKind::PersonEntersVehicle,
            Event::Vehicle(_) => EventKind::PersonLeavesVehicle,
            Event::Leg(e) if e.departure => EventKind::Departure,
            Event::Leg(_) => EventKind::Arrival,
            Event::Ensemble(_) => EventKind::Ensemble,
        }
    }

    /// The person a movement event is about.  `None` for ensemble events.
    pub fn person(&self) -> Option<&str> {
        match self {
            Event::Link(e) => Some(&e.person),
            Event::Vehicle(e) => Some(&e.person),
            Event::Leg(e) => Some(&e.person),
            Event::Ensemble(_) => None,
        }
    }

    pub fn as_ensemble(&self) -> Option<&EnsembleEvent> {
        match self {
            Event::Ensemble(e) => Some(e),
            _ => None,
        }
    }
}
