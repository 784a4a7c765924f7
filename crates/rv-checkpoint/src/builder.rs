//! Single-pass reconstruction of checkpoints from movement events.
//!
//! | event                  | effect                                                     |
//! |------------------------|------------------------------------------------------------|
//! | `PersonEntersVehicle`  | `PersonEnters(vehicle)`; current vehicle := vehicle        |
//! | `PersonLeavesVehicle`  | `PersonLeaves(vehicle)`; current vehicle := none           |
//! | `entered`/`left link`  | if just departed and no current vehicle: `PersonEnters`    |
//! |                        | with the event's vehicle, current vehicle := it; then      |
//! |                        | `LinkEntered`/`LinkLeft` with the current vehicle;         |
//! |                        | just departed := false                                     |
//! | `departure`            | just departed := true                                      |
//! | `arrival`              | `PersonLeaves` without vehicle or link                     |
//!
//! Ensemble events only contribute to the time bounds.

use tracing::debug;

use rv_events::{Event, LegEvent, LinkEvent, VehicleEvent};

use crate::PersonMap;
use crate::checkpoint::Checkpoint;
use crate::database::CheckpointDatabase;

/// Build the database for `events` (log order).
///
/// Events are expected to come from the parser: validated, link-resolved and
/// in non-decreasing time order.  The pass itself cannot fail.
pub fn build_checkpoints(events: &[Event]) -> CheckpointDatabase {
    let mut builder = CheckpointBuilder::new();
    for event in events {
        builder.push(event);
    }
    builder.finish()
}

/// Incremental form of [`build_checkpoints`].
///
/// Holds the per-person transient state (current vehicle, "just departed")
/// that only matters while the log is being replayed.
#[derive(Default)]
pub struct CheckpointBuilder {
    db:              CheckpointDatabase,
    current_vehicle: PersonMap<Option<String>>,
    just_departed:   PersonMap<bool>,
}

impl CheckpointBuilder {
    pub fn new() -> Self {
        Self {
            db:              CheckpointDatabase::new(),
            current_vehicle: PersonMap::default(),
            just_departed:   PersonMap::default(),
        }
    }

    pub fn push(&mut self, event: &Event) {
        let t = event.time();
        debug_assert!(t.is_finite() && t >= 0.0, "event time {t} was not validated");
        self.db.observe_time(t);

        match event {
            Event::Vehicle(e) => self.on_vehicle(e),
            Event::Link(e) => self.on_link(e),
            Event::Leg(e) => self.on_leg(e),
            Event::Ensemble(_) => {}
        }
    }

    pub fn finish(self) -> CheckpointDatabase {
        debug!(
            persons = self.db.person_count(),
            checkpoints = self.db.len(),
            "checkpoint database built"
        );
        self.db
    }

    fn on_vehicle(&mut self, e: &VehicleEvent) {
        if e.enters {
            self.db.push(Checkpoint::enters(e.time, &e.person, Some(e.vehicle.clone())));
            self.current_vehicle.insert(e.person.clone(), Some(e.vehicle.clone()));
        } else {
            self.db.push(Checkpoint::leaves(e.time, &e.person, Some(e.vehicle.clone())));
            self.current_vehicle.insert(e.person.clone(), None);
        }
    }

    fn on_link(&mut self, e: &LinkEvent) {
        let departed = self.just_departed.get(&e.person).copied().unwrap_or(false);
        let mut vehicle = self.current_vehicle.get(&e.person).cloned().flatten();

        // A departure may be logged before the matching vehicle-enter event.
        if departed && vehicle.is_none() {
            self.db.push(Checkpoint::enters(e.time, &e.person, e.vehicle.clone()));
            vehicle = e.vehicle.clone();
            self.current_vehicle.insert(e.person.clone(), vehicle.clone());
        }

        self.db.push(Checkpoint::link(e.time, &e.person, vehicle, e.link, e.entered));
        self.just_departed.insert(e.person.clone(), false);
    }

    fn on_leg(&mut self, e: &LegEvent) {
        if e.departure {
            self.just_departed.insert(e.person.clone(), true);
        } else {
            self.db.push(Checkpoint::leaves(e.time, &e.person, None));
        }
    }
}
