//! Dialect tables.
//!
//! The three log formats share one element structure (`<event time=..>` with
//! a type discriminator) and differ only in:
//!
//! * the name of the type attribute,
//! * which type values are recognised and which [`EventKind`] each maps to,
//! * which fields each kind carries and whether a field is an attribute of
//!   `<event>` or a child element with text content,
//! * the event-count ceiling.
//!
//! All of that is data, so the parser is written once and driven by a
//! `&'static DialectSpec`.

use crate::event::EventKind;

/// A decodable event field.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum FieldKey {
    Person,
    Vehicle,
    Link,
    LegMode,
    Coordinator,
    Member,
    EnsembleName,
    Membership,
}

/// Where a field's value is found.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FieldSource {
    /// An attribute of the `<event>` element.
    Attribute,
    /// The text content of a child element.
    Child,
}

#[derive(Debug)]
pub struct FieldSpec {
    pub key:      FieldKey,
    /// Attribute or child element name in the log.
    pub name:     &'static str,
    pub source:   FieldSource,
    pub required: bool,
}

#[derive(Debug)]
pub struct KindSpec {
    /// Value of the dialect's type attribute.
    pub type_value: &'static str,
    pub kind:       EventKind,
    pub fields:     &'static [FieldSpec],
}

impl KindSpec {
    pub fn field(&self, key: FieldKey) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.key == key)
    }

    /// Field carried as a child element named `name`.
    pub fn child(&self, name: &[u8]) -> Option<&FieldSpec> {
        self.fields
            .iter()
            .find(|f| f.source == FieldSource::Child && f.name.as_bytes() == name)
    }
}

#[derive(Debug)]
pub struct DialectSpec {
    pub name:           &'static str,
    pub type_attribute: &'static str,
    /// Maximum number of `<event>` elements one parse may see.
    pub event_limit:    u64,
    pub kinds:          &'static [KindSpec],
}

impl DialectSpec {
    pub fn kind(&self, type_value: &str) -> Option<&KindSpec> {
        self.kinds.iter().find(|k| k.type_value == type_value)
    }
}

/// Supported log formats.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Dialect {
    /// MATSim `events_v1` output.
    Matsim,
    /// jDEECo link records.
    Jdeeco,
    /// jDEECo ensemble membership records.
    Ensemble,
}

impl Dialect {
    pub fn spec(self) -> &'static DialectSpec {
        match self {
            Dialect::Matsim => &MATSIM,
            Dialect::Jdeeco => &JDEECO,
            Dialect::Ensemble => &ENSEMBLE,
        }
    }
}

// ── Tables ────────────────────────────────────────────────────────────────────

const fn attr(key: FieldKey, name: &'static str, required: bool) -> FieldSpec {
    FieldSpec { key, name, source: FieldSource::Attribute, required }
}

const fn child(key: FieldKey, name: &'static str, required: bool) -> FieldSpec {
    FieldSpec { key, name, source: FieldSource::Child, required }
}

const MATSIM_LINK_FIELDS: &[FieldSpec] = &[
    attr(FieldKey::Person, "person", true),
    attr(FieldKey::Link, "link", true),
    attr(FieldKey::Vehicle, "vehicle", false),
];

const MATSIM_VEHICLE_FIELDS: &[FieldSpec] = &[
    attr(FieldKey::Person, "person", true),
    attr(FieldKey::Vehicle, "vehicle", true),
];

const MATSIM_LEG_FIELDS: &[FieldSpec] = &[
    attr(FieldKey::Person, "person", true),
    attr(FieldKey::Link, "link", false),
    attr(FieldKey::LegMode, "legMode", false),
];

static MATSIM: DialectSpec = DialectSpec {
    name:           "matsim",
    type_attribute: "type",
    event_limit:    800_000,
    kinds: &[
        KindSpec {
            type_value: "PersonEntersVehicle",
            kind:       EventKind::PersonEntersVehicle,
            fields:     MATSIM_VEHICLE_FIELDS,
        },
        KindSpec {
            type_value: "PersonLeavesVehicle",
            kind:       EventKind::PersonLeavesVehicle,
            fields:     MATSIM_VEHICLE_FIELDS,
        },
        KindSpec {
            type_value: "entered link",
            kind:       EventKind::EnteredLink,
            fields:     MATSIM_LINK_FIELDS,
        },
        KindSpec {
            type_value: "left link",
            kind:       EventKind::LeftLink,
            fields:     MATSIM_LINK_FIELDS,
        },
        KindSpec {
            type_value: "departure",
            kind:       EventKind::Departure,
            fields:     MATSIM_LEG_FIELDS,
        },
        KindSpec {
            type_value: "arrival",
            kind:       EventKind::Arrival,
            fields:     MATSIM_LEG_FIELDS,
        },
    ],
};

const JDEECO_LINK_FIELDS: &[FieldSpec] = &[
    child(FieldKey::Person, "person", true),
    child(FieldKey::Link, "link", true),
    child(FieldKey::Vehicle, "vehicle", false),
];

static JDEECO: DialectSpec = DialectSpec {
    name:           "jdeeco",
    type_attribute: "eventType",
    event_limit:    600_000,
    kinds: &[
        KindSpec {
            type_value: "cz.cuni.mff.d3s.jdeeco.visualizer.network.EnteredLinkRecord",
            kind:       EventKind::EnteredLink,
            fields:     JDEECO_LINK_FIELDS,
        },
        KindSpec {
            type_value: "cz.cuni.mff.d3s.jdeeco.visualizer.network.LeftLinkRecord",
            kind:       EventKind::LeftLink,
            fields:     JDEECO_LINK_FIELDS,
        },
    ],
};

static ENSEMBLE: DialectSpec = DialectSpec {
    name:           "ensemble",
    type_attribute: "eventType",
    event_limit:    600_000,
    kinds: &[KindSpec {
        type_value: "cz.cuni.mff.d3s.deeco.runtimelog.EnsembleLogRecord",
        kind:       EventKind::Ensemble,
        fields: &[
            child(FieldKey::Coordinator, "coordinatorID", true),
            child(FieldKey::Member, "memberID", true),
            child(FieldKey::EnsembleName, "ensembleName", true),
            child(FieldKey::Membership, "membership", true),
        ],
    }],
};
