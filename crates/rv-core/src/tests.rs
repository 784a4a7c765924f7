//! Unit tests for rv-core primitives.

#[cfg(test)]
mod ids {
    use crate::{LinkId, NodeId};

    #[test]
    fn index_roundtrip() {
        let id = NodeId(42);
        assert_eq!(id.index(), 42);
        assert_eq!(NodeId::try_from(42usize).unwrap(), id);
    }

    #[test]
    fn invalid_sentinels_are_max() {
        assert_eq!(NodeId::INVALID.0, u32::MAX);
        assert_eq!(LinkId::INVALID.0, u32::MAX);
        assert_eq!(LinkId::default(), LinkId::INVALID);
    }

    #[test]
    fn display() {
        assert_eq!(LinkId(7).to_string(), "LinkId(7)");
    }
}

#[cfg(test)]
mod time {
    use crate::TimeWindow;

    #[test]
    fn unbounded_contains_everything() {
        let w = TimeWindow::UNBOUNDED;
        assert!(w.is_unbounded());
        assert!(w.contains(0.0));
        assert!(w.contains(1e12));
    }

    #[test]
    fn bounds_are_inclusive() {
        let w = TimeWindow::between(10.0, 20.0);
        assert!(!w.contains(9.999));
        assert!(w.contains(10.0));
        assert!(w.contains(20.0));
        assert!(!w.contains(20.001));
    }

    #[test]
    fn half_open_windows() {
        assert!(TimeWindow::new(Some(5.0), None).contains(1e9));
        assert!(!TimeWindow::new(Some(5.0), None).contains(4.0));
        assert!(TimeWindow::new(None, Some(5.0)).contains(0.0));
    }

    #[test]
    fn effective_range_clamps_to_observed() {
        let w = TimeWindow::between(100.0, 500.0);
        assert_eq!(w.effective_range(Some((150.0, 400.0))), (150.0, 400.0));
        assert_eq!(w.effective_range(Some((50.0, 900.0))), (100.0, 500.0));
        assert_eq!(TimeWindow::UNBOUNDED.effective_range(Some((3.0, 9.0))), (3.0, 9.0));
        assert_eq!(w.effective_range(None), (0.0, 0.0));
    }
}

#[cfg(test)]
mod attr {
    use crate::attr::{parse_bool, parse_f64, parse_time, require};
    use crate::{AttrError, LegMode};

    #[test]
    fn require_rejects_missing_and_blank() {
        assert_eq!(require("event", "person", Some(" 12 ")).unwrap(), "12");
        assert!(matches!(require("event", "person", None), Err(AttrError::Missing { .. })));
        assert!(matches!(require("event", "person", Some("  ")), Err(AttrError::Missing { .. })));
    }

    #[test]
    fn parse_time_validates_range() {
        assert_eq!(parse_time("event", "time", "21510.0").unwrap(), 21510.0);
        assert!(parse_time("event", "time", "-1").is_err());
        assert!(parse_time("event", "time", "NaN").is_err());
        assert!(parse_time("event", "time", "inf").is_err());
        assert!(parse_f64("event", "time", "12x").is_err());
    }

    #[test]
    fn invalid_error_names_field_and_value() {
        let err = parse_f64("link", "length", "abc").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("length"), "{msg}");
        assert!(msg.contains("\"abc\""), "{msg}");
    }

    #[test]
    fn parse_bool_is_strict() {
        assert!(parse_bool("event", "membership", "true").unwrap());
        assert!(!parse_bool("event", "membership", "false").unwrap());
        assert!(parse_bool("event", "membership", "True").is_err());
        assert!(parse_bool("event", "membership", "1").is_err());
    }

    #[test]
    fn leg_mode_values() {
        assert_eq!(LegMode::from_value("car"), LegMode::Car);
        assert_eq!(LegMode::from_value("transit_walk"), LegMode::TransitWalk);
        assert_eq!(LegMode::from_value("bike"), LegMode::Other("bike".into()));
        assert_eq!(LegMode::TransitWalk.to_string(), "transit_walk");
    }

    #[test]
    fn point_distance() {
        let a = crate::Point::new(0.0, 0.0);
        let b = crate::Point::new(3.0, 4.0);
        assert_eq!(a.distance(b), 5.0);
    }
}

#[cfg(test)]
mod charset {
    use crate::charset::{encoding_for_label, to_utf8};

    #[test]
    fn labels_resolve() {
        assert_eq!(encoding_for_label(" utf-8 "), Some(encoding_rs::UTF_8));
        assert_eq!(encoding_for_label("Windows-1250"), Some(encoding_rs::WINDOWS_1250));
        assert_eq!(encoding_for_label("latin1"), Some(encoding_rs::WINDOWS_1252));
        assert_eq!(encoding_for_label("klingon"), None);
    }

    #[test]
    fn transcodes_to_utf8() {
        let (bytes, _, _) = encoding_rs::WINDOWS_1250.encode("Plzeň");
        assert_eq!(to_utf8(encoding_rs::WINDOWS_1250, bytes.into_owned()), "Plzeň".as_bytes());
        assert_eq!(to_utf8(encoding_rs::UTF_8, b"abc".to_vec()), b"abc");
    }
}
