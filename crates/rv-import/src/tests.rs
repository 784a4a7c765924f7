//! Unit tests for rv-import.

#[cfg(test)]
mod helpers {
    use std::fs;
    use std::path::{Path, PathBuf};

    pub const NETWORK: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<network name="line">
  <nodes>
    <node id="a" x="0" y="0" />
    <node id="b" x="100" y="0" />
    <node id="c" x="200" y="0" />
  </nodes>
  <links>
    <link id="1" from="a" to="b" length="100" />
    <link id="2" from="b" to="c" length="100" />
  </links>
</network>
"#;

    pub const MATSIM_EVENTS: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<events version="1.0">
  <event time="10.0" type="departure" person="p1" link="1" legMode="car"  />
  <event time="10.0" type="PersonEntersVehicle" person="p1" vehicle="v1"  />
  <event time="11.0" type="entered link" person="p1" link="2" vehicle="v1"  />
  <event time="15.0" type="actend" person="p2" link="1" actType="home"  />
  <event time="20.0" type="left link" person="p1" link="2" vehicle="v1"  />
  <event time="21.0" type="PersonLeavesVehicle" person="p1" vehicle="v1"  />
  <event time="22.0" type="arrival" person="p1" link="2" legMode="car"  />
</events>
"#;

    pub const ENSEMBLES: &str = r#"<?xml version="1.0"?>
<events>
  <event eventType="cz.cuni.mff.d3s.deeco.runtimelog.EnsembleLogRecord" time="12">
    <coordinatorID>V1</coordinatorID>
    <memberID>V2</memberID>
    <ensembleName>Platoon</ensembleName>
    <membership>true</membership>
  </event>
  <event eventType="cz.cuni.mff.d3s.deeco.runtimelog.EnsembleLogRecord" time="30">
    <coordinatorID>V1</coordinatorID>
    <memberID>V2</memberID>
    <ensembleName>Platoon</ensembleName>
    <membership>false</membership>
  </event>
</events>
"#;

    pub const JDEECO_EVENTS: &str = r#"<?xml version="1.0"?>
<events>
  <event eventType="cz.cuni.mff.d3s.jdeeco.visualizer.network.EnteredLinkRecord" time="0">
    <person>V1</person>
    <link>1</link>
  </event>
  <event eventType="cz.cuni.mff.d3s.deeco.runtimelog.EnsembleLogRecord" time="250">
    <coordinatorID>V1</coordinatorID>
    <memberID>V2</memberID>
    <ensembleName>Platoon</ensembleName>
    <membership>true</membership>
  </event>
  <event eventType="cz.cuni.mff.d3s.jdeeco.visualizer.network.LeftLinkRecord" time="500">
    <person>V1</person>
    <link>1</link>
  </event>
</events>
"#;

    pub fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, contents).unwrap();
        path
    }
}

// ── Configuration file ────────────────────────────────────────────────────────

#[cfg(test)]
mod config {
    use std::path::PathBuf;

    use rv_core::TimeWindow;

    use crate::{
        DEFAULT_TARGET_DURATION, FileSpec, ImportConfig, ImportError, LogDialect, load_config, load_config_reader,
    };

    fn config_errors(text: &str) -> Vec<String> {
        match load_config_reader(text.as_bytes()) {
            Err(ImportError::Config(errors)) => errors,
            other => panic!("expected a configuration error, got {:?}", other.map(|c| c.network)),
        }
    }

    #[test]
    fn full_file() {
        let text = "\
# Equil scenario
network;data/network.xml;UTF-8
events; data/events.xml
ensembles;data/ensembles.xml;windows-1250
start_at;0
end_at;7200.5
target_duration;90
dialect;JDEECO
";
        let cfg = load_config_reader(text.as_bytes()).unwrap();
        assert_eq!(cfg.network, FileSpec::new("data/network.xml"));
        assert_eq!(cfg.events, Some(FileSpec::new("data/events.xml")));
        assert_eq!(cfg.ensembles, Some(FileSpec::with_encoding("data/ensembles.xml", "windows-1250")));
        assert_eq!(cfg.window, TimeWindow::between(0.0, 7200.5));
        assert_eq!(cfg.target_duration, 90);
        assert_eq!(cfg.dialect, LogDialect::Jdeeco);
    }

    #[test]
    fn defaults() {
        let cfg = load_config_reader("network;net.xml\n".as_bytes()).unwrap();
        assert_eq!(cfg.network.path, PathBuf::from("net.xml"));
        assert_eq!(cfg.network.encoding, "UTF-8");
        assert!(cfg.events.is_none());
        assert!(cfg.window.is_unbounded());
        assert_eq!(cfg.target_duration, DEFAULT_TARGET_DURATION);
        assert_eq!(cfg.dialect, LogDialect::Matsim);
    }

    #[test]
    fn viewer_keys_are_ignored() {
        let text = "network;net.xml\nshowLinks;true\nscripts;a.js;b.js\njust_agents;false\n";
        let cfg = load_config_reader(text.as_bytes()).unwrap();
        assert_eq!(cfg, ImportConfig::new(FileSpec::new("net.xml")));
    }

    #[test]
    fn errors_are_aggregated() {
        let text = "\
network;net.xml
start_at;soon
end_at;10;20
target_duration;1.5
events
dialect;sumo
";
        let errors = config_errors(text);
        assert_eq!(errors.len(), 5, "{errors:?}");
        assert!(errors[0].contains("line 2") && errors[0].contains("start_at"));
        assert!(errors[1].contains("end_at"));
        assert!(errors[2].contains("target_duration"));
        assert!(errors[3].contains("events"));
        assert!(errors[4].contains("sumo"));
    }

    #[test]
    fn missing_network() {
        let errors = config_errors("events;e.xml\nstart_at;x\n");
        assert_eq!(errors.len(), 2);
        assert!(errors[1].contains("network"));
    }

    #[test]
    fn unknown_charset() {
        let errors = config_errors("network;net.xml;klingon\n");
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("klingon"));
    }

    #[test]
    fn malformed_network_line_is_not_missing() {
        let errors = config_errors("network;\nend_at;soon\n");
        assert_eq!(errors.len(), 2, "{errors:?}");
        assert!(errors[0].contains("line 1") && errors[0].contains("network"));
        assert!(errors.iter().all(|e| !e.contains("no `network` entry")), "{errors:?}");
    }

    #[test]
    fn too_many_path_fields() {
        let errors = config_errors("network;net.xml;UTF-8;extra\n");
        assert!(errors[0].contains("too many"));
    }

    #[test]
    fn inverted_window() {
        let errors = config_errors("network;net.xml\nstart_at;100\nend_at;50\n");
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("later than"));
    }

    #[test]
    fn negative_time_rejected() {
        let errors = config_errors("network;net.xml\nstart_at;-5\n");
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn builder_validation() {
        let cfg = ImportConfig::new(FileSpec::new("n.xml")).target_duration(0);
        assert!(matches!(cfg.validate(), Err(ImportError::Config(e)) if e.len() == 1));

        let cfg = ImportConfig::new(FileSpec::with_encoding("n.xml", "nope"))
            .window(TimeWindow::between(5.0, 1.0));
        assert!(matches!(cfg.validate(), Err(ImportError::Config(e)) if e.len() == 2));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = super::helpers::write(dir.path(), "scene.cfg", "network;n.xml\nend_at;60\n");
        let cfg = load_config(&path).unwrap();
        assert_eq!(cfg.window, TimeWindow::new(None, Some(60.0)));
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(load_config(&dir.path().join("absent.cfg")), Err(ImportError::Io(_))));
    }
}

// ── Import pipeline ───────────────────────────────────────────────────────────

#[cfg(test)]
mod pipeline {
    use rv_checkpoint::{CheckpointDatabase, CheckpointKind};
    use rv_core::TimeWindow;
    use rv_events::{Dialect, EnsembleEvent, EventsError, ParseStats};
    use rv_network::Network;

    use super::helpers::*;
    use crate::{
        FileSpec, ImportConfig, ImportError, ImportObserver, LogDialect, NoopObserver, Scene, SceneImport,
        import_scene,
    };

    #[derive(Default)]
    struct Recorder {
        calls:  Vec<String>,
        parsed: Vec<(Dialect, ParseStats)>,
    }

    impl ImportObserver for Recorder {
        fn on_network_loaded(&mut self, network: &Network) {
            self.calls.push(format!("network {}", network.link_count()));
        }
        fn on_events_parsed(&mut self, dialect: Dialect, stats: &ParseStats) {
            self.calls.push(format!("parsed {dialect:?}"));
            self.parsed.push((dialect, *stats));
        }
        fn on_ensemble_events(&mut self, events: &[EnsembleEvent]) {
            self.calls.push(format!("ensembles {}", events.len()));
        }
        fn on_checkpoints_built(&mut self, checkpoints: &CheckpointDatabase) {
            self.calls.push(format!("checkpoints {}", checkpoints.len()));
        }
        fn on_import_end(&mut self, scene: &Scene) {
            self.calls.push(format!("end {} {}", scene.min_time, scene.max_time));
        }
    }

    fn matsim_config(dir: &std::path::Path) -> ImportConfig {
        ImportConfig::new(FileSpec::new(write(dir, "network.xml", NETWORK)))
            .events(FileSpec::new(write(dir, "events.xml", MATSIM_EVENTS)))
            .ensembles(FileSpec::new(write(dir, "ensembles.xml", ENSEMBLES)))
    }

    #[test]
    fn matsim_scene() {
        let dir = tempfile::tempdir().unwrap();
        let mut rec = Recorder::default();
        let scene = SceneImport::new(matsim_config(dir.path())).unwrap().run(&mut rec).unwrap();

        assert_eq!(scene.network.link_count(), 2);
        let db = scene.checkpoints.as_ref().unwrap();
        let kinds: Vec<_> = db.checkpoints("p1").iter().map(|c| c.kind).collect();
        assert_eq!(
            kinds,
            [
                CheckpointKind::PersonEnters,
                CheckpointKind::LinkEntered,
                CheckpointKind::LinkLeft,
                CheckpointKind::PersonLeaves,
                CheckpointKind::PersonLeaves,
            ]
        );
        assert_eq!(db.persons().count(), 1);
        assert_eq!(scene.ensemble_events.len(), 2);
        assert!(!scene.ensemble_events[1].membership);
        assert_eq!((scene.min_time, scene.max_time), (10.0, 22.0));
        assert_eq!(scene.target_duration, 60);

        assert_eq!(
            rec.calls,
            ["network 2", "parsed Matsim", "parsed Ensemble", "ensembles 2", "checkpoints 5", "end 10 22"]
        );
        let (_, stats) = rec.parsed[0];
        assert_eq!(stats.events_seen, 7);
        assert_eq!(stats.events_decoded, 6);
        assert_eq!(stats.skipped_type, 1);
    }

    #[test]
    fn window_limits_scene() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = matsim_config(dir.path()).window(TimeWindow::between(0.0, 15.0));
        let scene = import_scene(cfg).unwrap();

        let db = scene.checkpoints.unwrap();
        assert_eq!(db.len(), 2);
        assert_eq!(scene.ensemble_events.len(), 1);
        assert_eq!((scene.min_time, scene.max_time), (10.0, 11.0));
    }

    #[test]
    fn forced_windowing_gives_same_scene() {
        let dir = tempfile::tempdir().unwrap();
        let window = TimeWindow::between(10.5, 21.0);
        let whole = import_scene(matsim_config(dir.path()).window(window)).unwrap();
        let windowed = import_scene(matsim_config(dir.path()).window(window).windowing_threshold(0)).unwrap();

        let a: Vec<_> = whole.checkpoints.as_ref().unwrap().iter().cloned().collect();
        let b: Vec<_> = windowed.checkpoints.as_ref().unwrap().iter().cloned().collect();
        assert_eq!(a, b);
        assert_eq!(a.len(), 3);
        assert_eq!(whole.ensemble_events, windowed.ensemble_events);
        assert_eq!((windowed.min_time, windowed.max_time), (11.0, 21.0));
    }

    #[test]
    fn jdeeco_scene() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = ImportConfig::new(FileSpec::new(write(dir.path(), "network.xml", NETWORK)))
            .events(FileSpec::new(write(dir.path(), "log.xml", JDEECO_EVENTS)))
            .dialect(LogDialect::Jdeeco)
            .target_duration(30);
        let mut rec = Recorder::default();
        let scene = SceneImport::new(cfg).unwrap().run(&mut rec).unwrap();

        let db = scene.checkpoints.as_ref().unwrap();
        let kinds: Vec<_> = db.checkpoints("V1").iter().map(|c| c.kind).collect();
        assert_eq!(kinds, [CheckpointKind::LinkEntered, CheckpointKind::LinkLeft]);
        assert_eq!(scene.ensemble_events.len(), 1);
        assert_eq!(scene.ensemble_events[0].coordinator, "V1");
        assert_eq!((scene.min_time, scene.max_time), (0.0, 500.0));
        assert!((scene.time_scale() - 500.0 / 30.0).abs() < 1e-9);
        assert_eq!(
            rec.parsed.iter().map(|(d, _)| *d).collect::<Vec<_>>(),
            [Dialect::Jdeeco, Dialect::Ensemble]
        );
    }

    #[test]
    fn network_only() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = ImportConfig::new(FileSpec::new(write(dir.path(), "network.xml", NETWORK)));
        let mut rec = Recorder::default();
        let scene = SceneImport::new(cfg).unwrap().run(&mut rec).unwrap();
        assert!(scene.checkpoints.is_none());
        assert!(scene.ensemble_events.is_empty());
        assert_eq!((scene.min_time, scene.max_time), (0.0, 0.0));
        assert_eq!(rec.calls, ["network 2", "end 0 0"]);
    }

    #[test]
    fn empty_log_gives_zero_times() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = ImportConfig::new(FileSpec::new(write(dir.path(), "network.xml", NETWORK)))
            .events(FileSpec::new(write(dir.path(), "events.xml", "<events></events>")));
        let scene = import_scene(cfg).unwrap();
        assert!(scene.checkpoints.unwrap().is_empty());
        assert_eq!((scene.min_time, scene.max_time), (0.0, 0.0));
    }

    #[test]
    fn unknown_link_aborts_import() {
        let dir = tempfile::tempdir().unwrap();
        let log = r#"<events><event time="1" type="entered link" person="p" link="99" /></events>"#;
        let cfg = ImportConfig::new(FileSpec::new(write(dir.path(), "network.xml", NETWORK)))
            .events(FileSpec::new(write(dir.path(), "events.xml", log)));
        match SceneImport::new(cfg).unwrap().run(&mut NoopObserver) {
            Err(ImportError::Events(EventsError::LinkNotFound(id))) => assert_eq!(id, "99"),
            Err(other) => panic!("expected LinkNotFound, got {other}"),
            Ok(_) => panic!("import should fail"),
        }
    }

    #[test]
    fn missing_network_file() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = ImportConfig::new(FileSpec::new(dir.path().join("absent.xml")));
        assert!(matches!(import_scene(cfg), Err(ImportError::Network(_))));
    }

    #[test]
    fn invalid_config_rejected_up_front() {
        let cfg = ImportConfig::new(FileSpec::new("n.xml")).target_duration(0);
        assert!(matches!(SceneImport::new(cfg), Err(ImportError::Config(_))));
    }

    #[test]
    fn resource_limits_are_classified() {
        assert!(ImportError::Events(EventsError::TooManyEvents { limit: 10 }).is_resource_limit());
        assert!(!ImportError::Events(EventsError::LinkNotFound("x".into())).is_resource_limit());
        assert!(!ImportError::Config(vec![]).is_resource_limit());
    }
}
