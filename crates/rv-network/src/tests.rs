//! Unit tests for rv-network.
//!
//! Networks are built by hand or parsed from inline XML; no fixtures on disk.

#[cfg(test)]
mod helpers {
    use rv_core::{NodeId, Point};
    use crate::{LinkAttrs, Network, NetworkBuilder};

    /// Five nodes on a ring with links in both directions.
    ///
    /// Clockwise (`c01`..`c40`) weights 1, 2, 3, 4, 5.
    /// Counter-clockwise (`a10`..`a04`) weights 6, 7, 8, 9, 2.5.
    ///
    ///   0 → 3: clockwise 1+2+3 = 6  vs  0→4→3 = 2.5+9 = 11.5
    ///   0 → 4: direct a04 = 2.5     vs  clockwise 1+2+3+4 = 10
    pub fn ring() -> (Network, [NodeId; 5]) {
        let mut b = NetworkBuilder::new();
        let n: Vec<NodeId> = (0..5)
            .map(|i| {
                let angle = i as f64 * std::f64::consts::TAU / 5.0;
                b.add_node(i.to_string(), Point::new(angle.cos() * 100.0, angle.sin() * 100.0))
                    .unwrap()
            })
            .collect();

        let cw = [1.0, 2.0, 3.0, 4.0, 5.0];
        for i in 0..5 {
            let j = (i + 1) % 5;
            b.add_link(format!("c{i}{j}"), n[i], n[j], cw[i], LinkAttrs::default()).unwrap();
        }
        let ccw = [(1, 0, 6.0), (2, 1, 7.0), (3, 2, 8.0), (4, 3, 9.0), (0, 4, 2.5)];
        for (i, j, w) in ccw {
            b.add_link(format!("a{i}{j}"), n[i], n[j], w, LinkAttrs::default()).unwrap();
        }

        (b.build(), [n[0], n[1], n[2], n[3], n[4]])
    }

    pub fn xml_ids(net: &Network, links: &[rv_core::LinkId]) -> Vec<String> {
        links.iter().map(|&l| net.link(l).xml_id.clone()).collect()
    }
}

// ── Builder & network structure ───────────────────────────────────────────────

#[cfg(test)]
mod builder {
    use rv_core::{NodeId, Point};
    use crate::{LinkAttrs, NetworkBuilder, NetworkError};

    #[test]
    fn empty_build() {
        let net = NetworkBuilder::new().build();
        assert_eq!(net.node_count(), 0);
        assert_eq!(net.link_count(), 0);
        assert!(net.is_empty());
        assert!(net.nearest_node(Point::new(0.0, 0.0)).is_none());
    }

    #[test]
    fn ids_come_from_builder_counter() {
        let mut a = NetworkBuilder::new();
        let mut b = NetworkBuilder::new();
        assert_eq!(a.add_node("x", Point::new(0.0, 0.0)).unwrap(), NodeId(0));
        assert_eq!(a.add_node("y", Point::new(1.0, 0.0)).unwrap(), NodeId(1));
        // A second builder starts from zero again.
        assert_eq!(b.add_node("x", Point::new(0.0, 0.0)).unwrap(), NodeId(0));
    }

    #[test]
    fn duplicate_ids_rejected() {
        let mut b = NetworkBuilder::new();
        let n0 = b.add_node("1", Point::new(0.0, 0.0)).unwrap();
        let n1 = b.add_node("2", Point::new(1.0, 0.0)).unwrap();
        assert!(matches!(
            b.add_node("1", Point::new(5.0, 5.0)),
            Err(NetworkError::DuplicateId { kind: "node", .. })
        ));
        b.add_link("l", n0, n1, 1.0, LinkAttrs::default()).unwrap();
        assert!(matches!(
            b.add_link("l", n1, n0, 1.0, LinkAttrs::default()),
            Err(NetworkError::DuplicateId { kind: "link", .. })
        ));
    }

    #[test]
    fn link_validation() {
        let mut b = NetworkBuilder::new();
        let n0 = b.add_node("1", Point::new(0.0, 0.0)).unwrap();
        assert!(matches!(
            b.add_link("bad", n0, NodeId(9), 1.0, LinkAttrs::default()),
            Err(NetworkError::NodeNotFound(NodeId(9)))
        ));
        assert!(matches!(
            b.add_link("neg", n0, n0, -1.0, LinkAttrs::default()),
            Err(NetworkError::InvalidLength { .. })
        ));
        assert!(matches!(
            b.add_link("nan", n0, n0, f64::NAN, LinkAttrs::default()),
            Err(NetworkError::InvalidLength { .. })
        ));
        assert_eq!(b.link_count(), 0);
    }

    #[test]
    fn csr_out_links() {
        let (net, [n0, _, _, n3, _]) = super::helpers::ring();
        assert_eq!(net.node_count(), 5);
        assert_eq!(net.link_count(), 10);

        for node in net.nodes() {
            assert_eq!(net.out_degree(node.id), 2);
            for l in net.out_links(node.id) {
                assert_eq!(net.link(l).from, node.id);
            }
        }

        let mut targets: Vec<_> = net.out_links(n0).map(|l| net.link(l).xml_id.clone()).collect();
        targets.sort();
        assert_eq!(targets, ["a04", "c01"]);
        assert!(net.out_links(n3).all(|l| net.link(l).from == n3));
    }

    #[test]
    fn xml_id_lookup() {
        let (net, [n0, n1, ..]) = super::helpers::ring();
        assert_eq!(net.node_by_xml_id("1"), Some(n1));
        let c01 = net.link_by_xml_id("c01").unwrap();
        assert_eq!(net.link(c01).from, n0);
        assert_eq!(net.link(c01).to, n1);
        assert_eq!(net.link(c01).id, c01);
        assert!(net.link_by_xml_id("zz").is_none());
    }

    #[test]
    fn nearest_node_snaps() {
        let (net, [n0, _, n2, ..]) = super::helpers::ring();
        assert_eq!(net.nearest_node(Point::new(95.0, 3.0)), Some(n0));
        let p = net.node(n2).pos;
        assert_eq!(net.nearest_node(Point::new(p.x + 1.0, p.y - 1.0)), Some(n2));
        let near = net.k_nearest_nodes(Point::new(100.0, 0.0), 3);
        assert_eq!(near.len(), 3);
        assert_eq!(near[0], n0);
    }
}

// ── Dijkstra ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod dijkstra {
    use rv_core::{NodeId, Point};
    use crate::{DijkstraRouter, LinkAttrs, NetworkBuilder, NetworkError, Router, shortest_path};
    use super::helpers::{ring, xml_ids};

    #[test]
    fn ring_clockwise_path() {
        let (net, [n0, _, _, n3, _]) = ring();
        let path = shortest_path(&net, n0, n3);
        assert_eq!(xml_ids(&net, &path), ["c01", "c12", "c23"]);
    }

    #[test]
    fn ring_counter_clockwise_shortcut() {
        let (net, [n0, _, _, _, n4]) = ring();
        let path = shortest_path(&net, n0, n4);
        assert_eq!(xml_ids(&net, &path), ["a04"]);
    }

    #[test]
    fn path_is_connected() {
        let (net, n) = ring();
        for &s in &n {
            for &t in &n {
                let path = shortest_path(&net, s, t);
                if s == t {
                    assert!(path.is_empty());
                    continue;
                }
                assert_eq!(net.link(path[0]).from, s);
                assert_eq!(net.link(*path.last().unwrap()).to, t);
                for w in path.windows(2) {
                    assert_eq!(net.link(w[0]).to, net.link(w[1]).from);
                }
            }
        }
    }

    #[test]
    fn same_node_is_empty() {
        let (net, [n0, ..]) = ring();
        assert!(shortest_path(&net, n0, n0).is_empty());
        let route = DijkstraRouter.route(&net, n0, n0).unwrap();
        assert!(route.is_trivial());
        assert_eq!(route.length, 0.0);
    }

    #[test]
    fn disconnected_pair_is_empty() {
        let mut b = NetworkBuilder::new();
        let a = b.add_node("a", Point::new(0.0, 0.0)).unwrap();
        let c = b.add_node("c", Point::new(10.0, 0.0)).unwrap();
        let net = b.build();
        assert!(shortest_path(&net, a, c).is_empty());
        assert!(matches!(
            DijkstraRouter.route(&net, a, c),
            Err(NetworkError::NoRoute { .. })
        ));
    }

    #[test]
    fn one_way_link_is_respected() {
        let mut b = NetworkBuilder::new();
        let a = b.add_node("a", Point::new(0.0, 0.0)).unwrap();
        let c = b.add_node("c", Point::new(10.0, 0.0)).unwrap();
        b.add_link("ac", a, c, 10.0, LinkAttrs::default()).unwrap();
        let net = b.build();
        assert_eq!(shortest_path(&net, a, c).len(), 1);
        assert!(shortest_path(&net, c, a).is_empty());
    }

    #[test]
    fn router_reports_length() {
        let (net, [n0, _, _, n3, _]) = ring();
        let route = DijkstraRouter.route(&net, n0, n3).unwrap();
        assert_eq!(route.links.len(), 3);
        assert!((route.length - 6.0).abs() < 1e-9);
    }

    #[test]
    fn unknown_node() {
        let (net, [n0, ..]) = ring();
        assert!(shortest_path(&net, n0, NodeId(99)).is_empty());
        assert!(matches!(
            DijkstraRouter.route(&net, n0, NodeId(99)),
            Err(NetworkError::NodeNotFound(NodeId(99)))
        ));
    }
}

// ── XML read / write ──────────────────────────────────────────────────────────

#[cfg(test)]
mod xml {
    use std::io::{Cursor, Write};

    use crate::{NetworkError, load_network, read_network, write_network};

    const EQUIL: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE network SYSTEM "http://www.matsim.org/files/dtd/network_v1.dtd">
<network name="equil test network">
  <nodes>
    <node id="1" x="-20000" y="0" />
    <node id="2" x="-15000" y="0" type="junction" origid="A7" />
    <node id="3" x="-865" y="5925" />
  </nodes>
  <links capperiod="01:00:00" effectivecellsize="7.5" effectivelanewidth="3.75">
    <link id="1" from="1" to="2" length="10000.00" freespeed="27.78" capacity="36000" permlanes="1" oneway="1" modes="car" />
    <link id="2" from="2" to="3" length="10000.00" freespeed="27.78" capacity="3600" permlanes="2" oneway="0" modes="car,bus" origid="B" />
    <link id="3" from="3" to="1" length="5000" />
  </links>
</network>
"#;

    #[test]
    fn reads_nodes_links_and_meta() {
        let net = read_network(Cursor::new(EQUIL)).unwrap();
        assert_eq!(net.node_count(), 3);
        assert_eq!(net.link_count(), 3);
        assert_eq!(net.meta.name.as_deref(), Some("equil test network"));
        assert_eq!(net.meta.capperiod, "01:00:00");

        let n2 = net.node(net.node_by_xml_id("2").unwrap());
        assert_eq!(n2.pos.x, -15000.0);
        assert_eq!(n2.kind.as_deref(), Some("junction"));
        assert_eq!(n2.orig_id.as_deref(), Some("A7"));

        let l2 = net.link(net.link_by_xml_id("2").unwrap());
        assert_eq!(l2.attrs.permlanes, 2.0);
        assert!(!l2.attrs.oneway);
        assert_eq!(l2.attrs.modes, "car,bus");
        assert_eq!(l2.attrs.orig_id.as_deref(), Some("B"));

        // Omitted attributes fall back to defaults.
        let l3 = net.link(net.link_by_xml_id("3").unwrap());
        assert_eq!(l3.length, 5000.0);
        assert_eq!(l3.attrs.modes, "car");
        assert!(l3.attrs.oneway);
    }

    #[test]
    fn unknown_node_reference() {
        let doc = r#"<network><nodes><node id="1" x="0" y="0"/></nodes>
            <links><link id="9" from="1" to="7" length="1"/></links></network>"#;
        match read_network(Cursor::new(doc)) {
            Err(NetworkError::UnknownNode { link, node }) => {
                assert_eq!(link, "9");
                assert_eq!(node, "7");
            }
            other => panic!("expected UnknownNode, got {:?}", other.map(|n| n.link_count())),
        }
    }

    #[test]
    fn missing_or_bad_attribute() {
        let missing = r#"<network><nodes><node id="1" x="0"/></nodes></network>"#;
        assert!(matches!(
            read_network(Cursor::new(missing)),
            Err(NetworkError::InvalidAttribute(_))
        ));
        let bad = r#"<network><nodes><node id="1" x="0" y="north"/></nodes></network>"#;
        assert!(matches!(
            read_network(Cursor::new(bad)),
            Err(NetworkError::InvalidAttribute(_))
        ));
    }

    #[test]
    fn write_then_read_round_trip() {
        let net = read_network(Cursor::new(EQUIL)).unwrap();
        let mut out = Vec::new();
        write_network(&net, &mut out).unwrap();

        let text = String::from_utf8(out.clone()).unwrap();
        assert!(text.starts_with("<?xml"));
        assert!(text.contains("network_v1.dtd"));

        let back = read_network(Cursor::new(out)).unwrap();
        assert_eq!(back.nodes(), net.nodes());
        assert_eq!(back.links(), net.links());
        assert_eq!(back.meta, net.meta);
    }

    #[test]
    fn load_with_legacy_encoding() {
        let doc = "<network name=\"Plze\u{148}\"><nodes><node id=\"\u{10d}\" x=\"0\" y=\"0\"/></nodes></network>";
        let (bytes, _, _) = encoding_rs::WINDOWS_1250.encode(doc);

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&bytes).unwrap();

        let net = load_network(file.path(), "windows-1250").unwrap();
        assert_eq!(net.meta.name.as_deref(), Some("Plze\u{148}"));
        assert!(net.node_by_xml_id("\u{10d}").is_some());
    }

    #[test]
    fn unknown_encoding_label() {
        let file = tempfile::NamedTempFile::new().unwrap();
        assert!(matches!(
            load_network(file.path(), "klingon"),
            Err(NetworkError::UnsupportedEncoding(_))
        ));
    }
}
