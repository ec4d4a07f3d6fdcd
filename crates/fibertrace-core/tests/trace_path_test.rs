#![allow(clippy::unwrap_used)]
// End-to-end trace scenarios over hand-built project snapshots.

use pretty_assertions::assert_eq;

use fibertrace_core::{
    Cable, CableEnd, CustomerInfo, Enclosure, EnclosureKind, EnclosurePort, EndpointKind,
    EntityId, FailureReason, FiberRef, InventoryStore, LossBudget, NetworkView, Olt, ParentKind,
    ParentLink, PathSegment, PathStatus, PathTracer, PonPort, PortStatus, ProjectSnapshot,
    SegmentDetail, SegmentKind, SplitRatio, Splice, SpliceStatus, Splitter, SplitterEgress,
    SplitterOutput, TraceConfig, TraceError, TraceReport, TraceStart, Tray, trace_fiber_path,
};

// ── Fixture helpers ─────────────────────────────────────────────────

fn project() -> EntityId {
    "p1".into()
}

fn end_olt(id: &str) -> Option<CableEnd> {
    Some(CableEnd {
        kind: EndpointKind::Olt,
        id: id.into(),
    })
}

fn end_enclosure(id: &str) -> Option<CableEnd> {
    Some(CableEnd {
        kind: EndpointKind::Enclosure,
        id: id.into(),
    })
}

fn cable(id: &str, fibers: u32, a: Option<CableEnd>, b: Option<CableEnd>) -> Cable {
    Cable {
        id: id.into(),
        project: project(),
        name: id.into(),
        fiber_count: fibers,
        end_a: a,
        end_b: b,
    }
}

fn enclosure(id: &str, kind: EnclosureKind, parent: Option<ParentLink>) -> Enclosure {
    Enclosure {
        id: id.into(),
        project: project(),
        name: id.into(),
        kind,
        parent,
        position: None,
    }
}

fn tray(id: &str, enclosure: &str, number: u32) -> Tray {
    Tray {
        id: id.into(),
        project: project(),
        enclosure: enclosure.into(),
        number,
        capacity: Some(12),
    }
}

fn splice(id: &str, tray: &str, a: (&str, u32), b: (&str, u32), loss: Option<f64>) -> Splice {
    Splice {
        id: id.into(),
        project: project(),
        tray: tray.into(),
        cable_a: a.0.into(),
        fiber_a: a.1,
        cable_b: b.0.into(),
        fiber_b: b.1,
        loss_db: loss,
        status: SpliceStatus::Completed,
    }
}

fn port(id: &str, enclosure: &str, number: u32, customer: Option<&str>) -> EnclosurePort {
    EnclosurePort {
        id: id.into(),
        project: project(),
        enclosure: enclosure.into(),
        number,
        status: if customer.is_some() {
            PortStatus::Connected
        } else {
            PortStatus::Available
        },
        customer: customer.map(|name| CustomerInfo {
            name: name.into(),
            address: Some("123 Main St".into()),
            service: Some("1G".into()),
        }),
        rx_power_dbm: customer.map(|_| -18.5),
    }
}

/// OLT-1 pon 3 -> C1 f5 -> splice at CL1 -> C2 f2 -> NAP N1 port 2.
fn feeder_snapshot() -> ProjectSnapshot {
    let mut snap = ProjectSnapshot::empty(project());
    snap.olts = vec![Olt {
        id: "olt-1".into(),
        project: project(),
        name: "OLT-1".into(),
        pon_ports: vec![
            PonPort {
                number: 1,
                cable: None,
                fiber: None,
                tx_power_dbm: None,
            },
            PonPort {
                number: 3,
                cable: Some("C1".into()),
                fiber: Some(5),
                tx_power_dbm: Some(3.0),
            },
        ],
        position: None,
    }];
    snap.enclosures = vec![
        enclosure(
            "CL1",
            EnclosureKind::SpliceClosure,
            Some(ParentLink {
                kind: ParentKind::Olt,
                id: "olt-1".into(),
            }),
        ),
        enclosure("N1", EnclosureKind::Nap, None),
    ];
    snap.cables = vec![
        cable("C1", 24, end_olt("olt-1"), end_enclosure("CL1")),
        cable("C2", 12, end_enclosure("CL1"), end_enclosure("N1")),
    ];
    snap.trays = vec![tray("T1", "CL1", 1)];
    snap.splices = vec![splice("S1", "T1", ("C1", 5), ("C2", 2), Some(0.15))];
    snap.ports = vec![port("N1-P2", "N1", 2, Some("Jane Doe"))];
    snap
}

/// OLT-1 pon 1 -> F1 f1 -> 1:4 splitter at LCP1 -> drops D1..D3 to
/// NAP1..NAP3 port 1; output 4 is unlinked. `live` picks which NAPs
/// get a connected customer.
fn splitter_snapshot(live: &[u32]) -> ProjectSnapshot {
    let mut snap = ProjectSnapshot::empty(project());
    snap.olts = vec![Olt {
        id: "olt-1".into(),
        project: project(),
        name: "OLT-1".into(),
        pon_ports: vec![PonPort {
            number: 1,
            cable: Some("F1".into()),
            fiber: None,
            tx_power_dbm: Some(2.0),
        }],
        position: None,
    }];
    snap.enclosures = vec![
        enclosure("LCP1", EnclosureKind::Lcp, None),
        enclosure(
            "NAP1",
            EnclosureKind::Nap,
            Some(ParentLink {
                kind: ParentKind::Lcp,
                id: "LCP1".into(),
            }),
        ),
        enclosure("NAP2", EnclosureKind::Nap, None),
        enclosure("NAP3", EnclosureKind::Nap, None),
    ];
    snap.cables = vec![
        cable("F1", 12, end_olt("olt-1"), end_enclosure("LCP1")),
        cable("D1", 4, end_enclosure("LCP1"), end_enclosure("NAP1")),
        cable("D2", 4, end_enclosure("LCP1"), end_enclosure("NAP2")),
        cable("D3", 4, end_enclosure("LCP1"), end_enclosure("NAP3")),
    ];
    snap.splitters = vec![Splitter {
        id: "SP1".into(),
        project: project(),
        enclosure: "LCP1".into(),
        name: None,
        ratio: SplitRatio::OneToFour,
        loss_db: None,
        input: Some(FiberRef {
            cable: "F1".into(),
            fiber: 1,
        }),
        outputs: vec![
            SplitterOutput {
                number: 1,
                link: Some(SplitterEgress::CableFiber {
                    cable: "D1".into(),
                    fiber: 1,
                }),
            },
            SplitterOutput {
                number: 2,
                link: Some(SplitterEgress::CableFiber {
                    cable: "D2".into(),
                    fiber: 1,
                }),
            },
            SplitterOutput {
                number: 3,
                link: Some(SplitterEgress::CableFiber {
                    cable: "D3".into(),
                    fiber: 1,
                }),
            },
            SplitterOutput {
                number: 4,
                link: None,
            },
        ],
    }];
    let customers = ["Alice Martin", "Priya Shah", "Tomas Eder"];
    snap.ports = (1..=3)
        .map(|n| {
            let name = live
                .contains(&n)
                .then(|| customers[usize::try_from(n).unwrap() - 1]);
            port(&format!("NAP{n}-P1"), &format!("NAP{n}"), 1, name)
        })
        .collect();
    snap
}

/// Two cables between two closures, spliced into a loop.
fn cycle_snapshot() -> ProjectSnapshot {
    let mut snap = ProjectSnapshot::empty(project());
    snap.enclosures = vec![
        enclosure("E1", EnclosureKind::SpliceClosure, None),
        enclosure("E2", EnclosureKind::SpliceClosure, None),
    ];
    snap.cables = vec![
        cable("A", 2, end_enclosure("E1"), end_enclosure("E2")),
        cable("B", 2, end_enclosure("E1"), end_enclosure("E2")),
    ];
    snap.trays = vec![tray("TX", "E2", 1), tray("TY", "E1", 1)];
    snap.splices = vec![
        splice("X", "TX", ("A", 1), ("B", 1), None),
        splice("Y", "TY", ("B", 1), ("A", 1), None),
    ];
    snap
}

fn trace_with(
    snap: ProjectSnapshot,
    start: &TraceStart,
    config: &TraceConfig,
) -> Result<TraceReport, TraceError> {
    let view = NetworkView::from_snapshot(snap);
    PathTracer::new(&view, config).trace(start)
}

fn trace(snap: ProjectSnapshot, start: &TraceStart) -> Result<TraceReport, TraceError> {
    trace_with(snap, start, &TraceConfig::default())
}

fn kinds(report: &TraceReport) -> Vec<SegmentKind> {
    report.segments.iter().map(PathSegment::kind).collect()
}

// ── Feeder scenario ─────────────────────────────────────────────────

#[test]
fn test_feeder_trace_reaches_the_customer() {
    let report = trace(feeder_snapshot(), &TraceStart::olt_port("olt-1", 3)).unwrap();

    assert_eq!(report.status, PathStatus::Complete);
    assert_eq!(report.start.kind(), SegmentKind::OltPort);
    assert_eq!(
        kinds(&report),
        vec![
            SegmentKind::Cable,
            SegmentKind::Splice,
            SegmentKind::Cable,
            SegmentKind::Port
        ]
    );
    assert_eq!(report.customer().unwrap().name, "Jane Doe");
    assert_eq!(report.splice_count, 1);
    assert_eq!(report.connector_count, 2);
    assert!((report.total_loss_db - 0.15).abs() < 1e-9);
}

#[test]
fn test_feeder_trace_reports_fiber_handoffs() {
    let report = trace(feeder_snapshot(), &TraceStart::olt_port("olt-1", 3)).unwrap();

    assert_eq!(report.start.fiber_out, Some(5));
    // C1 rides fiber 5, the splice crosses to fiber 2, C2 rides 2.
    assert_eq!(report.segments[0].fiber_in, Some(5));
    assert_eq!(report.segments[1].fiber_in, Some(5));
    assert_eq!(report.segments[1].fiber_out, Some(2));
    assert_eq!(report.segments[2].fiber_in, Some(2));
    match &report.segments[1].detail {
        SegmentDetail::Splice {
            recorded_loss_db, ..
        } => assert_eq!(*recorded_loss_db, Some(0.15)),
        other => panic!("expected a splice, got {other:?}"),
    }
}

#[test]
fn test_feeder_trace_highlights_the_walked_plant() {
    let report = trace(feeder_snapshot(), &TraceStart::olt_port("olt-1", 3)).unwrap();

    for id in ["olt-1", "CL1", "N1", "N1-P2"] {
        assert!(
            report.highlighted_nodes.contains(&EntityId::from(id)),
            "missing node highlight {id}"
        );
    }
    for id in ["C1", "S1", "C2"] {
        assert!(
            report.highlighted_edges.contains(&EntityId::from(id)),
            "missing edge highlight {id}"
        );
    }
}

#[test]
fn test_spare_fiber_stops_at_an_open_end() {
    let report = trace(feeder_snapshot(), &TraceStart::cable_fiber("C1", 6)).unwrap();

    assert_eq!(report.status, PathStatus::Partial);
    assert_eq!(report.hop_count(), 1);
    let terminus = report.terminus();
    assert_eq!(terminus.kind(), SegmentKind::OpenEnd);
    assert_eq!(terminus.fiber_in, Some(6));
    match &terminus.detail {
        SegmentDetail::OpenEnd { enclosure } => {
            assert_eq!(enclosure.as_ref(), Some(&EntityId::from("CL1")));
        }
        other => panic!("expected an open end, got {other:?}"),
    }
}

#[test]
fn test_port_trace_defaults_upstream_to_the_olt() {
    let report = trace(feeder_snapshot(), &TraceStart::port("N1-P2")).unwrap();

    assert_eq!(report.status, PathStatus::Complete);
    assert_eq!(report.start.kind(), SegmentKind::Port);
    assert_eq!(
        kinds(&report),
        vec![
            SegmentKind::Cable,
            SegmentKind::Splice,
            SegmentKind::Cable,
            SegmentKind::OltPort
        ]
    );
}

#[test]
fn test_round_trip_traces_highlight_the_same_plant() {
    let down = trace(feeder_snapshot(), &TraceStart::olt_port("olt-1", 3)).unwrap();
    let up = trace(feeder_snapshot(), &TraceStart::port("N1-P2")).unwrap();

    assert_eq!(down.highlighted_nodes, up.highlighted_nodes);
    assert_eq!(down.highlighted_edges, up.highlighted_edges);
}

// ── Splitter fanouts ────────────────────────────────────────────────

#[test]
fn test_splitter_fanout_follows_the_single_live_branch() {
    let report = trace(splitter_snapshot(&[3]), &TraceStart::olt_port("olt-1", 1)).unwrap();

    assert_eq!(report.status, PathStatus::Complete);
    assert_eq!(
        kinds(&report),
        vec![
            SegmentKind::Cable,
            SegmentKind::Splitter,
            SegmentKind::Cable,
            SegmentKind::Port
        ]
    );
    assert_eq!(report.customer().unwrap().name, "Tomas Eder");
    match &report.segments[1].detail {
        SegmentDetail::Splitter { output, ratio, .. } => {
            assert_eq!(*output, Some(3));
            assert_eq!(*ratio, SplitRatio::OneToFour);
        }
        other => panic!("expected a splitter, got {other:?}"),
    }
    // 1:4 insertion loss dominates the path.
    assert!((report.total_loss_db - 7.0).abs() < 1e-9);
}

#[test]
fn test_splitter_fanout_with_two_live_branches_is_ambiguous() {
    let err = trace(splitter_snapshot(&[2, 3]), &TraceStart::olt_port("olt-1", 1)).unwrap_err();

    assert_eq!(err.reason(), FailureReason::BranchAmbiguous);
    assert!(err.to_string().contains("2/3"), "got: {err}");
}

#[test]
fn test_splitter_fanout_with_no_live_branch_is_ambiguous() {
    let err = trace(splitter_snapshot(&[]), &TraceStart::olt_port("olt-1", 1)).unwrap_err();

    assert_eq!(err.reason(), FailureReason::BranchAmbiguous);
    assert!(
        err.to_string().contains("no output reaches"),
        "got: {err}"
    );
}

#[test]
fn test_disabled_heuristic_reports_every_fanout_as_ambiguous() {
    let config = TraceConfig {
        prefer_single_live_branch: false,
        ..TraceConfig::default()
    };
    let err = trace_with(
        splitter_snapshot(&[3]),
        &TraceStart::olt_port("olt-1", 1),
        &config,
    )
    .unwrap_err();

    assert_eq!(err.reason(), FailureReason::BranchAmbiguous);
    assert!(err.to_string().contains("3 linked outputs"), "got: {err}");
}

#[test]
fn test_explicit_splitter_output_needs_no_heuristic() {
    let config = TraceConfig {
        prefer_single_live_branch: false,
        ..TraceConfig::default()
    };
    let report = trace_with(
        splitter_snapshot(&[2, 3]),
        &TraceStart::splitter_output("SP1", 2),
        &config,
    )
    .unwrap();

    assert_eq!(report.status, PathStatus::Complete);
    assert_eq!(report.customer().unwrap().name, "Priya Shah");
}

#[test]
fn test_customer_port_traces_upstream_through_the_splitter() {
    let report = trace(splitter_snapshot(&[3]), &TraceStart::port("NAP3-P1")).unwrap();

    assert_eq!(report.status, PathStatus::Complete);
    assert_eq!(
        kinds(&report),
        vec![
            SegmentKind::Cable,
            SegmentKind::Splitter,
            SegmentKind::Cable,
            SegmentKind::OltPort
        ]
    );
    match &report.segments[1].detail {
        SegmentDetail::Splitter { output, .. } => assert_eq!(*output, Some(3)),
        other => panic!("expected a splitter, got {other:?}"),
    }
}

// ── Failure modes ───────────────────────────────────────────────────

#[test]
fn test_cycle_detection_fails_cleanly() {
    let err = trace(cycle_snapshot(), &TraceStart::cable_fiber("A", 1)).unwrap_err();

    assert_eq!(err.reason(), FailureReason::Cycle);
    match err {
        TraceError::Cycle { at, hops } => {
            assert_eq!(at, "cable A fiber 1");
            assert_eq!(hops, 4);
        }
        other => panic!("expected a cycle, got {other}"),
    }
}

#[test]
fn test_hop_budget_trips_on_long_walks() {
    let config = TraceConfig {
        max_hops: 2,
        ..TraceConfig::default()
    };
    let err = trace_with(feeder_snapshot(), &TraceStart::olt_port("olt-1", 3), &config)
        .unwrap_err();

    assert_eq!(err.reason(), FailureReason::HopBudgetExceeded);
    assert!(matches!(err, TraceError::HopBudgetExceeded { limit: 2 }));
}

#[test]
fn test_broken_splice_reference_is_reported_with_the_missing_piece() {
    let mut snap = feeder_snapshot();
    snap.splices[0].cable_b = "GHOST".into();

    let err = trace(snap, &TraceStart::olt_port("olt-1", 3)).unwrap_err();

    assert_eq!(err.reason(), FailureReason::Disconnected);
    assert!(err.to_string().contains("GHOST"), "got: {err}");
}

#[test]
fn test_unknown_start_node_is_not_found() {
    let err = trace(feeder_snapshot(), &TraceStart::olt_port("nope", 1)).unwrap_err();
    assert_eq!(err.reason(), FailureReason::NotFound);

    let err = trace(feeder_snapshot(), &TraceStart::cable_fiber("C1", 99)).unwrap_err();
    assert_eq!(err.reason(), FailureReason::NotFound);
    assert!(err.to_string().contains("fiber 99"), "got: {err}");
}

#[test]
fn test_dark_pon_port_is_a_partial_path() {
    let report = trace(feeder_snapshot(), &TraceStart::olt_port("olt-1", 1)).unwrap();

    assert_eq!(report.status, PathStatus::Partial);
    assert_eq!(report.terminus().kind(), SegmentKind::OpenEnd);
}

// ── Loss budget ─────────────────────────────────────────────────────

#[test]
fn test_budget_evaluation_over_a_traced_path() {
    let report = trace(feeder_snapshot(), &TraceStart::olt_port("olt-1", 3)).unwrap();

    let eval = LossBudget::default().evaluate(&report);
    assert!(eval.within_budget);
    // Launch power 3.0 minus 0.15 dB of path loss.
    assert!((eval.expected_rx_power_dbm.unwrap() - 2.85).abs() < 1e-9);
    assert_eq!(eval.observed_rx_power_dbm, Some(-18.5));

    let strict = LossBudget {
        max_loss_db: 0.1,
        ..LossBudget::default()
    };
    assert!(!strict.evaluate(&report).within_budget);
}

// ── Store integration ───────────────────────────────────────────────

#[tokio::test]
async fn test_trace_through_the_inventory_store() {
    let store = InventoryStore::new();
    store.apply_snapshot(feeder_snapshot());

    let report = trace_fiber_path(
        &store,
        &project(),
        &TraceStart::olt_port("olt-1", 3),
        &TraceConfig::default(),
    )
    .await
    .unwrap();

    assert_eq!(report.status, PathStatus::Complete);
    assert_eq!(report.hop_count(), 4);
    assert_eq!(report.customer().unwrap().name, "Jane Doe");
}
