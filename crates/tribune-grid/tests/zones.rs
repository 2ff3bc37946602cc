use proptest::prelude::*;
use tribune_core::{Dir, Pos, Range};
use tribune_grid::{
    CellDescriptor, CellRangeDescriptor, DirectionFlags, GridModel, LoadWarning, TransitionType, ZoneConfig,
    ZoneType,
};

fn snapshot(g: &GridModel) -> Vec<String> {
    g.iter().map(|c| format!("{c:?}")).collect()
}

#[test]
fn cell_override_beats_surrounding_range() {
    let cfg = ZoneConfig::new(12, 16, 32.0)
        .with_range(CellRangeDescriptor::new(ZoneType::Seat, 2, 8, 2, 8))
        .with_cell(CellDescriptor::new(4, 4).zone(ZoneType::RowEntry));
    let g = GridModel::from_config(&cfg).unwrap();
    assert_eq!(g.zone_type(4, 4), Some(ZoneType::RowEntry));
    assert_eq!(g.zone_type(5, 4), Some(ZoneType::Seat));
    assert_eq!(g.zone_type(0, 0), Some(ZoneType::Corridor));
}

#[test]
fn cell_override_wins_even_when_declared_before_a_later_range() {
    // Cells are applied after all ranges regardless of document order.
    let json = r#"{
        "gridConfig": { "rows": 6, "cols": 6, "cellSize": 16 },
        "cells": [ { "row": 1, "col": 1, "zoneType": "stair" } ],
        "cellRanges": [
            { "rowStart": 0, "rowEnd": 5, "colStart": 0, "colEnd": 5, "zoneType": "ground" },
            { "rowStart": 0, "rowEnd": 2, "colStart": 0, "colEnd": 2, "zoneType": "seat" }
        ]
    }"#;
    let g = GridModel::from_config(&ZoneConfig::from_json_str(json).unwrap()).unwrap();
    assert_eq!(g.zone_type(1, 1), Some(ZoneType::Stair));
    assert_eq!(g.zone_type(2, 2), Some(ZoneType::Seat));
    assert_eq!(g.zone_type(3, 3), Some(ZoneType::Ground));
}

#[test]
fn stair_landing_range_indexes_exactly_its_cells() {
    let cfg = ZoneConfig::new(12, 16, 32.0)
        .with_range(CellRangeDescriptor::new(ZoneType::Ground, 0, 11, 0, 15))
        .with_range(
            CellRangeDescriptor::new(ZoneType::Stair, 5, 6, 9, 10).transition(TransitionType::StairLanding),
        );
    let mut g = GridModel::from_config(&cfg).unwrap();
    let set: Vec<Pos> = g
        .boundary_set(TransitionType::StairLanding)
        .iter()
        .map(|c| c.pos())
        .collect();
    assert_eq!(
        set,
        vec![Pos::new(5, 9), Pos::new(5, 10), Pos::new(6, 9), Pos::new(6, 10)]
    );
    assert!(g.boundary_set(TransitionType::RowBoundary).is_empty());

    // Reloading does not duplicate entries.
    g.load_zone_config(&cfg);
    g.load_zone_config(&cfg);
    assert_eq!(g.boundary_set(TransitionType::StairLanding).len(), 4);
}

#[test]
fn reload_discards_runtime_changes() {
    let cfg = ZoneConfig::new(5, 5, 10.0).with_range(CellRangeDescriptor::new(ZoneType::Ground, 0, 4, 0, 4));
    let mut g = GridModel::from_config(&cfg).unwrap();
    let pristine = snapshot(&g);

    g.set_passable(2, 2, false);
    g.set_zone_type(1, 1, ZoneType::Sky);
    g.set_directions(3, 3, Dir::Top.mask(), Dir::Left.mask());
    assert_ne!(snapshot(&g), pristine);

    g.load_zone_config(&cfg);
    assert_eq!(snapshot(&g), pristine);
}

#[test]
fn transition_marker_does_not_change_passability() {
    let cfg = ZoneConfig::new(3, 3, 10.0)
        .with_range(CellRangeDescriptor::new(ZoneType::Sky, 0, 0, 0, 2).transition(TransitionType::RowBoundary))
        .with_range(
            CellRangeDescriptor::new(ZoneType::Ground, 1, 1, 0, 2).transition(TransitionType::CorridorEntry),
        );
    let g = GridModel::from_config(&cfg).unwrap();
    assert!(!g.is_passable(0, 1));
    assert!(g.is_passable(1, 1));
    assert_eq!(g.boundary_positions(TransitionType::RowBoundary).len(), 3);
}

#[test]
fn range_direction_overrides_apply_to_every_cell() {
    let cfg = ZoneConfig::new(4, 4, 10.0).with_range(
        CellRangeDescriptor::new(ZoneType::RowEntry, 1, 2, 0, 3)
            .incoming(DirectionFlags::closed(&[Dir::Top]))
            .outgoing(DirectionFlags::closed(&[Dir::Bottom])),
    );
    let g = GridModel::from_config(&cfg).unwrap();
    for col in 0..4 {
        // Entering row 1 from row 0 arrives through the top side.
        assert!(!g.is_passable_direction(0, col, 1, col));
        // Leaving row 2 downwards is closed.
        assert!(!g.is_passable_direction(2, col, 3, col));
        // The reverse moves stay legal.
        assert!(g.is_passable_direction(1, col, 0, col));
        assert!(g.is_passable_direction(3, col, 2, col));
    }
}

#[test]
fn extreme_range_bounds_are_clamped_not_fatal() {
    let json = r#"{
        "gridConfig": { "rows": 4, "cols": 4, "cellSize": 10 },
        "cellRanges": [
            { "rowStart": 0, "rowEnd": 2147483647, "colStart": 2, "colEnd": 2147483647, "zoneType": "sky" },
            { "rowStart": -2147483648, "rowEnd": 2147483647, "colStart": 0, "colEnd": 0, "zoneType": "ground" }
        ]
    }"#;
    let cfg = ZoneConfig::from_json_str(json).unwrap();
    let mut g = GridModel::new(4, 4, 10.0);
    let report = g.load_zone_config(&cfg);

    assert_eq!(report.ranges_applied, 2);
    assert_eq!(report.warnings.len(), 2);
    match &report.warnings[0] {
        LoadWarning::ClampedRange { index, clamped, .. } => {
            assert_eq!(*index, 0);
            assert_eq!(*clamped, Range::new(0, 2, 4, 4));
        }
        other => panic!("unexpected warning {other}"),
    }
    assert!(matches!(report.warnings[1], LoadWarning::ClampedRange { index: 1, .. }));

    assert_eq!(g.zone_type(3, 3), Some(ZoneType::Sky));
    assert_eq!(g.zone_type(0, 2), Some(ZoneType::Sky));
    assert_eq!(g.zone_type(3, 0), Some(ZoneType::Ground));
    assert_eq!(g.zone_type(1, 1), Some(ZoneType::Corridor));
}

fn arb_zone() -> impl Strategy<Value = ZoneType> {
    prop::sample::select(ZoneType::ALL.to_vec())
}

fn arb_range() -> impl Strategy<Value = CellRangeDescriptor> {
    (arb_zone(), -3i32..12, -3i32..12, -3i32..12, -3i32..12, any::<Option<bool>>()).prop_map(
        |(z, r0, r1, c0, c1, passable)| {
            let mut d = CellRangeDescriptor::new(z, r0, r1, c0, c1).transition(TransitionType::StairLanding);
            d.overrides.passable = passable;
            d
        },
    )
}

fn arb_cell() -> impl Strategy<Value = CellDescriptor> {
    (-1i32..10, -1i32..10, prop::option::of(arb_zone()), any::<Option<bool>>()).prop_map(
        |(r, c, z, passable)| {
            let mut d = CellDescriptor::new(r, c);
            d.zone_type = z;
            d.overrides.passable = passable;
            d
        },
    )
}

proptest! {
    #[test]
    fn loading_twice_equals_loading_once(
        ranges in prop::collection::vec(arb_range(), 0..6),
        cells in prop::collection::vec(arb_cell(), 0..8),
    ) {
        let mut cfg = ZoneConfig::new(8, 9, 16.0);
        cfg.cell_ranges = ranges;
        cfg.cells = cells;

        let mut g = GridModel::new(8, 9, 16.0);
        g.load_zone_config(&cfg);
        let once = snapshot(&g);
        let once_index = g.boundaries().clone();
        g.load_zone_config(&cfg);
        prop_assert_eq!(snapshot(&g), once);
        prop_assert_eq!(g.boundaries(), &once_index);
    }

    #[test]
    fn last_zoned_cell_descriptor_decides_zone(
        ranges in prop::collection::vec(arb_range(), 0..4),
        zones in prop::collection::vec(arb_zone(), 1..4),
    ) {
        let mut cfg = ZoneConfig::new(6, 6, 16.0);
        cfg.cell_ranges = ranges;
        for z in &zones {
            cfg.cells.push(CellDescriptor::new(2, 3).zone(*z));
        }
        let g = GridModel::from_config(&cfg).unwrap();
        prop_assert_eq!(g.zone_type(2, 3), zones.last().copied());
    }

    #[test]
    fn every_passable_cell_has_a_zone(
        ranges in prop::collection::vec(arb_range(), 0..6),
    ) {
        let mut cfg = ZoneConfig::new(7, 7, 8.0);
        cfg.cell_ranges = ranges;
        let g = GridModel::from_config(&cfg).unwrap();
        prop_assert_eq!(g.iter().count(), 49);
        for c in g.iter() {
            prop_assert!(ZoneType::ALL.contains(&c.zone_type()));
        }
    }
}
