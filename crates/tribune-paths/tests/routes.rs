use std::cell::RefCell;
use std::rc::Rc;

use proptest::prelude::*;
use tribune_core::{Dir, DirMask, Pos, WorldPos};
use tribune_grid::{CellRangeDescriptor, DirectionFlags, GridModel, ZoneConfig, ZoneType};
use tribune_paths::{
    CacheClearReason, PathCell, PathEvent, Pathfinder, PathfinderConfig, SearchOutcome, check_path, path_cost,
};

fn stadium() -> ZoneConfig {
    ZoneConfig::new(12, 16, 32.0).with_range(CellRangeDescriptor::new(ZoneType::Ground, 0, 11, 0, 15))
}

fn cells(path: &[PathCell]) -> Vec<Pos> {
    path.iter().map(PathCell::pos).collect()
}

fn assert_axis_aligned(path: &[PathCell]) {
    for pair in path.windows(2) {
        let dr = (pair[0].row - pair[1].row).abs();
        let dc = (pair[0].col - pair[1].col).abs();
        assert_eq!(dr + dc, 1, "non-cardinal step {:?} -> {:?}", pair[0], pair[1]);
    }
}

#[test]
fn open_ground_route_is_axis_aligned() {
    let g = GridModel::from_config(&stadium()).unwrap();
    let mut pf = Pathfinder::new(&g);
    let path = pf.find_path_cells(&g, Pos::new(2, 2), Pos::new(8, 8));
    assert_eq!(path.len(), 13);
    assert_eq!(path.first().map(PathCell::pos), Some(Pos::new(2, 2)));
    assert_eq!(path.last().map(PathCell::pos), Some(Pos::new(8, 8)));
    assert_axis_aligned(&path);
    assert!(check_path(&g, &path).is_ok());
}

fn max_drift(path: &[PathCell], start: Pos) -> i32 {
    path.iter()
        .map(|c| ((c.row - start.row) - (c.col - start.col)).abs())
        .max()
        .unwrap_or(0)
}

#[test]
fn tie_break_keeps_route_on_the_diagonal() {
    let g = GridModel::from_config(&stadium()).unwrap();
    let (start, goal) = (Pos::new(2, 2), Pos::new(8, 8));

    let mut pf = Pathfinder::new(&g);
    let straight = pf.find_path_cells(&g, start, goal);
    assert_eq!(straight.len(), 13);
    assert!(max_drift(&straight, start) <= 1, "{:?}", cells(&straight));

    let flat = PathfinderConfig {
        tie_break_weight: 0.0,
        ..Default::default()
    };
    let mut pf = Pathfinder::with_config(&g, flat);
    let unbiased = pf.find_path_cells(&g, start, goal);
    assert_eq!(unbiased.len(), 13);
    assert!(max_drift(&unbiased, start) > 1, "{:?}", cells(&unbiased));
    assert!((path_cost(&straight) - path_cost(&unbiased)).abs() < 1e-3);
}

#[test]
fn sky_wall_blocks_route() {
    let cfg = stadium().with_range(CellRangeDescriptor::new(ZoneType::Sky, 0, 11, 5, 5));
    let g = GridModel::from_config(&cfg).unwrap();
    let mut pf = Pathfinder::new(&g);
    assert!(pf.find_path_cells(&g, Pos::new(2, 2), Pos::new(8, 8)).is_empty());
}

#[test]
fn world_endpoints_resolve_through_origin() {
    let g = GridModel::from_config(&stadium())
        .unwrap()
        .with_origin(WorldPos::new(100.0, 50.0));
    let mut pf = Pathfinder::new(&g);
    let from = g.grid_to_world(0, 0);
    let to = WorldPos::new(100.0 + 3.0 * 32.0 + 1.0, 50.0 + 31.0);
    let path = pf.find_path(&g, from, to);
    assert_eq!(cells(&path), [Pos::new(0, 0), Pos::new(0, 1), Pos::new(0, 2), Pos::new(0, 3)]);
    assert_eq!(path[0].world(), WorldPos::new(116.0, 66.0));
    assert_eq!(path[3].world(), g.grid_to_world(0, 3));
}

#[test]
fn one_way_corridor_is_directed() {
    let cfg = ZoneConfig::new(1, 5, 10.0).with_range(
        CellRangeDescriptor::new(ZoneType::Corridor, 0, 0, 0, 4).outgoing(DirectionFlags::closed(&[Dir::Left])),
    );
    let g = GridModel::from_config(&cfg).unwrap();
    let mut pf = Pathfinder::new(&g);
    let east = pf.find_path_cells(&g, Pos::new(0, 0), Pos::new(0, 4));
    assert_eq!(east.len(), 5);
    assert!(pf.find_path_cells(&g, Pos::new(0, 4), Pos::new(0, 0)).is_empty());
}

#[test]
fn closed_incoming_side_forces_detour() {
    let mut g = GridModel::from_config(&stadium()).unwrap();
    // (5,6) may only be entered from below.
    g.set_directions(5, 6, DirMask::BOTTOM, DirMask::ALL);
    let mut pf = Pathfinder::new(&g);
    let path = pf.find_path_cells(&g, Pos::new(5, 5), Pos::new(5, 6));
    assert_eq!(
        cells(&path),
        [Pos::new(5, 5), Pos::new(6, 5), Pos::new(6, 6), Pos::new(5, 6)]
    );
    assert!(check_path(&g, &path).is_ok());
}

#[test]
fn expensive_seats_are_walked_around() {
    let cfg = ZoneConfig::new(5, 9, 10.0)
        .with_range(CellRangeDescriptor::new(ZoneType::Ground, 0, 4, 0, 8))
        .with_range(CellRangeDescriptor::new(ZoneType::Seat, 2, 2, 2, 6));
    let g = GridModel::from_config(&cfg).unwrap();
    let mut pf = Pathfinder::new(&g);
    let path = pf.find_path_cells(&g, Pos::new(2, 0), Pos::new(2, 8));
    assert_eq!(path.len(), 11);
    assert!(path.iter().all(|c| g.zone_type(c.row, c.col) == Some(ZoneType::Ground)));
    assert!((path_cost(&path) - 10.0 * 8.0).abs() < 1e-3);
}

#[test]
fn repeated_queries_are_identical() {
    let cfg = stadium()
        .with_range(CellRangeDescriptor::new(ZoneType::Seat, 3, 9, 4, 11))
        .with_range(CellRangeDescriptor::new(ZoneType::RowEntry, 6, 6, 4, 11));
    let g = GridModel::from_config(&cfg).unwrap();
    let mut pf = Pathfinder::new(&g);
    let a = pf.find_path_cells(&g, Pos::new(0, 0), Pos::new(11, 15));
    let b = pf.find_path_cells(&g, Pos::new(0, 0), Pos::new(11, 15));
    let c = Pathfinder::new(&g).find_path_cells(&g, Pos::new(0, 0), Pos::new(11, 15));
    assert!(!a.is_empty());
    assert_eq!(a, b);
    assert_eq!(a, c);
}

#[test]
fn obstacle_invalidates_previous_route() {
    let mut g = GridModel::from_config(&ZoneConfig::new(1, 5, 10.0)).unwrap();
    let mut pf = Pathfinder::new(&g);
    assert_eq!(pf.find_path_cells(&g, Pos::new(0, 0), Pos::new(0, 4)).len(), 5);

    assert!(g.set_passable(0, 2, false));
    assert!(pf.find_path_cells(&g, Pos::new(0, 0), Pos::new(0, 4)).is_empty());

    assert!(g.set_passable(0, 2, true));
    assert_eq!(pf.find_path_cells(&g, Pos::new(0, 0), Pos::new(0, 4)).len(), 5);
}

#[test]
fn reload_with_impassable_region_leaves_no_stale_route() {
    let mut g = GridModel::from_config(&stadium()).unwrap();
    let mut pf = Pathfinder::new(&g);
    let before = pf.find_path_cells(&g, Pos::new(2, 2), Pos::new(2, 12));
    assert_eq!(before.len(), 11);
    let warm = pf.cache_stats();
    assert!(warm.entries > 0);

    let walled = stadium().with_range(CellRangeDescriptor::new(ZoneType::Ground, 0, 11, 7, 7).passable(false));
    g.load_zone_config(&walled);
    let stats = pf.cache_stats();
    assert_eq!(stats.entries, 0);
    assert_eq!(stats.clears, warm.clears + 1);

    assert!(pf.find_path_cells(&g, Pos::new(2, 2), Pos::new(2, 12)).is_empty());
}

#[test]
fn events_report_query_outcome_and_cache_clears() {
    let mut g = GridModel::from_config(&stadium()).unwrap();
    let mut pf = Pathfinder::new(&g);
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    let id = pf.subscribe(move |e| sink.borrow_mut().push(e.clone()));

    let from = g.grid_to_world(1, 1);
    let to = g.grid_to_world(1, 4);
    let path = pf.find_path(&g, from, to);
    g.load_zone_config(&stadium());
    g.set_passable(0, 0, false);

    {
        let seen = seen.borrow();
        assert_eq!(seen.len(), 3);
        match &seen[0] {
            PathEvent::PathCalculated {
                query,
                outcome,
                path: reported,
            } => {
                assert_eq!(query.from, from);
                assert_eq!(query.start, Some(Pos::new(1, 1)));
                assert_eq!(query.goal, Some(Pos::new(1, 4)));
                assert!(outcome.is_found());
                assert_eq!(reported, &path);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(
            seen[1],
            PathEvent::CacheCleared {
                reason: CacheClearReason::ZonesLoaded
            }
        );
        assert_eq!(
            seen[2],
            PathEvent::CacheCleared {
                reason: CacheClearReason::GridChanged
            }
        );
    }

    assert!(pf.unsubscribe(id));
    pf.find_path(&g, from, to);
    assert_eq!(seen.borrow().len(), 3);
}

#[test]
fn unreachable_and_exhausted_share_the_empty_result() {
    let mut g = GridModel::from_config(&ZoneConfig::new(10, 10, 8.0)).unwrap();
    for r in 0..10 {
        g.set_passable(r, 5, false);
    }
    let outcomes = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&outcomes);

    let mut pf = Pathfinder::new(&g);
    pf.subscribe(move |e| {
        if let PathEvent::PathCalculated { outcome, .. } = e {
            sink.borrow_mut().push(outcome.clone());
        }
    });
    assert!(pf.find_path_cells(&g, Pos::new(0, 0), Pos::new(0, 9)).is_empty());
    g.set_passable(9, 5, true);
    let tight = PathfinderConfig {
        iteration_multiplier: 1,
        ..Default::default()
    };
    let mut capped = Pathfinder::with_config(&g, tight);
    let sink = Rc::clone(&outcomes);
    capped.subscribe(move |e| {
        if let PathEvent::PathCalculated { outcome, .. } = e {
            sink.borrow_mut().push(outcome.clone());
        }
    });
    assert!(capped.find_path_cells(&g, Pos::new(0, 0), Pos::new(0, 9)).is_empty());

    let outcomes = outcomes.borrow();
    assert!(matches!(outcomes[0], SearchOutcome::Unreachable { .. }));
    assert!(matches!(outcomes[1], SearchOutcome::Exhausted { limit: 20, .. }));
}

#[test]
fn grids_do_not_share_caches() {
    let a = GridModel::from_config(&ZoneConfig::new(1, 4, 10.0)).unwrap();
    let mut b = GridModel::from_config(&ZoneConfig::new(1, 4, 10.0)).unwrap();
    let mut pa = Pathfinder::new(&a);
    let mut pb = Pathfinder::new(&b);
    assert_eq!(pa.find_path_cells(&a, Pos::new(0, 0), Pos::new(0, 3)).len(), 4);
    assert_eq!(pb.find_path_cells(&b, Pos::new(0, 0), Pos::new(0, 3)).len(), 4);

    b.set_passable(0, 1, false);
    assert_eq!(pa.cache_stats().clears, 0);
    assert_eq!(pa.find_path_cells(&a, Pos::new(0, 0), Pos::new(0, 3)).len(), 4);
    assert!(pb.find_path_cells(&b, Pos::new(0, 0), Pos::new(0, 3)).is_empty());
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

const SIDE: i32 = 8;

#[derive(Clone, Debug)]
struct Layout {
    zones: Vec<ZoneType>,
    blocked: Vec<bool>,
    one_way: Vec<Option<Dir>>,
}

fn layout() -> impl Strategy<Value = Layout> {
    let n = (SIDE * SIDE) as usize;
    let zone = prop::sample::select(vec![
        ZoneType::Ground,
        ZoneType::Corridor,
        ZoneType::Seat,
        ZoneType::RowEntry,
        ZoneType::Stair,
    ]);
    let dir = prop::option::weighted(0.15, prop::sample::select(Dir::ALL.to_vec()));
    (
        prop::collection::vec(zone, n),
        prop::collection::vec(prop::bool::weighted(0.2), n),
        prop::collection::vec(dir, n),
    )
        .prop_map(|(zones, blocked, one_way)| Layout {
            zones,
            blocked,
            one_way,
        })
}

fn build(l: &Layout) -> GridModel {
    let mut g = GridModel::new(SIDE, SIDE, 16.0);
    for (i, p) in g.bounds().iter().enumerate() {
        g.set_zone_type(p.row, p.col, l.zones[i]);
        if l.blocked[i] {
            g.set_passable(p.row, p.col, false);
        }
        if let Some(d) = l.one_way[i] {
            g.set_directions(p.row, p.col, DirMask::ALL, DirMask::ALL & !d.mask());
        }
    }
    g
}

fn endpoint() -> impl Strategy<Value = Pos> {
    (0..SIDE, 0..SIDE).prop_map(|(r, c)| Pos::new(r, c))
}

proptest! {
    #[test]
    fn returned_paths_are_legal(l in layout(), s in endpoint(), t in endpoint()) {
        let g = build(&l);
        let mut pf = Pathfinder::new(&g);
        let path = pf.find_path_cells(&g, s, t);
        if !path.is_empty() {
            prop_assert_eq!(path[0].pos(), s);
            prop_assert_eq!(path[path.len() - 1].pos(), t);
            prop_assert_eq!(path[0].cost, 0.0);
            prop_assert!(check_path(&g, &path).is_ok());
            for pair in path.windows(2) {
                prop_assert!(g.is_passable_direction(pair[0].row, pair[0].col, pair[1].row, pair[1].col));
            }
        }
    }

    #[test]
    fn cache_never_changes_outcome(l in layout(), s in endpoint(), t in endpoint()) {
        let g = build(&l);
        let mut pf = Pathfinder::new(&g);
        let cold = pf.find_path_cells(&g, s, t);
        let warm = pf.find_path_cells(&g, s, t);
        pf.clear_cache();
        let cleared = pf.find_path_cells(&g, s, t);
        let fresh = Pathfinder::new(&g).find_path_cells(&g, s, t);
        prop_assert_eq!(&cold, &warm);
        prop_assert_eq!(&cold, &cleared);
        prop_assert_eq!(&cold, &fresh);
    }

    #[test]
    fn open_ground_paths_are_shortest(s in endpoint(), t in endpoint()) {
        let g = GridModel::from_config(
            &ZoneConfig::new(SIDE, SIDE, 16.0)
                .with_range(CellRangeDescriptor::new(ZoneType::Ground, 0, SIDE - 1, 0, SIDE - 1)),
        )
        .unwrap();
        let mut pf = Pathfinder::new(&g);
        let path = pf.find_path_cells(&g, s, t);
        prop_assert_eq!(path.len() as i32, s.manhattan(t) + 1);
    }
}
