//! Load a stadium zone config, route between two cells and print the result.

use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::Parser;
use tribune_core::{Pos, WorldPos};
use tribune_grid::{GridModel, ZoneConfig};
use tribune_paths::{PathEvent, Pathfinder, PathfinderConfig, path_cost};

#[derive(Parser, Debug)]
#[command(name = "tribune-demo", about = "Route a spectator across a stadium grid")]
struct Args {
    /// Zone configuration document (JSON).
    #[arg(default_value = "demos/configs/stadium.json")]
    config: PathBuf,

    /// Start cell as ROW,COL.
    #[arg(long, value_parser = parse_pos, default_value = "0,0")]
    from: Pos,

    /// Goal cell as ROW,COL.
    #[arg(long, value_parser = parse_pos)]
    to: Option<Pos>,

    /// Block a cell before routing; may be repeated.
    #[arg(long = "block", value_parser = parse_pos)]
    blocked: Vec<Pos>,

    /// Expansion cap as a multiple of rows + cols.
    #[arg(long, default_value_t = 10)]
    iterations: usize,

    /// Print every step with its world position and cost.
    #[arg(short, long)]
    verbose: bool,
}

fn parse_pos(s: &str) -> Result<Pos, String> {
    let (r, c) = s.split_once(',').ok_or_else(|| format!("expected ROW,COL, got {s:?}"))?;
    let row = r.trim().parse::<i32>().map_err(|e| format!("bad row {r:?}: {e}"))?;
    let col = c.trim().parse::<i32>().map_err(|e| format!("bad col {c:?}: {e}"))?;
    Ok(Pos::new(row, col))
}

fn overlay(grid: &GridModel, path: &[Pos], start: Pos, goal: Pos) -> String {
    let mut rows: Vec<Vec<char>> = grid.dump().lines().map(|l| l.chars().collect()).collect();
    let mut mark = |p: Pos, ch: char| {
        if let Some(slot) = rows.get_mut(p.row as usize).and_then(|r| r.get_mut(p.col as usize)) {
            *slot = ch;
        }
    };
    for &p in path {
        mark(p, '*');
    }
    mark(start, 'S');
    mark(goal, 'G');
    rows.into_iter()
        .map(|r| r.into_iter().collect::<String>())
        .collect::<Vec<_>>()
        .join("\n")
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = ZoneConfig::from_path(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;
    let gc = &config.grid_config;
    let mut grid =
        GridModel::new(gc.rows, gc.cols, gc.cell_size).with_origin(WorldPos::new(gc.origin_x, gc.origin_y));
    let report = grid.load_zone_config(&config);
    for w in &report.warnings {
        eprintln!("warning: {w}");
    }

    let goal = args
        .to
        .unwrap_or_else(|| Pos::new(grid.rows() - 1, grid.cols() - 1));
    for p in [args.from, goal] {
        if grid.cell_at(p).is_none() {
            bail!("cell {p} is outside the {}x{} grid", grid.rows(), grid.cols());
        }
    }

    let mut pathfinder = Pathfinder::with_config(
        &grid,
        PathfinderConfig {
            iteration_multiplier: args.iterations,
            ..Default::default()
        },
    );
    pathfinder.subscribe(|event| {
        if let PathEvent::PathCalculated { outcome, .. } = event {
            eprintln!("search: {outcome:?}");
        }
    });

    for p in &args.blocked {
        if !grid.set_passable(p.row, p.col, false) {
            eprintln!("warning: could not block {p}");
        }
    }

    let path = pathfinder.find_path_cells(&grid, args.from, goal);
    let cells: Vec<Pos> = path.iter().map(|c| c.pos()).collect();
    println!("{}", overlay(&grid, &cells, args.from, goal));

    if path.is_empty() {
        println!("no route from {} to {goal}", args.from);
        return Ok(());
    }
    println!(
        "{} steps, cost {:.1}, {:?}",
        path.len() - 1,
        path_cost(&path),
        pathfinder.cache_stats()
    );
    if args.verbose {
        for c in &path {
            println!("  ({:>2}, {:>2})  x={:>7.1} y={:>7.1}  +{:.1}", c.row, c.col, c.x, c.y, c.cost);
        }
    }
    pathfinder.detach(&grid);
    Ok(())
}
