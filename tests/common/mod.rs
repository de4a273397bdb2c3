//! Shared helpers for integration tests.

#![allow(dead_code)]

use rs_trainyard::{Color, Dir, DirFlags, Goal, Grid, Outlet, SingleRail, Tile};

/// Install a test logger once; later calls are no-ops.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn outlet(out: Dir, colors: &[Color]) -> Tile {
    Tile::Outlet(Outlet::new(out, colors.iter().copied()))
}

pub fn goal(targets: &[Color], entrances: &[Dir]) -> Tile {
    Tile::Goal(
        Goal::new(targets.iter().copied(), DirFlags::from_dirs(entrances))
            .expect("goal has an entrance"),
    )
}

pub fn rail(a: Dir, b: Dir) -> Tile {
    Tile::SingleRail(SingleRail::new(a, b).expect("distinct rail ends"))
}

/// `width x 1` grid: an outlet on the left heading right, a goal on the
/// right entered from the left, horizontal rails in between.
pub fn line(width: usize, colors: &[Color], targets: &[Color]) -> Grid {
    let mut grid = Grid::new(width, 1);
    grid.set(0, 0, outlet(Dir::Right, colors)).expect("in bounds");
    for x in 1..width - 1 {
        grid.set(x, 0, rail(Dir::Left, Dir::Right)).expect("in bounds");
    }
    grid.set(width - 1, 0, goal(targets, &[Dir::Left]))
        .expect("in bounds");
    grid
}

/// Place `(x, y, tile)` entries on a blank `width x height` grid.
pub fn grid_with(width: usize, height: usize, tiles: Vec<(usize, usize, Tile)>) -> Grid {
    let mut grid = Grid::new(width, height);
    for (x, y, tile) in tiles {
        grid.set(x, y, tile).expect("in bounds");
    }
    grid
}
