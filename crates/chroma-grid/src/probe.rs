//! Box-versus-grid collision queries.
//!
//! All queries use the inclusive cell range `floor(min)..=floor(max)` on both
//! axes, so a box whose edge sits exactly on a cell boundary also tests the
//! cell beyond it. Any part of the range outside `[0, width) x [0, height)`
//! makes the query report a collision: level borders behave like walls.

use crate::geometry::Bounds;
use crate::grid::TileGrid;
use crate::world::WorldSwitch;

/// Whether `bounds` overlaps a solid cell or leaves the grid.
pub fn is_colliding(grid: &TileGrid, bounds: Bounds, world: WorldSwitch) -> bool {
    let cells = bounds.cells();
    if !cells.within(grid.width(), grid.height()) {
        return true;
    }
    cells.iter().any(|(x, y)| grid.is_solid(x, y, world))
}

/// Whether `bounds` overlaps a cell a wall jump can push off, or leaves the
/// grid. Solid tiles that are not walls (spikes, goals) are ignored.
pub fn touches_wall(grid: &TileGrid, bounds: Bounds, world: WorldSwitch) -> bool {
    let cells = bounds.cells();
    if !cells.within(grid.width(), grid.height()) {
        return true;
    }
    cells.iter().any(|(x, y)| grid.is_wall(x, y, world))
}
