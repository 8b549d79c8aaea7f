use crate::state::{CombatantId, Rotation, Tile};

/// Map geometry and path search.
///
/// Blocking accounts for walls and for live combatants standing on a tile.
pub trait SpatialOracle {
    fn distance(&self, from: Tile, to: Tile) -> u32;

    /// Facing from `from` that points most directly at `to`.
    fn rotation_towards(&self, from: Tile, to: Tile) -> Rotation;

    /// Tile `distance` steps away along `rotation`, clamped to the map.
    fn tile_in_direction(&self, tile: Tile, rotation: Rotation, distance: u32) -> Tile;

    /// Steps `mover` would walk from `from` towards `to`.
    ///
    /// The destination itself may be occupied (walking up to a target);
    /// `None` or an empty path means it is unreachable.
    fn find_path(&self, mover: CombatantId, from: Tile, to: Tile) -> Option<Vec<Rotation>>;

    /// Path length, `0` when unreachable.
    fn path_length(&self, mover: CombatantId, from: Tile, to: Tile) -> u32 {
        self.find_path(mover, from, to)
            .map_or(0, |path| path.len() as u32)
    }

    fn is_tile_blocked(&self, tile: Tile) -> bool;

    fn is_sight_blocked(&self, from: Tile, to: Tile) -> bool;

    /// Tiles a projectile crosses from `from` to `to`, excluding `from`.
    fn straight_line(&self, from: Tile, to: Tile) -> Vec<Tile>;
}
