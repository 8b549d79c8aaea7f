//! Axial hex geometry over a parallelogram map.
//!
//! Tile `n` sits at column `q = n % width`, row `r = n / width`. Rotations
//! are numbered clockwise starting east.

use std::collections::{HashMap, HashSet, VecDeque};

use combat_core::{Rotation, Tile};

const DIRECTIONS: [(i32, i32); Rotation::COUNT as usize] =
    [(1, 0), (0, 1), (-1, 1), (-1, 0), (0, -1), (1, -1)];

#[derive(Clone, Debug)]
pub struct HexGrid {
    width: i32,
    height: i32,
    walls: HashSet<Tile>,
}

impl HexGrid {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1) as i32,
            height: height.max(1) as i32,
            walls: HashSet::new(),
        }
    }

    pub fn tile(&self, q: i32, r: i32) -> Tile {
        Tile(r * self.width + q)
    }

    pub fn coords(&self, tile: Tile) -> (i32, i32) {
        (tile.0.rem_euclid(self.width), tile.0.div_euclid(self.width))
    }

    pub fn contains(&self, tile: Tile) -> bool {
        tile.0 >= 0 && tile.0 < self.width * self.height
    }

    fn in_bounds(&self, q: i32, r: i32) -> bool {
        (0..self.width).contains(&q) && (0..self.height).contains(&r)
    }

    pub fn add_wall(&mut self, tile: Tile) {
        self.walls.insert(tile);
    }

    pub fn is_wall(&self, tile: Tile) -> bool {
        !self.contains(tile) || self.walls.contains(&tile)
    }

    pub fn distance(&self, from: Tile, to: Tile) -> u32 {
        let (aq, ar) = self.coords(from);
        let (bq, br) = self.coords(to);
        axial_distance(bq - aq, br - ar)
    }

    pub fn neighbor(&self, tile: Tile, rotation: Rotation) -> Option<Tile> {
        let (q, r) = self.coords(tile);
        let (dq, dr) = DIRECTIONS[rotation.value() as usize];
        self.in_bounds(q + dq, r + dr)
            .then(|| self.tile(q + dq, r + dr))
    }

    /// Facing whose first step gets closest to `to`; ties go to the lower
    /// rotation.
    pub fn rotation_towards(&self, from: Tile, to: Tile) -> Rotation {
        let (aq, ar) = self.coords(from);
        let (bq, br) = self.coords(to);
        (0..Rotation::COUNT)
            .min_by_key(|facing| {
                let (dq, dr) = DIRECTIONS[*facing as usize];
                axial_distance(bq - aq - dq, br - ar - dr)
            })
            .map(Rotation::new)
            .unwrap_or_default()
    }

    /// Walks `distance` steps along `rotation`, stopping at the map edge.
    pub fn tile_in_direction(&self, tile: Tile, rotation: Rotation, distance: u32) -> Tile {
        let mut current = tile;
        for _ in 0..distance {
            match self.neighbor(current, rotation) {
                Some(next) => current = next,
                None => break,
            }
        }
        current
    }

    /// Tiles from `from` to `to` inclusive of `to`, by cube interpolation.
    pub fn line(&self, from: Tile, to: Tile) -> Vec<Tile> {
        let steps = self.distance(from, to);
        let (aq, ar) = self.coords(from);
        let (bq, br) = self.coords(to);
        (1..=steps)
            .map(|step| {
                let t = f64::from(step) / f64::from(steps);
                let q = f64::from(aq) + f64::from(bq - aq) * t + 1e-6;
                let r = f64::from(ar) + f64::from(br - ar) * t + 2e-6;
                let (q, r) = cube_round(q, r);
                self.tile(q, r)
            })
            .collect()
    }

    /// Breadth-first search. `to` itself may be blocked.
    pub fn path(
        &self,
        from: Tile,
        to: Tile,
        blocked: impl Fn(Tile) -> bool,
    ) -> Option<Vec<Rotation>> {
        if !self.contains(from) || !self.contains(to) {
            return None;
        }
        if from == to {
            return Some(Vec::new());
        }

        let mut came_from: HashMap<Tile, (Tile, Rotation)> = HashMap::new();
        let mut queue = VecDeque::from([from]);
        while let Some(tile) = queue.pop_front() {
            for facing in 0..Rotation::COUNT {
                let rotation = Rotation::new(facing);
                let Some(next) = self.neighbor(tile, rotation) else {
                    continue;
                };
                if next == from || came_from.contains_key(&next) {
                    continue;
                }
                if next != to && (self.is_wall(next) || blocked(next)) {
                    continue;
                }
                came_from.insert(next, (tile, rotation));
                if next == to {
                    return Some(unwind(&came_from, from, to));
                }
                queue.push_back(next);
            }
        }
        None
    }
}

fn unwind(came_from: &HashMap<Tile, (Tile, Rotation)>, from: Tile, to: Tile) -> Vec<Rotation> {
    let mut steps = Vec::new();
    let mut current = to;
    while current != from {
        let Some((previous, rotation)) = came_from.get(&current) else {
            break;
        };
        steps.push(*rotation);
        current = *previous;
    }
    steps.reverse();
    steps
}

fn axial_distance(dq: i32, dr: i32) -> u32 {
    (dq.unsigned_abs() + dr.unsigned_abs() + (dq + dr).unsigned_abs()) / 2
}

fn cube_round(q: f64, r: f64) -> (i32, i32) {
    let s = -q - r;
    let (mut rq, mut rr, rs) = (q.round(), r.round(), s.round());
    let (dq, dr, ds) = ((rq - q).abs(), (rr - r).abs(), (rs - s).abs());
    if dq > dr && dq > ds {
        rq = -rr - rs;
    } else if dr > ds {
        rr = -rq - rs;
    }
    (rq as i32, rr as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_counts_hex_steps() {
        let grid = HexGrid::new(10, 10);
        assert_eq!(grid.distance(grid.tile(0, 0), grid.tile(3, 0)), 3);
        assert_eq!(grid.distance(grid.tile(0, 0), grid.tile(2, 2)), 4);
        assert_eq!(grid.distance(grid.tile(3, 0), grid.tile(0, 3)), 3);
    }

    #[test]
    fn path_routes_around_walls() {
        let mut grid = HexGrid::new(6, 6);
        grid.add_wall(grid.tile(1, 0));
        grid.add_wall(grid.tile(1, 1));
        let from = grid.tile(0, 0);
        let to = grid.tile(2, 0);

        let path = grid.path(from, to, |_| false).unwrap();
        assert!(path.len() > 2);
        let end = path
            .iter()
            .fold(from, |tile, rotation| grid.tile_in_direction(tile, *rotation, 1));
        assert_eq!(end, to);
    }

    #[test]
    fn line_ends_on_target() {
        let grid = HexGrid::new(10, 10);
        let line = grid.line(grid.tile(0, 0), grid.tile(4, 2));
        assert_eq!(line.len(), 6);
        assert_eq!(line.last(), Some(&grid.tile(4, 2)));
    }

    #[test]
    fn stepping_stops_at_the_edge() {
        let grid = HexGrid::new(5, 5);
        let east = grid.rotation_towards(grid.tile(0, 2), grid.tile(4, 2));
        assert_eq!(grid.tile_in_direction(grid.tile(2, 2), east, 10), grid.tile(4, 2));
    }
}
