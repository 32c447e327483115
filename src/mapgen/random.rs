//! # Random Maze Generation
//!
//! Generates random rectangular mazes for development and testing. A
//! spanning structure over the grid is carved by randomized depth-first
//! search, which guarantees every room is reachable from room 0; opening
//! extra walls afterwards introduces cycles.

use anyhow::{Result, ensure};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::map::{MapFile, RoomRecord};
use crate::mat;
use crate::world::{Dir, World};

/// Generates a `width` x `height` grid maze.
///
/// Room ids are row-major from the south-west corner, which is also the
/// starting room; coordinates are `(x, y)` with north up. `extra_exits`
/// additional walls are opened after carving (capped at the number of
/// remaining walls).
///
/// # Arguments
/// * `width`, `height` - Grid dimensions in rooms, both at least 1.
/// * `extra_exits` - Number of cycle-forming passages to add.
/// * `seed` - Optional seed for reproducibility.
pub fn generate(
    width: usize,
    height: usize,
    extra_exits: usize,
    seed: Option<u64>,
) -> Result<World> {
    ensure!(width > 0 && height > 0, "maze must be at least 1x1");
    let mut rng = match seed {
        Some(s) => rand::rngs::StdRng::seed_from_u64(s),
        None => rand::rngs::StdRng::from_os_rng(),
    };

    let id_at = |x: usize, y: usize| y * width + x;
    let step = |x: usize, y: usize, d: Dir| -> Option<(usize, usize)> {
        match d {
            Dir::North if y + 1 < height => Some((x, y + 1)),
            Dir::South if y > 0 => Some((x, y - 1)),
            Dir::East if x + 1 < width => Some((x + 1, y)),
            Dir::West if x > 0 => Some((x - 1, y)),
            _ => None,
        }
    };

    // Carve a spanning structure by randomized DFS from room 0, recording
    // opened passages from both sides.
    let mut open = mat![false; width * height; 4];
    let mut carved = mat![false; height; width];
    carved[0][0] = true;
    let mut stack = vec![(0usize, 0usize)];
    while let Some(&(x, y)) = stack.last() {
        let candidates: Vec<Dir> = Dir::ALL
            .into_iter()
            .filter(|&d| step(x, y, d).is_some_and(|(nx, ny)| !carved[ny][nx]))
            .collect();
        if candidates.is_empty() {
            stack.pop();
            continue;
        }
        let d = candidates[rng.random_range(0..candidates.len())];
        let (nx, ny) = step(x, y, d).expect("candidate stays on the grid");
        open[id_at(x, y)][d.index()] = true;
        open[id_at(nx, ny)][d.opposite().index()] = true;
        carved[ny][nx] = true;
        stack.push((nx, ny));
    }

    // Open extra walls to introduce cycles. Enumerating only north/east
    // walls visits each wall once.
    let mut walls: Vec<(usize, usize, Dir)> = Vec::new();
    for y in 0..height {
        for x in 0..width {
            for d in [Dir::North, Dir::East] {
                if step(x, y, d).is_some() && !open[id_at(x, y)][d.index()] {
                    walls.push((x, y, d));
                }
            }
        }
    }
    walls.shuffle(&mut rng);
    for &(x, y, d) in walls.iter().take(extra_exits) {
        let (nx, ny) = step(x, y, d).expect("wall stays on the grid");
        open[id_at(x, y)][d.index()] = true;
        open[id_at(nx, ny)][d.opposite().index()] = true;
    }

    let mut records = MapFile::new();
    for y in 0..height {
        for x in 0..width {
            let id = id_at(x, y);
            let exits = Dir::ALL
                .into_iter()
                .filter(|&d| open[id][d.index()])
                .filter_map(|d| step(x, y, d).map(|(nx, ny)| (d, id_at(nx, ny))))
                .collect();
            records.insert(
                id.to_string(),
                RoomRecord {
                    coordinates: Some((x as i64, y as i64)),
                    exits,
                },
            );
        }
    }
    World::from_records(&records)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge_count(world: &World) -> usize {
        let exits: usize = world.rooms().iter().map(|r| r.exit_dirs().len()).sum();
        assert_eq!(exits % 2, 0);
        exits / 2
    }

    fn reachable_from_start(world: &World) -> usize {
        let mut seen = vec![false; world.num_rooms()];
        let mut stack = vec![world.starting_room()];
        seen[world.starting_room()] = true;
        let mut count = 1;
        while let Some(u) = stack.pop() {
            for d in world.room(u).exit_dirs() {
                let v = world.neighbor(u, d).unwrap();
                if !seen[v] {
                    seen[v] = true;
                    count += 1;
                    stack.push(v);
                }
            }
        }
        count
    }

    #[test]
    fn test_generate_is_connected() {
        for seed in 0..20 {
            let world = generate(10, 7, 4, Some(seed)).unwrap();
            assert_eq!(world.num_rooms(), 70);
            assert_eq!(reachable_from_start(&world), 70);
        }
    }

    #[test]
    fn test_spanning_structure_plus_extra_edges() {
        // A carved w*h maze has exactly w*h - 1 passages; each extra exit
        // opens one more.
        for extra in [0, 3, 10] {
            let world = generate(6, 5, extra, Some(11)).unwrap();
            assert_eq!(edge_count(&world), 29 + extra);
        }
    }

    #[test]
    fn test_extra_exits_capped_at_wall_count() {
        let world = generate(3, 3, 1000, Some(5)).unwrap();
        // Fully open 3x3 grid: 12 passages.
        assert_eq!(edge_count(&world), 12);
    }

    #[test]
    fn test_coordinates_are_row_major() {
        let world = generate(4, 3, 0, Some(0)).unwrap();
        for room in world.rooms() {
            let (x, y) = room.coordinates.unwrap();
            assert_eq!(room.id, (y as usize) * 4 + x as usize);
        }
    }

    #[test]
    fn test_seeded_generation_is_reproducible() {
        let a = generate(8, 8, 6, Some(77)).unwrap();
        let b = generate(8, 8, 6, Some(77)).unwrap();
        assert_eq!(a.to_records(), b.to_records());
    }

    #[test]
    fn test_single_cell_maze() {
        let world = generate(1, 1, 0, Some(0)).unwrap();
        assert_eq!(world.num_rooms(), 1);
        assert!(world.room(0).exit_dirs().is_empty());
    }
}
