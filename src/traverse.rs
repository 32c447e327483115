use rand::Rng;
use rustc_hash::{FxHashMap, FxHashSet};
use thiserror::Error;

use crate::player::Player;
use crate::world::{Dir, RoomId, World};

/// Outcome of a single traversal pass.
struct Pass {
    steps: usize,
    path: Vec<Dir>,
    /// Final per-room exit bookkeeping, kept for white-box assertions.
    #[cfg(test)]
    visited: FxHashMap<RoomId, Vec<Dir>>,
}

/// One randomized DFS pass over `world` from its starting room.
///
/// The loop runs until every room has entered the visited map. Each
/// iteration: discover the current room if new (recording its exits minus
/// the direction we arrived from), then either retrace one step if no
/// untried exit remains, or advance through a uniformly random untried
/// exit. Exit bookkeeping is pass-local; the world itself is never
/// mutated, so concurrent passes can share it freely.
fn run<R: Rng + ?Sized>(world: &World, rng: &mut R, keep_path: bool) -> Pass {
    let mut player = Player::new(world);
    let mut visited: FxHashMap<RoomId, Vec<Dir>> = FxHashMap::default();
    let mut path: Vec<Dir> = Vec::new();
    let mut reverse: Vec<Dir> = Vec::new();
    let mut last_move: Option<Dir> = None;

    // The starting room keeps its full exit set; there is no arrival
    // direction to prune.
    visited.insert(
        player.current_room(),
        world.room(player.current_room()).exit_dirs(),
    );

    while visited.len() < world.num_rooms() {
        let here = player.current_room();
        if !visited.contains_key(&here) {
            let mut exits = world.room(here).exit_dirs();
            let back = last_move
                .expect("entered an undiscovered room without moving")
                .opposite();
            // Never walk straight back through the door we came in by.
            exits.retain(|&d| d != back);
            visited.insert(here, exits);
        }
        let exits = visited.get_mut(&here).expect("room discovered above");
        if exits.is_empty() {
            // Dead end: retrace one step toward unexplored territory.
            let back = reverse
                .pop()
                .expect("backtrack stack exhausted; maze is not connected to the start room");
            let ok = player.travel(back);
            debug_assert!(ok, "reverse stack pointed through a missing exit");
            if keep_path {
                path.push(back);
            }
            last_move = Some(back);
        } else {
            // swap_remove keeps the random pick-and-remove O(1); order of
            // the remaining exits is irrelevant.
            let d = exits.swap_remove(rng.random_range(0..exits.len()));
            let ok = player.travel(d);
            debug_assert!(ok, "recorded exit {} missing from room {}", d, here);
            if keep_path {
                path.push(d);
            }
            reverse.push(d.opposite());
            last_move = Some(d);
        }
    }

    Pass {
        steps: player.steps(),
        path,
        #[cfg(test)]
        visited,
    }
}

/// Runs one traversal pass and returns the full move sequence.
pub fn traverse_path<R: Rng + ?Sized>(world: &World, rng: &mut R) -> Vec<Dir> {
    run(world, rng, true).path
}

/// Runs one traversal pass and returns only the move count. Used by the
/// trial loops, which have no reason to retain thousands of paths.
pub fn traverse_len<R: Rng + ?Sized>(world: &World, rng: &mut R) -> usize {
    run(world, rng, false).steps
}

/// Renders a move sequence as its single-letter tokens, e.g. `"nnews"`.
pub fn path_tokens(path: &[Dir]) -> String {
    path.iter().map(|d| d.token()).collect()
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum VerifyError {
    #[error("invalid move at step {step}: no {dir} exit from room {room}")]
    InvalidMove { step: usize, room: RoomId, dir: Dir },
    #[error("incomplete traversal: {missing} of {total} rooms unvisited")]
    Incomplete { missing: usize, total: usize },
}

/// Replays `path` from the starting room and checks that it covers every
/// room. Returns the number of rooms visited on success.
pub fn verify_path(world: &World, path: &[Dir]) -> Result<usize, VerifyError> {
    let mut player = Player::new(world);
    let mut seen: FxHashSet<RoomId> = FxHashSet::default();
    seen.insert(player.current_room());
    for (step, &d) in path.iter().enumerate() {
        let room = player.current_room();
        if !player.travel(d) {
            return Err(VerifyError::InvalidMove { step, room, dir: d });
        }
        seen.insert(player.current_room());
    }
    let total = world.num_rooms();
    if seen.len() < total {
        Err(VerifyError::Incomplete {
            missing: total - seen.len(),
            total,
        })
    } else {
        Ok(seen.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapgen;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    const SINGLE_ROOM: &str = r#"{ "0": { "exits": {} } }"#;

    const LOOP_4: &str = r#"{
        "0": { "coordinates": [0, 1], "exits": { "e": 1, "s": 3 } },
        "1": { "coordinates": [1, 1], "exits": { "w": 0, "s": 2 } },
        "2": { "coordinates": [1, 0], "exits": { "n": 1, "w": 3 } },
        "3": { "coordinates": [0, 0], "exits": { "n": 0, "e": 2 } }
    }"#;

    const LINE_5: &str = r#"{
        "0": { "exits": { "e": 1 } },
        "1": { "exits": { "w": 0, "e": 2 } },
        "2": { "exits": { "w": 1, "e": 3 } },
        "3": { "exits": { "w": 2, "e": 4 } },
        "4": { "exits": { "w": 3 } }
    }"#;

    #[test]
    fn test_single_room_is_trivially_covered() {
        let world = World::from_json_str(SINGLE_ROOM).unwrap();
        let mut rng = SmallRng::seed_from_u64(1);
        let pass = run(&world, &mut rng, true);
        assert_eq!(pass.steps, 0);
        assert!(pass.path.is_empty());
        assert_eq!(pass.visited.len(), 1);
        assert_eq!(verify_path(&world, &pass.path), Ok(1));
    }

    #[test]
    fn test_four_room_cycle_within_bound() {
        let world = World::from_json_str(LOOP_4).unwrap();
        // Worst case: every edge walked at most twice (forward + backtrack).
        for seed in 0..50 {
            let mut rng = SmallRng::seed_from_u64(seed);
            let path = traverse_path(&world, &mut rng);
            assert!(path.len() <= 8, "seed {}: {} moves", seed, path.len());
            assert_eq!(verify_path(&world, &path), Ok(4));
        }
    }

    #[test]
    fn test_five_room_line_within_bound() {
        let world = World::from_json_str(LINE_5).unwrap();
        for seed in 0..50 {
            let mut rng = SmallRng::seed_from_u64(seed);
            let path = traverse_path(&world, &mut rng);
            assert!(path.len() <= 8, "seed {}: {} moves", seed, path.len());
            assert_eq!(verify_path(&world, &path), Ok(5));
        }
    }

    #[test]
    fn test_random_mazes_fully_covered() {
        for seed in 0..20 {
            let world = mapgen::random::generate(8, 6, 5, Some(seed)).unwrap();
            let mut rng = SmallRng::seed_from_u64(seed ^ 0xABCD);
            let pass = run(&world, &mut rng, true);
            // Every room enters the visited map exactly once.
            assert_eq!(pass.visited.len(), world.num_rooms());
            assert_eq!(pass.steps, pass.path.len());
            assert_eq!(verify_path(&world, &pass.path), Ok(world.num_rooms()));
        }
    }

    #[test]
    fn test_acyclic_maze_drains_every_exit_list() {
        // With no cycles every edge must be walked, so both endpoints'
        // exit entries get consumed and all lists end empty.
        for seed in 0..20 {
            let world = mapgen::random::generate(6, 6, 0, Some(seed)).unwrap();
            let mut rng = SmallRng::seed_from_u64(seed);
            let pass = run(&world, &mut rng, false);
            for (room, remaining) in &pass.visited {
                assert!(
                    remaining.is_empty(),
                    "seed {}: room {} kept {:?}",
                    seed,
                    room,
                    remaining
                );
            }
        }
    }

    #[test]
    fn test_remaining_exits_are_subset_of_topology() {
        for seed in 0..10 {
            let world = mapgen::random::generate(7, 5, 8, Some(seed)).unwrap();
            let mut rng = SmallRng::seed_from_u64(seed);
            let pass = run(&world, &mut rng, false);
            for (&room, remaining) in &pass.visited {
                for &d in remaining {
                    assert!(world.neighbor(room, d).is_some());
                }
            }
        }
    }

    #[test]
    fn test_path_tokens() {
        assert_eq!(
            path_tokens(&[Dir::North, Dir::North, Dir::East, Dir::West, Dir::South]),
            "nnews"
        );
    }

    #[test]
    fn test_verify_rejects_truncated_path() {
        let world = World::from_json_str(LINE_5).unwrap();
        let mut rng = SmallRng::seed_from_u64(3);
        let mut path = traverse_path(&world, &mut rng);
        path.truncate(1);
        assert_eq!(
            verify_path(&world, &path),
            Err(VerifyError::Incomplete {
                missing: 3,
                total: 5
            })
        );
    }

    #[test]
    fn test_verify_rejects_impossible_move() {
        let world = World::from_json_str(LINE_5).unwrap();
        assert_eq!(
            verify_path(&world, &[Dir::North]),
            Err(VerifyError::InvalidMove {
                step: 0,
                room: 0,
                dir: Dir::North
            })
        );
    }
}
