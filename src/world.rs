use std::fmt;
use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result, bail, ensure};
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::{SetMinMax, map, mat};

/// Room identity. Ids are dense: a world of `n` rooms uses ids `0..n`.
pub type RoomId = usize;

/// One of the four cardinal exit directions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Dir {
    #[serde(rename = "n")]
    North,
    #[serde(rename = "s")]
    South,
    #[serde(rename = "e")]
    East,
    #[serde(rename = "w")]
    West,
}

impl Dir {
    pub const ALL: [Dir; 4] = [Dir::North, Dir::South, Dir::East, Dir::West];

    /// The fixed bijection n<->s, e<->w. Moving `d` then `d.opposite()`
    /// returns to the departed room on any reciprocal map.
    pub fn opposite(self) -> Dir {
        match self {
            Dir::North => Dir::South,
            Dir::South => Dir::North,
            Dir::East => Dir::West,
            Dir::West => Dir::East,
        }
    }

    /// Single-letter token used in map files and move listings.
    pub fn token(self) -> char {
        match self {
            Dir::North => 'n',
            Dir::South => 's',
            Dir::East => 'e',
            Dir::West => 'w',
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            Dir::North => 0,
            Dir::South => 1,
            Dir::East => 2,
            Dir::West => 3,
        }
    }
}

impl fmt::Display for Dir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.token())
    }
}

impl FromStr for Dir {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "n" => Ok(Dir::North),
            "s" => Ok(Dir::South),
            "e" => Ok(Dir::East),
            "w" => Ok(Dir::West),
            other => bail!("unknown direction: {:?} (expected n/s/e/w)", other),
        }
    }
}

/// A graph node: identity, optional display coordinates, and up to four
/// directional exits. Topology is fixed after loading; traversal state
/// (which exits remain untried) lives with each pass, not here.
#[derive(Clone, Debug)]
pub struct Room {
    pub id: RoomId,
    pub coordinates: Option<(i64, i64)>,
    exits: [Option<RoomId>; 4],
}

impl Room {
    /// The adjacent room behind exit `d`, if the exit exists.
    pub fn exit(&self, d: Dir) -> Option<RoomId> {
        self.exits[d.index()]
    }

    /// All directions with an exit, in fixed n/s/e/w order.
    pub fn exit_dirs(&self) -> Vec<Dir> {
        Dir::ALL
            .into_iter()
            .filter(|&d| self.exit(d).is_some())
            .collect()
    }
}

/// The loaded maze: dense rooms, immutable adjacency, start at room 0.
#[derive(Debug)]
pub struct World {
    rooms: Vec<Room>,
}

impl World {
    /// Builds and validates a world from parsed map records.
    ///
    /// Requires at least one room, dense ids `0..n`, in-range exit targets,
    /// and reciprocity: if room `a` has `n -> b` then room `b` has `s -> a`.
    pub fn from_records(records: &map::MapFile) -> Result<World> {
        let n = records.len();
        ensure!(n > 0, "map has no rooms");
        let mut rooms: Vec<Option<Room>> = vec![None; n];
        for (key, rec) in records {
            let id: RoomId = key
                .parse()
                .with_context(|| format!("invalid room id: {:?}", key))?;
            ensure!(id < n, "room ids must be dense 0..{}, got {}", n, id);
            ensure!(rooms[id].is_none(), "duplicate room id {}", id);
            let mut exits = [None; 4];
            for (&d, &to) in &rec.exits {
                ensure!(
                    to < n,
                    "room {} exit {} points at unknown room {}",
                    id,
                    d,
                    to
                );
                exits[d.index()] = Some(to);
            }
            rooms[id] = Some(Room {
                id,
                coordinates: rec.coordinates,
                exits,
            });
        }
        let rooms: Vec<Room> = rooms
            .into_iter()
            .enumerate()
            .map(|(id, r)| r.with_context(|| format!("missing room id {}", id)))
            .collect::<Result<_>>()?;
        let world = World { rooms };
        for room in &world.rooms {
            for d in Dir::ALL {
                if let Some(to) = room.exit(d) {
                    ensure!(
                        world.rooms[to].exit(d.opposite()) == Some(room.id),
                        "one-way passage: room {} has {} -> {} but room {} has no {} return",
                        room.id,
                        d,
                        to,
                        to,
                        d.opposite()
                    );
                }
            }
        }
        Ok(world)
    }

    /// Parses a world from JSON text.
    pub fn from_json_str(s: &str) -> Result<World> {
        Self::from_records(&map::from_json_str(s)?)
    }

    /// Loads a world from a map file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<World> {
        Self::from_records(&map::load(path)?)
    }

    /// Serializes the world back into map records.
    pub fn to_records(&self) -> map::MapFile {
        self.rooms
            .iter()
            .map(|room| {
                let exits = Dir::ALL
                    .into_iter()
                    .filter_map(|d| room.exit(d).map(|to| (d, to)))
                    .collect();
                (
                    room.id.to_string(),
                    map::RoomRecord {
                        coordinates: room.coordinates,
                        exits,
                    },
                )
            })
            .collect()
    }

    pub fn num_rooms(&self) -> usize {
        self.rooms.len()
    }

    pub fn starting_room(&self) -> RoomId {
        0
    }

    pub fn room(&self, id: RoomId) -> &Room {
        &self.rooms[id]
    }

    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    /// The room behind exit `d` of room `id`, if any.
    pub fn neighbor(&self, id: RoomId, d: Dir) -> Option<RoomId> {
        self.rooms[id].exit(d)
    }

    /// Draws the maze as ASCII art, rooms placed by their coordinates with
    /// `-`/`|` connectors, north up. Falls back to an adjacency listing
    /// when any room lacks coordinates.
    pub fn render_ascii(&self) -> String {
        if self.rooms.iter().any(|r| r.coordinates.is_none()) {
            return self
                .rooms
                .iter()
                .map(|r| {
                    let exits = Dir::ALL
                        .into_iter()
                        .filter_map(|d| r.exit(d).map(|to| format!("{}->{}", d, to)))
                        .join(" ");
                    format!("{}: {}", r.id, exits)
                })
                .join("\n");
        }
        let (mut min_x, mut max_x) = (i64::MAX, i64::MIN);
        let (mut min_y, mut max_y) = (i64::MAX, i64::MIN);
        for r in &self.rooms {
            let (x, y) = r.coordinates.unwrap();
            min_x.setmin(x);
            max_x.setmax(x);
            min_y.setmin(y);
            max_y.setmax(y);
        }
        // Each room occupies a 6x2 cell; the last row of cells needs no
        // connector row below it.
        const CW: usize = 6;
        const CH: usize = 2;
        let w = (max_x - min_x + 1) as usize;
        let h = (max_y - min_y + 1) as usize;
        let mut grid = mat![' '; h * CH - 1; w * CW];
        for r in &self.rooms {
            let (x, y) = r.coordinates.unwrap();
            let col = (x - min_x) as usize * CW;
            let row = (max_y - y) as usize * CH;
            for (i, c) in r.id.to_string().chars().take(4).enumerate() {
                grid[row][col + i] = c;
            }
            if r.exit(Dir::East).is_some() {
                grid[row][col + 4] = '-';
                grid[row][col + 5] = '-';
            }
            // Coordinates are hints, not checked against the topology; a
            // south exit on the bottom row has no connector row to draw in.
            if r.exit(Dir::South).is_some() && row + 1 < grid.len() {
                grid[row + 1][col] = '|';
            }
        }
        grid.iter()
            .map(|line| line.iter().collect::<String>().trim_end().to_string())
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LINE_3: &str = r#"{
        "0": { "coordinates": [0, 0], "exits": { "e": 1 } },
        "1": { "coordinates": [1, 0], "exits": { "w": 0, "e": 2 } },
        "2": { "coordinates": [2, 0], "exits": { "w": 1 } }
    }"#;

    #[test]
    fn test_load_line() {
        let world = World::from_json_str(LINE_3).unwrap();
        assert_eq!(world.num_rooms(), 3);
        assert_eq!(world.starting_room(), 0);
        assert_eq!(world.neighbor(0, Dir::East), Some(1));
        assert_eq!(world.neighbor(0, Dir::West), None);
        assert_eq!(world.room(1).exit_dirs(), vec![Dir::East, Dir::West]);
    }

    #[test]
    fn test_world_is_debug_formattable() {
        // Keeps `unwrap_err`/`assert` diagnostics over `Result<World, _>`
        // usable in tests.
        let world = World::from_json_str(LINE_3).unwrap();
        let dump = format!("{:?}", world);
        assert!(dump.contains("rooms"));
    }

    #[test]
    fn test_rejects_one_way_passage() {
        let text = r#"{
            "0": { "exits": { "e": 1 } },
            "1": { "exits": {} }
        }"#;
        let err = World::from_json_str(text).unwrap_err();
        assert!(err.to_string().contains("one-way"), "{}", err);
    }

    #[test]
    fn test_rejects_sparse_ids() {
        let text = r#"{
            "0": { "exits": { "e": 2 } },
            "2": { "exits": { "w": 0 } }
        }"#;
        assert!(World::from_json_str(text).is_err());
    }

    #[test]
    fn test_rejects_out_of_range_exit() {
        let text = r#"{ "0": { "exits": { "n": 7 } } }"#;
        assert!(World::from_json_str(text).is_err());
    }

    #[test]
    fn test_rejects_empty_map() {
        assert!(World::from_json_str("{}").is_err());
    }

    #[test]
    fn test_round_trip_records() {
        let world = World::from_json_str(LINE_3).unwrap();
        let records = world.to_records();
        let again = World::from_records(&records).unwrap();
        assert_eq!(again.num_rooms(), 3);
        assert_eq!(again.to_records(), records);
    }

    #[test]
    fn test_load_checked_in_maps() {
        for (name, rooms) in [
            ("test_line", 5),
            ("test_cross", 5),
            ("test_loop", 4),
            ("test_loop_fork", 6),
        ] {
            let path = format!("{}/maps/{}.json", env!("CARGO_MANIFEST_DIR"), name);
            let world = World::load(&path).unwrap();
            assert_eq!(world.num_rooms(), rooms, "{}", name);
        }
    }

    #[test]
    fn test_opposite_is_involution() {
        for d in Dir::ALL {
            assert_eq!(d.opposite().opposite(), d);
            assert_ne!(d.opposite(), d);
        }
    }

    #[test]
    fn test_render_ascii_line() {
        let world = World::from_json_str(LINE_3).unwrap();
        assert_eq!(world.render_ascii(), "0   --1   --2");
    }
}
