use crate::world::{Dir, RoomId, World};

/// Tracks a position moving through a world, one exit at a time.
pub struct Player<'w> {
    world: &'w World,
    current: RoomId,
    steps: usize,
}

impl<'w> Player<'w> {
    /// A player standing in the world's starting room.
    pub fn new(world: &'w World) -> Self {
        Self {
            world,
            current: world.starting_room(),
            steps: 0,
        }
    }

    pub fn current_room(&self) -> RoomId {
        self.current
    }

    /// Moves taken so far, backtracking included.
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Moves across the exit in direction `d`. Returns `false` (and stays
    /// put) when the current room has no such exit.
    pub fn travel(&mut self, d: Dir) -> bool {
        match self.world.neighbor(self.current, d) {
            Some(to) => {
                self.current = to;
                self.steps += 1;
                true
            }
            None => false,
        }
    }
}
