//! Directions and the pending-turn queue fed by keyboard input.

use std::collections::VecDeque;

/// Max pending turns. Two is enough for quick U-turns without feeling laggy.
pub const QUEUE_CAPACITY: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    #[cfg(test)]
    pub const ALL: [Self; 4] = [Self::Up, Self::Down, Self::Left, Self::Right];

    /// Unit step (dx, dy); y grows downward.
    pub fn delta(self) -> (i32, i32) {
        match self {
            Self::Up => (0, -1),
            Self::Down => (0, 1),
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    #[inline]
    pub fn is_opposite(self, other: Self) -> bool {
        self.opposite() == other
    }
}

/// Turns queued between ticks.
///
/// Input may arrive at any point between ticks; it only ever touches this queue,
/// never the snake itself. The tick consumes at most one valid entry.
#[derive(Debug, Clone, Default)]
pub struct DirectionQueue {
    pending: VecDeque<Direction>,
}

impl DirectionQueue {
    pub fn new() -> Self {
        Self {
            pending: VecDeque::with_capacity(QUEUE_CAPACITY),
        }
    }

    /// Queue a turn. Returns false when the queue is full or `dir` repeats the tail.
    pub fn push(&mut self, dir: Direction) -> bool {
        if self.pending.len() >= QUEUE_CAPACITY {
            return false;
        }
        if self.pending.back() == Some(&dir) {
            return false;
        }
        self.pending.push_back(dir);
        true
    }

    /// Pop entries until one does not reverse `committed`; that one wins.
    /// Reverses are dropped. An exhausted queue keeps `committed`.
    pub fn resolve(&mut self, committed: Direction) -> Direction {
        while let Some(next) = self.pending.pop_front() {
            if !next.is_opposite(committed) {
                return next;
            }
        }
        committed
    }

    /// Drop every pending turn.
    pub fn clear(&mut self) {
        if !self.is_empty() {
            log::trace!("dropping {} queued turns", self.len());
        }
        self.pending.clear();
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    #[cfg(test)]
    pub fn iter(&self) -> impl Iterator<Item = &Direction> {
        self.pending.iter()
    }
}
