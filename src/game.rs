//! Game state: snake, food, ladders, floors, and the per-tick update.

use crate::direction::{Direction, DirectionQueue};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Default side of the square grid.
pub const DEFAULT_GRID_SIZE: u16 = 20;

/// Smallest grid we accept; anything smaller leaves no room to turn.
pub const MIN_GRID_SIZE: u16 = 6;

/// How long the snake may press against a wall before the session ends.
pub const GRACE_PERIOD: Duration = Duration::from_millis(500);

/// Random attempts before falling back to a linear scan for a free cell.
const MAX_PLACEMENT_ATTEMPTS: u32 = 512;

/// Floor number; 1 is the ground floor.
pub type Floor = u32;

/// Grid coordinate. Signed so a step past the left/top edge is representable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn stepped(self, dir: Direction) -> Self {
        let (dx, dy) = dir.delta();
        Self::new(self.x + dx, self.y + dy)
    }
}

/// A cell shared by two floors. Immutable once placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ladder {
    pub pos: Position,
    floors: (Floor, Floor),
}

impl Ladder {
    pub fn new(pos: Position, a: Floor, b: Floor) -> Self {
        Self {
            pos,
            floors: (a.min(b), a.max(b)),
        }
    }

    /// Lower and upper floor.
    #[cfg(test)]
    pub fn floors(&self) -> (Floor, Floor) {
        self.floors
    }

    /// Visible and usable from `floor`.
    #[inline]
    pub fn serves(&self, floor: Floor) -> bool {
        self.floors.0 == floor || self.floors.1 == floor
    }

    pub fn connects(&self, a: Floor, b: Floor) -> bool {
        self.floors == (a.min(b), a.max(b))
    }

    pub fn other_end(&self, floor: Floor) -> Option<Floor> {
        if self.floors.0 == floor {
            Some(self.floors.1)
        } else if self.floors.1 == floor {
            Some(self.floors.0)
        } else {
            None
        }
    }
}

/// Head-first body on the current floor, plus segments left behind by a climb.
///
/// Stowed segments are off-grid; each non-growing step re-emerges one of them
/// instead of dropping the tail, so a climb never costs length.
#[derive(Debug, Clone)]
pub struct Snake {
    body: VecDeque<Position>,
    stowed: usize,
}

impl Snake {
    pub fn new(head: Position) -> Self {
        let mut body = VecDeque::with_capacity(16);
        body.push_back(head);
        Self { body, stowed: 0 }
    }

    #[cfg(test)]
    pub fn from_segments(segments: &[Position]) -> Self {
        assert!(!segments.is_empty());
        Self {
            body: segments.iter().copied().collect(),
            stowed: 0,
        }
    }

    pub fn head(&self) -> Position {
        // Body is never empty: `new` seeds it and `advance` pushes before it pops.
        self.body[0]
    }

    /// On-grid segments, head first.
    pub fn segments(&self) -> impl Iterator<Item = &Position> {
        self.body.iter()
    }

    /// Number of on-grid segments.
    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.body.len()
    }

    /// On-grid plus stowed segments.
    pub fn total_len(&self) -> usize {
        self.body.len() + self.stowed
    }

    #[cfg(test)]
    pub fn stowed(&self) -> usize {
        self.stowed
    }

    pub fn contains(&self, pos: Position) -> bool {
        self.body.contains(&pos)
    }

    fn advance(&mut self, new_head: Position, grow: bool) {
        self.body.push_front(new_head);
        if grow {
            return;
        }
        if self.stowed > 0 {
            self.stowed -= 1;
        } else {
            self.body.pop_back();
        }
    }

    fn collapse_to(&mut self, pos: Position) {
        let total = self.total_len();
        self.body.clear();
        self.body.push_back(pos);
        self.stowed = total - 1;
    }
}

/// One-shot cancelable deadline that ends the session after a wall hit.
#[derive(Debug, Clone, Copy, Default)]
pub struct GraceTimer {
    pending: Option<(Instant, u32)>,
}

impl GraceTimer {
    /// Arm the timer; `score` is what the session ends with if it fires.
    pub fn schedule(&mut self, at: Instant, score: u32) {
        self.pending = Some((at, score));
    }

    /// No-op when not armed or already fired.
    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn is_armed(&self) -> bool {
        self.pending.is_some()
    }

    /// Fires at most once: returns the frozen score when `now` reached the deadline.
    pub fn poll(&mut self, now: Instant) -> Option<u32> {
        match self.pending {
            Some((at, score)) if now >= at => {
                self.pending = None;
                Some(score)
            }
            _ => None,
        }
    }
}

/// What a single tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Moved,
    Ate { ladder_spawned: bool },
    Climbed { from: Floor, to: Floor },
    /// Head hit the edge; snake holds still and the grace timer is armed.
    GraceStarted,
    /// Still pushing against the edge while the grace timer runs.
    Holding,
    GameOver { score: u32 },
}

/// Cell classification for rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellKind {
    Empty,
    SnakeBody,
    SnakeHead,
    Food,
    Ladder,
}

/// What the "Next Ladder" indicator should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextLadder {
    /// A ladder up from this floor already exists.
    Spawned,
    /// Score at which the next ladder appears.
    Target(u32),
    /// Ladders are disabled.
    Unbounded,
}

/// Full-grid snapshot of the current floor.
#[derive(Debug, Clone)]
pub struct Board {
    pub size: u16,
    cells: Vec<CellKind>,
    pub floor: Floor,
    pub score: u32,
    pub in_grace: bool,
    pub next_ladder: NextLadder,
}

impl Board {
    #[cfg(test)]
    pub fn get(&self, x: u16, y: u16) -> CellKind {
        if x >= self.size || y >= self.size {
            return CellKind::Empty;
        }
        self.cells[y as usize * self.size as usize + x as usize]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[CellKind]> {
        self.cells.chunks(self.size as usize)
    }
}

/// One session: snake, food, ladders, floor, score and the grace timer.
#[derive(Debug)]
pub struct GameState {
    pub grid_size: u16,
    pub snake: Snake,
    pub direction: Direction,
    queue: DirectionQueue,
    /// `None` only if the board is completely full.
    pub food: Option<Position>,
    /// Every ladder placed this session, on any floor.
    pub ladders: Vec<Ladder>,
    pub floor: Floor,
    pub score: u32,
    /// 0 disables ladders.
    pub ladder_threshold: u32,
    grace: GraceTimer,
    /// Final score once the session has ended.
    pub game_over: Option<u32>,
    rng: Pcg32,
}

impl GameState {
    pub fn new(grid_size: u16, ladder_threshold: u32, seed: u64) -> Self {
        let grid_size = grid_size.max(MIN_GRID_SIZE);
        let center = i32::from(grid_size / 2);
        let mut state = Self {
            grid_size,
            snake: Snake::new(Position::new(center, center)),
            direction: Direction::Right,
            queue: DirectionQueue::new(),
            food: None,
            ladders: Vec::new(),
            floor: 1,
            score: 0,
            ladder_threshold,
            grace: GraceTimer::default(),
            game_over: None,
            rng: Pcg32::seed_from_u64(seed),
        };
        state.food = state.random_free_cell();
        state
    }

    /// Queue a turn from input. Safe to call at any time between ticks.
    pub fn queue_direction(&mut self, dir: Direction) -> bool {
        self.queue.push(dir)
    }

    pub fn in_grace(&self) -> bool {
        self.grace.is_armed()
    }

    pub fn is_over(&self) -> bool {
        self.game_over.is_some()
    }

    /// Advance one step.
    pub fn tick(&mut self, now: Instant) -> TickOutcome {
        if let Some(score) = self.game_over {
            return TickOutcome::GameOver { score };
        }

        self.direction = self.queue.resolve(self.direction);
        let new_head = self.snake.head().stepped(self.direction);

        if !self.in_bounds(new_head) {
            if self.grace.is_armed() {
                return TickOutcome::Holding;
            }
            self.grace.schedule(now + GRACE_PERIOD, self.score);
            log::debug!(
                "grace period started at ({}, {}) heading {:?}",
                new_head.x,
                new_head.y,
                self.direction
            );
            return TickOutcome::GraceStarted;
        }
        if self.grace.is_armed() {
            self.grace.cancel();
            log::debug!("grace period cleared");
        }

        if self.snake.contains(new_head) {
            log::debug!("self collision at ({}, {})", new_head.x, new_head.y);
            self.queue.clear();
            self.game_over = Some(self.score);
            return TickOutcome::GameOver { score: self.score };
        }

        let climb = self
            .ladders
            .iter()
            .find(|l| l.pos == new_head && l.serves(self.floor))
            .and_then(|l| l.other_end(self.floor));
        if let Some(to) = climb {
            let from = self.floor;
            self.floor = to;
            self.snake.collapse_to(new_head);
            self.food = self.random_free_cell();
            log::info!("climbed from floor {} to floor {}", from, to);
            return TickOutcome::Climbed { from, to };
        }

        let ate = self.food == Some(new_head);
        self.snake.advance(new_head, ate);
        if !ate {
            return TickOutcome::Moved;
        }

        self.score += 1;
        let ladder_spawned = self.maybe_spawn_ladder();
        self.food = self.random_free_cell();
        TickOutcome::Ate { ladder_spawned }
    }

    /// Fire the grace deadline if it has passed. Returns the final score once.
    pub fn poll_grace(&mut self, now: Instant) -> Option<u32> {
        let score = self.grace.poll(now)?;
        log::debug!("grace period expired, final score {}", score);
        self.queue.clear();
        self.game_over = Some(score);
        Some(score)
    }

    pub fn has_ladder_between(&self, a: Floor, b: Floor) -> bool {
        self.ladders.iter().any(|l| l.connects(a, b))
    }

    pub fn next_ladder(&self) -> NextLadder {
        if self.has_ladder_between(self.floor, self.floor + 1) {
            NextLadder::Spawned
        } else if self.ladder_threshold == 0 {
            NextLadder::Unbounded
        } else {
            let t = self.ladder_threshold;
            NextLadder::Target((self.score / t + 1) * t)
        }
    }

    /// Grid of the current floor for rendering. Ladders draw over the snake.
    pub fn snapshot(&self) -> Board {
        let size = self.grid_size;
        let mut cells = vec![CellKind::Empty; size as usize * size as usize];
        let mut put = |pos: Position, kind: CellKind| {
            if self.in_bounds(pos) {
                cells[pos.y as usize * size as usize + pos.x as usize] = kind;
            }
        };
        for (i, seg) in self.snake.segments().enumerate() {
            put(
                *seg,
                if i == 0 {
                    CellKind::SnakeHead
                } else {
                    CellKind::SnakeBody
                },
            );
        }
        if let Some(food) = self.food {
            put(food, CellKind::Food);
        }
        for ladder in self.ladders.iter().filter(|l| l.serves(self.floor)) {
            put(ladder.pos, CellKind::Ladder);
        }
        Board {
            size,
            cells,
            floor: self.floor,
            score: self.score,
            in_grace: self.in_grace(),
            next_ladder: self.next_ladder(),
        }
    }

    #[inline]
    fn in_bounds(&self, pos: Position) -> bool {
        let n = i32::from(self.grid_size);
        (0..n).contains(&pos.x) && (0..n).contains(&pos.y)
    }

    fn maybe_spawn_ladder(&mut self) -> bool {
        let t = self.ladder_threshold;
        if t == 0 || self.score == 0 || self.score % t != 0 {
            return false;
        }
        let next = self.floor + 1;
        if self.has_ladder_between(self.floor, next) {
            return false;
        }
        match self.random_free_cell() {
            Some(pos) => {
                self.ladders.push(Ladder::new(pos, self.floor, next));
                log::info!(
                    "ladder to floor {} spawned at ({}, {}) at score {}",
                    next,
                    pos.x,
                    pos.y,
                    self.score
                );
                true
            }
            None => {
                log::warn!("no free cell for a ladder to floor {}", next);
                false
            }
        }
    }

    fn is_occupied(&self, pos: Position) -> bool {
        self.snake.contains(pos) || self.ladders.iter().any(|l| l.pos == pos)
    }

    /// Rejection sampling, then a scan so a crowded board still terminates.
    fn random_free_cell(&mut self) -> Option<Position> {
        let n = i32::from(self.grid_size);
        for _ in 0..MAX_PLACEMENT_ATTEMPTS {
            let pos = Position::new(self.rng.random_range(0..n), self.rng.random_range(0..n));
            if !self.is_occupied(pos) {
                return Some(pos);
            }
        }
        (0..n)
            .flat_map(|y| (0..n).map(move |x| Position::new(x, y)))
            .find(|&pos| !self.is_occupied(pos))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    fn state_with(snake: &[Position], dir: Direction, food: Position) -> GameState {
        let mut s = GameState::new(20, 50, 7);
        s.snake = Snake::from_segments(snake);
        s.direction = dir;
        s.food = Some(food);
        s
    }

    fn p(x: i32, y: i32) -> Position {
        Position::new(x, y)
    }

    #[test]
    fn test_new_session_is_centered_and_food_is_free() {
        let s = GameState::new(20, 50, 1);
        assert_eq!(s.snake.head(), p(10, 10));
        assert_eq!(s.snake.len(), 1);
        assert_eq!(s.floor, 1);
        assert_eq!(s.score, 0);
        let food = s.food.unwrap();
        assert_ne!(food, s.snake.head());
    }

    #[test]
    fn test_five_ticks_right_eats_food() {
        let mut s = state_with(&[p(10, 10)], Direction::Right, p(15, 10));
        let t0 = Instant::now();
        for i in 1..=4 {
            assert_eq!(s.tick(t0 + Duration::from_millis(150 * i)), TickOutcome::Moved);
        }
        let out = s.tick(t0 + Duration::from_millis(750));
        assert_eq!(out, TickOutcome::Ate { ladder_spawned: false });
        assert_eq!(s.snake.head(), p(15, 10));
        assert_eq!(s.score, 1);
        assert_eq!(s.snake.len(), 2);
        assert_ne!(s.food, Some(p(15, 10)));
    }

    #[test]
    fn test_ladder_spawns_at_threshold() {
        let mut s = state_with(&[p(4, 4), p(3, 4)], Direction::Right, p(5, 4));
        s.score = 49;
        let out = s.tick(Instant::now());
        assert_eq!(out, TickOutcome::Ate { ladder_spawned: true });
        assert_eq!(s.score, 50);
        assert_eq!(s.ladders.len(), 1);
        let ladder = s.ladders[0];
        assert!(ladder.connects(1, 2));
        assert!(!s.snake.contains(ladder.pos));
        assert_ne!(s.food, Some(ladder.pos));
        assert_eq!(s.next_ladder(), NextLadder::Spawned);
    }

    #[test]
    fn test_ladder_not_duplicated_for_same_floor_pair() {
        let mut s = state_with(&[p(4, 4)], Direction::Right, p(5, 4));
        s.ladders.push(Ladder::new(p(0, 0), 2, 1));
        s.score = 99;
        let out = s.tick(Instant::now());
        assert_eq!(out, TickOutcome::Ate { ladder_spawned: false });
        assert_eq!(s.ladders.len(), 1);
    }

    #[test]
    fn test_zero_threshold_disables_ladders() {
        let mut s = state_with(&[p(4, 4)], Direction::Right, p(5, 4));
        s.ladder_threshold = 0;
        s.score = 49;
        assert_eq!(s.tick(Instant::now()), TickOutcome::Ate { ladder_spawned: false });
        assert!(s.ladders.is_empty());
        assert_eq!(s.next_ladder(), NextLadder::Unbounded);
    }

    #[test]
    fn test_next_ladder_target() {
        let mut s = GameState::new(20, 50, 3);
        s.score = 12;
        assert_eq!(s.next_ladder(), NextLadder::Target(50));
        s.score = 50;
        assert_eq!(s.next_ladder(), NextLadder::Target(100));
    }

    #[test]
    fn test_grace_cancelled_when_turning_back_on_grid() {
        let mut s = state_with(&[p(0, 5)], Direction::Left, p(10, 10));
        let t0 = Instant::now();
        assert_eq!(s.tick(t0), TickOutcome::GraceStarted);
        assert_eq!(s.snake.head(), p(0, 5));
        assert!(s.in_grace());

        assert!(s.queue_direction(Direction::Up));
        assert_eq!(s.tick(t0 + Duration::from_millis(150)), TickOutcome::Moved);
        assert_eq!(s.snake.head(), p(0, 4));
        assert!(!s.in_grace());
        assert_eq!(s.poll_grace(t0 + Duration::from_millis(600)), None);
        assert!(!s.is_over());
    }

    #[test]
    fn test_grace_expires_with_score_at_exit() {
        let mut s = state_with(&[p(0, 5)], Direction::Left, p(10, 10));
        s.score = 7;
        let t0 = Instant::now();
        assert_eq!(s.tick(t0), TickOutcome::GraceStarted);
        assert_eq!(s.tick(t0 + Duration::from_millis(150)), TickOutcome::Holding);
        assert_eq!(s.poll_grace(t0 + Duration::from_millis(499)), None);
        assert_eq!(s.poll_grace(t0 + GRACE_PERIOD), Some(7));
        assert_eq!(s.poll_grace(t0 + Duration::from_secs(2)), None);
        assert_eq!(s.tick(t0 + Duration::from_secs(2)), TickOutcome::GameOver { score: 7 });
    }

    #[test]
    fn test_grace_timer_cancel_is_idempotent() {
        let mut g = GraceTimer::default();
        let t0 = Instant::now();
        g.cancel();
        g.schedule(t0, 3);
        g.cancel();
        g.cancel();
        assert_eq!(g.poll(t0 + GRACE_PERIOD), None);
        g.schedule(t0, 4);
        assert_eq!(g.poll(t0), Some(4));
        g.cancel();
        assert!(!g.is_armed());
    }

    #[test]
    fn test_self_collision_ends_session() {
        let body = [p(5, 5), p(6, 5), p(6, 6), p(5, 6), p(4, 6)];
        let mut s = state_with(&body, Direction::Left, p(15, 15));
        s.score = 4;
        s.queue_direction(Direction::Down);
        assert_eq!(s.tick(Instant::now()), TickOutcome::GameOver { score: 4 });
        assert_eq!(s.snake.head(), p(5, 5));
    }

    #[test]
    fn test_session_end_drops_queued_turns() {
        let body = [p(5, 5), p(6, 5), p(6, 6), p(5, 6), p(4, 6)];
        let mut s = state_with(&body, Direction::Left, p(15, 15));
        s.queue_direction(Direction::Down);
        s.queue_direction(Direction::Right);
        assert!(matches!(s.tick(Instant::now()), TickOutcome::GameOver { .. }));
        assert!(s.queue.is_empty());
    }

    #[test]
    fn test_moving_into_tail_counts_as_collision() {
        let body = [p(5, 5), p(5, 6), p(6, 6), p(6, 5)];
        let mut s = state_with(&body, Direction::Up, p(15, 15));
        s.queue_direction(Direction::Right);
        assert!(matches!(s.tick(Instant::now()), TickOutcome::GameOver { .. }));
    }

    #[test]
    fn test_climb_collapses_snake_and_moves_floor() {
        let body = [p(10, 10), p(9, 10), p(8, 10)];
        let mut s = state_with(&body, Direction::Right, p(1, 1));
        s.floor = 2;
        s.score = 60;
        s.ladders.push(Ladder::new(p(11, 10), 2, 3));
        let out = s.tick(Instant::now());
        assert_eq!(out, TickOutcome::Climbed { from: 2, to: 3 });
        assert_eq!(s.floor, 3);
        assert_eq!(s.snake.len(), 1);
        assert_eq!(s.snake.head(), p(11, 10));
        assert_eq!(s.snake.total_len(), 3);
        assert_ne!(s.food, Some(p(11, 10)));
        assert_eq!(s.score, 60);
        assert_eq!(s.ladders.len(), 1);
    }

    #[test]
    fn test_stowed_segments_reemerge_after_climb() {
        let body = [p(10, 10), p(9, 10), p(8, 10)];
        let mut s = state_with(&body, Direction::Right, p(1, 1));
        s.ladders.push(Ladder::new(p(11, 10), 1, 2));
        let t0 = Instant::now();
        s.tick(t0);
        s.food = Some(p(1, 1));
        assert_eq!(s.tick(t0), TickOutcome::Moved);
        assert_eq!(s.snake.len(), 2);
        assert_eq!(s.tick(t0), TickOutcome::Moved);
        assert_eq!(s.snake.len(), 3);
        assert_eq!(s.tick(t0), TickOutcome::Moved);
        assert_eq!(s.snake.len(), 3);
        assert_eq!(s.snake.stowed(), 0);
    }

    #[test]
    fn test_ladder_leads_back_down() {
        let mut s = state_with(&[p(3, 3)], Direction::Down, p(1, 1));
        s.floor = 2;
        s.ladders.push(Ladder::new(p(3, 4), 1, 2));
        assert_eq!(s.tick(Instant::now()), TickOutcome::Climbed { from: 2, to: 1 });
        assert_eq!(s.floor, 1);
    }

    #[test]
    fn test_ladder_on_other_floor_is_ignored() {
        let mut s = state_with(&[p(3, 3)], Direction::Down, p(1, 1));
        s.ladders.push(Ladder::new(p(3, 4), 2, 3));
        assert_eq!(s.snapshot().get(3, 4), CellKind::Empty);
        assert_eq!(s.tick(Instant::now()), TickOutcome::Moved);
        assert_eq!(s.floor, 1);
        assert_eq!(s.snapshot().get(3, 4), CellKind::SnakeHead);
    }

    #[test]
    fn test_snapshot_classifies_cells() {
        let mut s = state_with(&[p(2, 2), p(1, 2)], Direction::Right, p(5, 5));
        s.ladders.push(Ladder::new(p(7, 7), 1, 2));
        s.ladders.push(Ladder::new(p(8, 8), 2, 3));
        let board = s.snapshot();
        assert_eq!(board.get(2, 2), CellKind::SnakeHead);
        assert_eq!(board.get(1, 2), CellKind::SnakeBody);
        assert_eq!(board.get(5, 5), CellKind::Food);
        assert_eq!(board.get(7, 7), CellKind::Ladder);
        assert_eq!(board.get(8, 8), CellKind::Empty);
        assert_eq!(board.rows().count(), 20);
    }

    #[test]
    fn test_full_board_yields_no_free_cell() {
        let mut s = GameState::new(MIN_GRID_SIZE, 50, 9);
        let n = i32::from(MIN_GRID_SIZE);
        let all: Vec<Position> = (0..n)
            .flat_map(|y| (0..n).map(move |x| Position::new(x, y)))
            .collect();
        s.snake = Snake::from_segments(&all);
        assert_eq!(s.random_free_cell(), None);
    }

    #[test]
    fn test_grid_size_is_clamped() {
        let s = GameState::new(2, 50, 0);
        assert_eq!(s.grid_size, MIN_GRID_SIZE);
    }

    fn any_direction() -> impl Strategy<Value = Direction> {
        prop::sample::select(Direction::ALL.to_vec())
    }

    proptest! {
        #[test]
        fn session_invariants_hold(
            seed in any::<u64>(),
            threshold in prop::sample::select(vec![0u32, 2, 3, 5]),
            turns in prop::collection::vec(prop::option::of(any_direction()), 1..300),
        ) {
            let mut s = GameState::new(12, threshold, seed);
            let t0 = Instant::now();
            for (i, turn) in turns.into_iter().enumerate() {
                let now = t0 + Duration::from_millis(100 * i as u64);
                if let Some(dir) = turn {
                    s.queue_direction(dir);
                }
                let len_before = s.snake.total_len();
                let score_before = s.score;
                let committed = s.direction;
                let out = s.tick(now);
                prop_assert_ne!(s.direction, committed.opposite());
                match out {
                    TickOutcome::Ate { .. } => {
                        prop_assert_eq!(s.snake.total_len(), len_before + 1);
                        prop_assert_eq!(s.score, score_before + 1);
                    }
                    TickOutcome::GameOver { .. } => break,
                    _ => {
                        prop_assert_eq!(s.snake.total_len(), len_before);
                        prop_assert_eq!(s.score, score_before);
                    }
                }
                if s.poll_grace(now).is_some() {
                    break;
                }

                let segs: Vec<_> = s.snake.segments().copied().collect();
                let unique: HashSet<_> = segs.iter().copied().collect();
                prop_assert_eq!(unique.len(), segs.len());
                if let Some(food) = s.food {
                    prop_assert!(!s.snake.contains(food));
                    prop_assert!(s.ladders.iter().all(|l| l.pos != food));
                }
                let mut pairs = HashSet::new();
                for l in &s.ladders {
                    prop_assert!(pairs.insert(l.floors()));
                }
            }
        }
    }
}
