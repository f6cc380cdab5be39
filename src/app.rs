//! App: terminal init, main loop, tick and key handling.

use crate::GameConfig;
use crate::direction::Direction;
use crate::floors::{FloorNamer, FloorNames};
use crate::game::{DEFAULT_GRID_SIZE, GameState, MIN_GRID_SIZE, TickOutcome};
use crate::highscores::HighScore;
use crate::input::{Action, key_to_action};
use crate::settings::{Settings, SpeedTier, parse_threshold_input};
use crate::storage::Store;
use crate::telemetry::{Event, Tracker};
use crate::theme::Theme;
use crate::ui;
use anyhow::Result;
use crossterm::event::{self, Event as TermEvent, KeyEventKind};
use ratatui::DefaultTerminal;
use std::time::{Duration, Instant};
use tachyonfx::Effect;

/// Longest threshold the settings field accepts, in digits.
const THRESHOLD_INPUT_MAX: usize = 6;

/// Render cadence; independent of the game tick.
const FRAME_DURATION: Duration = Duration::from_millis(16);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Start,
    Settings,
    Playing,
    GameOver,
    QuitMenu,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOption {
    Play,
    Settings,
    Quit,
}

impl StartOption {
    fn cycle(self, dir: Direction) -> Self {
        match (self, dir) {
            (Self::Play, Direction::Down) | (Self::Quit, Direction::Up) => Self::Settings,
            (Self::Settings, Direction::Down) | (Self::Play, Direction::Up) => Self::Quit,
            (Self::Quit, Direction::Down) | (Self::Settings, Direction::Up) => Self::Play,
            (s, _) => s,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuitOption {
    Resume,
    MainMenu,
    Exit,
}

impl QuitOption {
    fn cycle(self, dir: Direction) -> Self {
        match (self, dir) {
            (Self::Resume, Direction::Down) | (Self::Exit, Direction::Up) => Self::MainMenu,
            (Self::MainMenu, Direction::Down) | (Self::Resume, Direction::Up) => Self::Exit,
            (Self::Exit, Direction::Down) | (Self::MainMenu, Direction::Up) => Self::Resume,
            (s, _) => s,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOverOption {
    PlayAgain,
    Settings,
    MainMenu,
}

impl GameOverOption {
    fn cycle(self, dir: Direction) -> Self {
        match (self, dir) {
            (Self::PlayAgain, Direction::Down) | (Self::MainMenu, Direction::Up) => Self::Settings,
            (Self::Settings, Direction::Down) | (Self::PlayAgain, Direction::Up) => Self::MainMenu,
            (Self::MainMenu, Direction::Down) | (Self::Settings, Direction::Up) => Self::PlayAgain,
            (s, _) => s,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsField {
    Threshold,
    Speed,
}

/// What a key did to the settings form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormStep {
    Editing,
    Commit,
    Cancel,
}

/// Working copy edited on the settings screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsForm {
    pub field: SettingsField,
    pub threshold_input: String,
    pub speed: SpeedTier,
}

impl SettingsForm {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            field: SettingsField::Threshold,
            threshold_input: settings.ladder_threshold.to_string(),
            speed: settings.speed,
        }
    }

    pub fn handle(&mut self, action: Action) -> FormStep {
        match action {
            Action::Confirm => return FormStep::Commit,
            Action::Quit => return FormStep::Cancel,
            Action::Turn(Direction::Up | Direction::Down) => {
                self.field = match self.field {
                    SettingsField::Threshold => SettingsField::Speed,
                    SettingsField::Speed => SettingsField::Threshold,
                };
            }
            Action::Turn(Direction::Left) if self.field == SettingsField::Speed => {
                self.speed = self.speed.prev();
            }
            Action::Turn(Direction::Right) if self.field == SettingsField::Speed => {
                self.speed = self.speed.next();
            }
            Action::Digit(c)
                if self.field == SettingsField::Threshold
                    && self.threshold_input.len() < THRESHOLD_INPUT_MAX =>
            {
                self.threshold_input.push(c);
            }
            Action::Backspace if self.field == SettingsField::Threshold => {
                self.threshold_input.pop();
            }
            _ => {}
        }
        FormStep::Editing
    }

    /// New settings plus one change event per field that actually changed.
    pub fn commit(&self, current: Settings) -> (Settings, Vec<Event>) {
        let next = Settings {
            ladder_threshold: parse_threshold_input(&self.threshold_input),
            speed: self.speed,
        };
        let mut events = Vec::new();
        if next.ladder_threshold != current.ladder_threshold {
            events.push(Event::change_setting(
                "ladder_threshold",
                next.ladder_threshold,
            ));
        }
        if next.speed != current.speed {
            events.push(Event::change_setting("game_speed", next.speed.as_str()));
        }
        (next, events)
    }
}

pub struct App {
    config: GameConfig,
    theme: Theme,
    store: Store,
    /// Persisted settings; CLI overrides live in `config`.
    settings: Settings,
    /// Largest grid the terminal can show; measured on the start screen.
    fit_grid: u16,
    state: GameState,
    screen: Screen,
    paused: bool,
    last_tick: Instant,
    started: Instant,
    high_score: HighScore,
    new_high_score: bool,
    floor_names: FloorNames,
    namer: Option<FloorNamer>,
    tracker: Tracker,
    start_selected: StartOption,
    quit_selected: QuitOption,
    game_over_selected: GameOverOption,
    form: SettingsForm,
    /// Screen the settings overlay returns to.
    settings_from: Screen,
    /// TachyonFX fade played after a climb.
    climb_effect: Option<Effect>,
    /// Last time we processed the climb effect (for delta).
    climb_effect_time: Option<Instant>,
}

impl App {
    pub fn new(
        config: GameConfig,
        theme: Theme,
        store: Store,
        settings: Settings,
        tracker: Tracker,
        namer: Option<FloorNamer>,
    ) -> Self {
        let now = Instant::now();
        let high_score = HighScore::load(store.clone());
        let threshold = config.ladder_threshold.unwrap_or(settings.ladder_threshold);
        let state = GameState::new(config.grid_size, threshold, 0);
        Self {
            config,
            theme,
            store,
            settings,
            fit_grid: u16::MAX,
            state,
            screen: Screen::Start,
            paused: false,
            last_tick: now,
            started: now,
            high_score,
            new_high_score: false,
            floor_names: FloorNames::new(),
            namer,
            tracker,
            start_selected: StartOption::Play,
            quit_selected: QuitOption::Resume,
            game_over_selected: GameOverOption::PlayAgain,
            form: SettingsForm::from_settings(&settings),
            settings_from: Screen::Start,
            climb_effect: None,
            climb_effect_time: None,
        }
    }

    fn grid_size(&self) -> u16 {
        let requested = if self.config.grid_size == 0 {
            DEFAULT_GRID_SIZE
        } else {
            self.config.grid_size
        };
        requested.min(self.fit_grid).max(MIN_GRID_SIZE)
    }

    /// Saved settings with this run's CLI overrides on top.
    fn run_settings(&self) -> Settings {
        Settings {
            ladder_threshold: self
                .config
                .ladder_threshold
                .unwrap_or(self.settings.ladder_threshold),
            speed: self.config.speed.unwrap_or(self.settings.speed),
        }
    }

    fn start_session(&mut self) {
        let seed = self.config.seed.unwrap_or_else(rand::random);
        let size = self.grid_size();
        let settings = self.run_settings();
        self.state = GameState::new(size, settings.ladder_threshold, seed);
        self.screen = Screen::Playing;
        self.paused = false;
        self.new_high_score = false;
        self.last_tick = Instant::now();
        self.climb_effect = None;
        self.climb_effect_time = None;
        log::info!(
            "session start: grid {}x{}, threshold {}, speed {}, seed {}",
            size,
            size,
            settings.ladder_threshold,
            settings.speed.as_str(),
            seed
        );
        self.tracker.track(Event::StartGame);
    }

    fn finish_session(&mut self, score: u32) {
        self.new_high_score = match self.high_score.record(score) {
            Ok(new) => new,
            Err(e) => {
                log::warn!("could not save high score: {:#}", e);
                false
            }
        };
        log::info!(
            "session over: score {} on floor {}",
            score,
            self.state.floor
        );
        self.tracker.track(Event::GameOver { score });
        if self.new_high_score {
            self.tracker.track(Event::NewHighScore { score });
        }
        self.paused = false;
        self.game_over_selected = GameOverOption::PlayAgain;
        self.screen = Screen::GameOver;
    }

    /// Per-frame work: merge namer results, fire grace, run the tick timer.
    fn on_frame(&mut self, now: Instant) {
        if let Some(namer) = self.namer.as_mut() {
            for result in namer.poll() {
                self.floor_names.apply(result);
            }
        }
        // Grace runs on wall time, paused or not.
        if matches!(self.screen, Screen::Playing | Screen::QuitMenu) {
            if let Some(score) = self.state.poll_grace(now) {
                self.finish_session(score);
            }
        }
        if now.saturating_duration_since(self.last_tick) >= self.run_settings().speed.tick_interval() {
            self.last_tick = now;
            self.on_tick(now);
        }
    }

    fn on_tick(&mut self, now: Instant) {
        if self.screen != Screen::Playing || self.paused || self.state.is_over() {
            return;
        }
        match self.state.tick(now) {
            TickOutcome::Climbed { to, .. } => {
                self.tracker.track(Event::ClimbLadder { to_floor: to });
                self.floor_names.visit(to, self.namer.as_ref());
                self.climb_effect = Some(ui::climb_effect(self.theme.floor_bg(to)));
                self.climb_effect_time = None;
            }
            TickOutcome::GameOver { score } => self.finish_session(score),
            TickOutcome::Ate {
                ladder_spawned: true,
            } => log::debug!("ladder up from floor {} is out", self.state.floor),
            _ => {}
        }
    }

    fn open_settings(&mut self, from: Screen) {
        self.form = SettingsForm::from_settings(&self.settings);
        self.settings_from = from;
        self.screen = Screen::Settings;
    }

    /// Save the form. A field edited here replaces its CLI override for the rest of the run.
    fn apply_settings(&mut self) {
        let (next, events) = self.form.commit(self.settings);
        if events.is_empty() {
            return;
        }
        if next.ladder_threshold != self.settings.ladder_threshold {
            self.config.ladder_threshold = None;
        }
        if next.speed != self.settings.speed {
            self.config.speed = None;
        }
        self.settings = next;
        for e in events {
            self.tracker.track(e);
        }
        if let Err(e) = self.settings.save(&self.store) {
            log::warn!("could not save settings: {:#}", e);
        }
    }

    /// Returns true when the app should exit.
    fn handle_action(&mut self, action: Action) -> bool {
        match self.screen {
            Screen::Start => match action {
                Action::Turn(dir) => self.start_selected = self.start_selected.cycle(dir),
                Action::Confirm | Action::Pause => match self.start_selected {
                    StartOption::Play => self.start_session(),
                    StartOption::Settings => self.open_settings(Screen::Start),
                    StartOption::Quit => return true,
                },
                Action::Quit => return true,
                _ => {}
            },
            Screen::Settings => match self.form.handle(action) {
                FormStep::Editing => {}
                FormStep::Commit => {
                    self.apply_settings();
                    self.screen = self.settings_from;
                }
                FormStep::Cancel => self.screen = self.settings_from,
            },
            Screen::Playing => match action {
                Action::Pause => self.paused = !self.paused,
                Action::Quit => {
                    self.screen = Screen::QuitMenu;
                    self.quit_selected = QuitOption::Resume;
                }
                Action::Turn(dir) if !self.paused => {
                    self.state.queue_direction(dir);
                }
                _ => {}
            },
            Screen::QuitMenu => match action {
                Action::Turn(dir) => self.quit_selected = self.quit_selected.cycle(dir),
                Action::Confirm => match self.quit_selected {
                    QuitOption::Resume => self.screen = Screen::Playing,
                    QuitOption::MainMenu => {
                        log::info!("session abandoned at score {}", self.state.score);
                        self.screen = Screen::Start;
                    }
                    QuitOption::Exit => return true,
                },
                Action::Pause | Action::Quit => self.screen = Screen::Playing,
                _ => {}
            },
            Screen::GameOver => match action {
                Action::Turn(dir) => self.game_over_selected = self.game_over_selected.cycle(dir),
                Action::Confirm => match self.game_over_selected {
                    GameOverOption::PlayAgain => self.start_session(),
                    GameOverOption::Settings => self.open_settings(Screen::GameOver),
                    GameOverOption::MainMenu => self.screen = Screen::Start,
                },
                Action::Restart => self.start_session(),
                Action::Quit => self.screen = Screen::Start,
                _ => {}
            },
        }
        false
    }

    fn measure_terminal(&mut self) {
        let (cols, rows) = crossterm::terminal::size().unwrap_or((80, 24));
        self.fit_grid = ui::grid_size_for_terminal(cols, rows);
    }

    pub fn run(&mut self) -> Result<()> {
        use crossterm::{
            execute,
            terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
        };

        enable_raw_mode()?;
        let mut stdout = std::io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let mut terminal =
            ratatui::DefaultTerminal::new(ratatui::backend::CrosstermBackend::new(stdout))?;

        self.measure_terminal();
        if self.config.no_menu {
            self.start_session();
        }

        let result = self.run_loop(&mut terminal);

        // Restore
        execute!(std::io::stdout(), LeaveAlternateScreen)?;
        disable_raw_mode()?;
        terminal.show_cursor()?;

        result
    }

    fn run_loop(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        loop {
            let now = Instant::now();
            self.on_frame(now);

            let best = self.high_score.best();
            let floor_label = self.floor_names.display(self.state.floor);
            let anim_ms = now.duration_since(self.started).as_millis() as u64;
            let run_settings = self.run_settings();
            terminal.draw(|f| {
                let view = ui::View {
                    screen: self.screen,
                    state: &self.state,
                    theme: &self.theme,
                    paused: self.paused,
                    best,
                    new_high_score: self.new_high_score,
                    floor_label: &floor_label,
                    start_selected: self.start_selected,
                    quit_selected: self.quit_selected,
                    game_over_selected: self.game_over_selected,
                    form: &self.form,
                    settings_from: self.settings_from,
                    settings: run_settings,
                    anim_ms,
                };
                ui::draw(
                    f,
                    &view,
                    &mut self.climb_effect,
                    &mut self.climb_effect_time,
                    now,
                );
            })?;

            if self.climb_effect.as_ref().is_some_and(|e| e.done()) {
                self.climb_effect = None;
                self.climb_effect_time = None;
            }

            let timeout = FRAME_DURATION.saturating_sub(now.elapsed());
            if event::poll(timeout)? {
                while event::poll(Duration::ZERO)? {
                    match event::read()? {
                        TermEvent::Key(key) if key.kind == KeyEventKind::Press => {
                            if self.handle_action(key_to_action(key)) {
                                return Ok(());
                            }
                        }
                        TermEvent::Resize(cols, rows) => {
                            self.fit_grid = ui::grid_size_for_terminal(cols, rows);
                        }
                        _ => {}
                    }
                }
            }
        }
    }
}
