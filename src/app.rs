//! App: terminal init, main loop, tick and key handling.

use crate::Args;
use crate::input::{Action, key_to_action};
use crate::ui::{self, View};
use anyhow::Result;
use crossterm::event::{self, Event, KeyEventKind};
use log::{info, warn};
use ratatui::DefaultTerminal;
use std::time::{Duration, Instant};
use tachyonfx::Effect;
use tetris2048::config::{Difficulty, GameConfig};
use tetris2048::game::GameState;
use tetris2048::profile::{Profile, ProfileStore};
use tetris2048::theme::Theme;

/// DAS (Delayed Auto-Shift): delay before movement starts repeating when you hold a key.
const REPEAT_DELAY_MS: u64 = 170;
/// ARR (Auto-Repeat Rate): time between repeated moves while holding.
const REPEAT_INTERVAL_MS: u64 = 50;
/// Frame budget, ~60 FPS.
const FRAME: Duration = Duration::from_millis(16);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Menu,
    Playing,
    GameOver,
    QuitMenu,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuitOption {
    Resume,
    MainMenu,
    Exit,
}

impl QuitOption {
    fn next(self) -> Self {
        match self {
            Self::Resume => Self::MainMenu,
            Self::MainMenu => Self::Exit,
            Self::Exit => Self::Resume,
        }
    }

    fn prev(self) -> Self {
        match self {
            Self::Resume => Self::Exit,
            Self::MainMenu => Self::Resume,
            Self::Exit => Self::MainMenu,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuTab {
    Difficulty,
    Animations,
    Start,
}

impl MenuTab {
    fn next(self) -> Self {
        match self {
            Self::Difficulty => Self::Animations,
            Self::Animations => Self::Start,
            Self::Start => Self::Difficulty,
        }
    }

    fn prev(self) -> Self {
        match self {
            Self::Difficulty => Self::Start,
            Self::Animations => Self::Difficulty,
            Self::Start => Self::Animations,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuState {
    pub current_tab: MenuTab,
    pub selected_difficulty: Difficulty,
    pub animations: bool,
    pub opened: Instant,
}

pub struct App {
    config: GameConfig,
    theme: Theme,
    store: ProfileStore,
    profile: Profile,
    /// `--tick-rate`; otherwise the difficulty decides.
    tick_rate_override: Option<f64>,
    /// `--no-animation` wins over the profile setting.
    animations_disabled: bool,
    state: GameState,
    screen: Screen,
    paused: bool,
    last_tick: Instant,
    last_frame: Instant,
    repeat_state: Option<(Action, Instant)>,
    last_repeat_fire: Option<Instant>,
    /// Row-clear flash, rendered over the board until done.
    clear_effect: Option<Effect>,
    clear_effect_time: Option<Instant>,
    menu: MenuState,
    quit_selected: QuitOption,
    /// The finished game set a new best score.
    new_record: bool,
    profile_dirty: bool,
}

impl App {
    pub fn new(args: &Args, config: GameConfig, theme: Theme, store: ProfileStore, profile: Profile) -> Self {
        let state = GameState::new(&config);
        let now = Instant::now();
        let menu = MenuState {
            current_tab: MenuTab::Difficulty,
            selected_difficulty: config.difficulty,
            animations: profile.animations,
            opened: now,
        };
        Self {
            tick_rate_override: args.tick_rate.filter(|r| *r > 0.0),
            animations_disabled: args.no_animation,
            screen: if args.no_menu { Screen::Playing } else { Screen::Menu },
            config,
            theme,
            store,
            profile,
            state,
            paused: false,
            last_tick: now,
            last_frame: now,
            repeat_state: None,
            last_repeat_fire: None,
            clear_effect: None,
            clear_effect_time: None,
            menu,
            quit_selected: QuitOption::Resume,
            new_record: false,
            profile_dirty: false,
        }
    }

    fn animations(&self) -> bool {
        !self.animations_disabled && self.profile.animations
    }

    fn tick_interval(&self) -> Duration {
        let rate = self
            .tick_rate_override
            .unwrap_or_else(|| self.state.difficulty.tick_rate());
        Duration::from_secs_f64(1.0 / rate)
    }

    /// Write the profile if anything in it changed.
    pub fn save_profile(&mut self) {
        if !self.profile_dirty {
            return;
        }
        match self.store.save(&self.profile) {
            Ok(()) => self.profile_dirty = false,
            Err(e) => warn!("could not save profile to {}: {e}", self.store.path().display()),
        }
    }

    fn start_game(&mut self) {
        let difficulty = self.menu.selected_difficulty;
        self.config.difficulty = difficulty;
        if self.profile.difficulty != difficulty || self.profile.animations != self.menu.animations {
            self.profile.difficulty = difficulty;
            self.profile.animations = self.menu.animations;
            self.profile_dirty = true;
        }
        self.reset_game();
    }

    fn reset_game(&mut self) {
        let now = Instant::now();
        self.state.restart(self.config.difficulty);
        self.screen = Screen::Playing;
        self.paused = false;
        self.last_tick = now;
        self.repeat_state = None;
        self.last_repeat_fire = None;
        self.clear_effect = None;
        self.clear_effect_time = None;
        self.new_record = false;
    }

    fn open_menu(&mut self) {
        self.screen = Screen::Menu;
        self.menu.current_tab = MenuTab::Difficulty;
        self.menu.selected_difficulty = self.config.difficulty;
        self.menu.opened = Instant::now();
    }

    fn apply_action(&mut self, action: Action) {
        match action {
            Action::MoveLeft => {
                self.state.move_left();
            }
            Action::MoveRight => {
                self.state.move_right();
            }
            Action::RotateCw => {
                self.state.rotate_cw();
            }
            Action::RotateCcw => {
                self.state.rotate_ccw();
            }
            Action::SoftDrop => self.state.soft_drop(),
            Action::HardDrop => {
                self.state.hard_drop();
                self.repeat_state = None;
            }
            Action::Restart => self.reset_game(),
            Action::Pause | Action::Quit | Action::None => {}
        }
    }

    fn tick_repeat(&mut self) {
        let Some((action, first)) = self.repeat_state else {
            return;
        };
        if !action.repeats() || first.elapsed() < Duration::from_millis(REPEAT_DELAY_MS) {
            return;
        }
        let now = Instant::now();
        let next = self.last_repeat_fire.unwrap_or(first) + Duration::from_millis(REPEAT_INTERVAL_MS);
        if now >= next {
            self.apply_action(action);
            self.last_repeat_fire = Some(now);
        }
    }

    /// Pick up what the last lock did: start the flash, end the game, record the score.
    fn after_game_step(&mut self) {
        if self.state.take_clear_flash() && self.animations() {
            self.clear_effect = Some(ui::clear_flash_effect(&self.theme));
            self.clear_effect_time = None;
        }
        if self.state.piece.is_none() || self.state.is_game_over() {
            self.repeat_state = None;
        }
        if self.state.is_game_over() && self.screen == Screen::Playing {
            self.screen = Screen::GameOver;
            self.new_record = self.profile.record_score(self.state.score());
            info!(
                "game over: score {}, rows {}, merges {}, best {}",
                self.state.score(),
                self.state.rows_cleared,
                self.state.merges,
                self.profile.high_score
            );
            if self.new_record {
                self.profile_dirty = true;
                self.save_profile();
            }
        }
    }

    pub fn run(&mut self) -> Result<()> {
        use crossterm::{
            event::{KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags},
            execute,
            terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
        };

        enable_raw_mode()?;
        let mut stdout = std::io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        // Release events make held-key repeat stop cleanly; not every terminal supports them.
        let _ = execute!(
            stdout,
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
        );

        let result = DefaultTerminal::new(ratatui::backend::CrosstermBackend::new(stdout))
            .map_err(anyhow::Error::from)
            .and_then(|mut terminal| self.run_loop(&mut terminal));

        let _ = execute!(std::io::stdout(), PopKeyboardEnhancementFlags);
        execute!(std::io::stdout(), LeaveAlternateScreen)?;
        disable_raw_mode()?;

        result
    }

    fn run_loop(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        loop {
            let now = Instant::now();
            let best = self.profile.high_score.max(self.state.score());
            terminal.draw(|f| {
                let view = View {
                    screen: self.screen,
                    state: &self.state,
                    theme: &self.theme,
                    paused: self.paused,
                    best,
                    new_record: self.new_record,
                    menu: &self.menu,
                    quit_selected: self.quit_selected,
                };
                ui::draw(f, &view, &mut self.clear_effect, &mut self.clear_effect_time, now);
            })?;

            if self.clear_effect.as_ref().is_some_and(Effect::done) {
                self.clear_effect = None;
                self.clear_effect_time = None;
            }

            let frame_ms = self.last_frame.elapsed().as_millis().min(u128::from(u32::MAX)) as u32;
            self.last_frame = Instant::now();
            if !self.paused {
                self.state.tick_popups(frame_ms);
            }

            let timeout = FRAME.saturating_sub(now.elapsed());
            if event::poll(timeout)? {
                while event::poll(Duration::ZERO)? {
                    let Event::Key(key) = event::read()? else {
                        continue;
                    };
                    let action = key_to_action(key);
                    if key.kind != KeyEventKind::Press {
                        if key.kind == KeyEventKind::Release
                            && self.repeat_state.map(|(a, _)| a) == Some(action)
                        {
                            self.repeat_state = None;
                            self.last_repeat_fire = None;
                        }
                        continue;
                    }
                    // Terminal key repeat while we already auto-repeat.
                    if self.repeat_state.map(|(a, _)| a) == Some(action) {
                        continue;
                    }
                    if !self.handle_action(action) {
                        return Ok(());
                    }
                }
            }

            if self.screen == Screen::Playing && !self.paused {
                self.tick_repeat();
                if self.last_tick.elapsed() >= self.tick_interval() {
                    self.last_tick = Instant::now();
                    self.state.tick_gravity();
                }
                self.after_game_step();
            }
        }
    }

    /// Route one key action to the current screen. Returns false to exit.
    fn handle_action(&mut self, action: Action) -> bool {
        match self.screen {
            Screen::Menu => match action {
                Action::Quit => return false,
                Action::MoveLeft | Action::MoveRight => match self.menu.current_tab {
                    MenuTab::Difficulty => {
                        self.menu.selected_difficulty = if action == Action::MoveLeft {
                            self.menu.selected_difficulty.prev()
                        } else {
                            self.menu.selected_difficulty.next()
                        };
                    }
                    MenuTab::Animations => self.menu.animations = !self.menu.animations,
                    MenuTab::Start => {}
                },
                Action::SoftDrop => self.menu.current_tab = self.menu.current_tab.next(),
                Action::RotateCw | Action::RotateCcw => {
                    self.menu.current_tab = self.menu.current_tab.prev();
                }
                Action::HardDrop => {
                    if self.menu.current_tab == MenuTab::Start {
                        self.start_game();
                    } else {
                        self.menu.current_tab = MenuTab::Start;
                    }
                }
                _ => {}
            },
            Screen::Playing if self.paused => match action {
                Action::Pause => self.paused = false,
                Action::Quit => {
                    self.screen = Screen::QuitMenu;
                    self.quit_selected = QuitOption::Resume;
                }
                _ => {}
            },
            Screen::Playing => match action {
                Action::Pause => self.paused = true,
                Action::Quit => {
                    self.screen = Screen::QuitMenu;
                    self.quit_selected = QuitOption::Resume;
                    self.repeat_state = None;
                }
                _ => {
                    self.apply_action(action);
                    if action.repeats() {
                        self.repeat_state = Some((action, Instant::now()));
                        self.last_repeat_fire = None;
                    }
                    self.after_game_step();
                }
            },
            Screen::QuitMenu => match action {
                Action::SoftDrop | Action::MoveRight => self.quit_selected = self.quit_selected.next(),
                Action::RotateCw | Action::RotateCcw | Action::MoveLeft => {
                    self.quit_selected = self.quit_selected.prev();
                }
                Action::HardDrop => match self.quit_selected {
                    QuitOption::Resume => self.screen = Screen::Playing,
                    QuitOption::MainMenu => self.open_menu(),
                    QuitOption::Exit => return false,
                },
                Action::Pause | Action::Quit => self.screen = Screen::Playing,
                _ => {}
            },
            Screen::GameOver => match action {
                Action::Quit => return false,
                Action::Restart => self.reset_game(),
                Action::HardDrop => self.open_menu(),
                _ => {}
            },
        }
        true
    }
}
