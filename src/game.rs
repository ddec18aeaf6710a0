//! Game state machine: menu, playing, won

use std::f32::consts::{FRAC_PI_4, TAU};
use std::mem;
use std::time::Duration;

use log::{debug, info};

use crate::geometry::Vector2f;
use crate::maze_generator::{self, MazeGenerator};
use crate::raycast::RayCaster;
use crate::render;
use crate::screen::Screen;
use crate::{Error, Maze, Result};

/// Normalised exit distance below which the maze counts as solved
pub const WIN_THRESHOLD: f32 = 0.01;

/// Settings fixed for the whole program run
#[derive(Clone, Debug, PartialEq)]
pub struct GameConfig {
    /// Maze size in cells
    pub maze_width: usize,
    pub maze_height: usize,
    /// Screen size in characters
    pub screen_width: usize,
    pub screen_height: usize,
    /// Field of view, radians
    pub fov: f32,
    /// Render distance in map units
    pub max_distance: f32,
    /// Map units per second
    pub walk_speed: f32,
    /// Radians per second
    pub rotation_speed: f32,
    /// Seed for maze generation; random when `None`
    pub seed: Option<u64>,
    /// Frame rate limit; unlimited when `None`
    pub max_fps: Option<u32>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            maze_width: 10,
            maze_height: 10,
            screen_width: 120,
            screen_height: 40,
            fov: FRAC_PI_4,
            max_distance: 16.0,
            walk_speed: 5.0,
            rotation_speed: 1.6,
            seed: None,
            max_fps: None,
        }
    }
}

impl GameConfig {
    pub fn validate(&self) -> Result<()> {
        maze_generator::checked_size(self.maze_width, self.maze_height)?;
        if self.max_fps == Some(0) {
            return Err(Error::InvalidFrameRate);
        }
        if self.screen_width == 0 || self.screen_height == 0 {
            return Err(Error::InvalidScreen {
                width: self.screen_width,
                height: self.screen_height,
            });
        }
        Ok(())
    }

    /// Shortest time one frame may take, if the frame rate is capped
    pub fn frame_budget(&self) -> Option<Duration> {
        self.max_fps
            .filter(|&fps| fps > 0)
            .map(|fps| Duration::from_secs(1) / fps)
    }
}

/// Input snapshot for one frame
///
/// Movement and turning are held keys; the rest fire once per press.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Controls {
    pub forward: bool,
    pub backward: bool,
    pub strafe_left: bool,
    pub strafe_right: bool,
    pub turn_left: bool,
    pub turn_right: bool,
    pub toggle_map: bool,
    pub toggle_debug: bool,
    pub confirm: bool,
    pub cancel: bool,
}

/// Player pose in map space
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Player {
    pub position: Vector2f,
    /// Heading, radians in `[0, 2π)`; 0 looks along +x
    pub angle: f32,
}

impl Player {
    pub const INITIAL_ANGLE: f32 = 0.0;

    /// Stand in the middle of the maze start cell
    pub fn spawn(maze: &Maze) -> Self {
        Self {
            position: maze.start().center(),
            angle: Self::INITIAL_ANGLE,
        }
    }

    pub fn turn(&mut self, amount: f32) {
        self.angle = (self.angle + amount).rem_euclid(TAU);
    }

    /// Move by `delta` unless the new position is blocked
    ///
    /// Returns whether the player moved.
    pub fn try_move(&mut self, maze: &Maze, delta: Vector2f) -> bool {
        let candidate = self.position + delta;
        if maze.blocks(candidate) {
            return false;
        }
        self.position = candidate;
        true
    }
}

/// One walk through one maze
#[derive(Clone, Debug)]
pub struct Session {
    pub maze: Maze,
    pub player: Player,
    /// Seconds spent in the maze
    pub play_time: f32,
}

impl Session {
    fn new(maze: Maze) -> Self {
        Self {
            player: Player::spawn(&maze),
            maze,
            play_time: 0.0,
        }
    }

    pub fn exit_distance(&self) -> f32 {
        self.maze.exit_distance(self.player.position)
    }
}

#[derive(Clone, Debug)]
pub enum Phase {
    Menu,
    Playing(Session),
    Won(Session),
    Exit,
}

/// Everything the game loop owns between frames
pub struct GameState {
    config: GameConfig,
    generator: MazeGenerator,
    caster: RayCaster,
    phase: Phase,
    show_map: bool,
    show_debug: bool,
    /// Duration of the previous frame, seconds
    frame_time: f32,
}

impl GameState {
    pub fn new(config: GameConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            generator: MazeGenerator::new(config.seed),
            caster: RayCaster::new(config.max_distance),
            config,
            phase: Phase::Menu,
            show_map: false,
            show_debug: false,
            frame_time: 0.0,
        })
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn is_running(&self) -> bool {
        !matches!(self.phase, Phase::Exit)
    }

    /// Start playing in `maze` instead of a generated one
    pub fn play(&mut self, maze: Maze) {
        debug!("Entering maze {}x{}", maze.maze_width(), maze.maze_height());
        self.phase = Phase::Playing(Session::new(maze));
    }

    fn new_session(&mut self) -> Result<Session> {
        let maze = self
            .generator
            .generate(self.config.maze_width, self.config.maze_height)?;
        Ok(Session::new(maze))
    }

    /// Advance one frame
    ///
    /// - `controls`: Input state for this frame.
    /// - `elapsed`: Seconds since the previous frame; scales movement.
    ///
    /// Returns error, if a new maze cannot be generated.
    pub fn update(&mut self, controls: &Controls, elapsed: f32) -> Result<()> {
        self.frame_time = elapsed;

        let phase = mem::replace(&mut self.phase, Phase::Exit);
        self.phase = match phase {
            Phase::Menu | Phase::Won(_) if controls.cancel => {
                debug!("Quit requested");
                Phase::Exit
            }
            Phase::Menu | Phase::Won(_) if controls.confirm => {
                debug!("Starting new session");
                Phase::Playing(self.new_session()?)
            }
            Phase::Playing(_) if controls.cancel => {
                debug!("Quit requested while playing");
                Phase::Exit
            }
            Phase::Playing(mut session) => {
                self.apply_toggles(controls);
                self.step(&mut session, controls, elapsed);
                if session.exit_distance() < WIN_THRESHOLD {
                    info!("Maze solved in {:.1} s", session.play_time);
                    Phase::Won(session)
                } else {
                    Phase::Playing(session)
                }
            }
            other => other,
        };
        Ok(())
    }

    fn apply_toggles(&mut self, controls: &Controls) {
        if controls.toggle_map {
            self.show_map = !self.show_map;
            debug!("Map overlay {}", if self.show_map { "on" } else { "off" });
        }
        if controls.toggle_debug {
            self.show_debug = !self.show_debug;
            debug!("Debug overlay {}", if self.show_debug { "on" } else { "off" });
        }
    }

    fn step(&self, session: &mut Session, controls: &Controls, elapsed: f32) {
        let player = &mut session.player;

        let forward = Vector2f::from_angle(player.angle) * (self.config.walk_speed * elapsed);
        let right = Vector2f::new(-forward.y, forward.x);
        let mut delta = Vector2f::default();
        if controls.forward {
            delta += forward;
        }
        if controls.backward {
            delta -= forward;
        }
        if controls.strafe_right {
            delta += right;
        }
        if controls.strafe_left {
            delta -= right;
        }
        if delta != Vector2f::default() {
            player.try_move(&session.maze, delta);
        }

        let rotation = self.config.rotation_speed * elapsed;
        if controls.turn_left {
            player.turn(-rotation);
        }
        if controls.turn_right {
            player.turn(rotation);
        }

        session.play_time += elapsed;
    }

    /// Compose the frame for the current phase into `screen`
    ///
    /// Layers go view, progress bar, map, debug line, then menu or won
    /// panel. The last cell is sealed for the presentation sink.
    pub fn render(&self, screen: &mut Screen) {
        match &self.phase {
            Phase::Menu => {
                screen.clear();
                render::draw_menu(screen);
            }
            Phase::Playing(session) => self.draw_session(screen, session),
            Phase::Won(session) => {
                self.draw_session(screen, session);
                render::draw_won(screen, session.play_time);
            }
            Phase::Exit => screen.clear(),
        }
        screen.seal();
    }

    fn draw_session(&self, screen: &mut Screen, session: &Session) {
        let player = &session.player;
        render::draw_view(
            screen,
            &session.maze,
            &self.caster,
            player.position,
            player.angle,
            self.config.fov,
        );
        render::draw_progress(screen, session.exit_distance());
        if self.show_map {
            render::draw_minimap(screen, &session.maze, player.position, player.angle);
        }
        if self.show_debug {
            render::draw_debug(screen, player.position, player.angle, self.frame_time);
        }
    }
}
