/*
 * Bird Module
 *
 * Flappy-bird style minigame. The bird falls under gravity and flaps on a
 * click or Space; pipe pairs scroll in from the right. The bird's hitbox is a
 * rotated rectangle tested against each pipe segment with SAT, and a hit
 * pushes the bird out along the minimum translation vector before the run
 * ends in a burst of feathers.
 */

use std::f32::consts::TAU;

use log::{debug, info};
use nannou::prelude::{rgba, Key};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::debug::DebugInfo;
use crate::entity::{Collidable, Emitter, EntityId, Identified, Positioned};
use crate::math::constrain;
use crate::modules::{FrameContext, ModuleKind, SandboxModule};
use crate::params::{BirdParams, SandboxConfig};
use crate::renderer::WorldDraw;
use crate::sat::SatStats;
use crate::shapes::{Polygon, Rect};
use crate::vector::{pt, Point, Vector};

pub const ARENA: Rect = Rect::new(-400.0, -300.0, 800.0, 600.0);

const BIRD_X: f32 = -200.0;
const BIRD_WIDTH: f32 = 34.0;
const BIRD_HEIGHT: f32 = 24.0;
// Keep gaps away from the floor and ceiling
const GAP_MARGIN: f32 = 40.0;
const FEATHER_BURST: usize = 12;
const FEATHER_LIFE: u32 = 45;
const FEATHER_GRAVITY: f32 = 0.15;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Feather {
    pub position: Point,
    pub velocity: Vector,
    pub life: u32,
}

impl Feather {
    fn update(&mut self) {
        self.position += self.velocity;
        self.velocity.y -= FEATHER_GRAVITY;
        self.life = self.life.saturating_sub(1);
    }

    pub fn is_alive(&self) -> bool {
        self.life > 0
    }
}

#[derive(Debug, Clone)]
pub struct Bird {
    id: EntityId,
    position: Point,
    velocity: f32,
    rotation: f32,
    hitbox: Polygon,
    pending_feathers: usize,
}

impl Bird {
    pub fn new(position: Point) -> Self {
        let mut bird = Self {
            id: 0,
            position,
            velocity: 0.0,
            rotation: 0.0,
            hitbox: Polygon::from(Rect::from_center(position, BIRD_WIDTH, BIRD_HEIGHT)),
            pending_feathers: 0,
        };
        bird.sync_hitbox();
        bird
    }

    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    pub fn flap(&mut self, params: &BirdParams) {
        self.velocity = params.flap_strength;
    }

    pub fn fall(&mut self, params: &BirdParams) {
        self.velocity = (self.velocity - params.gravity).max(-params.max_fall_speed);
        self.position.y += self.velocity;
        // Nose up while climbing, dive when falling fast
        self.rotation = constrain(self.velocity * 0.08, -1.2, 0.5);
        self.sync_hitbox();
    }

    pub fn push(&mut self, offset: Vector) {
        self.position += offset;
        self.sync_hitbox();
    }

    fn set_y(&mut self, y: f32) {
        self.position.y = y;
        self.sync_hitbox();
    }

    pub fn burst(&mut self, count: usize) {
        self.pending_feathers += count;
    }

    fn sync_hitbox(&mut self) {
        self.hitbox = Polygon::from(Rect::from_center(self.position, BIRD_WIDTH, BIRD_HEIGHT));
        self.hitbox.rotate(self.rotation);
    }
}

impl Positioned for Bird {
    fn position(&self) -> Point {
        self.position
    }
}

impl Identified for Bird {
    fn id(&self) -> EntityId {
        self.id
    }
}

impl Collidable for Bird {
    fn hitbox(&self) -> &Polygon {
        &self.hitbox
    }
}

impl Emitter for Bird {
    type Particle = Feather;

    fn emit(&mut self, out: &mut Vec<Feather>) {
        let count = std::mem::take(&mut self.pending_feathers);
        for i in 0..count {
            let angle = i as f32 / count as f32 * TAU;
            let speed = 2.0 + (i % 3) as f32;
            out.push(Feather {
                position: self.position,
                velocity: Vector::from_angle(angle) * speed,
                life: FEATHER_LIFE,
            });
        }
    }
}

#[derive(Debug, Clone)]
pub struct PipeSegment {
    hitbox: Polygon,
}

impl PipeSegment {
    fn new(rect: Rect) -> Self {
        Self { hitbox: Polygon::from(rect) }
    }
}

impl Collidable for PipeSegment {
    fn hitbox(&self) -> &Polygon {
        &self.hitbox
    }
}

/// Upper and lower pipe around one gap.
#[derive(Debug, Clone)]
pub struct Pipe {
    pub x: f32,
    pub gap_center: f32,
    upper: PipeSegment,
    lower: PipeSegment,
    scored: bool,
}

impl Pipe {
    pub fn new(x: f32, gap_center: f32, params: &BirdParams) -> Self {
        let half_gap = params.pipe_gap / 2.0;
        let left = x - params.pipe_width / 2.0;
        let gap_top = gap_center + half_gap;
        let gap_bottom = gap_center - half_gap;
        Self {
            x,
            gap_center,
            upper: PipeSegment::new(Rect::new(left, gap_top, params.pipe_width, (ARENA.max_y() - gap_top).max(0.0))),
            lower: PipeSegment::new(Rect::new(
                left,
                ARENA.min_y(),
                params.pipe_width,
                (gap_bottom - ARENA.min_y()).max(0.0),
            )),
            scored: false,
        }
    }

    fn scroll(&mut self, dx: f32) {
        self.x -= dx;
        let offset = Vector::new(-dx, 0.0);
        self.upper.hitbox.translate(offset);
        self.lower.hitbox.translate(offset);
    }

    fn segments(&self) -> [&PipeSegment; 2] {
        [&self.upper, &self.lower]
    }

    fn right_edge(&self) -> f32 {
        self.upper.hitbox.bounding_box().max_x()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    Ready,
    Playing,
    Over,
}

pub struct BirdGame {
    bird: Bird,
    pipes: Vec<Pipe>,
    feathers: Vec<Feather>,
    state: GameState,
    score: u32,
    best: u32,
    rng: StdRng,
    stats: SatStats,
}

impl BirdGame {
    pub fn new(config: &SandboxConfig) -> Self {
        let mut game = Self {
            bird: Bird::new(pt(BIRD_X, 0.0)),
            pipes: Vec::new(),
            feathers: Vec::new(),
            state: GameState::Ready,
            score: 0,
            best: 0,
            rng: StdRng::from_entropy(),
            stats: SatStats::default(),
        };
        game.reset(config);
        game
    }

    pub fn bird(&self) -> &Bird {
        &self.bird
    }

    pub fn pipes(&self) -> &[Pipe] {
        &self.pipes
    }

    pub fn feathers(&self) -> &[Feather] {
        &self.feathers
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn best(&self) -> u32 {
        self.best
    }

    /// Flap, starting the run from the ready screen or restarting after a
    /// crash.
    pub fn flap(&mut self, config: &SandboxConfig) {
        match self.state {
            GameState::Ready => {
                self.state = GameState::Playing;
                self.bird.flap(&config.bird);
            }
            GameState::Playing => self.bird.flap(&config.bird),
            GameState::Over => self.reset(config),
        }
    }

    pub fn place_pipe(&mut self, pipe: Pipe) {
        self.pipes.push(pipe);
    }

    fn spawn_pipes(&mut self, params: &BirdParams) {
        let due = match self.pipes.last() {
            Some(last) => last.x <= ARENA.max_x() - params.pipe_spacing,
            None => true,
        };
        if !due {
            return;
        }
        let half_gap = params.pipe_gap / 2.0;
        let low = ARENA.min_y() + half_gap + GAP_MARGIN;
        let high = ARENA.max_y() - half_gap - GAP_MARGIN;
        let gap_center = if low < high { self.rng.gen_range(low..high) } else { 0.0 };
        self.pipes.push(Pipe::new(ARENA.max_x() + params.pipe_width / 2.0, gap_center, params));
    }

    fn crash(&mut self) {
        self.state = GameState::Over;
        self.best = self.best.max(self.score);
        self.bird.burst(FEATHER_BURST);
        self.bird.emit(&mut self.feathers);
        info!("bird crashed with score {} (best {})", self.score, self.best);
    }

    fn step(&mut self, params: &BirdParams) {
        for feather in &mut self.feathers {
            feather.update();
        }
        self.feathers.retain(Feather::is_alive);

        match self.state {
            GameState::Ready => return,
            GameState::Over => {
                // Let the bird drop to the ground
                if self.bird.position.y - BIRD_HEIGHT / 2.0 > ARENA.min_y() {
                    self.bird.fall(params);
                }
                return;
            }
            GameState::Playing => {}
        }

        self.bird.fall(params);

        let ceiling = ARENA.max_y() - BIRD_HEIGHT / 2.0;
        if self.bird.position.y > ceiling {
            self.bird.set_y(ceiling);
            self.bird.velocity = self.bird.velocity.min(0.0);
        }

        for pipe in &mut self.pipes {
            pipe.scroll(params.pipe_speed);
        }
        let before = self.pipes.len();
        self.pipes.retain(|p| p.right_edge() >= ARENA.min_x());
        if self.pipes.len() != before {
            debug!("removed {} pipes", before - self.pipes.len());
        }
        self.spawn_pipes(params);

        for pipe in &mut self.pipes {
            if !pipe.scored && pipe.right_edge() < self.bird.position.x {
                pipe.scored = true;
                self.score += 1;
            }
        }

        let mut crashed = false;
        for pipe in &self.pipes {
            for segment in pipe.segments() {
                let result = self.bird.separation_with_stats(segment, &mut self.stats);
                if !result.is_separating {
                    self.bird.push(result.translation());
                    crashed = true;
                }
            }
        }

        let floor = ARENA.min_y() + BIRD_HEIGHT / 2.0;
        if self.bird.position.y <= floor {
            self.bird.set_y(floor);
            crashed = true;
        }

        if crashed {
            self.crash();
        }
    }
}

impl SandboxModule for BirdGame {
    fn kind(&self) -> ModuleKind {
        ModuleKind::Bird
    }

    fn reset(&mut self, _config: &SandboxConfig) {
        self.bird = Bird::new(pt(BIRD_X, 0.0));
        self.pipes.clear();
        self.feathers.clear();
        self.state = GameState::Ready;
        self.score = 0;
    }

    fn update(&mut self, ctx: &FrameContext, debug: &mut DebugInfo) {
        self.stats = SatStats::default();
        if !ctx.config.pause_simulation {
            self.step(&ctx.config.bird);
        }

        debug.sat_stats.merge(&self.stats);
        debug.entity_count = 1 + self.pipes.len() * 2 + self.feathers.len();
        debug.visible_entities = debug.entity_count;
        debug.tree_nodes = 0;
        debug.status = match self.state {
            GameState::Ready => "ready: click or Space to flap".to_string(),
            GameState::Playing => format!("score {} (best {})", self.score, self.best),
            GameState::Over => format!("game over: score {} (best {})", self.score, self.best),
        };
    }

    fn draw(&self, canvas: &mut WorldDraw, config: &SandboxConfig) {
        canvas.fill_rect(&ARENA, rgba(0.35, 0.6, 0.85, 1.0));

        let pipe_color = rgba(0.3, 0.75, 0.3, 1.0);
        for pipe in &self.pipes {
            for segment in pipe.segments() {
                canvas.fill_polygon(segment.hitbox(), pipe_color);
            }
        }

        for feather in &self.feathers {
            let alpha = feather.life as f32 / FEATHER_LIFE as f32;
            canvas.circle(feather.position, 3.0, rgba(1.0, 0.9, 0.4, alpha));
        }

        canvas.fill_polygon(self.bird.hitbox(), rgba(1.0, 0.85, 0.2, 1.0));
        let eye = self.bird.position + Vector::from_angle(self.bird.rotation) * (BIRD_WIDTH * 0.25)
            + Vector::from_angle(self.bird.rotation).perp() * (BIRD_HEIGHT * 0.2);
        canvas.circle(eye, 3.0, rgba(0.1, 0.1, 0.1, 1.0));

        if config.bird.show_hitboxes {
            let outline = rgba(1.0, 0.2, 0.2, 1.0);
            canvas.outline_polygon(self.bird.hitbox(), outline, 1.0);
            canvas.outline_rect(self.bird.hitbox().bounding_box(), rgba(1.0, 0.2, 0.2, 0.4), 1.0);
            for pipe in &self.pipes {
                for segment in pipe.segments() {
                    canvas.outline_polygon(segment.hitbox(), outline, 1.0);
                }
            }
        }

        canvas.outline_rect(&ARENA, rgba(0.1, 0.1, 0.1, 1.0), 3.0);
        let banner = pt(0.0, ARENA.max_y() - 40.0);
        let white = rgba(1.0, 1.0, 1.0, 1.0);
        match self.state {
            GameState::Ready => canvas.text("click to flap", banner, white, 28),
            GameState::Playing => canvas.text(&self.score.to_string(), banner, white, 36),
            GameState::Over => canvas.text(&format!("game over: {}", self.score), banner, white, 28),
        }
    }

    fn mouse_pressed(&mut self, _world: Point, config: &SandboxConfig) -> bool {
        self.flap(config);
        true
    }

    fn key_pressed(&mut self, key: Key, config: &SandboxConfig) {
        match key {
            Key::Space => self.flap(config),
            Key::R => self.reset(config),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn ctx(config: &SandboxConfig) -> FrameContext<'_> {
        FrameContext {
            config,
            mouse: pt(0.0, 0.0),
            view: ARENA,
            time: 0.0,
        }
    }

    fn playing(config: &SandboxConfig) -> BirdGame {
        let mut game = BirdGame::new(config);
        game.flap(config);
        assert_eq!(game.state(), GameState::Playing);
        game
    }

    #[test]
    fn gravity_pulls_until_terminal_velocity() {
        let params = BirdParams::default();
        let mut bird = Bird::new(pt(0.0, 0.0));
        bird.fall(&params);
        assert_relative_eq!(bird.velocity(), -params.gravity);
        for _ in 0..200 {
            bird.fall(&params);
        }
        assert_relative_eq!(bird.velocity(), -params.max_fall_speed);
        assert_relative_eq!(bird.rotation(), -0.96, epsilon = 1e-4);
    }

    #[test]
    fn ready_state_holds_still() {
        let config = SandboxConfig::default();
        let mut game = BirdGame::new(&config);
        for _ in 0..30 {
            game.update(&ctx(&config), &mut DebugInfo::default());
        }
        assert_eq!(game.state(), GameState::Ready);
        assert_eq!(game.bird().position(), pt(BIRD_X, 0.0));
        assert!(game.pipes().is_empty());
    }

    #[test]
    fn hitting_a_pipe_pushes_out_and_ends_the_run() {
        let mut config = SandboxConfig::default();
        config.bird.gravity = 0.0;
        config.bird.flap_strength = 0.0;
        config.bird.pipe_speed = 0.0;
        let mut game = playing(&config);
        // Lower pipe reaching up to y = 5, overlapping the bird's bottom half
        let mut params = config.bird.clone();
        params.pipe_gap = 200.0;
        game.place_pipe(Pipe::new(BIRD_X, 105.0, &params));

        let mut debug = DebugInfo::default();
        game.update(&ctx(&config), &mut debug);

        assert_eq!(game.state(), GameState::Over);
        assert!(debug.sat_stats.checks > 0);
        assert!(game.bird().position().y > 0.0);
        assert_eq!(game.feathers().len(), FEATHER_BURST);
    }

    #[test]
    fn passing_a_pipe_scores_once() {
        let mut config = SandboxConfig::default();
        config.bird.gravity = 0.0;
        config.bird.flap_strength = 0.0;
        config.bird.pipe_speed = 10.0;
        let mut game = playing(&config);
        game.place_pipe(Pipe::new(BIRD_X + 100.0, 0.0, &config.bird));

        for _ in 0..30 {
            game.update(&ctx(&config), &mut DebugInfo::default());
        }
        assert_eq!(game.state(), GameState::Playing);
        assert_eq!(game.score(), 1);
    }

    #[test]
    fn hitting_the_ground_ends_the_run() {
        let config = SandboxConfig::default();
        let mut game = playing(&config);
        for _ in 0..200 {
            game.update(&ctx(&config), &mut DebugInfo::default());
            if game.state() == GameState::Over {
                break;
            }
        }
        assert_eq!(game.state(), GameState::Over);
        assert_relative_eq!(game.bird().position().y, ARENA.min_y() + BIRD_HEIGHT / 2.0, epsilon = 1e-3);

        game.flap(&config);
        assert_eq!(game.state(), GameState::Ready);
        assert_eq!(game.score(), 0);
    }

    #[test]
    fn pipes_spawn_by_spacing_and_leave_on_the_left() {
        let mut config = SandboxConfig::default();
        config.bird.gravity = 0.0;
        config.bird.flap_strength = 0.0;
        config.bird.pipe_speed = 5.0;
        config.bird.pipe_gap = 520.0;
        let mut game = playing(&config);

        let mut seen = 0;
        for _ in 0..400 {
            game.update(&ctx(&config), &mut DebugInfo::default());
            seen = seen.max(game.pipes().len());
            for pair in game.pipes().windows(2) {
                assert!(pair[1].x - pair[0].x >= config.bird.pipe_spacing - 1e-3);
            }
        }
        assert!(seen >= 2);
        assert!(game.pipes().iter().all(|p| p.right_edge() >= ARENA.min_x()));
    }

    #[test]
    fn feathers_fade_out() {
        let mut bird = Bird::new(pt(0.0, 0.0));
        bird.burst(4);
        let mut feathers = Vec::new();
        bird.emit(&mut feathers);
        bird.emit(&mut feathers);
        assert_eq!(feathers.len(), 4);
        for _ in 0..FEATHER_LIFE {
            for f in &mut feathers {
                f.update();
            }
        }
        assert!(feathers.iter().all(|f| !f.is_alive()));
    }
}
