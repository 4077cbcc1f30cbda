//! Suika-style drop game: equal balls merge into the next size, the round ends
//! when a ball stays on the death line too long.

use drop_engine::api::game::GameConfig;
use drop_engine::input::queue::{InputEvent, InputQueue};
use drop_engine::{EngineContext, EntityId, Game, GameEvent, Scheduler};
use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::arena::{self, tags};
use crate::config::Tuning;
use crate::loss::LossDetector;
use crate::merge::{MergeOutcome, MergeTracker};
use crate::score::{game_events, ScoreKeeper};
use crate::spawn::{spawn_ball, SpawnPolicy};

/// Custom event kinds from the page UI
mod events {
    pub const RESET: u32 = 1;
}

/// Delayed actions. Each one belongs to the round it was scheduled in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    SpawnInHand,
    Restart,
}

pub struct SuikaGame {
    tuning: Tuning,
    rng: Pcg32,
    scheduler: Scheduler<Task>,
    spawn: SpawnPolicy,
    merges: MergeTracker,
    score: ScoreKeeper,
    loss: LossDetector,
    in_hand: Option<EntityId>,
    death_line: Option<EntityId>,
}

impl SuikaGame {
    pub fn new() -> Self {
        Self::with_tuning(Tuning::default())
    }

    pub fn with_tuning(tuning: Tuning) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(tuning.seed),
            scheduler: Scheduler::new(),
            spawn: SpawnPolicy::new(&tuning),
            merges: MergeTracker::new(),
            score: ScoreKeeper::new(),
            loss: LossDetector::new(tuning.death_threshold_steps),
            in_hand: None,
            death_line: None,
            tuning,
        }
    }

    pub fn score(&self) -> u32 {
        self.score.score()
    }

    pub fn in_hand(&self) -> Option<EntityId> {
        self.in_hand
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    // -- Input --

    fn follow_pointer(&mut self, ctx: &mut EngineContext, x: f32) {
        match self.in_hand.and_then(|id| Some((id, ctx.ball_radius(id)?))) {
            Some((id, radius)) => {
                let pos = self.spawn.follow(x, radius);
                ctx.set_position(id, pos);
            }
            None => {
                self.spawn.follow(x, self.tuning.sizes.smallest().radius);
            }
        }
    }

    /// Pointer down on empty space with nothing in hand starts the drop cycle.
    fn manual_start(&mut self, ctx: &mut EngineContext, x: f32, y: f32) {
        if self.in_hand.is_some() || self.scheduler.is_pending(|_| true) {
            return;
        }
        if !ctx.entities_at(Vec2::new(x, y)).is_empty() {
            return;
        }
        self.spawn.follow(x, self.tuning.sizes.smallest().radius);
        self.spawn_in_hand(ctx);
    }

    fn drop_ball(&mut self, ctx: &mut EngineContext) {
        if !self.spawn.can_drop(&self.scheduler) {
            return;
        }
        let Some(id) = self.in_hand.take() else {
            return;
        };
        let (Some(radius), Some(x)) = (ctx.ball_radius(id), ctx.scene.get(id).map(|e| e.pos.x)) else {
            ctx.despawn(id);
            return;
        };
        let tier = match self.tuning.sizes.tier_of(radius) {
            Ok(tier) => tier,
            Err(err) => {
                log::error!("in-hand ball: {err}");
                ctx.despawn(id);
                return;
            }
        };

        let on_board = ctx.scene.count_with_tag(tags::BALL);
        self.score.reset_if_board_empty(ctx, on_board);

        ctx.despawn(id);
        let pos = Vec2::new(self.spawn.clamp_x(x, radius), self.tuning.spawn_height);
        let ball = spawn_ball(ctx, &self.tuning, tier, pos, false);
        log::info!("dropped {:?} (radius {}) at x={:.1}", ball, radius, pos.x);

        self.spawn.schedule_next_drop(&mut self.scheduler, self.tuning.drop_delay);
    }

    fn spawn_in_hand(&mut self, ctx: &mut EngineContext) {
        if self.in_hand.is_some() {
            return;
        }
        let tier = self.tuning.sizes.random_spawn_tier(&mut self.rng, self.tuning.spawn_fraction);
        let pos = self.spawn.spawn_point(tier.radius);
        self.in_hand = Some(spawn_ball(ctx, &self.tuning, tier, pos, true));
    }

    // -- Per-step systems --

    fn run_due_tasks(&mut self, ctx: &mut EngineContext, dt: f32) {
        for task in self.scheduler.advance(dt) {
            match task {
                Task::SpawnInHand => self.spawn_in_hand(ctx),
                Task::Restart => {
                    log::info!("new round");
                    self.spawn_in_hand(ctx);
                }
            }
        }
    }

    fn begin_merges(&mut self, ctx: &mut EngineContext) {
        let started: Vec<(EntityId, EntityId)> = ctx
            .collisions()
            .iter()
            .filter(|c| c.started && !c.sensor)
            .map(|c| (c.entity_a, c.entity_b))
            .collect();

        for (a, b) in started {
            self.merges.begin(ctx, a, b, &self.tuning);
        }
    }

    fn resolve_merge(&mut self, ctx: &mut EngineContext, merged: MergeOutcome) {
        let next = self.tuning.sizes.next_tier(merged.radius);

        ctx.despawn(merged.body);
        ctx.despawn(merged.partner);
        spawn_ball(ctx, &self.tuning, next, merged.midpoint, false);

        match self.score.add_score(ctx, &self.tuning.sizes, merged.radius) {
            Ok(total) => log::info!("merged {} -> {}, score {}", merged.radius, next.radius, total),
            Err(err) => log::error!("merge award skipped: {err}"),
        }
        ctx.emit_event(GameEvent::new(
            game_events::MERGED,
            merged.midpoint.x,
            merged.midpoint.y,
            next.radius,
        ));
    }

    fn check_death_line(&mut self, ctx: &mut EngineContext) {
        let Some(line) = self.death_line else {
            return;
        };
        let touching: Vec<EntityId> = ctx
            .contacts_of(line)
            .into_iter()
            .filter(|&id| ctx.scene.get(id).is_some_and(|e| e.has_tag(tags::BALL)))
            .collect();

        if let Some(ball) = self.loss.observe(&touching) {
            log::info!("{:?} stayed on the death line", ball);
            self.end_game(ctx);
        }
    }

    // -- Round lifecycle --

    /// Remove every ball and forget all per-ball state.
    fn clear_board(&mut self, ctx: &mut EngineContext) {
        self.merges.clear(ctx);
        for id in ctx.scene.ids_with_tag(tags::BALL) {
            ctx.despawn(id);
        }
        for id in ctx.scene.ids_with_tag(tags::IN_HAND) {
            ctx.despawn(id);
        }
        self.in_hand = None;
        self.loss.clear();
    }

    fn end_game(&mut self, ctx: &mut EngineContext) {
        self.clear_board(ctx);
        self.score.publish_game_over(ctx);
        log::info!("game over, final score {}", self.score.score());

        self.scheduler.next_epoch();
        self.scheduler.schedule_in(self.tuning.restart_delay, Task::Restart);
    }

    fn reset(&mut self, ctx: &mut EngineContext) {
        self.clear_board(ctx);
        self.score.reset(ctx);
        log::info!("round reset");

        self.scheduler.next_epoch();
        self.spawn.schedule_next_drop(&mut self.scheduler, self.tuning.drop_delay);
    }
}

impl Default for SuikaGame {
    fn default() -> Self {
        Self::new()
    }
}

impl Game for SuikaGame {
    fn config(&self) -> GameConfig {
        GameConfig {
            fixed_dt: 1.0 / 60.0,
            world_width: self.tuning.arena_width,
            world_height: self.tuning.arena_height,
            max_instances: 256,
            gravity: Vec2::new(0.0, self.tuning.gravity),
            ..GameConfig::default()
        }
    }

    fn init(&mut self, ctx: &mut EngineContext) {
        // Runs again after a tuning reload, into a fresh context
        *self = Self::with_tuning(self.tuning.clone());
        self.death_line = Some(arena::build(ctx, &self.tuning));
        self.score.publish(ctx);
    }

    fn update(&mut self, ctx: &mut EngineContext, input: &InputQueue) {
        let dt = ctx.physics.dt();

        self.run_due_tasks(ctx, dt);

        for event in input.iter() {
            match *event {
                InputEvent::Custom { kind, .. } if kind == events::RESET => self.reset(ctx),
                InputEvent::PointerMove { x, .. } => self.follow_pointer(ctx, x),
                InputEvent::PointerDown { x, y } => {
                    if self.in_hand.is_some() {
                        self.drop_ball(ctx);
                    } else {
                        self.manual_start(ctx, x, y);
                    }
                }
                InputEvent::PointerUp { .. } => self.drop_ball(ctx),
                _ => {}
            }
        }

        self.begin_merges(ctx);

        for merged in self.merges.update(ctx, &self.tuning, dt) {
            self.resolve_merge(ctx, merged);
        }

        self.check_death_line(ctx);
    }

    fn load_tuning(&mut self, json: &str) -> bool {
        match Tuning::from_json(json) {
            Ok(tuning) => {
                self.tuning = tuning;
                true
            }
            Err(err) => {
                log::warn!("rejected tuning: {err}");
                false
            }
        }
    }
}
