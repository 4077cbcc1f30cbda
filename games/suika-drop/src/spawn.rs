use drop_engine::{BodyDesc, ColliderDesc, ColliderMaterial, EngineContext, Entity, EntityId, Scheduler, Sprite};
use glam::Vec2;

use crate::arena::{groups, tags};
use crate::config::Tuning;
use crate::game::Task;
use crate::sizes::SizeTier;

/// Where new balls may appear and when the next one is due.
#[derive(Debug, Clone)]
pub struct SpawnPolicy {
    left: f32,
    right: f32,
    spawn_height: f32,
    last_x: f32,
}

impl SpawnPolicy {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            left: tuning.left_bound(),
            right: tuning.right_bound(),
            spawn_height: tuning.spawn_height,
            last_x: tuning.arena_width / 2.0,
        }
    }

    /// Keep a ball of `radius` between the walls. Idempotent.
    pub fn clamp_x(&self, x: f32, radius: f32) -> f32 {
        (self.left + radius).max(x.min(self.right - radius))
    }

    /// Last pointer X seen, unclamped.
    pub fn last_x(&self) -> f32 {
        self.last_x
    }

    /// Record a pointer X and return the clamped spawn point for `radius`.
    pub fn follow(&mut self, x: f32, radius: f32) -> Vec2 {
        self.last_x = x;
        self.spawn_point(radius)
    }

    /// Spawn point at the last pointer X.
    pub fn spawn_point(&self, radius: f32) -> Vec2 {
        Vec2::new(self.clamp_x(self.last_x, radius), self.spawn_height)
    }

    /// Queue the next in-hand ball `delay` seconds from now.
    pub fn schedule_next_drop(&self, scheduler: &mut Scheduler<Task>, delay: f32) {
        scheduler.schedule_in(delay, Task::SpawnInHand);
    }

    /// A drop is allowed only while no in-hand spawn is waiting.
    pub fn can_drop(&self, scheduler: &Scheduler<Task>) -> bool {
        !scheduler.is_pending(|task| *task == Task::SpawnInHand)
    }
}

/// Create a ball of `tier` at `pos`, at rest. Held balls are fixed and collide with nothing.
pub fn spawn_ball(ctx: &mut EngineContext, tuning: &Tuning, tier: SizeTier, pos: Vec2, held: bool) -> EntityId {
    let frame = tuning.sizes.index_of(tier.radius).unwrap_or(0) as u32;
    let collider = ColliderDesc::Ball { radius: tier.radius };

    let (desc, tag) = if held {
        (BodyDesc::fixed(collider).with_groups(groups::HAND), tags::IN_HAND)
    } else {
        (BodyDesc::dynamic(collider).with_groups(groups::BALL), tags::BALL)
    };

    let id = ctx.next_id();
    let entity = Entity::new(id)
        .with_tag(tag)
        .with_size(tier.radius * 2.0)
        .with_sprite(Sprite::frame(frame));
    let material = ColliderMaterial {
        restitution: tuning.restitution,
        friction: tuning.friction,
        density: tuning.density,
    };
    ctx.spawn_with_body(entity, desc.with_position(pos).with_velocity(Vec2::ZERO), material)
}
