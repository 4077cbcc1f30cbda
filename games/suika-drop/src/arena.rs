//! The box the balls live in: four walls and the death line sensor.

use drop_engine::{BodyDesc, ColliderDesc, ColliderMaterial, EngineContext, Entity, EntityId};
use glam::Vec2;

use crate::config::Tuning;

/// Entity tags.
pub mod tags {
    /// A dynamic ball in play.
    pub const BALL: &str = "ball";
    /// The static preview ball following the pointer.
    pub const IN_HAND: &str = "in_hand";
    pub const WALL: &str = "wall";
    pub const DEATH_LINE: &str = "death_line";
}

/// Collision categories.
pub mod groups {
    use drop_engine::CollisionGroups;

    const BALL_BIT: u32 = 0b0001;
    const WALL_BIT: u32 = 0b0010;
    const SENSOR_BIT: u32 = 0b0100;
    const HAND_BIT: u32 = 0b1000;

    pub const BALL: CollisionGroups = CollisionGroups::new(BALL_BIT, BALL_BIT | WALL_BIT | SENSOR_BIT);
    pub const WALL: CollisionGroups = CollisionGroups::new(WALL_BIT, BALL_BIT);
    pub const SENSOR: CollisionGroups = CollisionGroups::new(SENSOR_BIT, BALL_BIT);
    /// The in-hand ball touches nothing.
    pub const HAND: CollisionGroups = CollisionGroups::new(HAND_BIT, 0);
}

/// Spawn the walls and the death line. Returns the death line entity.
pub fn build(ctx: &mut EngineContext, tuning: &Tuning) -> EntityId {
    let w = tuning.arena_width;
    let h = tuning.arena_height;
    let t = tuning.wall_thickness;

    // Centered on the arena edges, like a picture frame
    let walls = [
        (Vec2::new(w / 2.0, 0.0), Vec2::new(w / 2.0, t / 2.0)),
        (Vec2::new(w / 2.0, h), Vec2::new(w / 2.0, t / 2.0)),
        (Vec2::new(0.0, h / 2.0), Vec2::new(t / 2.0, h / 2.0)),
        (Vec2::new(w, h / 2.0), Vec2::new(t / 2.0, h / 2.0)),
    ];

    let material = ColliderMaterial {
        restitution: tuning.restitution,
        friction: tuning.friction,
        density: tuning.density,
    };

    for (center, half) in walls {
        let id = ctx.next_id();
        let desc = BodyDesc::fixed(ColliderDesc::Cuboid { half_width: half.x, half_height: half.y })
            .with_position(center)
            .with_groups(groups::WALL);
        ctx.spawn_with_body(Entity::new(id).with_tag(tags::WALL), desc, material);
    }

    let id = ctx.next_id();
    let desc = BodyDesc::sensor(ColliderDesc::Cuboid {
        half_width: (w - t) / 2.0,
        half_height: 1.0,
    })
    .with_position(Vec2::new(w / 2.0, tuning.death_line_y))
    .with_groups(groups::SENSOR);
    ctx.spawn_with_body(Entity::new(id).with_tag(tags::DEATH_LINE), desc, ColliderMaterial::default())
}
