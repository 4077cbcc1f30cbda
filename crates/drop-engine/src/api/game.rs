use crate::core::scene::Scene;
use crate::api::types::{EntityId, GameEvent};
use crate::input::queue::InputQueue;
use crate::renderer::instance::RenderBuffer;
#[cfg(feature = "physics")]
use crate::core::physics::{
    PhysicsWorld, BodyDesc, ColliderMaterial, CollisionPair, JointDesc, JointHandle,
};
#[cfg(feature = "physics")]
use crate::components::entity::Entity;
#[cfg(feature = "physics")]
use glam::Vec2;

/// Configuration for the engine, provided by the game.
#[derive(Debug, Clone)]
pub struct GameConfig {
    /// Fixed timestep in seconds (default: 1/60).
    pub fixed_dt: f32,
    /// World width in game units.
    pub world_width: f32,
    /// World height in game units.
    pub world_height: f32,
    /// Maximum number of render instances (default: 256).
    pub max_instances: usize,
    /// Maximum number of game events per frame (default: 32).
    pub max_events: usize,
    /// Gravity vector for physics simulation. Default: zero (no gravity).
    /// For Y-down coordinate systems, use positive Y for downward gravity.
    #[cfg(feature = "physics")]
    pub gravity: glam::Vec2,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            fixed_dt: 1.0 / 60.0,
            world_width: 560.0,
            world_height: 800.0,
            max_instances: 256,
            max_events: 32,
            #[cfg(feature = "physics")]
            gravity: glam::Vec2::ZERO,
        }
    }
}

/// The core contract every game must fulfill.
pub trait Game {
    /// Return engine configuration. Called before init and again after a tuning reload.
    fn config(&self) -> GameConfig {
        GameConfig::default()
    }

    /// Setup initial state, spawn entities, configure the scene.
    fn init(&mut self, ctx: &mut EngineContext);

    /// One fixed step of game logic. The runner steps physics right after.
    fn update(&mut self, ctx: &mut EngineContext, input: &InputQueue);

    /// Optional read-only render pass for custom render commands.
    fn render(&self, _ctx: &mut RenderContext) {}

    /// Replace runtime tuning from a JSON document. Returns `true` when accepted.
    fn load_tuning(&mut self, _json: &str) -> bool {
        log::warn!("this game does not accept runtime tuning");
        false
    }
}

/// Mutable access to engine state, passed to Game::init and Game::update.
pub struct EngineContext {
    pub scene: Scene,
    pub events: Vec<GameEvent>,
    next_id: u32,
    #[cfg(feature = "physics")]
    pub physics: PhysicsWorld,
    #[cfg(feature = "physics")]
    collision_events: Vec<CollisionPair>,
}

impl EngineContext {
    pub fn new() -> Self {
        Self {
            scene: Scene::new(),
            events: Vec::new(),
            next_id: 1,
            #[cfg(feature = "physics")]
            physics: PhysicsWorld::new(Vec2::ZERO),
            #[cfg(feature = "physics")]
            collision_events: Vec::new(),
        }
    }

    /// Create an EngineContext with a custom gravity vector.
    #[cfg(feature = "physics")]
    pub fn with_gravity(gravity: Vec2) -> Self {
        Self {
            physics: PhysicsWorld::new(gravity),
            ..Self::new()
        }
    }

    /// Generate the next unique entity ID.
    pub fn next_id(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Emit a game event to be forwarded to the page.
    pub fn emit_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Clear per-frame transient data.
    /// Collision events are left alone: they belong to the last physics step
    /// and the next update still has to see them.
    pub fn clear_frame_data(&mut self) {
        self.events.clear();
    }

    // -- Physics convenience methods --

    /// Spawn an entity with a physics body. Returns the EntityId.
    /// The entity's position is set from the BodyDesc.
    #[cfg(feature = "physics")]
    pub fn spawn_with_body(
        &mut self,
        entity: Entity,
        desc: BodyDesc,
        material: ColliderMaterial,
    ) -> EntityId {
        let id = entity.id;
        let body = self.physics.create_body(id, &desc, material);
        let entity = entity.with_pos(desc.position).with_body(body);
        self.scene.spawn(entity);
        id
    }

    /// Despawn an entity, cleaning up its physics body if present.
    /// Returns `false` when the entity was already gone.
    #[cfg(feature = "physics")]
    pub fn despawn(&mut self, id: EntityId) -> bool {
        match self.scene.despawn(id) {
            Some(entity) => {
                if let Some(body) = &entity.body {
                    self.physics.remove_body(body);
                }
                // Pending events must not point at a removed entity
                self.collision_events
                    .retain(|pair| pair.entity_a != id && pair.entity_b != id);
                true
            }
            None => false,
        }
    }

    /// Set the linear velocity of an entity's physics body.
    #[cfg(feature = "physics")]
    pub fn set_velocity(&mut self, id: EntityId, vel: Vec2) {
        if let Some(body) = self.scene.get(id).and_then(|e| e.body) {
            self.physics.set_velocity(&body, vel);
        }
    }

    /// Get the linear velocity of an entity's physics body.
    #[cfg(feature = "physics")]
    pub fn velocity(&self, id: EntityId) -> Vec2 {
        self.scene
            .get(id)
            .and_then(|e| e.body.as_ref())
            .map(|body| self.physics.velocity(body))
            .unwrap_or(Vec2::ZERO)
    }

    /// Move an entity and its body. Used for the fixed in-hand ball.
    #[cfg(feature = "physics")]
    pub fn set_position(&mut self, id: EntityId, pos: Vec2) {
        if let Some(entity) = self.scene.get_mut(id) {
            entity.pos = pos;
            if let Some(body) = &entity.body {
                self.physics.set_position(body, pos);
            }
        }
    }

    /// Resize a ball entity. The rendered size follows the collider.
    #[cfg(feature = "physics")]
    pub fn set_ball_radius(&mut self, id: EntityId, radius: f32) -> bool {
        let Some(entity) = self.scene.get_mut(id) else {
            return false;
        };
        let Some(body) = entity.body else {
            return false;
        };
        if self.physics.set_ball_radius(&body, radius) {
            entity.size = radius * 2.0;
            true
        } else {
            false
        }
    }

    /// Current collider radius of a ball entity.
    #[cfg(feature = "physics")]
    pub fn ball_radius(&self, id: EntityId) -> Option<f32> {
        let body = self.scene.get(id)?.body?;
        self.physics.ball_radius(&body)
    }

    #[cfg(feature = "physics")]
    pub fn is_dynamic(&self, id: EntityId) -> bool {
        self.scene
            .get(id)
            .and_then(|e| e.body.as_ref())
            .is_some_and(|body| self.physics.is_dynamic(body))
    }

    /// Link two entities with a joint. `None` if either has no body.
    #[cfg(feature = "physics")]
    pub fn link(&mut self, a: EntityId, b: EntityId, desc: JointDesc) -> Option<JointHandle> {
        let body_a = self.scene.get(a)?.body?;
        let body_b = self.scene.get(b)?.body?;
        Some(self.physics.create_joint(&body_a, &body_b, &desc))
    }

    #[cfg(feature = "physics")]
    pub fn unlink(&mut self, joint: JointHandle) {
        self.physics.remove_joint(joint);
    }

    /// Get collision events from the most recent physics step.
    #[cfg(feature = "physics")]
    pub fn collisions(&self) -> &[CollisionPair] {
        &self.collision_events
    }

    /// Entities currently in contact with `id` (sustained, not just started).
    #[cfg(feature = "physics")]
    pub fn contacts_of(&self, id: EntityId) -> Vec<EntityId> {
        self.physics.touching(id)
    }

    /// Entities whose body contains the world point. Sensors are skipped.
    #[cfg(feature = "physics")]
    pub fn entities_at(&self, point: Vec2) -> Vec<EntityId> {
        self.physics.entities_at_point(point)
    }

    /// Step the physics simulation and sync positions back to entities.
    /// Called automatically by the game runner after `Game::update()`.
    #[cfg(feature = "physics")]
    pub fn step_physics(&mut self) {
        self.collision_events.clear();
        self.physics.step_into(&mut self.collision_events);

        // Sync Rapier body positions back to entity positions
        for entity in self.scene.iter_mut() {
            if let Some(body) = &entity.body {
                let (pos, rot) = self.physics.body_position(body);
                entity.pos = pos;
                entity.rotation = rot;
            }
        }
    }
}

impl Default for EngineContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Render context for optional custom render commands.
pub struct RenderContext<'a> {
    pub render_buffer: &'a mut RenderBuffer,
}
