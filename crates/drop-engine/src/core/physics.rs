use glam::Vec2;
use rapier2d::parry::query::PointQuery;
use rapier2d::prelude::*;
use std::collections::HashSet;
use std::sync::Mutex;

use crate::api::types::EntityId;

// ---------------------------------------------------------------------------
// Conversion helpers (private): glam to nalgebra and back
// ---------------------------------------------------------------------------

fn vec2_to_na(v: Vec2) -> nalgebra::Vector2<f32> {
    nalgebra::Vector2::new(v.x, v.y)
}

fn na_to_vec2(v: &nalgebra::Vector2<f32>) -> Vec2 {
    Vec2::new(v.x, v.y)
}

fn na_iso_to_pos_rot(iso: &nalgebra::Isometry2<f32>) -> (Vec2, f32) {
    let pos = Vec2::new(iso.translation.x, iso.translation.y);
    let rot = iso.rotation.angle();
    (pos, rot)
}

/// Unordered pair key: the smaller id first.
fn pair_key(a: EntityId, b: EntityId) -> (EntityId, EntityId) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// The kind of rigid body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyType {
    Dynamic,
    Fixed,
    KinematicPositionBased,
}

impl BodyType {
    fn to_rapier(self) -> RigidBodyType {
        match self {
            BodyType::Dynamic => RigidBodyType::Dynamic,
            BodyType::Fixed => RigidBodyType::Fixed,
            BodyType::KinematicPositionBased => RigidBodyType::KinematicPositionBased,
        }
    }
}

/// Shape description for a collider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColliderDesc {
    Ball { radius: f32 },
    Cuboid { half_width: f32, half_height: f32 },
}

impl ColliderDesc {
    fn build_collider(&self) -> ColliderBuilder {
        match *self {
            ColliderDesc::Ball { radius } => ColliderBuilder::ball(radius),
            ColliderDesc::Cuboid { half_width, half_height } => {
                ColliderBuilder::cuboid(half_width, half_height)
            }
        }
    }
}

/// Physical material properties for a collider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColliderMaterial {
    pub restitution: f32,
    pub friction: f32,
    pub density: f32,
}

impl Default for ColliderMaterial {
    fn default() -> Self {
        Self {
            restitution: 0.3,
            friction: 0.5,
            density: 1.0,
        }
    }
}

/// Category/mask filtering. Two colliders interact when each one's
/// `memberships` intersects the other's `filter`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollisionGroups {
    pub memberships: u32,
    pub filter: u32,
}

impl CollisionGroups {
    pub const ALL: Self = Self { memberships: u32::MAX, filter: u32::MAX };

    pub const fn new(memberships: u32, filter: u32) -> Self {
        Self { memberships, filter }
    }

    /// Whether colliders with these two group settings would interact.
    pub fn interacts_with(&self, other: &CollisionGroups) -> bool {
        (self.memberships & other.filter) != 0 && (other.memberships & self.filter) != 0
    }

    fn to_rapier(self) -> InteractionGroups {
        InteractionGroups::new(
            Group::from_bits_truncate(self.memberships),
            Group::from_bits_truncate(self.filter),
        )
    }
}

impl Default for CollisionGroups {
    fn default() -> Self {
        Self::ALL
    }
}

/// Builder for describing a rigid body before creation.
#[derive(Debug, Clone)]
pub struct BodyDesc {
    pub body_type: BodyType,
    pub position: Vec2,
    pub velocity: Vec2,
    pub gravity_scale: f32,
    pub fixed_rotation: bool,
    pub ccd: bool,
    pub collider: ColliderDesc,
    pub linear_damping: f32,
    /// Sensors report overlaps but never push other bodies.
    pub sensor: bool,
    pub groups: CollisionGroups,
}

impl BodyDesc {
    fn with_type(body_type: BodyType, collider: ColliderDesc) -> Self {
        Self {
            body_type,
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            gravity_scale: if body_type == BodyType::Dynamic { 1.0 } else { 0.0 },
            fixed_rotation: body_type != BodyType::Dynamic,
            ccd: false,
            collider,
            linear_damping: 0.0,
            sensor: false,
            groups: CollisionGroups::ALL,
        }
    }

    /// Create a dynamic body description with the given collider shape.
    pub fn dynamic(collider: ColliderDesc) -> Self {
        Self::with_type(BodyType::Dynamic, collider)
    }

    /// Create a fixed (static) body description with the given collider shape.
    pub fn fixed(collider: ColliderDesc) -> Self {
        Self::with_type(BodyType::Fixed, collider)
    }

    /// A fixed body that only reports overlaps.
    pub fn sensor(collider: ColliderDesc) -> Self {
        Self::with_type(BodyType::Fixed, collider).with_sensor(true)
    }

    pub fn with_position(mut self, pos: Vec2) -> Self {
        self.position = pos;
        self
    }

    pub fn with_velocity(mut self, vel: Vec2) -> Self {
        self.velocity = vel;
        self
    }

    pub fn with_gravity_scale(mut self, scale: f32) -> Self {
        self.gravity_scale = scale;
        self
    }

    pub fn with_fixed_rotation(mut self, fixed: bool) -> Self {
        self.fixed_rotation = fixed;
        self
    }

    pub fn with_ccd(mut self, enabled: bool) -> Self {
        self.ccd = enabled;
        self
    }

    pub fn with_linear_damping(mut self, damping: f32) -> Self {
        self.linear_damping = damping;
        self
    }

    pub fn with_sensor(mut self, sensor: bool) -> Self {
        self.sensor = sensor;
        self
    }

    pub fn with_groups(mut self, groups: CollisionGroups) -> Self {
        self.groups = groups;
        self
    }
}

/// Handle pair stored on an Entity, referencing Rapier internals.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicsBody {
    pub body_handle: RigidBodyHandle,
    pub collider_handle: ColliderHandle,
}

/// Handle to a joint in the physics simulation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointHandle(pub(crate) ImpulseJointHandle);

/// Description of a joint to create between two bodies.
#[derive(Debug, Clone, Copy)]
pub enum JointDesc {
    /// Rigidly locks two bodies together at the given local anchors.
    Fixed { anchor_a: Vec2, anchor_b: Vec2 },
    /// Spring that pulls the anchors toward `rest_length` apart.
    /// A zero rest length drags two bodies onto each other.
    Spring {
        anchor_a: Vec2,
        anchor_b: Vec2,
        rest_length: f32,
        stiffness: f32,
        damping: f32,
    },
}

impl JointDesc {
    /// Zero-length spring between the two body centers.
    pub fn centers_spring(stiffness: f32, damping: f32) -> Self {
        JointDesc::Spring {
            anchor_a: Vec2::ZERO,
            anchor_b: Vec2::ZERO,
            rest_length: 0.0,
            stiffness,
            damping,
        }
    }
}

/// A collision event between two entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollisionPair {
    pub entity_a: EntityId,
    pub entity_b: EntityId,
    /// `true` when the contact just started, `false` when it ended.
    pub started: bool,
    /// `true` when one of the colliders is a sensor (an overlap, not a contact).
    pub sensor: bool,
}

impl CollisionPair {
    /// The other participant, if `id` is one of the two.
    pub fn other(&self, id: EntityId) -> Option<EntityId> {
        if self.entity_a == id {
            Some(self.entity_b)
        } else if self.entity_b == id {
            Some(self.entity_a)
        } else {
            None
        }
    }
}

// ---------------------------------------------------------------------------
// WASM-safe event collector (no crossbeam)
// ---------------------------------------------------------------------------

struct DirectEventCollector {
    collisions: Mutex<Vec<CollisionEvent>>,
}

impl DirectEventCollector {
    fn new() -> Self {
        Self {
            collisions: Mutex::new(Vec::new()),
        }
    }

    fn drain_collisions(&self) -> Vec<CollisionEvent> {
        self.collisions
            .lock()
            .map(|mut events| std::mem::take(&mut *events))
            .unwrap_or_default()
    }
}

impl EventHandler for DirectEventCollector {
    fn handle_collision_event(
        &self,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        event: CollisionEvent,
        _contact_pair: Option<&ContactPair>,
    ) {
        if let Ok(mut events) = self.collisions.lock() {
            events.push(event);
        }
    }

    fn handle_contact_force_event(
        &self,
        _dt: f32,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        _contact_pair: &ContactPair,
        _total_force_magnitude: f32,
    ) {
    }
}

// ---------------------------------------------------------------------------
// PhysicsWorld
// ---------------------------------------------------------------------------

/// Wraps all Rapier2D boilerplate into a single struct.
///
/// Besides the raw start/stop events of the last step, the world remembers which
/// entity pairs are currently touching, so games can ask about sustained contact.
pub struct PhysicsWorld {
    gravity: nalgebra::Vector2<f32>,
    integration_parameters: IntegrationParameters,
    physics_pipeline: PhysicsPipeline,
    island_manager: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    pub(crate) bodies: RigidBodySet,
    pub(crate) colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    query_pipeline: QueryPipeline,
    event_collector: DirectEventCollector,
    touching: HashSet<(EntityId, EntityId)>,
}

impl PhysicsWorld {
    /// Create a new physics world with the given gravity vector.
    /// Y points down, so positive Y gravity pulls bodies toward the floor.
    pub fn new(gravity: Vec2) -> Self {
        Self {
            gravity: vec2_to_na(gravity),
            integration_parameters: IntegrationParameters::default(),
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
            event_collector: DirectEventCollector::new(),
            touching: HashSet::new(),
        }
    }

    /// Set the integration timestep.
    pub fn set_dt(&mut self, dt: f32) {
        self.integration_parameters.dt = dt;
    }

    pub fn dt(&self) -> f32 {
        self.integration_parameters.dt
    }

    /// Create a rigid body + collider and return handles.
    /// The EntityId is stored in the body's `user_data` for collision lookups.
    pub fn create_body(
        &mut self,
        entity_id: EntityId,
        desc: &BodyDesc,
        material: ColliderMaterial,
    ) -> PhysicsBody {
        let rb = RigidBodyBuilder::new(desc.body_type.to_rapier())
            .translation(vec2_to_na(desc.position))
            .linvel(vec2_to_na(desc.velocity))
            .gravity_scale(desc.gravity_scale)
            .locked_axes(if desc.fixed_rotation {
                LockedAxes::ROTATION_LOCKED
            } else {
                LockedAxes::empty()
            })
            .ccd_enabled(desc.ccd)
            .linear_damping(desc.linear_damping)
            .user_data(entity_id.0 as u128)
            .build();

        let body_handle = self.bodies.insert(rb);

        let collider = desc
            .collider
            .build_collider()
            .restitution(material.restitution)
            .friction(material.friction)
            .density(material.density)
            .sensor(desc.sensor)
            .collision_groups(desc.groups.to_rapier())
            .active_events(ActiveEvents::COLLISION_EVENTS)
            .build();

        let collider_handle =
            self.colliders
                .insert_with_parent(collider, body_handle, &mut self.bodies);

        PhysicsBody {
            body_handle,
            collider_handle,
        }
    }

    /// Remove a body, its colliders and attached joints from the simulation.
    /// Contacts involving the body are forgotten immediately, not on the next step.
    pub fn remove_body(&mut self, body: &PhysicsBody) {
        if let Some(rb) = self.bodies.get(body.body_handle) {
            let id = EntityId(rb.user_data as u32);
            self.touching.retain(|&(a, b)| a != id && b != id);
        }
        self.bodies.remove(
            body.body_handle,
            &mut self.island_manager,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            true,
        );
    }

    /// Step the simulation and collect collision events into the provided Vec.
    pub fn step_into(&mut self, collision_events: &mut Vec<CollisionPair>) {
        self.physics_pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &(),
            &self.event_collector,
        );

        for event in self.event_collector.drain_collisions() {
            let (h1, h2, started) = match event {
                CollisionEvent::Started(h1, h2, _) => (h1, h2, true),
                CollisionEvent::Stopped(h1, h2, _) => (h1, h2, false),
            };

            // Colliders removed since the last step no longer resolve; their
            // contacts were already dropped by `remove_body`.
            let (Some(a), Some(b)) = (self.collider_to_entity(h1), self.collider_to_entity(h2))
            else {
                continue;
            };

            if started {
                self.touching.insert(pair_key(a, b));
            } else {
                self.touching.remove(&pair_key(a, b));
            }

            collision_events.push(CollisionPair {
                entity_a: a,
                entity_b: b,
                started,
                sensor: event.sensor(),
            });
        }
    }

    /// Entities currently touching (or overlapping, for sensors) the given entity.
    pub fn touching(&self, id: EntityId) -> Vec<EntityId> {
        let mut ids: Vec<EntityId> = self
            .touching
            .iter()
            .filter_map(|&(a, b)| {
                if a == id {
                    Some(b)
                } else if b == id {
                    Some(a)
                } else {
                    None
                }
            })
            .collect();
        ids.sort();
        ids
    }

    /// Entities whose (non-sensor) collider contains the world point.
    pub fn entities_at_point(&self, point: Vec2) -> Vec<EntityId> {
        let pt = nalgebra::Point2::new(point.x, point.y);
        self.colliders
            .iter()
            .filter(|(_, c)| !c.is_sensor())
            .filter(|(_, c)| c.shape().contains_point(c.position(), &pt))
            .filter_map(|(handle, _)| self.collider_to_entity(handle))
            .collect()
    }

    /// Set the linear velocity of a body directly.
    pub fn set_velocity(&mut self, body: &PhysicsBody, vel: Vec2) {
        if let Some(rb) = self.bodies.get_mut(body.body_handle) {
            rb.set_linvel(vec2_to_na(vel), true);
        }
    }

    /// Get the current linear velocity of a body.
    pub fn velocity(&self, body: &PhysicsBody) -> Vec2 {
        self.bodies
            .get(body.body_handle)
            .map(|rb| na_to_vec2(rb.linvel()))
            .unwrap_or(Vec2::ZERO)
    }

    /// Teleport a body. Meant for fixed bodies that follow the pointer.
    pub fn set_position(&mut self, body: &PhysicsBody, pos: Vec2) {
        if let Some(rb) = self.bodies.get_mut(body.body_handle) {
            rb.set_translation(vec2_to_na(pos), true);
        }
    }

    /// Get the current position and rotation of a body.
    pub fn body_position(&self, body: &PhysicsBody) -> (Vec2, f32) {
        self.bodies
            .get(body.body_handle)
            .map(|rb| na_iso_to_pos_rot(rb.position()))
            .unwrap_or((Vec2::ZERO, 0.0))
    }

    /// Whether the body is simulated (as opposed to fixed or kinematic).
    pub fn is_dynamic(&self, body: &PhysicsBody) -> bool {
        self.bodies
            .get(body.body_handle)
            .is_some_and(|rb| rb.is_dynamic())
    }

    /// Replace the radius of a ball collider, keeping its material.
    /// Returns `false` when the collider is gone or is not a ball.
    pub fn set_ball_radius(&mut self, body: &PhysicsBody, radius: f32) -> bool {
        match self.colliders.get_mut(body.collider_handle) {
            Some(collider) if collider.shape().as_ball().is_some() => {
                collider.set_shape(SharedShape::ball(radius));
                true
            }
            _ => false,
        }
    }

    /// Radius of a ball collider, `None` for other shapes or removed bodies.
    pub fn ball_radius(&self, body: &PhysicsBody) -> Option<f32> {
        let collider = self.colliders.get(body.collider_handle)?;
        collider.shape().as_ball().map(|ball| ball.radius)
    }

    /// Number of rigid bodies in the simulation.
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    // -- Joint methods --

    /// Create a joint between two bodies. Returns a handle for later removal.
    pub fn create_joint(
        &mut self,
        body_a: &PhysicsBody,
        body_b: &PhysicsBody,
        desc: &JointDesc,
    ) -> JointHandle {
        let handle = match *desc {
            JointDesc::Fixed { anchor_a, anchor_b } => {
                let joint = FixedJointBuilder::new()
                    .local_anchor1(nalgebra::Point2::new(anchor_a.x, anchor_a.y))
                    .local_anchor2(nalgebra::Point2::new(anchor_b.x, anchor_b.y))
                    .build();
                self.impulse_joints.insert(body_a.body_handle, body_b.body_handle, joint, true)
            }
            JointDesc::Spring { anchor_a, anchor_b, rest_length, stiffness, damping } => {
                let joint = SpringJointBuilder::new(rest_length, stiffness, damping)
                    .local_anchor1(nalgebra::Point2::new(anchor_a.x, anchor_a.y))
                    .local_anchor2(nalgebra::Point2::new(anchor_b.x, anchor_b.y))
                    .build();
                self.impulse_joints.insert(body_a.body_handle, body_b.body_handle, joint, true)
            }
        };
        JointHandle(handle)
    }

    /// Remove a joint. Removing a joint that already went away with one of its bodies is a no-op.
    pub fn remove_joint(&mut self, handle: JointHandle) {
        self.impulse_joints.remove(handle.0, true);
    }

    /// Number of joints in the simulation.
    pub fn joint_count(&self) -> usize {
        self.impulse_joints.len()
    }

    // -- private helpers --

    fn collider_to_entity(&self, collider_handle: ColliderHandle) -> Option<EntityId> {
        let collider = self.colliders.get(collider_handle)?;
        let body_handle = collider.parent()?;
        let body = self.bodies.get(body_handle)?;
        Some(EntityId(body.user_data as u32))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn ball(world: &mut PhysicsWorld, id: u32, pos: Vec2, radius: f32) -> PhysicsBody {
        world.create_body(
            EntityId(id),
            &BodyDesc::dynamic(ColliderDesc::Ball { radius }).with_position(pos),
            ColliderMaterial::default(),
        )
    }

    fn step(world: &mut PhysicsWorld, n: usize) -> Vec<CollisionPair> {
        let mut events = Vec::new();
        for _ in 0..n {
            world.step_into(&mut events);
        }
        events
    }

    #[test]
    fn create_and_remove_body() {
        let mut world = PhysicsWorld::new(Vec2::ZERO);
        let body = ball(&mut world, 1, Vec2::ZERO, 10.0);
        assert_eq!(world.body_count(), 1);
        world.remove_body(&body);
        assert_eq!(world.body_count(), 0);
    }

    #[test]
    fn gravity_pulls_dynamic_body_down() {
        let mut world = PhysicsWorld::new(Vec2::new(0.0, 100.0));
        world.set_dt(1.0 / 60.0);
        let body = ball(&mut world, 1, Vec2::ZERO, 5.0);

        step(&mut world, 10);
        let (pos, _) = world.body_position(&body);
        assert!(pos.y > 0.0, "Body should fall: y={}", pos.y);
    }

    #[test]
    fn fixed_body_does_not_move() {
        let mut world = PhysicsWorld::new(Vec2::new(0.0, 100.0));
        let body = world.create_body(
            EntityId(1),
            &BodyDesc::fixed(ColliderDesc::Cuboid { half_width: 100.0, half_height: 10.0 })
                .with_position(Vec2::new(0.0, 500.0)),
            ColliderMaterial::default(),
        );
        assert!(!world.is_dynamic(&body));

        step(&mut world, 10);
        let (pos, _) = world.body_position(&body);
        assert!((pos.y - 500.0).abs() < 0.001, "Fixed body should not move: y={}", pos.y);
    }

    #[test]
    fn overlapping_balls_report_start_and_stay_touching() {
        let mut world = PhysicsWorld::new(Vec2::ZERO);
        ball(&mut world, 1, Vec2::new(0.0, 0.0), 10.0);
        ball(&mut world, 2, Vec2::new(19.0, 0.0), 10.0);

        let events = step(&mut world, 1);
        let started: Vec<_> = events.iter().filter(|e| e.started).collect();
        assert_eq!(started.len(), 1);
        assert_eq!(started[0].other(EntityId(1)), Some(EntityId(2)));
        assert!(!started[0].sensor);
        assert_eq!(world.touching(EntityId(1)), vec![EntityId(2)]);
    }

    #[test]
    fn sensor_overlap_is_flagged_and_tracked() {
        let mut world = PhysicsWorld::new(Vec2::ZERO);
        world.create_body(
            EntityId(10),
            &BodyDesc::sensor(ColliderDesc::Cuboid { half_width: 100.0, half_height: 2.0 }),
            ColliderMaterial::default(),
        );
        let body = ball(&mut world, 1, Vec2::new(0.0, 0.0), 10.0);

        let events = step(&mut world, 1);
        assert!(events.iter().any(|e| e.started && e.sensor));
        assert_eq!(world.touching(EntityId(10)), vec![EntityId(1)]);

        // Removing the ball forgets the overlap right away
        world.remove_body(&body);
        assert!(world.touching(EntityId(10)).is_empty());
    }

    #[test]
    fn disjoint_groups_never_touch() {
        let mut world = PhysicsWorld::new(Vec2::ZERO);
        world.create_body(
            EntityId(1),
            &BodyDesc::dynamic(ColliderDesc::Ball { radius: 10.0 })
                .with_groups(CollisionGroups::new(0b01, 0b01)),
            ColliderMaterial::default(),
        );
        world.create_body(
            EntityId(2),
            &BodyDesc::dynamic(ColliderDesc::Ball { radius: 10.0 })
                .with_position(Vec2::new(5.0, 0.0))
                .with_groups(CollisionGroups::new(0b10, 0b00)),
            ColliderMaterial::default(),
        );

        let events = step(&mut world, 5);
        assert!(events.is_empty());
        assert!(world.touching(EntityId(1)).is_empty());
    }

    #[test]
    fn group_interaction_is_symmetric() {
        let ball = CollisionGroups::new(0b001, 0b111);
        let wall = CollisionGroups::new(0b010, 0b001);
        let ghost = CollisionGroups::new(0b100, 0b000);
        assert!(ball.interacts_with(&wall));
        assert!(wall.interacts_with(&ball));
        assert!(!ghost.interacts_with(&ball));
        assert!(!ball.interacts_with(&ghost));
    }

    #[test]
    fn set_velocity_directly() {
        let mut world = PhysicsWorld::new(Vec2::ZERO);
        let body = ball(&mut world, 1, Vec2::ZERO, 5.0);
        world.set_velocity(&body, Vec2::new(50.0, -30.0));
        let vel = world.velocity(&body);
        assert!((vel.x - 50.0).abs() < 0.001);
        assert!((vel.y + 30.0).abs() < 0.001);
    }

    #[test]
    fn ball_radius_can_be_replaced() {
        let mut world = PhysicsWorld::new(Vec2::ZERO);
        let body = ball(&mut world, 1, Vec2::ZERO, 25.0);
        assert_eq!(world.ball_radius(&body), Some(25.0));
        assert!(world.set_ball_radius(&body, 12.5));
        assert_eq!(world.ball_radius(&body), Some(12.5));

        let wall = world.create_body(
            EntityId(2),
            &BodyDesc::fixed(ColliderDesc::Cuboid { half_width: 5.0, half_height: 5.0 }),
            ColliderMaterial::default(),
        );
        assert!(!world.set_ball_radius(&wall, 3.0));
        assert_eq!(world.ball_radius(&wall), None);
    }

    #[test]
    fn fixed_body_follows_set_position() {
        let mut world = PhysicsWorld::new(Vec2::ZERO);
        let body = world.create_body(
            EntityId(1),
            &BodyDesc::fixed(ColliderDesc::Ball { radius: 5.0 }).with_position(Vec2::new(10.0, 50.0)),
            ColliderMaterial::default(),
        );
        world.set_position(&body, Vec2::new(200.0, 50.0));
        let (pos, _) = world.body_position(&body);
        assert!((pos.x - 200.0).abs() < 0.001);
    }

    #[test]
    fn point_query_finds_bodies_but_not_sensors() {
        let mut world = PhysicsWorld::new(Vec2::ZERO);
        ball(&mut world, 1, Vec2::new(100.0, 100.0), 20.0);
        world.create_body(
            EntityId(2),
            &BodyDesc::sensor(ColliderDesc::Cuboid { half_width: 500.0, half_height: 500.0 }),
            ColliderMaterial::default(),
        );
        // Colliders get their world pose on the first step
        step(&mut world, 1);

        assert_eq!(world.entities_at_point(Vec2::new(105.0, 95.0)), vec![EntityId(1)]);
        assert!(world.entities_at_point(Vec2::new(300.0, 300.0)).is_empty());
    }

    #[test]
    fn spring_joint_pulls_bodies_together() {
        let mut world = PhysicsWorld::new(Vec2::ZERO);
        world.set_dt(1.0 / 60.0);
        let body_a = ball(&mut world, 1, Vec2::new(0.0, 0.0), 5.0);
        let body_b = ball(&mut world, 2, Vec2::new(100.0, 0.0), 5.0);

        let handle = world.create_joint(&body_a, &body_b, &JointDesc::centers_spring(500.0, 5.0));
        assert_eq!(world.joint_count(), 1);
        step(&mut world, 60);

        let (pos_a, _) = world.body_position(&body_a);
        let (pos_b, _) = world.body_position(&body_b);
        assert!(pos_a.distance(pos_b) < 100.0, "spring should pull bodies closer");

        world.remove_joint(handle);
        assert_eq!(world.joint_count(), 0);
    }

    #[test]
    fn removing_body_drops_its_joints() {
        let mut world = PhysicsWorld::new(Vec2::ZERO);
        let body_a = ball(&mut world, 1, Vec2::ZERO, 5.0);
        let body_b = ball(&mut world, 2, Vec2::new(10.0, 0.0), 5.0);
        let handle = world.create_joint(&body_a, &body_b, &JointDesc::Fixed {
            anchor_a: Vec2::ZERO,
            anchor_b: Vec2::ZERO,
        });

        world.remove_body(&body_a);
        assert_eq!(world.joint_count(), 0);
        // Stale handle removal is harmless
        world.remove_joint(handle);
    }
}
