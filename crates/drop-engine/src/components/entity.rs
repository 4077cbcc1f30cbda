use glam::Vec2;
use crate::api::types::EntityId;
use crate::components::sprite::Sprite;
#[cfg(feature = "physics")]
use crate::core::physics::PhysicsBody;

/// Fat Entity: a single struct with optional components.
/// Game code tells entities apart by `tag` ("ball", "wall", ...).
#[derive(Debug, Clone)]
pub struct Entity {
    /// Unique identifier.
    pub id: EntityId,
    /// String tag for finding entities by role.
    pub tag: String,
    /// Inactive entities are kept in the scene but not rendered.
    pub active: bool,
    /// Position in world space. Synced from the physics body after every step.
    pub pos: Vec2,
    /// Rotation in radians.
    pub rotation: f32,
    /// Rendered size in world units (a ball of radius r has size 2r).
    pub size: f32,
    /// Visual. Entities without a sprite (walls, sensors) are not drawn.
    pub sprite: Option<Sprite>,
    /// Physics body, only with the "physics" feature.
    #[cfg(feature = "physics")]
    pub body: Option<PhysicsBody>,
}

impl Entity {
    /// Create a new entity with the given ID at the origin.
    pub fn new(id: EntityId) -> Self {
        Self {
            id,
            tag: String::new(),
            active: true,
            pos: Vec2::ZERO,
            rotation: 0.0,
            size: 1.0,
            sprite: None,
            #[cfg(feature = "physics")]
            body: None,
        }
    }

    // -- Builder pattern --

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    pub fn with_pos(mut self, pos: Vec2) -> Self {
        self.pos = pos;
        self
    }

    pub fn with_size(mut self, size: f32) -> Self {
        self.size = size;
        self
    }

    pub fn with_sprite(mut self, sprite: Sprite) -> Self {
        self.sprite = Some(sprite);
        self
    }

    #[cfg(feature = "physics")]
    pub fn with_body(mut self, body: PhysicsBody) -> Self {
        self.body = Some(body);
        self
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tag == tag
    }
}
