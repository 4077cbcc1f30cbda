use crate::components::entity::Entity;
use crate::renderer::instance::{RenderBuffer, RenderInstance};

/// Build the render buffer from a set of entities.
/// Inactive entities and entities without a sprite are skipped.
pub fn build_render_buffer<'a>(entities: impl Iterator<Item = &'a Entity>, buffer: &mut RenderBuffer) {
    buffer.clear();

    for entity in entities {
        if !entity.active {
            continue;
        }

        let sprite = match &entity.sprite {
            Some(s) => s,
            None => continue,
        };

        let instance = RenderInstance::new(
            entity.pos.x,
            entity.pos.y,
            entity.rotation,
            entity.size,
            sprite.frame as f32,
            sprite.alpha,
        );

        if !buffer.push(instance) {
            log::warn!("render buffer full, dropping remaining instances");
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::EntityId;
    use crate::components::sprite::Sprite;
    use glam::Vec2;

    #[test]
    fn build_buffer_copies_sprite_entities() {
        let entities = vec![
            Entity::new(EntityId(1))
                .with_pos(Vec2::new(10.0, 20.0))
                .with_size(50.0)
                .with_sprite(Sprite::frame(0)),
            // Walls have no sprite
            Entity::new(EntityId(2)).with_size(20.0),
            Entity::new(EntityId(3))
                .with_pos(Vec2::new(50.0, 60.0))
                .with_size(70.0)
                .with_sprite(Sprite { frame: 1, alpha: 0.5 }),
        ];

        let mut buffer = RenderBuffer::new();
        build_render_buffer(entities.iter(), &mut buffer);

        assert_eq!(buffer.instance_count(), 2);
        let second = buffer.instances[1];
        assert_eq!(second.x, 50.0);
        assert_eq!(second.size, 70.0);
        assert_eq!(second.frame, 1.0);
        assert_eq!(second.alpha, 0.5);
    }

    #[test]
    fn inactive_entities_are_skipped() {
        let mut entity = Entity::new(EntityId(1)).with_sprite(Sprite::default());
        entity.active = false;

        let entities = vec![entity];
        let mut buffer = RenderBuffer::new();
        build_render_buffer(entities.iter(), &mut buffer);
        assert_eq!(buffer.instance_count(), 0);
    }
}
