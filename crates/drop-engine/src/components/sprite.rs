/// Visual of an entity: which frame of the game's sprite sheet to draw.
///
/// Ball games use `frame` as the size-tier index, so every tier gets its own picture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sprite {
    /// Frame index in the sprite sheet.
    pub frame: u32,
    /// Opacity (0.0 = invisible, 1.0 = opaque).
    pub alpha: f32,
}

impl Sprite {
    pub fn frame(frame: u32) -> Self {
        Self { frame, alpha: 1.0 }
    }
}

impl Default for Sprite {
    fn default() -> Self {
        Self::frame(0)
    }
}
