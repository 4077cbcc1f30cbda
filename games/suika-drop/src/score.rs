use drop_engine::{EngineContext, GameEvent};

use crate::sizes::{SizeError, SizeTable};

/// Game event kinds sent to the page.
pub mod game_events {
    /// a = current score
    pub const SCORE: f32 = 1.0;
    /// a = final score
    pub const GAME_OVER: f32 = 2.0;
    /// a, b = position, c = new radius
    pub const MERGED: f32 = 3.0;
}

#[derive(Debug, Default)]
pub struct ScoreKeeper {
    score: u32,
}

impl ScoreKeeper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    /// Award the merge score of `radius` and publish the new total.
    pub fn add_score(&mut self, ctx: &mut EngineContext, sizes: &SizeTable, radius: f32) -> Result<u32, SizeError> {
        let tier = sizes.tier_of(radius)?;
        self.score = self.score.saturating_add(tier.score);
        self.publish(ctx);
        Ok(self.score)
    }

    /// Zero the score when no ball is in play. Returns `true` if it reset.
    pub fn reset_if_board_empty(&mut self, ctx: &mut EngineContext, ball_count: usize) -> bool {
        if ball_count > 0 {
            return false;
        }
        self.reset(ctx);
        true
    }

    pub fn reset(&mut self, ctx: &mut EngineContext) {
        self.score = 0;
        self.publish(ctx);
    }

    pub fn publish(&self, ctx: &mut EngineContext) {
        ctx.emit_event(GameEvent::new(game_events::SCORE, self.score as f32, 0.0, 0.0));
    }

    pub fn publish_game_over(&self, ctx: &mut EngineContext) {
        ctx.emit_event(GameEvent::new(game_events::GAME_OVER, self.score as f32, 0.0, 0.0));
    }
}
