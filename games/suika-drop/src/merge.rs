//! Merging pairs: two equal balls shrink toward each other until one of them
//! drops under the radius limit, then both are replaced by one bigger ball.

use std::collections::BTreeMap;

use drop_engine::{EngineContext, EntityId, JointDesc, JointHandle};
use glam::Vec2;

use crate::arena::tags;
use crate::config::Tuning;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergePhase {
    Shrinking,
    Resolved,
}

/// One side of a merging pair. Entries always come in symmetric pairs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MergeEntry {
    pub body: EntityId,
    pub partner: EntityId,
    /// Radius before shrinking started; decides the score and the next tier.
    pub radius: f32,
    pub phase: MergePhase,
    joint: Option<JointHandle>,
}

/// A pair that finished shrinking this step. Both bodies still exist.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MergeOutcome {
    pub body: EntityId,
    pub partner: EntityId,
    pub radius: f32,
    pub midpoint: Vec2,
}

/// Per-step shrink factor. Kept in [0.5, 1) whatever the timestep.
pub fn shrink_scale(tuning: &Tuning, dt: f32) -> f32 {
    (tuning.shrink_base - tuning.shrink_rate * dt).clamp(0.5, 0.999)
}

#[derive(Debug, Default)]
pub struct MergeTracker {
    entries: BTreeMap<EntityId, MergeEntry>,
}

impl MergeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_tracked(&self, id: EntityId) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn get(&self, id: EntityId) -> Option<&MergeEntry> {
        self.entries.get(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Start merging `a` and `b` if both are free dynamic balls of equal radius.
    pub fn begin(&mut self, ctx: &mut EngineContext, a: EntityId, b: EntityId, tuning: &Tuning) -> bool {
        if a == b || self.is_tracked(a) || self.is_tracked(b) {
            return false;
        }
        let is_ball = |id: EntityId| {
            ctx.scene.get(id).is_some_and(|e| e.has_tag(tags::BALL)) && ctx.is_dynamic(id)
        };
        if !is_ball(a) || !is_ball(b) {
            return false;
        }
        let (Some(radius_a), Some(radius_b)) = (ctx.ball_radius(a), ctx.ball_radius(b)) else {
            return false;
        };
        if radius_a != radius_b {
            return false;
        }

        let joint = if tuning.link_pairs {
            ctx.link(a, b, JointDesc::centers_spring(tuning.link_stiffness, tuning.link_damping))
        } else {
            None
        };

        for (body, partner) in [(a, b), (b, a)] {
            self.entries.insert(body, MergeEntry {
                body,
                partner,
                radius: radius_a,
                phase: MergePhase::Shrinking,
                joint,
            });
        }
        log::debug!("merge started: {:?} + {:?} (radius {})", a, b, radius_a);
        true
    }

    /// Advance every merging pair by one step. Pairs whose body went missing are
    /// dropped without an outcome.
    pub fn update(&mut self, ctx: &mut EngineContext, tuning: &Tuning, dt: f32) -> Vec<MergeOutcome> {
        let ids: Vec<EntityId> = self.entries.keys().copied().collect();

        for id in ids {
            let Some(entry) = self.entries.get(&id).copied() else {
                continue;
            };
            if entry.phase == MergePhase::Resolved {
                continue;
            }
            let (Some(radius), true) = (ctx.ball_radius(id), ctx.scene.contains(entry.partner)) else {
                self.discard(ctx, id);
                continue;
            };

            if radius < tuning.merge_radius_limit {
                self.mark_resolved(id, entry.partner);
            } else {
                ctx.set_ball_radius(id, radius * shrink_scale(tuning, dt));
                if dt > 0.0 {
                    let pos = ctx.scene.get(id).map(|e| e.pos).unwrap_or_default();
                    let target = ctx.scene.get(entry.partner).map(|e| e.pos).unwrap_or(pos);
                    ctx.set_velocity(id, (target - pos) / (tuning.approach_divisor * dt));
                }
            }
        }

        self.take_resolved(ctx)
    }

    /// Forget the pair containing `id`, leaving both bodies in play.
    pub fn discard(&mut self, ctx: &mut EngineContext, id: EntityId) {
        let Some(entry) = self.entries.remove(&id) else {
            return;
        };
        if self.entries.get(&entry.partner).is_some_and(|p| p.partner == id) {
            self.entries.remove(&entry.partner);
        }
        if let Some(joint) = entry.joint {
            ctx.unlink(joint);
        }
        log::debug!("merge discarded: {:?} + {:?}", id, entry.partner);
    }

    /// Drop every pair and its joint.
    pub fn clear(&mut self, ctx: &mut EngineContext) {
        let ids: Vec<EntityId> = self.entries.keys().copied().collect();
        for id in ids {
            self.discard(ctx, id);
        }
    }

    fn mark_resolved(&mut self, a: EntityId, b: EntityId) {
        for id in [a, b] {
            if let Some(entry) = self.entries.get_mut(&id) {
                entry.phase = MergePhase::Resolved;
            }
        }
    }

    /// Remove resolved pairs, both entries at once.
    fn take_resolved(&mut self, ctx: &mut EngineContext) -> Vec<MergeOutcome> {
        let resolved: Vec<MergeEntry> = self
            .entries
            .values()
            .filter(|e| e.phase == MergePhase::Resolved && e.body < e.partner)
            .copied()
            .collect();

        resolved
            .into_iter()
            .filter_map(|entry| {
                self.entries.remove(&entry.body);
                self.entries.remove(&entry.partner);
                if let Some(joint) = entry.joint {
                    ctx.unlink(joint);
                }
                let a = ctx.scene.get(entry.body)?.pos;
                let b = ctx.scene.get(entry.partner)?.pos;
                Some(MergeOutcome {
                    body: entry.body,
                    partner: entry.partner,
                    radius: entry.radius,
                    midpoint: (a + b) / 2.0,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spawn::spawn_ball;

    fn ball(ctx: &mut EngineContext, tuning: &Tuning, radius: f32, pos: Vec2) -> EntityId {
        let tier = tuning.sizes.tier_of(radius).unwrap();
        spawn_ball(ctx, tuning, tier, pos, false)
    }

    fn setup() -> (EngineContext, Tuning) {
        let mut ctx = EngineContext::new();
        ctx.physics.set_dt(1.0 / 60.0);
        (ctx, Tuning::default())
    }

    #[test]
    fn begin_requires_equal_free_dynamic_balls() {
        let (mut ctx, tuning) = setup();
        let a = ball(&mut ctx, &tuning, 25.0, Vec2::new(100.0, 400.0));
        let b = ball(&mut ctx, &tuning, 25.0, Vec2::new(160.0, 400.0));
        let c = ball(&mut ctx, &tuning, 35.0, Vec2::new(300.0, 400.0));
        let held = spawn_ball(&mut ctx, &tuning, tuning.sizes.smallest(), Vec2::new(200.0, 50.0), true);
        let mut merges = MergeTracker::new();

        assert!(!merges.begin(&mut ctx, a, c, &tuning));
        assert!(!merges.begin(&mut ctx, a, held, &tuning));
        assert!(!merges.begin(&mut ctx, a, a, &tuning));
        assert!(merges.begin(&mut ctx, a, b, &tuning));
        assert_eq!(merges.len(), 2);
        assert_eq!(ctx.physics.joint_count(), 1);

        // Already tracked bodies never join a second pair
        let d = ball(&mut ctx, &tuning, 25.0, Vec2::new(100.0, 600.0));
        assert!(!merges.begin(&mut ctx, a, d, &tuning));
        assert_eq!(merges.get(a).unwrap().partner, b);
        assert_eq!(merges.get(b).unwrap().partner, a);
    }

    #[test]
    fn shrinks_and_pulls_toward_partner() {
        let (mut ctx, mut tuning) = setup();
        tuning.link_pairs = false;
        let a = ball(&mut ctx, &tuning, 50.0, Vec2::new(100.0, 400.0));
        let b = ball(&mut ctx, &tuning, 50.0, Vec2::new(200.0, 400.0));
        let mut merges = MergeTracker::new();
        merges.begin(&mut ctx, a, b, &tuning);

        let outcomes = merges.update(&mut ctx, &tuning, 1.0 / 60.0);
        assert!(outcomes.is_empty());

        let scale = shrink_scale(&tuning, 1.0 / 60.0);
        assert!((ctx.ball_radius(a).unwrap() - 50.0 * scale).abs() < 1e-3);
        assert!(ctx.velocity(a).x > 0.0);
        assert!(ctx.velocity(b).x < 0.0);
        // Original radius is kept for scoring
        assert_eq!(merges.get(a).unwrap().radius, 50.0);
    }

    #[test]
    fn resolves_both_entries_together() {
        let (mut ctx, tuning) = setup();
        let a = ball(&mut ctx, &tuning, 25.0, Vec2::new(100.0, 400.0));
        let b = ball(&mut ctx, &tuning, 25.0, Vec2::new(160.0, 400.0));
        let mut merges = MergeTracker::new();
        merges.begin(&mut ctx, a, b, &tuning);

        let mut outcomes = Vec::new();
        for _ in 0..100 {
            outcomes = merges.update(&mut ctx, &tuning, 1.0 / 60.0);
            if !outcomes.is_empty() {
                break;
            }
        }

        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].radius, 25.0);
        assert!(merges.is_empty());
        assert_eq!(ctx.physics.joint_count(), 0);
        assert!((outcomes[0].midpoint - Vec2::new(130.0, 400.0)).length() < 1.0);
    }

    #[test]
    fn missing_partner_discards_pair() {
        let (mut ctx, tuning) = setup();
        let a = ball(&mut ctx, &tuning, 25.0, Vec2::new(100.0, 400.0));
        let b = ball(&mut ctx, &tuning, 25.0, Vec2::new(160.0, 400.0));
        let mut merges = MergeTracker::new();
        merges.begin(&mut ctx, a, b, &tuning);

        ctx.despawn(b);
        let outcomes = merges.update(&mut ctx, &tuning, 1.0 / 60.0);
        assert!(outcomes.is_empty());
        assert!(merges.is_empty());
        assert_eq!(ctx.ball_radius(a), Some(25.0));
    }

    #[test]
    fn shrink_scale_is_bounded() {
        let tuning = Tuning::default();
        assert!(shrink_scale(&tuning, 1.0 / 60.0) < 0.95);
        assert_eq!(shrink_scale(&tuning, 10.0), 0.5);
        assert!(shrink_scale(&tuning, 0.0) < 1.0);
    }
}
