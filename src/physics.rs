//! Projectile integration, bounds and block collision.
//!
//! One call to [`step`] is one display refresh. The step size is fixed and
//! not scaled by wall-clock time.

use tracing::info;

use crate::config::{GameConfig, TriggerPolicy};
use crate::entities::{Block, FieldSize, RoundState, StepOutcome, Vector2D};

/// Axis-aligned box in screen space (`top < bottom`).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
}

impl Aabb {
    pub fn centered(center: Vector2D, width: f64, height: f64) -> Self {
        Self {
            left: center.x - width / 2.0,
            right: center.x + width / 2.0,
            top: center.y - height / 2.0,
            bottom: center.y + height / 2.0,
        }
    }

    /// Strict overlap: touching edges do not count.
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.right > other.left
            && self.left < other.right
            && self.bottom > other.top
            && self.top < other.bottom
    }
}

/// Screen-space y of the ground line.
pub fn ground_y(field: FieldSize, cfg: &GameConfig) -> f64 {
    field.height - cfg.ground_height
}

/// Convert a ground-relative block into a screen-space box.
pub fn block_bounds(block: &Block, field: FieldSize, cfg: &GameConfig) -> Aabb {
    let bottom = field.height - (cfg.ground_height + block.y);
    let top = field.height - (cfg.ground_height + block.y + block.height);
    Aabb {
        left: block.x,
        right: block.x + block.width,
        top,
        bottom,
    }
}

pub fn projectile_bounds(position: Vector2D, cfg: &GameConfig) -> Aabb {
    Aabb::centered(position, cfg.projectile_size.width, cfg.projectile_size.height)
}

pub fn is_out_of_bounds(position: Vector2D, field: FieldSize, cfg: &GameConfig) -> bool {
    position.y > ground_y(field, cfg) - cfg.projectile_size.height / 2.0
        || position.y < 0.0
        || position.x < 0.0
        || position.x > field.width
}

fn triggers(block: &Block, policy: TriggerPolicy) -> bool {
    match policy {
        TriggerPolicy::TargetOnly => block.is_target(),
        TriggerPolicy::AnyBlock => true,
    }
}

/// Advance the projectile by one step, returning the next round state.
///
/// Out-of-bounds proposals are rejected: the returned state equals `round`.
/// Every standing block overlapping the proposed box is flagged as hit; the
/// first trigger-worthy one (tower order, then block order) names the struck
/// tower.
pub fn step(
    round: &RoundState,
    field: FieldSize,
    cfg: &GameConfig,
) -> (RoundState, StepOutcome) {
    let position = round.projectile_position;
    let velocity = round.projectile_velocity;
    let proposed = position + velocity;

    if is_out_of_bounds(proposed, field, cfg) {
        info!(x = proposed.x, y = proposed.y, "projectile left the field");
        return (round.clone(), StepOutcome::Miss);
    }

    let body = projectile_bounds(proposed, cfg);
    let mut next = round.clone();
    let mut collided = false;
    let mut struck = None;

    for tower in next.towers.iter_mut() {
        for block in tower.blocks.iter_mut().filter(|b| !b.is_hit) {
            if !body.overlaps(&block_bounds(block, field, cfg)) {
                continue;
            }
            block.is_hit = true;
            collided = true;
            let trigger = triggers(block, cfg.trigger_policy);
            if trigger && struck.is_none() {
                struck = Some(tower.token);
            }
            info!(
                block = %block.id,
                kind = ?block.kind,
                tower = %tower.token,
                trigger,
                x = proposed.x,
                y = proposed.y,
                "block hit"
            );
        }
    }

    next.projectile_position = proposed;
    next.projectile_velocity = Vector2D::new(velocity.x * cfg.drag, velocity.y + cfg.gravity);

    let outcome = if collided {
        StepOutcome::Hit { struck }
    } else {
        StepOutcome::Flying
    };
    (next, outcome)
}

// ── Slingshot ─────────────────────────────────────────────────────────────────

/// Clamp a drag point to `max_drag_distance` from the anchor, keeping direction.
pub fn clamp_drag(anchor: Vector2D, pointer: Vector2D, cfg: &GameConfig) -> Vector2D {
    let delta = pointer - anchor;
    let dist = delta.length();
    if dist <= cfg.max_drag_distance || dist == 0.0 {
        return pointer;
    }
    anchor + delta * (cfg.max_drag_distance / dist)
}

/// Launch velocity for a release point, or `None` inside the dead zone.
///
/// Pulling down-left launches up-right.
pub fn launch_velocity(anchor: Vector2D, release: Vector2D, cfg: &GameConfig) -> Option<Vector2D> {
    let pull = anchor - release;
    if pull.x.abs() < cfg.dead_zone && pull.y.abs() < cfg.dead_zone {
        return None;
    }
    Some(pull * cfg.launch_power)
}
