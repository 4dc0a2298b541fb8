//! Animation update sweep.
//!
//! [`animation`] advances every live sprite instance's
//! [`SheetAnimation`](crate::components::animation::SheetAnimation) by one
//! tick.
//!
//! # Sweep Flow
//!
//! 1. Query every entity with a [`Sprite`] and a `SheetAnimation`
//! 2. Skip instances paused at the instance level
//! 3. Advance the animation against the sprite's bitmap size
//! 4. On exhaustion, flag the sprite and queue removal of the animation
//!
//! Removal goes through [`Commands`], so the set being iterated is never
//! structurally modified during the sweep. The removal and the
//! [`AnimationFinishedEvent`] are applied once the schedule finishes.

use bevy_ecs::prelude::*;
use log::debug;

use crate::components::animation::{SheetAnimation, Step};
use crate::components::sprite::Sprite;
use crate::events::animation::AnimationFinishedEvent;

/// Advance all animations by one tick.
pub fn animation(
    mut query: Query<(Entity, &mut Sprite, &mut SheetAnimation)>,
    mut commands: Commands,
) {
    for (entity, mut sprite, mut anim) in query.iter_mut() {
        if sprite.paused || anim.paused {
            continue;
        }
        let w = i32::try_from(sprite.width()).unwrap_or(i32::MAX);
        let h = i32::try_from(sprite.height()).unwrap_or(i32::MAX);
        if anim.advance(w, h) == Step::Exhausted {
            debug!(
                "Animation on {:?} finished after {} iterations",
                entity,
                anim.iteration_count()
            );
            sprite.animation_destroyed = true;
            commands.entity(entity).remove::<SheetAnimation>();
            commands.trigger(AnimationFinishedEvent {
                entity,
                iterations: anim.iteration_count(),
            });
        }
    }
}
