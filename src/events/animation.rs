//! Animation lifecycle events.
//!
//! When a [`SheetAnimation`](crate::components::animation::SheetAnimation)
//! reaches its iteration limit during an update sweep, the animation is
//! detached from its instance and an [`AnimationFinishedEvent`] is triggered.
//!
//! # Example
//!
//! ```ignore
//! manager.add_observer(|trigger: On<AnimationFinishedEvent>| {
//!     log::info!("{:?} finished after {} iterations", trigger.event().entity, trigger.event().iterations);
//! });
//! ```

use bevy_ecs::prelude::*;

/// Event emitted when an animation self-terminates.
#[derive(Event, Debug, Clone, PartialEq, Eq)]
pub struct AnimationFinishedEvent {
    /// The sprite instance whose animation ended.
    pub entity: Entity,
    /// Boundary completions performed before the end.
    pub iterations: u32,
}
