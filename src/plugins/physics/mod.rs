//! Physics plugin: avian2d as collision-event source and mover primitive.
//!
//! Gameplay never reads contact manifolds; it only needs who started touching
//! whom (`CollisionStart`) and sets `LinearVelocity` on bodies.

use avian2d::prelude::*;
use bevy::prelude::*;

use crate::common::tunables::Tunables;

pub fn plugin(app: &mut App) {
    let unit = app.world().resource::<Tunables>().physics_length_unit;
    app.add_plugins(PhysicsPlugins::default().with_length_unit(unit));
    app.insert_resource(Gravity(Vec2::ZERO));
}

/// The gameplay entities behind a collision event: the rigid body when the
/// collider is attached to one, else the collider itself.
#[inline]
pub fn contact_owners(ev: &CollisionStart) -> (Entity, Entity) {
    (ev.body1.unwrap_or(ev.collider1), ev.body2.unwrap_or(ev.collider2))
}
