use uom::si::f64::{Acceleration, Force, Length, Mass, Time, Velocity};

/// Projectile position and velocity after one step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Motion {
    pub position: Length,
    pub velocity: Velocity,

    /// Distance moved during the step.
    pub displacement: Length,
}

/// Acceleration of a body of `mass` under `net` force.
#[must_use]
pub fn acceleration(net: Force, mass: Mass) -> Acceleration {
    net / mass
}

/// Advances position and velocity by one step under constant acceleration.
///
/// Position uses the velocity at the start of the step:
///
/// ```text
/// x' = x + v·dt + ½·a·dt²
/// v' = v + a·dt
/// ```
#[must_use]
pub fn integrate(
    position: Length,
    velocity: Velocity,
    acceleration: Acceleration,
    dt: Time,
) -> Motion {
    let displacement = velocity * dt + acceleration * dt * dt * 0.5;
    Motion {
        position: position + displacement,
        velocity: velocity + acceleration * dt,
        displacement,
    }
}
