use serde::{Deserialize, Serialize};
use uom::{
    ConstZero,
    si::{
        acceleration::meter_per_second_squared,
        area::square_meter,
        f64::{Acceleration, Force, Mass, MassDensity, Velocity},
        force::newton,
        mass_density::kilogram_per_cubic_meter,
        velocity::{inch_per_second, meter_per_second},
    },
};

use crate::BodyProperties;

/// A drag fit of the form `F = quadratic · v·|v| + linear · v`.
///
/// Coefficients are stored in SI: newtons per (m/s)² and newtons per (m/s).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmpiricalDrag {
    pub quadratic: f64,
    pub linear: f64,
}

impl EmpiricalDrag {
    /// Converts a fit made with velocity in inches per second and force in newtons.
    #[must_use]
    pub fn from_inch_fit(quadratic: f64, linear: f64) -> Self {
        let meters_per_inch = Velocity::new::<inch_per_second>(1.0).get::<meter_per_second>();
        Self {
            quadratic: quadratic / (meters_per_inch * meters_per_inch),
            linear: linear / meters_per_inch,
        }
    }

    /// The CFD fit for the reference projectile fully submerged in water.
    #[must_use]
    pub fn submerged() -> Self {
        Self::from_inch_fit(0.00328, -0.00134)
    }

    #[must_use]
    pub fn force(&self, velocity: Velocity) -> Force {
        let v = velocity.get::<meter_per_second>();
        Force::new::<newton>(self.quadratic * v * v.abs() + self.linear * v)
    }
}

/// How drag is computed.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DragLaw {
    #[default]
    Disabled,

    /// `0.5 · Cd · ρ · v·|v| · A` with the body's current coefficient and area.
    Quadratic,

    /// A fitted polynomial for the armature, replaced by the quadratic law
    /// once the payload has released.
    Empirical(EmpiricalDrag),
}

/// Fluid drag on the projectile.
///
/// Drag opposes motion, and the aggregator subtracts it from the net force.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Drag {
    pub fluid_density: MassDensity,
    pub law: DragLaw,
}

impl Drag {
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            fluid_density: MassDensity::ZERO,
            law: DragLaw::Disabled,
        }
    }

    #[must_use]
    pub fn air() -> Self {
        Self {
            fluid_density: MassDensity::new::<kilogram_per_cubic_meter>(1.225),
            law: DragLaw::Quadratic,
        }
    }

    #[must_use]
    pub fn water() -> Self {
        Self {
            fluid_density: MassDensity::new::<kilogram_per_cubic_meter>(1000.0),
            law: DragLaw::Quadratic,
        }
    }

    /// Drag force for a body moving at `velocity`, positive along the motion.
    #[must_use]
    pub fn force(&self, velocity: Velocity, body: &BodyProperties, released: bool) -> Force {
        match self.law {
            DragLaw::Disabled => Force::ZERO,
            DragLaw::Empirical(fit) if !released => fit.force(velocity),
            DragLaw::Empirical(_) | DragLaw::Quadratic => {
                let v = velocity.get::<meter_per_second>();
                let pressure = 0.5
                    * self.fluid_density.get::<kilogram_per_cubic_meter>()
                    * v
                    * v.abs();
                Force::new::<newton>(pressure * body.drag_coefficient * body.area.get::<square_meter>())
            }
        }
    }
}

/// Kinetic friction against the barrel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Friction {
    pub coefficient: f64,
    pub gravity: Acceleration,

    /// Speeds below this count as stationary.
    pub static_speed: Velocity,
}

impl Friction {
    /// Friction coefficient of the reference sled on its rail.
    pub const RAIL_COEFFICIENT: f64 = 0.01;

    #[must_use]
    pub fn new(coefficient: f64) -> Self {
        Self {
            coefficient,
            gravity: Acceleration::new::<meter_per_second_squared>(9.81),
            static_speed: Velocity::new::<inch_per_second>(0.005),
        }
    }

    #[must_use]
    pub fn disabled() -> Self {
        Self::new(0.0)
    }

    /// Friction force on a body of `mass`, signed against the motion.
    #[must_use]
    pub fn force(&self, velocity: Velocity, mass: Mass) -> Force {
        if velocity.abs() < self.static_speed {
            return Force::ZERO;
        }
        let weight: Force = mass * self.gravity;
        weight * (-self.coefficient * velocity.get::<meter_per_second>().signum())
    }
}

impl Default for Friction {
    fn default() -> Self {
        Self::new(Self::RAIL_COEFFICIENT)
    }
}

/// The forces acting on the projectile during one step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForceBreakdown {
    pub magnetic: Force,
    pub drag: Force,
    pub friction: Force,

    /// `magnetic − drag + friction`.
    pub net: Force,
}

impl ForceBreakdown {
    #[must_use]
    pub fn new(magnetic: Force, drag: Force, friction: Force) -> Self {
        Self {
            magnetic,
            drag,
            friction,
            net: magnetic - drag + friction,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use uom::si::{f64::Area, mass::kilogram};

    fn body() -> BodyProperties {
        BodyProperties {
            mass: Mass::new::<kilogram>(0.2),
            area: Area::new::<square_meter>(0.01),
            drag_coefficient: 0.5,
        }
    }

    fn mps(value: f64) -> Velocity {
        Velocity::new::<meter_per_second>(value)
    }

    #[test]
    fn quadratic_drag_opposes_motion() {
        let drag = Drag::water();
        let forward = drag.force(mps(2.0), &body(), false);
        let backward = drag.force(mps(-2.0), &body(), false);

        // 0.5 · 0.5 · 1000 · 4 · 0.01
        assert_relative_eq!(forward.get::<newton>(), 10.0, epsilon = 1e-12);
        assert_relative_eq!(backward.get::<newton>(), -10.0, epsilon = 1e-12);
    }

    #[test]
    fn empirical_fit_matches_inch_units() {
        let fit = EmpiricalDrag::submerged();
        let v = Velocity::new::<inch_per_second>(100.0);
        let expected = 0.00328 * 100.0 * 100.0 - 0.00134 * 100.0;
        assert_relative_eq!(fit.force(v).get::<newton>(), expected, epsilon = 1e-9);
    }

    #[test]
    fn empirical_drag_switches_to_quadratic_after_release() {
        let drag = Drag {
            fluid_density: MassDensity::new::<kilogram_per_cubic_meter>(1000.0),
            law: DragLaw::Empirical(EmpiricalDrag::submerged()),
        };
        let v = mps(2.0);

        let before = drag.force(v, &body(), false);
        let after = drag.force(v, &body(), true);

        assert_relative_eq!(
            before.get::<newton>(),
            EmpiricalDrag::submerged().force(v).get::<newton>()
        );
        assert_relative_eq!(after.get::<newton>(), 10.0, epsilon = 1e-12);
    }

    #[test]
    fn disabled_drag_is_zero() {
        assert_eq!(Drag::disabled().force(mps(50.0), &body(), false), Force::ZERO);
    }

    #[test]
    fn friction_vanishes_at_rest() {
        let friction = Friction::default();
        let mass = Mass::new::<kilogram>(0.2);

        assert_eq!(friction.force(Velocity::ZERO, mass), Force::ZERO);
        assert_eq!(
            friction.force(Velocity::new::<inch_per_second>(0.004), mass),
            Force::ZERO
        );

        let moving = friction.force(mps(3.0), mass);
        assert_relative_eq!(moving.get::<newton>(), -0.01 * 0.2 * 9.81, epsilon = 1e-12);
        let reversing = friction.force(mps(-3.0), mass);
        assert_relative_eq!(reversing.get::<newton>(), 0.01 * 0.2 * 9.81, epsilon = 1e-12);
    }

    #[test]
    fn net_force_combines_components() {
        let breakdown = ForceBreakdown::new(
            Force::new::<newton>(40.0),
            Force::new::<newton>(5.0),
            Force::new::<newton>(-1.0),
        );
        assert_relative_eq!(breakdown.net.get::<newton>(), 34.0);
    }
}
