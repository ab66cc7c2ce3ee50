use coilgun_core::GroupId;
use serde::{Deserialize, Serialize};
use uom::{
    ConstZero,
    si::f64::{Area, Length, Mass, Velocity},
};

use crate::Motion;

/// Mass and aerodynamic properties of the moving body.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BodyProperties {
    pub mass: Mass,

    /// Frontal cross-sectional area.
    pub area: Area,

    pub drag_coefficient: f64,
}

/// Static description of the projectile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectileSpec {
    /// Center position at `t = 0`.
    pub start: Length,

    /// Half the armature length.
    pub half_length: Length,

    /// Properties before payload release.
    pub body: BodyProperties,

    /// Properties after the payload separates, if it does.
    pub release: Option<BodyProperties>,

    /// Solver group of the armature body.
    pub group: GroupId,

    /// Center position of the body as drawn in the solver model.
    pub geometry_origin: Length,
}

/// The projectile's evolving state during a run.
#[derive(Debug, Clone, PartialEq)]
pub struct Projectile {
    position: Length,
    velocity: Velocity,
    half_length: Length,
    body: BodyProperties,
    release: Option<BodyProperties>,
    released: bool,
    group: GroupId,
}

impl Projectile {
    /// Places a projectile at rest at its start position.
    #[must_use]
    pub fn new(spec: &ProjectileSpec) -> Self {
        Self {
            position: spec.start,
            velocity: Velocity::ZERO,
            half_length: spec.half_length,
            body: spec.body,
            release: spec.release,
            released: false,
            group: spec.group,
        }
    }

    #[must_use]
    pub fn position(&self) -> Length {
        self.position
    }

    #[must_use]
    pub fn velocity(&self) -> Velocity {
        self.velocity
    }

    #[must_use]
    pub fn half_length(&self) -> Length {
        self.half_length
    }

    /// Front of the armature.
    #[must_use]
    pub fn leading_edge(&self) -> Length {
        self.position + self.half_length
    }

    /// Properties currently in effect.
    #[must_use]
    pub fn body(&self) -> BodyProperties {
        self.body
    }

    #[must_use]
    pub fn released(&self) -> bool {
        self.released
    }

    #[must_use]
    pub fn group(&self) -> GroupId {
        self.group
    }

    /// Releases the payload once the projectile reaches `point`.
    ///
    /// Returns `true` only on the step the release happens. Release is
    /// irreversible and a projectile without payload properties never releases.
    pub fn release_at(&mut self, point: Length) -> bool {
        if self.released || self.position < point {
            return false;
        }
        match self.release {
            Some(payload) => {
                self.body = payload;
                self.released = true;
                true
            }
            None => false,
        }
    }

    pub(crate) fn apply(&mut self, motion: Motion) {
        self.position = motion.position;
        self.velocity = motion.velocity;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use uom::si::{area::square_meter, length::meter, mass::kilogram, velocity::meter_per_second};

    fn spec(release: bool) -> ProjectileSpec {
        let body = BodyProperties {
            mass: Mass::new::<kilogram>(0.2),
            area: Area::new::<square_meter>(0.0016),
            drag_coefficient: 0.8,
        };
        ProjectileSpec {
            start: Length::new::<meter>(0.01),
            half_length: Length::new::<meter>(0.0165),
            body,
            release: release.then_some(BodyProperties {
                mass: Mass::new::<kilogram>(0.09),
                area: Area::new::<square_meter>(0.000_85),
                drag_coefficient: 0.2708,
            }),
            group: GroupId(1),
            geometry_origin: Length::new::<meter>(0.0254),
        }
    }

    #[test]
    fn starts_at_rest() {
        let projectile = Projectile::new(&spec(false));
        assert_eq!(projectile.velocity(), Velocity::ZERO);
        assert_eq!(projectile.position(), Length::new::<meter>(0.01));
        assert_eq!(projectile.leading_edge(), Length::new::<meter>(0.01 + 0.0165));
    }

    #[test]
    fn payload_releases_exactly_once() {
        let mut projectile = Projectile::new(&spec(true));
        let point = Length::new::<meter>(0.2);

        assert!(!projectile.release_at(point));

        projectile.apply(Motion {
            position: Length::new::<meter>(0.21),
            velocity: Velocity::new::<meter_per_second>(20.0),
            displacement: Length::new::<meter>(0.2),
        });
        assert!(projectile.release_at(point));
        assert!(projectile.released());
        assert_eq!(projectile.body().mass, Mass::new::<kilogram>(0.09));

        assert!(!projectile.release_at(point));
        assert_eq!(projectile.body().drag_coefficient, 0.2708);
    }

    #[test]
    fn no_payload_means_no_release() {
        let mut projectile = Projectile::new(&spec(false));
        projectile.apply(Motion {
            position: Length::new::<meter>(1.0),
            velocity: Velocity::ZERO,
            displacement: Length::new::<meter>(0.99),
        });
        assert!(!projectile.release_at(Length::new::<meter>(0.2)));
        assert!(!projectile.released());
    }
}
