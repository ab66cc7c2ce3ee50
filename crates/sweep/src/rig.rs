//! The three-coil test rig.
//!
//! Every run in a batch shares these constants; the sweep only varies the
//! values in a [`Combination`].

use coilgun_core::{GroupId, LabelPosition, ModelRef};
use coilgun_launch::{
    BodyProperties, CoilResistance, CoilSpec, ConfigError, DischargeCircuit, Drag, DragLaw,
    EmpiricalDrag, Friction, LaunchConfig, ProjectileSpec,
};
use uom::si::{
    area::square_inch,
    capacitance::farad,
    electrical_resistance::ohm,
    f64::{Area, Capacitance, ElectricalResistance, Length, Mass},
    length::{inch, meter},
    mass::gram,
};

use crate::{Combination, DragSpec, Environment, ModelVariant, SweepConfig, SweepError, TurnsSpec};

/// Number of drive coils on the rig.
pub const COILS: usize = 3;

/// Name of the solver circuit shared by all coils.
pub const CIRCUIT: &str = "New Circuit";

const COIL_RADIUS_IN: f64 = 1.7345;
const COIL_GROUPS: [u32; COILS] = [2, 3, 4];
const RIG_TURNS: [u32; COILS] = [500, 500, 420];

/// Measured winding resistance of each coil in the physical layout, in ohms.
const RIG_RESISTANCE: [f64; COILS] = [3.7, 3.8, 3.0];

/// 18 AWG wire, in ohms per inch.
const WIRE_OHMS_PER_INCH: f64 = 6.385 / 12_000.0;
const TURN_LENGTH_IN: f64 = 12.67;

const CAPACITANCE_F: f64 = 0.03;
const DISCHARGE_RESISTOR_OHM: f64 = 1.8;

const SLUG_GROUP: GroupId = GroupId(1);
const SLUG_LENGTH_IN: f64 = 1.3;
const SLUG_MASS_G: f64 = 60.0;
const SLED_MASS_G: f64 = 50.0;
const BODY_MASS_G: f64 = 90.0;

/// Water held in the internal baffles when submerged.
const BAFFLE_WATER_G: f64 = 10.0;

const SLED_AREA_SQ_IN: f64 = 2.505;
const PAYLOAD_AREA_SQ_IN: f64 = 1.31104;
const PAYLOAD_DRAG_COEFFICIENT: f64 = 0.2708;

impl ModelVariant {
    /// Solver model file for this layout.
    #[must_use]
    pub fn file_name(self) -> &'static str {
        match self {
            Self::Condensed => "ThreeCoilModelAxi.fem",
            Self::Spaced => "ThreeCoilModelAxi_Spaced.fem",
            Self::Actual => "ThreeCoilModelAxi_actual.fem",
        }
    }

    /// Axial coil centers, in inches.
    fn coil_centers(self) -> [f64; COILS] {
        match self {
            Self::Condensed => [2.5, 5.0, 7.5],
            Self::Spaced => [-0.5, 5.0, 10.5],
            Self::Actual => [2.0, 5.0, 8.0],
        }
    }

    /// Where coil 1 starts, in inches. The slug is drawn centered here.
    fn coil_1_start(self) -> f64 {
        match self {
            Self::Condensed => 1.5,
            Self::Spaced => -1.5,
            Self::Actual => 1.0,
        }
    }

    fn resistance(self, coil: usize) -> CoilResistance {
        match self {
            Self::Actual => {
                CoilResistance::Fixed(ElectricalResistance::new::<ohm>(RIG_RESISTANCE[coil]))
            }
            Self::Condensed | Self::Spaced => CoilResistance::Wire {
                ohms_per_meter: WIRE_OHMS_PER_INCH / Length::new::<inch>(1.0).get::<meter>(),
                turn_length: Length::new::<inch>(TURN_LENGTH_IN),
            },
        }
    }
}

impl Environment {
    /// Position past which the slug counts as having left the barrel.
    #[must_use]
    pub fn exit_threshold(self) -> Length {
        match self {
            Self::Dry => Length::new::<inch>(12.85),
            Self::Submerged => Length::new::<inch>(8.6),
        }
    }

    /// Position at which a run ends.
    #[must_use]
    pub fn end_position(self) -> Length {
        match self {
            Self::Dry => Length::new::<inch>(13.5),
            Self::Submerged => Length::new::<inch>(10.0),
        }
    }

    fn drag(self) -> Drag {
        match self {
            Self::Dry => Drag::air(),
            Self::Submerged => Drag::water(),
        }
    }
}

impl TurnsSpec {
    fn per_coil(self) -> [u32; COILS] {
        match self {
            Self::Uniform(turns) => [turns; COILS],
            Self::Preset(_) => RIG_TURNS,
        }
    }
}

/// Reference to the configured model file inside the model directory.
#[must_use]
pub fn model(config: &SweepConfig) -> ModelRef {
    let dir = config.model_dir.trim_end_matches('/');
    if dir.is_empty() {
        ModelRef::new(config.model.file_name())
    } else {
        ModelRef::new(format!("{dir}/{}", config.model.file_name()))
    }
}

fn grams(value: f64) -> Mass {
    Mass::new::<gram>(value)
}

/// Builds the kernel configuration for one combination.
///
/// # Errors
///
/// Returns a [`SweepError`] if the batch timing is invalid.
pub fn launch_config(
    config: &SweepConfig,
    combination: &Combination,
) -> Result<LaunchConfig, SweepError> {
    let variant = config.model;
    let environment = config.environment;
    let submerged = environment.is_submerged();

    let thresholds = [
        Length::new::<inch>(0.0),
        combination.coil_2_threshold,
        combination.coil_3_threshold,
    ];
    let turns = combination.turns.per_coil();
    let coils = (0..COILS)
        .map(|k| CoilSpec {
            label: LabelPosition {
                radial: Length::new::<inch>(COIL_RADIUS_IN),
                axial: Length::new::<inch>(variant.coil_centers()[k]),
            },
            center: Length::new::<inch>(variant.coil_centers()[k]),
            turns: turns[k],
            resistance: variant.resistance(k),
            voltage: combination.voltage,
            group: GroupId(COIL_GROUPS[k]),
            threshold: thresholds[k],
        })
        .collect();

    let payload_mass = grams(BODY_MASS_G) + combination.added_mass;
    let mut mass = grams(SLUG_MASS_G + SLED_MASS_G);
    if config.body_loaded {
        mass += payload_mass;
    }
    if submerged {
        mass += grams(BAFFLE_WATER_G);
    }

    let mut drag = environment.drag();
    let drag_coefficient = match combination.drag {
        DragSpec::Coefficient(cd) => cd,
        DragSpec::Preset(_) => {
            drag.law = DragLaw::Empirical(EmpiricalDrag::submerged());
            0.0
        }
    };

    let release = (config.payload_release && config.body_loaded).then_some(BodyProperties {
        mass: payload_mass,
        area: Area::new::<square_inch>(PAYLOAD_AREA_SQ_IN),
        drag_coefficient: PAYLOAD_DRAG_COEFFICIENT,
    });

    let half_length = Length::new::<inch>(SLUG_LENGTH_IN / 2.0);
    let coil_1_start = Length::new::<inch>(variant.coil_1_start());

    Ok(LaunchConfig {
        coils,
        circuit: DischargeCircuit::new(
            Capacitance::new::<farad>(CAPACITANCE_F),
            ElectricalResistance::new::<ohm>(DISCHARGE_RESISTOR_OHM),
        )
        .map_err(ConfigError::from)?,
        circuit_name: CIRCUIT.to_string(),
        projectile: ProjectileSpec {
            start: combination.starting_position - half_length + coil_1_start,
            half_length,
            body: BodyProperties {
                mass,
                area: Area::new::<square_inch>(SLED_AREA_SQ_IN),
                drag_coefficient,
            },
            release,
            group: SLUG_GROUP,
            geometry_origin: coil_1_start,
        },
        drag,
        friction: Friction::default(),
        timing: config.timing()?,
        end_position: environment.end_position(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use uom::si::mass::kilogram;

    fn first(config: &SweepConfig) -> LaunchConfig {
        let combination = config.combinations().next().unwrap();
        launch_config(config, &combination).unwrap()
    }

    #[test]
    fn default_run_matches_the_physical_rig() {
        let launch = first(&SweepConfig::default());

        for (coil, center) in launch.coils.iter().zip([2.0, 5.0, 8.0]) {
            assert_relative_eq!(coil.center.get::<inch>(), center, epsilon = 1e-12);
        }
        let turns: Vec<u32> = launch.coils.iter().map(|c| c.turns).collect();
        assert_eq!(turns, RIG_TURNS);
        assert_eq!(
            launch.coils[1].resistance.resolve(500),
            ElectricalResistance::new::<ohm>(3.8)
        );

        // 60 g slug, 50 g sled, 90 g body, 10 g baffle water.
        assert_relative_eq!(
            launch.projectile.body.mass.get::<kilogram>(),
            0.21,
            epsilon = 1e-12
        );
        assert_relative_eq!(
            launch.projectile.release.unwrap().mass.get::<kilogram>(),
            0.09,
            epsilon = 1e-12
        );
        assert_relative_eq!(launch.projectile.start.get::<inch>(), 0.35, epsilon = 1e-12);
        assert_relative_eq!(
            launch.projectile.geometry_origin.get::<inch>(),
            1.0,
            epsilon = 1e-12
        );
        assert_relative_eq!(launch.end_position.get::<inch>(), 10.0, epsilon = 1e-12);
        assert!(matches!(launch.drag.law, DragLaw::Empirical(_)));
        assert_eq!(launch.projectile.body.drag_coefficient, 0.0);
        assert_eq!(launch.circuit_name, CIRCUIT);
        assert!(launch.bank().is_ok());
    }

    #[test]
    fn dry_unloaded_sled_has_no_payload() {
        let mut config = SweepConfig {
            environment: Environment::Dry,
            body_loaded: false,
            ..SweepConfig::default()
        };
        config.parameters.drag_coefficient = vec![DragSpec::Coefficient(0.8)];

        let launch = first(&config);
        assert_relative_eq!(
            launch.projectile.body.mass.get::<kilogram>(),
            0.11,
            epsilon = 1e-12
        );
        assert_eq!(launch.projectile.release, None);
        assert_eq!(launch.drag.law, DragLaw::Quadratic);
        assert_eq!(launch.projectile.body.drag_coefficient, 0.8);
        assert_relative_eq!(launch.end_position.get::<inch>(), 13.5, epsilon = 1e-12);
    }

    #[test]
    fn wound_coils_use_wire_resistance() {
        let mut config = SweepConfig {
            model: ModelVariant::Spaced,
            ..SweepConfig::default()
        };
        config.parameters.turns = vec![TurnsSpec::Uniform(100)];

        let launch = first(&config);
        let expected = WIRE_OHMS_PER_INCH * TURN_LENGTH_IN * 100.0;
        for coil in &launch.coils {
            assert_relative_eq!(
                coil.resistance.resolve(coil.turns).get::<ohm>(),
                expected,
                epsilon = 1e-9
            );
        }
        assert_relative_eq!(launch.projectile.start.get::<inch>(), -2.15, epsilon = 1e-12);
    }

    #[test]
    fn thresholds_follow_the_combination() {
        let mut config = SweepConfig::default();
        config.parameters.coil_2_threshold = vec![1.5];
        config.parameters.coil_3_threshold = vec![0.25];

        let launch = first(&config);
        for (coil, threshold) in launch.coils.iter().zip([0.0, 1.5, 0.25]) {
            assert_relative_eq!(coil.threshold.get::<inch>(), threshold, epsilon = 1e-12);
        }
    }

    #[test]
    fn model_lives_in_the_model_directory() {
        let config = SweepConfig::default();
        assert_eq!(model(&config).as_str(), "Models/ThreeCoilModelAxi_actual.fem");

        let config = SweepConfig {
            model: ModelVariant::Condensed,
            model_dir: String::new(),
            ..SweepConfig::default()
        };
        assert_eq!(model(&config).as_str(), "ThreeCoilModelAxi.fem");
    }
}
