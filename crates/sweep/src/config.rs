use std::fmt;

use coilgun_launch::{Firing, Timing, TimingTable};
use serde::{Deserialize, Serialize};
use uom::si::{f64::Time, time::millisecond, time::second};

use crate::{Combinations, SweepError, rig};

/// Coil layout of the test rig, each matching a solver model file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelVariant {
    /// Coils pressed against each other.
    Condensed,

    /// Coils spread well apart.
    Spaced,

    /// Coils in their physical rig positions.
    #[default]
    Actual,
}

impl fmt::Display for ModelVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Condensed => "condensed",
            Self::Spaced => "spaced",
            Self::Actual => "actual",
        })
    }
}

/// The fluid the barrel is filled with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Environment {
    Dry,

    #[default]
    Submerged,
}

impl Environment {
    #[must_use]
    pub fn is_submerged(self) -> bool {
        self == Self::Submerged
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Dry => "Dry",
            Self::Submerged => "Submerged",
        })
    }
}

/// Named presets that stand in for a numeric sweep value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Preset {
    /// The value measured or fitted on the physical rig.
    Actual,
}

/// Winding turns for every coil in one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TurnsSpec {
    /// The same turn count on every coil.
    Uniform(u32),

    /// The rig's wound turn counts (500, 500, 420).
    Preset(Preset),
}

impl TurnsSpec {
    #[must_use]
    pub fn is_actual(self) -> bool {
        matches!(self, Self::Preset(Preset::Actual))
    }
}

impl fmt::Display for TurnsSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uniform(turns) => write!(f, "{turns}"),
            Self::Preset(Preset::Actual) => f.write_str("actual"),
        }
    }
}

/// Drag model for one run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DragSpec {
    /// Quadratic drag with this coefficient.
    Coefficient(f64),

    /// The submerged CFD fit.
    Preset(Preset),
}

impl DragSpec {
    #[must_use]
    pub fn is_actual(self) -> bool {
        matches!(self, Self::Preset(Preset::Actual))
    }
}

impl fmt::Display for DragSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Coefficient(cd) => write!(f, "{cd}"),
            Self::Preset(Preset::Actual) => f.write_str("actual"),
        }
    }
}

/// How the coils are switched.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FiringSelection {
    #[default]
    Sequential,

    /// All coils on at once, each cut off as it is passed.
    Cutoff,

    /// Fixed pulse schedule, in milliseconds.
    Manual {
        durations_ms: Vec<f64>,
        delays_ms: Vec<f64>,
    },
}

impl FiringSelection {
    /// Builds the kernel firing mode.
    ///
    /// # Errors
    ///
    /// Returns a [`SweepError`] if a manual schedule is malformed.
    pub fn firing(&self) -> Result<Firing, SweepError> {
        match self {
            Self::Sequential => Ok(Firing::sequential()),
            Self::Cutoff => Ok(Firing::cutoff()),
            Self::Manual {
                durations_ms,
                delays_ms,
            } => {
                if durations_ms.len() != rig::COILS {
                    return Err(SweepError::TimingLength {
                        expected: rig::COILS,
                        got: durations_ms.len(),
                    });
                }
                let ms = |values: &[f64]| -> Vec<Time> {
                    values.iter().map(|v| Time::new::<millisecond>(*v)).collect()
                };
                let table = TimingTable::new(ms(durations_ms), ms(delays_ms))?;
                Ok(Firing::manual(table))
            }
        }
    }
}

/// The values swept over, in rig units.
///
/// Every list must be non-empty. Lists left out of a configuration file take
/// the rig's usual single value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Parameters {
    /// Capacitor bank voltage, in volts.
    pub voltage: Vec<f64>,

    pub turns: Vec<TurnsSpec>,

    /// Distance of the projectile tip from the start of coil 1, in inches.
    pub starting_position: Vec<f64>,

    /// Coil 2 activation threshold, in inches.
    pub coil_2_threshold: Vec<f64>,

    /// Coil 3 activation threshold, in inches.
    pub coil_3_threshold: Vec<f64>,

    /// Mass added to the payload body, in grams.
    pub added_mass: Vec<f64>,

    pub drag_coefficient: Vec<DragSpec>,
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            voltage: vec![500.0],
            turns: vec![TurnsSpec::Preset(Preset::Actual)],
            starting_position: vec![0.0],
            coil_2_threshold: vec![2.0],
            coil_3_threshold: vec![1.0],
            added_mass: vec![0.0],
            drag_coefficient: vec![DragSpec::Preset(Preset::Actual)],
        }
    }
}

impl Parameters {
    /// Axis names paired with their lengths, outermost first.
    #[must_use]
    pub fn axes(&self) -> [(&'static str, usize); 7] {
        [
            ("voltage", self.voltage.len()),
            ("turns", self.turns.len()),
            ("starting_position", self.starting_position.len()),
            ("coil_2_threshold", self.coil_2_threshold.len()),
            ("coil_3_threshold", self.coil_3_threshold.len()),
            ("added_mass", self.added_mass.len()),
            ("drag_coefficient", self.drag_coefficient.len()),
        ]
    }
}

/// A batch of launches over every combination of [`Parameters`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepConfig {
    pub model: ModelVariant,
    pub environment: Environment,
    pub firing: FiringSelection,

    /// Whether the payload body rides in the sled. A bare sled is dry fired.
    pub body_loaded: bool,

    /// Whether the payload separates at the last coil.
    pub payload_release: bool,

    /// Directory holding the solver model files.
    pub model_dir: String,

    pub timestep_ms: f64,
    pub max_time_s: f64,

    pub parameters: Parameters,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            model: ModelVariant::default(),
            environment: Environment::default(),
            firing: FiringSelection::default(),
            body_loaded: true,
            payload_release: true,
            model_dir: "Models".to_string(),
            timestep_ms: 1.0,
            max_time_s: 1.0,
            parameters: Parameters::default(),
        }
    }
}

impl SweepConfig {
    /// Parses and checks a TOML sweep configuration.
    ///
    /// # Errors
    ///
    /// Returns a [`SweepError`] if the text is not valid TOML for this type
    /// or fails [`SweepConfig::check`].
    pub fn from_toml(text: &str) -> Result<Self, SweepError> {
        let config: Self = toml::from_str(text)?;
        config.check()?;
        Ok(config)
    }

    /// Checks the whole batch before any run starts.
    ///
    /// # Errors
    ///
    /// Returns a [`SweepError`] if a parameter list is empty, the timing is
    /// invalid, the manual schedule is malformed, or the combination of
    /// settings has not been validated on the rig.
    pub fn check(&self) -> Result<(), SweepError> {
        if let Some((name, _)) = self.parameters.axes().iter().find(|(_, len)| *len == 0) {
            return Err(SweepError::EmptyParameter(name));
        }

        self.timing()?;
        self.firing.firing()?;

        if self.firing == FiringSelection::Cutoff
            && self.parameters.turns.iter().any(|t| t.is_actual())
        {
            return Err(SweepError::CutoffWithRigTurns);
        }
        if !self.environment.is_submerged()
            && self.parameters.drag_coefficient.iter().any(|d| d.is_actual())
        {
            return Err(SweepError::EmpiricalDragDry);
        }

        Ok(())
    }

    /// Kernel timing for every run.
    ///
    /// # Errors
    ///
    /// Returns a [`SweepError`] if the timestep or max time is not positive.
    pub fn timing(&self) -> Result<Timing, SweepError> {
        Ok(Timing::new(
            Time::new::<millisecond>(self.timestep_ms),
            Time::new::<second>(self.max_time_s),
        )?)
    }

    /// Iterates over every parameter combination.
    ///
    /// The last parameter varies fastest: voltage, turns, starting position,
    /// coil 2 threshold, coil 3 threshold, added mass, drag coefficient.
    #[must_use]
    pub fn combinations(&self) -> Combinations<'_> {
        Combinations::new(&self.parameters)
    }

    /// Number of combinations in the batch.
    #[must_use]
    pub fn len(&self) -> usize {
        self.parameters.axes().iter().map(|(_, len)| len).product()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_rig_defaults() {
        let config = SweepConfig::from_toml("").unwrap();
        assert_eq!(config, SweepConfig::default());
        assert_eq!(config.len(), 1);
    }

    #[test]
    fn parses_mixed_presets_and_numbers() {
        let config = SweepConfig::from_toml(
            r#"
            model = "spaced"
            environment = "submerged"

            [parameters]
            voltage = [115.0, 125.0]
            turns = [100, "actual"]
            drag_coefficient = ["actual", 4.5]
            "#,
        )
        .unwrap();

        assert_eq!(config.model, ModelVariant::Spaced);
        assert_eq!(
            config.parameters.turns,
            vec![TurnsSpec::Uniform(100), TurnsSpec::Preset(Preset::Actual)]
        );
        assert_eq!(
            config.parameters.drag_coefficient,
            vec![DragSpec::Preset(Preset::Actual), DragSpec::Coefficient(4.5)]
        );
        assert_eq!(config.len(), 8);
    }

    #[test]
    fn parses_manual_firing() {
        let config = SweepConfig::from_toml(
            r"
            [firing.manual]
            durations_ms = [43.0, 40.5, 43.0]
            delays_ms = [11.5, 6.0]
            ",
        )
        .unwrap();
        assert!(matches!(config.firing.firing().unwrap(), Firing::Manual(_)));
    }

    #[test]
    fn cutoff_with_rig_turns_is_rejected() {
        let err = SweepConfig::from_toml(r#"firing = "cutoff""#).unwrap_err();
        assert!(matches!(err, SweepError::CutoffWithRigTurns));

        let ok = SweepConfig::from_toml(
            r#"
            firing = "cutoff"
            [parameters]
            turns = [300]
            "#,
        );
        assert!(ok.is_ok());
    }

    #[test]
    fn empirical_drag_needs_water() {
        let err = SweepConfig::from_toml(r#"environment = "dry""#).unwrap_err();
        assert!(matches!(err, SweepError::EmpiricalDragDry));

        let ok = SweepConfig::from_toml(
            r#"
            environment = "dry"
            [parameters]
            drag_coefficient = [0.8]
            "#,
        );
        assert!(ok.is_ok());
    }

    #[test]
    fn empty_lists_are_rejected() {
        let err = SweepConfig::from_toml(
            r"
            [parameters]
            added_mass = []
            ",
        )
        .unwrap_err();
        assert!(matches!(err, SweepError::EmptyParameter("added_mass")));
    }

    #[test]
    fn manual_schedule_must_cover_every_coil() {
        let err = SweepConfig::from_toml(
            r"
            [firing.manual]
            durations_ms = [43.0, 40.5]
            delays_ms = [11.5]
            ",
        )
        .unwrap_err();
        assert!(matches!(
            err,
            SweepError::TimingLength {
                expected: 3,
                got: 2
            }
        ));
    }

    #[test]
    fn bad_timestep_is_rejected() {
        let err = SweepConfig::from_toml("timestep_ms = 0.0").unwrap_err();
        assert!(matches!(err, SweepError::Config(_)));
    }
}
