//! Simulation configuration.
//!
//! This module provides the initialisation-time settings for the simulator:
//! lane capacities, tick periods for every timer, the flag probability, the
//! decision mode, optional dwell-time eviction and the task catalog.
//!
//! Two presets mirror the two animated boards of the review demo:
//!
//! | Profile    | spawn | review | decide | settle | eviction          | decisions |
//! |------------|-------|--------|--------|--------|-------------------|-----------|
//! | `pipeline` | 700ms | 900ms  | 1100ms | -      | 600ms per stage   | direct    |
//! | `loop`     | 950ms | 1150ms | 1400ms | 800ms  | 2000ms both lanes | staged    |

use std::str::FromStr;
use std::time::Duration;

use crate::catalog::TaskCatalog;
use crate::error::ConfigError;

use super::packet::Stage;

/// Default probability that a review ends with a flag.
pub const DEFAULT_FLAG_RATE: f64 = 0.25;

/// Maximum number of packets each lane may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageCapacities {
    pub intake: usize,
    pub reviewing: usize,
    pub verified: usize,
    pub flagged: usize,
}

impl StageCapacities {
    /// Creates capacities for the four lanes in lane order.
    pub fn new(intake: usize, reviewing: usize, verified: usize, flagged: usize) -> Self {
        Self {
            intake,
            reviewing,
            verified,
            flagged,
        }
    }

    /// Returns the capacity of one lane.
    pub fn get(&self, stage: Stage) -> usize {
        match stage {
            Stage::Intake => self.intake,
            Stage::Reviewing => self.reviewing,
            Stage::Verified => self.verified,
            Stage::Flagged => self.flagged,
        }
    }
}

impl Default for StageCapacities {
    fn default() -> Self {
        Self::new(6, 6, 3, 3)
    }
}

/// How a packet leaves the review lane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecisionMode {
    /// The decide tick moves the packet straight into its terminal lane.
    #[default]
    Direct,
    /// The decide tick only records the verdict; a settle tick moves the
    /// packet later, evicting the oldest packet of a full target lane first.
    Staged,
}

/// Period of every timer. `None` disables a timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickPeriods {
    pub spawn: Duration,
    pub review: Duration,
    pub decide: Duration,
    /// Staged decisions only.
    pub settle: Option<Duration>,
    pub evict_verified: Option<Duration>,
    pub evict_flagged: Option<Duration>,
    /// Evicts both terminal lanes in one tick.
    pub cleanup: Option<Duration>,
}

impl TickPeriods {
    /// Timer periods of the `pipeline` board.
    pub fn pipeline() -> Self {
        Self {
            spawn: Duration::from_millis(700),
            review: Duration::from_millis(900),
            decide: Duration::from_millis(1100),
            settle: None,
            evict_verified: Some(Duration::from_millis(600)),
            evict_flagged: Some(Duration::from_millis(600)),
            cleanup: None,
        }
    }

    /// Timer periods of the `loop` board.
    pub fn looped() -> Self {
        Self {
            spawn: Duration::from_millis(950),
            review: Duration::from_millis(1150),
            decide: Duration::from_millis(1400),
            settle: Some(Duration::from_millis(800)),
            evict_verified: None,
            evict_flagged: None,
            cleanup: Some(Duration::from_millis(2000)),
        }
    }

    /// Divides every period by `factor`, keeping at least one millisecond.
    ///
    /// Used to speed up real-time demos and tests.
    pub fn scaled(self, factor: u32) -> Self {
        let factor = factor.max(1);
        let scale = |d: Duration| (d / factor).max(Duration::from_millis(1));
        Self {
            spawn: scale(self.spawn),
            review: scale(self.review),
            decide: scale(self.decide),
            settle: self.settle.map(scale),
            evict_verified: self.evict_verified.map(scale),
            evict_flagged: self.evict_flagged.map(scale),
            cleanup: self.cleanup.map(scale),
        }
    }

    fn evicts(&self, stage: Stage) -> bool {
        let dedicated = match stage {
            Stage::Verified => self.evict_verified,
            Stage::Flagged => self.evict_flagged,
            Stage::Intake | Stage::Reviewing => return true,
        };
        dedicated.is_some() || self.cleanup.is_some()
    }
}

impl Default for TickPeriods {
    fn default() -> Self {
        Self::pipeline()
    }
}

/// Named configuration presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Profile {
    #[default]
    Pipeline,
    Loop,
}

impl Profile {
    /// Returns the preset configuration for this profile.
    pub fn config(&self) -> SimulationConfig {
        match self {
            Profile::Pipeline => SimulationConfig::pipeline(),
            Profile::Loop => SimulationConfig::looped(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Profile::Pipeline => "pipeline",
            Profile::Loop => "loop",
        }
    }
}

impl std::fmt::Display for Profile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Profile {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pipeline" => Ok(Profile::Pipeline),
            "loop" => Ok(Profile::Loop),
            other => Err(ConfigError::UnknownProfile(other.to_string())),
        }
    }
}

/// Configuration for a simulator instance.
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    /// Lane capacities.
    pub capacities: StageCapacities,
    /// Timer periods.
    pub periods: TickPeriods,
    /// Probability in `[0, 1]` that a decision flags the packet.
    pub flag_rate: f64,
    /// Direct or staged decisions.
    pub decision_mode: DecisionMode,
    /// Terminal packets older than this are evicted regardless of capacity.
    pub terminal_dwell: Option<Duration>,
    /// Labels and sectors stamped on spawned packets.
    pub catalog: TaskCatalog,
    /// Seed for the decision random source. `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self::pipeline()
    }
}

impl SimulationConfig {
    /// Creates the `pipeline` preset.
    pub fn new() -> Self {
        Self::default()
    }

    /// The straight-through board: direct decisions, fast per-lane eviction.
    pub fn pipeline() -> Self {
        Self {
            capacities: StageCapacities::default(),
            periods: TickPeriods::pipeline(),
            flag_rate: DEFAULT_FLAG_RATE,
            decision_mode: DecisionMode::Direct,
            terminal_dwell: None,
            catalog: TaskCatalog::default(),
            seed: None,
        }
    }

    /// The slower loop board: staged decisions with a settle step.
    pub fn looped() -> Self {
        Self {
            periods: TickPeriods::looped(),
            decision_mode: DecisionMode::Staged,
            ..Self::pipeline()
        }
    }

    /// Validates the configuration values.
    ///
    /// # Errors
    ///
    /// Returns the first `ConfigError` found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for stage in Stage::ALL {
            if self.capacities.get(stage) == 0 {
                return Err(ConfigError::ZeroCapacity(stage));
            }
        }

        let periods = [
            ("spawn", Some(self.periods.spawn)),
            ("review", Some(self.periods.review)),
            ("decide", Some(self.periods.decide)),
            ("settle", self.periods.settle),
            ("evict-verified", self.periods.evict_verified),
            ("evict-flagged", self.periods.evict_flagged),
            ("cleanup", self.periods.cleanup),
        ];
        for (timer, period) in periods {
            if let Some(period) = period {
                if period.is_zero() {
                    return Err(ConfigError::ZeroPeriod {
                        timer: timer.to_string(),
                        period,
                    });
                }
            }
        }

        if !(0.0..=1.0).contains(&self.flag_rate) {
            return Err(ConfigError::InvalidFlagRate(self.flag_rate));
        }

        if self.catalog.is_empty() {
            return Err(ConfigError::EmptyCatalog);
        }

        if self.decision_mode == DecisionMode::Staged && self.periods.settle.is_none() {
            return Err(ConfigError::MissingSettlePeriod);
        }

        for stage in [Stage::Verified, Stage::Flagged] {
            if !self.periods.evicts(stage) {
                return Err(ConfigError::MissingEviction(stage));
            }
        }

        Ok(())
    }

    /// Builder method to set lane capacities.
    pub fn with_capacities(mut self, capacities: StageCapacities) -> Self {
        self.capacities = capacities;
        self
    }

    /// Builder method to set timer periods.
    pub fn with_periods(mut self, periods: TickPeriods) -> Self {
        self.periods = periods;
        self
    }

    /// Builder method to set the flag probability.
    pub fn with_flag_rate(mut self, rate: f64) -> Self {
        self.flag_rate = rate;
        self
    }

    /// Builder method to set the decision mode.
    pub fn with_decision_mode(mut self, mode: DecisionMode) -> Self {
        self.decision_mode = mode;
        self
    }

    /// Builder method to enable dwell-time eviction of terminal packets.
    pub fn with_terminal_dwell(mut self, dwell: Duration) -> Self {
        self.terminal_dwell = Some(dwell);
        self
    }

    /// Builder method to set the task catalog.
    pub fn with_catalog(mut self, catalog: TaskCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Builder method to set the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_pipeline() {
        let config = SimulationConfig::default();
        assert_eq!(config.capacities, StageCapacities::new(6, 6, 3, 3));
        assert_eq!(config.periods, TickPeriods::pipeline());
        assert_eq!(config.decision_mode, DecisionMode::Direct);
        assert!((config.flag_rate - 0.25).abs() < f64::EPSILON);
        assert_eq!(config.catalog.len(), 15);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_loop_profile() {
        let config = Profile::Loop.config();
        assert_eq!(config.decision_mode, DecisionMode::Staged);
        assert_eq!(config.periods.settle, Some(Duration::from_millis(800)));
        assert_eq!(config.periods.cleanup, Some(Duration::from_millis(2000)));
        assert!(config.periods.evict_verified.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_profile_parse() {
        assert_eq!("pipeline".parse::<Profile>(), Ok(Profile::Pipeline));
        assert_eq!(" LOOP ".parse::<Profile>(), Ok(Profile::Loop));
        assert_eq!(
            "fast".parse::<Profile>(),
            Err(ConfigError::UnknownProfile("fast".to_string()))
        );
        assert_eq!(Profile::Loop.to_string(), "loop");
    }

    #[test]
    fn test_validate_zero_capacity() {
        let config = SimulationConfig::new().with_capacities(StageCapacities::new(6, 0, 3, 3));
        assert_eq!(
            config.validate(),
            Err(ConfigError::ZeroCapacity(Stage::Reviewing))
        );
    }

    #[test]
    fn test_validate_zero_period() {
        let mut periods = TickPeriods::pipeline();
        periods.decide = Duration::ZERO;
        let config = SimulationConfig::new().with_periods(periods);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ZeroPeriod { ref timer, .. }) if timer == "decide"
        ));
    }

    #[test]
    fn test_validate_flag_rate() {
        assert!(SimulationConfig::new().with_flag_rate(0.0).validate().is_ok());
        assert!(SimulationConfig::new().with_flag_rate(1.0).validate().is_ok());
        assert_eq!(
            SimulationConfig::new().with_flag_rate(1.2).validate(),
            Err(ConfigError::InvalidFlagRate(1.2))
        );
        assert!(SimulationConfig::new()
            .with_flag_rate(f64::NAN)
            .validate()
            .is_err());
    }

    #[test]
    fn test_validate_empty_catalog() {
        let config = SimulationConfig::new().with_catalog(TaskCatalog::new(Vec::new()));
        assert_eq!(config.validate(), Err(ConfigError::EmptyCatalog));
    }

    #[test]
    fn test_validate_staged_without_settle() {
        let config = SimulationConfig::pipeline().with_decision_mode(DecisionMode::Staged);
        assert_eq!(config.validate(), Err(ConfigError::MissingSettlePeriod));
    }

    #[test]
    fn test_validate_missing_eviction() {
        let mut periods = TickPeriods::pipeline();
        periods.evict_flagged = None;
        let config = SimulationConfig::new().with_periods(periods);
        assert_eq!(
            config.validate(),
            Err(ConfigError::MissingEviction(Stage::Flagged))
        );
    }

    #[test]
    fn test_scaled_periods() {
        let periods = TickPeriods::looped().scaled(100);
        assert_eq!(periods.spawn, Duration::from_micros(9500));
        assert_eq!(periods.settle, Some(Duration::from_millis(8)));
        assert_eq!(periods.evict_verified, None);

        let tiny = TickPeriods::pipeline().scaled(10_000);
        assert_eq!(tiny.evict_flagged, Some(Duration::from_millis(1)));
    }
}
