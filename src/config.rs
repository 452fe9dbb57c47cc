//! Explicit configuration of the three dynamics modes.
//!
//! Every analysis is fully determined by its `NetworkDefinition` and a `DynamicsMode`
//! value. All resource limits are counts (states, steps, iterations), never wall-clock
//! time, so results are reproducible regardless of the speed of the host.
//!
//! Each configuration has a `validate` method which is called before any simulation work
//! starts; invalid values result in `AnalysisError::Configuration`.

use crate::state::DEFAULT_THRESHOLD;
use crate::{AnalysisError, State};

/// Exhaustive exploration uses `u64` dense state indices, hence this is the hard upper
/// bound on the node count of the deterministic mode regardless of configuration.
pub const DETERMINISTIC_NODE_LIMIT: usize = 63;

/// Caps shared by the deterministic and weighted explorers.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExplorationLimits {
    state_cap: u64,
    step_cap: usize,
    seed: u64,
}

/// What happens when the weighted input of a node is exactly at its threshold.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TieBehavior {
    /// The node keeps its current value.
    Hold,
    /// The node becomes active.
    ForceOn,
    /// The node becomes inactive.
    ForceOff,
}

/// Threshold function of the weighted dynamics.
///
/// The threshold of a node is `multiplier * W+`, where `W+` is the sum of the positive
/// weights of its incoming edges. Both parameters are mandatory, there is no implicit
/// tie-breaking rule.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ThresholdPolicy {
    multiplier: f64,
    tie: TieBehavior,
}

/// Exact boolean mode.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DeterministicConfig {
    max_nodes: usize,
    limits: ExplorationLimits,
    report_missed_fixed_points: bool,
}

/// Weighted (threshold) mode.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WeightedConfig {
    max_nodes: usize,
    limits: ExplorationLimits,
    threshold: ThresholdPolicy,
}

/// Noisy weighted mode which estimates steady-state marginals instead of enumerating
/// attractors.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProbabilisticConfig {
    max_nodes: usize,
    iteration_cap: usize,
    noise: f64,
    degradation: f64,
    tolerance: f64,
    confirmation_window: usize,
    replicates: usize,
    seed: u64,
    threshold: ThresholdPolicy,
    binarization_threshold: f64,
    initial_states: Vec<State>,
}

/// Selects the dynamics used by an analysis, together with its parameters.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DynamicsMode {
    Deterministic(DeterministicConfig),
    Weighted(WeightedConfig),
    Probabilistic(ProbabilisticConfig),
}

impl Default for ExplorationLimits {
    fn default() -> Self {
        ExplorationLimits {
            state_cap: 1 << 16,
            step_cap: 1_000,
            seed: 0,
        }
    }
}

impl ExplorationLimits {
    /// Maximal number of initial states. State spaces up to this size are enumerated
    /// exhaustively, larger ones are sampled.
    pub fn with_state_cap(mut self, state_cap: u64) -> Self {
        self.state_cap = state_cap;
        self
    }

    /// Maximal number of transitions followed from one initial state.
    pub fn with_step_cap(mut self, step_cap: usize) -> Self {
        self.step_cap = step_cap;
        self
    }

    /// Seed of the pseudo-random sampling of initial states.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn state_cap(&self) -> u64 {
        self.state_cap
    }

    pub fn step_cap(&self) -> usize {
        self.step_cap
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn validate(&self) -> Result<(), AnalysisError> {
        if self.state_cap == 0 {
            return Err(AnalysisError::config("State cap must be positive."));
        }
        if self.step_cap == 0 {
            return Err(AnalysisError::config("Step cap must be positive."));
        }
        Ok(())
    }
}

impl ThresholdPolicy {
    pub fn new(multiplier: f64, tie: TieBehavior) -> ThresholdPolicy {
        ThresholdPolicy { multiplier, tie }
    }

    pub fn multiplier(&self) -> f64 {
        self.multiplier
    }

    pub fn tie(&self) -> TieBehavior {
        self.tie
    }

    pub fn validate(&self) -> Result<(), AnalysisError> {
        if !self.multiplier.is_finite() {
            return Err(AnalysisError::config(format!(
                "Threshold multiplier must be finite, got {}.",
                self.multiplier
            )));
        }
        Ok(())
    }
}

impl Default for DeterministicConfig {
    fn default() -> Self {
        DeterministicConfig {
            max_nodes: 30,
            limits: ExplorationLimits::default(),
            report_missed_fixed_points: true,
        }
    }
}

impl DeterministicConfig {
    pub fn with_max_nodes(mut self, max_nodes: usize) -> Self {
        self.max_nodes = max_nodes;
        self
    }

    pub fn with_limits(mut self, limits: ExplorationLimits) -> Self {
        self.limits = limits;
        self
    }

    /// When the state space is sampled, compute all fixed points symbolically and warn
    /// about those that no sampled trajectory reached.
    pub fn with_missed_fixed_points(mut self, report: bool) -> Self {
        self.report_missed_fixed_points = report;
        self
    }

    pub fn max_nodes(&self) -> usize {
        self.max_nodes
    }

    pub fn limits(&self) -> &ExplorationLimits {
        &self.limits
    }

    pub fn report_missed_fixed_points(&self) -> bool {
        self.report_missed_fixed_points
    }

    pub fn validate(&self) -> Result<(), AnalysisError> {
        if self.max_nodes > DETERMINISTIC_NODE_LIMIT {
            return Err(AnalysisError::config(format!(
                "Deterministic mode supports at most {} nodes, configured {}.",
                DETERMINISTIC_NODE_LIMIT, self.max_nodes
            )));
        }
        self.limits.validate()
    }
}

impl Default for WeightedConfig {
    /// Threshold at half of the positive input weight, ties keep the current value.
    fn default() -> Self {
        WeightedConfig {
            max_nodes: 512,
            limits: ExplorationLimits::default(),
            threshold: ThresholdPolicy::new(0.5, TieBehavior::Hold),
        }
    }
}

impl WeightedConfig {
    pub fn with_max_nodes(mut self, max_nodes: usize) -> Self {
        self.max_nodes = max_nodes;
        self
    }

    pub fn with_limits(mut self, limits: ExplorationLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn with_threshold(mut self, threshold: ThresholdPolicy) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn max_nodes(&self) -> usize {
        self.max_nodes
    }

    pub fn limits(&self) -> &ExplorationLimits {
        &self.limits
    }

    pub fn threshold(&self) -> ThresholdPolicy {
        self.threshold
    }

    pub fn validate(&self) -> Result<(), AnalysisError> {
        self.threshold.validate()?;
        self.limits.validate()
    }
}

impl Default for ProbabilisticConfig {
    fn default() -> Self {
        ProbabilisticConfig {
            max_nodes: 4096,
            iteration_cap: 1_000,
            noise: 0.01,
            degradation: 0.0,
            tolerance: 1e-3,
            confirmation_window: 20,
            replicates: 32,
            seed: 0,
            threshold: ThresholdPolicy::new(0.5, TieBehavior::Hold),
            binarization_threshold: DEFAULT_THRESHOLD,
            initial_states: Vec::new(),
        }
    }
}

impl ProbabilisticConfig {
    pub fn with_max_nodes(mut self, max_nodes: usize) -> Self {
        self.max_nodes = max_nodes;
        self
    }

    pub fn with_iteration_cap(mut self, iteration_cap: usize) -> Self {
        self.iteration_cap = iteration_cap;
        self
    }

    /// Probability that the candidate value of a node is flipped in one step.
    pub fn with_noise(mut self, noise: f64) -> Self {
        self.noise = noise;
        self
    }

    /// Fraction by which every value decays towards zero in one step.
    pub fn with_degradation(mut self, degradation: f64) -> Self {
        self.degradation = degradation;
        self
    }

    /// Maximal change (max-norm) of the marginal vector that still counts as converged.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Number of consecutive steps below tolerance required to declare convergence.
    pub fn with_confirmation_window(mut self, window: usize) -> Self {
        self.confirmation_window = window;
        self
    }

    /// Number of independent chains. Ignored when initial states are given explicitly.
    pub fn with_replicates(mut self, replicates: usize) -> Self {
        self.replicates = replicates;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_threshold(mut self, threshold: ThresholdPolicy) -> Self {
        self.threshold = threshold;
        self
    }

    /// Threshold used to round marginals into the reported dominant state.
    pub fn with_binarization_threshold(mut self, threshold: f64) -> Self {
        self.binarization_threshold = threshold;
        self
    }

    /// Start one chain from each of the given states instead of random ones.
    pub fn with_initial_states(mut self, states: Vec<State>) -> Self {
        self.initial_states = states;
        self
    }

    pub fn max_nodes(&self) -> usize {
        self.max_nodes
    }

    pub fn iteration_cap(&self) -> usize {
        self.iteration_cap
    }

    pub fn noise(&self) -> f64 {
        self.noise
    }

    pub fn degradation(&self) -> f64 {
        self.degradation
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    pub fn confirmation_window(&self) -> usize {
        self.confirmation_window
    }

    pub fn replicates(&self) -> usize {
        self.replicates
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn threshold(&self) -> ThresholdPolicy {
        self.threshold
    }

    pub fn binarization_threshold(&self) -> f64 {
        self.binarization_threshold
    }

    pub fn initial_states(&self) -> &[State] {
        &self.initial_states
    }

    pub fn validate(&self) -> Result<(), AnalysisError> {
        self.threshold.validate()?;
        check_probability("Noise probability", self.noise)?;
        check_probability("Degradation factor", self.degradation)?;
        check_probability("Binarization threshold", self.binarization_threshold)?;
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(AnalysisError::config(format!(
                "Convergence tolerance must be positive, got {}.",
                self.tolerance
            )));
        }
        if self.iteration_cap == 0 {
            return Err(AnalysisError::config("Iteration cap must be positive."));
        }
        if self.confirmation_window == 0 {
            return Err(AnalysisError::config(
                "Confirmation window must be positive.",
            ));
        }
        if self.replicates == 0 && self.initial_states.is_empty() {
            return Err(AnalysisError::config("At least one replicate is required."));
        }
        Ok(())
    }
}

impl DynamicsMode {
    /// Short name of the mode used in messages.
    pub fn name(&self) -> &'static str {
        match self {
            DynamicsMode::Deterministic(_) => "deterministic",
            DynamicsMode::Weighted(_) => "weighted",
            DynamicsMode::Probabilistic(_) => "probabilistic",
        }
    }

    /// Largest node count accepted by this mode.
    pub fn max_nodes(&self) -> usize {
        match self {
            DynamicsMode::Deterministic(config) => config.max_nodes(),
            DynamicsMode::Weighted(config) => config.max_nodes(),
            DynamicsMode::Probabilistic(config) => config.max_nodes(),
        }
    }

    /// Validate parameters of the mode and check that a network with `num_nodes` nodes
    /// can be analysed with it.
    pub fn validate(&self, num_nodes: usize) -> Result<(), AnalysisError> {
        match self {
            DynamicsMode::Deterministic(config) => config.validate()?,
            DynamicsMode::Weighted(config) => config.validate()?,
            DynamicsMode::Probabilistic(config) => config.validate()?,
        }
        if num_nodes > self.max_nodes() {
            return Err(AnalysisError::config(format!(
                "Network has {} nodes, but {} mode is limited to {}.",
                num_nodes,
                self.name(),
                self.max_nodes()
            )));
        }
        Ok(())
    }
}

/// **(internal)** Check that a value is a probability.
fn check_probability(name: &str, value: f64) -> Result<(), AnalysisError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(AnalysisError::config(format!(
            "{} must be in [0,1], got {}.",
            name, value
        )))
    }
}

#[cfg(test)]
mod tests {
    use crate::config::{
        DeterministicConfig, DynamicsMode, ExplorationLimits, ProbabilisticConfig,
        ThresholdPolicy, TieBehavior, WeightedConfig,
    };
    use crate::AnalysisError;

    #[test]
    fn default_configurations_are_valid() {
        assert!(DeterministicConfig::default().validate().is_ok());
        assert!(WeightedConfig::default().validate().is_ok());
        assert!(ProbabilisticConfig::default().validate().is_ok());
    }

    #[test]
    fn invalid_caps() {
        let limits = ExplorationLimits::default().with_state_cap(0);
        assert!(limits.validate().is_err());
        let limits = ExplorationLimits::default().with_step_cap(0);
        assert!(limits.validate().is_err());
        let config = DeterministicConfig::default().with_max_nodes(64);
        assert!(config.validate().is_err());
    }

    #[test]
    fn invalid_probabilities() {
        let config = ProbabilisticConfig::default().with_noise(1.5);
        assert!(config.validate().is_err());
        let config = ProbabilisticConfig::default().with_degradation(-0.1);
        assert!(config.validate().is_err());
        let config = ProbabilisticConfig::default().with_tolerance(0.0);
        assert!(config.validate().is_err());
        let config = ProbabilisticConfig::default().with_replicates(0);
        assert!(config.validate().is_err());
        let threshold = ThresholdPolicy::new(f64::NAN, TieBehavior::Hold);
        let config = WeightedConfig::default().with_threshold(threshold);
        assert!(config.validate().is_err());
    }

    #[test]
    fn node_ceiling() {
        let mode = DynamicsMode::Deterministic(DeterministicConfig::default().with_max_nodes(4));
        assert!(mode.validate(4).is_ok());
        match mode.validate(5) {
            Err(AnalysisError::Configuration(message)) => {
                assert!(message.contains("deterministic"))
            }
            other => panic!("Unexpected validation result: {:?}", other),
        }
    }
}
