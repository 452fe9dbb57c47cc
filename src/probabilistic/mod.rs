//! Noisy weighted dynamics: estimation of steady-state marginals.
//!
//! Instead of enumerating attractors, the engine runs an ensemble of independent chains.
//! In one step, every node of every chain:
//!
//!  1. computes its threshold candidate from the chain's current real values
//!     (a frozen node, or a tie under `TieBehavior::Hold`, keeps its current value);
//!  2. with probability `noise`, flips the candidate (`v -> 1 - v`);
//!  3. decays: `value = candidate * (1 - degradation)`.
//!
//! After every step, the ensemble mean of each node is folded into a running time-average,
//! the marginal. The run converges once the maximal change of the ensemble mean between two
//! consecutive steps stays below `tolerance` for `confirmation_window` consecutive steps.
//! The time-average itself is not used for this test: its change is bounded by `1/t`, so
//! it settles even for an oscillating ensemble.

use crate::cancellation::CancellationFlag;
use crate::config::ProbabilisticConfig;
use crate::dynamics::{TransitionFunction, WeightedDynamics};
use crate::{AnalysisError, NodeId};
use log::debug;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Runs the ensemble of noisy chains for one network.
pub struct ProbabilisticEngine<'a> {
    dynamics: &'a WeightedDynamics,
    config: &'a ProbabilisticConfig,
    cancellation: &'a CancellationFlag,
}

/// Outcome of a probabilistic run.
#[derive(Clone, Debug, PartialEq)]
pub struct MarginalEstimate {
    marginals: Vec<f64>,
    converged: bool,
    iterations: usize,
    chains: usize,
    cancelled: bool,
}

impl<'a> ProbabilisticEngine<'a> {
    pub fn new(
        dynamics: &'a WeightedDynamics,
        config: &'a ProbabilisticConfig,
        cancellation: &'a CancellationFlag,
    ) -> ProbabilisticEngine<'a> {
        ProbabilisticEngine {
            dynamics,
            config,
            cancellation,
        }
    }

    /// Initial values of all chains: the configured initial states, or `replicates`
    /// uniformly random states.
    pub fn initial_values(&self, rng: &mut ChaCha8Rng) -> Result<Vec<Vec<f64>>, AnalysisError> {
        let num_nodes = self.dynamics.num_nodes();
        let to_values = |bits: Vec<bool>| -> Vec<f64> {
            bits.into_iter().map(|it| if it { 1.0 } else { 0.0 }).collect()
        };
        if self.config.initial_states().is_empty() {
            let chains = (0..self.config.replicates())
                .map(|_| to_values((0..num_nodes).map(|_| rng.gen::<bool>()).collect()))
                .collect();
            return Ok(chains);
        }
        let mut chains = Vec::with_capacity(self.config.initial_states().len());
        for state in self.config.initial_states() {
            if state.width() != num_nodes {
                return Err(AnalysisError::config(format!(
                    "Initial state `{}` has {} values, but the network has {} nodes.",
                    state,
                    state.width(),
                    num_nodes
                )));
            }
            chains.push(to_values(state.values()));
        }
        Ok(chains)
    }

    /// Perform one noisy synchronous step of a single chain.
    pub fn step(&self, values: &[f64], rng: &mut ChaCha8Rng) -> Vec<f64> {
        let keep = 1.0 - self.config.degradation();
        self.dynamics
            .as_network()
            .nodes()
            .map(|node: NodeId| {
                let raw = self.dynamics.raw_input(node, values);
                let candidate = match self.dynamics.threshold_output(node, raw) {
                    Some(true) => 1.0,
                    Some(false) => 0.0,
                    None => values[node.to_index()],
                };
                let candidate = if rng.gen_bool(self.config.noise()) {
                    1.0 - candidate
                } else {
                    candidate
                };
                candidate * keep
            })
            .collect()
    }

    /// Run all chains until convergence, the iteration cap, or cancellation.
    pub fn run(&self) -> Result<MarginalEstimate, AnalysisError> {
        let mut rng = ChaCha8Rng::seed_from_u64(self.config.seed());
        let mut chains = self.initial_values(&mut rng)?;
        let num_nodes = self.dynamics.num_nodes();
        let mut marginals = vec![0.0; num_nodes];
        let mut previous = ensemble_mean(&chains, num_nodes);
        let mut stable_steps = 0usize;
        let mut converged = false;
        let mut cancelled = false;
        let mut iterations = 0usize;

        debug!(
            "Running {} chains over {} nodes for at most {} iterations.",
            chains.len(),
            num_nodes,
            self.config.iteration_cap()
        );
        while iterations < self.config.iteration_cap() {
            if self.cancellation.is_cancelled() {
                cancelled = true;
                break;
            }
            chains = chains
                .iter()
                .map(|values| self.step(values, &mut rng))
                .collect();
            iterations += 1;

            let means = ensemble_mean(&chains, num_nodes);
            let weight = 1.0 / iterations as f64;
            for (marginal, mean) in marginals.iter_mut().zip(&means) {
                *marginal += (mean - *marginal) * weight;
            }
            let change = means
                .iter()
                .zip(&previous)
                .map(|(now, before)| (now - before).abs())
                .fold(0.0, f64::max);
            previous = means;

            if change < self.config.tolerance() {
                stable_steps += 1;
            } else {
                stable_steps = 0;
            }
            if stable_steps >= self.config.confirmation_window() {
                converged = true;
                break;
            }
        }
        debug!(
            "Probabilistic run stopped after {} iterations (converged: {}).",
            iterations, converged
        );

        Ok(MarginalEstimate {
            marginals,
            converged,
            iterations,
            chains: chains.len(),
            cancelled,
        })
    }
}

/// **(internal)** Mean value of every node across all chains.
fn ensemble_mean(chains: &[Vec<f64>], num_nodes: usize) -> Vec<f64> {
    if chains.is_empty() {
        return vec![0.0; num_nodes];
    }
    let count = chains.len() as f64;
    (0..num_nodes)
        .map(|node| chains.iter().map(|it| it[node]).sum::<f64>() / count)
        .collect()
}

impl MarginalEstimate {
    /// Time-averaged probability of every node being active, in node order.
    pub fn marginals(&self) -> &[f64] {
        &self.marginals
    }

    pub fn is_converged(&self) -> bool {
        self.converged
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Number of simulated chains.
    pub fn chains(&self) -> usize {
        self.chains
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    /// **(internal)** Move the marginal vector out of the estimate.
    pub(crate) fn into_marginals(self) -> Vec<f64> {
        self.marginals
    }
}

#[cfg(test)]
mod tests {
    use crate::cancellation::CancellationFlag;
    use crate::config::{ProbabilisticConfig, ThresholdPolicy, TieBehavior};
    use crate::dynamics::WeightedDynamics;
    use crate::probabilistic::ProbabilisticEngine;
    use crate::{Edge, Network, Node, State};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use test_log::test;

    fn network() -> Network {
        Network::new(vec![Node::unlabeled("a"), Node::unlabeled("b")]).unwrap()
    }

    /// `a` is always on (positive bias) and `b` copies `a`.
    fn stable() -> WeightedDynamics {
        let edges = vec![Edge::new("a", "b", 1.0)];
        let biases = vec![("a".to_string(), 1.0)];
        let policy = ThresholdPolicy::new(0.5, TieBehavior::Hold);
        WeightedDynamics::new(&network(), &edges, &biases, policy).unwrap()
    }

    /// `a` negates itself in every step, `b` is frozen.
    fn oscillating() -> WeightedDynamics {
        let edges = vec![Edge::new("a", "a", -1.0)];
        let biases = vec![("a".to_string(), 0.5)];
        let policy = ThresholdPolicy::new(0.5, TieBehavior::Hold);
        WeightedDynamics::new(&network(), &edges, &biases, policy).unwrap()
    }

    #[test]
    fn noiseless_stable_network_converges() {
        let dynamics = stable();
        let config = ProbabilisticConfig::default().with_noise(0.0);
        let flag = CancellationFlag::new();
        let estimate = ProbabilisticEngine::new(&dynamics, &config, &flag).run().unwrap();
        assert!(estimate.is_converged());
        assert!(estimate.iterations() < config.iteration_cap());
        assert_eq!(32, estimate.chains());
        assert!(estimate.marginals().iter().all(|it| *it > 0.9));
    }

    #[test]
    fn oscillation_does_not_converge() {
        let dynamics = oscillating();
        let config = ProbabilisticConfig::default()
            .with_noise(0.0)
            .with_initial_states(vec![State::empty(2); 4]);
        let flag = CancellationFlag::new();
        let estimate = ProbabilisticEngine::new(&dynamics, &config, &flag).run().unwrap();
        assert!(!estimate.is_converged());
        assert_eq!(config.iteration_cap(), estimate.iterations());
        assert_eq!(4, estimate.chains());
        // `a` is active in every other step, `b` stays off.
        assert!((estimate.marginals()[0] - 0.5).abs() < 1e-9);
        assert_eq!(0.0, estimate.marginals()[1]);
    }

    #[test]
    fn degradation_and_noise() {
        let dynamics = stable();
        let flag = CancellationFlag::new();
        let config = ProbabilisticConfig::default().with_noise(0.0).with_degradation(0.5);
        let engine = ProbabilisticEngine::new(&dynamics, &config, &flag);
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        assert_eq!(vec![0.5, 0.5], engine.step(&[1.0, 1.0], &mut rng));

        let config = ProbabilisticConfig::default().with_noise(1.0);
        let engine = ProbabilisticEngine::new(&dynamics, &config, &flag);
        assert_eq!(vec![0.0, 0.0], engine.step(&[1.0, 1.0], &mut rng));
    }

    #[test]
    fn noisy_ensemble_needs_a_coarse_tolerance() {
        // One flip in 32 chains moves the ensemble mean by 1/32.
        let dynamics = stable();
        let flag = CancellationFlag::new();
        let config = ProbabilisticConfig::default().with_noise(0.01);
        let strict = ProbabilisticEngine::new(&dynamics, &config, &flag).run().unwrap();
        assert!(!strict.is_converged());

        let config = config.with_tolerance(0.5);
        let coarse = ProbabilisticEngine::new(&dynamics, &config, &flag).run().unwrap();
        assert!(coarse.is_converged());
        assert!(coarse.marginals().iter().all(|it| *it > 0.8));
    }

    #[test]
    fn same_seed_same_estimate() {
        let dynamics = stable();
        let config = ProbabilisticConfig::default().with_noise(0.2).with_seed(3);
        let flag = CancellationFlag::new();
        let first = ProbabilisticEngine::new(&dynamics, &config, &flag).run().unwrap();
        let second = ProbabilisticEngine::new(&dynamics, &config, &flag).run().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn invalid_initial_state() {
        let dynamics = stable();
        let config = ProbabilisticConfig::default().with_initial_states(vec![State::empty(3)]);
        let flag = CancellationFlag::new();
        assert!(ProbabilisticEngine::new(&dynamics, &config, &flag).run().is_err());
    }

    #[test]
    fn cancelled_run() {
        let dynamics = stable();
        let config = ProbabilisticConfig::default();
        let flag = CancellationFlag::new();
        flag.cancel();
        let estimate = ProbabilisticEngine::new(&dynamics, &config, &flag).run().unwrap();
        assert!(estimate.is_cancelled());
        assert_eq!(0, estimate.iterations());
    }
}
