//! Exploration of the synchronous state-transition graph from a set of initial states.
//!
//! Every initial state is followed until the trajectory revisits a state (the revisited
//! part is an attractor) or until the step cap is exhausted. Since the dynamics is
//! deterministic, each trajectory ends in exactly one attractor, which makes the basin of
//! an attractor simply the number of initial states whose trajectory ends in it.
//!
//! The explorer is generic over the [`TransitionFunction`], so the boolean and weighted
//! modes share it unchanged.

use crate::analysis::report_warning;
use crate::attractors::{Attractor, AttractorAggregator};
use crate::cancellation::{CancellationFlag, CHECK_INTERVAL};
use crate::config::ExplorationLimits;
use crate::dynamics::TransitionFunction;
use crate::State;
use fxhash::{FxHashMap, FxHashSet};
use log::debug;
use num_bigint::BigUint;
use num_traits::{One, ToPrimitive};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Outcome of following a single trajectory.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Trajectory {
    /// The trajectory reached the given cycle (in visiting order).
    Attractor(Vec<State>),
    /// The step cap was exhausted before any state repeated.
    Unresolved,
    /// Cancellation was requested while following the trajectory.
    Cancelled,
}

/// Drives trajectories of a transition function under the configured caps.
pub struct Explorer<'a, T: TransitionFunction> {
    dynamics: &'a T,
    limits: &'a ExplorationLimits,
    cancellation: &'a CancellationFlag,
}

/// Aggregated result of an exploration.
#[derive(Clone, Debug)]
pub struct Exploration {
    attractors: Vec<Attractor>,
    explored_state_count: u64,
    unresolved_state_count: u64,
    total_state_space: BigUint,
    sampled: bool,
    cancelled: bool,
    warnings: Vec<String>,
}

impl<'a, T: TransitionFunction> Explorer<'a, T> {
    pub fn new(
        dynamics: &'a T,
        limits: &'a ExplorationLimits,
        cancellation: &'a CancellationFlag,
    ) -> Explorer<'a, T> {
        Explorer {
            dynamics,
            limits,
            cancellation,
        }
    }

    /// The number of all states, `2^n`.
    pub fn total_state_space(&self) -> BigUint {
        BigUint::one() << self.dynamics.num_nodes()
    }

    /// Follow the trajectory of `initial` for at most `step_cap` transitions.
    pub fn follow(&self, initial: State) -> Trajectory {
        let mut seen: FxHashMap<State, usize> = FxHashMap::default();
        let mut current = initial;
        for step in 0..self.limits.step_cap() {
            if step > 0 && step % CHECK_INTERVAL == 0 && self.cancellation.is_cancelled() {
                return Trajectory::Cancelled;
            }
            let next = self.dynamics.successor(&current);
            seen.insert(current, step);
            if let Some(first_visit) = seen.get(&next) {
                let period = step + 1 - *first_visit;
                return Trajectory::Attractor(self.unroll_cycle(next, period));
            }
            current = next;
        }
        Trajectory::Unresolved
    }

    /// Explore all initial states (or a sample of them if there are more than `state_cap`).
    pub fn explore(&self) -> Exploration {
        let num_nodes = self.dynamics.num_nodes();
        let total_state_space = self.total_state_space();
        let state_cap = self.limits.state_cap();
        let mut warnings = Vec::new();

        let exhaustive = total_state_space
            .to_u64()
            .filter(|total| *total <= state_cap);
        let initial_states: Box<dyn Iterator<Item = State>> = match exhaustive {
            Some(total) => {
                debug!("Enumerating all {} initial states.", total);
                Box::new((0..total).map(move |index| State::from_index(num_nodes, index)))
            }
            None => {
                debug!(
                    "Sampling {} of {} initial states (seed {}).",
                    state_cap,
                    total_state_space,
                    self.limits.seed()
                );
                report_warning(
                    &mut warnings,
                    format!(
                        "Only {} of {} initial states were sampled, small basins may be missed.",
                        state_cap, total_state_space
                    ),
                );
                let sample = sample_initial_states(num_nodes, state_cap, self.limits.seed());
                Box::new(sample.into_iter())
            }
        };

        let mut aggregator = AttractorAggregator::new();
        let mut explored_state_count = 0u64;
        let mut unresolved_state_count = 0u64;
        let mut cancelled = false;
        for initial in initial_states {
            if self.cancellation.is_cancelled() {
                cancelled = true;
                break;
            }
            match self.follow(initial) {
                Trajectory::Attractor(cycle) => {
                    aggregator.record(cycle);
                    explored_state_count += 1;
                }
                Trajectory::Unresolved => unresolved_state_count += 1,
                Trajectory::Cancelled => {
                    cancelled = true;
                    break;
                }
            }
        }

        if unresolved_state_count > 0 {
            report_warning(
                &mut warnings,
                format!(
                    "{} trajectories did not reach an attractor within {} steps.",
                    unresolved_state_count,
                    self.limits.step_cap()
                ),
            );
        }
        if cancelled {
            report_warning(
                &mut warnings,
                format!(
                    "Exploration was cancelled after {} initial states.",
                    explored_state_count + unresolved_state_count
                ),
            );
        }
        debug!(
            "Explored {} initial states, found {} attractors ({} unresolved).",
            explored_state_count,
            aggregator.len(),
            unresolved_state_count
        );

        Exploration {
            attractors: aggregator.finish(explored_state_count),
            explored_state_count,
            unresolved_state_count,
            total_state_space,
            sampled: exhaustive.is_none(),
            cancelled,
            warnings,
        }
    }

    /// **(internal)** List the `period` states of the cycle starting in `start`.
    fn unroll_cycle(&self, start: State, period: usize) -> Vec<State> {
        let mut cycle = Vec::with_capacity(period);
        let mut current = start;
        for _ in 1..period {
            let next = self.dynamics.successor(&current);
            cycle.push(current);
            current = next;
        }
        cycle.push(current);
        cycle
    }
}

impl Exploration {
    /// Attractors sorted by descending basin size.
    pub fn attractors(&self) -> &[Attractor] {
        &self.attractors
    }

    /// Number of initial states whose trajectory reached an attractor.
    pub fn explored_state_count(&self) -> u64 {
        self.explored_state_count
    }

    /// Number of initial states whose trajectory exhausted the step cap.
    pub fn unresolved_state_count(&self) -> u64 {
        self.unresolved_state_count
    }

    pub fn total_state_space(&self) -> &BigUint {
        &self.total_state_space
    }

    /// True if the initial states were a random sample of the state space.
    pub fn is_sampled(&self) -> bool {
        self.sampled
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    /// True if any cap or a cancellation cut the exploration short.
    pub fn is_truncated(&self) -> bool {
        self.sampled || self.cancelled || self.unresolved_state_count > 0
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// **(internal)** Split into attractors and warnings.
    pub(crate) fn into_parts(self) -> (Vec<Attractor>, Vec<String>) {
        (self.attractors, self.warnings)
    }
}

/// Draw `count` distinct uniformly random states of the given width.
///
/// The caller guarantees that `count` is smaller than `2^width`.
fn sample_initial_states(width: usize, count: u64, seed: u64) -> Vec<State> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let num_blocks = (width + 63) / 64;
    let mut seen: FxHashSet<State> = FxHashSet::default();
    let mut result = Vec::new();
    while (result.len() as u64) < count {
        let blocks: Vec<u64> = (0..num_blocks).map(|_| rng.gen::<u64>()).collect();
        let state = State::from_blocks(width, blocks);
        if seen.insert(state.clone()) {
            result.push(state);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use crate::cancellation::CancellationFlag;
    use crate::config::ExplorationLimits;
    use crate::dynamics::{BooleanDynamics, TransitionFunction};
    use crate::explorer::{sample_initial_states, Explorer, Trajectory};
    use crate::{Network, Node, Rule, RuleSet, State};
    use num_bigint::BigUint;
    use pretty_assertions::assert_eq;
    use test_log::test;

    fn dynamics(num_nodes: usize, rules: &[(&str, &str)]) -> BooleanDynamics {
        let nodes = (0..num_nodes)
            .map(|i| Node::unlabeled(&format!("x{}", i)))
            .collect();
        let network = Network::new(nodes).unwrap();
        let rules: Vec<Rule> = rules.iter().map(|(t, e)| Rule::new(t, e)).collect();
        BooleanDynamics::new(RuleSet::compile(&network, &rules).unwrap())
    }

    #[test]
    fn follow_finds_cycle() {
        let dynamics = dynamics(2, &[("x0", "!x1"), ("x1", "!x0")]);
        let limits = ExplorationLimits::default();
        let flag = CancellationFlag::new();
        let explorer = Explorer::new(&dynamics, &limits, &flag);
        let cycle = vec![
            State::from_binary_string("00").unwrap(),
            State::from_binary_string("11").unwrap(),
        ];
        assert_eq!(Trajectory::Attractor(cycle), explorer.follow(State::from_index(2, 0)));
        let fixed = State::from_binary_string("10").unwrap();
        assert_eq!(Trajectory::Attractor(vec![fixed.clone()]), explorer.follow(fixed));
    }

    #[test]
    fn step_cap_leaves_trajectory_unresolved() {
        // A 3-bit rotation has cycles of length 3 from most states.
        let dynamics = dynamics(3, &[("x0", "x2"), ("x1", "x0"), ("x2", "x1")]);
        let limits = ExplorationLimits::default().with_step_cap(2);
        let flag = CancellationFlag::new();
        let explorer = Explorer::new(&dynamics, &limits, &flag);
        let exploration = explorer.explore();
        // Only `000` and `111` are fixed points, the 6 other states rotate with period 3.
        assert_eq!(2, exploration.explored_state_count());
        assert_eq!(6, exploration.unresolved_state_count());
        assert!(exploration.is_truncated());
        assert!(!exploration.is_sampled());
        assert_eq!(1, exploration.warnings().len());
        let basins: u64 = exploration.attractors().iter().map(|it| it.basin_size()).sum();
        assert_eq!(exploration.explored_state_count(), basins);
    }

    #[test]
    fn every_attractor_is_a_valid_cycle() {
        let dynamics = dynamics(
            4,
            &[
                ("x0", "x1 ^ x3"),
                ("x1", "x0 & !x2"),
                ("x2", "x3 | x1"),
                ("x3", "!x0"),
            ],
        );
        let limits = ExplorationLimits::default();
        let flag = CancellationFlag::new();
        let exploration = Explorer::new(&dynamics, &limits, &flag).explore();
        assert_eq!(16, exploration.explored_state_count());
        assert_eq!(&BigUint::from(16u32), exploration.total_state_space());
        for attractor in exploration.attractors() {
            let states = attractor.states();
            for (i, state) in states.iter().enumerate() {
                let expected = &states[(i + 1) % states.len()];
                assert_eq!(expected, &dynamics.successor(state));
            }
            assert!(states.iter().all(|it| it >= attractor.canonical_state()));
        }
    }

    #[test]
    fn sampling_is_deterministic_and_distinct() {
        let first = sample_initial_states(70, 100, 7);
        let second = sample_initial_states(70, 100, 7);
        assert_eq!(first, second);
        let mut sorted = first.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(100, sorted.len());
        assert_ne!(first, sample_initial_states(70, 100, 8));
    }

    #[test]
    fn large_networks_are_sampled() {
        let dynamics = dynamics(12, &[("x0", "x1")]);
        let limits = ExplorationLimits::default().with_state_cap(100);
        let flag = CancellationFlag::new();
        let exploration = Explorer::new(&dynamics, &limits, &flag).explore();
        assert!(exploration.is_sampled());
        assert!(exploration.is_truncated());
        assert_eq!(100, exploration.explored_state_count());
    }

    #[test]
    fn cancelled_exploration_is_partial() {
        let dynamics = dynamics(3, &[]);
        let limits = ExplorationLimits::default();
        let flag = CancellationFlag::new();
        flag.cancel();
        let exploration = Explorer::new(&dynamics, &limits, &flag).explore();
        assert!(exploration.is_cancelled());
        assert!(exploration.is_truncated());
        assert_eq!(0, exploration.explored_state_count());
        assert!(exploration.attractors().is_empty());
    }
}
