//! Deduplication of discovered cycles into a canonical attractor set with basin sizes.

use crate::State;
use fxhash::FxHashMap;
use std::fmt::{Display, Formatter};

/// Whether an attractor is a single state or a longer cycle.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum AttractorKind {
    FixedPoint,
    Cycle,
}

/// A terminal cycle of the synchronous dynamics.
///
/// The states are stored in the order in which the dynamics visits them, starting at the
/// smallest (canonical) state. The period is the number of states.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Attractor {
    states: Vec<State>,
    kind: AttractorKind,
    basin_size: u64,
    basin_share: f64,
    approximate: bool,
}

/// Collects attractors discovered by individual trajectories.
///
/// Two cycles are the same attractor iff they have the same smallest state.
#[derive(Clone, Debug, Default)]
pub struct AttractorAggregator {
    index: FxHashMap<State, usize>,
    attractors: Vec<Attractor>,
}

impl Attractor {
    /// **(internal)** An attractor with the given (already canonical) cycle and no basin.
    fn new(states: Vec<State>) -> Attractor {
        let kind = if states.len() == 1 {
            AttractorKind::FixedPoint
        } else {
            AttractorKind::Cycle
        };
        Attractor {
            states,
            kind,
            basin_size: 0,
            basin_share: 0.0,
            approximate: false,
        }
    }

    /// **(internal)** A fixed point estimated from marginal probabilities rather than found
    /// by exploration.
    pub(crate) fn approximate(state: State, basin_size: u64) -> Attractor {
        Attractor {
            states: vec![state],
            kind: AttractorKind::FixedPoint,
            basin_size,
            basin_share: if basin_size > 0 { 1.0 } else { 0.0 },
            approximate: true,
        }
    }

    /// States of the cycle, starting at the canonical state.
    pub fn states(&self) -> &[State] {
        &self.states
    }

    /// The smallest state of the cycle, used as the identity of the attractor.
    pub fn canonical_state(&self) -> &State {
        &self.states[0]
    }

    pub fn period(&self) -> usize {
        self.states.len()
    }

    pub fn kind(&self) -> AttractorKind {
        self.kind
    }

    /// Number of explored initial states whose trajectory ends in this attractor.
    pub fn basin_size(&self) -> u64 {
        self.basin_size
    }

    /// `basin_size` relative to all explored initial states.
    pub fn basin_share(&self) -> f64 {
        self.basin_share
    }

    /// True for the estimate produced by the probabilistic mode.
    pub fn is_approximate(&self) -> bool {
        self.approximate
    }

    pub fn contains(&self, state: &State) -> bool {
        self.states.contains(state)
    }
}

impl AttractorAggregator {
    pub fn new() -> AttractorAggregator {
        AttractorAggregator::default()
    }

    /// Record that one trajectory ended in the given cycle (in visiting order, starting
    /// at any of its states). Returns the index of the attractor.
    pub fn record(&mut self, mut cycle: Vec<State>) -> usize {
        let canonical = cycle
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| a.cmp(b))
            .map(|(i, _)| i)
            .unwrap_or(0);
        cycle.rotate_left(canonical);
        let index = match cycle.first().and_then(|it| self.index.get(it)).copied() {
            Some(index) => index,
            None => {
                let index = self.attractors.len();
                if let Some(first) = cycle.first() {
                    self.index.insert(first.clone(), index);
                }
                self.attractors.push(Attractor::new(cycle));
                index
            }
        };
        self.attractors[index].basin_size += 1;
        index
    }

    pub fn len(&self) -> usize {
        self.attractors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attractors.is_empty()
    }

    /// Iterate over all attractors found so far, in the order of discovery.
    pub fn attractors(&self) -> impl Iterator<Item = &Attractor> {
        self.attractors.iter()
    }

    /// Compute basin shares relative to `explored` initial states and return the attractors
    /// sorted by descending basin size, ties broken by the canonical state.
    pub fn finish(self, explored: u64) -> Vec<Attractor> {
        let mut attractors = self.attractors;
        for attractor in attractors.iter_mut() {
            attractor.basin_share = if explored == 0 {
                0.0
            } else {
                attractor.basin_size as f64 / explored as f64
            };
        }
        attractors.sort_by(|a, b| {
            b.basin_size
                .cmp(&a.basin_size)
                .then_with(|| a.canonical_state().cmp(b.canonical_state()))
        });
        attractors
    }
}

impl Display for AttractorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            AttractorKind::FixedPoint => write!(f, "fixed-point"),
            AttractorKind::Cycle => write!(f, "cycle"),
        }
    }
}

impl Display for Attractor {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let states: Vec<String> = self.states.iter().map(|it| it.to_string()).collect();
        write!(
            f,
            "{} [{}] (basin {})",
            self.kind,
            states.join(" -> "),
            self.basin_size
        )
    }
}

#[cfg(test)]
mod tests {
    use crate::attractors::{AttractorAggregator, AttractorKind};
    use crate::State;
    use pretty_assertions::assert_eq;

    fn states(values: &[&str]) -> Vec<State> {
        values
            .iter()
            .map(|it| State::from_binary_string(it).unwrap())
            .collect()
    }

    #[test]
    fn cycles_are_deduplicated_by_canonical_state() {
        let mut aggregator = AttractorAggregator::new();
        assert_eq!(0, aggregator.record(states(&["11", "01", "10"])));
        assert_eq!(0, aggregator.record(states(&["10", "11", "01"])));
        assert_eq!(1, aggregator.record(states(&["00"])));
        assert_eq!(2, aggregator.len());

        let cycle = aggregator.attractors().next().unwrap();
        assert_eq!(states(&["01", "10", "11"]), cycle.states());
        assert_eq!(AttractorKind::Cycle, cycle.kind());
        assert_eq!(3, cycle.period());
        assert_eq!(2, cycle.basin_size());
    }

    #[test]
    fn finish_sorts_and_computes_shares() {
        let mut aggregator = AttractorAggregator::new();
        aggregator.record(states(&["11"]));
        aggregator.record(states(&["10"]));
        aggregator.record(states(&["01", "00"]));
        aggregator.record(states(&["01", "00"]));
        let attractors = aggregator.finish(4);

        let canonical: Vec<String> = attractors
            .iter()
            .map(|it| it.canonical_state().to_string())
            .collect();
        assert_eq!(vec!["00", "10", "11"], canonical);
        assert_eq!(0.5, attractors[0].basin_share());
        assert_eq!(0.25, attractors[1].basin_share());
        assert_eq!(AttractorKind::FixedPoint, attractors[2].kind());
        let total: u64 = attractors.iter().map(|it| it.basin_size()).sum();
        assert_eq!(4, total);
    }

    #[test]
    fn empty_exploration() {
        assert!(AttractorAggregator::new().finish(0).is_empty());
    }
}
