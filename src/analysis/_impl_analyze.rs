use crate::analysis::{AnalysisResult, NetworkDefinition};
use crate::attractors::{Attractor, AttractorKind};
use crate::cancellation::CancellationFlag;
use crate::config::{DeterministicConfig, DynamicsMode, ProbabilisticConfig, WeightedConfig};
use crate::dynamics::{BooleanDynamics, TransitionFunction, WeightedDynamics};
use crate::explorer::{Exploration, Explorer};
use crate::fixed_points::FixedPoints;
use crate::probabilistic::ProbabilisticEngine;
use crate::state::StateCodec;
use crate::{AnalysisError, Network, RuleSet, State};
use fxhash::FxHashSet;
use log::{debug, info};
use num_traits::ToPrimitive;

/// Analyse the network in the given dynamics mode.
///
/// Equivalent to `analyze_with_cancellation` with a flag that is never set.
pub fn analyze(
    definition: &NetworkDefinition,
    mode: &DynamicsMode,
) -> Result<AnalysisResult, AnalysisError> {
    analyze_with_cancellation(definition, mode, &CancellationFlag::new())
}

/// Analyse the network in the given dynamics mode, stopping early once `cancellation`
/// is set.
///
/// All inputs are validated (and rules compiled) before any simulation starts. A
/// cancelled analysis returns the partial result computed so far, marked as truncated.
pub fn analyze_with_cancellation(
    definition: &NetworkDefinition,
    mode: &DynamicsMode,
    cancellation: &CancellationFlag,
) -> Result<AnalysisResult, AnalysisError> {
    let network = Network::new(definition.nodes().to_vec())?;
    mode.validate(network.num_nodes())?;
    debug!(
        "Starting {} analysis of {} nodes.",
        mode.name(),
        network.num_nodes()
    );

    let mut result = AnalysisResult::new(&network);
    for id in network.unreferenceable_nodes() {
        result.push_warning(format!(
            "Node `{}` cannot be referenced by any identifier.",
            network.get_node_id(id)
        ));
    }

    match mode {
        DynamicsMode::Deterministic(config) => {
            if !definition.edges().is_empty() || !definition.biases().is_empty() {
                result.push_warning(
                    "Edges and biases are ignored by the deterministic mode.".to_string(),
                );
            }
            analyze_deterministic(&network, definition, config, cancellation, &mut result)?;
        }
        DynamicsMode::Weighted(config) => {
            if !definition.rules().is_empty() {
                result.push_warning("Rules are ignored by the weighted mode.".to_string());
            }
            analyze_weighted(&network, definition, config, cancellation, &mut result)?;
        }
        DynamicsMode::Probabilistic(config) => {
            if !definition.rules().is_empty() {
                result.push_warning("Rules are ignored by the probabilistic mode.".to_string());
            }
            analyze_probabilistic(&network, definition, config, cancellation, &mut result)?;
        }
    }

    info!(
        "Analysis finished: {} attractors from {} explored states{}.",
        result.attractors.len(),
        result.explored_state_count,
        if result.truncated { " (truncated)" } else { "" }
    );
    Ok(result)
}

/// **(internal)** Exact boolean mode.
fn analyze_deterministic(
    network: &Network,
    definition: &NetworkDefinition,
    config: &DeterministicConfig,
    cancellation: &CancellationFlag,
    result: &mut AnalysisResult,
) -> Result<(), AnalysisError> {
    let rules = RuleSet::compile(network, definition.rules())?;
    let dynamics = BooleanDynamics::new(rules);
    let exploration = Explorer::new(&dynamics, config.limits(), cancellation).explore();
    let check_fixed_points = exploration.is_sampled()
        && !exploration.is_cancelled()
        && config.report_missed_fixed_points();
    let discovered: FxHashSet<State> = exploration
        .attractors()
        .iter()
        .filter(|it| it.kind() == AttractorKind::FixedPoint)
        .map(|it| it.canonical_state().clone())
        .collect();
    apply_exploration(result, exploration);

    if check_fixed_points {
        // At most `state_cap` fixed points are listed, anything above is not checked.
        let limit = config.limits().state_cap().to_usize().unwrap_or(usize::MAX);
        match FixedPoints::symbolic(dynamics.as_rule_set(), limit) {
            Ok(fixed_points) => {
                let missed = fixed_points
                    .iter()
                    .filter(|it| !discovered.contains(*it))
                    .count();
                if missed > 0 {
                    result.push_warning(format!(
                        "{} of {} fixed points were not reached by any sampled initial state.",
                        missed,
                        fixed_points.len()
                    ));
                }
            }
            Err(error) => debug!("Skipping fixed-point comparison: {}", error),
        }
    }
    Ok(())
}

/// **(internal)** Thresholded weighted mode, explored like the boolean mode.
fn analyze_weighted(
    network: &Network,
    definition: &NetworkDefinition,
    config: &WeightedConfig,
    cancellation: &CancellationFlag,
    result: &mut AnalysisResult,
) -> Result<(), AnalysisError> {
    let dynamics = WeightedDynamics::new(
        network,
        definition.edges(),
        definition.biases(),
        config.threshold(),
    )?;
    let exploration = Explorer::new(&dynamics, config.limits(), cancellation).explore();
    apply_exploration(result, exploration);
    Ok(())
}

/// **(internal)** Noisy weighted mode. Reports marginals and one approximate fixed point.
fn analyze_probabilistic(
    network: &Network,
    definition: &NetworkDefinition,
    config: &ProbabilisticConfig,
    cancellation: &CancellationFlag,
    result: &mut AnalysisResult,
) -> Result<(), AnalysisError> {
    let dynamics = WeightedDynamics::new(
        network,
        definition.edges(),
        definition.biases(),
        config.threshold(),
    )?;
    let codec = StateCodec::new(dynamics.as_network())
        .with_threshold(config.binarization_threshold())?;
    let estimate = ProbabilisticEngine::new(&dynamics, config, cancellation).run()?;

    if estimate.is_cancelled() {
        result.push_warning(format!(
            "Probabilistic simulation was cancelled after {} iterations.",
            estimate.iterations()
        ));
        result.truncated = true;
    } else if !estimate.is_converged() {
        result.push_warning(format!(
            "Marginals did not converge within {} iterations (tolerance {}).",
            estimate.iterations(),
            config.tolerance()
        ));
        result.truncated = true;
    }

    let chains = estimate.chains() as u64;
    result.explored_state_count = chains;
    result.converged = Some(estimate.is_converged());
    result.iterations = Some(estimate.iterations());
    let marginals = estimate.into_marginals();
    let dominant = codec.encode_values(&marginals);
    result.attractors = vec![Attractor::approximate(dominant, chains)];
    result.marginals = Some(marginals);
    Ok(())
}

/// **(internal)** Copy the outcome of an exploration into the result.
fn apply_exploration(result: &mut AnalysisResult, exploration: Exploration) {
    result.explored_state_count = exploration.explored_state_count();
    result.unresolved_state_count = exploration.unresolved_state_count();
    result.truncated = result.truncated || exploration.is_truncated();
    let (attractors, warnings) = exploration.into_parts();
    result.attractors = attractors;
    // Already logged by the explorer.
    result.warnings.extend(warnings);
}
