use crate::analysis::{report_warning, AnalysisResult};
use crate::attractors::{Attractor, AttractorKind};
use crate::{Network, State};
use num_bigint::BigUint;
use num_traits::One;
use std::collections::BTreeMap;
use std::io::Write;

impl AnalysisResult {
    /// **(internal)** An empty result for the given network: nothing explored, no
    /// attractors, full state space `2^n`.
    pub(crate) fn new(network: &Network) -> AnalysisResult {
        let node_labels = network
            .nodes()
            .map(|id| {
                let node = network.get_node(id);
                (node.id().to_string(), node.label().to_string())
            })
            .collect();
        AnalysisResult {
            node_order: network.node_order(),
            node_labels,
            explored_state_count: 0,
            unresolved_state_count: 0,
            total_state_space: BigUint::one() << network.num_nodes(),
            attractors: Vec::new(),
            warnings: Vec::new(),
            truncated: false,
            marginals: None,
            converged: None,
            iterations: None,
        }
    }

    /// **(internal)** Add a warning (also emitted through the log).
    pub(crate) fn push_warning(&mut self, message: String) {
        report_warning(&mut self.warnings, message);
    }
}

/// Read-only access to the result.
impl AnalysisResult {
    /// Node ids in the order of bits in every reported `State`.
    pub fn node_order(&self) -> &[String] {
        &self.node_order
    }

    /// Map from node id to node label.
    pub fn node_labels(&self) -> &BTreeMap<String, String> {
        &self.node_labels
    }

    /// Number of initial states whose trajectory reached an attractor. For the
    /// probabilistic mode, this is the number of simulated chains.
    pub fn explored_state_count(&self) -> u64 {
        self.explored_state_count
    }

    /// Number of initial states whose trajectory did not reach an attractor within the
    /// step cap.
    pub fn unresolved_state_count(&self) -> u64 {
        self.unresolved_state_count
    }

    /// The exact number of states of the network, `2^n`.
    pub fn total_state_space(&self) -> &BigUint {
        &self.total_state_space
    }

    /// Attractors sorted by descending basin size, ties broken by the canonical state.
    pub fn attractors(&self) -> &[Attractor] {
        &self.attractors
    }

    /// All period-1 attractors.
    pub fn fixed_points(&self) -> impl Iterator<Item = &Attractor> {
        self.attractors
            .iter()
            .filter(|it| it.kind() == AttractorKind::FixedPoint)
    }

    /// The attractor which contains the given state, if any.
    pub fn find_attractor(&self, state: &State) -> Option<&Attractor> {
        self.attractors.iter().find(|it| it.contains(state))
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// True if a cap or a cancellation cut the computation short.
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    /// Estimated probability of each node being active (probabilistic mode only), in
    /// node order.
    pub fn marginals(&self) -> Option<&[f64]> {
        self.marginals.as_deref()
    }

    /// Marginal probability of the node with the given id (probabilistic mode only).
    pub fn marginal(&self, node_id: &str) -> Option<f64> {
        let position = self.node_order.iter().position(|it| it == node_id)?;
        self.marginals.as_ref().map(|it| it[position])
    }

    /// Whether the probabilistic mode converged (`None` for other modes).
    pub fn is_converged(&self) -> Option<bool> {
        self.converged
    }

    /// Number of performed probabilistic iterations (`None` for other modes).
    pub fn iterations(&self) -> Option<usize> {
        self.iterations
    }
}

/// Export.
impl AnalysisResult {
    /// Write one CSV row per attractor state.
    ///
    /// The columns are `attractor, kind, period, position`, one column per node (in node
    /// order) with values `0`/`1`, and `basin_size, basin_share, approximate`.
    pub fn write_csv<W: Write>(&self, output: W) -> Result<(), csv::Error> {
        let mut writer = csv::Writer::from_writer(output);
        let mut header: Vec<&str> = vec!["attractor", "kind", "period", "position"];
        header.extend(self.node_order.iter().map(|it| it.as_str()));
        header.extend(["basin_size", "basin_share", "approximate"]);
        writer.write_record(&header)?;

        for (index, attractor) in self.attractors.iter().enumerate() {
            for (position, state) in attractor.states().iter().enumerate() {
                let mut record: Vec<String> = vec![
                    index.to_string(),
                    attractor.kind().to_string(),
                    attractor.period().to_string(),
                    position.to_string(),
                ];
                record.extend(
                    state
                        .values()
                        .into_iter()
                        .map(|it| u8::from(it).to_string()),
                );
                record.push(attractor.basin_size().to_string());
                record.push(attractor.basin_share().to_string());
                record.push(attractor.is_approximate().to_string());
                writer.write_record(&record)?;
            }
        }
        writer.flush()?;
        Ok(())
    }

    /// The same table as `write_csv`, as a string.
    pub fn to_csv_string(&self) -> Result<String, csv::Error> {
        let mut buffer: Vec<u8> = Vec::new();
        self.write_csv(&mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }

    /// Pretty-printed JSON representation of the whole result.
    #[cfg(feature = "serde")]
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use crate::analysis::AnalysisResult;
    use crate::attractors::AttractorAggregator;
    use crate::{Network, Node, State};
    use pretty_assertions::assert_eq;

    fn result() -> AnalysisResult {
        let network = Network::new(vec![Node::new("b", "Beta"), Node::new("a", "Alpha")]).unwrap();
        let mut result = AnalysisResult::new(&network);
        let mut aggregator = AttractorAggregator::new();
        aggregator.record(vec![State::from_binary_string("10").unwrap()]);
        aggregator.record(vec![
            State::from_binary_string("11").unwrap(),
            State::from_binary_string("00").unwrap(),
        ]);
        aggregator.record(vec![
            State::from_binary_string("00").unwrap(),
            State::from_binary_string("11").unwrap(),
        ]);
        result.attractors = aggregator.finish(3);
        result.explored_state_count = 3;
        result
    }

    #[test]
    fn csv_columns_follow_node_order() {
        let csv = result().to_csv_string().unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(
            "attractor,kind,period,position,b,a,basin_size,basin_share,approximate",
            lines[0]
        );
        assert_eq!(4, lines.len());
        assert!(lines[1].starts_with("0,cycle,2,0,0,0,2,"));
        assert!(lines[2].starts_with("0,cycle,2,1,1,1,2,"));
        assert_eq!("1,fixed-point,1,0,1,0,1,0.3333333333333333,false", lines[3]);
    }

    #[test]
    fn accessors() {
        let result = result();
        assert_eq!(&["b".to_string(), "a".to_string()], result.node_order());
        assert_eq!("Alpha", result.node_labels()["a"]);
        assert_eq!(1, result.fixed_points().count());
        let state = State::from_binary_string("11").unwrap();
        assert_eq!(2, result.find_attractor(&state).unwrap().period());
        assert_eq!(None, result.marginal("a"));
        assert_eq!(None, result.is_converged());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn json_export() {
        let result = result();
        let json = result.to_json().unwrap();
        assert!(json.contains("\"total_state_space\": \"4\""));
        assert!(json.contains("\"fixed-point\""));
        assert!(json.contains("\"10\""));
        let parsed: AnalysisResult = serde_json::from_str(&json).unwrap();
        assert_eq!(result, parsed);
    }
}
