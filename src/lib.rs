//! A library for analysing the long-run behaviour of synchronous regulatory networks.
//!
//! A network is an ordered list of [`Node`]s together with either boolean update [`Rule`]s
//! (deterministic mode) or weighted [`Edge`]s with per-node biases (weighted and
//! probabilistic modes). The library compiles the rules, explores the synchronous
//! state-transition graph from sampled initial states, and reports the attractors of the
//! network together with the share of initial states that lead to each of them.
//!
//! ```rust
//! use biodivine_lib_sync_bn::config::DeterministicConfig;
//! use biodivine_lib_sync_bn::{analyze, DynamicsMode, NetworkDefinition, Node, Rule};
//!
//! let definition = NetworkDefinition::new(vec![Node::new("a", "A"), Node::new("b", "B")])
//!     .with_rules(vec![Rule::new("a", "NOT b"), Rule::new("b", "!a")]);
//! let mode = DynamicsMode::Deterministic(DeterministicConfig::default());
//! let result = analyze(&definition, &mode).unwrap();
//!
//! // Two fixed points (`10` and `01`) and one oscillation between `00` and `11`.
//! assert_eq!(4, result.explored_state_count());
//! assert_eq!(3, result.attractors().len());
//! assert!(!result.is_truncated());
//! ```
//!
//! Everything is computed from explicit inputs: there are no global settings and the
//! caps in [`config`] are the only resource limits.

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashMap;
use std::iter::Map;
use std::ops::Range;
use thiserror::Error;

pub mod analysis;
pub mod attractors;
pub mod cancellation;
pub mod config;
pub mod dynamics;
pub mod explorer;
pub mod fixed_points;
pub mod probabilistic;
pub mod state;

/// **(internal)** Tokenizer, shunting-yard parser and evaluator for rule expressions.
mod _expression_compiler;
/// **(internal)** Utility methods for `BinaryOp`.
mod _impl_binary_op;
/// **(internal)** Utility methods for `FnUpdate`.
mod _impl_fn_update;
/// **(internal)** Utility methods for `Network` (including the identifier symbol table).
mod _impl_network;
/// **(internal)** Utility methods for `Node`, `Rule` and `Edge`.
mod _impl_node;
/// **(internal)** Utility methods for `NodeId`.
mod _impl_node_id;

pub use analysis::{analyze, analyze_with_cancellation, AnalysisResult, NetworkDefinition};
pub use config::DynamicsMode;
pub use state::State;

lazy_static! {
    /// A node identifier that can be written directly into a rule expression.
    pub(crate) static ref ID_REGEX: Regex = Regex::new(r"^[a-zA-Z0-9_{}]+$").unwrap();
}

/// A type-safe index of a `Node` inside a `Network`.
///
/// The index is also the position of the node's bit in every `State`.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct NodeId(usize);

/// A node of a regulatory network.
///
/// The `id` is the stable, unique key of the node. The `label` is a human-readable name.
/// Rule expressions can refer to a node using either of them.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Node {
    id: String,
    label: String,
}

/// A boolean update rule `target = expression` of the deterministic mode.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rule {
    target: String,
    expression: String,
}

/// A weighted influence of `source` on `target` used by the weighted and probabilistic modes.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Edge {
    source: String,
    target: String,
    weight: f64,
}

/// Binary boolean operators that can appear in a rule expression.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum BinaryOp {
    And,
    Or,
    Xor,
}

/// A boolean formula over the nodes of a `Network`.
///
/// This is the tree view of a compiled rule. Evaluation during exploration uses the
/// equivalent postfix program stored in `CompiledRule`.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum FnUpdate {
    Const(bool),
    Var(NodeId),
    Not(Box<FnUpdate>),
    Binary(BinaryOp, Box<FnUpdate>, Box<FnUpdate>),
}

/// An ordered list of nodes together with a case-insensitive symbol table which resolves
/// identifiers (ids and labels) to node indices.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Network {
    nodes: Vec<Node>,
    id_to_index: HashMap<String, NodeId>,
    symbols: HashMap<String, Vec<NodeId>>,
}

/// A rule expression compiled into a postfix program over resolved node indices.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct CompiledRule {
    program: Vec<_expression_compiler::Instruction>,
}

/// All compiled rules of one network. Nodes without a rule are frozen.
///
/// The rules are compiled exactly once, when the `RuleSet` is created.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RuleSet {
    network: Network,
    rules: Vec<Option<CompiledRule>>,
}

/// Errors that abort an analysis before any simulation work is done.
///
/// Resource exhaustion (caps, cancellation) is never an error; it is reported through
/// `AnalysisResult::warnings` and `AnalysisResult::is_truncated`.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum AnalysisError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("Invalid configuration: {0}")]
    Configuration(String),
}

/// A rule that could not be compiled.
#[derive(Clone, Debug, Error, PartialEq)]
#[error("Cannot compile rule for `{target}` (`{expression}`): {kind}")]
pub struct ParseError {
    target: String,
    expression: String,
    kind: ParseErrorKind,
}

/// The reason why a rule could not be compiled.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum ParseErrorKind {
    #[error("unexpected token `{token}` at position {position}")]
    UnexpectedToken { token: String, position: usize },
    #[error("unknown identifier `{0}`")]
    UnknownIdentifier(String),
    #[error("identifier `{name}` is ambiguous (matches nodes {candidates:?})")]
    AmbiguousIdentifier {
        name: String,
        candidates: Vec<String>,
    },
    #[error("unbalanced parenthesis at position {position}")]
    UnbalancedParenthesis { position: usize },
    #[error("expression is empty")]
    EmptyExpression,
    #[error("target already has a rule")]
    DuplicateRule,
}

/// An iterator over all `NodeId`s of a `Network`.
pub type NodeIdIterator = Map<Range<usize>, fn(usize) -> NodeId>;

impl ParseError {
    pub(crate) fn new(target: &str, expression: &str, kind: ParseErrorKind) -> ParseError {
        ParseError {
            target: target.to_string(),
            expression: expression.to_string(),
            kind,
        }
    }

    /// The rule target as written by the caller.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// The expression that failed to compile.
    pub fn expression(&self) -> &str {
        &self.expression
    }

    pub fn kind(&self) -> &ParseErrorKind {
        &self.kind
    }
}

impl AnalysisError {
    pub(crate) fn config<T: Into<String>>(message: T) -> AnalysisError {
        AnalysisError::Configuration(message.into())
    }
}
