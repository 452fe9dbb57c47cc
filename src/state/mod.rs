//! Explicit representation of network states.
//!
//! A `State` is a fixed-width bit vector with one bit per network node. The first node of
//! the node order is the *most significant* bit, so the binary string of a state reads the
//! nodes left to right, and the natural ordering of states is the lexicographic ordering
//! of these strings:
//!
//! ```rust
//! use biodivine_lib_sync_bn::State;
//! let state = State::from_binary_string("0110").unwrap();
//! assert_eq!(4, state.width());
//! assert!(state.get(1) && state.get(2));
//! assert_eq!(Some(6), state.to_index());
//! assert_eq!(state, State::from_index(4, 6));
//! assert!(State::from_binary_string("0101").unwrap() < state);
//! ```
//!
//! The bits are packed into `u64` blocks, hence states of arbitrary width are supported and
//! hashing or comparing a state costs one word operation per 64 nodes.
//!
//! `StateCodec` converts between states and named node values (including continuous values
//! which are binarized at a threshold).

use std::collections::HashMap;

mod _impl_state;
mod _impl_state_codec;

pub use _impl_state_codec::DEFAULT_THRESHOLD;

/// A fixed-width vector of node values.
///
/// Equality, hashing and ordering correspond to the dense integer value of the state
/// (see `State::to_biguint`), assuming the states have the same width.
#[derive(Clone, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct State {
    width: usize,
    blocks: Vec<u64>,
}

/// Converts between `State`s and node values identified by node ids.
///
/// Continuous values are binarized using `threshold`: a value is "on" iff it is greater
/// or equal to the threshold.
#[derive(Clone, Debug, PartialEq)]
pub struct StateCodec {
    node_order: Vec<String>,
    node_index: HashMap<String, usize>,
    threshold: f64,
}
