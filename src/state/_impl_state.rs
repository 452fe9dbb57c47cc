use crate::state::State;
use crate::AnalysisError;
use num_bigint::BigUint;
use std::fmt::{Debug, Display, Formatter};

const BLOCK: usize = 64;

impl State {
    /// A state of the given width with all values set to `false`.
    pub fn empty(width: usize) -> State {
        State {
            width,
            blocks: vec![0; block_count(width)],
        }
    }

    /// Build a state from explicit node values (in node order).
    pub fn from_values(values: &[bool]) -> State {
        let mut state = State::empty(values.len());
        for (i, value) in values.iter().enumerate() {
            if *value {
                state.set(i, true);
            }
        }
        state
    }

    /// Build a state from its dense integer value. The first node is the most significant bit.
    ///
    /// Panics if `width` is larger than 64 or if `index` does not fit into `width` bits.
    pub fn from_index(width: usize, index: u64) -> State {
        assert!(width <= BLOCK, "Dense `u64` index supports at most 64 nodes.");
        assert!(
            width == BLOCK || index >> width == 0,
            "Index {} does not fit into {} bits.",
            index,
            width
        );
        if width == 0 {
            return State::empty(0);
        }
        State {
            width,
            blocks: vec![index << (BLOCK - width)],
        }
    }

    /// **(internal)** Build a state directly from its packed blocks, clearing padding bits.
    pub(crate) fn from_blocks(width: usize, mut blocks: Vec<u64>) -> State {
        blocks.resize(block_count(width), 0);
        let padding = blocks.len() * BLOCK - width;
        if padding > 0 {
            if let Some(last) = blocks.last_mut() {
                *last &= u64::MAX << padding;
            }
        }
        State { width, blocks }
    }

    /// Parse a state from a string of `0`/`1` characters (first node first).
    pub fn from_binary_string(value: &str) -> Result<State, AnalysisError> {
        let mut values = Vec::with_capacity(value.len());
        for c in value.trim().chars() {
            match c {
                '0' => values.push(false),
                '1' => values.push(true),
                _ => {
                    return Err(AnalysisError::config(format!(
                        "Invalid character `{}` in state `{}`.",
                        c, value
                    )))
                }
            }
        }
        Ok(State::from_values(&values))
    }

    /// The number of nodes in this state.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Value of the node at the given position.
    pub fn get(&self, index: usize) -> bool {
        self.check_access(index);
        let (block, mask) = locate(index);
        self.blocks[block] & mask != 0
    }

    pub fn set(&mut self, index: usize, value: bool) {
        self.check_access(index);
        let (block, mask) = locate(index);
        if value {
            self.blocks[block] |= mask;
        } else {
            self.blocks[block] &= !mask;
        }
    }

    /// Invert the value of the node at the given position.
    pub fn flip(&mut self, index: usize) {
        self.check_access(index);
        let (block, mask) = locate(index);
        self.blocks[block] ^= mask;
    }

    /// A vector of all node values (in node order).
    pub fn values(&self) -> Vec<bool> {
        (0..self.width).map(|i| self.get(i)).collect()
    }

    /// Positions of all nodes which are `true` in this state.
    pub fn ones(&self) -> Vec<usize> {
        (0..self.width).filter(|i| self.get(*i)).collect()
    }

    /// The dense integer value of this state, if it fits into `u64`.
    pub fn to_index(&self) -> Option<u64> {
        if self.width > BLOCK {
            None
        } else if self.width == 0 {
            Some(0)
        } else {
            Some(self.blocks[0] >> (BLOCK - self.width))
        }
    }

    /// The dense integer value of this state.
    pub fn to_biguint(&self) -> BigUint {
        let bytes: Vec<u8> = self
            .blocks
            .iter()
            .flat_map(|block| block.to_be_bytes())
            .collect();
        let padding = self.blocks.len() * BLOCK - self.width;
        BigUint::from_bytes_be(&bytes) >> padding
    }

    /// Binary string of this state, the first node is the leftmost character.
    pub fn to_binary_string(&self) -> String {
        (0..self.width)
            .map(|i| if self.get(i) { '1' } else { '0' })
            .collect()
    }

    /// **(internal)** Check if the given index is valid in this `State` - panic otherwise.
    fn check_access(&self, index: usize) {
        if index >= self.width {
            panic!(
                "Accessing node {} in a state of width {}.",
                index, self.width
            );
        }
    }
}

/// **(internal)** Number of `u64` blocks needed for `width` bits.
fn block_count(width: usize) -> usize {
    (width + BLOCK - 1) / BLOCK
}

/// **(internal)** Block index and bit mask of a node position (first node = highest bit).
fn locate(index: usize) -> (usize, u64) {
    (index / BLOCK, 1u64 << (BLOCK - 1 - (index % BLOCK)))
}

impl Display for State {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        write!(f, "{}", self.to_binary_string())
    }
}

impl Debug for State {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        write!(f, "State({})", self.to_binary_string())
    }
}

impl From<Vec<bool>> for State {
    fn from(values: Vec<bool>) -> Self {
        State::from_values(&values)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for State {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_binary_string())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for State {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        State::from_binary_string(&value).map_err(serde::de::Error::custom)
    }
}
