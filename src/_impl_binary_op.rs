use crate::BinaryOp;
use crate::BinaryOp::*;
use std::fmt::{Display, Error, Formatter};

impl BinaryOp {
    /// Binding strength used by the expression parser (higher binds tighter).
    pub(crate) fn precedence(self) -> u8 {
        match self {
            And => 3,
            Xor => 2,
            Or => 1,
        }
    }

    pub fn apply(self, left: bool, right: bool) -> bool {
        match self {
            And => left && right,
            Or => left || right,
            Xor => left != right,
        }
    }
}

impl Display for BinaryOp {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        let symbol = match self {
            And => "&",
            Or => "|",
            Xor => "^",
        };
        write!(f, "{}", symbol)?;
        Ok(())
    }
}
