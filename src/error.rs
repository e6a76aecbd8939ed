/*!

  Errors raised while building or simulating a circuit.

*/

use crate::circuit::{GateKind, Identifier};
use thiserror::Error;

/// Result type alias for circuit operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building, verifying, or evaluating a circuit
#[derive(Debug, Error)]
pub enum Error {
    /// A token does not follow the `lhs=output` grammar
    #[error("malformed token `{token}` in layer {layer}: {reason}")]
    Parse {
        /// Zero-based layer index of the token
        layer: usize,
        /// The offending token, whitespace stripped
        token: String,
        /// What is wrong with it
        reason: String,
    },

    /// An operator character outside `* + ^ ~`
    #[error("unsupported operation `{symbol}` in token `{token}`")]
    UnsupportedOperation {
        /// The offending token
        token: String,
        /// The unrecognized operator character
        symbol: char,
    },

    /// A signal is read but never produced, or an assignment names an unknown input
    #[error("unresolved signal `{0}`")]
    UnresolvedSignal(Identifier),

    /// A signal name is produced or declared more than once
    #[error("signal `{0}` is declared more than once")]
    DuplicateOutput(Identifier),

    /// A gate reads a signal produced in its own or a later layer
    #[error("gate `{gate}` reads `{signal}` before it is produced")]
    CombinationalCycle {
        /// Output name of the offending gate
        gate: Identifier,
        /// The signal that is not yet available
        signal: Identifier,
    },

    /// A gate kind received too few operands
    #[error("{kind} gate expects at least {expected} operand(s), found {found}")]
    Arity {
        /// The kind of gate being built
        kind: GateKind,
        /// Minimum number of operands
        expected: usize,
        /// Number of operands supplied
        found: usize,
    },

    /// Exhaustive enumeration was requested over too many inputs
    #[error("cannot enumerate {count} inputs, the configured limit is {limit}")]
    TooManyInputs {
        /// Number of primary inputs in the circuit
        count: usize,
        /// The configured limit
        limit: usize,
    },

    /// Reading a circuit description failed
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn parse(layer: usize, token: &str, reason: impl Into<String>) -> Self {
        Error::Parse {
            layer,
            token: token.to_string(),
            reason: reason.into(),
        }
    }
}
