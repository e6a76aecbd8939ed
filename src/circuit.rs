/*!

  Signals, gate kinds, and the traits shared by everything that sits in a layer.

*/

use bitvec::slice::BitSlice;
use std::sync::Arc;

/// Why a string cannot be used as a signal name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameFault {
    /// The name is empty
    Empty,
    /// The name contains one of the reserved operator symbols
    Operator(char),
    /// The name contains a character that is neither a name character nor an operator
    Unsupported(char),
}

/// The name of a single-bit signal in a circuit.
/// Clones are cheap, the name is shared.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Identifier {
    name: Arc<str>,
}

impl Identifier {
    /// Creates a new identifier. The name is not checked, see [Identifier::check].
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self { name: name.into() }
    }

    /// Returns the name of the identifier
    pub fn get_name(&self) -> &str {
        &self.name
    }

    /// Returns the first fault in `name`, or `None` if it can name a signal.
    /// Names are non-empty runs of ASCII alphanumerics and underscores.
    pub fn check(name: &str) -> Option<NameFault> {
        if name.is_empty() {
            return Some(NameFault::Empty);
        }
        name.chars().find_map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' {
                None
            } else if GateKind::from_symbol(c).is_some() {
                Some(NameFault::Operator(c))
            } else {
                Some(NameFault::Unsupported(c))
            }
        })
    }

    /// Returns `true` if `name` can name a signal
    pub fn is_valid(name: &str) -> bool {
        Self::check(name).is_none()
    }
}

impl From<&str> for Identifier {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Identifier {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl AsRef<str> for Identifier {
    fn as_ref(&self) -> &str {
        &self.name
    }
}

impl std::borrow::Borrow<str> for Identifier {
    fn borrow(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Display for Identifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

/// The closed set of boolean operations a gate can perform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GateKind {
    /// AND-reduction, symbol `*`
    And,
    /// OR-reduction, symbol `+`
    Or,
    /// XOR-reduction, symbol `^`
    Xor,
    /// Complement of the first operand, symbol `~`
    Not,
}

impl GateKind {
    /// The order in which the builder looks for operator symbols in a token
    pub const SCAN_ORDER: [GateKind; 4] = [GateKind::And, GateKind::Or, GateKind::Xor, GateKind::Not];

    /// Returns the display symbol of the gate kind
    pub fn symbol(&self) -> char {
        match self {
            GateKind::And => '*',
            GateKind::Or => '+',
            GateKind::Xor => '^',
            GateKind::Not => '~',
        }
    }

    /// Looks up the gate kind for an operator symbol
    pub fn from_symbol(symbol: char) -> Option<Self> {
        Self::SCAN_ORDER.into_iter().find(|k| k.symbol() == symbol)
    }

    /// Returns the upper-case name of the gate kind
    pub fn name(&self) -> &'static str {
        match self {
            GateKind::And => "AND",
            GateKind::Or => "OR",
            GateKind::Xor => "XOR",
            GateKind::Not => "NOT",
        }
    }

    /// The fewest operands the gate kind can be built with
    pub fn min_arity(&self) -> usize {
        match self {
            GateKind::Not => 1,
            _ => 2,
        }
    }

    /// Returns `true` if only the first operand affects the result
    pub fn is_unary(&self) -> bool {
        matches!(self, GateKind::Not)
    }
}

impl std::fmt::Display for GateKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A pure boolean function over operand values in declared order
pub trait Logic {
    /// Computes the output bit
    fn eval(&self, operands: &BitSlice) -> bool;
}

impl Logic for GateKind {
    fn eval(&self, operands: &BitSlice) -> bool {
        match self {
            GateKind::And => operands.all(),
            GateKind::Or => operands.any(),
            GateKind::Xor => operands.count_ones() % 2 == 1,
            // Operands past the first are the grammar's duplicate and are ignored
            GateKind::Not => !operands.first().is_some_and(|b| *b),
        }
    }
}

/// A trait for primitives placed in a circuit layer
pub trait Instantiable {
    /// Returns the name of the primitive
    fn get_name(&self) -> &str;

    /// Returns the signals read by the primitive, in declared order
    fn get_input_ports(&self) -> &[Identifier];

    /// Returns the signal driven by the primitive
    fn get_output_port(&self) -> &Identifier;

    /// Returns the input signal at index `index`.
    fn get_input_port_at(&self, index: usize) -> &Identifier {
        &self.get_input_ports()[index]
    }

    /// Returns `true` if the primitive reads `signal`
    fn reads(&self, signal: &Identifier) -> bool {
        self.get_input_ports().contains(signal)
    }
}
