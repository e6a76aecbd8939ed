/*!

  Gate instances and their memoization caches.

*/

use crate::circuit::{GateKind, Identifier, Instantiable, Logic};
use crate::error::{Error, Result};
use bitvec::{slice::BitSlice, vec::BitVec};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// A boolean gate placed in a circuit layer.
///
/// Each instance owns its own cache from operand values (in declared order)
/// to the computed output. The cache is behind a lock so a circuit can be
/// evaluated from several threads at once.
#[derive(Debug)]
pub struct Gate {
    /// The operation this gate performs
    kind: GateKind,
    /// Input signals, order matters
    inputs: Vec<Identifier>,
    /// The single output signal
    output: Identifier,
    /// Environment slots of `inputs`, resolved when the circuit is built
    pub(crate) operand_slots: Vec<usize>,
    /// Environment slot of `output`
    pub(crate) output_slot: usize,
    /// Memoized results keyed by operand values
    cache: Mutex<HashMap<BitVec, bool>>,
}

impl Gate {
    /// Creates a new gate, checking that `kind` gets enough operands
    pub fn new(kind: GateKind, inputs: Vec<Identifier>, output: Identifier) -> Result<Self> {
        if inputs.len() < kind.min_arity() {
            return Err(Error::Arity {
                kind,
                expected: kind.min_arity(),
                found: inputs.len(),
            });
        }
        Ok(Self {
            kind,
            inputs,
            output,
            operand_slots: Vec::new(),
            output_slot: usize::MAX,
            cache: Mutex::new(HashMap::new()),
        })
    }

    /// Returns the kind of the gate
    pub fn kind(&self) -> GateKind {
        self.kind
    }

    /// Returns the operands that actually affect the output.
    /// For NOT gates this is only the first declared operand.
    pub fn effective_inputs(&self) -> &[Identifier] {
        if self.kind.is_unary() {
            &self.inputs[..1]
        } else {
            &self.inputs
        }
    }

    /// Computes the output for operand values given in declared order,
    /// consulting and filling the cache when `memoize` is set.
    pub fn run(&self, operands: &BitSlice, memoize: bool) -> bool {
        if !memoize {
            return self.kind.eval(operands);
        }
        let mut cache = self.lock_cache();
        if let Some(hit) = cache.get(operands) {
            return *hit;
        }
        let result = self.kind.eval(operands);
        cache.insert(operands.to_bitvec(), result);
        result
    }

    /// Returns the number of cached operand combinations
    pub fn cache_len(&self) -> usize {
        self.lock_cache().len()
    }

    /// Drops every cached result
    pub fn clear_cache(&self) {
        self.lock_cache().clear();
    }

    fn lock_cache(&self) -> MutexGuard<'_, HashMap<BitVec, bool>> {
        // A poisoned cache still only holds correct results
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Instantiable for Gate {
    fn get_name(&self) -> &str {
        self.kind.name()
    }

    fn get_input_ports(&self) -> &[Identifier] {
        &self.inputs
    }

    fn get_output_port(&self) -> &Identifier {
        &self.output
    }
}

impl std::fmt::Display for Gate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let symbol = self.kind.symbol().to_string();
        if self.inputs.len() == 1 {
            // Unary gates are written with the operand on both sides of the symbol
            let only = &self.inputs[0];
            write!(f, "{only}{symbol}{only}={}", self.output)
        } else {
            let lhs: Vec<&str> = self.inputs.iter().map(|i| i.get_name()).collect();
            write!(f, "{}={}", lhs.join(&symbol), self.output)
        }
    }
}
