/*!

  The compiled, immutable layered circuit.

*/

use crate::{
    builder::CircuitBuilder,
    circuit::{Identifier, Instantiable},
    error::{Error, Result},
    gate::Gate,
    graph::Analysis,
};
use std::{
    collections::{HashMap, HashSet},
    path::Path,
    sync::Arc,
};
use tracing::debug;

/// An ordered set of mutually independent gates
#[derive(Debug)]
pub struct Layer {
    /// The line of the description this layer came from
    index: usize,
    /// Gates in declaration order
    gates: Vec<Gate>,
}

impl Layer {
    pub(crate) fn new(index: usize, gates: Vec<Gate>) -> Self {
        Self { index, gates }
    }

    /// Returns the zero-based position of the layer in the description
    pub fn get_index(&self) -> usize {
        self.index
    }

    /// Returns the gates of the layer
    pub fn gates(&self) -> &[Gate] {
        &self.gates
    }

    /// Returns the number of gates in the layer
    pub fn len(&self) -> usize {
        self.gates.len()
    }

    /// Returns `true` if the layer holds no gates
    pub fn is_empty(&self) -> bool {
        self.gates.is_empty()
    }
}

/// A combinational circuit: layers of gates plus its primary inputs and outputs.
///
/// Every signal is given a fixed slot when the circuit is built: primary inputs
/// first, in declaration order, then gate outputs in production order.
/// Evaluation works on those slots rather than on names.
#[derive(Debug)]
pub struct Circuit {
    layers: Vec<Layer>,
    inputs: Arc<[Identifier]>,
    outputs: Arc<[Identifier]>,
    /// Slot to signal name
    signals: Vec<Identifier>,
    /// Signal name to slot
    index: HashMap<Identifier, usize>,
    /// Gate-produced signals that are not outputs, latest produced first
    intermediates: Arc<[Identifier]>,
}

impl Circuit {
    pub(crate) fn new(
        layers: Vec<Layer>,
        inputs: Vec<Identifier>,
        outputs: Vec<Identifier>,
        signals: Vec<Identifier>,
    ) -> Self {
        let index = signals
            .iter()
            .enumerate()
            .map(|(slot, name)| (name.clone(), slot))
            .collect();
        let boundary: HashSet<&Identifier> = inputs.iter().chain(outputs.iter()).collect();
        let intermediates = signals[inputs.len()..]
            .iter()
            .rev()
            .filter(|s| !boundary.contains(s))
            .cloned()
            .collect();
        Self {
            layers,
            inputs: inputs.into(),
            outputs: outputs.into(),
            signals,
            index,
            intermediates,
        }
    }

    /// Builds a circuit from layers of tokens, see [CircuitBuilder::from_layers]
    pub fn from_layers<L, T>(layers: L) -> Result<Self>
    where
        L: IntoIterator<Item = T>,
        T: IntoIterator,
        T::Item: AsRef<str>,
    {
        CircuitBuilder::from_layers(layers)
    }

    /// Reads and builds a circuit description from a file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "loading circuit");
        std::fs::read_to_string(path)?.parse()
    }

    /// Returns the primary inputs in declaration order
    pub fn get_inputs(&self) -> &[Identifier] {
        &self.inputs
    }

    /// Returns the primary outputs in declaration order
    pub fn get_outputs(&self) -> &[Identifier] {
        &self.outputs
    }

    /// Returns the signals that are neither inputs nor outputs, latest produced first
    pub fn get_intermediates(&self) -> &[Identifier] {
        &self.intermediates
    }

    pub(crate) fn shared_inputs(&self) -> Arc<[Identifier]> {
        self.inputs.clone()
    }

    pub(crate) fn shared_outputs(&self) -> Arc<[Identifier]> {
        self.outputs.clone()
    }

    pub(crate) fn shared_intermediates(&self) -> Arc<[Identifier]> {
        self.intermediates.clone()
    }

    /// Returns the layers that hold at least one gate, in evaluation order
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Returns the number of signals in the circuit
    pub fn num_signals(&self) -> usize {
        self.signals.len()
    }

    /// Returns every signal, inputs first, then gate outputs in production order
    pub fn signals(&self) -> impl Iterator<Item = &Identifier> {
        self.signals.iter()
    }

    /// Returns the environment slot of a signal
    pub fn slot_of(&self, signal: &str) -> Option<usize> {
        self.index.get(signal).copied()
    }

    /// Returns the signal held in `slot`
    pub fn signal_at(&self, slot: usize) -> &Identifier {
        &self.signals[slot]
    }

    /// Returns `true` if `signal` is a primary input
    pub fn is_an_input(&self, signal: &str) -> bool {
        self.slot_of(signal).is_some_and(|s| s < self.inputs.len())
    }

    /// Returns `true` if `signal` is a primary output
    pub fn is_an_output(&self, signal: &str) -> bool {
        self.outputs.iter().any(|o| o.get_name() == signal)
    }

    /// Returns an iterator over every gate, layer by layer
    pub fn gates(&self) -> impl Iterator<Item = &Gate> {
        self.layers.iter().flat_map(|l| l.gates.iter())
    }

    /// Returns the gate that drives `signal`, if any
    pub fn find_driver(&self, signal: &str) -> Option<&Gate> {
        let slot = self.slot_of(signal)?;
        self.gates().find(|g| g.output_slot == slot)
    }

    /// Runs an analysis over the circuit
    pub fn get_analysis<'a, A: Analysis<'a>>(&'a self) -> Result<A> {
        A::build(self)
    }

    /// Drops the memoized results of every gate
    pub fn clear_caches(&self) {
        self.gates().for_each(Gate::clear_cache);
        debug!("cleared gate caches");
    }

    /// Checks the invariants the builder establishes: unique producers and
    /// strictly feed-forward layers.
    pub fn verify(&self) -> Result<()> {
        let mut available: HashSet<&Identifier> = HashSet::new();
        for input in self.inputs.iter() {
            if !available.insert(input) {
                return Err(Error::DuplicateOutput(input.clone()));
            }
        }
        for layer in &self.layers {
            for gate in &layer.gates {
                for operand in gate.get_input_ports() {
                    if !available.contains(operand) {
                        return Err(Error::CombinationalCycle {
                            gate: gate.get_output_port().clone(),
                            signal: operand.clone(),
                        });
                    }
                }
            }
            for gate in &layer.gates {
                if !available.insert(gate.get_output_port()) {
                    return Err(Error::DuplicateOutput(gate.get_output_port().clone()));
                }
            }
        }
        match self.outputs.iter().find(|o| !available.contains(o)) {
            Some(missing) => Err(Error::UnresolvedSignal(missing.clone())),
            None => Ok(()),
        }
    }
}

impl std::str::FromStr for Circuit {
    type Err = Error;

    /// One layer per non-blank line, comma separated tokens.
    fn from_str(s: &str) -> Result<Self> {
        CircuitBuilder::from_layers(
            s.lines()
                .filter(|line| !line.trim().is_empty())
                .map(|line| line.split(',')),
        )
    }
}

impl std::fmt::Display for Circuit {
    /// Emits the layered text format: inputs, one line per gate layer, outputs.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let declare = |names: &[Identifier]| {
            names
                .iter()
                .map(|n| format!("{n}={n}"))
                .collect::<Vec<_>>()
                .join(", ")
        };

        if !self.inputs.is_empty() {
            writeln!(f, "{}", declare(&self.inputs))?;
        }
        for layer in &self.layers {
            let tokens: Vec<String> = layer.gates.iter().map(|g| g.to_string()).collect();
            writeln!(f, "{}", tokens.join(", "))?;
        }
        writeln!(f, "{}", declare(&self.outputs))
    }
}
