/*!

  Evaluation of a [Circuit] for a single input assignment.

*/

use crate::{
    circuit::{Identifier, Instantiable},
    error::{Error, Result},
    netlist::{Circuit, Layer},
};
use bitvec::{slice::BitSlice, vec::BitVec};
use std::sync::Arc;
use tracing::trace;

/// Runtime options for simulation and enumeration
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimConfig {
    /// Report intermediate signals alongside inputs and outputs
    pub verbose: bool,
    /// Consult and fill the per-gate caches
    pub memoize: bool,
    /// Enumerate rows on the rayon thread pool, when the `parallel` feature is on
    pub parallel: bool,
    /// The largest number of primary inputs a full enumeration accepts
    pub max_inputs: usize,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            verbose: false,
            memoize: true,
            parallel: true,
            max_inputs: 20,
        }
    }
}

impl SimConfig {
    /// Sets whether intermediate signals are reported
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Sets whether gate caches are used
    pub fn with_memoize(mut self, memoize: bool) -> Self {
        self.memoize = memoize;
        self
    }

    /// Sets whether rows may be computed in parallel
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Sets the enumeration limit on primary inputs
    pub fn with_max_inputs(mut self, max_inputs: usize) -> Self {
        self.max_inputs = max_inputs;
        self
    }
}

/// The signal values known so far, indexed by signal slot.
/// Bindings are only ever added; a bound slot keeps its value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Environment {
    values: BitVec,
    bound: BitVec,
}

impl Environment {
    /// Creates an environment with `num_signals` unbound slots
    pub fn new(num_signals: usize) -> Self {
        Self {
            values: BitVec::repeat(false, num_signals),
            bound: BitVec::repeat(false, num_signals),
        }
    }

    /// Creates an empty environment sized for `circuit`
    pub fn for_circuit(circuit: &Circuit) -> Self {
        Self::new(circuit.num_signals())
    }

    /// Binds `slot` to `value` unless it is already bound.
    /// Returns `false` if an earlier binding was kept.
    pub fn bind(&mut self, slot: usize, value: bool) -> bool {
        if self.bound[slot] {
            return false;
        }
        self.values.set(slot, value);
        self.bound.set(slot, true);
        true
    }

    /// Returns the value in `slot`, if bound
    pub fn get(&self, slot: usize) -> Option<bool> {
        self.bound[slot].then(|| self.values[slot])
    }

    /// Returns `true` if `slot` is bound
    pub fn is_bound(&self, slot: usize) -> bool {
        self.bound[slot]
    }

    /// Returns the number of bound slots
    pub fn num_bound(&self) -> usize {
        self.bound.count_ones()
    }

    /// Collects the values of `slots` in order. `names` names the same
    /// signals and is used to report the first unbound one.
    fn gather(&self, slots: &[usize], names: &[Identifier]) -> Result<BitVec> {
        slots
            .iter()
            .zip(names)
            .map(|(slot, name)| {
                self.get(*slot)
                    .ok_or_else(|| Error::UnresolvedSignal(name.clone()))
            })
            .collect()
    }

    fn project(&self, circuit: &Circuit, names: &Arc<[Identifier]>) -> Partition {
        let values = names
            .iter()
            .map(|n| {
                circuit
                    .slot_of(n.get_name())
                    .and_then(|s| self.get(s))
                    .unwrap_or(false)
            })
            .collect();
        Partition {
            names: names.clone(),
            values,
        }
    }
}

/// Evaluates every gate of `layer` against `env` and returns `env` extended
/// with the gate outputs. Each gate only sees the signals it declares, and
/// outputs of the same layer are not visible to each other. Bindings already
/// in `env` take precedence over new outputs of the same slot.
pub fn eval_layer(layer: &Layer, mut env: Environment, memoize: bool) -> Result<Environment> {
    let mut fresh = Vec::with_capacity(layer.len());
    for gate in layer.gates() {
        let operands = env.gather(&gate.operand_slots, gate.get_input_ports())?;
        fresh.push((gate.output_slot, gate.run(&operands, memoize)));
    }
    for (slot, value) in fresh {
        env.bind(slot, value);
    }
    Ok(env)
}

/// Values of a fixed list of signals
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Partition {
    names: Arc<[Identifier]>,
    values: BitVec,
}

impl Partition {
    /// Returns the value of `signal`, if it belongs to the partition
    pub fn get(&self, signal: &str) -> Option<bool> {
        self.names
            .iter()
            .position(|n| n.get_name() == signal)
            .map(|i| self.values[i])
    }

    /// Returns the signal names, in partition order
    pub fn names(&self) -> &[Identifier] {
        &self.names
    }

    /// Returns the values, in partition order
    pub fn values(&self) -> &BitSlice {
        &self.values
    }

    /// Iterates over `(name, value)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (&Identifier, bool)> {
        self.names.iter().zip(self.values.iter().by_vals())
    }

    /// Returns the number of signals
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns `true` if the partition holds no signals
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Returns `true` if any value is 1
    pub fn any(&self) -> bool {
        self.values.any()
    }

    /// Returns `true` if every value is 1 (vacuously true when empty)
    pub fn all(&self) -> bool {
        self.values.all()
    }
}

/// The result of evaluating one input assignment
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResultRow {
    /// Binary value of the input assignment, first input most significant
    index: usize,
    inputs: Partition,
    intermediates: Option<Partition>,
    outputs: Partition,
}

impl ResultRow {
    /// Returns the assignment index of the row.
    /// Rows only exist for circuits with at most `usize::BITS` inputs.
    pub fn get_index(&self) -> usize {
        self.index
    }

    /// Returns the primary-input values as given
    pub fn inputs(&self) -> &Partition {
        &self.inputs
    }

    /// Returns the intermediate values, if the row was computed verbosely
    pub fn intermediates(&self) -> Option<&Partition> {
        self.intermediates.as_ref()
    }

    /// Returns the primary-output values
    pub fn outputs(&self) -> &Partition {
        &self.outputs
    }

    /// Looks a signal up in any partition
    pub fn get(&self, signal: &str) -> Option<bool> {
        self.inputs
            .get(signal)
            .or_else(|| self.outputs.get(signal))
            .or_else(|| self.intermediates.as_ref().and_then(|p| p.get(signal)))
    }

    /// Returns the partitions in display order
    pub fn partitions(&self) -> impl Iterator<Item = &Partition> {
        std::iter::once(&self.inputs)
            .chain(self.intermediates.as_ref())
            .chain(std::iter::once(&self.outputs))
    }

    /// Returns the row with the intermediate partition removed
    pub fn without_intermediates(&self) -> Self {
        Self {
            intermediates: None,
            ..self.clone()
        }
    }

    /// Some output is 1
    pub fn any_output_one(&self) -> bool {
        self.outputs.any()
    }

    /// Every output is 1
    pub fn all_outputs_one(&self) -> bool {
        self.outputs.all()
    }

    /// No output is 1
    pub fn no_output_one(&self) -> bool {
        !self.outputs.any()
    }

    /// Not every output is 1
    pub fn not_all_outputs_one(&self) -> bool {
        !self.outputs.all()
    }
}

impl Circuit {
    /// Folds [eval_layer] over every layer, starting from `env`
    pub fn evaluate(&self, env: Environment, memoize: bool) -> Result<Environment> {
        self.layers()
            .iter()
            .try_fold(env, |env, layer| eval_layer(layer, env, memoize))
    }

    /// Evaluates the circuit for an assignment of primary inputs by name.
    /// Every primary input must be assigned exactly once.
    pub fn simulate<S: AsRef<str>>(
        &self,
        assignment: impl IntoIterator<Item = (S, bool)>,
        config: &SimConfig,
    ) -> Result<ResultRow> {
        let mut env = Environment::for_circuit(self);
        for (name, value) in assignment {
            let name = name.as_ref();
            match self.slot_of(name) {
                Some(slot) if self.is_an_input(name) => {
                    if !env.bind(slot, value) {
                        return Err(Error::DuplicateOutput(name.into()));
                    }
                }
                _ => return Err(Error::UnresolvedSignal(name.into())),
            }
        }
        if let Some(missing) = self
            .get_inputs()
            .iter()
            .enumerate()
            .find(|(slot, _)| !env.is_bound(*slot))
        {
            return Err(Error::UnresolvedSignal(missing.1.clone()));
        }
        self.finish(env, config)
    }

    /// Evaluates the circuit for input values given in declaration order
    pub fn simulate_bits(&self, assignment: &BitSlice, config: &SimConfig) -> Result<ResultRow> {
        if assignment.len() != self.get_inputs().len() {
            let missing = self.get_inputs().get(assignment.len()).cloned();
            return Err(match missing {
                Some(name) => Error::UnresolvedSignal(name),
                None => Error::UnresolvedSignal(Identifier::from(format!(
                    "<input {}>",
                    assignment.len() - 1
                ))),
            });
        }
        let mut env = Environment::for_circuit(self);
        for (slot, value) in assignment.iter().by_vals().enumerate() {
            env.bind(slot, value);
        }
        self.finish(env, config)
    }

    fn finish(&self, env: Environment, config: &SimConfig) -> Result<ResultRow> {
        let width = self.get_inputs().len();
        if width > usize::BITS as usize {
            return Err(Error::TooManyInputs {
                count: width,
                limit: usize::BITS as usize,
            });
        }
        let env = self.evaluate(env, config.memoize)?;
        let inputs = env.project(self, &self.shared_inputs());
        let index = inputs
            .values()
            .iter()
            .by_vals()
            .fold(0usize, |acc, b| (acc << 1) | b as usize);
        trace!(index, "evaluated assignment");
        Ok(ResultRow {
            index,
            inputs,
            intermediates: config
                .verbose
                .then(|| env.project(self, &self.shared_intermediates())),
            outputs: env.project(self, &self.shared_outputs()),
        })
    }
}
