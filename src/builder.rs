/*!

  Compiles the layered gate-list format into a [Circuit].

  Each layer is a list of tokens of the form `lhs=output`:

  - `X=X` declares `X` as a primary input, or as a primary output when it
    appears in the last layer.
  - `A*B=C`, `A+B=C`, `A^B=C` and `A~A=C` create an AND, OR, XOR or NOT gate.

*/

use crate::circuit::{GateKind, Identifier, Instantiable, NameFault};
use crate::error::{Error, Result};
use crate::gate::Gate;
use crate::netlist::{Circuit, Layer};
use std::collections::HashMap;
use tracing::{debug, warn};

/// A single parsed token
#[derive(Debug)]
pub enum Token {
    /// An identity token `X=X`
    Declare(Identifier),
    /// A gate-defining token
    Gate(Gate),
}

/// Parses one whitespace-free token found in layer `layer`.
pub fn parse_token(layer: usize, token: &str) -> Result<Token> {
    let (lhs, output) = token
        .split_once('=')
        .ok_or_else(|| Error::parse(layer, token, "missing `=`"))?;

    match Identifier::check(output) {
        None => {}
        Some(NameFault::Empty) => return Err(Error::parse(layer, token, "empty output name")),
        Some(NameFault::Unsupported('=')) => {
            return Err(Error::parse(layer, token, "more than one `=`"));
        }
        Some(NameFault::Operator(c)) | Some(NameFault::Unsupported(c)) => {
            return Err(Error::parse(
                layer,
                token,
                format!("output name contains `{c}`"),
            ));
        }
    }
    let output = Identifier::from(output);

    if lhs == output.get_name() {
        return Ok(Token::Declare(output));
    }

    let Some(kind) = GateKind::SCAN_ORDER
        .into_iter()
        .find(|k| lhs.contains(k.symbol()))
    else {
        return match Identifier::check(lhs) {
            Some(NameFault::Unsupported(symbol)) => Err(Error::UnsupportedOperation {
                token: token.to_string(),
                symbol,
            }),
            Some(NameFault::Empty) => Err(Error::parse(layer, token, "empty expression")),
            _ => Err(Error::parse(
                layer,
                token,
                "expected a declaration `X=X` or a gate `A*B=C`",
            )),
        };
    };

    // Only the first occurrence of the first matching symbol splits the operands
    let (left, right) = lhs
        .split_once(kind.symbol())
        .ok_or_else(|| Error::parse(layer, token, "operator vanished while splitting"))?;

    let mut operands = Vec::with_capacity(2);
    for side in [left, right] {
        match Identifier::check(side) {
            None => operands.push(Identifier::from(side)),
            Some(NameFault::Empty) => {}
            Some(NameFault::Operator(_)) => {
                return Err(Error::parse(
                    layer,
                    token,
                    "only one operator is allowed per token",
                ));
            }
            Some(NameFault::Unsupported(symbol)) => {
                return Err(Error::UnsupportedOperation {
                    token: token.to_string(),
                    symbol,
                });
            }
        }
    }

    Ok(Token::Gate(Gate::new(kind, operands, output)?))
}

/// Assembles a [Circuit] from declarations and gates
#[derive(Debug, Default)]
pub struct CircuitBuilder {
    inputs: Vec<Identifier>,
    outputs: Vec<Identifier>,
    layers: Vec<Vec<Gate>>,
}

impl CircuitBuilder {
    /// Creates an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a circuit from layers of tokens. Whitespace inside tokens is
    /// ignored and empty tokens are skipped.
    pub fn from_layers<L, T>(layers: L) -> Result<Circuit>
    where
        L: IntoIterator<Item = T>,
        T: IntoIterator,
        T::Item: AsRef<str>,
    {
        let layers: Vec<Vec<String>> = layers
            .into_iter()
            .map(|layer| {
                layer
                    .into_iter()
                    .map(|t| {
                        t.as_ref()
                            .chars()
                            .filter(|c| !c.is_whitespace())
                            .collect::<String>()
                    })
                    .filter(|t| !t.is_empty())
                    .collect()
            })
            .collect();

        let terminal = layers.len().saturating_sub(1);
        let mut builder = Self::new();
        for (layer_num, layer) in layers.iter().enumerate() {
            for token in layer {
                match parse_token(layer_num, token)? {
                    Token::Declare(name) if layer_num < terminal => {
                        builder.add_input(name)?;
                    }
                    Token::Declare(name) => {
                        builder.add_output(name)?;
                    }
                    Token::Gate(gate) => {
                        builder.add_gate(layer_num, gate);
                    }
                }
            }
        }
        builder.build()
    }

    /// Declares a primary input
    pub fn add_input(&mut self, name: impl Into<Identifier>) -> Result<&mut Self> {
        let name = checked(0, name.into())?;
        if self.inputs.contains(&name) {
            return Err(Error::DuplicateOutput(name));
        }
        self.inputs.push(name);
        Ok(self)
    }

    /// Declares a primary output
    pub fn add_output(&mut self, name: impl Into<Identifier>) -> Result<&mut Self> {
        let name = checked(0, name.into())?;
        if self.outputs.contains(&name) {
            return Err(Error::DuplicateOutput(name));
        }
        self.outputs.push(name);
        Ok(self)
    }

    /// Places `gate` in layer `layer`, creating empty layers as needed
    pub fn add_gate(&mut self, layer: usize, gate: Gate) -> &mut Self {
        if self.layers.len() <= layer {
            self.layers.resize_with(layer + 1, Vec::new);
        }
        self.layers[layer].push(gate);
        self
    }

    /// Resolves every signal and checks that the circuit is purely combinational.
    pub fn build(self) -> Result<Circuit> {
        let Self {
            inputs,
            outputs,
            layers,
        } = self;

        // Slot of every signal, and the layer that produces it (`None` for inputs)
        let mut producers: HashMap<Identifier, (usize, Option<usize>)> = HashMap::new();
        let mut signals = Vec::new();
        for input in &inputs {
            producers.insert(input.clone(), (signals.len(), None));
            signals.push(input.clone());
        }
        for (layer_num, layer) in layers.iter().enumerate() {
            for gate in layer {
                let output = checked(layer_num, gate.get_output_port().clone())?;
                for operand in gate.get_input_ports() {
                    checked(layer_num, operand.clone())?;
                }
                if producers.contains_key(&output) {
                    return Err(Error::DuplicateOutput(output));
                }
                producers.insert(output.clone(), (signals.len(), Some(layer_num)));
                signals.push(output);
            }
        }

        let mut kept = Vec::new();
        for (layer_num, mut gates) in layers.into_iter().enumerate() {
            for gate in gates.iter_mut() {
                let mut slots = Vec::with_capacity(gate.get_input_ports().len());
                for operand in gate.get_input_ports() {
                    match producers.get(operand) {
                        Some((slot, None)) => slots.push(*slot),
                        Some((slot, Some(l))) if *l < layer_num => slots.push(*slot),
                        Some(_) => {
                            return Err(Error::CombinationalCycle {
                                gate: gate.get_output_port().clone(),
                                signal: operand.clone(),
                            });
                        }
                        None => return Err(Error::UnresolvedSignal(operand.clone())),
                    }
                }
                gate.operand_slots = slots;
                gate.output_slot = producers[gate.get_output_port()].0;
            }
            if !gates.is_empty() {
                kept.push(Layer::new(layer_num, gates));
            }
        }

        for output in &outputs {
            if !producers.contains_key(output) {
                return Err(Error::UnresolvedSignal(output.clone()));
            }
        }

        let circuit = Circuit::new(kept, inputs, outputs, signals);
        for input in circuit.get_inputs() {
            let read = circuit.gates().any(|g| g.reads(input));
            if !read && !circuit.is_an_output(input.get_name()) {
                warn!(%input, "primary input is never read");
            }
        }
        debug!(
            layers = circuit.layers().len(),
            gates = circuit.gates().count(),
            inputs = circuit.get_inputs().len(),
            outputs = circuit.get_outputs().len(),
            "built circuit"
        );
        Ok(circuit)
    }
}

/// Declarations made through the builder API report layer 0
fn checked(layer: usize, name: Identifier) -> Result<Identifier> {
    match Identifier::check(name.get_name()) {
        None => Ok(name),
        Some(NameFault::Unsupported(symbol)) if symbol != '=' => Err(Error::UnsupportedOperation {
            token: name.to_string(),
            symbol,
        }),
        Some(fault) => Err(Error::parse(
            layer,
            name.get_name(),
            format!("invalid signal name ({fault:?})"),
        )),
    }
}
