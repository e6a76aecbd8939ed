/*!

  Analyses over a built [Circuit].

*/

use crate::circuit::{Identifier, Instantiable};
use crate::error::{Error, Result};
use crate::gate::Gate;
use crate::netlist::Circuit;
#[cfg(feature = "graph")]
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{HashMap, HashSet};

/// A common trait of analyses that can be performed on a circuit.
pub trait Analysis<'a>
where
    Self: Sized + 'a,
{
    /// Construct the analysis for the circuit.
    fn build(circuit: &'a Circuit) -> Result<Self>;
}

/// A table that maps signals to the gates that read them
pub struct FanOutTable<'a> {
    // A reference to the underlying circuit
    _circuit: &'a Circuit,
    // Maps a signal to the gates reading it, each gate listed once
    signal_fan_out: HashMap<Identifier, Vec<&'a Gate>>,
    /// Contains signals which are primary outputs
    is_an_output: HashSet<Identifier>,
}

impl<'a> FanOutTable<'a> {
    /// Returns an iterator to the gates that read `signal`.
    pub fn get_signal_users(&self, signal: &str) -> impl Iterator<Item = &'a Gate> {
        self.signal_fan_out
            .get(signal)
            .into_iter()
            .flat_map(|users| users.iter().copied())
    }

    /// Returns the number of gates reading `signal`
    pub fn fan_out(&self, signal: &str) -> usize {
        self.signal_fan_out.get(signal).map_or(0, Vec::len)
    }

    /// Returns `true` if the signal is read by a gate or is a primary output
    pub fn has_uses(&self, signal: &str) -> bool {
        self.fan_out(signal) > 0 || self.is_an_output.contains(signal)
    }
}

impl<'a> Analysis<'a> for FanOutTable<'a> {
    fn build(circuit: &'a Circuit) -> Result<Self> {
        let mut signal_fan_out: HashMap<Identifier, Vec<&'a Gate>> = HashMap::new();

        for gate in circuit.gates() {
            let mut seen = HashSet::new();
            for operand in gate.get_input_ports() {
                if seen.insert(operand) {
                    signal_fan_out.entry(operand.clone()).or_default().push(gate);
                }
            }
        }

        Ok(FanOutTable {
            _circuit: circuit,
            signal_fan_out,
            is_an_output: circuit.get_outputs().iter().cloned().collect(),
        })
    }
}

/// The combinational depth of every signal.
/// Primary inputs are at depth 0, a gate output is one deeper than its deepest operand.
pub struct LogicDepth<'a> {
    // A reference to the underlying circuit
    _circuit: &'a Circuit,
    // Maps a signal to its logic level
    depth: HashMap<Identifier, usize>,
    /// The maximum depth of the circuit
    max_depth: usize,
}

impl LogicDepth<'_> {
    /// Returns the logic level of a signal.
    pub fn get_depth(&self, signal: &str) -> Option<usize> {
        self.depth.get(signal).copied()
    }

    /// Returns the maximum logic level of the circuit.
    pub fn get_max_depth(&self) -> usize {
        self.max_depth
    }

    /// Returns `true` if no gate sits in a later layer than its depth requires
    pub fn is_tight(&self, circuit: &Circuit) -> bool {
        circuit.layers().len() == self.max_depth
    }
}

impl<'a> Analysis<'a> for LogicDepth<'a> {
    fn build(circuit: &'a Circuit) -> Result<Self> {
        let mut depth: HashMap<Identifier, usize> = circuit
            .get_inputs()
            .iter()
            .map(|i| (i.clone(), 0))
            .collect();

        for layer in circuit.layers() {
            let mut level = Vec::with_capacity(layer.len());
            for gate in layer.gates() {
                let mut deepest = 0;
                for operand in gate.effective_inputs() {
                    match depth.get(operand) {
                        Some(d) => deepest = deepest.max(*d),
                        None => {
                            return Err(Error::CombinationalCycle {
                                gate: gate.get_output_port().clone(),
                                signal: operand.clone(),
                            });
                        }
                    }
                }
                level.push((gate.get_output_port().clone(), deepest + 1));
            }
            depth.extend(level);
        }

        let max_depth = depth.values().max().copied().unwrap_or(0);

        Ok(LogicDepth {
            _circuit: circuit,
            depth,
            max_depth,
        })
    }
}

/// A node of the petgraph view of a circuit
#[cfg(feature = "graph")]
#[derive(Debug, Clone)]
pub enum Node<'a> {
    /// A primary input
    Input(Identifier),
    /// A gate instance
    Gate(&'a Gate),
    /// A pseudo-node marking a primary output
    Output(Identifier),
}

#[cfg(feature = "graph")]
impl std::fmt::Display for Node<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Node::Input(name) => write!(f, "Input({name})"),
            Node::Gate(gate) => std::fmt::Display::fmt(gate, f),
            Node::Output(name) => write!(f, "Output({name})"),
        }
    }
}

/// A petgraph representation of the circuit as a directed multi-graph.
/// Edges are labelled with the signal they carry.
#[cfg(feature = "graph")]
pub struct MultiDiGraph<'a> {
    _circuit: &'a Circuit,
    graph: DiGraph<Node<'a>, Identifier>,
}

#[cfg(feature = "graph")]
impl<'a> MultiDiGraph<'a> {
    /// Return a reference to the graph constructed by this analysis
    pub fn get_graph(&self) -> &DiGraph<Node<'a>, Identifier> {
        &self.graph
    }
}

#[cfg(feature = "graph")]
impl<'a> Analysis<'a> for MultiDiGraph<'a> {
    fn build(circuit: &'a Circuit) -> Result<Self> {
        circuit.verify()?;
        let mut producer: HashMap<&Identifier, NodeIndex> = HashMap::new();
        let mut graph = DiGraph::new();

        for input in circuit.get_inputs() {
            producer.insert(input, graph.add_node(Node::Input(input.clone())));
        }
        for gate in circuit.gates() {
            producer.insert(gate.get_output_port(), graph.add_node(Node::Gate(gate)));
        }

        for gate in circuit.gates() {
            let target = producer[gate.get_output_port()];
            for operand in gate.get_input_ports() {
                let source = *producer
                    .get(operand)
                    .ok_or_else(|| Error::UnresolvedSignal(operand.clone()))?;
                graph.add_edge(source, target, operand.clone());
            }
        }

        // Finally, add the output connections
        for output in circuit.get_outputs() {
            let source = *producer
                .get(output)
                .ok_or_else(|| Error::UnresolvedSignal(output.clone()))?;
            let sink = graph.add_node(Node::Output(output.clone()));
            graph.add_edge(source, sink, output.clone());
        }

        Ok(Self {
            _circuit: circuit,
            graph,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fan_out_circuit() -> Circuit {
        "A=A, B=B, C=C
         A*B=D, B+C=E
         D+E=F, A*E=G
         F*G=H, A^B=I, C~C=J
         H=H, I=I, J=J"
            .parse()
            .unwrap()
    }

    #[test]
    fn fanout_table() {
        let circuit = fan_out_circuit();
        let analysis = FanOutTable::build(&circuit).unwrap();

        assert_eq!(analysis.fan_out("A"), 3);
        assert_eq!(analysis.fan_out("E"), 2);
        // The duplicated NOT operand counts once
        assert_eq!(analysis.fan_out("C"), 2);
        assert_eq!(analysis.fan_out("H"), 0);
        assert!(analysis.has_uses("H"), "Outputs count as uses");

        let users: Vec<String> = analysis
            .get_signal_users("B")
            .map(|g| g.get_output_port().to_string())
            .collect();
        assert_eq!(users, ["D", "E", "I"]);
    }

    #[test]
    fn logic_depth() {
        let circuit = fan_out_circuit();
        let depth = circuit.get_analysis::<LogicDepth>().unwrap();
        assert_eq!(depth.get_depth("A"), Some(0));
        assert_eq!(depth.get_depth("E"), Some(1));
        assert_eq!(depth.get_depth("H"), Some(3));
        assert_eq!(depth.get_depth("I"), Some(1));
        assert_eq!(depth.get_max_depth(), 3);
        assert!(depth.is_tight(&circuit));
    }

    #[cfg(feature = "graph")]
    #[test]
    fn petgraph_view() {
        let circuit = fan_out_circuit();
        let view = circuit.get_analysis::<MultiDiGraph>().unwrap();
        let graph = view.get_graph();
        // 3 inputs, 7 gates, 3 output markers
        assert_eq!(graph.node_count(), 13);
        // 14 operand edges and 3 output edges
        assert_eq!(graph.edge_count(), 17);
        assert!(!petgraph::algo::is_cyclic_directed(graph));
    }
}
