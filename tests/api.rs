use logic_layers::circuit::{GateKind, Identifier, Instantiable};
use logic_layers::error::Error;
use logic_layers::sim::{Environment, eval_layer};
use logic_layers::{Circuit, SimConfig};

fn and_then_identity() -> Circuit {
    Circuit::from_layers([vec!["A=A", "B=B"], vec!["A*B=C"], vec!["C=C"]]).unwrap()
}

fn xnor() -> Circuit {
    Circuit::from_layers([vec!["A=A", "B=B"], vec!["A^B=C"], vec!["C~C=D"], vec!["D=D"]]).unwrap()
}

fn fan_out() -> Circuit {
    Circuit::from_layers([
        vec!["A=A", "B=B", "C=C"],
        vec!["A*B=D", "B+C=E"],
        vec!["D+E=F", "A*E=G"],
        vec!["F*G=H", "A^B=I", "C~C=J"],
        vec!["H=H", "I=I", "J=J"],
    ])
    .unwrap()
}

fn output_column(circuit: &Circuit, name: &str) -> Vec<bool> {
    circuit
        .truth_table(&SimConfig::default())
        .unwrap()
        .rows()
        .iter()
        .map(|r| r.outputs().get(name).unwrap())
        .collect()
}

#[test]
fn and_gate_table() {
    assert_eq!(
        output_column(&and_then_identity(), "C"),
        [false, false, false, true]
    );
}

#[test]
fn xnor_table() {
    assert_eq!(output_column(&xnor(), "D"), [true, false, false, true]);
}

#[test]
fn fan_out_assignment() {
    let circuit = fan_out();
    let config = SimConfig::default().with_verbose(true);
    let row = circuit
        .simulate([("A", true), ("B", false), ("C", true)], &config)
        .unwrap();

    let expect = [
        ("D", false),
        ("E", true),
        ("F", true),
        ("G", true),
        ("H", true),
        ("I", true),
        ("J", false),
    ];
    for (name, value) in expect {
        assert_eq!(row.get(name), Some(value), "signal {name}");
    }
    assert_eq!(row.get_index(), 0b101);

    // Intermediates are listed latest produced first
    let names: Vec<&str> = row
        .intermediates()
        .unwrap()
        .names()
        .iter()
        .map(|n| n.get_name())
        .collect();
    assert_eq!(names, ["G", "F", "E", "D"]);
}

#[test]
fn partitions_follow_declaration_order() {
    let circuit = fan_out();
    let row = circuit
        .simulate([("C", true), ("A", true), ("B", false)], &SimConfig::default())
        .unwrap();
    let inputs: Vec<(String, bool)> = row
        .inputs()
        .iter()
        .map(|(n, v)| (n.to_string(), v))
        .collect();
    assert_eq!(
        inputs,
        [
            ("A".to_string(), true),
            ("B".to_string(), false),
            ("C".to_string(), true)
        ]
    );
    let expected: Vec<Identifier> = vec!["H".into(), "I".into(), "J".into()];
    assert_eq!(row.outputs().names(), expected.as_slice());
    assert!(row.intermediates().is_none());
}

#[test]
fn evaluation_is_deterministic() {
    let circuit = fan_out();
    let config = SimConfig::default();
    for index in 0..8usize {
        let assignment = [
            ("A", index & 4 != 0),
            ("B", index & 2 != 0),
            ("C", index & 1 != 0),
        ];
        let first = circuit.simulate(assignment, &config).unwrap();
        let second = circuit.simulate(assignment, &config).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.get_index(), index);
    }
}

#[test]
fn inputs_survive_every_layer() {
    let circuit = fan_out();
    let mut env = Environment::for_circuit(&circuit);
    for (slot, value) in [true, false, true].into_iter().enumerate() {
        env.bind(slot, value);
    }
    for layer in circuit.layers() {
        env = eval_layer(layer, env, true).unwrap();
        assert_eq!(env.get(0), Some(true));
        assert_eq!(env.get(1), Some(false));
        assert_eq!(env.get(2), Some(true));
    }
    assert_eq!(env.num_bound(), circuit.num_signals());
}

#[test]
fn memoization_fills_instance_caches() {
    let circuit = and_then_identity();
    let config = SimConfig::default().with_parallel(false);
    circuit.truth_table(&config).unwrap();
    let gate = circuit.gates().next().unwrap();
    assert_eq!(gate.cache_len(), 4);

    circuit.clear_caches();
    assert_eq!(gate.cache_len(), 0);

    circuit
        .truth_table(&config.clone().with_memoize(false))
        .unwrap();
    assert_eq!(gate.cache_len(), 0);
}

#[test]
fn same_kind_gates_do_not_share_caches() {
    let first = and_then_identity();
    let second = and_then_identity();
    first.truth_table(&SimConfig::default()).unwrap();
    assert_eq!(first.gates().next().unwrap().cache_len(), 4);
    assert_eq!(second.gates().next().unwrap().cache_len(), 0);
}

#[test]
fn gate_accessors() {
    let circuit = fan_out();
    let gate = circuit.find_driver("J").unwrap();
    assert_eq!(gate.kind(), GateKind::Not);
    assert_eq!(gate.get_name(), "NOT");
    assert_eq!(gate.get_input_port_at(1).get_name(), "C");
    assert_eq!(gate.effective_inputs().len(), 1);
    assert!(gate.reads(&"C".into()));
}

#[test]
fn unassigned_input_is_unresolved() {
    let circuit = xnor();
    let err = circuit
        .simulate([("B", true)], &SimConfig::default())
        .unwrap_err();
    assert!(matches!(err, Error::UnresolvedSignal(ref n) if n.get_name() == "A"));
    assert_eq!(err.to_string(), "unresolved signal `A`");
}
