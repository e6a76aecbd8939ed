use logic_layers::assert_table_eq;
use logic_layers::builder::CircuitBuilder;
use logic_layers::circuit::GateKind;
use logic_layers::error::Error;
use logic_layers::gate::Gate;
use logic_layers::{Circuit, Simulator, SimConfig};
use std::io::Write;

const SAMPLE: &str = "A = A, B = B, C = C
A * B = D, B + C = E
D + E = F, A * E = G
F * G = H, A ^ B = I, C ~ C = J
H = H, I = I, J = J
";

#[test]
fn sample_description() {
    let circuit: Circuit = SAMPLE.parse().unwrap();
    assert_eq!(circuit.get_inputs().len(), 3);
    assert_eq!(circuit.get_outputs().len(), 3);
    let kinds: Vec<GateKind> = circuit.gates().map(|g| g.kind()).collect();
    assert_eq!(
        kinds,
        [
            GateKind::And,
            GateKind::Or,
            GateKind::Or,
            GateKind::And,
            GateKind::And,
            GateKind::Xor,
            GateKind::Not
        ]
    );
    let layer_lines: Vec<usize> = circuit.layers().iter().map(|l| l.get_index()).collect();
    assert_eq!(layer_lines, [1, 2, 3]);
}

#[test]
fn display_is_the_text_format() {
    let circuit: Circuit = SAMPLE.parse().unwrap();
    assert_table_eq!(
        circuit.to_string(),
        "A=A, B=B, C=C
         A*B=D, B+C=E
         D+E=F, A*E=G
         F*G=H, A^B=I, C~C=J
         H=H, I=I, J=J"
    );
}

#[test]
fn inputs_may_be_declared_in_any_inner_layer() {
    // B is declared on the gate line, it is still visible to the first gate
    let circuit: Circuit = "A=A\nA*B=C, B=B\nC=C".parse().unwrap();
    let names: Vec<&str> = circuit.get_inputs().iter().map(|i| i.get_name()).collect();
    assert_eq!(names, ["A", "B"]);
    let table = circuit.truth_table(&SimConfig::default()).unwrap();
    assert_eq!(table.uniform_ones().count(), 1);
}

#[test]
fn terminal_layer_gates_are_evaluated() {
    let circuit: Circuit = "A=A, B=B\nA+B=C, C=C".parse().unwrap();
    assert_eq!(circuit.gates().count(), 1);
    assert_eq!(circuit.get_outputs()[0].get_name(), "C");
    let table = circuit.truth_table(&SimConfig::default()).unwrap();
    assert_eq!(table.ones().count(), 3);
}

#[test]
fn error_kinds() {
    let parse = |text: &str| text.parse::<Circuit>().unwrap_err();

    assert!(matches!(parse("A=A\nAB\nC=C"), Error::Parse { layer: 1, .. }));
    assert!(matches!(
        parse("A=A, B=B\nA|B=C\nC=C"),
        Error::UnsupportedOperation { symbol: '|', .. }
    ));
    assert!(matches!(
        parse("A=A, B=B\nA*B^A=C\nC=C"),
        Error::Parse { .. }
    ));
    assert!(matches!(parse("A=A\nA*=C\nC=C"), Error::Arity { .. }));
    assert!(matches!(
        parse("A=A, B=B\nA*B=C, A+B=C\nC=C"),
        Error::DuplicateOutput(_)
    ));
    assert!(matches!(
        parse("A=A\nA~A=B\nB*C=D, A~A=C\nD=D"),
        Error::CombinationalCycle { .. }
    ));
    assert!(matches!(
        parse("A=A\nA*Q=B\nB=B"),
        Error::UnresolvedSignal(_)
    ));
}

#[test]
fn error_messages() {
    let err = "A=A\nA*A*A=B\nB=B".parse::<Circuit>().unwrap_err();
    assert_eq!(
        err.to_string(),
        "malformed token `A*A*A=B` in layer 1: only one operator is allowed per token"
    );
    let err = "A=A\nB~B=C\nC=C".parse::<Circuit>().unwrap_err();
    assert_eq!(err.to_string(), "unresolved signal `B`");
}

#[test]
fn single_line_declares_outputs() {
    // With a single line there is no input layer, so identities are outputs
    let err = "A=A, B=B".parse::<Circuit>().unwrap_err();
    assert!(matches!(err, Error::UnresolvedSignal(_)));
}

#[test]
fn builder_matches_text() {
    let mut builder = CircuitBuilder::new();
    builder.add_input("A").unwrap().add_input("B").unwrap();
    builder.add_gate(
        1,
        Gate::new(GateKind::Xor, vec!["A".into(), "B".into()], "C".into()).unwrap(),
    );
    builder.add_gate(
        2,
        Gate::new(GateKind::Not, vec!["C".into()], "D".into()).unwrap(),
    );
    builder.add_output("D").unwrap();
    let built = builder.build().unwrap();

    let parsed: Circuit = "A=A, B=B\nA^B=C\nC~C=D\nD=D".parse().unwrap();
    assert_eq!(built.to_string(), parsed.to_string());

    let config = SimConfig::default();
    assert_eq!(
        built.truth_table(&config).unwrap().rows(),
        parsed.truth_table(&config).unwrap().rows()
    );
}

#[test]
fn load_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(SAMPLE.as_bytes()).unwrap();

    let circuit = Circuit::load(file.path()).unwrap();
    assert_eq!(circuit.gates().count(), 7);

    let mut sim = Simulator::load(file.path(), SimConfig::default()).unwrap();
    assert_eq!(sim.table(false).unwrap().len(), 8);

    let missing = Circuit::load(file.path().with_extension("missing"));
    assert!(matches!(missing, Err(Error::Io(_))));
}
