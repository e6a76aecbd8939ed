use logic_layers::{Circuit, RowFilter, SimConfig};

fn main() {
    // Two inputs, one AND gate, one output
    let circuit: Circuit = "A=A, B=B
                            A*B=C
                            C=C"
    .parse()
    .unwrap();

    let table = circuit.truth_table(&SimConfig::default()).unwrap();
    assert_eq!(table.len(), 4);
    assert_eq!(table.uniform_ones().count(), 1);

    // Print the table
    print!("{}", table.render(RowFilter::All));
}
