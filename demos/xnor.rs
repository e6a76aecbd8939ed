use logic_layers::{Circuit, SimConfig};

fn main() {
    // XOR followed by NOT is XNOR
    let circuit = Circuit::from_layers([
        vec!["A=A", "B=B"],
        vec!["A^B=C"],
        vec!["C~C=D"],
        vec!["D=D"],
    ])
    .unwrap();

    let config = SimConfig::default().with_verbose(true);
    for (a, b) in [(false, false), (false, true), (true, false), (true, true)] {
        let row = circuit.simulate([("A", a), ("B", b)], &config).unwrap();
        println!(
            "A={} B={} -> C={} D={}",
            a as u8,
            b as u8,
            row.get("C").unwrap() as u8,
            row.get("D").unwrap() as u8
        );
    }

    println!("{circuit}");
}
