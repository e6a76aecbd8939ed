use logic_layers::{Circuit, RowFilter, SimConfig, Simulator};

const FAN_OUT: &str = "A=A, B=B, C=C
A*B=D, B+C=E
D+E=F, A*E=G
F*G=H, A^B=I, C~C=J
H=H, I=I, J=J";

fn main() {
    let circuit: Circuit = FAN_OUT.parse().unwrap();
    let mut sim = Simulator::new(circuit, SimConfig::default());

    print!("{}", sim.render(RowFilter::All, true).unwrap());
    print!("{}", sim.render(RowFilter::Ones, false).unwrap());
    print!("{}", sim.render(RowFilter::Zeros, false).unwrap());

    // Rows where the first two inputs agree
    let custom = sim
        .render_custom(true, "Custom Table", |row| {
            row.inputs().get("A") == row.inputs().get("B")
        })
        .unwrap();
    print!("{custom}");
}
