#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs, unreachable_pub)]
/*!

`logic-layers`

A combinational logic simulator. A small text format lists gates layer by
layer; the builder resolves every signal into a feed-forward [netlist::Circuit],
which can then be evaluated for one assignment or enumerated into a complete
[table::TruthTable].

```text
A=A, B=B, C=C
A*B=D, B+C=E
D+E=F, A*E=G
F*G=H, A^B=I, C~C=J
H=H, I=I, J=J
```

Identity tokens (`A=A`) declare primary inputs, or primary outputs on the last
line. `*`, `+`, `^` and `~` build AND, OR, XOR and NOT gates.

*/
#![doc = "## Simple Example\n```"]
#![doc = include_str!("../demos/simple.rs")]
#![doc = "\n```"]

pub mod builder;
pub mod circuit;
pub mod error;
pub mod gate;
pub mod graph;
pub mod netlist;
pub mod sim;
pub mod table;
pub mod util;

pub use error::{Error, Result};
pub use netlist::Circuit;
pub use sim::SimConfig;
pub use table::{RowFilter, Simulator, TruthTable};
