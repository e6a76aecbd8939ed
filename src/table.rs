/*!

  Exhaustive enumeration of input assignments into truth tables, row filters,
  and the bordered text rendering of a table.

*/

use crate::{
    circuit::Identifier,
    error::{Error, Result},
    netlist::Circuit,
    sim::{ResultRow, SimConfig},
};
use bitvec::vec::BitVec;
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use std::{borrow::Cow, path::Path, sync::Arc};
use tracing::debug;

/// Returns the assignment for counter value `index` over `width` inputs,
/// most significant bit first.
pub fn assignment_bits(index: usize, width: usize) -> BitVec {
    (0..width).rev().map(|bit| (index >> bit) & 1 == 1).collect()
}

/// The named row filters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RowFilter {
    /// Every row
    All,
    /// Rows where some output is 1
    Ones,
    /// Rows where every output is 1
    UniformOnes,
    /// Rows where some output is 0
    Zeros,
    /// Rows where every output is 0
    UniformZeros,
}

impl RowFilter {
    /// Every named filter, in display order
    pub const ALL: [RowFilter; 5] = [
        RowFilter::All,
        RowFilter::Ones,
        RowFilter::UniformOnes,
        RowFilter::Zeros,
        RowFilter::UniformZeros,
    ];

    /// The title printed above a table with this filter
    pub fn title(&self) -> &'static str {
        match self {
            RowFilter::All => "Complete Logic Table",
            RowFilter::Ones => "Ones Table",
            RowFilter::UniformOnes => "Uniform Ones Table",
            RowFilter::Zeros => "Zeros Table",
            RowFilter::UniformZeros => "Uniform Zeros Table",
        }
    }

    /// Returns `true` if `row` passes the filter
    pub fn matches(&self, row: &ResultRow) -> bool {
        match self {
            RowFilter::All => true,
            RowFilter::Ones => row.any_output_one(),
            RowFilter::UniformOnes => row.all_outputs_one(),
            RowFilter::Zeros => row.not_all_outputs_one(),
            RowFilter::UniformZeros => row.no_output_one(),
        }
    }
}

/// Every input assignment of a circuit and its result, in counting order
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TruthTable {
    inputs: Arc<[Identifier]>,
    intermediates: Option<Arc<[Identifier]>>,
    outputs: Arc<[Identifier]>,
    rows: Vec<ResultRow>,
}

impl TruthTable {
    /// Returns every row, ordered by assignment index
    pub fn rows(&self) -> &[ResultRow] {
        &self.rows
    }

    /// Returns the number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` if the table has no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns `true` if the rows carry intermediate signals
    pub fn is_verbose(&self) -> bool {
        self.intermediates.is_some()
    }

    /// Returns the column groups: inputs, intermediates when verbose, outputs
    pub fn headers(&self) -> impl Iterator<Item = &[Identifier]> {
        std::iter::once(&*self.inputs)
            .chain(self.intermediates.as_deref())
            .chain(std::iter::once(&*self.outputs))
    }

    /// Returns the rows accepted by `predicate`
    pub fn filter<F>(&self, predicate: F) -> impl Iterator<Item = &ResultRow>
    where
        F: Fn(&ResultRow) -> bool,
    {
        self.rows.iter().filter(move |r| predicate(*r))
    }

    /// Returns the rows accepted by a named filter
    pub fn select(&self, filter: RowFilter) -> impl Iterator<Item = &ResultRow> {
        self.filter(move |r| filter.matches(r))
    }

    /// Rows where some output is 1
    pub fn ones(&self) -> impl Iterator<Item = &ResultRow> {
        self.select(RowFilter::Ones)
    }

    /// Rows where every output is 1
    pub fn uniform_ones(&self) -> impl Iterator<Item = &ResultRow> {
        self.select(RowFilter::UniformOnes)
    }

    /// Rows where some output is 0
    pub fn zeros(&self) -> impl Iterator<Item = &ResultRow> {
        self.select(RowFilter::Zeros)
    }

    /// Rows where every output is 0
    pub fn uniform_zeros(&self) -> impl Iterator<Item = &ResultRow> {
        self.select(RowFilter::UniformZeros)
    }

    /// Returns a copy of the table without intermediate signals
    pub fn without_intermediates(&self) -> Self {
        Self {
            inputs: self.inputs.clone(),
            intermediates: None,
            outputs: self.outputs.clone(),
            rows: self.rows.iter().map(ResultRow::without_intermediates).collect(),
        }
    }

    /// A printable view of the rows accepted by `predicate`
    pub fn view<'a, F>(&'a self, title: &'a str, predicate: F) -> TableView<'a, F>
    where
        F: Fn(&ResultRow) -> bool,
    {
        TableView {
            table: self,
            title,
            predicate,
        }
    }

    /// Renders the rows accepted by a named filter under its title
    pub fn render(&self, filter: RowFilter) -> String {
        self.view(filter.title(), |r| filter.matches(r)).to_string()
    }

    #[cfg(feature = "serde")]
    /// Serializes the table as pretty JSON into the writer.
    pub fn to_json(
        &self,
        writer: impl std::io::Write,
    ) -> std::result::Result<(), serde_json::Error> {
        serde_json::to_writer_pretty(writer, self)
    }
}

/// A titled, filtered rendering of a [TruthTable].
///
/// Columns are signal names separated by three spaces, with ` | ` between
/// inputs, intermediates and outputs. Every row is centered to the wider of
/// the header and the title and followed by its assignment index.
pub struct TableView<'a, F> {
    table: &'a TruthTable,
    title: &'a str,
    predicate: F,
}

impl<F> std::fmt::Display for TableView<'_, F>
where
    F: Fn(&ResultRow) -> bool,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let header = self
            .table
            .headers()
            .map(|names| {
                names
                    .iter()
                    .map(|n| n.get_name())
                    .collect::<Vec<_>>()
                    .join("   ")
            })
            .collect::<Vec<_>>()
            .join(" | ");

        let pad = header.chars().count().max(self.title.chars().count());
        let border = format!("|{}|", "-".repeat(pad + 2));

        writeln!(f, "{border}")?;
        writeln!(f, "| {:^pad$} |", self.title)?;
        writeln!(f, "{border}")?;
        writeln!(f, "| {header:^pad$} |")?;
        writeln!(f, "{border}")?;

        for row in self.table.filter(&self.predicate) {
            let content = row
                .partitions()
                .map(|p| {
                    p.values()
                        .iter()
                        .by_vals()
                        .map(|b| if b { "1" } else { "0" })
                        .collect::<Vec<_>>()
                        .join("   ")
                })
                .collect::<Vec<_>>()
                .join(" | ");
            writeln!(f, "| {content:^pad$} | {}", row.get_index())?;
        }

        writeln!(f, "{border}")
    }
}

impl Circuit {
    /// Evaluates every assignment of the primary inputs, in ascending binary
    /// counting order with the first declared input as the most significant bit.
    pub fn truth_table(&self, config: &SimConfig) -> Result<TruthTable> {
        let width = self.get_inputs().len();
        let limit = config.max_inputs.min(usize::BITS as usize - 1);
        if width > limit {
            return Err(Error::TooManyInputs {
                count: width,
                limit,
            });
        }
        let total = 1usize << width;
        debug!(rows = total, verbose = config.verbose, "enumerating truth table");

        let row = |index: usize| self.simulate_bits(&assignment_bits(index, width), config);

        #[cfg(feature = "parallel")]
        let rows: Result<Vec<ResultRow>> = if config.parallel {
            (0..total).into_par_iter().map(row).collect()
        } else {
            (0..total).map(row).collect()
        };
        #[cfg(not(feature = "parallel"))]
        let rows: Result<Vec<ResultRow>> = (0..total).map(row).collect();

        Ok(TruthTable {
            inputs: self.shared_inputs(),
            intermediates: config.verbose.then(|| self.shared_intermediates()),
            outputs: self.shared_outputs(),
            rows: rows?,
        })
    }
}

/// A circuit together with the last table computed for it.
///
/// A verbose request recomputes over a non-verbose table; a non-verbose
/// request over a verbose table drops the intermediates from the cached rows.
#[derive(Debug)]
pub struct Simulator {
    circuit: Circuit,
    config: SimConfig,
    table: Option<TruthTable>,
}

impl Simulator {
    /// Creates a session over a built circuit
    pub fn new(circuit: Circuit, config: SimConfig) -> Self {
        Self {
            circuit,
            config,
            table: None,
        }
    }

    /// Loads the circuit description at `path`
    pub fn load(path: impl AsRef<Path>, config: SimConfig) -> Result<Self> {
        Ok(Self::new(Circuit::load(path)?, config))
    }

    /// Returns the circuit being simulated
    pub fn circuit(&self) -> &Circuit {
        &self.circuit
    }

    /// Returns the session configuration
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Returns the cached table, if one has been computed
    pub fn cached(&self) -> Option<&TruthTable> {
        self.table.as_ref()
    }

    /// Returns the full table, computing it if needed
    pub fn table(&mut self, verbose: bool) -> Result<Cow<'_, TruthTable>> {
        let table = match self.table.take() {
            Some(t) if !verbose || t.is_verbose() => t,
            _ => {
                let config = self.config.clone().with_verbose(verbose);
                self.circuit.truth_table(&config)?
            }
        };
        let table = self.table.insert(table);
        Ok(if table.is_verbose() && !verbose {
            Cow::Owned(table.without_intermediates())
        } else {
            Cow::Borrowed(&*table)
        })
    }

    /// Renders a named table
    pub fn render(&mut self, filter: RowFilter, verbose: bool) -> Result<String> {
        Ok(self.table(verbose)?.render(filter))
    }

    /// Renders the rows accepted by `predicate` under `title`
    pub fn render_custom<F>(&mut self, verbose: bool, title: &str, predicate: F) -> Result<String>
    where
        F: Fn(&ResultRow) -> bool,
    {
        Ok(self.table(verbose)?.view(title, predicate).to_string())
    }

    /// Drops the cached table and every gate cache
    pub fn reset(&mut self) {
        self.table = None;
        self.circuit.clear_caches();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counting_order() {
        let bits: Vec<bool> = assignment_bits(6, 4).iter().by_vals().collect();
        assert_eq!(bits, [false, true, true, false]);
        assert!(assignment_bits(0, 0).is_empty());
    }

    #[test]
    fn zero_inputs_give_one_row() {
        let circuit = Circuit::from_layers([vec!["Q=Q"]]).unwrap_err();
        // A lone identity line declares an output that nothing produces
        assert!(matches!(circuit, Error::UnresolvedSignal(_)));

        let table = Circuit::from_layers(Vec::<Vec<&str>>::new())
            .unwrap()
            .truth_table(&SimConfig::default())
            .unwrap();
        assert_eq!(table.len(), 1);
        assert!(table.rows()[0].outputs().is_empty());
    }

    #[test]
    fn input_limit() {
        let circuit = Circuit::from_layers([vec!["A=A", "B=B", "C=C"], vec!["A*B=D"], vec!["D=D"]])
            .unwrap();
        let config = SimConfig::default().with_max_inputs(2);
        assert!(matches!(
            circuit.truth_table(&config),
            Err(Error::TooManyInputs { count: 3, limit: 2 })
        ));
    }

    #[test]
    fn session_projects_cached_rows() {
        let circuit =
            Circuit::from_layers([vec!["A=A", "B=B"], vec!["A^B=C"], vec!["C~C=D"], vec!["D=D"]])
                .unwrap();
        let mut sim = Simulator::new(circuit, SimConfig::default());
        assert!(sim.cached().is_none());

        assert!(!sim.table(false).unwrap().is_verbose());
        // Verbose request over a plain table recomputes
        assert!(sim.table(true).unwrap().is_verbose());
        assert!(sim.cached().unwrap().is_verbose());
        // Plain request over a verbose table projects
        let plain = sim.table(false).unwrap().into_owned();
        assert!(!plain.is_verbose());
        assert!(sim.cached().unwrap().is_verbose());
        assert_eq!(plain.len(), 4);

        sim.reset();
        assert!(sim.cached().is_none());
        assert!(sim.circuit().gates().all(|g| g.cache_len() == 0));
    }
}
