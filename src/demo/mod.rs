// src/demo/mod.rs
// Small hand-assembled grammars with matching hosts. They back the tests,
// the `gen_demo_tables` tool and the CLI smoke runs.

pub mod calc;
pub mod follow;
pub mod sum;

use crate::{
    host::{Control, Report},
    tables::Compiler,
};

/// Every demo table under the file stem it is written to.
pub fn all() -> Vec<(&'static str, Compiler)> {
    vec![
        ("calc", calc::compiler(calc::Flavor::Hard)),
        ("calc_tree", calc::compiler(calc::Flavor::Soft)),
        ("sum", sum::compiler()),
        ("follow", follow::compiler()),
    ]
}

/// Error sink shared by the demo hosts.
#[derive(Debug, Default)]
pub struct Reports {
    pub reports: Vec<Report>,
    /// Ask the parse to stop on the first report.
    pub stop_on_first: bool,
}

impl Reports {
    pub fn push(&mut self, report: &Report, ctl: &mut Control) {
        self.reports.push(report.clone());
        if self.stop_on_first {
            ctl.stop();
        }
    }

    pub fn len(&self) -> usize {
        self.reports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }
}
