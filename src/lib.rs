//! Runtime for compiled grammars: a generalized lexical automaton, an LR
//! shift/reduce parser with panic-mode recovery, and a trigger-driven
//! attribute evaluator that turns reductions into a result graph.
//!
//! A [`tables::Compiler`] is loaded once and shared; each input gets its own
//! [`Compilation`], driven through the [`host::Source`] and [`host::Host`]
//! callbacks.

pub mod demo;
pub mod error;
mod eval;
pub mod host;
pub mod lexer;
pub mod messages;
pub mod object;
pub mod parser;
pub mod tables;

pub use error::{Result, TableError};
pub use host::{Call, Control, Host, Produced, Report, SemanticError, Source, TextSource};
pub use object::{Graph, Node, ObjectId, Snapshot};
pub use parser::{Compilation, Options, Outcome, Stats, parse};
pub use tables::Compiler;
