// src/parser/mod.rs
// Shift/reduce driver. Pulls tokens from the lexer, runs the evaluator on
// every reduction and falls back to panic-mode recovery on syntax errors.

mod expected;
mod recovery;

use std::collections::VecDeque;

use serde::Serialize;

use crate::{
    host::{Control, ErrorKind, Host, Origin, Report, Source},
    lexer::{Lexer, Token},
    messages::Message,
    object::{Graph, Node, ObjectId, Pending},
    tables::{ActionKind, Compiler},
};

/// Embedder knobs for one parse.
#[derive(Debug, Clone, Copy, Default)]
pub struct Options {
    /// Stop running hard functions once any error has been seen. Copies and
    /// soft functions keep running, so a soft tree survives the error while
    /// every hard result computed after it is `Null`.
    pub lock_on_error: bool,
    /// Abort at the first syntax error instead of recovering.
    pub stop_on_error: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Stats {
    pub tokens: usize,
    pub shifts: usize,
    pub reductions: usize,
    pub actions: usize,
    pub hard_calls: usize,
    /// Actions parked on a pending parameter.
    pub deferred: usize,
    /// Parked actions re-attempted after a dependency resolved.
    pub replays: usize,
    pub recoveries: usize,
    pub lexical_errors: usize,
    pub syntax_errors: usize,
    pub semantic_errors: usize,
}

/// Result of a parse. The graph is handed over to the caller.
#[derive(Debug)]
pub struct Outcome<V> {
    /// No lexical or syntax error and the input was accepted.
    pub ok: bool,
    pub accepted: bool,
    pub root: Option<ObjectId>,
    pub graph: Graph<V>,
    pub stats: Stats,
}

impl<V> Outcome<V> {
    /// `ok` and no hard function failed.
    pub fn is_clean(&self) -> bool {
        self.ok && self.stats.semantic_errors == 0
    }

    /// Value of the root attribute, looked through aliases.
    pub fn root_value(&self) -> Option<&V> {
        self.root.and_then(|r| self.graph.value(r))
    }
}

#[derive(Debug)]
struct Frame {
    state: u32,
    attrs: Vec<ObjectId>,
    origin: Origin,
}

enum Step {
    Continue,
    Accept,
    Fail,
}

/// One parse of one input against a shared table.
pub struct Compilation<'c, S, H: Host> {
    pub(crate) compiler: &'c Compiler,
    lexer: Lexer<'c, S>,
    pub(crate) host: H,
    pub(crate) graph: Graph<H::Value>,
    stack: Vec<Frame>,
    pub(crate) control: Control,
    options: Options,
    /// Attributes to re-attempt, fed by declic lists.
    pub(crate) replay: VecDeque<ObjectId>,
    pub(crate) stats: Stats,
    /// Position of the lookahead the last recovery resumed on.
    recovered_at: Option<usize>,
}

impl<'c, S: Source, H: Host> Compilation<'c, S, H> {
    pub fn new(compiler: &'c Compiler, source: S, host: H) -> Self {
        Self {
            compiler,
            lexer: Lexer::new(compiler, source),
            host,
            graph: Graph::new(),
            stack: Vec::new(),
            control: Control::default(),
            options: Options::default(),
            replay: VecDeque::new(),
            stats: Stats::default(),
            recovered_at: None,
        }
    }

    pub fn with_options(mut self, options: Options) -> Self {
        self.options = options;
        if options.lock_on_error {
            self.control.lock();
        }
        self
    }

    pub fn control_mut(&mut self) -> &mut Control {
        &mut self.control
    }

    fn any_error(&self) -> bool {
        let s = &self.stats;
        s.lexical_errors + s.syntax_errors + s.semantic_errors > 0
    }

    /// Hard functions are suppressed for the rest of the parse.
    pub(crate) fn locked(&self) -> bool {
        self.control.is_locked() && self.any_error()
    }

    pub(crate) fn report(&mut self, kind: ErrorKind, origin: Origin, message: &Message) {
        let subs: Vec<&str> = message.args.iter().map(String::as_str).collect();
        let text = self.host.map(message.key, &subs);
        match kind {
            ErrorKind::Lexical => self.stats.lexical_errors += 1,
            ErrorKind::Syntactic => self.stats.syntax_errors += 1,
            ErrorKind::Semantic => self.stats.semantic_errors += 1,
        }
        log::debug!("{kind:?} error at {}:{}: {text}", origin.line, origin.col);
        let report = Report {
            kind,
            pos: origin.pos,
            line: origin.line,
            col: origin.col,
            message: text,
        };
        self.host.error(&report, &mut self.control);
    }

    /// Next token from the lexer, forwarding its diagnostics to the host.
    fn next_token(&mut self) -> Token {
        let t = self.lexer.next_token();
        for d in self.lexer.take_diagnostics() {
            self.report(ErrorKind::Lexical, d.origin, &d.message);
        }
        t
    }

    fn token_attrs(&mut self, t: &Token) -> Vec<ObjectId> {
        match &t.text {
            Some(text) => vec![self.graph.alloc(Node::String {
                text: text.clone(),
                pos: t.origin.pos,
                error: t.error,
            })],
            None => Vec::new(),
        }
    }

    fn reduce(&mut self, rule_id: u32, lookahead: Origin) -> Step {
        let compiler = self.compiler;
        let rule = &compiler.rules[rule_id as usize];
        let n = rule.length as usize;
        if self.stack.len() <= n {
            log::error!("rule {rule_id} pops {n} entries from a stack of {}", self.stack.len());
            return Step::Fail;
        }
        self.stats.reductions += 1;
        let base = self.stack.len() - n;
        let rhs: Vec<Frame> = self.stack.drain(base..).collect();
        let origin = rhs.first().map_or(lookahead, |f| f.origin);
        let nt = &compiler.nonterminals[rule.lhs as usize];

        let lhs: Vec<ObjectId> = (0..nt.attribute_count())
            .map(|_| {
                self.graph.alloc(Node::Pending(Pending {
                    binding: None,
                    declic: Vec::new(),
                    origin,
                }))
            })
            .collect();
        let rhs_attrs: Vec<&[ObjectId]> = rhs.iter().map(|f| f.attrs.as_slice()).collect();
        self.run_rule(rule_id, &lhs, &rhs_attrs);

        let from = self.stack.last().map_or(0, |f| f.state);
        let Some(to) = nt.goto(from) else {
            log::error!("no goto for nonterminal {} from state {from}", rule.lhs);
            return Step::Fail;
        };
        log::trace!("reduce rule {rule_id}: {from} -> {to}");
        self.stack.push(Frame {
            state: to,
            attrs: lhs,
            origin,
        });
        Step::Continue
    }

    fn step(&mut self, la: &mut Token) -> Step {
        let Some(top) = self.stack.last() else {
            return Step::Fail;
        };
        let state = top.state;
        let Some(&action) = self.compiler.states[state as usize].action(la.id) else {
            return Step::Fail;
        };
        match action.kind {
            ActionKind::Shift => {
                let attrs = self.token_attrs(la);
                self.stack.push(Frame {
                    state: action.aux,
                    attrs,
                    origin: la.origin,
                });
                self.stats.shifts += 1;
                *la = self.next_token();
                Step::Continue
            }
            ActionKind::Reduce => self.reduce(action.aux, la.origin),
            ActionKind::Accept => Step::Accept,
            ActionKind::Error => {
                self.syntax_error(state, la);
                if self.options.stop_on_error || self.control.is_stopped() {
                    return Step::Fail;
                }
                if self.recover(la) {
                    Step::Continue
                } else {
                    Step::Fail
                }
            }
        }
    }

    /// Runs the parse to completion.
    pub fn parse(mut self) -> Outcome<H::Value> {
        let mut la = self.next_token();
        self.stack.push(Frame {
            state: 0,
            attrs: Vec::new(),
            origin: la.origin,
        });

        let accepted = loop {
            if self.control.is_stopped() {
                log::debug!("parse stopped by the host");
                break false;
            }
            match self.step(&mut la) {
                Step::Continue => {}
                Step::Accept => break true,
                Step::Fail => break false,
            }
        };

        let root = if accepted {
            self.stack.last().and_then(|f| f.attrs.first().copied())
        } else {
            self.stack.clear();
            None
        };
        self.stats.tokens = self.lexer.token_count();

        let leftover = self.graph.settle();
        if leftover > 0 {
            log::warn!("{leftover} attributes still pending at end of parse");
        }
        let ok = accepted && self.stats.lexical_errors == 0 && self.stats.syntax_errors == 0;
        log::debug!("parse finished: ok={ok} {:?}", self.stats);
        Outcome {
            ok,
            accepted,
            root,
            graph: self.graph,
            stats: self.stats,
        }
    }
}

/// Parses `source` against `compiler` with default options.
pub fn parse<S: Source, H: Host>(compiler: &Compiler, source: S, host: H) -> Outcome<H::Value> {
    Compilation::new(compiler, source, host).parse()
}
