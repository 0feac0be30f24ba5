// src/parser/expected.rs
// "expected {a or b} but read x" for a syntax error.

use hashbrown::HashSet;

use super::Compilation;
use crate::{
    host::{ErrorKind, Host, Source},
    lexer::Token,
    messages::{self, Message},
    tables::{ActionKind, Compiler},
};

/// Longest list of alternatives spelled out before eliding the rest.
const MAX_LISTED: usize = 16;

/// Names of the terminals with a non-error action in `state`, in id order.
pub(crate) fn expected_terminals(compiler: &Compiler, state: u32) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for a in compiler.states[state as usize].declared() {
        if a.kind == ActionKind::Error {
            continue;
        }
        for t in a.low..=a.high {
            let name = compiler.token_name(t);
            if seen.insert(name.clone()) {
                out.push(name);
            }
            if out.len() > MAX_LISTED {
                return out;
            }
        }
    }
    out
}

impl<S: Source, H: Host> Compilation<'_, S, H> {
    pub(super) fn syntax_error(&mut self, state: u32, la: &Token) {
        let mut names = expected_terminals(self.compiler, state);
        let elided = names.len() > MAX_LISTED;
        names.truncate(MAX_LISTED);
        let or = self.host.map(messages::SYNTAX_OR, &[]);
        let mut expected = names.join(&or);
        if elided {
            expected.push_str(&or);
            expected.push('…');
        }
        let read = if la.is_end() {
            self.host.map(messages::SYNTAX_END_OF_TEXT, &[])
        } else {
            match &la.text {
                Some(text) => format!("'{text}'"),
                None => self.compiler.token_name(la.id),
            }
        };
        let message = Message::new(messages::SYNTAX_EXPECTED)
            .arg(expected)
            .arg(read);
        self.report(ErrorKind::Syntactic, la.origin, &message);
    }
}
