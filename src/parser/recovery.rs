// src/parser/recovery.rs
// Panic mode: skip tokens up to a recovering terminal, cut the stack back to
// a state that terminal can resume from, and stand in a nonterminal made of
// `Null` attributes.

use super::{Compilation, Frame};
use crate::{
    host::{Host, Source},
    lexer::Token,
    object::Node,
};

impl<S: Source, H: Host> Compilation<'_, S, H> {
    /// Returns false when the parse has to be abandoned.
    pub(super) fn recover(&mut self, la: &mut Token) -> bool {
        let compiler = self.compiler;
        if !compiler.has_recovery() {
            log::debug!("no recovering terminals, abandoning parse");
            return false;
        }
        // Erroring again on the token we last resumed on: it cannot help.
        if self.recovered_at == Some(la.pos()) && !la.is_end() {
            *la = self.next_token();
        }
        loop {
            if la.is_end() {
                log::debug!("end of text while recovering");
                return false;
            }
            if self.control.is_stopped() {
                return false;
            }
            if let Some(rec) = compiler.recovery_for(la.id) {
                let found = self.stack.iter().enumerate().rev().find_map(|(i, f)| {
                    rec.entries
                        .iter()
                        .find(|e| e.state == f.state)
                        .map(|e| (i, f.state, e.goto_index))
                });
                if let Some((i, state, nt_id)) = found {
                    let nt = &compiler.nonterminals[nt_id as usize];
                    let Some(to) = nt.goto(state) else {
                        return false;
                    };
                    self.stack.truncate(i + 1);
                    let attrs = (0..nt.attribute_count())
                        .map(|_| self.graph.alloc(Node::Null))
                        .collect();
                    self.stack.push(Frame {
                        state: to,
                        attrs,
                        origin: la.origin,
                    });
                    self.stats.recoveries += 1;
                    self.recovered_at = Some(la.pos());
                    log::debug!(
                        "recovered on terminal {} at {}:{}: state {state} -> {to}",
                        la.id,
                        la.origin.line,
                        la.origin.col
                    );
                    return true;
                }
            }
            *la = self.next_token();
        }
    }
}
