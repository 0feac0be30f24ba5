// src/tables/validate.rs
// Structural checks run on every loaded table. The runtime indexes the
// tables without bounds slack, so anything out of range is rejected here.

use super::{ActionKind, Automaton, COMMENT_CLASS_EOF, Compiler, Recognized};
use crate::error::{Result, TableError};

fn invalid(msg: String) -> TableError {
    TableError::Invalid(msg)
}

fn check_automaton(label: &str, a: &Automaton, n_tokens: usize, comment: bool) -> Result<()> {
    let n = a.states.len() as u32;
    for (i, s) in a.states.iter().enumerate() {
        match s.recognized {
            Recognized::Token(t) if comment && t > COMMENT_CLASS_EOF => {
                return Err(invalid(format!(
                    "{label} state {i}: comment class {t} out of range"
                )));
            }
            Recognized::Token(t) if !comment && t as usize >= n_tokens => {
                return Err(invalid(format!("{label} state {i}: token {t} out of range")));
            }
            Recognized::CommentStart | Recognized::CommentEnd if comment => {
                return Err(invalid(format!(
                    "{label} state {i}: comment markers inside the comment automaton"
                )));
            }
            _ => {}
        }
        for e in &s.epsilons {
            if e.target >= n || e.continuation.is_some_and(|c| c >= n) {
                return Err(invalid(format!("{label} state {i}: epsilon out of range")));
            }
            if e.continuation.is_some() && a.max_depth == 0 {
                return Err(invalid(format!(
                    "{label} state {i}: followed-by transition with max depth 0"
                )));
            }
        }
        let mut prev_high: Option<i32> = None;
        for r in &s.ranges {
            if r.target >= n {
                return Err(invalid(format!("{label} state {i}: range target out of range")));
            }
            if r.low > r.high || prev_high.is_some_and(|h| r.low <= h) {
                return Err(invalid(format!(
                    "{label} state {i}: ranges unsorted or overlapping at [{}, {}]",
                    r.low, r.high
                )));
            }
            prev_high = Some(r.high);
        }
    }
    Ok(())
}

pub fn validate(t: &Compiler) -> Result<()> {
    let n_tokens = t.tokens.len();
    if n_tokens == 0 {
        return Err(invalid("no tokens (terminal 0 is end of text)".into()));
    }
    if t.tokens.iter().any(|tk| tk.name.as_deref() == Some("")) {
        return Err(invalid("empty token name".into()));
    }
    if t.lexer.is_empty() {
        return Err(invalid("empty lexical automaton".into()));
    }
    check_automaton("lexer", &t.lexer, n_tokens, false)?;
    check_automaton("comment", &t.comments, n_tokens, true)?;
    let has_comment_start = t
        .lexer
        .states
        .iter()
        .any(|s| s.recognized == Recognized::CommentStart);
    if has_comment_start && t.comments.is_empty() {
        return Err(invalid("comment marker without a comment automaton".into()));
    }

    if t.states.is_empty() {
        return Err(invalid("no parser states".into()));
    }
    let n_states = t.states.len() as u32;
    let n_rules = t.rules.len() as u32;
    for (i, st) in t.states.iter().enumerate() {
        let Some(last) = st.actions.last() else {
            return Err(invalid(format!("parser state {i}: no actions")));
        };
        if last.kind != ActionKind::Error {
            return Err(invalid(format!(
                "parser state {i}: last action is not the error catch-all"
            )));
        }
        let mut prev_high: Option<u32> = None;
        for a in st.declared() {
            if a.low > a.high || prev_high.is_some_and(|h| a.low <= h) {
                return Err(invalid(format!(
                    "parser state {i}: terminal ranges unsorted or overlapping"
                )));
            }
            if a.high as usize >= n_tokens {
                return Err(invalid(format!("parser state {i}: terminal out of range")));
            }
            prev_high = Some(a.high);
            let ok = match a.kind {
                ActionKind::Shift => a.aux < n_states,
                ActionKind::Reduce => a.aux < n_rules,
                ActionKind::Accept | ActionKind::Error => true,
            };
            if !ok {
                return Err(invalid(format!(
                    "parser state {i}: {:?} index {} out of range",
                    a.kind, a.aux
                )));
            }
        }
    }

    let n_nt = t.nonterminals.len() as u32;
    for (i, nt) in t.nonterminals.iter().enumerate() {
        let mut prev: Option<u32> = None;
        for g in &nt.gotos {
            if g.from >= n_states || g.to >= n_states {
                return Err(invalid(format!("nonterminal {i}: goto out of range")));
            }
            if prev.is_some_and(|p| g.from <= p) {
                return Err(invalid(format!("nonterminal {i}: goto pairs unsorted")));
            }
            prev = Some(g.from);
        }
    }

    for (i, rule) in t.rules.iter().enumerate() {
        if rule.lhs >= n_nt {
            return Err(invalid(format!("rule {i}: lhs {} out of range", rule.lhs)));
        }
        for a in &rule.actions {
            let slots = std::iter::once(&a.target).chain(a.params.iter());
            for s in slots {
                if s.depth > rule.length {
                    return Err(invalid(format!(
                        "rule {i}: attribute depth {} beyond rule length {}",
                        s.depth, rule.length
                    )));
                }
            }
            if a.target.depth == 0
                && a.target.attribute as usize >= t.nonterminals[rule.lhs as usize].attribute_count()
            {
                return Err(invalid(format!(
                    "rule {i}: target attribute {} out of range",
                    a.target.attribute
                )));
            }
            if a.is_copy() && a.params.len() != 1 {
                return Err(invalid(format!(
                    "rule {i}: copy action with {} parameters",
                    a.params.len()
                )));
            }
        }
    }

    for rec in &t.recoveries {
        if rec.terminal as usize >= n_tokens {
            return Err(invalid(format!(
                "recovering terminal {} out of range",
                rec.terminal
            )));
        }
        for e in &rec.entries {
            if e.state >= n_states || e.goto_index >= n_nt {
                return Err(invalid(format!(
                    "recovery entry for terminal {} out of range",
                    rec.terminal
                )));
            }
        }
    }
    Ok(())
}
