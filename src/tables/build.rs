// src/tables/build.rs
// Shorthands for assembling tables by hand (demo grammars, tests). Real
// tables come from the offline builder through `io`.

use super::{
    Action, ActionKind, CharRange, Epsilon, GotoEntry, LexState, Nonterminal, ParserState,
    Recognized, Rule, SemanticAction, Slot, TokenInfo,
};
use crate::host::EOT;

pub fn token(name: Option<&str>, significant: bool, carries_value: bool) -> TokenInfo {
    TokenInfo {
        name: name.map(str::to_string),
        significant,
        carries_value,
    }
}

/// Lexical state; `ranges` are `(low, high, target)` and get sorted.
pub fn lex_state(recognized: Recognized, epsilons: &[Epsilon], ranges: &[(char, char, u32)]) -> LexState {
    let mut ranges: Vec<CharRange> = ranges
        .iter()
        .map(|&(lo, hi, target)| CharRange {
            target,
            low: lo as i32,
            high: hi as i32,
        })
        .collect();
    ranges.sort_by_key(|r| r.low);
    LexState {
        recognized,
        epsilons: epsilons.to_vec(),
        ranges,
    }
}

/// Adds a transition on the end-of-text code, which no `char` can spell.
pub fn on_end_of_text(mut state: LexState, target: u32) -> LexState {
    state.ranges.insert(
        0,
        CharRange {
            target,
            low: EOT,
            high: EOT,
        },
    );
    state
}

pub fn epsilon(target: u32) -> Epsilon {
    Epsilon {
        target,
        continuation: None,
    }
}

pub fn followed_by(target: u32, continuation: u32) -> Epsilon {
    Epsilon {
        target,
        continuation: Some(continuation),
    }
}

pub fn shift(low: u32, high: u32, to: u32) -> Action {
    Action {
        kind: ActionKind::Shift,
        low,
        high,
        aux: to,
    }
}

pub fn reduce(low: u32, high: u32, rule: u32) -> Action {
    Action {
        kind: ActionKind::Reduce,
        low,
        high,
        aux: rule,
    }
}

pub fn accept(terminal: u32) -> Action {
    Action {
        kind: ActionKind::Accept,
        low: terminal,
        high: terminal,
        aux: 0,
    }
}

/// Parser state from its declared ranges; sorts them and appends the
/// catch-all error entry.
pub fn parser_state(mut actions: Vec<Action>) -> ParserState {
    actions.sort_by_key(|a| a.low);
    actions.push(Action {
        kind: ActionKind::Error,
        low: 0,
        high: 0,
        aux: 0,
    });
    ParserState { actions }
}

pub fn nonterminal(attributes: usize, gotos: &[(u32, u32)]) -> Nonterminal {
    let mut gotos: Vec<GotoEntry> = gotos.iter().map(|&(from, to)| GotoEntry { from, to }).collect();
    gotos.sort_by_key(|g| g.from);
    Nonterminal {
        attribute_types: vec![0; attributes],
        gotos,
    }
}

fn slot((depth, attribute): (u32, u32)) -> Slot {
    Slot { depth, attribute }
}

pub fn copy(target: (u32, u32), from: (u32, u32)) -> SemanticAction {
    SemanticAction {
        soft: true,
        target: slot(target),
        function: 0,
        params: vec![slot(from)],
    }
}

pub fn hard(function: u32, target: (u32, u32), params: &[(u32, u32)]) -> SemanticAction {
    SemanticAction {
        soft: false,
        target: slot(target),
        function,
        params: params.iter().copied().map(slot).collect(),
    }
}

pub fn soft(function: u32, target: (u32, u32), params: &[(u32, u32)]) -> SemanticAction {
    SemanticAction {
        soft: true,
        ..hard(function, target, params)
    }
}

pub fn rule(length: u32, lhs: u32, actions: Vec<SemanticAction>) -> Rule {
    Rule {
        length,
        lhs,
        actions,
    }
}
