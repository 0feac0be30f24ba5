// src/demo/sum.rs
// Comma-separated numbers summed left to right through an inherited
// accumulator. The accumulator of a list is only known once the enclosing
// rule has been reduced, so every addition waits on it.
//
//   r0  S -> L             L.acc := zero()          S.val := L.sum
//   r1  L -> num ',' L     L1.acc := add(L.acc, num) L.sum := L1.sum
//   r2  L -> num           L.sum := add(L.acc, num)

use super::Reports;
use crate::{
    host::{Call, Control, Host, Produced, Report, SemanticError},
    tables::{
        Automaton, Compiler, Recognized,
        build::{accept, copy, hard, lex_state, nonterminal, parser_state, reduce, rule, shift, token},
    },
};

pub const END: u32 = 0;
pub const NUM: u32 = 1;
pub const COMMA: u32 = 2;
pub const BLANK: u32 = 3;

pub const START: u32 = 0;
pub const LIST: u32 = 1;

// Attributes of `L`.
pub const ACC: u32 = 0;
pub const SUM: u32 = 1;

pub const ZERO: u32 = 1;
pub const ADD: u32 = 2;

fn lexer() -> Automaton {
    use Recognized::{None as Nothing, Token};
    let blanks = [('\t', '\n', 1), ('\r', '\r', 1), (' ', ' ', 1)];
    let mut start = blanks.to_vec();
    start.extend([(',', ',', 2), ('0', '9', 3)]);
    Automaton {
        states: vec![
            lex_state(Nothing, &[], &start),
            lex_state(Token(BLANK), &[], &blanks),
            lex_state(Token(COMMA), &[], &[]),
            lex_state(Token(NUM), &[], &[('0', '9', 3)]),
        ],
        max_depth: 0,
    }
}

pub fn compiler() -> Compiler {
    Compiler {
        tokens: vec![
            token(Some("end of text"), true, false),
            token(Some("number"), true, true),
            token(Some("','"), true, false),
            token(None, false, false),
        ],
        lexer: lexer(),
        comments: Automaton::default(),
        states: vec![
            parser_state(vec![shift(NUM, NUM, 2)]),
            parser_state(vec![accept(END)]),
            parser_state(vec![reduce(END, END, 2), shift(COMMA, COMMA, 4)]),
            parser_state(vec![reduce(END, END, 0)]),
            parser_state(vec![shift(NUM, NUM, 2)]),
            parser_state(vec![reduce(END, END, 1)]),
        ],
        nonterminals: vec![nonterminal(1, &[(0, 1)]), nonterminal(2, &[(0, 3), (4, 5)])],
        rules: vec![
            rule(
                1,
                START,
                vec![hard(ZERO, (1, ACC), &[]), copy((0, 0), (1, SUM))],
            ),
            rule(
                3,
                LIST,
                vec![
                    hard(ADD, (3, ACC), &[(0, ACC), (1, 0)]),
                    copy((0, SUM), (3, SUM)),
                ],
            ),
            rule(1, LIST, vec![hard(ADD, (0, SUM), &[(0, ACC), (1, 0)])]),
        ],
        recoveries: Vec::new(),
    }
}

#[derive(Debug, Default)]
pub struct SumHost {
    pub errors: Reports,
    /// `(function, result)` of every hard call, in evaluation order.
    pub trace: Vec<(u32, i64)>,
}

impl Host for SumHost {
    type Value = i64;

    fn execution(
        &mut self,
        call: Call<'_, i64>,
        _ctl: &mut Control,
    ) -> Result<Produced<i64>, SemanticError> {
        let value = match call.function {
            ZERO => 0,
            ADD => {
                let acc = call
                    .value(0)
                    .copied()
                    .ok_or_else(|| SemanticError::new("accumulator without a value"))?;
                let text = call.text(1).unwrap_or_default();
                let n: i64 = text
                    .parse()
                    .map_err(|_| SemanticError::new(format!("bad number {text:?}")))?;
                acc.checked_add(n)
                    .ok_or_else(|| SemanticError::new("overflow in addition"))?
            }
            f => return Err(SemanticError::new(format!("unknown function {f}"))),
        };
        self.trace.push((call.function, value));
        Ok(Produced::new(value))
    }

    fn error(&mut self, report: &Report, ctl: &mut Control) {
        self.errors.push(report, ctl);
    }
}
