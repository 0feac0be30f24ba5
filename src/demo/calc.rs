// src/demo/calc.rs
// Arithmetic over `+`, `*`, parentheses and decimal numbers, with nested
// `/* */` comments and recovery on `*`.
//
//   r0  E -> E '+' T      r3  T -> F
//   r1  E -> T            r4  F -> '(' E ')'
//   r2  T -> T '*' F      r5  F -> num
//
// The hard flavour computes an `i64`; the soft flavour keeps the tree.

use super::Reports;
use crate::{
    host::{Call, Control, Host, Produced, Report, SemanticError},
    tables::{
        Automaton, COMMENT_CLASS_BEGIN, COMMENT_CLASS_END, COMMENT_CLASS_EOF, Compiler, Recognized,
        Recovery, RecoveryEntry, SemanticAction,
        build::{
            accept, copy, hard, lex_state, nonterminal, on_end_of_text, parser_state, reduce, rule,
            shift, soft, token,
        },
    },
};

pub const END: u32 = 0;
pub const NUM: u32 = 1;
pub const PLUS: u32 = 2;
pub const STAR: u32 = 3;
pub const LPAREN: u32 = 4;
pub const RPAREN: u32 = 5;
pub const BLANK: u32 = 6;

// Nonterminals.
pub const EXPR: u32 = 0;
pub const TERM: u32 = 1;
pub const FACTOR: u32 = 2;

// Function ids.
pub const ADD: u32 = 1;
pub const MUL: u32 = 2;
pub const NUMBER: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flavor {
    /// Hard functions evaluated by the host.
    Hard,
    /// Soft functions building `Term` nodes.
    Soft,
}

fn lexer() -> Automaton {
    use Recognized::{CommentEnd, CommentStart, None as Nothing, Token};
    let blanks = [('\t', '\n', 1), ('\r', '\r', 1), (' ', ' ', 1)];
    let mut start = blanks.to_vec();
    start.extend([
        ('(', '(', 2),
        (')', ')', 3),
        ('*', '*', 4),
        ('+', '+', 5),
        ('/', '/', 6),
        ('0', '9', 7),
    ]);
    Automaton {
        states: vec![
            lex_state(Nothing, &[], &start),
            lex_state(Token(BLANK), &[], &blanks),
            lex_state(Token(LPAREN), &[], &[]),
            lex_state(Token(RPAREN), &[], &[]),
            lex_state(Token(STAR), &[], &[('/', '/', 9)]),
            lex_state(Token(PLUS), &[], &[]),
            lex_state(Nothing, &[], &[('*', '*', 8)]),
            lex_state(Token(NUM), &[], &[('0', '9', 7)]),
            lex_state(CommentStart, &[], &[]),
            lex_state(CommentEnd, &[], &[]),
        ],
        max_depth: 0,
    }
}

/// Recognizes `/*`, `*/` and end of text inside a comment.
fn comments() -> Automaton {
    use Recognized::{None as Nothing, Token};
    let start = on_end_of_text(lex_state(Nothing, &[], &[('*', '*', 1), ('/', '/', 2)]), 5);
    Automaton {
        states: vec![
            start,
            lex_state(Nothing, &[], &[('/', '/', 3)]),
            lex_state(Nothing, &[], &[('*', '*', 4)]),
            lex_state(Token(COMMENT_CLASS_END), &[], &[]),
            lex_state(Token(COMMENT_CLASS_BEGIN), &[], &[]),
            lex_state(Token(COMMENT_CLASS_EOF), &[], &[]),
        ],
        max_depth: 0,
    }
}

pub fn compiler(flavor: Flavor) -> Compiler {
    let call = |function: u32, params: &[(u32, u32)]| -> SemanticAction {
        match flavor {
            Flavor::Hard => hard(function, (0, 0), params),
            Flavor::Soft => soft(function, (0, 0), params),
        }
    };
    // Operand starts: num shifts to 5, '(' to 4.
    let operand = || vec![shift(NUM, NUM, 5), shift(LPAREN, LPAREN, 4)];
    // Reduce on every follower of T and F: $ + * ).
    let on_follow = |r: u32| {
        vec![
            reduce(END, END, r),
            reduce(PLUS, STAR, r),
            reduce(RPAREN, RPAREN, r),
        ]
    };
    // E -> ...: reduce on $ + ), shift '*'.
    let expr_tail = |r: u32| {
        vec![
            reduce(END, END, r),
            reduce(PLUS, PLUS, r),
            shift(STAR, STAR, 7),
            reduce(RPAREN, RPAREN, r),
        ]
    };

    Compiler {
        tokens: vec![
            token(Some("end of text"), true, false),
            token(Some("number"), true, true),
            token(Some("'+'"), true, false),
            token(Some("'*'"), true, false),
            token(Some("'('"), true, false),
            token(Some("')'"), true, false),
            token(None, false, false),
        ],
        lexer: lexer(),
        comments: comments(),
        states: vec![
            parser_state(operand()),
            parser_state(vec![accept(END), shift(PLUS, PLUS, 6)]),
            parser_state(expr_tail(1)),
            parser_state(on_follow(3)),
            parser_state(operand()),
            parser_state(on_follow(5)),
            parser_state(operand()),
            parser_state(operand()),
            parser_state(vec![shift(PLUS, PLUS, 6), shift(RPAREN, RPAREN, 11)]),
            parser_state(expr_tail(0)),
            parser_state(on_follow(2)),
            parser_state(on_follow(4)),
        ],
        nonterminals: vec![
            nonterminal(1, &[(0, 1), (4, 8)]),
            nonterminal(1, &[(0, 2), (4, 2), (6, 9)]),
            nonterminal(1, &[(0, 3), (4, 3), (6, 3), (7, 10)]),
        ],
        rules: vec![
            rule(3, EXPR, vec![call(ADD, &[(1, 0), (3, 0)])]),
            rule(1, EXPR, vec![copy((0, 0), (1, 0))]),
            rule(3, TERM, vec![call(MUL, &[(1, 0), (3, 0)])]),
            rule(1, TERM, vec![copy((0, 0), (1, 0))]),
            rule(3, FACTOR, vec![copy((0, 0), (2, 0))]),
            rule(1, FACTOR, vec![call(NUMBER, &[(1, 0)])]),
        ],
        recoveries: vec![Recovery {
            terminal: STAR,
            entries: vec![
                RecoveryEntry { state: 0, goto_index: TERM },
                RecoveryEntry { state: 4, goto_index: TERM },
                RecoveryEntry { state: 6, goto_index: TERM },
                RecoveryEntry { state: 7, goto_index: FACTOR },
            ],
        }],
    }
}

/// Evaluates the hard flavour.
#[derive(Debug, Default)]
pub struct CalcHost {
    pub errors: Reports,
    /// Hard functions invoked, in order.
    pub calls: Vec<u32>,
}

impl CalcHost {
    fn operands(call: &Call<'_, i64>) -> Result<(i64, i64), SemanticError> {
        match (call.value(0), call.value(1)) {
            (Some(&a), Some(&b)) => Ok((a, b)),
            _ => Err(SemanticError::new("operand without a value")),
        }
    }
}

impl Host for CalcHost {
    type Value = i64;

    fn execution(
        &mut self,
        call: Call<'_, i64>,
        _ctl: &mut Control,
    ) -> Result<Produced<i64>, SemanticError> {
        self.calls.push(call.function);
        let value = match call.function {
            NUMBER => {
                let text = call
                    .text(0)
                    .ok_or_else(|| SemanticError::new("number without text"))?;
                text.parse::<i64>()
                    .map_err(|_| SemanticError::new(format!("number {text} is out of range")))?
            }
            ADD => {
                let (a, b) = Self::operands(&call)?;
                a.checked_add(b)
                    .ok_or_else(|| SemanticError::new("overflow in addition"))?
            }
            MUL => {
                let (a, b) = Self::operands(&call)?;
                a.checked_mul(b)
                    .ok_or_else(|| SemanticError::new("overflow in multiplication"))?
            }
            f => return Err(SemanticError::new(format!("unknown function {f}"))),
        };
        Ok(Produced::new(value))
    }

    fn error(&mut self, report: &Report, ctl: &mut Control) {
        self.errors.push(report, ctl);
    }
}

/// Host for the soft flavour; it only collects errors.
#[derive(Debug, Default)]
pub struct TreeHost {
    pub errors: Reports,
}

impl Host for TreeHost {
    type Value = ();

    fn execution(
        &mut self,
        call: Call<'_, ()>,
        _ctl: &mut Control,
    ) -> Result<Produced<()>, SemanticError> {
        Err(SemanticError::new(format!(
            "function {} is not evaluated by this host",
            call.function
        )))
    }

    fn error(&mut self, report: &Report, ctl: &mut Control) {
        self.errors.push(report, ctl);
    }
}
