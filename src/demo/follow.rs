// src/demo/follow.rs
// Lexer-only grammar: `if` is a keyword only when directly followed by
// `(`; anywhere else it lexes as an identifier.

use crate::tables::{
    Automaton, Compiler, Recognized,
    build::{epsilon, followed_by, lex_state, parser_state, token},
};

pub const END: u32 = 0;
pub const IF: u32 = 1;
pub const IDENT: u32 = 2;
pub const LPAREN: u32 = 3;
pub const BLANK: u32 = 4;

fn lexer() -> Automaton {
    use Recognized::{FollowAccept, None as Nothing, Token};
    Automaton {
        states: vec![
            // 0: start
            lex_state(Nothing, &[epsilon(7)], &[(' ', ' ', 8), ('(', '(', 6), ('i', 'i', 1)]),
            lex_state(Nothing, &[], &[('f', 'f', 2)]),
            // 2: "if", guarded by the continuation rooted at 4
            lex_state(Nothing, &[followed_by(3, 4)], &[]),
            lex_state(Token(IF), &[], &[]),
            lex_state(Nothing, &[], &[('(', '(', 5)]),
            lex_state(FollowAccept, &[], &[]),
            lex_state(Token(LPAREN), &[], &[]),
            lex_state(Nothing, &[], &[('a', 'z', 9)]),
            lex_state(Token(BLANK), &[], &[(' ', ' ', 8)]),
            lex_state(Token(IDENT), &[], &[('a', 'z', 9)]),
        ],
        max_depth: 1,
    }
}

pub fn compiler() -> Compiler {
    Compiler {
        tokens: vec![
            token(Some("end of text"), true, false),
            token(Some("'if'"), true, false),
            token(Some("identifier"), true, true),
            token(Some("'('"), true, false),
            token(None, false, false),
        ],
        lexer: lexer(),
        comments: Automaton::default(),
        // No syntax; every terminal is an error.
        states: vec![parser_state(Vec::new())],
        nonterminals: Vec::new(),
        rules: Vec::new(),
        recoveries: Vec::new(),
    }
}
