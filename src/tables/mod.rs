// src/tables/mod.rs
// Immutable table model of a compiled grammar. Built once (offline builder or
// `demo`), then shared by reference across any number of parses.

pub mod build;
pub mod io;
pub mod validate;

use serde::{Deserialize, Serialize};

pub use io::{
    load_tables, load_tables_bin_bytes, load_tables_json_bytes, save_tables_bin,
    save_tables_json, tables_to_bytes,
};
pub use validate::validate;

/// Terminal delivered once the input is exhausted.
pub const END_OF_TEXT_TOKEN: u32 = 0;

// Binary codes of `recognizedToken`.
pub const NO_TOKEN: i32 = -1;
pub const COMMENT_START: i32 = -2;
pub const COMMENT_END: i32 = -3;
pub const FOLLOW_ACCEPT: i32 = -4;

/// Binary code of an epsilon transition without a followed-by continuation.
pub const NO_CONTINUATION: i32 = -1;

// Token classes of the comment automaton.
pub const COMMENT_CLASS_BEGIN: u32 = 0;
pub const COMMENT_CLASS_END: u32 = 1;
pub const COMMENT_CLASS_EOF: u32 = 2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenInfo {
    pub name: Option<String>,
    /// Non-significant tokens (blanks) are dropped by the lexer.
    pub significant: bool,
    /// Whether the token's raw text becomes its attribute.
    pub carries_value: bool,
}

/// What a lexical state accepts, if anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Recognized {
    None,
    Token(u32),
    CommentStart,
    CommentEnd,
    /// End of a followed-by continuation expression.
    FollowAccept,
}

impl Recognized {
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            NO_TOKEN => Some(Self::None),
            COMMENT_START => Some(Self::CommentStart),
            COMMENT_END => Some(Self::CommentEnd),
            FOLLOW_ACCEPT => Some(Self::FollowAccept),
            c if c >= 0 => Some(Self::Token(c as u32)),
            _ => None,
        }
    }

    pub fn code(self) -> i32 {
        match self {
            Self::None => NO_TOKEN,
            Self::Token(t) => t as i32,
            Self::CommentStart => COMMENT_START,
            Self::CommentEnd => COMMENT_END,
            Self::FollowAccept => FOLLOW_ACCEPT,
        }
    }

    /// Lower wins. Comment markers outrank every token; tokens rank by id.
    /// `None` and `FollowAccept` never end a token.
    #[inline]
    pub fn priority(self) -> Option<u64> {
        match self {
            Self::CommentStart => Some(0),
            Self::CommentEnd => Some(1),
            Self::Token(t) => Some(2 + t as u64),
            Self::None | Self::FollowAccept => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Epsilon {
    pub target: u32,
    /// Root of the followed-by continuation guarding this transition.
    pub continuation: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharRange {
    pub target: u32,
    pub low: i32,
    pub high: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LexState {
    pub recognized: Recognized,
    pub epsilons: Vec<Epsilon>,
    /// Sorted ascending by `low`, non-overlapping.
    pub ranges: Vec<CharRange>,
}

impl LexState {
    /// Target reached on `code`, found by binary search over the ranges.
    #[inline]
    pub fn step(&self, code: i32) -> Option<u32> {
        let i = self.ranges.partition_point(|r| r.low <= code);
        if i == 0 {
            return None;
        }
        let r = &self.ranges[i - 1];
        (code <= r.high).then_some(r.target)
    }
}

/// A generalized lexical automaton (epsilon + character-range transitions).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Automaton {
    pub states: Vec<LexState>,
    /// Deepest followed-by nesting; sizes the scanner's scratch levels.
    pub max_depth: u32,
}

impl Automaton {
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionKind {
    Shift,
    Reduce,
    Accept,
    Error,
}

impl ActionKind {
    pub fn from_byte(b: u8) -> Option<Self> {
        Some(match b {
            0 => Self::Shift,
            1 => Self::Reduce,
            2 => Self::Accept,
            3 => Self::Error,
            _ => return None,
        })
    }

    pub fn byte(self) -> u8 {
        match self {
            Self::Shift => 0,
            Self::Reduce => 1,
            Self::Accept => 2,
            Self::Error => 3,
        }
    }
}

/// One terminal range of a parser state. `aux` is the shift target or the
/// reduced rule, unused otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub kind: ActionKind,
    pub low: u32,
    pub high: u32,
    pub aux: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParserState {
    /// Sorted disjoint ranges; the last entry is the catch-all error.
    pub actions: Vec<Action>,
}

impl ParserState {
    /// Declared ranges, without the trailing catch-all.
    pub fn declared(&self) -> &[Action] {
        let n = self.actions.len().saturating_sub(1);
        &self.actions[..n]
    }

    /// Action for `terminal`, or the trailing error entry.
    pub fn action(&self, terminal: u32) -> Option<&Action> {
        let declared = self.declared();
        let i = declared.partition_point(|a| a.low <= terminal);
        if i > 0 && terminal <= declared[i - 1].high {
            return Some(&declared[i - 1]);
        }
        self.actions.last()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GotoEntry {
    pub from: u32,
    pub to: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Nonterminal {
    pub attribute_types: Vec<u32>,
    /// Sorted by `from`; the last pair doubles as the default.
    pub gotos: Vec<GotoEntry>,
}

impl Nonterminal {
    pub fn attribute_count(&self) -> usize {
        self.attribute_types.len()
    }

    pub fn goto(&self, from: u32) -> Option<u32> {
        let (last, searched) = self.gotos.split_last()?;
        match searched.binary_search_by_key(&from, |g| g.from) {
            Ok(i) => Some(searched[i].to),
            Err(_) => Some(last.to),
        }
    }
}

/// Attribute address inside a reduction: depth 0 is the left-hand side,
/// depth k the k-th right-hand-side symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Slot {
    pub depth: u32,
    pub attribute: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SemanticAction {
    pub soft: bool,
    pub target: Slot,
    pub function: u32,
    pub params: Vec<Slot>,
}

impl SemanticAction {
    /// Soft function 0: alias the target to its single parameter.
    #[inline]
    pub fn is_copy(&self) -> bool {
        self.soft && self.function == 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    pub length: u32,
    pub lhs: u32,
    pub actions: Vec<SemanticAction>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecoveryEntry {
    pub state: u32,
    /// Nonterminal synthesized when recovering in `state`.
    pub goto_index: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recovery {
    pub terminal: u32,
    pub entries: Vec<RecoveryEntry>,
}

/// A compiled grammar: tokens, lexical and comment automata, LR tables,
/// semantic actions and recovery entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Compiler {
    pub tokens: Vec<TokenInfo>,
    pub lexer: Automaton,
    pub comments: Automaton,
    pub states: Vec<ParserState>,
    pub nonterminals: Vec<Nonterminal>,
    pub rules: Vec<Rule>,
    pub recoveries: Vec<Recovery>,
}

impl Compiler {
    pub fn token(&self, id: u32) -> Option<&TokenInfo> {
        self.tokens.get(id as usize)
    }

    /// Display name of a terminal, `#id` for unnamed ones.
    pub fn token_name(&self, id: u32) -> String {
        match self.token(id).and_then(|t| t.name.as_deref()) {
            Some(name) => name.to_string(),
            None => format!("#{id}"),
        }
    }

    pub fn recovery_for(&self, terminal: u32) -> Option<&Recovery> {
        self.recoveries.iter().find(|r| r.terminal == terminal)
    }

    pub fn has_recovery(&self) -> bool {
        !self.recoveries.is_empty()
    }
}
