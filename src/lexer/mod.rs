// src/lexer/mod.rs
// Table-driven lexer: longest match over the compiled lexical automaton,
// blanks dropped, comments skipped through the comment automaton.

mod comment;
mod cursor;
mod scan;

use cursor::Cursor;
use scan::Scratch;

use crate::{
    host::{Origin, Position, Source},
    messages::{self, Message},
    tables::{Compiler, END_OF_TEXT_TOKEN, Recognized},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub id: u32,
    /// Raw text, kept only for tokens that carry a value.
    pub text: Option<String>,
    pub origin: Origin,
    /// Set on the first token after skipped garbage.
    pub error: bool,
}

impl Token {
    pub fn is_end(&self) -> bool {
        self.id == END_OF_TEXT_TOKEN
    }

    pub fn pos(&self) -> Position {
        self.origin.pos
    }
}

/// A lexical error waiting to be localized and reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub origin: Origin,
    pub message: Message,
}

pub struct Lexer<'c, S> {
    compiler: &'c Compiler,
    source: S,
    cursor: Cursor,
    scratch: Scratch,
    comment_scratch: Scratch,
    /// Inside a run of unrecognizable characters; only its start is reported.
    stuck: bool,
    diagnostics: Vec<Diagnostic>,
    error_seen: bool,
    tokens: usize,
}

impl<'c, S: Source> Lexer<'c, S> {
    pub fn new(compiler: &'c Compiler, mut source: S) -> Self {
        let cursor = Cursor::start(&mut source);
        Self {
            compiler,
            source,
            cursor,
            scratch: Scratch::new(&compiler.lexer),
            comment_scratch: Scratch::new(&compiler.comments),
            stuck: false,
            diagnostics: Vec::new(),
            error_seen: false,
            tokens: 0,
        }
    }

    pub fn origin(&self) -> Origin {
        self.cursor.origin()
    }

    /// Whether any lexical error has been seen so far.
    pub fn error_seen(&self) -> bool {
        self.error_seen
    }

    /// Significant tokens returned so far (end of text excluded).
    pub fn token_count(&self) -> usize {
        self.tokens
    }

    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    fn diagnose(&mut self, origin: Origin, message: Message) {
        log::debug!(
            "lexical error at {}:{}: {}",
            origin.line,
            origin.col,
            message.key
        );
        self.error_seen = true;
        self.diagnostics.push(Diagnostic { origin, message });
    }

    /// Next significant token; end of text repeats once reached.
    pub fn next_token(&mut self) -> Token {
        let mut after_error = false;
        loop {
            let origin = self.cursor.origin();
            if self.cursor.at_end() {
                return Token {
                    id: END_OF_TEXT_TOKEN,
                    text: None,
                    origin,
                    error: after_error,
                };
            }

            let m = scan::longest_match(
                &self.compiler.lexer,
                &mut self.scratch,
                &mut self.cursor,
                &mut self.source,
                0,
            );
            let Some(m) = m.filter(|m| m.len > 0) else {
                if !self.stuck {
                    let shown = describe(self.cursor.code());
                    self.diagnose(
                        origin,
                        Message::new(messages::LEX_UNEXPECTED_CHAR).arg(shown),
                    );
                    self.stuck = true;
                }
                after_error = true;
                self.cursor.consume(&mut self.source, 1);
                continue;
            };

            self.stuck = false;
            let text = self.cursor.text(m.len);
            self.cursor.consume(&mut self.source, m.len);
            match m.recognized {
                Recognized::Token(id) => {
                    let Some(info) = self.compiler.token(id) else {
                        continue;
                    };
                    if !info.significant {
                        continue;
                    }
                    self.tokens += 1;
                    log::trace!("token {id} at {}:{} {text:?}", origin.line, origin.col);
                    return Token {
                        id,
                        text: info.carries_value.then_some(text),
                        origin,
                        error: after_error,
                    };
                }
                Recognized::CommentStart => self.skip_comment(origin),
                Recognized::CommentEnd => {
                    self.diagnose(origin, Message::new(messages::LEX_UNEXPECTED_COMMENT_END));
                    after_error = true;
                }
                Recognized::None | Recognized::FollowAccept => {}
            }
        }
    }

    /// Drains the input, returning every significant token (end of text
    /// excluded) and the lexical errors met on the way.
    pub fn tokens(mut self) -> (Vec<Token>, Vec<Diagnostic>) {
        let mut out = Vec::new();
        loop {
            let t = self.next_token();
            if t.is_end() {
                break;
            }
            out.push(t);
        }
        (out, self.diagnostics)
    }
}

fn describe(code: i32) -> String {
    match char::from_u32(code as u32) {
        Some(c) if !c.is_control() => format!("'{c}'"),
        _ => format!("U+{:04X}", code as u32),
    }
}
