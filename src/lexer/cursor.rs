// src/lexer/cursor.rs
// Input cursor: the current lookahead character plus whatever the scanner
// peeked past it. Line and column only move when characters are consumed.

use crate::host::{CR, LF, Origin, Position, Read, Source, is_end_of_text};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Eol {
    Normal,
    AfterCr,
}

#[derive(Debug)]
pub(crate) struct Cursor {
    /// Position of `buf[0]`.
    pos: Position,
    /// `buf[0]` is the lookahead; later entries were peeked by the scanner.
    buf: Vec<Read>,
    line: u32,
    col: u32,
    eol: Eol,
}

impl Cursor {
    pub(crate) fn start<S: Source>(src: &mut S) -> Self {
        let pos = src.pos();
        let first = src.read();
        Self {
            pos,
            buf: vec![first],
            line: 1,
            col: 1,
            eol: Eol::Normal,
        }
    }

    #[inline]
    pub(crate) fn code(&self) -> i32 {
        self.buf[0].code
    }

    #[inline]
    pub(crate) fn at_end(&self) -> bool {
        is_end_of_text(self.code())
    }

    pub(crate) fn origin(&self) -> Origin {
        Origin {
            pos: self.pos,
            line: self.line,
            col: self.col,
        }
    }

    /// Character `i` places ahead of the lookahead. Reading stops at end of
    /// text, which then repeats.
    pub(crate) fn peek<S: Source>(&mut self, src: &mut S, i: usize) -> i32 {
        while self.buf.len() <= i {
            let last = self.buf[self.buf.len() - 1];
            if is_end_of_text(last.code) {
                return last.code;
            }
            self.buf.push(src.read());
        }
        self.buf[i].code
    }

    /// Text of the first `n` characters (end-of-text codes excluded).
    pub(crate) fn text(&self, n: usize) -> String {
        self.buf
            .iter()
            .take(n)
            .filter(|r| r.code > 0)
            .filter_map(|r| char::from_u32(r.code as u32))
            .collect()
    }

    /// Consumes `n` characters and rewinds the source to just after them,
    /// dropping anything peeked beyond.
    pub(crate) fn consume<S: Source>(&mut self, src: &mut S, n: usize) {
        for i in 0..n {
            let r = self.peek_read(src, i);
            if is_end_of_text(r.code) {
                break;
            }
            self.track(r.code);
            self.pos += r.width;
        }
        if self.buf.len() > 1 || n > 0 {
            src.set_pos(self.pos);
            self.buf.clear();
            self.buf.push(src.read());
        }
    }

    fn peek_read<S: Source>(&mut self, src: &mut S, i: usize) -> Read {
        self.peek(src, i);
        self.buf[i.min(self.buf.len() - 1)]
    }

    /// CR, LF and CR+LF each end one line.
    fn track(&mut self, code: i32) {
        match (code, self.eol) {
            (CR, _) => {
                self.line += 1;
                self.col = 1;
                self.eol = Eol::AfterCr;
            }
            (LF, Eol::AfterCr) => {
                self.eol = Eol::Normal;
            }
            (LF, Eol::Normal) => {
                self.line += 1;
                self.col = 1;
            }
            _ => {
                self.col += 1;
                self.eol = Eol::Normal;
            }
        }
    }
}
