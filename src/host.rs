// src/host.rs
// Callback surface every embedder supplies: a character `Source` and a
// `Host` for hard functions, error reports and message lookup.

use serde::Serialize;
use thiserror::Error;

use crate::{
    messages,
    object::{Graph, Node, ObjectId},
};

/// Offset in host units; the cursor advances it by each character's width.
pub type Position = usize;

/// End of text.
pub const EOT: i32 = -1;
/// Legacy end-of-text code (NUL).
pub const EOT_LEGACY: i32 = 0;
pub const CR: i32 = '\r' as i32;
pub const LF: i32 = '\n' as i32;

#[inline]
pub fn is_end_of_text(code: i32) -> bool {
    code == EOT || code == EOT_LEGACY
}

/// One character read from the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Read {
    pub code: i32,
    pub width: usize,
}

impl Read {
    pub const END: Read = Read { code: EOT, width: 0 };
}

pub trait Source {
    /// Next character; advances the source by its width.
    fn read(&mut self) -> Read;
    fn pos(&self) -> Position;
    fn set_pos(&mut self, pos: Position);
}

impl<S: Source + ?Sized> Source for &mut S {
    fn read(&mut self) -> Read {
        (**self).read()
    }
    fn pos(&self) -> Position {
        (**self).pos()
    }
    fn set_pos(&mut self, pos: Position) {
        (**self).set_pos(pos)
    }
}

/// `Source` over an in-memory string; widths are UTF-8 byte lengths.
#[derive(Debug, Clone)]
pub struct TextSource<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> TextSource<'a> {
    pub fn new(text: &'a str) -> Self {
        Self { text, pos: 0 }
    }

    pub fn text(&self) -> &'a str {
        self.text
    }
}

impl Source for TextSource<'_> {
    fn read(&mut self) -> Read {
        let Some(c) = self.text.get(self.pos..).and_then(|rest| rest.chars().next()) else {
            return Read::END;
        };
        let width = c.len_utf8();
        self.pos += width;
        Read {
            code: c as i32,
            width,
        }
    }

    fn pos(&self) -> Position {
        self.pos
    }

    fn set_pos(&mut self, pos: Position) {
        self.pos = pos.min(self.text.len());
    }
}

/// Where something starts in the input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Origin {
    pub pos: Position,
    pub line: u32,
    pub col: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    Lexical,
    Syntactic,
    Semantic,
}

/// An error as delivered to `Host::error`; `message` is already localized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    pub kind: ErrorKind,
    pub pos: Position,
    pub line: u32,
    pub col: u32,
    pub message: String,
}

/// Requests a callback can make of the running parse.
#[derive(Debug, Clone, Copy, Default)]
pub struct Control {
    stop: bool,
    lock: bool,
}

impl Control {
    /// Abort at the next parser step.
    pub fn stop(&mut self) {
        self.stop = true;
    }

    /// Suppress hard functions once any error has been seen.
    pub fn lock(&mut self) {
        self.lock = true;
    }

    pub fn unlock(&mut self) {
        self.lock = false;
    }

    pub fn is_stopped(&self) -> bool {
        self.stop
    }

    pub fn is_locked(&self) -> bool {
        self.lock
    }
}

/// A hard-function invocation. Parameters are already resolved, aliases
/// included.
pub struct Call<'g, V> {
    pub function: u32,
    /// Position recorded for the attribute being computed.
    pub pos: Position,
    params: &'g [ObjectId],
    graph: &'g Graph<V>,
}

impl<'g, V> Call<'g, V> {
    pub(crate) fn new(function: u32, pos: Position, params: &'g [ObjectId], graph: &'g Graph<V>) -> Self {
        Self {
            function,
            pos,
            params,
            graph,
        }
    }

    pub fn param_count(&self) -> usize {
        self.params.len()
    }

    pub fn param_id(&self, i: usize) -> Option<ObjectId> {
        self.params.get(i).map(|&id| self.graph.representative(id))
    }

    pub fn param(&self, i: usize) -> Option<&'g Node<V>> {
        self.params.get(i).map(|&id| self.graph.resolve(id))
    }

    /// Raw text of a `StringLeaf` parameter.
    pub fn text(&self, i: usize) -> Option<&'g str> {
        self.params.get(i).and_then(|&id| self.graph.text(id))
    }

    /// Value of a `UserLeaf` parameter.
    pub fn value(&self, i: usize) -> Option<&'g V> {
        self.params.get(i).and_then(|&id| self.graph.value(id))
    }

    pub fn graph(&self) -> &'g Graph<V> {
        self.graph
    }
}

/// Successful hard-function result.
#[derive(Debug, Clone, PartialEq)]
pub struct Produced<V> {
    pub value: V,
    /// Falls back to the attribute's recorded position when `None`.
    pub pos: Option<Position>,
}

impl<V> Produced<V> {
    pub fn new(value: V) -> Self {
        Self { value, pos: None }
    }

    pub fn at(value: V, pos: Position) -> Self {
        Self {
            value,
            pos: Some(pos),
        }
    }
}

/// A hard function refused its inputs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct SemanticError {
    pub message: String,
}

impl SemanticError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

pub trait Host {
    type Value;

    fn execution(
        &mut self,
        call: Call<'_, Self::Value>,
        ctl: &mut Control,
    ) -> Result<Produced<Self::Value>, SemanticError>;

    fn error(&mut self, report: &Report, ctl: &mut Control);

    /// Message lookup with `^0`, `^1`, ... substitution.
    fn map(&self, key: &str, subs: &[&str]) -> String {
        messages::render(key, subs)
    }
}

impl<H: Host + ?Sized> Host for &mut H {
    type Value = H::Value;

    fn execution(
        &mut self,
        call: Call<'_, Self::Value>,
        ctl: &mut Control,
    ) -> Result<Produced<Self::Value>, SemanticError> {
        (**self).execution(call, ctl)
    }

    fn error(&mut self, report: &Report, ctl: &mut Control) {
        (**self).error(report, ctl)
    }

    fn map(&self, key: &str, subs: &[&str]) -> String {
        (**self).map(key, subs)
    }
}
