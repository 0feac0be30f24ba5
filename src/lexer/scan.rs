// src/lexer/scan.rs
// Generalized automaton simulation: a set of active states advanced one
// character at a time, with epsilon closure before each step. A followed-by
// transition runs a nested simulation one scratch level deeper.

use super::cursor::Cursor;
use crate::{
    host::{Source, is_end_of_text},
    tables::{Automaton, Recognized},
};

/// Stack of member states plus a bitset for O(1) membership.
#[derive(Debug, Default)]
pub(crate) struct StateSet {
    stack: Vec<u32>,
    bits: Vec<u64>,
}

impl StateSet {
    fn with_states(n: usize) -> Self {
        Self {
            stack: Vec::with_capacity(n),
            bits: vec![0; n.div_ceil(64)],
        }
    }

    fn clear(&mut self) {
        for &s in &self.stack {
            self.bits[s as usize / 64] &= !(1u64 << (s % 64));
        }
        self.stack.clear();
    }

    #[inline]
    fn insert(&mut self, s: u32) -> bool {
        let (w, b) = (s as usize / 64, 1u64 << (s % 64));
        if self.bits[w] & b != 0 {
            return false;
        }
        self.bits[w] |= b;
        self.stack.push(s);
        true
    }

    #[inline]
    fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }
}

/// Ping/pong sets for one followed-by nesting level.
#[derive(Debug)]
pub(crate) struct Level {
    sets: [StateSet; 2],
}

/// Pre-sized scratch for an automaton: one level per nesting depth.
#[derive(Debug)]
pub(crate) struct Scratch {
    levels: Vec<Level>,
}

impl Scratch {
    pub(crate) fn new(a: &Automaton) -> Self {
        let n = a.states.len();
        let levels = (0..=a.max_depth)
            .map(|_| Level {
                sets: [StateSet::with_states(n), StateSet::with_states(n)],
            })
            .collect();
        Self { levels }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Match {
    pub recognized: Recognized,
    /// Characters consumed.
    pub len: usize,
}

struct Sim<'a, 's, S> {
    automaton: &'a Automaton,
    cursor: &'a mut Cursor,
    src: &'s mut S,
}

impl<S: Source> Sim<'_, '_, S> {
    /// Epsilon closure of `set`, `offset` characters past the lookahead.
    fn closure(&mut self, set: &mut StateSet, deeper: &mut [Level], offset: usize) {
        let automaton = self.automaton;
        let mut i = 0;
        while i < set.stack.len() {
            let s = set.stack[i] as usize;
            for e in &automaton.states[s].epsilons {
                let ok = match e.continuation {
                    None => true,
                    Some(root) => self.follows(deeper, root, offset),
                };
                if ok {
                    set.insert(e.target);
                }
            }
            i += 1;
        }
    }

    /// Moves every state of `from` on `code` into `to`.
    fn step(&self, from: &StateSet, to: &mut StateSet, code: i32) {
        to.clear();
        for &s in &from.stack {
            if let Some(t) = self.automaton.states[s as usize].step(code) {
                to.insert(t);
            }
        }
    }

    /// Whether the continuation rooted at `root` can reach a followed-by
    /// accept from `offset`.
    fn follows(&mut self, levels: &mut [Level], root: u32, offset: usize) -> bool {
        let Some((level, deeper)) = levels.split_first_mut() else {
            log::warn!("followed-by nesting exceeds the table's max depth");
            return false;
        };
        let [cur, next] = &mut level.sets;
        cur.clear();
        cur.insert(root);
        let mut i = offset;
        loop {
            self.closure(cur, deeper, i);
            let accepted = cur
                .stack
                .iter()
                .any(|&s| self.automaton.states[s as usize].recognized == Recognized::FollowAccept);
            if accepted {
                return true;
            }
            if cur.is_empty() {
                return false;
            }
            let code = self.cursor.peek(&mut *self.src, i);
            self.step(cur, next, code);
            std::mem::swap(cur, next);
            if is_end_of_text(code) {
                self.closure(cur, deeper, i + 1);
                return cur
                    .stack
                    .iter()
                    .any(|&s| self.automaton.states[s as usize].recognized == Recognized::FollowAccept);
            }
            i += 1;
        }
    }

    fn best(&self, set: &StateSet) -> Option<Recognized> {
        set.stack
            .iter()
            .map(|&s| self.automaton.states[s as usize].recognized)
            .filter_map(|r| r.priority().map(|p| (p, r)))
            .min_by_key(|&(p, _)| p)
            .map(|(_, r)| r)
    }

    fn longest(&mut self, levels: &mut [Level], root: u32) -> Option<Match> {
        let (level, deeper) = levels.split_first_mut()?;
        let [cur, next] = &mut level.sets;
        cur.clear();
        cur.insert(root);
        let mut last = None;
        let mut len = 0;
        loop {
            self.closure(cur, deeper, len);
            if let Some(recognized) = self.best(cur) {
                last = Some(Match { recognized, len });
            }
            if cur.is_empty() {
                break;
            }
            let code = self.cursor.peek(&mut *self.src, len);
            self.step(cur, next, code);
            std::mem::swap(cur, next);
            len += 1;
            if is_end_of_text(code) {
                self.closure(cur, deeper, len);
                if let Some(recognized) = self.best(cur) {
                    last = Some(Match { recognized, len });
                }
                break;
            }
        }
        last
    }
}

/// Longest match of `automaton` from `root` at the cursor. Ties at the
/// longest length go to the highest-priority recognition.
pub(crate) fn longest_match<S: Source>(
    automaton: &Automaton,
    scratch: &mut Scratch,
    cursor: &mut Cursor,
    src: &mut S,
    root: u32,
) -> Option<Match> {
    let mut sim = Sim {
        automaton,
        cursor,
        src,
    };
    sim.longest(&mut scratch.levels, root)
}
