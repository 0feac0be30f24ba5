// src/tables/io.rs
use std::{
    io::{BufWriter, Write},
    path::Path,
    time::Instant,
};

use super::{
    Action, ActionKind, Automaton, CharRange, Compiler, Epsilon, GotoEntry, LexState,
    NO_CONTINUATION, Nonterminal, ParserState, Recognized, Recovery, RecoveryEntry, Rule,
    SemanticAction, Slot, TokenInfo, validate,
};
use crate::error::{Result, TableError};

// -------------------- JSON (de)serialization --------------------

pub fn save_tables_json(path: &Path, t: &Compiler) -> Result<()> {
    // Stream to disk to avoid giant intermediate strings.
    let f = std::fs::File::create(path)?;
    let mut w = BufWriter::new(f);
    serde_json::to_writer_pretty(&mut w, t)?;
    w.flush()?;
    Ok(())
}

pub fn load_tables_json_bytes(data: &[u8]) -> Result<Compiler> {
    let t: Compiler = serde_json::from_slice(data)?;
    validate(&t)?;
    Ok(t)
}

// -------------------- Binary (4-byte little-endian words) --------------------
//
// counts:  tokens, lex states, lex depth, comment states, comment depth,
//          parser states, nonterminals, rules, recovering terminals
// tokens:  {significant, carries_value}*, then name* (len, codes.., 0)
// lexer:   {recognized, ranges, epsilons}*, then per state eps* ranges*
// comment: same shape
// parser:  per state: count, {kind:u8, low, high, aux}*
// gotos:   per nonterminal: {attrs, gotos}, attr types*, {from, to}*
// rules:   per rule: {len, lhs, actions}, {soft, depth, attr, fn, params}*,
//          then every action's {depth, attr}*
// recover: per terminal: {terminal, n}, {state, goto}*

struct Reader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> Reader<'a> {
    fn take<const N: usize>(&mut self, what: &'static str) -> Result<[u8; N]> {
        let Some(bytes) = self.data.get(self.offset..self.offset + N) else {
            return Err(TableError::Truncated {
                offset: self.offset,
                what,
            });
        };
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        self.offset += N;
        Ok(out)
    }

    #[inline]
    fn u32(&mut self, what: &'static str) -> Result<u32> {
        Ok(u32::from_le_bytes(self.take::<4>(what)?))
    }

    #[inline]
    fn i32(&mut self, what: &'static str) -> Result<i32> {
        Ok(i32::from_le_bytes(self.take::<4>(what)?))
    }

    fn u8(&mut self, what: &'static str) -> Result<u8> {
        Ok(self.take::<1>(what)?[0])
    }

    fn bool(&mut self, what: &'static str) -> Result<bool> {
        let at = self.offset;
        match self.u32(what)? {
            0 => Ok(false),
            1 => Ok(true),
            v => Err(TableError::BadCode {
                what,
                value: v as i64,
                offset: at,
            }),
        }
    }

    /// A count, checked against the remaining input so a corrupt header
    /// cannot request absurd allocations.
    fn count(&mut self, what: &'static str, min_record: usize) -> Result<usize> {
        let at = self.offset;
        let n = self.u32(what)? as usize;
        let remaining = self.data.len() - self.offset;
        if n.saturating_mul(min_record) > remaining {
            return Err(TableError::BadCode {
                what,
                value: n as i64,
                offset: at,
            });
        }
        Ok(n)
    }

    fn name(&mut self) -> Result<Option<String>> {
        let len = self.count("name length", 4)?;
        if len == 0 {
            return Ok(None);
        }
        let mut s = String::with_capacity(len);
        for _ in 0..len {
            let at = self.offset;
            let code = self.u32("name character")?;
            let c = char::from_u32(code).ok_or(TableError::BadCode {
                what: "name character",
                value: code as i64,
                offset: at,
            })?;
            s.push(c);
        }
        let at = self.offset;
        let zero = self.u32("name terminator")?;
        if zero != 0 {
            return Err(TableError::BadCode {
                what: "name terminator",
                value: zero as i64,
                offset: at,
            });
        }
        Ok(Some(s))
    }

    fn automaton(&mut self, n_states: usize, max_depth: u32) -> Result<Automaton> {
        let mut headers = Vec::with_capacity(n_states);
        for _ in 0..n_states {
            let at = self.offset;
            let code = self.i32("recognized token")?;
            let recognized = Recognized::from_code(code).ok_or(TableError::BadCode {
                what: "recognized token",
                value: code as i64,
                offset: at,
            })?;
            let n_ranges = self.count("transition count", 12)?;
            let n_eps = self.count("epsilon count", 8)?;
            headers.push((recognized, n_ranges, n_eps));
        }
        let mut states = Vec::with_capacity(n_states);
        for (recognized, n_ranges, n_eps) in headers {
            let mut epsilons = Vec::with_capacity(n_eps);
            for _ in 0..n_eps {
                let target = self.u32("epsilon target")?;
                let at = self.offset;
                let cont = self.i32("continuation state")?;
                let continuation = match cont {
                    NO_CONTINUATION => None,
                    c if c >= 0 => Some(c as u32),
                    c => {
                        return Err(TableError::BadCode {
                            what: "continuation state",
                            value: c as i64,
                            offset: at,
                        });
                    }
                };
                epsilons.push(Epsilon {
                    target,
                    continuation,
                });
            }
            let mut ranges = Vec::with_capacity(n_ranges);
            for _ in 0..n_ranges {
                ranges.push(CharRange {
                    target: self.u32("range target")?,
                    low: self.i32("range low")?,
                    high: self.i32("range high")?,
                });
            }
            states.push(LexState {
                recognized,
                epsilons,
                ranges,
            });
        }
        Ok(Automaton { states, max_depth })
    }
}

pub fn load_tables_bin_bytes(data: &[u8]) -> Result<Compiler> {
    let t0 = Instant::now();
    let mut r = Reader { data, offset: 0 };

    let n_tokens = r.count("token count", 8)?;
    let n_lex = r.count("lexical state count", 12)?;
    let lex_depth = r.u32("lexical depth")?;
    let n_comment = r.count("comment state count", 12)?;
    let comment_depth = r.u32("comment depth")?;
    let n_parser = r.count("parser state count", 4)?;
    let n_nonterminals = r.count("nonterminal count", 8)?;
    let n_rules = r.count("rule count", 12)?;
    let n_recover = r.count("recovering terminal count", 8)?;

    let mut flags = Vec::with_capacity(n_tokens);
    for _ in 0..n_tokens {
        let significant = r.bool("significant flag")?;
        let carries_value = r.bool("value flag")?;
        flags.push((significant, carries_value));
    }
    let mut tokens = Vec::with_capacity(n_tokens);
    for (significant, carries_value) in flags {
        tokens.push(TokenInfo {
            name: r.name()?,
            significant,
            carries_value,
        });
    }

    let lexer = r.automaton(n_lex, lex_depth)?;
    let comments = r.automaton(n_comment, comment_depth)?;

    let mut states = Vec::with_capacity(n_parser);
    for _ in 0..n_parser {
        let n = r.count("action count", 13)?;
        let mut actions = Vec::with_capacity(n);
        for _ in 0..n {
            let at = r.offset;
            let b = r.u8("action kind")?;
            let kind = ActionKind::from_byte(b).ok_or(TableError::BadCode {
                what: "action kind",
                value: b as i64,
                offset: at,
            })?;
            actions.push(Action {
                kind,
                low: r.u32("action low terminal")?,
                high: r.u32("action high terminal")?,
                aux: r.u32("action index")?,
            });
        }
        states.push(ParserState { actions });
    }

    let mut nonterminals = Vec::with_capacity(n_nonterminals);
    for _ in 0..n_nonterminals {
        let n_attrs = r.count("attribute count", 4)?;
        let n_gotos = r.count("goto count", 8)?;
        let mut attribute_types = Vec::with_capacity(n_attrs);
        for _ in 0..n_attrs {
            attribute_types.push(r.u32("attribute type")?);
        }
        let mut gotos = Vec::with_capacity(n_gotos);
        for _ in 0..n_gotos {
            gotos.push(GotoEntry {
                from: r.u32("goto source")?,
                to: r.u32("goto target")?,
            });
        }
        nonterminals.push(Nonterminal {
            attribute_types,
            gotos,
        });
    }

    let mut rules = Vec::with_capacity(n_rules);
    for _ in 0..n_rules {
        let length = r.u32("rule length")?;
        let lhs = r.u32("rule lhs")?;
        let n_actions = r.count("semantic action count", 20)?;
        let mut heads = Vec::with_capacity(n_actions);
        for _ in 0..n_actions {
            let soft = r.bool("soft flag")?;
            let target = Slot {
                depth: r.u32("target depth")?,
                attribute: r.u32("target attribute")?,
            };
            let function = r.u32("function id")?;
            let n_params = r.count("parameter count", 8)?;
            heads.push((soft, target, function, n_params));
        }
        let mut actions = Vec::with_capacity(n_actions);
        for (soft, target, function, n_params) in heads {
            let mut params = Vec::with_capacity(n_params);
            for _ in 0..n_params {
                params.push(Slot {
                    depth: r.u32("parameter depth")?,
                    attribute: r.u32("parameter attribute")?,
                });
            }
            actions.push(SemanticAction {
                soft,
                target,
                function,
                params,
            });
        }
        rules.push(Rule {
            length,
            lhs,
            actions,
        });
    }

    let mut recoveries = Vec::with_capacity(n_recover);
    for _ in 0..n_recover {
        let terminal = r.u32("recovering terminal")?;
        let n = r.count("recovery entry count", 8)?;
        let mut entries = Vec::with_capacity(n);
        for _ in 0..n {
            entries.push(RecoveryEntry {
                state: r.u32("recovery state")?,
                goto_index: r.u32("recovery goto index")?,
            });
        }
        recoveries.push(Recovery { terminal, entries });
    }

    if r.offset != data.len() {
        return Err(TableError::Trailing {
            len: data.len() - r.offset,
        });
    }

    let t = Compiler {
        tokens,
        lexer,
        comments,
        states,
        nonterminals,
        rules,
        recoveries,
    };
    validate(&t)?;
    log::debug!(
        "loaded tables: {} tokens, {} lex states, {} parser states, {} rules in {:?}",
        t.tokens.len(),
        t.lexer.states.len(),
        t.states.len(),
        t.rules.len(),
        t0.elapsed()
    );
    Ok(t)
}

#[derive(Default)]
struct Writer {
    out: Vec<u8>,
}

impl Writer {
    #[inline]
    fn u32(&mut self, v: u32) {
        self.out.extend_from_slice(&v.to_le_bytes());
    }

    #[inline]
    fn i32(&mut self, v: i32) {
        self.out.extend_from_slice(&v.to_le_bytes());
    }

    fn len(&mut self, n: usize) {
        self.u32(n as u32);
    }

    fn bool(&mut self, b: bool) {
        self.u32(b as u32);
    }

    fn name(&mut self, name: Option<&str>) {
        match name {
            None | Some("") => self.u32(0),
            Some(s) => {
                self.len(s.chars().count());
                for c in s.chars() {
                    self.u32(c as u32);
                }
                self.u32(0);
            }
        }
    }

    fn automaton(&mut self, a: &Automaton) {
        for s in &a.states {
            self.i32(s.recognized.code());
            self.len(s.ranges.len());
            self.len(s.epsilons.len());
        }
        for s in &a.states {
            for e in &s.epsilons {
                self.u32(e.target);
                self.i32(e.continuation.map_or(NO_CONTINUATION, |c| c as i32));
            }
            for r in &s.ranges {
                self.u32(r.target);
                self.i32(r.low);
                self.i32(r.high);
            }
        }
    }
}

/// Serializes `t` into the binary table format.
pub fn tables_to_bytes(t: &Compiler) -> Vec<u8> {
    let mut w = Writer::default();

    w.len(t.tokens.len());
    w.len(t.lexer.states.len());
    w.u32(t.lexer.max_depth);
    w.len(t.comments.states.len());
    w.u32(t.comments.max_depth);
    w.len(t.states.len());
    w.len(t.nonterminals.len());
    w.len(t.rules.len());
    w.len(t.recoveries.len());

    for tk in &t.tokens {
        w.bool(tk.significant);
        w.bool(tk.carries_value);
    }
    for tk in &t.tokens {
        w.name(tk.name.as_deref());
    }

    w.automaton(&t.lexer);
    w.automaton(&t.comments);

    for st in &t.states {
        w.len(st.actions.len());
        for a in &st.actions {
            w.out.push(a.kind.byte());
            w.u32(a.low);
            w.u32(a.high);
            w.u32(a.aux);
        }
    }

    for nt in &t.nonterminals {
        w.len(nt.attribute_types.len());
        w.len(nt.gotos.len());
        for &ty in &nt.attribute_types {
            w.u32(ty);
        }
        for g in &nt.gotos {
            w.u32(g.from);
            w.u32(g.to);
        }
    }

    for rule in &t.rules {
        w.u32(rule.length);
        w.u32(rule.lhs);
        w.len(rule.actions.len());
        for a in &rule.actions {
            w.bool(a.soft);
            w.u32(a.target.depth);
            w.u32(a.target.attribute);
            w.u32(a.function);
            w.len(a.params.len());
        }
        for a in &rule.actions {
            for p in &a.params {
                w.u32(p.depth);
                w.u32(p.attribute);
            }
        }
    }

    for rec in &t.recoveries {
        w.u32(rec.terminal);
        w.len(rec.entries.len());
        for e in &rec.entries {
            w.u32(e.state);
            w.u32(e.goto_index);
        }
    }

    w.out
}

pub fn save_tables_bin(path: &Path, t: &Compiler) -> Result<()> {
    let f = std::fs::File::create(path)?;
    let mut w = BufWriter::new(f);
    w.write_all(&tables_to_bytes(t))?;
    w.flush()?;
    Ok(())
}

/// Loads a table file, JSON when the extension says so, binary otherwise.
pub fn load_tables(path: &Path) -> Result<Compiler> {
    let data = std::fs::read(path)?;
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => load_tables_json_bytes(&data),
        _ => load_tables_bin_bytes(&data),
    }
}
