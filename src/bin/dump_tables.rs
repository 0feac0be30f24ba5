// src/bin/dump_tables.rs
// Print a human-readable summary of a table file, or convert it.
// Usage:
//   cargo run --bin dump_tables -- tables/calc.bin
//   cargo run --bin dump_tables -- tables/calc.bin out.json   # convert (by extension)

use std::{env, path::PathBuf};

use anyhow::{Context, Result, bail};
use ccrun::tables::{Compiler, Recognized, load_tables, save_tables_bin, save_tables_json};

fn show_char(code: i32) -> String {
    match char::from_u32(code as u32) {
        Some(c) if code >= 0 && !c.is_control() => format!("{c:?}"),
        _ => code.to_string(),
    }
}

fn dump(t: &Compiler) {
    println!("tokens ({}):", t.tokens.len());
    for (i, tk) in t.tokens.iter().enumerate() {
        let mut flags = Vec::new();
        if !tk.significant {
            flags.push("blank");
        }
        if tk.carries_value {
            flags.push("value");
        }
        println!("  {i:>3} {:<20} {}", t.token_name(i as u32), flags.join(" "));
    }

    for (label, a) in [("lexer", &t.lexer), ("comments", &t.comments)] {
        println!("{label} ({} states, depth {}):", a.states.len(), a.max_depth);
        for (i, s) in a.states.iter().enumerate() {
            let rec = match s.recognized {
                Recognized::None => String::new(),
                r => format!("=> {r:?}"),
            };
            let ranges: Vec<String> = s
                .ranges
                .iter()
                .map(|r| {
                    if r.low == r.high {
                        format!("{}->{}", show_char(r.low), r.target)
                    } else {
                        format!("{}..{}->{}", show_char(r.low), show_char(r.high), r.target)
                    }
                })
                .collect();
            let eps: Vec<String> = s
                .epsilons
                .iter()
                .map(|e| match e.continuation {
                    Some(c) => format!("eps->{} if {c}", e.target),
                    None => format!("eps->{}", e.target),
                })
                .collect();
            println!("  {i:>3} {rec} {} {}", eps.join(" "), ranges.join(" "));
        }
    }

    println!("parser ({} states):", t.states.len());
    for (i, st) in t.states.iter().enumerate() {
        let acts: Vec<String> = st
            .declared()
            .iter()
            .map(|a| format!("[{}..{}] {:?} {}", a.low, a.high, a.kind, a.aux))
            .collect();
        println!("  {i:>3} {}", acts.join(", "));
    }
    for (i, r) in t.rules.iter().enumerate() {
        println!(
            "rule {i}: nt {} len {} ({} actions)",
            r.lhs,
            r.length,
            r.actions.len()
        );
    }
    for rec in &t.recoveries {
        println!(
            "recover on {} in {} states",
            t.token_name(rec.terminal),
            rec.entries.len()
        );
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let mut args = env::args().skip(1);
    let Some(input) = args.next().map(PathBuf::from) else {
        bail!("usage: dump_tables <tables.bin|tables.json> [out.bin|out.json]");
    };
    let t = load_tables(&input).with_context(|| format!("failed to load {}", input.display()))?;

    match args.next().map(PathBuf::from) {
        Some(out) => {
            let json = out.extension().is_some_and(|e| e == "json");
            if json {
                save_tables_json(&out, &t)?;
            } else {
                save_tables_bin(&out, &t)?;
            }
            println!("[dump_tables] wrote {}", out.display());
        }
        None => dump(&t),
    }
    Ok(())
}
