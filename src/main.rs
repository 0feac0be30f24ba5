// src/main.rs
// Runs one input through a compiled table and prints the result graph.
// Usage:
//   cargo run -- tables/calc.bin input.txt
//   echo '1+2' | cargo run -- tables/calc_tree.json
// Env:
//   CCRUN_LOCK=1          suppress hard functions once an error was reported
//   CCRUN_STOP=1          abort at the first syntax error
//   CCRUN_MESSAGES=path   JSON object of message templates (key -> template)

use std::{env, fs, io::Read as _, path::PathBuf, time::Instant};

use anyhow::{Context, Result, bail};
use ccrun::{
    Call, Compilation, Control, Host, Options, Produced, Report, SemanticError, TextSource,
    messages::Catalog,
    object::Node,
    tables::load_tables,
};

/// Hard functions echo themselves as `f<id>(args..)`.
struct EchoHost {
    catalog: Catalog,
    errors: usize,
}

impl Host for EchoHost {
    type Value = String;

    fn execution(
        &mut self,
        call: Call<'_, String>,
        _ctl: &mut Control,
    ) -> Result<Produced<String>, SemanticError> {
        let args: Vec<String> = (0..call.param_count())
            .map(|i| match call.param(i) {
                Some(Node::String { text, .. }) => text.clone(),
                Some(Node::User { value: Some(v), .. }) => v.clone(),
                Some(Node::Term { function, .. }) => format!("t{function}"),
                _ => "_".to_string(),
            })
            .collect();
        Ok(Produced::new(format!(
            "f{}({})",
            call.function,
            args.join(", ")
        )))
    }

    fn error(&mut self, report: &Report, _ctl: &mut Control) {
        self.errors += 1;
        eprintln!(
            "[ccrun] {:?} error at {}:{}: {}",
            report.kind, report.line, report.col, report.message
        );
    }

    fn map(&self, key: &str, subs: &[&str]) -> String {
        self.catalog.render(key, subs)
    }
}

fn env_flag(name: &str) -> bool {
    env::var(name).is_ok_and(|v| !v.is_empty() && v != "0")
}

fn main() -> Result<()> {
    env_logger::init();

    let mut args = env::args().skip(1);
    let Some(tables_path) = args.next().map(PathBuf::from) else {
        bail!("usage: ccrun <tables.bin|tables.json> [input]");
    };

    let t0 = Instant::now();
    let compiler = load_tables(&tables_path)
        .with_context(|| format!("failed to load {}", tables_path.display()))?;
    println!(
        "[ccrun] loaded {} | {} tokens, {} lexer states, {} parser states, {} rules | {:.3} ms",
        tables_path.display(),
        compiler.tokens.len(),
        compiler.lexer.states.len(),
        compiler.states.len(),
        compiler.rules.len(),
        t0.elapsed().as_secs_f64() * 1e3
    );

    let text = match args.next() {
        Some(p) => fs::read_to_string(&p).with_context(|| format!("failed to read {p}"))?,
        None => {
            let mut s = String::new();
            std::io::stdin()
                .read_to_string(&mut s)
                .context("failed to read stdin")?;
            s
        }
    };

    let catalog = match env::var("CCRUN_MESSAGES") {
        Ok(p) => {
            let data = fs::read(&p).with_context(|| format!("failed to read {p}"))?;
            Catalog::from_json(&data).with_context(|| format!("bad message catalog {p}"))?
        }
        Err(_) => Catalog::default(),
    };
    let options = Options {
        lock_on_error: env_flag("CCRUN_LOCK"),
        stop_on_error: env_flag("CCRUN_STOP"),
    };

    let mut host = EchoHost { catalog, errors: 0 };
    let t1 = Instant::now();
    let outcome = Compilation::new(&compiler, TextSource::new(&text), &mut host)
        .with_options(options)
        .parse();
    let ms = t1.elapsed().as_secs_f64() * 1e3;

    match outcome.root {
        Some(root) => {
            let snap = outcome.graph.snapshot(root);
            println!("{}", serde_json::to_string_pretty(&snap)?);
        }
        None => println!("[ccrun] no result (input not accepted)"),
    }
    println!(
        "[ccrun] ok={} accepted={} errors={} nodes={} | parse {:.3} ms",
        outcome.ok,
        outcome.accepted,
        host.errors,
        outcome.graph.len(),
        ms
    );
    println!("[ccrun] stats {}", serde_json::to_string(&outcome.stats)?);

    if !outcome.ok {
        std::process::exit(1);
    }
    Ok(())
}
