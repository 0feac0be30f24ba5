// src/bin/gen_demo_tables.rs
// Write every demo grammar as binary and JSON tables.
// Usage:
//   cargo run --bin gen_demo_tables             # writes tables/<name>.{bin,json}
//   cargo run --bin gen_demo_tables -- /out/dir

use std::{env, fs, path::PathBuf};

use anyhow::{Context, Result};
use ccrun::{
    demo,
    tables::{load_tables_bin_bytes, save_tables_bin, save_tables_json, tables_to_bytes, validate},
};

fn main() -> Result<()> {
    env_logger::init();
    let out_dir = PathBuf::from(env::args().nth(1).unwrap_or_else(|| "tables".to_string()));
    fs::create_dir_all(&out_dir)
        .with_context(|| format!("failed to create {}", out_dir.display()))?;

    for (name, t) in demo::all() {
        validate(&t).with_context(|| format!("demo table {name} is malformed"))?;

        // The reader must give back exactly what the writer was handed.
        let bytes = tables_to_bytes(&t);
        let back = load_tables_bin_bytes(&bytes)?;
        anyhow::ensure!(back == t, "{name}: binary round trip changed the table");

        let bin = out_dir.join(format!("{name}.bin"));
        let json = out_dir.join(format!("{name}.json"));
        save_tables_bin(&bin, &t).with_context(|| format!("failed to write {}", bin.display()))?;
        save_tables_json(&json, &t)
            .with_context(|| format!("failed to write {}", json.display()))?;
        println!(
            "[gen_demo_tables] {name}: {} tokens, {} lexer states, {} parser states, {} rules, {} bytes",
            t.tokens.len(),
            t.lexer.states.len(),
            t.states.len(),
            t.rules.len(),
            bytes.len()
        );
    }
    println!("[gen_demo_tables] wrote {}", out_dir.display());
    Ok(())
}
