//! Table files: binary and JSON round trips, rejection of truncated or
//! malformed input, and structural validation.

use std::{fs, path::PathBuf};

use ccrun::{
    TableError,
    demo,
    tables::{
        ActionKind, Compiler, load_tables, load_tables_bin_bytes, load_tables_json_bytes,
        save_tables_bin, save_tables_json, tables_to_bytes, validate,
    },
};

fn scratch_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("ccrun-{tag}-{}", std::process::id()));
    fs::create_dir_all(&dir).expect("create scratch dir");
    dir
}

#[test]
fn demo_tables_validate() {
    for (name, t) in demo::all() {
        if let Err(e) = validate(&t) {
            panic!("{name}: {e}");
        }
    }
}

#[test]
fn binary_round_trip_is_bit_identical() {
    for (name, t) in demo::all() {
        let bytes = tables_to_bytes(&t);
        let back = load_tables_bin_bytes(&bytes).unwrap_or_else(|e| panic!("{name}: {e}"));
        assert_eq!(back, t, "{name}");
        assert_eq!(tables_to_bytes(&back), bytes, "{name}");
    }
}

#[test]
fn json_round_trip() {
    for (name, t) in demo::all() {
        let json = serde_json::to_vec(&t).expect("serialize");
        let back = load_tables_json_bytes(&json).unwrap_or_else(|e| panic!("{name}: {e}"));
        assert_eq!(back, t, "{name}");
    }
}

#[test]
fn files_load_by_extension() {
    let dir = scratch_dir("files");
    let t = demo::calc::compiler(demo::calc::Flavor::Hard);
    let bin = dir.join("calc.bin");
    let json = dir.join("calc.json");
    save_tables_bin(&bin, &t).expect("write bin");
    save_tables_json(&json, &t).expect("write json");
    assert_eq!(load_tables(&bin).expect("load bin"), t);
    assert_eq!(load_tables(&json).expect("load json"), t);
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn every_truncation_is_rejected() {
    let t = demo::sum::compiler();
    let bytes = tables_to_bytes(&t);
    for n in 0..bytes.len() {
        assert!(
            load_tables_bin_bytes(&bytes[..n]).is_err(),
            "prefix of {n}/{} bytes loaded",
            bytes.len()
        );
    }
}

#[test]
fn trailing_bytes_are_rejected() {
    let t = demo::follow::compiler();
    let mut bytes = tables_to_bytes(&t);
    bytes.extend_from_slice(&[0, 0, 0, 0]);
    assert!(matches!(
        load_tables_bin_bytes(&bytes),
        Err(TableError::Trailing { len: 4 })
    ));
}

#[test]
fn missing_file_is_an_io_error() {
    let path = scratch_dir("missing").join("nope.bin");
    assert!(matches!(load_tables(&path), Err(TableError::Io(_))));
}

fn calc() -> Compiler {
    demo::calc::compiler(demo::calc::Flavor::Hard)
}

fn assert_invalid(t: &Compiler, what: &str) {
    match validate(t) {
        Err(TableError::Invalid(msg)) => assert!(!msg.is_empty()),
        other => panic!("{what}: expected a validation error, got {other:?}"),
    }
    // A table that fails validation never loads either.
    assert!(load_tables_bin_bytes(&tables_to_bytes(t)).is_err(), "{what}");
}

#[test]
fn validation_rejects_malformed_tables() {
    let mut t = calc();
    t.states[3].actions.pop();
    assert_invalid(&t, "state without the error catch-all");

    let mut t = calc();
    t.states[0].actions[0].aux = 99;
    assert_invalid(&t, "shift to a missing state");

    let mut t = calc();
    t.states[2].actions.swap(0, 1);
    assert_invalid(&t, "unsorted terminal ranges");

    let mut t = calc();
    t.states[5].actions[0].kind = ActionKind::Reduce;
    t.states[5].actions[0].aux = 6;
    assert_invalid(&t, "reduce by a missing rule");

    let mut t = calc();
    t.nonterminals[2].gotos.reverse();
    assert_invalid(&t, "unsorted gotos");

    let mut t = calc();
    t.rules[0].actions[0].params[0].depth = 4;
    assert_invalid(&t, "attribute beyond the rule");

    let mut t = calc();
    t.rules[1].actions[0].params.clear();
    assert_invalid(&t, "copy without a source");

    let mut t = calc();
    t.lexer.states[7].ranges[0].target = 40;
    assert_invalid(&t, "lexer transition out of range");

    let mut t = calc();
    t.comments.states.clear();
    assert_invalid(&t, "comment marker without a comment automaton");

    let mut t = calc();
    t.recoveries[0].entries[0].goto_index = 3;
    assert_invalid(&t, "recovery into a missing nonterminal");

    let mut t = demo::follow::compiler();
    t.lexer.max_depth = 0;
    assert_invalid(&t, "followed-by with no depth");
}
