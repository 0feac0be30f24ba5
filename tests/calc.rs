//! End-to-end runs of the calculator grammar: evaluation, the kept tree of
//! the soft flavour, syntax recovery and the lock/stop controls.

use ccrun::{
    Call, Compilation, Control, Host, Options, Outcome, Produced, Report, SemanticError, Snapshot,
    TextSource,
    demo::calc::{self, CalcHost, Flavor, TreeHost},
    host::{ErrorKind, Position},
    parse,
};

fn init_log() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn eval(src: &str) -> (Outcome<i64>, CalcHost) {
    init_log();
    let t = calc::compiler(Flavor::Hard);
    let mut host = CalcHost::default();
    let out = parse(&t, TextSource::new(src), &mut host);
    (out, host)
}

fn tree(src: &str) -> (Outcome<()>, TreeHost) {
    init_log();
    let t = calc::compiler(Flavor::Soft);
    let mut host = TreeHost::default();
    let out = parse(&t, TextSource::new(src), &mut host);
    (out, host)
}

/// `(function child..)` for terms, raw text for leaves, `_` for null.
fn sexpr(s: &Snapshot<()>) -> String {
    match s {
        Snapshot::String { text, .. } => text.clone(),
        Snapshot::Term {
            function, children, ..
        } => {
            let parts: Vec<String> = children.iter().map(sexpr).collect();
            format!("({function} {})", parts.join(" "))
        }
        Snapshot::User { .. } => "u".to_string(),
        Snapshot::Null => "_".to_string(),
        Snapshot::Pending => "?".to_string(),
    }
}

#[test]
fn evaluates_with_precedence() {
    let cases = [
        ("2+3*4", 14),
        ("(2+3)*4", 20),
        ("7", 7),
        ("1+2+3+4", 10),
        ("2*3*4", 24),
        ("((((5))))", 5),
        (" 12 *\t( 3 + 4 )\n", 84),
    ];
    for (src, want) in cases {
        let (out, host) = eval(src);
        assert!(out.ok, "{src:?} should parse cleanly: {:?}", host.errors.reports);
        assert!(out.is_clean());
        assert_eq!(out.root_value(), Some(&want), "{src:?}");
        assert_eq!(out.graph.pending_count(), 0);
    }
}

#[test]
fn hard_functions_run_bottom_up() {
    let (out, host) = eval("2+3*4");
    assert!(out.ok);
    assert_eq!(
        host.calls,
        vec![calc::NUMBER, calc::NUMBER, calc::NUMBER, calc::MUL, calc::ADD]
    );
    assert_eq!(out.stats.hard_calls, 5);
    assert_eq!(out.stats.deferred, 0);
}

#[test]
fn soft_flavour_keeps_the_tree() {
    let (out, host) = tree("2+3*4");
    assert!(out.ok && host.errors.is_empty());
    let root = out.root.expect("accepted parse has a root");
    assert_eq!(
        sexpr(&out.graph.snapshot(root)),
        "(1 (3 2) (2 (3 3) (3 4)))"
    );
    assert!(!out.graph.is_error(root));
}

#[test]
fn copies_are_transparent() {
    // E -> T -> F -> ( E ) are all copies; the root resolves to the number leaf term.
    let (out, _) = tree("((7))");
    let root = out.root.expect("root");
    assert_ne!(out.graph.representative(root), root);
    assert_eq!(sexpr(&out.graph.snapshot(root)), "(3 7)");
}

#[test]
fn missing_operand_recovers_on_star() {
    let (out, host) = eval("2+*4");
    assert!(out.accepted, "recovery should reach accept");
    assert!(!out.ok);
    assert_eq!(out.stats.syntax_errors, 1);
    assert_eq!(out.stats.recoveries, 1);

    let errs = &host.errors.reports;
    assert_eq!(errs.len(), 1, "{errs:?}");
    assert_eq!(errs[0].kind, ErrorKind::Syntactic);
    assert_eq!((errs[0].line, errs[0].col), (1, 3));
    assert_eq!(errs[0].pos, 2);
    assert_eq!(errs[0].message, "expected number or '(' but read '*'");

    // The stand-in term is null, so nothing above it was computed.
    assert_eq!(out.root_value(), None);
    assert!(!host.calls.contains(&calc::MUL));
    assert!(!host.calls.contains(&calc::ADD));
}

#[test]
fn recovered_tree_marks_the_gap() {
    let (out, host) = tree("2+*4");
    assert_eq!(host.errors.len(), 1);
    let root = out.root.expect("root");
    assert_eq!(sexpr(&out.graph.snapshot(root)), "(1 (3 2) (2 _ (3 4)))");
    assert!(out.graph.is_error(root), "error flag propagates to the root");
}

#[test]
fn error_at_end_of_text_is_fatal() {
    let (out, host) = eval("1+");
    assert!(!out.accepted);
    assert_eq!(out.root, None);
    assert_eq!(host.errors.len(), 1);
    assert_eq!(
        host.errors.reports[0].message,
        "expected number or '(' but read end of text"
    );
    assert_eq!(out.graph.pending_count(), 0, "leftovers are settled");
}

#[test]
fn overflow_is_a_semantic_error() {
    let (out, host) = eval("9999999999 * 9999999999");
    assert!(out.ok, "semantic errors do not fail the parse");
    assert!(!out.is_clean());
    assert_eq!(out.stats.semantic_errors, 1);
    let r = &host.errors.reports[0];
    assert_eq!(r.kind, ErrorKind::Semantic);
    assert_eq!(r.message, "overflow in multiplication");
    assert_eq!(r.col, 1);
    let root = out.root.expect("root");
    assert!(out.graph.is_error(root));
    assert_eq!(out.root_value(), None);
}

#[test]
fn erroneous_token_suppresses_its_function() {
    // '#' is garbage; the number right after it is flagged and never parsed.
    let (out, host) = eval("1 + # 2 * 3");
    assert_eq!(out.stats.lexical_errors, 1);
    assert!(!out.ok);
    assert!(out.accepted);
    assert_eq!(host.calls, vec![calc::NUMBER, calc::NUMBER]);
    assert_eq!(out.root_value(), None);
}

#[test]
fn lock_suppresses_later_hard_functions() {
    let t = calc::compiler(Flavor::Hard);
    let mut host = CalcHost::default();
    let out = Compilation::new(&t, TextSource::new("1 + # 2 * 3"), &mut host)
        .with_options(Options {
            lock_on_error: true,
            stop_on_error: false,
        })
        .parse();
    assert!(out.accepted);
    // Only the `1` was evaluated before the error was seen.
    assert_eq!(host.calls, vec![calc::NUMBER]);
    assert_eq!(out.root_value(), None);
}

#[test]
fn lock_without_error_changes_nothing() {
    let t = calc::compiler(Flavor::Hard);
    let mut host = CalcHost::default();
    let out = Compilation::new(&t, TextSource::new("6*7"), &mut host)
        .with_options(Options {
            lock_on_error: true,
            stop_on_error: false,
        })
        .parse();
    assert_eq!(out.root_value(), Some(&42));
}

#[test]
fn stop_on_error_abandons_at_the_first_syntax_error() {
    let t = calc::compiler(Flavor::Hard);
    let mut host = CalcHost::default();
    let out = Compilation::new(&t, TextSource::new("2+*4+*5"), &mut host)
        .with_options(Options {
            lock_on_error: false,
            stop_on_error: true,
        })
        .parse();
    assert!(!out.accepted);
    assert_eq!(out.root, None);
    assert_eq!(host.errors.len(), 1);
    assert_eq!(out.stats.recoveries, 0);
}

#[test]
fn host_can_stop_from_the_error_callback() {
    let t = calc::compiler(Flavor::Hard);
    let mut host = CalcHost::default();
    host.errors.stop_on_first = true;
    let out = parse(&t, TextSource::new("2+*4+*5"), &mut host);
    assert!(!out.accepted);
    assert_eq!(host.errors.len(), 1);

    // Without the stop both gaps are recovered.
    let (out, host) = eval("2+*4+*5");
    assert!(out.accepted);
    assert_eq!(host.errors.len(), 2);
    assert_eq!(out.stats.recoveries, 2);
}

#[test]
fn comments_are_transparent() {
    let (plain, _) = eval("1 + 2 * 3");
    let (commented, host) = eval("1 /* one */ + /* nested /* two */ still */ 2 * 3");
    assert!(commented.ok, "{:?}", host.errors.reports);
    assert_eq!(commented.root_value(), plain.root_value());
    assert_eq!(commented.stats.tokens, plain.stats.tokens);
}

#[test]
fn unterminated_comment_is_reported_once() {
    let (out, host) = eval("1 + 2 /* never /* closed */ ");
    assert_eq!(host.errors.len(), 1, "{:?}", host.errors.reports);
    let r = &host.errors.reports[0];
    assert_eq!(r.kind, ErrorKind::Lexical);
    assert_eq!(r.message, "unterminated comment");
    assert_eq!(r.col, 7, "reported at the comment start");
    assert!(out.accepted);
    assert!(!out.ok);
}

#[test]
fn stray_comment_end_is_a_lexical_error() {
    let (out, host) = eval("1 */ + 2");
    assert_eq!(host.errors.len(), 1);
    assert_eq!(
        host.errors.reports[0].message,
        "comment end without a matching start"
    );
    assert!(out.accepted);
    assert_eq!(out.root_value(), Some(&3));
}

#[test]
fn soft_tree_survives_the_lock() {
    let t = calc::compiler(Flavor::Soft);
    let mut host = TreeHost::default();
    let out = Compilation::new(&t, TextSource::new("2+*4"), &mut host)
        .with_options(Options {
            lock_on_error: true,
            stop_on_error: false,
        })
        .parse();
    assert!(out.accepted);
    let root = out.root.expect("root");
    assert_eq!(sexpr(&out.graph.snapshot(root)), "(1 (3 2) (2 _ (3 4)))");
}

/// Calculator host that stops the parse from inside its first hard call.
#[derive(Default)]
struct StopOnFirstCall {
    inner: CalcHost,
}

impl Host for StopOnFirstCall {
    type Value = i64;

    fn execution(
        &mut self,
        call: Call<'_, i64>,
        ctl: &mut Control,
    ) -> Result<Produced<i64>, SemanticError> {
        ctl.stop();
        self.inner.execution(call, ctl)
    }

    fn error(&mut self, report: &Report, ctl: &mut Control) {
        self.inner.error(report, ctl);
    }
}

#[test]
fn host_can_stop_from_a_hard_function() {
    let t = calc::compiler(Flavor::Hard);
    let mut host = StopOnFirstCall::default();
    let out = parse(&t, TextSource::new("1+2*3"), &mut host);
    assert!(!out.accepted);
    assert!(!out.ok);
    assert_eq!(out.root, None, "the stack is discarded");
    assert_eq!(host.inner.calls, vec![calc::NUMBER]);
    assert!(host.inner.errors.is_empty());
    assert_eq!(out.graph.pending_count(), 0);
}

/// Calculator host that places every product at a fixed position and
/// records where the operands of each addition sit.
#[derive(Default)]
struct Placing {
    inner: CalcHost,
    operand_pos: Vec<Option<Position>>,
}

const PRODUCT_POS: Position = 99;

impl Host for Placing {
    type Value = i64;

    fn execution(
        &mut self,
        call: Call<'_, i64>,
        ctl: &mut Control,
    ) -> Result<Produced<i64>, SemanticError> {
        let function = call.function;
        if function == calc::ADD {
            for i in 0..call.param_count() {
                self.operand_pos.push(call.param(i).and_then(|n| n.pos()));
            }
        }
        let produced = self.inner.execution(call, ctl)?;
        Ok(if function == calc::MUL {
            Produced::at(produced.value, PRODUCT_POS)
        } else {
            produced
        })
    }

    fn error(&mut self, report: &Report, ctl: &mut Control) {
        self.inner.error(report, ctl);
    }
}

#[test]
fn results_take_the_host_position_or_the_first_symbol() {
    let t = calc::compiler(Flavor::Hard);
    let mut host = Placing::default();
    let out = parse(&t, TextSource::new("  1 + 22 * 3"), &mut host);
    assert!(out.is_clean());
    assert_eq!(out.root_value(), Some(&67));
    // `1` keeps its token position; the product moved where the host put it.
    assert_eq!(host.operand_pos, vec![Some(2), Some(PRODUCT_POS)]);
    // The sum falls back to the position of its first symbol.
    let root = out.root.expect("root");
    assert_eq!(out.graph.resolve(root).pos(), Some(2));
}

#[test]
fn snapshot_of_a_deep_tree_needs_little_stack() {
    let n = 2000;
    let src = vec!["1"; n].join("+");
    let (out, host) = tree(&src);
    assert!(out.ok && host.errors.is_empty());
    let root = out.root.expect("root");
    let graph = &out.graph;
    let snap = std::thread::scope(|s| {
        std::thread::Builder::new()
            .stack_size(64 * 1024)
            .spawn_scoped(s, || graph.snapshot(root))
            .expect("spawn snapshot thread")
            .join()
            .expect("snapshot thread")
    });

    // Left spine: one addition per `+`, then the first number.
    let mut depth = 0;
    let mut node = &snap;
    while let Snapshot::Term {
        function, children, ..
    } = node
    {
        if *function != calc::ADD {
            break;
        }
        depth += 1;
        node = &children[0];
    }
    assert_eq!(depth, n - 1);
    assert_eq!(sexpr(node), "(3 1)");
}
