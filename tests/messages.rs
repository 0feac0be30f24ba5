//! Message templates, `^N` substitution and host-side localization.

use ccrun::{
    Call, Control, Host, Produced, Report, SemanticError, TextSource,
    demo::calc::{self, Flavor},
    messages::{self, Catalog},
    parse,
};

#[test]
fn substitution() {
    assert_eq!(messages::substitute("a ^0 b ^1", &["x", "y"]), "a x b y");
    assert_eq!(messages::substitute("^1^0", &["x", "y"]), "yx");
    assert_eq!(messages::substitute("missing ^3", &["x"]), "missing ^3");
    assert_eq!(messages::substitute("caret ^ alone", &[]), "caret ^ alone");
    assert_eq!(messages::substitute("^10", &["a"; 11]), "a");
}

#[test]
fn defaults_and_unknown_keys() {
    assert_eq!(
        messages::render(messages::SYNTAX_EXPECTED, &["a", "b"]),
        "expected a but read b"
    );
    assert_eq!(messages::render("custom.key", &[]), "custom.key");
    assert_eq!(messages::render("custom.key", &["1", "2"]), "custom.key: 1, 2");
}

#[test]
fn catalog_overrides_fall_back_to_defaults() {
    let catalog = Catalog::from_json(br#"{"syntax.or": " ou "}"#).expect("catalog");
    assert_eq!(catalog.render(messages::SYNTAX_OR, &[]), " ou ");
    assert_eq!(
        catalog.render(messages::LEX_UNTERMINATED_COMMENT, &[]),
        "unterminated comment"
    );
}

/// Calculator host that reports in French and evaluates nothing.
struct French {
    catalog: Catalog,
    reports: Vec<Report>,
}

impl Host for French {
    type Value = ();

    fn execution(
        &mut self,
        _call: Call<'_, ()>,
        _ctl: &mut Control,
    ) -> Result<Produced<()>, SemanticError> {
        Ok(Produced::new(()))
    }

    fn error(&mut self, report: &Report, _ctl: &mut Control) {
        self.reports.push(report.clone());
    }

    fn map(&self, key: &str, subs: &[&str]) -> String {
        self.catalog.render(key, subs)
    }
}

#[test]
fn host_localizes_reports() {
    let mut catalog = Catalog::default();
    catalog.insert(messages::SYNTAX_EXPECTED, "^0 attendu, ^1 lu");
    catalog.insert(messages::SYNTAX_OR, " ou ");
    catalog.insert(messages::SYNTAX_END_OF_TEXT, "fin de texte");
    let mut host = French {
        catalog,
        reports: Vec::new(),
    };
    let t = calc::compiler(Flavor::Hard);
    let _ = parse(&t, TextSource::new("2+*4+"), &mut host);
    let texts: Vec<&str> = host.reports.iter().map(|r| r.message.as_str()).collect();
    assert_eq!(
        texts,
        vec![
            "number ou '(' attendu, '*' lu",
            "number ou '(' attendu, fin de texte lu"
        ]
    );
}
