//! Lexer on its own: longest match, priority between equal-length matches,
//! followed-by guards, garbage runs and line/column tracking.

use ccrun::{
    Source, TextSource,
    demo::{calc, follow},
    host::{EOT_LEGACY, ErrorKind, Position, Read},
    lexer::{Lexer, Token},
    messages, parse,
};

fn lex(t: &ccrun::Compiler, src: &str) -> (Vec<Token>, Vec<ccrun::lexer::Diagnostic>) {
    Lexer::new(t, TextSource::new(src)).tokens()
}

fn ids(tokens: &[Token]) -> Vec<u32> {
    tokens.iter().map(|t| t.id).collect()
}

#[test]
fn longest_match_wins() {
    let t = calc::compiler(calc::Flavor::Hard);
    let (tokens, diags) = lex(&t, "123+4");
    assert!(diags.is_empty());
    assert_eq!(ids(&tokens), vec![calc::NUM, calc::PLUS, calc::NUM]);
    assert_eq!(tokens[0].text.as_deref(), Some("123"));
    assert_eq!(tokens[1].text, None, "operators carry no value");
    assert_eq!(tokens[2].origin.pos, 4);
}

#[test]
fn followed_by_guards_the_keyword() {
    let t = follow::compiler();

    let (tokens, _) = lex(&t, "if(");
    assert_eq!(ids(&tokens), vec![follow::IF, follow::LPAREN]);

    let (tokens, _) = lex(&t, "if x");
    assert_eq!(ids(&tokens), vec![follow::IDENT, follow::IDENT]);
    assert_eq!(tokens[0].text.as_deref(), Some("if"));

    // The guard only looks; it never extends the token.
    let (tokens, _) = lex(&t, "if (");
    assert_eq!(ids(&tokens), vec![follow::IDENT, follow::LPAREN]);

    // Longer identifier beats the guarded keyword.
    let (tokens, _) = lex(&t, "iffy(");
    assert_eq!(ids(&tokens), vec![follow::IDENT, follow::LPAREN]);
    assert_eq!(tokens[0].text.as_deref(), Some("iffy"));
}

#[test]
fn followed_by_at_end_of_text() {
    let t = follow::compiler();
    let (tokens, diags) = lex(&t, "if");
    assert!(diags.is_empty());
    assert_eq!(ids(&tokens), vec![follow::IDENT]);
}

#[test]
fn garbage_run_is_reported_once() {
    let t = calc::compiler(calc::Flavor::Hard);
    let (tokens, diags) = lex(&t, "1 + #$% 2");
    assert_eq!(diags.len(), 1, "{diags:?}");
    assert_eq!(diags[0].message.key, messages::LEX_UNEXPECTED_CHAR);
    assert_eq!(diags[0].message.args, vec!["'#'".to_string()]);
    assert_eq!(diags[0].origin.col, 5);

    assert_eq!(ids(&tokens), vec![calc::NUM, calc::PLUS, calc::NUM]);
    assert!(!tokens[1].error);
    assert!(tokens[2].error, "first token after garbage is flagged");
}

#[test]
fn separate_garbage_runs_each_report() {
    let t = calc::compiler(calc::Flavor::Hard);
    let (_, diags) = lex(&t, "#1#");
    assert_eq!(diags.len(), 2);
}

#[test]
fn lines_and_columns_follow_cr_lf_and_crlf() {
    let t = calc::compiler(calc::Flavor::Hard);
    let (tokens, _) = lex(&t, "1\r\n+\r2\n*3");
    let at: Vec<(u32, u32)> = tokens.iter().map(|t| (t.origin.line, t.origin.col)).collect();
    assert_eq!(at, vec![(1, 1), (2, 1), (3, 1), (4, 1), (4, 2)]);
    // Positions count every consumed character.
    assert_eq!(tokens[1].origin.pos, 3);
}

#[test]
fn positions_advance_by_character_width() {
    let t = calc::compiler(calc::Flavor::Hard);
    // 'é' is two bytes in UTF-8 and unknown to the lexer.
    let (tokens, diags) = lex(&t, "é1");
    assert_eq!(diags.len(), 1);
    assert_eq!(tokens[0].origin.pos, 2);
    assert_eq!(tokens[0].origin.col, 2);
}

#[test]
fn end_of_text_repeats() {
    let t = calc::compiler(calc::Flavor::Hard);
    let mut lx = Lexer::new(&t, TextSource::new("7"));
    assert_eq!(lx.next_token().id, calc::NUM);
    assert!(lx.next_token().is_end());
    assert!(lx.next_token().is_end());
    assert_eq!(lx.token_count(), 1);
}

#[test]
fn comments_vanish_from_the_stream() {
    let t = calc::compiler(calc::Flavor::Hard);
    let (tokens, diags) = lex(&t, "/* a */1/* b /* c */ d */+/**/2");
    assert!(diags.is_empty(), "{diags:?}");
    assert_eq!(ids(&tokens), vec![calc::NUM, calc::PLUS, calc::NUM]);
}

/// Ends its text with the legacy NUL code instead of `EOT`.
struct NulTerminated<'a>(TextSource<'a>);

impl Source for NulTerminated<'_> {
    fn read(&mut self) -> Read {
        match self.0.read() {
            Read::END => Read {
                code: EOT_LEGACY,
                width: 0,
            },
            r => r,
        }
    }

    fn pos(&self) -> Position {
        self.0.pos()
    }

    fn set_pos(&mut self, pos: Position) {
        self.0.set_pos(pos)
    }
}

#[test]
fn legacy_end_of_text_ends_the_stream() {
    let t = calc::compiler(calc::Flavor::Hard);
    let mut lx = Lexer::new(&t, NulTerminated(TextSource::new("12 + 3")));
    assert_eq!(lx.next_token().id, calc::NUM);
    assert_eq!(lx.next_token().id, calc::PLUS);
    assert_eq!(lx.next_token().id, calc::NUM);
    assert!(lx.next_token().is_end());
    assert!(lx.next_token().is_end());
    assert!(lx.take_diagnostics().is_empty());
}

#[test]
fn legacy_end_of_text_inside_a_comment() {
    let t = calc::compiler(calc::Flavor::Hard);
    let (tokens, diags) = Lexer::new(&t, NulTerminated(TextSource::new("1 /* open"))).tokens();
    assert_eq!(ids(&tokens), vec![calc::NUM]);
    assert_eq!(diags.len(), 1, "{diags:?}");
    assert_eq!(diags[0].message.key, messages::LEX_UNTERMINATED_COMMENT);

    let mut host = calc::CalcHost::default();
    let out = parse(&t, NulTerminated(TextSource::new("2+3*4 /* open")), &mut host);
    assert!(out.accepted);
    assert_eq!(out.root_value(), Some(&14));
    assert_eq!(host.errors.len(), 1, "{:?}", host.errors.reports);
    let r = &host.errors.reports[0];
    assert_eq!(r.kind, ErrorKind::Lexical);
    assert_eq!(r.message, "unterminated comment");
    assert_eq!(r.col, 7);
}
