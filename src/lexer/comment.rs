// src/lexer/comment.rs
use super::{Lexer, scan};
use crate::{
    host::{Origin, Source},
    messages::{self, Message},
    tables::{COMMENT_CLASS_BEGIN, COMMENT_CLASS_END, COMMENT_CLASS_EOF, Recognized},
};

impl<S: Source> Lexer<'_, S> {
    /// Skips a (possibly nested) comment whose start marker was just
    /// consumed. Characters the comment automaton does not match are skipped
    /// one at a time.
    pub(super) fn skip_comment(&mut self, start: Origin) {
        let mut nesting = 1usize;
        loop {
            if self.cursor.at_end() {
                self.diagnose(start, Message::new(messages::LEX_UNTERMINATED_COMMENT));
                return;
            }
            let m = scan::longest_match(
                &self.compiler.comments,
                &mut self.comment_scratch,
                &mut self.cursor,
                &mut self.source,
                0,
            );
            let Some(m) = m.filter(|m| m.len > 0) else {
                self.cursor.consume(&mut self.source, 1);
                continue;
            };
            self.cursor.consume(&mut self.source, m.len);
            match m.recognized {
                Recognized::Token(COMMENT_CLASS_BEGIN) => nesting += 1,
                Recognized::Token(COMMENT_CLASS_END) => {
                    nesting -= 1;
                    if nesting == 0 {
                        log::trace!("comment from {}:{} closed", start.line, start.col);
                        return;
                    }
                }
                Recognized::Token(COMMENT_CLASS_EOF) => {
                    self.diagnose(start, Message::new(messages::LEX_UNTERMINATED_COMMENT));
                    return;
                }
                _ => {}
            }
        }
    }
}
