//! Statement splitting.
//!
//! A splitter turns raw editor text into an ordered list of statements. The
//! executor only needs each statement's text and first token; it does not
//! validate syntax.

use std::iter::Peekable;
use std::str::CharIndices;

/// One statement produced by a splitter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedStatement {
    /// First token outside comments; `None` for comment-only statements
    pub first_token: Option<String>,
    /// Statement text without the terminating `;`, trimmed
    pub statement: String,
}

impl ParsedStatement {
    /// Create a new parsed statement.
    pub fn new(first_token: Option<&str>, statement: impl Into<String>) -> Self {
        Self {
            first_token: first_token.map(str::to_string),
            statement: statement.into(),
        }
    }
}

/// Splits statement text into individual statements, preserving source order.
pub trait StatementSplitter: Send + Sync {
    /// Split `text` into statements.
    fn split(&self, text: &str) -> Vec<ParsedStatement>;
}

/// Splitter for SQL-like dialects.
///
/// Splits on `;` outside of `'...'`, `"..."` and `` `...` `` quotes and outside
/// of `--` and `/* */` comments. Blank segments are skipped; segments holding
/// only comments are kept with no first token.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlStatementSplitter;

impl StatementSplitter for SqlStatementSplitter {
    fn split(&self, text: &str) -> Vec<ParsedStatement> {
        let mut statements = Vec::new();
        let mut start = 0;
        let mut first_token: Option<(usize, usize)> = None;
        let mut chars = text.char_indices().peekable();

        while let Some((i, c)) = chars.next() {
            match c {
                ';' => {
                    push_segment(&mut statements, text, start, i, first_token.take());
                    start = i + 1;
                }
                '-' if next_is(&mut chars, '-') => skip_line_comment(&mut chars),
                '/' if next_is(&mut chars, '*') => skip_block_comment(&mut chars),
                '\'' | '"' | '`' => {
                    if first_token.is_none() {
                        first_token = Some((i, i + 1));
                    }
                    skip_quoted(&mut chars, c);
                }
                c if c.is_whitespace() => {}
                c if is_word_char(c) => {
                    let mut end = i + c.len_utf8();
                    while let Some(&(j, next)) = chars.peek() {
                        if !is_word_char(next) {
                            break;
                        }
                        end = j + next.len_utf8();
                        chars.next();
                    }
                    if first_token.is_none() {
                        first_token = Some((i, end));
                    }
                }
                c => {
                    if first_token.is_none() {
                        first_token = Some((i, i + c.len_utf8()));
                    }
                }
            }
        }
        push_segment(&mut statements, text, start, text.len(), first_token);

        statements
    }
}

fn push_segment(
    statements: &mut Vec<ParsedStatement>,
    text: &str,
    start: usize,
    end: usize,
    first_token: Option<(usize, usize)>,
) {
    let statement = text[start..end].trim();
    if statement.is_empty() {
        return;
    }
    statements.push(ParsedStatement {
        first_token: first_token.map(|(from, to)| text[from..to].to_string()),
        statement: statement.to_string(),
    });
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Consume the next char if it is `expected`.
fn next_is(chars: &mut Peekable<CharIndices<'_>>, expected: char) -> bool {
    if matches!(chars.peek(), Some(&(_, c)) if c == expected) {
        chars.next();
        true
    } else {
        false
    }
}

fn skip_line_comment(chars: &mut Peekable<CharIndices<'_>>) {
    for (_, c) in chars.by_ref() {
        if c == '\n' {
            break;
        }
    }
}

fn skip_block_comment(chars: &mut Peekable<CharIndices<'_>>) {
    while let Some((_, c)) = chars.next() {
        if c == '*' && next_is(chars, '/') {
            break;
        }
    }
}

/// Skip to the closing `quote`, honoring backslash escapes and doubled quotes.
fn skip_quoted(chars: &mut Peekable<CharIndices<'_>>, quote: char) {
    while let Some((_, c)) = chars.next() {
        if c == '\\' {
            chars.next();
        } else if c == quote && !next_is(chars, quote) {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split(text: &str) -> Vec<ParsedStatement> {
        SqlStatementSplitter.split(text)
    }

    #[test]
    fn test_split_multiple_statements() {
        let statements = split("USE foo; SELECT 1; USE bar; SELECT 2;");
        assert_eq!(
            statements,
            vec![
                ParsedStatement::new(Some("USE"), "USE foo"),
                ParsedStatement::new(Some("SELECT"), "SELECT 1"),
                ParsedStatement::new(Some("USE"), "USE bar"),
                ParsedStatement::new(Some("SELECT"), "SELECT 2"),
            ]
        );
    }

    #[test]
    fn test_split_without_trailing_semicolon() {
        let statements = split("select *\nfrom t");
        assert_eq!(
            statements,
            vec![ParsedStatement::new(Some("select"), "select *\nfrom t")]
        );
    }

    #[test]
    fn test_split_skips_blank_segments() {
        assert!(split("").is_empty());
        assert!(split(" ;\n ; ").is_empty());
        assert_eq!(split("SELECT 1;;").len(), 1);
    }

    #[test]
    fn test_split_trailing_comment_has_no_first_token() {
        let statements = split("SELECT 1;\n-- done");
        assert_eq!(statements.len(), 2);
        assert_eq!(statements[1], ParsedStatement::new(None, "-- done"));

        let statements = split("/* only a comment */");
        assert_eq!(statements, vec![ParsedStatement::new(None, "/* only a comment */")]);
    }

    #[test]
    fn test_split_ignores_semicolons_in_quotes() {
        let statements = split("SELECT 'a;b', \"c;d\", `e;f` FROM t; SELECT 2");
        assert_eq!(statements.len(), 2);
        assert_eq!(statements[0].statement, "SELECT 'a;b', \"c;d\", `e;f` FROM t");
    }

    #[test]
    fn test_split_handles_escaped_quotes() {
        let statements = split("SELECT 'it''s; fine', 'a\\';b'; SELECT 2");
        assert_eq!(statements.len(), 2);
        assert_eq!(statements[1].statement, "SELECT 2");
    }

    #[test]
    fn test_split_ignores_semicolons_in_comments() {
        let statements = split("-- note; here\nSELECT 1 /* a; b */; SELECT 2");
        assert_eq!(statements.len(), 2);
        assert_eq!(statements[0].first_token.as_deref(), Some("SELECT"));
        assert_eq!(statements[0].statement, "-- note; here\nSELECT 1 /* a; b */");
    }

    #[test]
    fn test_split_first_token_for_non_word_start() {
        let statements = split("(SELECT 1)");
        assert_eq!(statements[0].first_token.as_deref(), Some("("));
    }
}
