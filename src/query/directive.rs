//! Local context-switch directives.
//!
//! Some statements change the context subsequent statements run in instead of
//! being sent to the backend. They are recognised by their first token.

/// Statement kinds handled by the executor itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
    /// `USE <database>`
    Use,
}

impl Directive {
    /// Classify a statement by its first token (case-insensitive).
    pub fn classify(first_token: &str) -> Option<Self> {
        if first_token.eq_ignore_ascii_case("use") {
            Some(Directive::Use)
        } else {
            None
        }
    }

    /// Extract the directive's argument from the full statement text.
    ///
    /// For `USE` this is the database name: the first word after the keyword,
    /// or the quoted text if the name is wrapped in backticks or double quotes.
    /// Returns `None` when no argument can be found.
    pub fn argument(&self, statement: &str) -> Option<String> {
        match self {
            Directive::Use => use_database(statement),
        }
    }
}

fn use_database(statement: &str) -> Option<String> {
    let rest = statement.trim_start();
    let keyword = rest.get(..3)?;
    if !keyword.eq_ignore_ascii_case("use") {
        return None;
    }

    let rest = &rest[3..];
    // Require whitespace between the keyword and the name, so "USEFOO" is not "USE FOO"
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }

    let name = rest.split(';').next().unwrap_or_default().trim();
    let name = match name.chars().next() {
        Some(quote @ ('`' | '"')) => name[1..].split(quote).next().unwrap_or_default(),
        _ => name.split_whitespace().next().unwrap_or_default(),
    };
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}
