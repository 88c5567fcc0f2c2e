use std::fmt::{Display, Formatter};

use crate::repository::{CAS_FIELD, ID_FIELD};

/// The N1QL text bound to one repository query method.
///
/// A `Statement` is produced once per query method and never changes afterwards.
/// Positional placeholders (`$1`, `$2`, ...) in the text are filled from the bind
/// values of each invocation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Statement {
    text: String,
}

impl Statement {
    pub fn new(text: &str) -> Self {
        Statement {
            text: text.trim().to_string(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

impl Display for Statement {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.text)
    }
}

impl From<&str> for Statement {
    fn from(text: &str) -> Self {
        Statement::new(text)
    }
}

impl From<String> for Statement {
    fn from(text: String) -> Self {
        Statement::new(&text)
    }
}

/// Quotes an identifier with backticks, doubling any backtick inside it.
pub fn escape_identifier(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

/// Quotes a string literal with double quotes.
pub fn quote_literal(text: &str) -> String {
    format!("\"{}\"", text.replace('\\', "\\\\").replace('"', "\\\""))
}

/// The projection used for entity queries: document key, CAS and the document body.
///
/// ```text
/// META(`travel`).id AS _ID, META(`travel`).cas AS _CAS, `travel`.*
/// ```
pub fn select_entity_fields(bucket: &str) -> String {
    let bucket = escape_identifier(bucket);
    format!(
        "META({b}).id AS {id}, META({b}).cas AS {cas}, {b}.*",
        b = bucket,
        id = ID_FIELD,
        cas = CAS_FIELD
    )
}

/// `SELECT <entity fields> FROM <bucket>`, optionally `SELECT DISTINCT`.
pub fn select_entity(bucket: &str, distinct: bool) -> String {
    format!(
        "SELECT {}{} FROM {}",
        if distinct { "DISTINCT " } else { "" },
        select_entity_fields(bucket),
        escape_identifier(bucket)
    )
}

/// The predicate restricting a query to documents of one entity type.
pub fn type_filter(type_key: &str, type_name: &str) -> String {
    format!("{} = {}", escape_identifier(type_key), quote_literal(type_name))
}
