use crate::errors::{ErrorKind, N1qlError, N1qlResult};
use crate::query::{escape_identifier, select_entity, select_entity_fields, type_filter, Statement};
use crate::repository::{DerivedQuery, QueryMethod};
use crate::QueryConfig;

const PLACEHOLDER_PREFIX: &str = "#{#n1ql.";
const SELECT_ENTITY: &str = "#{#n1ql.selectEntity}";
const FIELDS: &str = "#{#n1ql.fields}";
const BUCKET: &str = "#{#n1ql.bucket}";
const FILTER: &str = "#{#n1ql.filter}";

/// Where the statement of a query method comes from.
///
/// Chosen once when the query is registered; the statement is produced at that time
/// and reused for every invocation.
///
/// # Variants
/// - `Inline`: a fixed statement text, used as written
/// - `Template`: a statement text with `#{#n1ql.*}` placeholders expanded against the
///   configured bucket and the method's entity type
/// - `Derived`: a statement derived from the method name, see [DerivedQuery]
///
/// # Template placeholders
///
/// ```text
/// #{#n1ql.selectEntity}  SELECT META(`b`).id AS _ID, META(`b`).cas AS _CAS, `b`.* FROM `b`
/// #{#n1ql.fields}        META(`b`).id AS _ID, META(`b`).cas AS _CAS, `b`.*
/// #{#n1ql.bucket}        `b`
/// #{#n1ql.filter}        `_class` = "Entity"
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatementSource {
    Inline(String),
    Template(String),
    Derived,
}

impl StatementSource {
    /// Produces the statement for `query_method`.
    ///
    /// # Errors
    ///
    /// Returns [ErrorKind::InvalidQuery] for a blank inline or template text, an
    /// unknown template placeholder, or a method name that cannot be derived.
    pub fn supply(&self, query_method: &QueryMethod, config: &QueryConfig) -> N1qlResult<Statement> {
        match self {
            StatementSource::Inline(text) => {
                let statement = Statement::new(text);
                if statement.is_empty() {
                    return Err(blank_statement(query_method));
                }
                Ok(statement)
            }
            StatementSource::Template(text) => expand_template(text, query_method, config),
            StatementSource::Derived => DerivedQuery::parse(query_method.name())?.to_statement(
                config.get_bucket_name(),
                config.get_type_key(),
                query_method.entity_information(),
            ),
        }
    }
}

fn blank_statement(query_method: &QueryMethod) -> N1qlError {
    N1qlError::new(
        &format!("Query method {} has an empty statement", query_method.name()),
        ErrorKind::InvalidQuery,
    )
}

fn expand_template(
    template: &str,
    query_method: &QueryMethod,
    config: &QueryConfig,
) -> N1qlResult<Statement> {
    // only the caller's text is checked, expanded names may contain anything
    let unexpanded = template
        .replace(SELECT_ENTITY, "")
        .replace(FIELDS, "")
        .replace(BUCKET, "")
        .replace(FILTER, "");

    if let Some(start) = unexpanded.find(PLACEHOLDER_PREFIX) {
        let placeholder = match unexpanded[start..].find('}') {
            Some(end) => &unexpanded[start..=start + end],
            None => &unexpanded[start..],
        };
        log::error!(
            "Unknown placeholder {} in statement of {}",
            placeholder,
            query_method.name()
        );
        return Err(N1qlError::new(
            &format!(
                "Unknown placeholder {} in statement of query method {}",
                placeholder,
                query_method.name()
            ),
            ErrorKind::InvalidQuery,
        ));
    }

    let bucket = config.get_bucket_name();
    let entity = query_method.entity_information();
    let expanded = template
        .replace(SELECT_ENTITY, &select_entity(bucket, false))
        .replace(FIELDS, &select_entity_fields(bucket))
        .replace(BUCKET, &escape_identifier(bucket))
        .replace(FILTER, &type_filter(config.get_type_key(), entity.type_name()));

    let statement = Statement::new(&expanded);
    if statement.is_empty() {
        return Err(blank_statement(query_method));
    }
    Ok(statement)
}
