use std::fmt::Write;
use std::sync::LazyLock;

use itertools::Itertools;
use regex::Regex;

use crate::common::SortOrder;
use crate::errors::{ErrorKind, N1qlError, N1qlResult};
use crate::query::{escape_identifier, select_entity, type_filter, Statement};
use crate::repository::EntityInformation;

static SUBJECT_PATTERN: LazyLock<Result<Regex, regex::Error>> = LazyLock::new(|| {
    Regex::new(
        r"^(?:find|read|get|query|search|stream)(Distinct)?(?:(?:First|Top)(\d*))?(?:\p{Lu}\w*?)??(?:By(.*))?$",
    )
});

const ORDER_BY: &str = "OrderBy";

/// The comparison a single predicate part performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartType {
    Equals,
    NotEquals,
    GreaterThan,
    GreaterThanEqual,
    LessThan,
    LessThanEqual,
    Between,
    Like,
    NotLike,
    StartingWith,
    EndingWith,
    Containing,
    In,
    NotIn,
    IsNull,
    IsNotNull,
    True,
    False,
}

impl PartType {
    /// Number of bind values this part consumes.
    pub fn arity(&self) -> usize {
        match self {
            PartType::Between => 2,
            PartType::IsNull | PartType::IsNotNull | PartType::True | PartType::False => 0,
            _ => 1,
        }
    }
}

// Longer keywords must come before their suffixes.
const KEYWORDS: &[(&str, PartType)] = &[
    ("IsNotNull", PartType::IsNotNull),
    ("NotNull", PartType::IsNotNull),
    ("IsNull", PartType::IsNull),
    ("Null", PartType::IsNull),
    ("IsTrue", PartType::True),
    ("True", PartType::True),
    ("IsFalse", PartType::False),
    ("False", PartType::False),
    ("IsGreaterThanEqual", PartType::GreaterThanEqual),
    ("GreaterThanEqual", PartType::GreaterThanEqual),
    ("IsGreaterThan", PartType::GreaterThan),
    ("GreaterThan", PartType::GreaterThan),
    ("IsLessThanEqual", PartType::LessThanEqual),
    ("LessThanEqual", PartType::LessThanEqual),
    ("IsLessThan", PartType::LessThan),
    ("LessThan", PartType::LessThan),
    ("IsAfter", PartType::GreaterThan),
    ("After", PartType::GreaterThan),
    ("IsBefore", PartType::LessThan),
    ("Before", PartType::LessThan),
    ("IsBetween", PartType::Between),
    ("Between", PartType::Between),
    ("IsNotLike", PartType::NotLike),
    ("NotLike", PartType::NotLike),
    ("IsLike", PartType::Like),
    ("Like", PartType::Like),
    ("IsStartingWith", PartType::StartingWith),
    ("StartingWith", PartType::StartingWith),
    ("StartsWith", PartType::StartingWith),
    ("IsEndingWith", PartType::EndingWith),
    ("EndingWith", PartType::EndingWith),
    ("EndsWith", PartType::EndingWith),
    ("IsContaining", PartType::Containing),
    ("Containing", PartType::Containing),
    ("Contains", PartType::Containing),
    ("IsNotIn", PartType::NotIn),
    ("NotIn", PartType::NotIn),
    ("IsIn", PartType::In),
    ("In", PartType::In),
    ("IsNot", PartType::NotEquals),
    ("Not", PartType::NotEquals),
    ("Equals", PartType::Equals),
    ("Is", PartType::Equals),
];

/// One `<Property><Keyword>` element of a derived method name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Part {
    path: Vec<String>,
    part_type: PartType,
}

impl Part {
    fn parse(source: &str, method_name: &str) -> N1qlResult<Part> {
        let (property, part_type) = KEYWORDS
            .iter()
            .find(|(keyword, _)| source.len() > keyword.len() && source.ends_with(keyword))
            .map(|(keyword, part_type)| (&source[..source.len() - keyword.len()], *part_type))
            .unwrap_or((source, PartType::Equals));

        Ok(Part {
            path: property_path(property, method_name)?,
            part_type,
        })
    }

    pub fn part_type(&self) -> PartType {
        self.part_type
    }

    /// The dotted document path this part compares, e.g. `address.city`.
    pub fn property(&self) -> String {
        self.path.join(".")
    }

    fn field(&self) -> String {
        self.path.iter().map(|segment| escape_identifier(segment)).join(".")
    }

    fn render(&self, next_placeholder: &mut usize) -> String {
        let field = self.field();
        let mut placeholder = || {
            *next_placeholder += 1;
            format!("${}", *next_placeholder)
        };

        match self.part_type {
            PartType::Equals => format!("{} = {}", field, placeholder()),
            PartType::NotEquals => format!("{} != {}", field, placeholder()),
            PartType::GreaterThan => format!("{} > {}", field, placeholder()),
            PartType::GreaterThanEqual => format!("{} >= {}", field, placeholder()),
            PartType::LessThan => format!("{} < {}", field, placeholder()),
            PartType::LessThanEqual => format!("{} <= {}", field, placeholder()),
            PartType::Between => {
                let low = placeholder();
                let high = placeholder();
                format!("{} BETWEEN {} AND {}", field, low, high)
            }
            PartType::Like => format!("{} LIKE {}", field, placeholder()),
            PartType::NotLike => format!("{} NOT LIKE {}", field, placeholder()),
            PartType::StartingWith => format!("{} LIKE {} || \"%\"", field, placeholder()),
            PartType::EndingWith => format!("{} LIKE \"%\" || {}", field, placeholder()),
            PartType::Containing => {
                format!("{} LIKE \"%\" || {} || \"%\"", field, placeholder())
            }
            PartType::In => format!("{} IN {}", field, placeholder()),
            PartType::NotIn => format!("{} NOT IN {}", field, placeholder()),
            PartType::IsNull => format!("{} IS NULL", field),
            PartType::IsNotNull => format!("{} IS NOT NULL", field),
            PartType::True => format!("{} = TRUE", field),
            PartType::False => format!("{} = FALSE", field),
        }
    }
}

/// One `ORDER BY` term of a derived method name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    path: Vec<String>,
    direction: SortOrder,
}

impl Order {
    pub fn property(&self) -> String {
        self.path.join(".")
    }

    pub fn direction(&self) -> SortOrder {
        self.direction
    }
}

/// A query parsed from a repository method name.
///
/// The grammar is
/// `<find|read|get|query|search|stream>[Distinct][First<N>|Top<N>][Subject][By<predicate>][OrderBy<order>]`
/// where the predicate is a list of `Or` separated branches of `And` separated parts.
///
/// # Examples
///
/// ```text
/// findByLastnameAndAgeGreaterThan
///   WHERE `_class` = "User" AND `lastname` = $1 AND `age` > $2
/// findTop3ByActiveTrueOrderByAgeDesc
///   WHERE `_class` = "User" AND `active` = TRUE ORDER BY `age` DESC LIMIT 3
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedQuery {
    distinct: bool,
    limit: Option<u32>,
    branches: Vec<Vec<Part>>,
    orders: Vec<Order>,
}

impl DerivedQuery {
    /// Parses a method name.
    ///
    /// # Errors
    ///
    /// Returns [ErrorKind::InvalidQuery] when the name does not follow the grammar.
    pub fn parse(method_name: &str) -> N1qlResult<DerivedQuery> {
        let (head, order_source) = split_order_by(method_name);

        let pattern = SUBJECT_PATTERN.as_ref().map_err(|e| {
            N1qlError::new(
                &format!("Derived query pattern failed to compile: {}", e),
                ErrorKind::InternalError,
            )
        })?;

        let captures = pattern
            .captures(head)
            .ok_or_else(|| invalid(method_name, "unknown query prefix"))?;

        let distinct = captures.get(1).is_some();
        let limit = match captures.get(2) {
            Some(digits) if digits.as_str().is_empty() => Some(1),
            Some(digits) => {
                let limit: u32 = digits.as_str().parse()?;
                if limit == 0 {
                    return Err(invalid(method_name, "result limit must be positive"));
                }
                Some(limit)
            }
            None => None,
        };

        let branches = match captures.get(3) {
            Some(predicate) => parse_predicate(predicate.as_str(), method_name)?,
            None => Vec::new(),
        };

        let orders = match order_source {
            Some(source) => parse_orders(source, method_name)?,
            None => Vec::new(),
        };

        Ok(DerivedQuery {
            distinct,
            limit,
            branches,
            orders,
        })
    }

    pub fn is_distinct(&self) -> bool {
        self.distinct
    }

    pub fn limit(&self) -> Option<u32> {
        self.limit
    }

    pub fn branches(&self) -> &[Vec<Part>] {
        &self.branches
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    /// Number of positional bind values the statement expects.
    pub fn parameter_count(&self) -> usize {
        self.branches
            .iter()
            .flatten()
            .map(|part| part.part_type.arity())
            .sum()
    }

    /// Renders the statement selecting `entity` documents from `bucket`.
    pub fn to_statement(
        &self,
        bucket: &str,
        type_key: &str,
        entity: &EntityInformation,
    ) -> N1qlResult<Statement> {
        let mut text = select_entity(bucket, self.distinct);
        write!(text, " WHERE {}", type_filter(type_key, entity.type_name()))?;

        let mut next_placeholder = 0;
        let rendered = self
            .branches
            .iter()
            .map(|branch| {
                branch
                    .iter()
                    .map(|part| part.render(&mut next_placeholder))
                    .join(" AND ")
            })
            .collect::<Vec<_>>();

        match rendered.len() {
            0 => {}
            1 => write!(text, " AND {}", rendered[0])?,
            _ => write!(
                text,
                " AND ({})",
                rendered.iter().map(|branch| format!("({})", branch)).join(" OR ")
            )?,
        }

        if !self.orders.is_empty() {
            let terms = self
                .orders
                .iter()
                .map(|order| {
                    let field = order.path.iter().map(|s| escape_identifier(s)).join(".");
                    format!("{} {}", field, order.direction.n1ql())
                })
                .join(", ");
            write!(text, " ORDER BY {}", terms)?;
        }

        if let Some(limit) = self.limit {
            write!(text, " LIMIT {}", limit)?;
        }

        Ok(Statement::new(&text))
    }
}

fn invalid(method_name: &str, reason: &str) -> N1qlError {
    N1qlError::new(
        &format!("Cannot derive a query from method {}: {}", method_name, reason),
        ErrorKind::InvalidQuery,
    )
}

/// Splits `name` at the first `OrderBy` that is followed by an upper-case letter.
fn split_order_by(name: &str) -> (&str, Option<&str>) {
    let mut search = 0;
    while let Some(offset) = name[search..].find(ORDER_BY) {
        let at = search + offset;
        let after = at + ORDER_BY.len();
        if name[after..].starts_with(char::is_uppercase) {
            return (&name[..at], Some(&name[after..]));
        }
        search = at + 1;
    }
    (name, None)
}

/// Splits `source` on `keyword` wherever it starts a new capitalised word and has
/// something on its left.
fn split_keyword<'a>(source: &'a str, keyword: &str) -> Vec<&'a str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut search = 0;

    while let Some(offset) = source[search..].find(keyword) {
        let at = search + offset;
        let after = at + keyword.len();
        if at > start && source[after..].starts_with(char::is_uppercase) {
            parts.push(&source[start..at]);
            start = after;
            search = after;
        } else {
            search = at + 1;
        }
    }

    parts.push(&source[start..]);
    parts
}

fn parse_predicate(source: &str, method_name: &str) -> N1qlResult<Vec<Vec<Part>>> {
    if source.is_empty() {
        return Err(invalid(method_name, "missing criteria after By"));
    }

    split_keyword(source, "Or")
        .into_iter()
        .map(|branch| {
            split_keyword(branch, "And")
                .into_iter()
                .map(|part| Part::parse(part, method_name))
                .collect::<N1qlResult<Vec<_>>>()
        })
        .collect()
}

fn parse_orders(source: &str, method_name: &str) -> N1qlResult<Vec<Order>> {
    let mut orders = Vec::new();
    let mut start = 0;
    let mut index = 0;

    while index < source.len() {
        let rest = &source[index..];
        let direction = [("Desc", SortOrder::Descending), ("Asc", SortOrder::Ascending)]
            .into_iter()
            .find(|(keyword, _)| {
                index > start
                    && rest.starts_with(keyword)
                    && rest[keyword.len()..]
                        .chars()
                        .next()
                        .is_none_or(char::is_uppercase)
            });

        match direction {
            Some((keyword, direction)) => {
                orders.push(Order {
                    path: property_path(&source[start..index], method_name)?,
                    direction,
                });
                index += keyword.len();
                start = index;
            }
            None => index += rest.chars().next().map_or(1, char::len_utf8),
        }
    }

    if start < source.len() {
        orders.push(Order {
            path: property_path(&source[start..], method_name)?,
            direction: SortOrder::Ascending,
        });
    }

    if orders.is_empty() {
        return Err(invalid(method_name, "missing property after OrderBy"));
    }
    Ok(orders)
}

/// `AddressCity` -> `["addressCity"]`, `Address_City` -> `["address", "city"]`.
fn property_path(property: &str, method_name: &str) -> N1qlResult<Vec<String>> {
    if property.is_empty() {
        return Err(invalid(method_name, "empty property name"));
    }

    property
        .split('_')
        .map(|segment| {
            let mut chars = segment.chars();
            match chars.next() {
                Some(first) if first.is_alphabetic() => {
                    Ok(first.to_lowercase().chain(chars).collect::<String>())
                }
                _ => Err(invalid(
                    method_name,
                    &format!("invalid property name {}", property),
                )),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SELECT: &str = "SELECT META(`b`).id AS _ID, META(`b`).cas AS _CAS, `b`.* FROM `b`";

    fn statement(method_name: &str) -> String {
        DerivedQuery::parse(method_name)
            .unwrap()
            .to_statement("b", "_class", &EntityInformation::new("User"))
            .unwrap()
            .text()
            .to_string()
    }

    #[test]
    fn test_simple_equality() {
        assert_eq!(
            statement("findByName"),
            format!("{} WHERE `_class` = \"User\" AND `name` = $1", SELECT)
        );
    }

    #[test]
    fn test_find_all_without_criteria() {
        let query = DerivedQuery::parse("findAll").unwrap();
        assert!(query.branches().is_empty());
        assert_eq!(query.parameter_count(), 0);
        assert_eq!(
            statement("findAll"),
            format!("{} WHERE `_class` = \"User\"", SELECT)
        );
    }

    #[test]
    fn test_and_parts_use_sequential_placeholders() {
        assert_eq!(
            statement("findByLastnameAndAgeGreaterThan"),
            format!(
                "{} WHERE `_class` = \"User\" AND `lastname` = $1 AND `age` > $2",
                SELECT
            )
        );
    }

    #[test]
    fn test_or_branches_are_grouped() {
        assert_eq!(
            statement("findByNameAndAgeOrEmailIsNull"),
            format!(
                "{} WHERE `_class` = \"User\" AND ((`name` = $1 AND `age` = $2) OR (`email` IS NULL))",
                SELECT
            )
        );
    }

    #[test]
    fn test_keywords_inside_property_names_do_not_split() {
        let query = DerivedQuery::parse("findByOriginAndBrand").unwrap();
        assert_eq!(query.branches().len(), 1);
        let properties = query.branches()[0]
            .iter()
            .map(|part| part.property())
            .collect::<Vec<_>>();
        assert_eq!(properties, vec!["origin", "brand"]);

        let query = DerivedQuery::parse("findByOrderNumber").unwrap();
        assert_eq!(query.branches()[0][0].property(), "orderNumber");
        assert!(query.orders().is_empty());
    }

    #[test]
    fn test_operator_keywords() {
        let cases = [
            ("findByAgeGreaterThanEqual", "`age` >= $1"),
            ("findByAgeLessThan", "`age` < $1"),
            ("findByAgeIsLessThanEqual", "`age` <= $1"),
            ("findByCreatedAfter", "`created` > $1"),
            ("findByCreatedBefore", "`created` < $1"),
            ("findByAgeBetween", "`age` BETWEEN $1 AND $2"),
            ("findByNameLike", "`name` LIKE $1"),
            ("findByNameNotLike", "`name` NOT LIKE $1"),
            ("findByNameStartingWith", "`name` LIKE $1 || \"%\""),
            ("findByNameEndingWith", "`name` LIKE \"%\" || $1"),
            ("findByNameContaining", "`name` LIKE \"%\" || $1 || \"%\""),
            ("findByNameIn", "`name` IN $1"),
            ("findByNameNotIn", "`name` NOT IN $1"),
            ("findByNameIsNot", "`name` != $1"),
            ("findByNameNot", "`name` != $1"),
            ("findByNameEquals", "`name` = $1"),
            ("findByNameIs", "`name` = $1"),
            ("findByEmailIsNotNull", "`email` IS NOT NULL"),
            ("findByEmailNull", "`email` IS NULL"),
            ("findByActiveTrue", "`active` = TRUE"),
            ("findByActiveIsFalse", "`active` = FALSE"),
        ];

        for (method_name, expected) in cases {
            assert_eq!(
                statement(method_name),
                format!("{} WHERE `_class` = \"User\" AND {}", SELECT, expected),
                "{}",
                method_name
            );
        }
    }

    #[test]
    fn test_parameter_count() {
        assert_eq!(
            DerivedQuery::parse("findByAgeBetweenAndNameAndActiveTrue")
                .unwrap()
                .parameter_count(),
            3
        );
    }

    #[test]
    fn test_nested_property_path() {
        assert_eq!(
            statement("findByAddress_City"),
            format!("{} WHERE `_class` = \"User\" AND `address`.`city` = $1", SELECT)
        );
    }

    #[test]
    fn test_order_by() {
        assert_eq!(
            statement("findByCountryOrderByLastnameAscAgeDesc"),
            format!(
                "{} WHERE `_class` = \"User\" AND `country` = $1 ORDER BY `lastname` ASC, `age` DESC",
                SELECT
            )
        );
        assert_eq!(
            statement("findAllOrderByName"),
            format!("{} WHERE `_class` = \"User\" ORDER BY `name` ASC", SELECT)
        );
    }

    #[test]
    fn test_order_by_property_starting_with_direction_keyword() {
        let query = DerivedQuery::parse("findAllOrderByDescriptionDesc").unwrap();
        assert_eq!(query.orders().len(), 1);
        assert_eq!(query.orders()[0].property(), "description");
        assert_eq!(query.orders()[0].direction(), SortOrder::Descending);
    }

    #[test]
    fn test_top_and_first_limits() {
        assert_eq!(DerivedQuery::parse("findTop3ByAge").unwrap().limit(), Some(3));
        assert_eq!(DerivedQuery::parse("findFirstByAge").unwrap().limit(), Some(1));
        assert_eq!(DerivedQuery::parse("findTopByAge").unwrap().limit(), Some(1));
        assert_eq!(DerivedQuery::parse("findByAge").unwrap().limit(), None);
        assert_eq!(
            statement("findTop3ByActiveTrueOrderByAgeDesc"),
            format!(
                "{} WHERE `_class` = \"User\" AND `active` = TRUE ORDER BY `age` DESC LIMIT 3",
                SELECT
            )
        );
    }

    #[test]
    fn test_distinct_and_subject() {
        let query = DerivedQuery::parse("findDistinctUsersByName").unwrap();
        assert!(query.is_distinct());
        assert!(statement("findDistinctUsersByName").starts_with("SELECT DISTINCT "));
        assert_eq!(query.branches()[0][0].property(), "name");
    }

    #[test]
    fn test_other_prefixes() {
        for prefix in ["read", "get", "query", "search", "stream"] {
            let query = DerivedQuery::parse(&format!("{}ByName", prefix)).unwrap();
            assert_eq!(query.parameter_count(), 1, "{}", prefix);
        }
    }

    #[test]
    fn test_invalid_names() {
        for method_name in ["deleteByName", "countByName", "findBy", "findByName_", "findBy_Name"] {
            let err = DerivedQuery::parse(method_name).unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::InvalidQuery, "{}", method_name);
        }
    }

    #[test]
    fn test_zero_limit_is_invalid() {
        let err = DerivedQuery::parse("findTop0ByName").unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::InvalidQuery);
    }
}
