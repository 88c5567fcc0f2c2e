use std::fmt::{Display, Formatter};

/// Specifies the direction for sorting query results.
///
/// # Variants
/// - `Ascending`: smallest to largest (A to Z, 0 to 9)
/// - `Descending`: largest to smallest (Z to A, 9 to 0)
///
/// # Usage
/// Produced by the `OrderBy` clause of a derived query method name:
/// ```text
/// findByCountryOrderByNameDesc  ->  ... ORDER BY `name` DESC
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl SortOrder {
    pub fn n1ql(&self) -> &'static str {
        match self {
            SortOrder::Ascending => "ASC",
            SortOrder::Descending => "DESC",
        }
    }
}

impl Display for SortOrder {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.n1ql())
    }
}
