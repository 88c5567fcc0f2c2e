use std::fmt::{Display, Formatter};

use crate::common::Convertible;

/// Row field holding the document key, selected by generated statements.
pub const ID_FIELD: &str = "_ID";

/// Row field holding the document CAS value, selected by generated statements.
pub const CAS_FIELD: &str = "_CAS";

/// A type that repository queries decode rows into.
///
/// # Purpose
/// Names the entity type stored in the bucket. Generated statements restrict their
/// results to documents whose type key equals [N1qlEntity::entity_name], and each
/// returned row is decoded through [Convertible::from_value].
///
/// # Usage
/// ```ignore
/// #[derive(Default)]
/// pub struct Airline {
///     id: String,
///     name: String,
/// }
///
/// impl N1qlEntity for Airline {
///     fn entity_name(&self) -> String {
///         "Airline".to_string()
///     }
/// }
/// ```
pub trait N1qlEntity: Convertible<Output = Self> + Default {
    /// Returns the entity type name as stored under the type key.
    fn entity_name(&self) -> String;
}

/// Runtime description of the entity type a query method returns.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntityInformation {
    type_name: String,
}

impl EntityInformation {
    pub fn new(type_name: &str) -> Self {
        EntityInformation {
            type_name: type_name.to_string(),
        }
    }

    /// Describes the entity type `T`.
    pub fn of<T: N1qlEntity>() -> Self {
        EntityInformation {
            type_name: T::default().entity_name(),
        }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }
}

impl Display for EntityInformation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.type_name)
    }
}
