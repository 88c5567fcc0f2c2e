use std::fmt::{Display, Formatter};

use crate::repository::{EntityInformation, N1qlEntity};

/// The result shape a query method declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnKind {
    /// A single entity, or nothing
    Entity,
    /// Every matching entity, in row order
    Collection,
    /// A lazily consumed, single-pass sequence of entities
    Stream,
    /// A page of entities with total count (not supported yet)
    Page,
    /// A window of entities with a has-next flag (not supported yet)
    Slice,
}

impl Display for ReturnKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ReturnKind::Entity => write!(f, "entity"),
            ReturnKind::Collection => write!(f, "collection"),
            ReturnKind::Stream => write!(f, "stream"),
            ReturnKind::Page => write!(f, "page"),
            ReturnKind::Slice => write!(f, "slice"),
        }
    }
}

/// Describes one declared repository query method.
///
/// Immutable once built; the adapter only reads it.
///
/// # Examples
///
/// ```rust,ignore
/// let method = QueryMethod::for_entity::<Airline>("findByCountry", ReturnKind::Collection);
/// assert!(method.is_collection_query());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryMethod {
    name: String,
    entity_information: EntityInformation,
    return_kind: ReturnKind,
    modifying: bool,
}

impl QueryMethod {
    pub fn new(name: &str, entity_information: EntityInformation, return_kind: ReturnKind) -> Self {
        QueryMethod {
            name: name.to_string(),
            entity_information,
            return_kind,
            modifying: false,
        }
    }

    /// Describes a method returning entities of type `T`.
    pub fn for_entity<T: N1qlEntity>(name: &str, return_kind: ReturnKind) -> Self {
        QueryMethod::new(name, EntityInformation::of::<T>(), return_kind)
    }

    /// Marks the method as a modifying (write) query.
    pub fn modifying(mut self, modifying: bool) -> Self {
        self.modifying = modifying;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn entity_information(&self) -> &EntityInformation {
        &self.entity_information
    }

    pub fn return_kind(&self) -> ReturnKind {
        self.return_kind
    }

    pub fn is_collection_query(&self) -> bool {
        self.return_kind == ReturnKind::Collection
    }

    pub fn is_query_for_entity(&self) -> bool {
        self.return_kind == ReturnKind::Entity
    }

    pub fn is_stream_query(&self) -> bool {
        self.return_kind == ReturnKind::Stream
    }

    pub fn is_page_query(&self) -> bool {
        self.return_kind == ReturnKind::Page
    }

    pub fn is_slice_query(&self) -> bool {
        self.return_kind == ReturnKind::Slice
    }

    pub fn is_modifying_query(&self) -> bool {
        self.modifying
    }
}

impl Display for QueryMethod {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}#{} -> {}",
            self.entity_information, self.name, self.return_kind
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn method(kind: ReturnKind) -> QueryMethod {
        QueryMethod::new("findByName", EntityInformation::new("User"), kind)
    }

    #[test]
    fn test_flags_follow_return_kind() {
        let collection = method(ReturnKind::Collection);
        assert!(collection.is_collection_query());
        assert!(!collection.is_query_for_entity());
        assert!(!collection.is_stream_query());

        assert!(method(ReturnKind::Entity).is_query_for_entity());
        assert!(method(ReturnKind::Stream).is_stream_query());
        assert!(method(ReturnKind::Page).is_page_query());
        assert!(method(ReturnKind::Slice).is_slice_query());
    }

    #[test]
    fn test_modifying_flag() {
        let m = method(ReturnKind::Collection);
        assert!(!m.is_modifying_query());
        assert!(m.modifying(true).is_modifying_query());
    }

    #[test]
    fn test_accessors_and_display() {
        let m = method(ReturnKind::Stream);
        assert_eq!(m.name(), "findByName");
        assert_eq!(m.entity_information().type_name(), "User");
        assert_eq!(m.return_kind(), ReturnKind::Stream);
        assert_eq!(m.to_string(), "User#findByName -> stream");
    }
}
