use std::iter::FusedIterator;

use crate::errors::{ErrorKind, N1qlError, N1qlResult};
use crate::repository::ReturnKind;

/// The shaped outcome of one repository query invocation.
#[derive(Debug)]
pub enum QueryResult<T> {
    /// The first decoded entity, `None` when no row matched
    Entity(Option<T>),
    /// All decoded entities in row order
    Collection(Vec<T>),
    /// A single-pass sequence over the decoded entities
    Stream(EntityStream<T>),
}

impl<T> QueryResult<T> {
    pub fn return_kind(&self) -> ReturnKind {
        match self {
            QueryResult::Entity(_) => ReturnKind::Entity,
            QueryResult::Collection(_) => ReturnKind::Collection,
            QueryResult::Stream(_) => ReturnKind::Stream,
        }
    }

    pub fn into_entity(self) -> N1qlResult<Option<T>> {
        match self {
            QueryResult::Entity(entity) => Ok(entity),
            other => Err(shape_mismatch(ReturnKind::Entity, other.return_kind())),
        }
    }

    pub fn into_collection(self) -> N1qlResult<Vec<T>> {
        match self {
            QueryResult::Collection(entities) => Ok(entities),
            other => Err(shape_mismatch(ReturnKind::Collection, other.return_kind())),
        }
    }

    pub fn into_stream(self) -> N1qlResult<EntityStream<T>> {
        match self {
            QueryResult::Stream(stream) => Ok(stream),
            other => Err(shape_mismatch(ReturnKind::Stream, other.return_kind())),
        }
    }
}

fn shape_mismatch(requested: ReturnKind, actual: ReturnKind) -> N1qlError {
    N1qlError::new(
        &format!("Query result shape is {}, expected {}", actual, requested),
        ErrorKind::InvalidOperation,
    )
}

/// A lazily consumed sequence of decoded entities.
///
/// Yields the entities in row order exactly once; once exhausted it stays exhausted
/// and cannot be restarted.
#[derive(Debug)]
pub struct EntityStream<T> {
    entities: std::vec::IntoIter<T>,
}

impl<T> EntityStream<T> {
    pub(crate) fn new(entities: Vec<T>) -> Self {
        EntityStream {
            entities: entities.into_iter(),
        }
    }

    /// Number of entities not yet consumed.
    pub fn remaining(&self) -> usize {
        self.entities.len()
    }
}

impl<T> Iterator for EntityStream<T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        self.entities.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.entities.size_hint()
    }
}

impl<T> ExactSizeIterator for EntityStream<T> {}

impl<T> FusedIterator for EntityStream<T> {}
