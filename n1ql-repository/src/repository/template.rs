use crate::common::Value;
use crate::errors::{ErrorKind, N1qlError, N1qlResult};
use crate::query::N1qlQuery;
use crate::repository::{EntityInformation, N1qlEntity, N1qlOperations, CAS_FIELD, ID_FIELD};

/// The raw transport to the query service.
///
/// Receives the JSON request body of a [N1qlQuery] and returns the rows and errors the
/// service answered with. Transport failures are returned as errors.
pub trait QueryExecutor: Send + Sync {
    fn query(&self, request: &Value) -> N1qlResult<QueryResponse>;
}

/// What the query service answered for one request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResponse {
    rows: Vec<Value>,
    errors: Vec<Value>,
}

impl QueryResponse {
    pub fn new(rows: Vec<Value>) -> Self {
        QueryResponse {
            rows,
            errors: Vec::new(),
        }
    }

    pub fn failed(errors: Vec<Value>) -> Self {
        QueryResponse {
            rows: Vec::new(),
            errors,
        }
    }

    pub fn rows(&self) -> &[Value] {
        &self.rows
    }

    pub fn errors(&self) -> &[Value] {
        &self.errors
    }

    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}

/// [N1qlOperations] over a [QueryExecutor].
///
/// Sends the request body, fails on any reported error and decodes each row into the
/// entity. Rows must carry the document id and CAS under `_ID` and `_CAS`, which the
/// generated `SELECT` clauses provide.
pub struct N1qlTemplate<E> {
    executor: E,
}

impl<E: QueryExecutor> N1qlTemplate<E> {
    pub fn new(executor: E) -> Self {
        N1qlTemplate { executor }
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }
}

impl<E: QueryExecutor> N1qlOperations for N1qlTemplate<E> {
    fn find_by_n1ql<T: N1qlEntity>(
        &self,
        query: &N1qlQuery,
        entity_information: &EntityInformation,
    ) -> N1qlResult<Vec<T>> {
        let request = query.request_body();
        log::trace!("Sending N1QL request {}", request.to_json()?);

        let response = self.executor.query(&request)?;
        if !response.is_success() {
            let errors = Value::Array(response.errors().to_vec()).to_json()?;
            log::error!("N1QL request failed: {}", errors);
            return Err(N1qlError::new(
                &format!(
                    "Unable to execute query due to the following n1ql errors: {}",
                    errors
                ),
                ErrorKind::QueryExecutionError,
            ));
        }

        response
            .rows()
            .iter()
            .map(|row| decode_row(row, entity_information))
            .collect()
    }
}

fn decode_row<T: N1qlEntity>(row: &Value, entity_information: &EntityInformation) -> N1qlResult<T> {
    if row.get(ID_FIELD).is_none() || row.get(CAS_FIELD).is_none() {
        return Err(N1qlError::new(
            "Unable to retrieve enough metadata for N1QL to entity mapping, have you selected _ID and _CAS?",
            ErrorKind::QueryExecutionError,
        ));
    }

    T::from_value(row).map_err(|err| {
        N1qlError::new_with_cause(
            &format!("Unable to decode row into {}", entity_information),
            ErrorKind::ObjectMappingError,
            err,
        )
    })
}
