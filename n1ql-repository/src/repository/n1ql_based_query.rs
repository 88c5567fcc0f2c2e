use std::marker::PhantomData;
use std::sync::Arc;

use uuid::Uuid;

use crate::errors::{ErrorKind, N1qlError, N1qlResult};
use crate::query::{try_build_query, N1qlQuery, QueryArgument, QueryParams, Statement};
use crate::repository::{
    EntityStream, N1qlEntity, N1qlOperations, QueryMethod, QueryResult, RepositoryQuery,
    StatementSource,
};
use crate::QueryConfig;

/// Runs one declared repository query method as a N1QL query.
///
/// The adapter is built once per query method. Every call to
/// [N1qlBasedQuery::execute] classifies the call-time arguments, assembles a fresh
/// [N1qlQuery], runs it through the [N1qlOperations] port and shapes the decoded
/// entities the way the [QueryMethod] declares.
///
/// Cloning is cheap; all clones share the same method, statement and port.
///
/// # Examples
///
/// ```rust,ignore
/// use n1ql_repository::repository::{N1qlBasedQuery, QueryMethod, ReturnKind, StatementSource};
/// use n1ql_repository::query::QueryArgument;
///
/// let method = QueryMethod::for_entity::<Airline>("findByCountry", ReturnKind::Collection);
/// let query = N1qlBasedQuery::<Airline, _>::new(method, StatementSource::Derived, operations, config)?;
///
/// let airlines = query.execute(&[QueryArgument::bind("France")])?.into_collection()?;
/// ```
pub struct N1qlBasedQuery<T, O> {
    inner: Arc<N1qlBasedQueryInner<O>>,
    _phantom: PhantomData<fn() -> T>,
}

impl<T, O> Clone for N1qlBasedQuery<T, O> {
    fn clone(&self) -> Self {
        N1qlBasedQuery {
            inner: self.inner.clone(),
            _phantom: PhantomData,
        }
    }
}

struct N1qlBasedQueryInner<O> {
    query_method: QueryMethod,
    statement: Statement,
    operations: Arc<O>,
    config: QueryConfig,
}

impl<T, O> N1qlBasedQuery<T, O>
where
    T: N1qlEntity,
    O: N1qlOperations,
{
    /// Registers `query_method`, producing its statement from `source`.
    ///
    /// # Errors
    ///
    /// Returns [ErrorKind::InvalidConfiguration] for an unusable `config` and
    /// [ErrorKind::InvalidQuery] when no statement can be produced.
    pub fn new(
        query_method: QueryMethod,
        source: StatementSource,
        operations: Arc<O>,
        config: QueryConfig,
    ) -> N1qlResult<Self> {
        config.validate()?;
        let statement = source.supply(&query_method, &config)?;
        log::debug!("Registered {} with statement {}", query_method, statement);

        Ok(N1qlBasedQuery {
            inner: Arc::new(N1qlBasedQueryInner {
                query_method,
                statement,
                operations,
                config,
            }),
            _phantom: PhantomData,
        })
    }

    /// Runs the query method with the given call-time arguments.
    ///
    /// # Errors
    ///
    /// - [ErrorKind::UnsupportedOperation] for page, slice and modifying query methods;
    ///   the port is not called.
    /// - [ErrorKind::InvalidArgument] for a repeated options or plan argument when the
    ///   configuration rejects duplicates.
    /// - Any error of the [N1qlOperations] port, unchanged.
    pub fn execute(&self, arguments: &[QueryArgument]) -> N1qlResult<QueryResult<T>> {
        self.ensure_supported()?;
        let query = self.build_query(arguments)?;
        self.execute_depending_on_type(&query)
    }

    /// Assembles the request for one invocation.
    ///
    /// Configured default options fill in when the arguments carry none, and a random
    /// client context id is added when the configuration asks for one.
    pub fn build_query(&self, arguments: &[QueryArgument]) -> N1qlResult<N1qlQuery> {
        let query = try_build_query(
            &self.inner.statement,
            arguments,
            self.inner.config.get_duplicate_policy(),
        )?;
        Ok(self.apply_config(query))
    }

    fn apply_config(&self, query: N1qlQuery) -> N1qlQuery {
        let config = &self.inner.config;
        let generate_id = config.is_generate_context_id();
        if query.params().is_some() && !generate_id {
            return query;
        }

        let mut params = query
            .params()
            .cloned()
            .or_else(|| config.get_default_params().cloned());

        if generate_id {
            let with_id = match params {
                Some(p) if p.has_client_context_id() => p,
                Some(p) => p.client_context_id(&Uuid::new_v4().to_string()),
                None => QueryParams::new().client_context_id(&Uuid::new_v4().to_string()),
            };
            params = Some(with_id);
        }

        query.with_params(params)
    }

    /// Runs `query` and shapes the entities according to the query method.
    ///
    /// - page, slice or modifying: fails with [ErrorKind::UnsupportedOperation]
    ///   without running the query
    /// - collection: all entities in row order
    /// - entity: the first entity, `None` when there is none
    /// - anything else: a single-pass [EntityStream] over the entities
    pub fn execute_depending_on_type(&self, query: &N1qlQuery) -> N1qlResult<QueryResult<T>> {
        self.ensure_supported()?;

        let query_method = &self.inner.query_method;
        if query_method.is_collection_query() {
            Ok(QueryResult::Collection(self.execute_collection(query)?))
        } else if query_method.is_query_for_entity() {
            Ok(QueryResult::Entity(self.execute_entity(query)?))
        } else {
            Ok(QueryResult::Stream(self.execute_stream(query)?))
        }
    }

    fn ensure_supported(&self) -> N1qlResult<()> {
        let query_method = &self.inner.query_method;
        if query_method.is_page_query()
            || query_method.is_slice_query()
            || query_method.is_modifying_query()
        {
            return Err(N1qlError::new(
                "Slice, page and modifying queries not yet supported",
                ErrorKind::UnsupportedOperation,
            ));
        }
        Ok(())
    }

    fn execute_collection(&self, query: &N1qlQuery) -> N1qlResult<Vec<T>> {
        let query_method = &self.inner.query_method;
        log::debug!(
            "Executing {} query for {}: {}",
            query.mode(),
            query_method,
            query
        );
        self.inner
            .operations
            .find_by_n1ql::<T>(query, query_method.entity_information())
    }

    fn execute_entity(&self, query: &N1qlQuery) -> N1qlResult<Option<T>> {
        Ok(self.execute_collection(query)?.into_iter().next())
    }

    fn execute_stream(&self, query: &N1qlQuery) -> N1qlResult<EntityStream<T>> {
        Ok(EntityStream::new(self.execute_collection(query)?))
    }

    pub fn query_method(&self) -> &QueryMethod {
        &self.inner.query_method
    }

    pub fn statement(&self) -> &Statement {
        &self.inner.statement
    }

    pub fn config(&self) -> &QueryConfig {
        &self.inner.config
    }
}

impl<T, O> RepositoryQuery for N1qlBasedQuery<T, O>
where
    T: N1qlEntity,
    O: N1qlOperations,
{
    type Output = QueryResult<T>;

    fn execute(&self, arguments: &[QueryArgument]) -> N1qlResult<Self::Output> {
        N1qlBasedQuery::execute(self, arguments)
    }

    fn query_method(&self) -> &QueryMethod {
        N1qlBasedQuery::query_method(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{atomic, field_value, Atomic, Convertible, ReadExecutor, Value, WriteExecutor};
    use crate::doc;
    use crate::query::{DuplicatePolicy, QueryMode, QueryPlan, ScanConsistency};
    use crate::repository::{EntityInformation, ReturnKind};

    #[derive(Debug, Default, Clone, PartialEq)]
    struct Hotel {
        name: String,
    }

    impl Convertible for Hotel {
        type Output = Hotel;

        fn to_value(&self) -> N1qlResult<Value> {
            Ok(doc! { "name": self.name.clone() })
        }

        fn from_value(value: &Value) -> N1qlResult<Self::Output> {
            Ok(Hotel {
                name: field_value(value, "name")?,
            })
        }
    }

    impl N1qlEntity for Hotel {
        fn entity_name(&self) -> String {
            "Hotel".to_string()
        }
    }

    struct StubOperations {
        rows: Vec<Value>,
        failure: Option<N1qlError>,
        calls: Atomic<Vec<N1qlQuery>>,
    }

    impl StubOperations {
        fn returning(rows: Vec<Value>) -> Arc<Self> {
            Arc::new(StubOperations {
                rows,
                failure: None,
                calls: atomic(Vec::new()),
            })
        }

        fn failing(error: N1qlError) -> Arc<Self> {
            Arc::new(StubOperations {
                rows: Vec::new(),
                failure: Some(error),
                calls: atomic(Vec::new()),
            })
        }

        fn call_count(&self) -> usize {
            self.calls.read_with(|calls| calls.len())
        }

        fn last_query(&self) -> Option<N1qlQuery> {
            self.calls.read_with(|calls| calls.last().cloned())
        }
    }

    impl N1qlOperations for StubOperations {
        fn find_by_n1ql<T: N1qlEntity>(
            &self,
            query: &N1qlQuery,
            entity_information: &EntityInformation,
        ) -> N1qlResult<Vec<T>> {
            assert_eq!(entity_information.type_name(), "Hotel");
            self.calls.write_with(|calls| calls.push(query.clone()));
            if let Some(error) = &self.failure {
                return Err(error.clone());
            }
            self.rows.iter().map(T::from_value).collect()
        }
    }

    fn hotels() -> Vec<Value> {
        vec![doc! { "name": "Ritz" }, doc! { "name": "Savoy" }]
    }

    fn adapter(
        kind: ReturnKind,
        operations: Arc<StubOperations>,
        config: QueryConfig,
    ) -> N1qlBasedQuery<Hotel, StubOperations> {
        let method = QueryMethod::for_entity::<Hotel>("findByCity", kind);
        N1qlBasedQuery::new(method, StatementSource::Derived, operations, config).unwrap()
    }

    #[test]
    fn test_collection_returns_all_rows_in_order() {
        let operations = StubOperations::returning(hotels());
        let query = adapter(ReturnKind::Collection, operations.clone(), QueryConfig::new());

        let result = query.execute(&[QueryArgument::bind("London")]).unwrap();
        let names = result
            .into_collection()
            .unwrap()
            .into_iter()
            .map(|h| h.name)
            .collect::<Vec<_>>();

        assert_eq!(names, vec!["Ritz", "Savoy"]);
        assert_eq!(operations.call_count(), 1);
        let sent = operations.last_query().unwrap();
        assert_eq!(sent.mode(), QueryMode::Parameterized);
        assert_eq!(sent.args(), &[Value::from("London")]);
    }

    #[test]
    fn test_collection_with_no_rows_is_empty_not_absent() {
        let query = adapter(
            ReturnKind::Collection,
            StubOperations::returning(vec![]),
            QueryConfig::new(),
        );
        let result = query.execute(&[QueryArgument::bind("Nowhere")]).unwrap();
        assert!(result.into_collection().unwrap().is_empty());
    }

    #[test]
    fn test_entity_returns_first_row() {
        let query = adapter(
            ReturnKind::Entity,
            StubOperations::returning(hotels()),
            QueryConfig::new(),
        );
        let result = query.execute(&[QueryArgument::bind("London")]).unwrap();
        assert_eq!(
            result.into_entity().unwrap(),
            Some(Hotel {
                name: "Ritz".to_string()
            })
        );
    }

    #[test]
    fn test_entity_without_rows_is_none() {
        let query = adapter(
            ReturnKind::Entity,
            StubOperations::returning(vec![]),
            QueryConfig::new(),
        );
        let result = query.execute(&[QueryArgument::bind("London")]).unwrap();
        assert_eq!(result.into_entity().unwrap(), None);
    }

    #[test]
    fn test_stream_matches_collection_and_is_single_pass() {
        let query = adapter(
            ReturnKind::Stream,
            StubOperations::returning(hotels()),
            QueryConfig::new(),
        );
        let mut stream = query
            .execute(&[QueryArgument::bind("London")])
            .unwrap()
            .into_stream()
            .unwrap();

        let names = stream.by_ref().map(|h| h.name).collect::<Vec<_>>();
        assert_eq!(names, vec!["Ritz", "Savoy"]);
        assert!(stream.next().is_none());
    }

    #[test]
    fn test_unsupported_shapes_fail_before_execution() {
        for (kind, modifying) in [
            (ReturnKind::Page, false),
            (ReturnKind::Slice, false),
            (ReturnKind::Collection, true),
        ] {
            let operations = StubOperations::returning(hotels());
            let method = QueryMethod::for_entity::<Hotel>("findByCity", kind).modifying(modifying);
            let query: N1qlBasedQuery<Hotel, _> = N1qlBasedQuery::new(
                method,
                StatementSource::Derived,
                operations.clone(),
                QueryConfig::new(),
            )
            .unwrap();

            let err = query.execute(&[QueryArgument::bind("London")]).unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::UnsupportedOperation);
            assert_eq!(operations.call_count(), 0);

            let built = query.build_query(&[]).unwrap();
            let err = query.execute_depending_on_type(&built).unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::UnsupportedOperation);
            assert_eq!(operations.call_count(), 0);
        }
    }

    #[test]
    fn test_port_errors_propagate_unchanged() {
        let failure = N1qlError::new("index not ready", ErrorKind::QueryExecutionError);
        let query = adapter(
            ReturnKind::Collection,
            StubOperations::failing(failure),
            QueryConfig::new(),
        );
        let err = query.execute(&[]).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::QueryExecutionError);
        assert_eq!(err.message(), "index not ready");
        assert!(err.cause().is_none());
    }

    #[test]
    fn test_decode_errors_propagate() {
        let query = adapter(
            ReturnKind::Collection,
            StubOperations::returning(vec![doc! { "name": 5 }]),
            QueryConfig::new(),
        );
        let err = query.execute(&[]).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::ObjectMappingError);
    }

    #[test]
    fn test_default_params_apply_only_without_options_argument() {
        let defaults = QueryParams::new().consistency(ScanConsistency::RequestPlus);
        let config = QueryConfig::new().default_params(defaults.clone());
        let query = adapter(ReturnKind::Collection, StubOperations::returning(vec![]), config);

        let built = query.build_query(&[QueryArgument::bind("x")]).unwrap();
        assert_eq!(built.params(), Some(&defaults));

        let own = QueryParams::new().consistency(ScanConsistency::NotBounded);
        let built = query
            .build_query(&[QueryArgument::bind("x"), own.clone().into()])
            .unwrap();
        assert_eq!(built.params(), Some(&own));
    }

    #[test]
    fn test_generated_context_id() {
        let config = QueryConfig::new().generate_context_id(true);
        let query = adapter(ReturnKind::Collection, StubOperations::returning(vec![]), config);

        let built = query.build_query(&[]).unwrap();
        let id = built
            .params()
            .and_then(|p| p.get_client_context_id())
            .unwrap()
            .to_string();
        assert_eq!(id.len(), 36);

        let own = QueryParams::new().client_context_id("mine");
        let built = query.build_query(&[own.into()]).unwrap();
        assert_eq!(
            built.params().and_then(|p| p.get_client_context_id()),
            Some("mine")
        );
    }

    #[test]
    fn test_reject_policy_is_applied() {
        let config = QueryConfig::new().duplicate_policy(DuplicatePolicy::Reject);
        let operations = StubOperations::returning(vec![]);
        let query = adapter(ReturnKind::Collection, operations.clone(), config);

        let err = query
            .execute(&[QueryPlan::new("a").into(), QueryPlan::new("b").into()])
            .unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::InvalidArgument);
        assert_eq!(operations.call_count(), 0);
    }

    #[test]
    fn test_invalid_registration() {
        let method = QueryMethod::for_entity::<Hotel>("purgeEverything", ReturnKind::Collection);
        let result: N1qlResult<N1qlBasedQuery<Hotel, StubOperations>> = N1qlBasedQuery::new(
            method.clone(),
            StatementSource::Derived,
            StubOperations::returning(vec![]),
            QueryConfig::new(),
        );
        assert_eq!(result.err().map(|e| e.kind().clone()), Some(ErrorKind::InvalidQuery));

        let result: N1qlResult<N1qlBasedQuery<Hotel, StubOperations>> = N1qlBasedQuery::new(
            method,
            StatementSource::Inline("SELECT 1".to_string()),
            StubOperations::returning(vec![]),
            QueryConfig::new().bucket_name(""),
        );
        assert_eq!(
            result.err().map(|e| e.kind().clone()),
            Some(ErrorKind::InvalidConfiguration)
        );
    }

    #[test]
    fn test_accessors_and_repository_query_trait() {
        let query = adapter(
            ReturnKind::Entity,
            StubOperations::returning(hotels()),
            QueryConfig::new().bucket_name("hotels"),
        );
        assert_eq!(query.query_method().name(), "findByCity");
        assert!(query.statement().text().contains("FROM `hotels`"));
        assert_eq!(query.config().get_bucket_name(), "hotels");

        let dispatched: Box<dyn RepositoryQuery<Output = QueryResult<Hotel>>> =
            Box::new(query.clone());
        assert_eq!(dispatched.query_method().name(), "findByCity");
        let hotel = dispatched
            .execute(&[QueryArgument::bind("London")])
            .unwrap()
            .into_entity()
            .unwrap();
        assert!(hotel.is_some());
    }
}
