use n1ql_repository::common::{
    atomic, field_value, Atomic, Convertible, ReadExecutor, Value, WriteExecutor,
};
use n1ql_repository::doc;
use n1ql_repository::errors::{ErrorKind, N1qlError, N1qlResult};
use n1ql_repository::query::N1qlQuery;
use n1ql_repository::repository::{
    EntityInformation, N1qlBasedQuery, N1qlEntity, N1qlOperations, QueryExecutor, QueryMethod,
    QueryResponse, ReturnKind, StatementSource, CAS_FIELD, ID_FIELD,
};
use n1ql_repository::QueryConfig;
use std::backtrace::Backtrace;
use std::sync::Arc;
use std::time::Instant;

/// Runs a test between a `before` and an `after` step.
///
/// `after` runs even when the test fails. Failures and panics are reported with the
/// elapsed time and a backtrace, then fail the calling test.
pub fn run_test<T, B, A>(before: B, test: T, after: A)
where
    T: Fn(TestContext) -> N1qlResult<()> + std::panic::UnwindSafe + std::panic::RefUnwindSafe,
    B: Fn() -> N1qlResult<TestContext> + std::panic::UnwindSafe + std::panic::RefUnwindSafe,
    A: Fn(TestContext) -> N1qlResult<()> + std::panic::UnwindSafe + std::panic::RefUnwindSafe,
{
    let start_time = Instant::now();

    let result = std::panic::catch_unwind(|| {
        let backtrace = Backtrace::capture();
        match before() {
            Ok(ctx) => match test(ctx.clone()) {
                Ok(_) => after(ctx).map_err(|e| {
                    (format!("After run failed: {:?}", e), backtrace.to_string())
                }),
                Err(e) => {
                    let _ = after(ctx);
                    Err((format!("Test failed: {:?}", e), backtrace.to_string()))
                }
            },
            Err(e) => Err((format!("Before run failed: {:?}", e), backtrace.to_string())),
        }
    });

    let elapsed = start_time.elapsed();
    let (error, backtrace) = match result {
        Ok(Ok(_)) => return,
        Ok(Err((e, bt))) => (e, bt),
        Err(panic_err) => {
            let err_msg = if let Some(s) = panic_err.downcast_ref::<&str>() {
                s.to_string()
            } else if let Some(s) = panic_err.downcast_ref::<String>() {
                s.clone()
            } else {
                "Unknown panic".to_string()
            };
            (
                format!("Panic: {}", err_msg),
                Backtrace::capture().to_string(),
            )
        }
    };

    eprintln!("\n==================== TEST FAILED ====================");
    eprintln!("Failed after {:?}", elapsed);
    eprintln!("Error: {}", error);
    if !backtrace.is_empty() && !backtrace.contains("disabled") {
        eprintln!("\nBacktrace:\n{}", backtrace);
    }
    eprintln!("=====================================================\n");

    panic!("Test failed. Error: {}", error);
}

/// The state shared by one test run: a recording operations port and the query
/// configuration, pointing at a bucket unique to the run.
#[derive(Clone)]
pub struct TestContext {
    operations: Arc<RecordingOperations>,
    config: QueryConfig,
}

impl TestContext {
    pub fn new(operations: Arc<RecordingOperations>, config: QueryConfig) -> Self {
        Self { operations, config }
    }

    pub fn operations(&self) -> Arc<RecordingOperations> {
        self.operations.clone()
    }

    pub fn config(&self) -> QueryConfig {
        self.config.clone()
    }

    pub fn bucket(&self) -> &str {
        self.config.get_bucket_name()
    }

    /// Registers a query method on the recording port with this context's configuration.
    pub fn query<T: N1qlEntity>(
        &self,
        method_name: &str,
        return_kind: ReturnKind,
        source: StatementSource,
    ) -> N1qlResult<N1qlBasedQuery<T, RecordingOperations>> {
        let method = QueryMethod::for_entity::<T>(method_name, return_kind);
        N1qlBasedQuery::new(method, source, self.operations(), self.config())
    }
}

pub fn random_bucket_name() -> String {
    format!("bucket-{}", uuid::Uuid::new_v4())
}

pub fn create_test_context() -> N1qlResult<TestContext> {
    create_test_context_with(QueryConfig::new())
}

pub fn create_test_context_with(config: QueryConfig) -> N1qlResult<TestContext> {
    let config = config.bucket_name(&random_bucket_name());
    config.validate()?;
    Ok(TestContext::new(Arc::new(RecordingOperations::new()), config))
}

pub fn cleanup(ctx: TestContext) -> N1qlResult<()> {
    ctx.operations().reset();
    Ok(())
}

/// An in-memory [N1qlOperations] port.
///
/// Answers every request with the configured rows (or the configured failure) and
/// records each request it receives.
pub struct RecordingOperations {
    rows: Atomic<Vec<Value>>,
    failure: Atomic<Option<N1qlError>>,
    queries: Atomic<Vec<N1qlQuery>>,
}

impl Default for RecordingOperations {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingOperations {
    pub fn new() -> Self {
        RecordingOperations {
            rows: atomic(Vec::new()),
            failure: atomic(None),
            queries: atomic(Vec::new()),
        }
    }

    pub fn set_rows(&self, rows: Vec<Value>) {
        self.rows.write_with(|r| *r = rows);
    }

    pub fn fail_with(&self, error: N1qlError) {
        self.failure.write_with(|f| *f = Some(error));
    }

    pub fn call_count(&self) -> usize {
        self.queries.read_with(|q| q.len())
    }

    pub fn queries(&self) -> Vec<N1qlQuery> {
        self.queries.read_with(|q| q.clone())
    }

    pub fn last_query(&self) -> Option<N1qlQuery> {
        self.queries.read_with(|q| q.last().cloned())
    }

    pub fn reset(&self) {
        self.rows.write_with(|r| r.clear());
        self.failure.write_with(|f| *f = None);
        self.queries.write_with(|q| q.clear());
    }
}

impl N1qlOperations for RecordingOperations {
    fn find_by_n1ql<T: N1qlEntity>(
        &self,
        query: &N1qlQuery,
        _entity_information: &EntityInformation,
    ) -> N1qlResult<Vec<T>> {
        self.queries.write_with(|q| q.push(query.clone()));
        if let Some(error) = self.failure.read_with(|f| f.clone()) {
            return Err(error);
        }
        self.rows.read_with(|rows| rows.iter().map(T::from_value).collect())
    }
}

/// A [QueryExecutor] that answers with a fixed response and records request bodies.
pub struct CannedExecutor {
    response: Atomic<N1qlResult<QueryResponse>>,
    requests: Atomic<Vec<Value>>,
}

impl CannedExecutor {
    pub fn new(response: N1qlResult<QueryResponse>) -> Self {
        CannedExecutor {
            response: atomic(response),
            requests: atomic(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<Value> {
        self.requests.read_with(|r| r.clone())
    }
}

impl QueryExecutor for CannedExecutor {
    fn query(&self, request: &Value) -> N1qlResult<QueryResponse> {
        self.requests.write_with(|r| r.push(request.clone()));
        self.response.read_with(|r| r.clone())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Airline {
    pub id: String,
    pub name: String,
    pub country: String,
    pub icao: String,
    pub active: bool,
}

impl Airline {
    pub fn new(id: &str, name: &str, country: &str, icao: &str) -> Self {
        Airline {
            id: id.to_string(),
            name: name.to_string(),
            country: country.to_string(),
            icao: icao.to_string(),
            active: true,
        }
    }
}

impl Convertible for Airline {
    type Output = Airline;

    fn to_value(&self) -> N1qlResult<Value> {
        Ok(doc! {
            "_ID": self.id.clone(),
            "_CAS": 1,
            "name": self.name.clone(),
            "country": self.country.clone(),
            "icao": self.icao.clone(),
            "active": self.active,
        })
    }

    fn from_value(value: &Value) -> N1qlResult<Self::Output> {
        if value.get(ID_FIELD).is_none() || value.get(CAS_FIELD).is_none() {
            return Err(N1qlError::new(
                "Airline row has no document metadata",
                ErrorKind::ObjectMappingError,
            ));
        }
        Ok(Airline {
            id: field_value(value, ID_FIELD)?,
            name: field_value(value, "name")?,
            country: field_value(value, "country")?,
            icao: field_value(value, "icao")?,
            active: field_value::<Option<bool>>(value, "active")?.unwrap_or(false),
        })
    }
}

impl N1qlEntity for Airline {
    fn entity_name(&self) -> String {
        "Airline".to_string()
    }
}

pub fn create_test_airlines() -> Vec<Airline> {
    vec![
        Airline::new("airline_10", "40-Mile Air", "United States", "MLA"),
        Airline::new("airline_137", "Air France", "France", "AFR"),
        Airline::new("airline_1355", "British Airways", "United Kingdom", "BAW"),
    ]
}

pub fn airline_rows(airlines: &[Airline]) -> N1qlResult<Vec<Value>> {
    airlines.iter().map(|a| a.to_value()).collect()
}
