use crate::errors::N1qlResult;
use crate::query::{N1qlQuery, QueryArgument};
use crate::repository::{EntityInformation, N1qlEntity, QueryMethod};

/// The database operations port that runs N1QL requests.
///
/// Implementations execute the request against the query service and decode every
/// returned row into `T`. Failures (connectivity, malformed statement, server-side
/// error, decode failure) are returned as they are; callers hand them back unchanged.
///
/// Implementations must accept all three request modes (simple, parameterized,
/// prepared). They are shared between invocations and may be called from several
/// threads at once.
pub trait N1qlOperations: Send + Sync {
    fn find_by_n1ql<T: N1qlEntity>(
        &self,
        query: &N1qlQuery,
        entity_information: &EntityInformation,
    ) -> N1qlResult<Vec<T>>;
}

/// A query bound to one repository method, invoked by the repository dispatch layer.
///
/// The dispatch layer only sees the call-time arguments and the method metadata; how
/// the statement is produced and run is up to the implementation.
pub trait RepositoryQuery: Send + Sync {
    type Output;

    fn execute(&self, arguments: &[QueryArgument]) -> N1qlResult<Self::Output>;

    fn query_method(&self) -> &QueryMethod;
}
