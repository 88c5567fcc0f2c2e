use crate::common::Value;

/// A reference to a statement already prepared on the query service.
///
/// Executing through a plan sends the prepared name (and, when known, the encoded
/// plan) instead of the statement text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryPlan {
    name: String,
    encoded_plan: Option<String>,
    statement: Option<String>,
}

impl QueryPlan {
    pub fn new(name: &str) -> Self {
        QueryPlan {
            name: name.to_string(),
            encoded_plan: None,
            statement: None,
        }
    }

    pub fn with_encoded_plan(mut self, encoded_plan: &str) -> Self {
        self.encoded_plan = Some(encoded_plan.to_string());
        self
    }

    /// Records the text the plan was prepared from. Only kept for diagnostics.
    pub fn with_statement(mut self, statement: &str) -> Self {
        self.statement = Some(statement.to_string());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn encoded_plan(&self) -> Option<&str> {
        self.encoded_plan.as_deref()
    }

    pub fn statement(&self) -> Option<&str> {
        self.statement.as_deref()
    }

    /// Writes `prepared` and `encoded_plan` into a request body object.
    pub fn inject_plan(&self, body: &mut Value) {
        body.put("prepared", self.name.as_str());
        if let Some(encoded) = &self.encoded_plan {
            body.put("encoded_plan", encoded.as_str());
        }
    }
}
