//! Mock query interpreter for testing.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::assistant::{InterpretedQuery, InterpreterError, QueryInterpreter};

/// Mock implementation of the QueryInterpreter trait.
///
/// Returns the configured interpretation, or a plain product search for the
/// message when none is set.
#[derive(Debug, Default)]
pub struct MockInterpreter {
    /// Interpretation returned for every message.
    response: Arc<RwLock<Option<InterpretedQuery>>>,
    /// If set, the next call fails with this message.
    next_error: Arc<RwLock<Option<String>>>,
    /// Messages interpreted so far.
    messages: Arc<RwLock<Vec<String>>>,
}

impl MockInterpreter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return `query` for every subsequent message.
    pub async fn set_response(&self, query: InterpretedQuery) {
        *self.response.write().await = Some(query);
    }

    /// Make the next call fail.
    pub async fn fail_next(&self, message: impl Into<String>) {
        *self.next_error.write().await = Some(message.into());
    }

    /// Messages received so far.
    pub async fn recorded_messages(&self) -> Vec<String> {
        self.messages.read().await.clone()
    }
}

#[async_trait]
impl QueryInterpreter for MockInterpreter {
    fn name(&self) -> &str {
        "mock"
    }

    async fn interpret(&self, message: &str) -> Result<InterpretedQuery, InterpreterError> {
        self.messages.write().await.push(message.to_string());

        if let Some(error) = self.next_error.write().await.take() {
            return Err(InterpreterError::RequestFailed(error));
        }

        Ok(self
            .response
            .read()
            .await
            .clone()
            .unwrap_or_else(|| InterpretedQuery::product_search(message)))
    }
}
