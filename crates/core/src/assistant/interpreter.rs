//! Query interpreters - turn a free-text message into a structured query.

use async_trait::async_trait;

use super::{InterpretedQuery, InterpreterError};

/// Trait for message interpreters.
///
/// The production interpreter is a language-model call that fixes typos and
/// pulls out product, color and price hints. The assistant only depends on
/// this trait.
#[async_trait]
pub trait QueryInterpreter: Send + Sync {
    /// Name of this interpreter for logging.
    fn name(&self) -> &str;

    /// Interpret a user message.
    async fn interpret(&self, message: &str) -> Result<InterpretedQuery, InterpreterError>;
}

/// Interpreter that treats every message as a product search for its own text.
#[derive(Debug, Clone, Default)]
pub struct PassthroughInterpreter;

impl PassthroughInterpreter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl QueryInterpreter for PassthroughInterpreter {
    fn name(&self) -> &str {
        "passthrough"
    }

    async fn interpret(&self, message: &str) -> Result<InterpretedQuery, InterpreterError> {
        Ok(InterpretedQuery::product_search(message.trim()))
    }
}
