//! Check expression language: a small lexer, parser, and tree-walking
//! evaluator for batch-readiness predicates such as
//! `content() == "bar" || batch_size() >= 10`.

mod expr;
mod lexer;
mod parser;
pub mod registry;
mod value;

pub use expr::{BinaryOp, Expr};
pub use registry::{BatchSizeFunc, CheckFuncRegistry, CheckFuncRegistryError, ContentFunc};
pub use value::{compare_values, Value};

use message::Part;
use thiserror::Error;

/// Compile-time failure of a check expression.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CheckError {
    #[error("unexpected character `{ch}` at offset {pos}")]
    UnexpectedChar { ch: char, pos: usize },
    #[error("unterminated string literal at offset {pos}")]
    UnterminatedString { pos: usize },
    #[error("integer literal out of range at offset {pos}")]
    IntOutOfRange { pos: usize },
    #[error("unexpected {found} at offset {pos}, expected {expected}")]
    UnexpectedToken {
        found: String,
        expected: String,
        pos: usize,
    },
    #[error("unknown function `{name}`")]
    UnknownFunction { name: String },
    #[error("unexpected end of expression")]
    UnexpectedEof,
}

/// Runtime failure while evaluating a compiled expression. These are
/// non-fatal to the policy: it logs them and treats the predicate as
/// false.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch { expected: String, actual: String },
    #[error("part index {index} out of bounds for batch of {len}")]
    IndexOutOfBounds { index: usize, len: usize },
    #[error("function `{name}` failed: {message}")]
    Function { name: String, message: String },
}

/// The batch state a check expression is evaluated against: the
/// accumulated parts plus the index of the part under examination.
pub struct CheckContext<'a> {
    parts: &'a [Part],
    index: usize,
}

impl<'a> CheckContext<'a> {
    pub fn new(parts: &'a [Part], index: usize) -> Self {
        Self { parts, index }
    }

    /// The part currently under examination.
    pub fn examined(&self) -> Result<&'a Part, EvalError> {
        self.parts.get(self.index).ok_or(EvalError::IndexOutOfBounds {
            index: self.index,
            len: self.parts.len(),
        })
    }

    pub fn batch_size(&self) -> usize {
        self.parts.len()
    }
}

/// A zero-argument function callable from check expressions. Hosts
/// implement this to extend the language through
/// [`CheckFuncRegistry::register_function`].
pub trait CheckFunc: Send + Sync + std::fmt::Debug {
    /// Name the function is called by in expressions (matched
    /// case-insensitively).
    fn name(&self) -> &str;

    fn eval(&self, ctx: &CheckContext<'_>) -> Result<Value, EvalError>;
}

/// A predicate compiled once at policy construction and evaluated after
/// each add.
#[derive(Debug, Clone)]
pub struct CheckEvaluator {
    source: String,
    expr: Expr,
}

impl CheckEvaluator {
    pub fn compile(source: &str, registry: &CheckFuncRegistry) -> Result<Self, CheckError> {
        let expr = parser::parse(source, registry)?;
        Ok(Self {
            source: source.to_string(),
            expr,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Evaluate against the given context. Non-boolean results coerce to
    /// false.
    pub fn test(&self, ctx: &CheckContext<'_>) -> Result<bool, EvalError> {
        match self.expr.eval(ctx)? {
            Value::Bool(b) => Ok(b),
            _ => Ok(false),
        }
    }
}
