use super::{CheckFunc, CheckContext, EvalError, Value};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckFuncRegistryError {
    AlreadyRegistered(String),
}

impl std::fmt::Display for CheckFuncRegistryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CheckFuncRegistryError::AlreadyRegistered(name) => {
                write!(f, "check function `{}` is already registered", name)
            }
        }
    }
}

impl std::error::Error for CheckFuncRegistryError {}

/// Registry for the zero-argument functions callable from check
/// expressions (e.g. `content()`). Hosts may inject their own.
pub struct CheckFuncRegistry {
    functions: RwLock<HashMap<String, Arc<dyn CheckFunc>>>,
}

impl CheckFuncRegistry {
    pub fn new() -> Self {
        Self {
            functions: RwLock::new(HashMap::new()),
        }
    }

    pub fn with_builtins() -> Arc<Self> {
        let registry = Arc::new(Self::new());
        registry.register_builtin_functions();
        registry
    }

    pub fn register_function(
        &self,
        function: Arc<dyn CheckFunc>,
    ) -> Result<(), CheckFuncRegistryError> {
        let mut write = self.functions.write();
        let key = function.name().to_lowercase();
        if write.contains_key(&key) {
            return Err(CheckFuncRegistryError::AlreadyRegistered(key));
        }
        write.insert(key, function);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn CheckFunc>> {
        self.functions.read().get(&name.to_lowercase()).cloned()
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.functions.read().contains_key(&name.to_lowercase())
    }

    pub fn list_names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.functions.read().keys().cloned().collect();
        names.sort();
        names
    }

    fn register_builtin_functions(&self) {
        let _ = self.register_function(Arc::new(ContentFunc));
        let _ = self.register_function(Arc::new(BatchSizeFunc));
    }
}

impl Default for CheckFuncRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// `content()` - payload bytes of the part currently under examination.
#[derive(Debug)]
pub struct ContentFunc;

impl CheckFunc for ContentFunc {
    fn name(&self) -> &str {
        "content"
    }

    fn eval(&self, ctx: &CheckContext<'_>) -> Result<Value, EvalError> {
        Ok(Value::Bytes(ctx.examined()?.payload().clone()))
    }
}

/// `batch_size()` - number of parts in the batch under examination.
#[derive(Debug)]
pub struct BatchSizeFunc;

impl CheckFunc for BatchSizeFunc {
    fn name(&self) -> &str {
        "batch_size"
    }

    fn eval(&self, ctx: &CheckContext<'_>) -> Result<Value, EvalError> {
        Ok(Value::Int(ctx.batch_size() as i64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct DummyFn;

    impl CheckFunc for DummyFn {
        fn name(&self) -> &str {
            "dummy"
        }

        fn eval(&self, _ctx: &CheckContext<'_>) -> Result<Value, EvalError> {
            Ok(Value::Bool(true))
        }
    }

    #[test]
    fn builtins_are_registered() {
        let registry = CheckFuncRegistry::with_builtins();
        assert!(registry.is_registered("content"));
        assert!(registry.is_registered("batch_size"));
        assert_eq!(registry.list_names(), vec!["batch_size", "content"]);
    }

    #[test]
    fn register_and_resolve_host_function() {
        let registry = CheckFuncRegistry::new();
        assert!(!registry.is_registered("dummy"));
        registry.register_function(Arc::new(DummyFn)).expect("register");
        assert!(registry.is_registered("dummy"));
        assert!(registry.get("dummy").is_some());
        assert!(registry.get("DuMmY").is_some());
        assert!(registry.get("missing").is_none());
    }

    #[test]
    fn reject_duplicate_registration() {
        let registry = CheckFuncRegistry::new();
        registry.register_function(Arc::new(DummyFn)).expect("register");
        let err = registry
            .register_function(Arc::new(DummyFn))
            .expect_err("duplicate register should fail");
        assert_eq!(
            err,
            CheckFuncRegistryError::AlreadyRegistered("dummy".to_string())
        );
    }
}
