use crate::check::registry::CheckFuncRegistryError;
use crate::check::{CheckFunc, CheckFuncRegistry};
use crate::processor::ProcessorRegistry;
use std::sync::Arc;

/// The registries a batch policy is constructed against: processor
/// factories and check functions. Threaded explicitly through
/// construction instead of living in process-wide tables.
#[derive(Clone)]
pub struct Registries {
    processors: Arc<ProcessorRegistry>,
    check_funcs: Arc<CheckFuncRegistry>,
}

impl Default for Registries {
    fn default() -> Self {
        Self {
            processors: ProcessorRegistry::with_builtins(),
            check_funcs: CheckFuncRegistry::with_builtins(),
        }
    }
}

impl Registries {
    pub fn new(processors: Arc<ProcessorRegistry>, check_funcs: Arc<CheckFuncRegistry>) -> Self {
        Self {
            processors,
            check_funcs,
        }
    }

    pub fn processor_registry(&self) -> Arc<ProcessorRegistry> {
        Arc::clone(&self.processors)
    }

    pub fn check_func_registry(&self) -> Arc<CheckFuncRegistry> {
        Arc::clone(&self.check_funcs)
    }

    pub fn register_check_func(
        &self,
        function: Arc<dyn CheckFunc>,
    ) -> Result<(), CheckFuncRegistryError> {
        self.check_funcs.register_function(function)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_wires_builtins() {
        let registries = Registries::default();
        assert!(registries.processor_registry().is_registered("archive"));
        assert!(registries.check_func_registry().is_registered("content"));
    }
}
