use super::{
    ArchiveProcessor, FilterProcessor, Processor, ProcessorConfig, ProcessorError,
    ReplaceProcessor, SplitProcessor,
};
use crate::registries::Registries;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

type ProcessorFactory = Arc<
    dyn Fn(&ProcessorConfig, &Registries) -> Result<Box<dyn Processor>, ProcessorError>
        + Send
        + Sync,
>;

/// Registry that resolves processor kinds to factory functions. There is
/// no process-wide constructor table: a registry value is threaded
/// through policy construction, and hosts may register their own kinds.
pub struct ProcessorRegistry {
    factories: RwLock<HashMap<String, ProcessorFactory>>,
}

impl Default for ProcessorRegistry {
    fn default() -> Self {
        let registry = Self::new();
        registry.register_builtin_processors();
        registry
    }
}

impl ProcessorRegistry {
    pub fn new() -> Self {
        Self {
            factories: RwLock::new(HashMap::new()),
        }
    }

    pub fn with_builtins() -> Arc<Self> {
        let registry = Arc::new(Self::new());
        registry.register_builtin_processors();
        registry
    }

    pub fn register_factory(&self, kind: impl Into<String>, factory: ProcessorFactory) {
        self.factories.write().insert(kind.into(), factory);
    }

    pub fn is_registered(&self, kind: &str) -> bool {
        self.factories.read().contains_key(kind)
    }

    /// Construct a processor for the given config.
    pub fn build(
        &self,
        config: &ProcessorConfig,
        registries: &Registries,
    ) -> Result<Box<dyn Processor>, ProcessorError> {
        let guard = self.factories.read();
        let factory = guard
            .get(config.kind())
            .ok_or_else(|| ProcessorError::UnknownKind(config.kind().to_string()))?;
        factory(config, registries)
    }

    fn register_builtin_processors(&self) {
        self.register_factory(
            "archive",
            Arc::new(|config, _| match config {
                ProcessorConfig::Archive(cfg) => Ok(Box::new(ArchiveProcessor::new(cfg))),
                other => Err(ProcessorError::InvalidConfig(format!(
                    "expected archive config but received `{}`",
                    other.kind()
                ))),
            }),
        );

        self.register_factory(
            "split",
            Arc::new(|config, _| match config {
                ProcessorConfig::Split => Ok(Box::new(SplitProcessor)),
                other => Err(ProcessorError::InvalidConfig(format!(
                    "expected split config but received `{}`",
                    other.kind()
                ))),
            }),
        );

        self.register_factory(
            "replace",
            Arc::new(|config, _| match config {
                ProcessorConfig::Replace(cfg) => {
                    Ok(Box::new(ReplaceProcessor::new(cfg)?) as Box<dyn Processor>)
                }
                other => Err(ProcessorError::InvalidConfig(format!(
                    "expected replace config but received `{}`",
                    other.kind()
                ))),
            }),
        );

        self.register_factory(
            "filter",
            Arc::new(|config, registries| match config {
                ProcessorConfig::Filter(cfg) => Ok(Box::new(FilterProcessor::new(
                    cfg,
                    &registries.check_func_registry(),
                )?) as Box<dyn Processor>),
                other => Err(ProcessorError::InvalidConfig(format!(
                    "expected filter config but received `{}`",
                    other.kind()
                ))),
            }),
        );
    }
}
