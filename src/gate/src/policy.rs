//! The batching policy: accumulates parts, reports readiness, and runs
//! the processor pipeline when flushed.
//!
//! A [`Batcher`] is owned by a single upstream caller which serialises
//! every `add`/`flush` invocation; the only concurrent actor is the
//! [`PeriodicFlushScheduler`], which communicates through a tick channel
//! rather than sharing the accumulator state.

use crate::check::{CheckContext, CheckEvaluator, CheckError};
use crate::metrics;
use crate::processor::{Processor, ProcessorConfig, ProcessorError};
use crate::registries::Registries;
use crate::scheduler::{CloseTimedOut, PeriodicFlushScheduler};
use message::{Batch, Part};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Declarative batching policy configuration.
///
/// Every trigger defaults to disabled; a config with all five fields
/// disabled is a no-op policy.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct PolicyConfig {
    /// Mark the batch ready once it holds this many parts. 0 disables.
    pub count: usize,
    /// Mark the batch ready once payload bytes reach this total. 0
    /// disables.
    pub byte_size: usize,
    /// Force a flush this long after the previous flush, e.g. `"300ms"`.
    /// Empty disables.
    pub period: String,
    /// Mark the batch ready when this check expression evaluates true.
    /// Empty disables.
    pub check: String,
    /// Transformations applied, in order, at flush time.
    pub processors: Vec<ProcessorConfig>,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            count: 0,
            byte_size: 0,
            period: String::new(),
            check: String::new(),
            processors: Vec::new(),
        }
    }
}

impl PolicyConfig {
    /// True when no trigger or processor is configured, i.e. the policy
    /// would never mark a batch ready on its own.
    pub fn is_noop(&self) -> bool {
        self.count == 0
            && self.byte_size == 0
            && self.period.is_empty()
            && self.check.is_empty()
            && self.processors.is_empty()
    }
}

#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("invalid batch period `{period}`: {source}")]
    InvalidPeriod {
        period: String,
        source: humantime::DurationError,
    },
    #[error("failed to compile batch check: {0}")]
    Check(#[from] CheckError),
    #[error(transparent)]
    Processor(#[from] ProcessorError),
    #[error("batch policy is closed")]
    Closed,
    #[error(transparent)]
    CloseTimedOut(#[from] CloseTimedOut),
}

/// The accumulator at the centre of a batching policy.
#[derive(Debug)]
pub struct Batcher {
    count: usize,
    byte_size: usize,
    check: Option<CheckEvaluator>,
    processors: Vec<Box<dyn Processor>>,
    parts: Vec<Part>,
    byte_total: usize,
    last_flush: Arc<Mutex<Instant>>,
    scheduler: Option<PeriodicFlushScheduler>,
    closed: bool,
}

impl Batcher {
    /// Construct a batcher from its config. Fails on a malformed
    /// period, an uncompilable check expression, or a processor that
    /// cannot be built. When a period is configured this spawns the
    /// flush scheduler and must run inside a tokio runtime.
    pub fn new(config: PolicyConfig, registries: &Registries) -> Result<Self, PolicyError> {
        let period = match config.period.as_str() {
            "" => None,
            raw => Some(humantime::parse_duration(raw).map_err(|source| {
                PolicyError::InvalidPeriod {
                    period: raw.to_string(),
                    source,
                }
            })?),
        };

        let check = match config.check.as_str() {
            "" => None,
            raw => Some(CheckEvaluator::compile(
                raw,
                &registries.check_func_registry(),
            )?),
        };

        let processor_registry = registries.processor_registry();
        let mut processors = Vec::with_capacity(config.processors.len());
        for processor_config in &config.processors {
            processors.push(processor_registry.build(processor_config, registries)?);
        }

        let last_flush = Arc::new(Mutex::new(Instant::now()));
        let scheduler =
            period.map(|p| PeriodicFlushScheduler::spawn(p, Arc::clone(&last_flush)));

        Ok(Self {
            count: config.count,
            byte_size: config.byte_size,
            check,
            processors,
            parts: Vec::new(),
            byte_total: 0,
            last_flush,
            scheduler,
            closed: false,
        })
    }

    /// Append a part and report whether any trigger now marks the batch
    /// ready. The part is retained either way; readiness is a signal to
    /// the caller to flush, not a flush itself.
    pub fn add(&mut self, part: Part) -> bool {
        if self.closed {
            tracing::warn!("add called on a closed batch policy");
            return false;
        }

        self.byte_total += part.len();
        self.parts.push(part);
        metrics::PARTS_ADDED.inc();

        let mut ready = false;
        if self.count > 0 && self.parts.len() >= self.count {
            ready = true;
            metrics::TRIGGER_COUNT.inc();
        }
        if self.byte_size > 0 && self.byte_total >= self.byte_size {
            ready = true;
            metrics::TRIGGER_BYTE_SIZE.inc();
        }
        if !ready {
            if let Some(check) = &self.check {
                let ctx = CheckContext::new(&self.parts, self.parts.len() - 1);
                match check.test(&ctx) {
                    Ok(true) => {
                        ready = true;
                        metrics::TRIGGER_CHECK.inc();
                    }
                    Ok(false) => {}
                    Err(err) => {
                        metrics::CHECK_EVAL_ERRORS.inc();
                        tracing::warn!(
                            check = check.source(),
                            error = %err,
                            "batch check evaluation failed, treating batch as not ready"
                        );
                    }
                }
            }
        }
        ready
    }

    /// Number of parts currently held.
    pub fn count(&self) -> usize {
        self.parts.len()
    }

    /// Time remaining until the next forced flush, or `None` when no
    /// period is configured. Saturates at zero when overdue.
    pub fn until_next(&self) -> Option<Duration> {
        self.scheduler.as_ref().map(PeriodicFlushScheduler::until_next)
    }

    /// Resolves when the scheduler posts a forced-flush tick; pends
    /// forever when no period is configured, so it is safe to park a
    /// `select!` arm on.
    pub async fn forced_flush_due(&mut self) {
        if let Some(scheduler) = self.scheduler.as_mut() {
            if scheduler.tick().await.is_some() {
                return;
            }
        }
        std::future::pending::<()>().await
    }

    /// Finalise the accumulated batch: reset the accumulator, re-arm the
    /// period window, run the processor pipeline, and return the result.
    /// Returns `Ok(None)` when there is nothing to emit - either the
    /// accumulator was empty or the processors dropped every part. A
    /// processor error discards the batch and surfaces to the caller;
    /// the accumulator stays healthy and empty.
    pub fn flush(&mut self) -> Result<Option<Batch>, PolicyError> {
        if self.closed {
            return Err(PolicyError::Closed);
        }
        if self.parts.is_empty() {
            return Ok(None);
        }

        let parts = std::mem::take(&mut self.parts);
        self.byte_total = 0;
        *self.last_flush.lock() = Instant::now();

        let mut batches = vec![Batch::from_parts(parts)];
        for processor in &self.processors {
            let mut produced = Vec::new();
            for batch in batches.drain(..) {
                if batch.is_empty() {
                    continue;
                }
                produced.extend(processor.process(batch)?);
            }
            batches = produced;
        }

        let mut emitted = Batch::new();
        for batch in batches {
            for part in batch {
                emitted.push(part);
            }
        }
        if emitted.is_empty() {
            return Ok(None);
        }

        metrics::BATCHES_FLUSHED.inc();
        metrics::PARTS_FLUSHED.inc_by(emitted.len() as u64);
        tracing::debug!(parts = emitted.len(), "flushed batch");
        Ok(Some(emitted))
    }

    /// Begin teardown: further adds are ignored and flushes fail with
    /// [`PolicyError::Closed`]. Non-blocking.
    pub fn close_async(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        if let Some(scheduler) = &self.scheduler {
            scheduler.close_async();
        }
    }

    /// Drain teardown: wait for the scheduler task to stop (up to
    /// `timeout`) and release the processors.
    pub async fn wait_for_close(&mut self, timeout: Duration) -> Result<(), PolicyError> {
        if let Some(scheduler) = self.scheduler.as_mut() {
            scheduler.wait_for_close(timeout).await?;
        }
        for processor in &mut self.processors {
            processor.close();
        }
        Ok(())
    }
}
