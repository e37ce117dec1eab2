use once_cell::sync::Lazy;
use prometheus::IntCounter;

fn register_int_counter(name: &str, help: &str) -> IntCounter {
    let counter = IntCounter::new(name, help).expect("create int counter");
    prometheus::register(Box::new(counter.clone())).expect("register int counter");
    counter
}

pub static PARTS_ADDED: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter(
        "batch_parts_added_total",
        "Message parts accepted by batch policies",
    )
});

pub static BATCHES_FLUSHED: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter(
        "batch_flushes_total",
        "Non-empty batches emitted by batch policies",
    )
});

pub static PARTS_FLUSHED: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter(
        "batch_flushed_parts_total",
        "Message parts emitted in flushed batches, after processing",
    )
});

pub static TRIGGER_COUNT: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter(
        "batch_trigger_count_total",
        "Times the part-count trigger marked a batch ready",
    )
});

pub static TRIGGER_BYTE_SIZE: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter(
        "batch_trigger_byte_size_total",
        "Times the byte-size trigger marked a batch ready",
    )
});

pub static TRIGGER_CHECK: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter(
        "batch_trigger_check_total",
        "Times the check predicate marked a batch ready",
    )
});

pub static FORCED_FLUSH_TICKS: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter(
        "batch_forced_flush_ticks_total",
        "Flush ticks posted by periodic flush schedulers",
    )
});

pub static CHECK_EVAL_ERRORS: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter(
        "batch_check_errors_total",
        "Check predicate evaluation failures, treated as not ready",
    )
});
