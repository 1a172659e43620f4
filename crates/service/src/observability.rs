use once_cell::sync::Lazy;
use prometheus::{register_int_counter, IntCounter};

// Prometheus metrics (default registry)
pub static LIKES_INCREMENTS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "news_likes_increments_total",
        "Total likes recorded, remote or local"
    )
    .expect("register increments_total")
});

pub static LIKES_REMOTE_FAILURES_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "news_likes_remote_failures_total",
        "Total remote likes operations that failed"
    )
    .expect("register remote_failures_total")
});

pub static LIKES_FALLBACK_WRITES_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "news_likes_fallback_writes_total",
        "Total likes mutations served by the local ledger"
    )
    .expect("register fallback_writes_total")
});

pub static LIKES_FALLBACK_READS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "news_likes_fallback_reads_total",
        "Total likes reads served by the local ledger"
    )
    .expect("register fallback_reads_total")
});

/// Touch every counter so they show up in `/metrics` before first use.
pub fn init_metrics() {
    Lazy::force(&LIKES_INCREMENTS_TOTAL);
    Lazy::force(&LIKES_REMOTE_FAILURES_TOTAL);
    Lazy::force(&LIKES_FALLBACK_WRITES_TOTAL);
    Lazy::force(&LIKES_FALLBACK_READS_TOTAL);
}
