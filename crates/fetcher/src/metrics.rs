use once_cell::sync::Lazy;
use prometheus::{
    register_histogram, register_int_counter_vec, register_int_gauge, Histogram, IntCounterVec,
    IntGauge,
};

pub static REPOS_PROCESSED_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "fetcher_repos_processed_total",
        "Repositories scanned for bounty issues by outcome",
        &["outcome"]
    )
    .expect("repos processed")
});

pub static BOUNTY_ISSUES: Lazy<IntGauge> = Lazy::new(|| {
    register_int_gauge!(
        "fetcher_bounty_issues",
        "Bounty issues collected by the most recent run"
    )
    .expect("bounty issues")
});

pub static RUN_DURATION: Lazy<Histogram> = Lazy::new(|| {
    register_histogram!(
        "fetcher_run_duration_seconds",
        "Wall time of a full collection run"
    )
    .expect("run duration")
});
