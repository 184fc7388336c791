use lazy_static::lazy_static;
use prometheus::Encoder;
use prometheus::IntCounterVec;
use prometheus::Opts;
use prometheus::Registry;
use prometheus::TextEncoder;
use tracing::error;


lazy_static! {
    pub static ref DIFF_RUNS: IntCounterVec = IntCounterVec::new(
        Opts::new("diff_runs", "Number of diffs computed per relation name"),
        &["relation"]
    )
    .expect("metric can not be created");

    pub static ref EVENTS_EMITTED: IntCounterVec = IntCounterVec::new(
        Opts::new("events_emitted", "Number of events delivered to listeners, by event name"),
        &["event"]
    )
    .expect("metric can not be created");

    pub static ref SKIPPED_WRITES: IntCounterVec = IntCounterVec::new(
        Opts::new("skipped_writes", "Writes dropped because the local unit is not writer-of-record"),
        &["relation"]
    )
    .expect("metric can not be created");

    pub static ref BASELINE_RESETS: IntCounterVec = IntCounterVec::new(
        Opts::new("baseline_resets", "Unreadable baselines replaced by an empty snapshot"),
        &["relation"]
    )
    .expect("metric can not be created");
}

/// Register every collector of this crate into `registry`
pub fn register_custom_metrics(registry: &Registry) -> prometheus::Result<()> {
    registry.register(Box::new(DIFF_RUNS.clone()))?;
    registry.register(Box::new(EVENTS_EMITTED.clone()))?;
    registry.register(Box::new(SKIPPED_WRITES.clone()))?;
    registry.register(Box::new(BASELINE_RESETS.clone()))?;
    Ok(())
}

/// Text exposition of `registry`, ready to be served to a Prometheus scraper
pub fn gather_metrics(registry: &Registry) -> String {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&registry.gather(), &mut buffer) {
        error!("could not encode custom metrics: {}", e);
    }
    match String::from_utf8(buffer) {
        Ok(v) => v,
        Err(e) => {
            error!("custom metrics could not be from_utf8'd: {}", e);
            String::default()
        }
    }
}
