// perf.rs - Timing instrumentation for keyword completion
//
// Every completion request is timed and counted. The counters are always
// kept; they are only logged when AREND_PERF is set.
//
// Usage:
//   AREND_PERF=1 arend-completion complete tree.json --offset 42
//   AREND_PERF=verbose arend-completion complete ...   # slow requests warn too

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

static PERF_ENABLED: OnceLock<bool> = OnceLock::new();
static PERF_VERBOSE: OnceLock<bool> = OnceLock::new();

/// Check if performance logging is enabled
pub fn is_enabled() -> bool {
    *PERF_ENABLED.get_or_init(|| {
        std::env::var("AREND_PERF")
            .map(|v| !v.is_empty() && v != "0" && v.to_lowercase() != "false")
            .unwrap_or(false)
    })
}

/// Check if slow-request warnings are enabled
pub fn is_verbose() -> bool {
    *PERF_VERBOSE.get_or_init(|| {
        std::env::var("AREND_PERF")
            .map(|v| v.to_lowercase() == "verbose")
            .unwrap_or(false)
    })
}

/// Times one completion request.
///
/// [`RequestTimer::finish`] reports the duration and returns it so the
/// caller can feed it into the counters. A timer dropped without
/// finishing (a request abandoned early) still reports.
///
/// ```
/// use arend_completion::perf::RequestTimer;
///
/// let timer = RequestTimer::start("keyword_completion", 20);
/// // ... evaluate the rules ...
/// let elapsed = timer.finish();
/// assert!(elapsed.as_secs() < 60);
/// ```
pub struct RequestTimer {
    start: Instant,
    name: &'static str,
    warn_after: Duration,
}

impl RequestTimer {
    pub fn start(name: &'static str, warn_after_ms: u64) -> Self {
        Self {
            start: Instant::now(),
            name,
            warn_after: Duration::from_millis(warn_after_ms),
        }
    }

    pub fn finish(self) -> Duration {
        let elapsed = self.start.elapsed();
        self.report(elapsed);
        std::mem::forget(self);
        elapsed
    }

    fn report(&self, elapsed: Duration) {
        if !is_enabled() {
            return;
        }
        log::info!("[PERF] {} completed in {:?}", self.name, elapsed);
        if elapsed > self.warn_after && is_verbose() {
            log::warn!(
                "[PERF] {} exceeded threshold ({}ms > {}ms)",
                self.name,
                elapsed.as_millis(),
                self.warn_after.as_millis()
            );
        }
    }
}

impl Drop for RequestTimer {
    fn drop(&mut self) {
        self.report(self.start.elapsed());
    }
}

static REQUESTS: AtomicUsize = AtomicUsize::new(0);
static CANCELLED: AtomicUsize = AtomicUsize::new(0);
static CANDIDATES: AtomicUsize = AtomicUsize::new(0);
static TIMED: AtomicUsize = AtomicUsize::new(0);
static TOTAL_MICROS: AtomicU64 = AtomicU64::new(0);
static SLOWEST_MICROS: AtomicU64 = AtomicU64::new(0);

/// Process-wide completion counters.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CompletionCounters {
    pub requests: usize,
    pub cancelled: usize,
    pub candidates: usize,
    /// Requests whose evaluation time was recorded.
    pub timed: usize,
    pub total_time: Duration,
    pub slowest: Duration,
}

impl CompletionCounters {
    pub fn mean_time(&self) -> Duration {
        match u32::try_from(self.timed) {
            Ok(0) | Err(_) => Duration::ZERO,
            Ok(n) => self.total_time / n,
        }
    }
}

pub fn record_request(candidates: usize) {
    REQUESTS.fetch_add(1, Ordering::Relaxed);
    CANDIDATES.fetch_add(candidates, Ordering::Relaxed);
}

pub fn record_cancelled() {
    REQUESTS.fetch_add(1, Ordering::Relaxed);
    CANCELLED.fetch_add(1, Ordering::Relaxed);
}

/// Add one evaluation time to the counters.
pub fn record_duration(elapsed: Duration) {
    let micros = u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX);
    TIMED.fetch_add(1, Ordering::Relaxed);
    TOTAL_MICROS.fetch_add(micros, Ordering::Relaxed);
    SLOWEST_MICROS.fetch_max(micros, Ordering::Relaxed);
}

pub fn counters() -> CompletionCounters {
    CompletionCounters {
        requests: REQUESTS.load(Ordering::Relaxed),
        cancelled: CANCELLED.load(Ordering::Relaxed),
        candidates: CANDIDATES.load(Ordering::Relaxed),
        timed: TIMED.load(Ordering::Relaxed),
        total_time: Duration::from_micros(TOTAL_MICROS.load(Ordering::Relaxed)),
        slowest: Duration::from_micros(SLOWEST_MICROS.load(Ordering::Relaxed)),
    }
}

/// Log the counters when timing is enabled.
pub fn log_summary() {
    if !is_enabled() {
        return;
    }
    let c = counters();
    log::info!(
        "[PERF] {} completion request(s), {} cancelled, {} candidate(s), mean {:?}, slowest {:?}",
        c.requests,
        c.cancelled,
        c.candidates,
        c.mean_time(),
        c.slowest
    );
}
