//! Wall-clock measurements.

use std::fmt;
use std::thread;
use std::time::{Duration, Instant};

use tracing::debug;

/// Share of runs `profile` averages over when the caller has no preference.
pub const DEFAULT_PROFILE_SHARE: f64 = 0.05;

/// Measures the time since creation or the last [`TimeProbe::reset`].
#[derive(Debug, Clone)]
pub struct TimeProbe {
    label: String,
    start: Instant,
}

impl TimeProbe {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            start: Instant::now(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn reset(&mut self) {
        self.start = Instant::now();
    }

    pub fn duration(&self) -> Duration {
        self.start.elapsed()
    }
}

impl fmt::Display for TimeProbe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}sec", self.label, self.duration().as_secs_f64())
    }
}

pub fn sleep_ms(ms: u64) {
    thread::sleep(Duration::from_millis(ms));
}

/// Time one run of `body`.
pub fn profile_once<F: FnOnce()>(body: F) -> Duration {
    let probe = TimeProbe::new("profile");
    body();
    probe.duration()
}

/// Run `body` `times` times and average the fastest runs.
///
/// `share` picks how many: `<= 0` takes only the best run, `> 1` takes all
/// of them, anything between takes `times * share` rounded, at least one.
pub fn profile<F: FnMut()>(times: u32, share: f64, mut body: F) -> Duration {
    let mut probe = TimeProbe::new("profile");
    let mut runs = Vec::with_capacity(times as usize);
    for _ in 0..times {
        probe.reset();
        body();
        runs.push(probe.duration());
    }
    let result = average_fastest(runs, share);
    debug!(times, share, seconds = result.as_secs_f64(), "profiled");
    result
}

/// How many of `times` runs `profile` averages for `share`.
pub fn averaged_runs(times: u32, share: f64) -> u32 {
    if times == 0 {
        return 0;
    }
    let count = if share <= 0.0 {
        1
    } else if share > 1.0 {
        times
    } else {
        (f64::from(times) * share).round_ties_even() as u32
    };
    count.clamp(1, times)
}

fn average_fastest(mut runs: Vec<Duration>, share: f64) -> Duration {
    let count = averaged_runs(runs.len() as u32, share);
    if count == 0 {
        return Duration::ZERO;
    }
    runs.sort_unstable();
    runs.iter().take(count as usize).sum::<Duration>() / count
}
