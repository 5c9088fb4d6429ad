use std::time::{Duration, Instant};

/// Run `f` and return its result together with the wall-clock time it took
pub fn timed<T, F: FnOnce() -> T>(f: F) -> (T, Duration) {
    let start = Instant::now();
    let value = f();
    (value, start.elapsed())
}
