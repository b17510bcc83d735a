// Copyright (c) stratadb.com 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

//! Wait utilities for tests that coordinate with background threads without
//! fixed sleeps.

use std::thread;
use std::time::{Duration, Instant};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Poll `condition` until it returns true.
///
/// # Panics
/// Panics if the condition does not become true within `timeout`.
pub fn wait_for_condition<F>(
    condition: F,
    timeout: Duration,
    poll_interval: Duration,
    timeout_message: &str,
) where
    F: Fn() -> bool,
{
    let start = Instant::now();

    while !condition() {
        if start.elapsed() > timeout {
            panic!("Timeout after {:?}: {}", timeout, timeout_message);
        }
        thread::sleep(poll_interval);
    }
}

/// Wait with the default timeout and poll interval.
pub fn wait_for<F>(condition: F, message: &str)
where
    F: Fn() -> bool,
{
    wait_for_condition(condition, DEFAULT_TIMEOUT, DEFAULT_POLL_INTERVAL, message);
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    use super::*;

    #[test]
    fn test_wait_for_immediate() {
        wait_for(|| true, "should not timeout");
    }

    #[test]
    fn test_wait_for_becomes_true() {
        let flag = Arc::new(AtomicBool::new(false));
        let flag_clone = flag.clone();

        thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            flag_clone.store(true, Ordering::SeqCst);
        });

        wait_for(|| flag.load(Ordering::SeqCst), "flag should flip");
    }

    #[test]
    #[should_panic(expected = "Timeout after")]
    fn test_wait_for_timeout() {
        wait_for_condition(
            || false,
            Duration::from_millis(10),
            Duration::from_millis(1),
            "condition never becomes true",
        );
    }
}
