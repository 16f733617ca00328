use std::time::Instant;

use super::*;
use crate::foundation::error::StudioError;

#[test]
fn simulated_clock_accumulates_without_sleeping() {
    let mut clock = SimulatedClock::new();
    let cancel = CancellationToken::new();
    let t0 = Instant::now();
    for _ in 0..100 {
        clock.hold(10.0, &cancel).unwrap();
    }
    assert!(t0.elapsed() < Duration::from_secs(1));
    assert_eq!(clock.held_secs(), 1000.0);
}

#[test]
fn simulated_clock_observes_cancellation() {
    let mut clock = SimulatedClock::new();
    let cancel = CancellationToken::new();
    cancel.cancel();
    assert!(matches!(
        clock.hold(1.0, &cancel),
        Err(StudioError::Cancelled)
    ));
}

#[test]
fn realtime_clock_sleeps() {
    let mut clock = RealtimeClock::new();
    let t0 = Instant::now();
    clock.hold(0.05, &CancellationToken::new()).unwrap();
    assert!(t0.elapsed() >= Duration::from_millis(50));
}

#[test]
fn realtime_clock_returns_early_on_cancel() {
    let mut clock = RealtimeClock::new();
    let cancel = CancellationToken::new();
    let remote = cancel.clone();
    let handle = std::thread::spawn(move || {
        std::thread::sleep(Duration::from_millis(30));
        remote.cancel();
    });
    let t0 = Instant::now();
    let res = clock.hold(10.0, &cancel);
    handle.join().unwrap();
    assert!(matches!(res, Err(StudioError::Cancelled)));
    assert!(t0.elapsed() < Duration::from_secs(5));
}
