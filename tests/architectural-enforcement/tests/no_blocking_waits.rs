//! Integration Test: No Blocking Waits
//!
//! The engine runs as cooperative tokio tasks. Every wait must be a
//! suspension point (`tokio::time::sleep`, `Notify`, the render surface's
//! `next_frame`), never something that parks the worker thread.
//!
//! **Forbidden** in `astro/core/src` and `astro/sim/src` outside tests:
//! - `std::thread::sleep`
//! - `block_on` / `blocking_lock` / `blocking_recv`
//! - `std::sync::Mutex` (use `parking_lot` with short critical sections)

use architectural_enforcement::{count_sources, production_dirs, scan, Rule};

const BLOCKING_WAITS: Rule = Rule {
    name: "blocking-wait",
    patterns: &[
        "thread::sleep",
        "block_on(",
        "blocking_lock(",
        "blocking_recv(",
        "std::sync::Mutex",
        "std::sync::RwLock",
    ],
};

const PANICKING_UNWRAP: Rule = Rule {
    name: "unwrap",
    patterns: &[".unwrap()", ".expect("],
};

#[test]
fn test_engine_sources_found() {
    assert!(
        count_sources(&production_dirs()) > 10,
        "engine sources not found under {:?}",
        production_dirs()
    );
}

#[test]
fn test_no_blocking_waits_in_engine() {
    let violations = scan(&production_dirs(), &[BLOCKING_WAITS]);

    if !violations.is_empty() {
        eprintln!("\n❌ Thread-blocking waits found in engine code:");
        for violation in &violations {
            eprintln!("  ❌ {violation}");
        }
        eprintln!("\n✅ Use tokio::time::sleep(..).await or tokio::sync primitives instead.");
        panic!("Found {} blocking wait(s)", violations.len());
    }
}

#[test]
fn test_no_unwrap_in_engine() {
    let violations = scan(&production_dirs(), &[PANICKING_UNWRAP]);

    if !violations.is_empty() {
        eprintln!("\n❌ unwrap()/expect() found outside tests:");
        for violation in &violations {
            eprintln!("  ❌ {violation}");
        }
        eprintln!("\n✅ Propagate with `?` or log and fall back.");
        panic!("Found {} unwrap/expect call(s)", violations.len());
    }
}
