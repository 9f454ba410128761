#![cfg(feature = "tracing")]
//! Tests for the evaluation events emitted through `tracing`.

use effect_algebra::{Outcome, Program};
use rstest::rstest;
use std::io;
use std::sync::{Arc, Mutex};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Clone, Default)]
struct Capture {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl Capture {
    fn contents(&self) -> String {
        String::from_utf8(self.buffer.lock().unwrap().clone()).unwrap()
    }
}

impl io::Write for Capture {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        self.buffer.lock().unwrap().extend_from_slice(bytes);
        Ok(bytes.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn capture_events<T>(level: LevelFilter, body: impl FnOnce() -> T) -> (T, String) {
    let capture = Capture::default();
    let writer = capture.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();

    let result = {
        let _guard = subscriber.set_default();
        body()
    };
    (result, capture.contents())
}

fn failing_chain() -> Program<(), String, i32> {
    Program::<(), String, i32>::raise("boom".to_string())
        .sequence(|value| Program::succeed(value + 1))
        .sequence(|value| Program::succeed(value + 1))
}

#[rstest]
fn test_safe_evaluation_reports_statistics() {
    let (outcome, output) = capture_events(LevelFilter::DEBUG, || failing_chain().evaluate_safe(&()));

    assert_eq!(outcome, Outcome::Failure("boom".to_string()));
    assert!(output.contains("trampolined evaluation finished"));
    assert!(output.contains("frames_skipped=2"));
    assert!(output.contains("success=false"));
}

#[rstest]
fn test_frame_events_are_trace_level() {
    let program: Program<(), String, i32> = failing_chain().catch_all(|_| Program::succeed(0));

    let (_, debug_output) = capture_events(LevelFilter::DEBUG, || program.evaluate_safe(&()));
    let (_, trace_output) = capture_events(LevelFilter::TRACE, || program.evaluate_safe(&()));

    assert!(!debug_output.contains("continuation frame skipped by failure"));
    assert!(trace_output.contains("continuation frame skipped by failure"));
    assert!(trace_output.contains("recovery frame handling failure"));
}

#[rstest]
fn test_direct_evaluation_is_silent() {
    let (outcome, output) = capture_events(LevelFilter::TRACE, || failing_chain().evaluate(&()));

    assert!(outcome.is_failure());
    assert!(output.is_empty());
}
