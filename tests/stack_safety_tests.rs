//! Stack-safety tests for the trampolined evaluator.
//!
//! The programs here are deep enough to overflow a native stack under the
//! direct evaluator, which is therefore never called on them.

use effect_algebra::{Outcome, Program};
use rstest::rstest;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

const DEPTH: u64 = 200_000;

fn left_nested(depth: u64) -> Program<(), String, u64> {
    (0..depth).fold(Program::succeed(0), |program, _| {
        program.sequence(|value| Program::succeed(value + 1))
    })
}

fn count_down(n: u64) -> Program<(), String, u64> {
    if n == 0 {
        Program::succeed(0)
    } else {
        Program::succeed(n - 1).sequence(count_down)
    }
}

fn sum_to(n: u64, total: u64) -> Program<(), String, u64> {
    if n == 0 {
        Program::succeed(total)
    } else {
        Program::unit().sequence(move |()| sum_to(n - 1, total + n))
    }
}

// =============================================================================
// Deep Nesting
// =============================================================================

#[rstest]
fn test_left_nested_sequence_chain() {
    let (outcome, statistics) = left_nested(DEPTH).evaluate_safe_with_statistics(&());

    assert_eq!(outcome, Outcome::Success(DEPTH));
    assert_eq!(statistics.max_frame_depth, DEPTH as usize);
    assert_eq!(statistics.frames_pushed, DEPTH as usize);
}

#[rstest]
fn test_recursive_continuations_keep_frames_flat() {
    let (outcome, statistics) = count_down(100_000).evaluate_safe_with_statistics(&());

    assert_eq!(outcome, Outcome::Success(0));
    assert_eq!(statistics.max_frame_depth, 1);
}

#[rstest]
fn test_accumulating_loop() {
    assert_eq!(sum_to(100_000, 0).evaluate_safe(&()), Outcome::Success(5_000_050_000));
}

#[rstest]
fn test_left_nested_recover_chain() {
    let program = (0..DEPTH).fold(Program::<(), String, u64>::succeed(0), |program, _| {
        program.recover(
            |error| Program::raise(error),
            |value| Program::succeed(value + 1),
        )
    });

    assert_eq!(program.evaluate_safe(&()), Outcome::Success(DEPTH));
}

#[rstest]
fn test_failure_propagates_through_deep_chain() {
    let program = (0..DEPTH).fold(
        Program::<(), String, u64>::raise("bottom".to_string()),
        |program, _| program.sequence(|value| Program::succeed(value + 1)),
    );
    let (outcome, statistics) = program.evaluate_safe_with_statistics(&());

    assert_eq!(outcome, Outcome::Failure("bottom".to_string()));
    assert_eq!(statistics.frames_skipped, DEPTH as usize);
}

#[rstest]
fn test_recovery_at_the_top_of_a_deep_failing_chain() {
    let program: Program<(), String, u64> = (0..DEPTH)
        .fold(
            Program::<(), String, u64>::raise("bottom".to_string()),
            |program, _| program.sequence(|value| Program::succeed(value + 1)),
        )
        .catch_all(|error| Program::succeed(error.len() as u64));

    assert_eq!(program.evaluate_safe(&()), Outcome::Success(6));
}

// =============================================================================
// Retry Loops
// =============================================================================

fn retry_until(attempts: Arc<AtomicUsize>, succeed_at: usize) -> Program<(), String, usize> {
    let counter = Arc::clone(&attempts);
    let attempt: Program<(), String, usize> = Program::succeed_with(move || {
        counter.fetch_add(1, Ordering::SeqCst) + 1
    })
    .sequence(move |attempt| {
        if attempt < succeed_at {
            Program::raise(format!("attempt {attempt} failed"))
        } else {
            Program::succeed(attempt)
        }
    });

    attempt.catch_all(move |_| retry_until(Arc::clone(&attempts), succeed_at))
}

#[rstest]
fn test_unbounded_retry_through_recover() {
    let attempts = Arc::new(AtomicUsize::new(0));
    let program = retry_until(Arc::clone(&attempts), 50_000);

    assert_eq!(program.evaluate_safe(&()), Outcome::Success(50_000));
    assert_eq!(attempts.load(Ordering::SeqCst), 50_000);
}

// =============================================================================
// Environment Narrowing
// =============================================================================

#[rstest]
fn test_deep_program_under_one_narrowing() {
    let program: Program<(u64, &'static str), String, u64> = (0..DEPTH)
        .fold(Program::<u64, String, u64>::access(|start: &u64| *start), |program, _| {
            program.sequence(|value| Program::succeed(value + 1))
        })
        .provide_some(|pair: &(u64, &'static str)| pair.0);

    assert_eq!(program.evaluate_safe(&(1, "unused")), Outcome::Success(DEPTH + 1));
}

fn narrowed_loop(n: u64) -> Program<u64, String, u64> {
    if n == 0 {
        Program::access(|environment: &u64| *environment)
    } else {
        Program::succeed(n - 1)
            .sequence(narrowed_loop)
            .provide_some(|environment: &u64| *environment)
    }
}

#[rstest]
fn test_recursion_through_narrowing_at_moderate_depth() {
    // Each level nests one evaluator call on the native stack.
    let program = narrowed_loop(100);

    assert_eq!(program.evaluate(&7), Outcome::Success(7));
    assert_eq!(program.evaluate_safe(&7), Outcome::Success(7));
}

// =============================================================================
// Teardown
// =============================================================================

#[rstest]
fn test_dropping_deep_programs() {
    drop(left_nested(1_000_000));

    let recovered = (0..DEPTH).fold(Program::<(), String, u64>::succeed(0), |program, _| {
        program.catch_all(Program::raise)
    });
    drop(recovered);
}

fn captured_in_continuations(depth: usize) -> Program<(), String, u64> {
    (0..depth).fold(Program::succeed(0), |inner, _| {
        Program::succeed(0).sequence(move |_| inner.clone())
    })
}

#[rstest]
fn test_dropping_programs_captured_by_continuations() {
    // Only source links are torn down iteratively; programs held inside
    // continuation closures drop recursively, one level per closure.
    let program = captured_in_continuations(1_000);

    assert_eq!(program.evaluate_safe(&()), Outcome::Success(0));
    drop(program);
}

#[rstest]
fn test_deep_program_is_reusable() {
    let program = left_nested(DEPTH);
    let copy = program.clone();

    assert_eq!(program.evaluate_safe(&()), Outcome::Success(DEPTH));
    drop(program);
    assert_eq!(copy.evaluate_safe(&()), Outcome::Success(DEPTH));
}
