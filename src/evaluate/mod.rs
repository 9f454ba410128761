//! Evaluators for [`Program`].
//!
//! Two evaluators share one meaning:
//!
//! - [`Program::evaluate`] recurses over the program structure. It is the
//!   reference semantics and is fine for shallow programs.
//! - [`Program::evaluate_safe`] keeps pending continuations and handlers in
//!   an explicit frame stack, so its native stack usage does not grow with
//!   the nesting depth of the program. Use it for programs built by loops or
//!   recursion. The one exception is [`Program::provide_some`], which
//!   evaluates its inner program separately.
//!
//! For every program and environment both return the same [`Outcome`].
//!
//! # Examples
//!
//! ```rust
//! use effect_algebra::{Outcome, Program};
//!
//! fn count_down(n: u64) -> Program<(), String, u64> {
//!     if n == 0 {
//!         Program::succeed(0)
//!     } else {
//!         Program::succeed(n - 1).sequence(count_down)
//!     }
//! }
//!
//! assert_eq!(count_down(100_000).evaluate_safe(&()), Outcome::Success(0));
//! ```

pub(crate) mod direct;
pub(crate) mod trampoline;

use crate::Outcome;
use crate::program::{Data, Program};

/// Counters collected by one run of the trampolined evaluator.
///
/// # Examples
///
/// ```rust
/// use effect_algebra::Program;
///
/// let program: Program<(), String, i32> = Program::<(), String, i32>::raise("e".to_string())
///     .sequence(|value| Program::succeed(value + 1))
///     .sequence(|value| Program::succeed(value + 1));
///
/// let (outcome, statistics) = program.evaluate_safe_with_statistics(&());
/// assert!(outcome.is_failure());
/// assert_eq!(statistics.frames_skipped, 2);
/// assert_eq!(statistics.max_frame_depth, 2);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Statistics {
    /// Iterations of the evaluation loop.
    pub steps: usize,
    /// Programs descended into, leaves included.
    pub nodes_visited: usize,
    /// Frames pushed by `Sequence` and `Recover` nodes.
    pub frames_pushed: usize,
    /// Continuation frames discarded by a propagating failure.
    pub frames_skipped: usize,
    /// Highest number of frames pending at once.
    pub max_frame_depth: usize,
}

impl<R, E, A> Program<R, E, A>
where
    R: 'static,
    E: Data,
    A: Data,
{
    /// Evaluates the program by structural recursion.
    ///
    /// Each nested `Sequence` or `Recover` costs native stack, so a deeply
    /// nested program can overflow the thread's stack. Prefer
    /// [`Program::evaluate_safe`] for programs of unbounded depth.
    ///
    /// The program is borrowed and can be evaluated again, with the same or
    /// a different environment.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use effect_algebra::{Outcome, Program};
    ///
    /// let program: Program<i32, String, i32> = Program::access(|n: &i32| n + 1);
    /// assert_eq!(program.evaluate(&1), Outcome::Success(2));
    /// assert_eq!(program.evaluate(&41), Outcome::Success(42));
    /// ```
    pub fn evaluate(&self, environment: &R) -> Outcome<E, A> {
        direct::evaluate(self, environment)
    }

    /// Evaluates the program with an explicit frame stack.
    ///
    /// Produces the same outcome as [`Program::evaluate`] for every program
    /// and environment, but uses a bounded amount of native stack regardless
    /// of how deeply the program is nested. Heap usage is proportional to
    /// the number of pending frames.
    ///
    /// # Stack safety
    ///
    /// Every node kind is handled by the loop. Only a
    /// [`Program::provide_some`] entered while another is still running
    /// adds native stack, one evaluator call per level.
    ///
    /// # Panics
    ///
    /// Panics only on an internal type mismatch between a frame and the value
    /// it receives, which the program constructors rule out. Panics raised by
    /// user functions propagate unchanged.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use effect_algebra::{Outcome, Program};
    ///
    /// let program = (0..200_000).fold(Program::<(), String, u64>::succeed(0), |program, _| {
    ///     program.sequence(|value| Program::succeed(value + 1))
    /// });
    /// assert_eq!(program.evaluate_safe(&()), Outcome::Success(200_000));
    /// ```
    pub fn evaluate_safe(&self, environment: &R) -> Outcome<E, A> {
        trampoline::evaluate(self, environment).0
    }

    /// Like [`Program::evaluate_safe`], also returning the evaluator's
    /// [`Statistics`].
    ///
    /// # Panics
    ///
    /// Same as [`Program::evaluate_safe`].
    pub fn evaluate_safe_with_statistics(&self, environment: &R) -> (Outcome<E, A>, Statistics) {
        trampoline::evaluate(self, environment)
    }
}
