//! Combinators derived from the five primitives.
//!
//! Nothing here adds a node kind: every function builds its result out of
//! `succeed`, `raise`, `access`, `sequence` and `recover`, so both
//! evaluators support it. The trampoline keeps all of them stack-safe
//! except recursion through [`Program::provide_some`], whose inner program
//! is evaluated separately.

use super::{Data, Program};
use crate::Outcome;
use std::convert::Infallible;
use std::sync::Arc;

impl<R, E> Program<R, E, ()>
where
    R: 'static,
    E: Data,
{
    /// Creates a program that succeeds with `()`.
    #[inline]
    pub const fn unit() -> Self {
        Self::succeed(())
    }
}

impl<R, E> Program<R, E, R>
where
    R: Data,
    E: Data,
{
    /// Creates a program that produces a copy of the whole environment.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use effect_algebra::{Outcome, Program};
    ///
    /// let program: Program<String, (), String> = Program::ask();
    /// assert_eq!(program.evaluate(&"env".to_string()), Outcome::Success("env".to_string()));
    /// ```
    pub fn ask() -> Self {
        Self::access(R::clone)
    }
}

impl<R, E, A> Program<R, E, A>
where
    R: 'static,
    E: Data,
    A: Data,
{
    // =========================================================================
    // Constructors
    // =========================================================================

    /// Creates a program whose value is computed by `thunk` each time the
    /// program is evaluated.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use effect_algebra::{Outcome, Program};
    /// use std::sync::atomic::{AtomicUsize, Ordering};
    /// use std::sync::Arc;
    ///
    /// let calls = Arc::new(AtomicUsize::new(0));
    /// let counter = Arc::clone(&calls);
    /// let program: Program<(), String, usize> =
    ///     Program::succeed_with(move || counter.fetch_add(1, Ordering::SeqCst));
    ///
    /// assert_eq!(calls.load(Ordering::SeqCst), 0);
    /// assert_eq!(program.evaluate(&()), Outcome::Success(0));
    /// assert_eq!(program.evaluate(&()), Outcome::Success(1));
    /// ```
    pub fn succeed_with<F>(thunk: F) -> Self
    where
        F: Fn() -> A + Send + Sync + 'static,
    {
        Self::access(move |_| thunk())
    }

    /// Creates a program that fails with an error computed by `thunk` each
    /// time the program is evaluated.
    pub fn raise_with<F>(thunk: F) -> Self
    where
        F: Fn() -> E + Send + Sync + 'static,
    {
        Program::<R, E, ()>::unit().sequence(move |()| Self::raise(thunk()))
    }

    /// Lifts a finished [`Outcome`] into a program.
    pub fn from_outcome(outcome: Outcome<E, A>) -> Self {
        match outcome {
            Outcome::Success(value) => Self::succeed(value),
            Outcome::Failure(error) => Self::raise(error),
        }
    }

    /// Lifts a `Result` into a program.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use effect_algebra::{Outcome, Program};
    ///
    /// let program: Program<(), String, i32> = Program::from_result("7".parse::<i32>())
    ///     .map_error(|error| error.to_string());
    /// assert_eq!(program.evaluate(&()), Outcome::Success(7));
    /// ```
    pub fn from_result(result: Result<A, E>) -> Self {
        Self::from_outcome(result.into())
    }

    // =========================================================================
    // Transformation
    // =========================================================================

    /// Applies `function` to the value of a successful program.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use effect_algebra::{Outcome, Program};
    ///
    /// let program: Program<(), String, i32> = Program::succeed(20).map(|value| value + 1);
    /// assert_eq!(program.evaluate(&()), Outcome::Success(21));
    /// ```
    pub fn map<B, F>(self, function: F) -> Program<R, E, B>
    where
        B: Data,
        F: Fn(A) -> B + Send + Sync + 'static,
    {
        self.sequence(move |value| Program::succeed(function(value)))
    }

    /// Applies `function` to the error of a failed program.
    pub fn map_error<E2, F>(self, function: F) -> Program<R, E2, A>
    where
        E2: Data,
        F: Fn(E) -> E2 + Send + Sync + 'static,
    {
        self.recover(move |error| Program::raise(function(error)), Program::succeed)
    }

    /// Alias of [`Program::sequence`].
    #[inline]
    pub fn flat_map<B, F>(self, continuation: F) -> Program<R, E, B>
    where
        B: Data,
        F: Fn(A) -> Program<R, E, B> + Send + Sync + 'static,
    {
        self.sequence(continuation)
    }

    /// Alias of [`Program::sequence`].
    #[inline]
    pub fn and_then<B, F>(self, continuation: F) -> Program<R, E, B>
    where
        B: Data,
        F: Fn(A) -> Program<R, E, B> + Send + Sync + 'static,
    {
        self.sequence(continuation)
    }

    /// Runs this program, discards its value, then runs `next`.
    pub fn then<B>(self, next: Program<R, E, B>) -> Program<R, E, B>
    where
        B: Data,
    {
        self.sequence(move |_| next.clone())
    }

    /// Runs this program then `other`, combining both values.
    ///
    /// The first failure wins; `other` does not run if this program fails.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use effect_algebra::{Outcome, Program};
    ///
    /// let left: Program<(), String, i32> = Program::succeed(2);
    /// let right: Program<(), String, i32> = Program::succeed(3);
    /// assert_eq!(
    ///     left.zip_with(right, |a, b| a * b).evaluate(&()),
    ///     Outcome::Success(6)
    /// );
    /// ```
    pub fn zip_with<B, C, F>(self, other: Program<R, E, B>, combine: F) -> Program<R, E, C>
    where
        B: Data,
        C: Data,
        F: Fn(A, B) -> C + Send + Sync + 'static,
    {
        let combine = Arc::new(combine);
        self.sequence(move |left| {
            let combine = Arc::clone(&combine);
            other
                .clone()
                .sequence(move |right| Program::succeed(combine(left.clone(), right)))
        })
    }

    // =========================================================================
    // Error Handling
    // =========================================================================

    /// Handles a failure with `handler`; a success passes through unchanged.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use effect_algebra::{Outcome, Program};
    ///
    /// let program: Program<(), String, i32> = Program::<(), String, i32>::raise("e".into())
    ///     .catch_all(|error| Program::succeed(error.len() as i32));
    /// assert_eq!(program.evaluate(&()), Outcome::Success(1));
    /// ```
    pub fn catch_all<E2, F>(self, handler: F) -> Program<R, E2, A>
    where
        E2: Data,
        F: Fn(E) -> Program<R, E2, A> + Send + Sync + 'static,
    {
        self.recover(handler, Program::succeed)
    }

    /// Alias of [`Program::recover`].
    #[inline]
    pub fn fold<E2, B, F, G>(self, on_error: F, on_success: G) -> Program<R, E2, B>
    where
        E2: Data,
        B: Data,
        F: Fn(E) -> Program<R, E2, B> + Send + Sync + 'static,
        G: Fn(A) -> Program<R, E2, B> + Send + Sync + 'static,
    {
        self.recover(on_error, on_success)
    }

    // =========================================================================
    // Resources
    // =========================================================================

    /// Treats this program as the acquisition of a resource, uses it, and
    /// always releases it.
    ///
    /// `release` receives the resource and the outcome of `use_resource`.
    /// The outcome of `use_resource` is returned, unless `release` itself
    /// fails, in which case its error is returned instead. If acquisition
    /// fails neither `use_resource` nor `release` runs.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use effect_algebra::{Outcome, Program};
    ///
    /// let program: Program<(), String, usize> = Program::succeed("file".to_string()).bracket(
    ///     |name: String| Program::raise(format!("cannot read {name}")),
    ///     |_, _| Program::unit(),
    /// );
    /// assert_eq!(
    ///     program.evaluate_safe(&()),
    ///     Outcome::Failure("cannot read file".to_string())
    /// );
    /// ```
    pub fn bracket<B, C, U, F>(self, use_resource: U, release: F) -> Program<R, E, B>
    where
        B: Data,
        C: Data,
        U: Fn(A) -> Program<R, E, B> + Send + Sync + 'static,
        F: Fn(A, Outcome<E, B>) -> Program<R, E, C> + Send + Sync + 'static,
    {
        let release = Arc::new(release);
        self.sequence(move |resource| {
            let release_on_error = Arc::clone(&release);
            let release_on_success = Arc::clone(&release);
            let resource_on_error = resource.clone();
            let resource_on_success = resource.clone();
            use_resource(resource).recover(
                move |error: E| {
                    release_on_error(resource_on_error.clone(), Outcome::Failure(error.clone()))
                        .sequence(move |_| Program::raise(error.clone()))
                },
                move |value: B| {
                    release_on_success(resource_on_success.clone(), Outcome::Success(value.clone()))
                        .sequence(move |_| Program::succeed(value.clone()))
                },
            )
        })
    }

    // =========================================================================
    // Environment
    // =========================================================================

    /// Runs this program inside a larger environment `R0`, narrowing it
    /// with `narrow` at evaluation time.
    ///
    /// The inner program runs on the trampolined evaluator, inside an
    /// `access` of the outer program.
    ///
    /// # Stack safety
    ///
    /// The inner program may be arbitrarily deep: it gets its own frame
    /// stack. Each `provide_some` that is entered while another one is
    /// still running costs one nested evaluator call on the native stack,
    /// so recursion *through* `provide_some` is bounded by the thread's
    /// stack. Narrow once, outside the recursion:
    ///
    /// ```rust
    /// use effect_algebra::{Outcome, Program};
    ///
    /// fn count_down(n: u64) -> Program<u64, String, u64> {
    ///     if n == 0 {
    ///         Program::access(|start: &u64| *start)
    ///     } else {
    ///         Program::succeed(n - 1).sequence(count_down)
    ///     }
    /// }
    ///
    /// let program: Program<(u64, bool), String, u64> =
    ///     count_down(100_000).provide_some(|pair: &(u64, bool)| pair.0);
    /// assert_eq!(program.evaluate_safe(&(7, true)), Outcome::Success(7));
    /// ```
    ///
    /// # Examples
    ///
    /// ```rust
    /// use effect_algebra::{Outcome, Program};
    ///
    /// struct Config {
    ///     port: u16,
    /// }
    ///
    /// let needs_port: Program<u16, String, String> = Program::access(|port: &u16| format!(":{port}"));
    /// let program: Program<Config, String, String> = needs_port.provide_some(|config: &Config| config.port);
    /// assert_eq!(program.evaluate(&Config { port: 80 }), Outcome::Success(":80".to_string()));
    /// ```
    pub fn provide_some<R0, F>(self, narrow: F) -> Program<R0, E, A>
    where
        R0: 'static,
        F: Fn(&R0) -> R + Send + Sync + 'static,
    {
        Program::access(move |outer: &R0| self.evaluate_safe(&narrow(outer)))
            .sequence(Program::<R0, E, A>::from_outcome)
    }

    /// Supplies the whole environment, leaving a program that ignores its own.
    ///
    /// # Stack safety
    ///
    /// Same as [`Program::provide_some`].
    pub fn provide<R0>(self, environment: R) -> Program<R0, E, A>
    where
        R: Data,
        R0: 'static,
    {
        self.provide_some(move |_: &R0| environment.clone())
    }
}

impl<R, A> Program<R, Infallible, A>
where
    R: 'static,
    A: Data,
{
    /// Gives a program that cannot fail any error type.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use effect_algebra::{Outcome, Program};
    /// use std::convert::Infallible;
    ///
    /// let total: Program<(), Infallible, i32> = Program::succeed(1);
    /// let program: Program<(), String, i32> = total.widen_error();
    /// assert_eq!(program.evaluate(&()), Outcome::Success(1));
    /// ```
    pub fn widen_error<E2>(self) -> Program<R, E2, A>
    where
        E2: Data,
    {
        self.map_error(|never| match never {})
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[rstest]
    fn test_unit_and_ask() {
        let unit: Program<(), String, ()> = Program::unit();
        let ask: Program<i32, String, i32> = Program::ask();

        assert_eq!(unit.evaluate(&()), Outcome::Success(()));
        assert_eq!(ask.evaluate(&9), Outcome::Success(9));
    }

    #[rstest]
    fn test_raise_with_is_deferred() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let program: Program<(), String, i32> = Program::raise_with(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            "late".to_string()
        });

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(program.evaluate_safe(&()), Outcome::Failure("late".to_string()));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[rstest]
    #[case(Outcome::Success(1))]
    #[case(Outcome::Failure("e".to_string()))]
    fn test_from_outcome_reproduces_outcome(#[case] outcome: Outcome<String, i32>) {
        let program: Program<(), String, i32> = Program::from_outcome(outcome.clone());
        assert_eq!(program.evaluate(&()), outcome);
    }

    #[rstest]
    fn test_map_error_leaves_success() {
        let program: Program<(), usize, i32> =
            Program::<(), String, i32>::succeed(3).map_error(|error| error.len());
        assert_eq!(program.evaluate(&()), Outcome::Success(3));

        let program: Program<(), usize, i32> =
            Program::<(), String, i32>::raise("four".into()).map_error(|error| error.len());
        assert_eq!(program.evaluate(&()), Outcome::Failure(4));
    }

    #[rstest]
    fn test_then_discards_first_value() {
        let program: Program<(), String, &str> = Program::succeed(1).then(Program::succeed("next"));
        assert_eq!(program.evaluate(&()), Outcome::Success("next"));
    }

    #[rstest]
    fn test_zip_with_stops_at_first_failure() {
        let ran = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&ran);
        let right: Program<(), String, i32> = Program::succeed_with(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            1
        });
        let program = Program::<(), String, i32>::raise("left".into()).zip_with(right, |a, b| a + b);

        assert_eq!(program.evaluate(&()), Outcome::Failure("left".to_string()));
        assert_eq!(ran.load(Ordering::SeqCst), 0);
    }

    fn recording_bracket(
        acquire: Program<(), String, i32>,
        use_result: Outcome<String, i32>,
        release_fails: bool,
    ) -> (Outcome<String, i32>, Vec<String>) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let use_log = Arc::clone(&log);
        let release_log = Arc::clone(&log);

        let program = acquire.bracket(
            move |resource| {
                use_log.lock().unwrap().push(format!("use {resource}"));
                Program::from_outcome(use_result.clone())
            },
            move |resource, outcome| {
                release_log
                    .lock()
                    .unwrap()
                    .push(format!("release {resource} after {outcome}"));
                if release_fails {
                    Program::raise("release failed".to_string())
                } else {
                    Program::unit()
                }
            },
        );

        let outcome = program.evaluate_safe(&());
        let entries = log.lock().unwrap().clone();
        (outcome, entries)
    }

    #[rstest]
    fn test_bracket_releases_after_success() {
        let (outcome, log) = recording_bracket(Program::succeed(1), Outcome::Success(10), false);

        assert_eq!(outcome, Outcome::Success(10));
        assert_eq!(log, vec!["use 1", "release 1 after Success(10)"]);
    }

    #[rstest]
    fn test_bracket_releases_after_failure_and_keeps_error() {
        let (outcome, log) =
            recording_bracket(Program::succeed(1), Outcome::Failure("used".into()), false);

        assert_eq!(outcome, Outcome::Failure("used".to_string()));
        assert_eq!(log, vec!["use 1", "release 1 after Failure(used)"]);
    }

    #[rstest]
    fn test_bracket_release_failure_overrides() {
        let (outcome, _) = recording_bracket(Program::succeed(1), Outcome::Success(10), true);
        assert_eq!(outcome, Outcome::Failure("release failed".to_string()));
    }

    #[rstest]
    fn test_bracket_skips_everything_when_acquire_fails() {
        let (outcome, log) =
            recording_bracket(Program::raise("no".into()), Outcome::Success(10), false);

        assert_eq!(outcome, Outcome::Failure("no".to_string()));
        assert!(log.is_empty());
    }

    #[rstest]
    fn test_provide_eliminates_environment() {
        let program: Program<i32, String, i32> = Program::access(|n: &i32| n * 2);
        let provided: Program<(), String, i32> = program.provide(21);
        assert_eq!(provided.evaluate(&()), Outcome::Success(42));
    }
}
