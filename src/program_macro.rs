//! Do-notation for building programs.
//!
//! The `program!` macro flattens nested [`Program::sequence`] calls into a
//! list of statements, with two statements of its own for the things most
//! programs do between binds: reading the environment and rejecting bad
//! values.
//!
//! # Syntax
//!
//! - `read pattern = accessor;` reads the environment through `accessor`
//!   (a `Fn(&R) -> T` closure) and binds the result
//! - `ensure condition, error;` continues only if `condition` holds, and
//!   otherwise raises `error`
//! - `pattern <= program;` runs `program` and binds its value
//! - `let pattern = expression;` binds a plain value
//! - a final expression, which must itself be a program
//!
//! Each bind becomes a `move` continuation. Continuations can run more than
//! once, so a bound value used by a later bind must be cloned (or be `Copy`)
//! where it is consumed. `error` is only evaluated when the condition fails.
//!
//! [`Program::sequence`]: crate::Program::sequence

/// Builds a program from do-notation.
///
/// # Examples
///
/// ```rust
/// use effect_algebra::{program, Outcome, Program};
///
/// struct Environment {
///     base: i32,
///     limit: i32,
/// }
///
/// let computation: Program<Environment, String, i32> = program! {
///     read base = |environment: &Environment| environment.base;
///     read limit = |environment: &Environment| environment.limit;
///     let doubled = base * 2;
///     ensure doubled <= limit, format!("{doubled} exceeds {limit}");
///     bonus <= Program::succeed(2);
///     Program::succeed(doubled + bonus)
/// };
///
/// assert_eq!(
///     computation.evaluate_safe(&Environment { base: 20, limit: 100 }),
///     Outcome::Success(42)
/// );
/// assert_eq!(
///     computation.evaluate(&Environment { base: 20, limit: 10 }),
///     Outcome::Failure("40 exceeds 10".to_string())
/// );
/// ```
#[macro_export]
macro_rules! program {
    // ==========================================================================
    // Read: read pattern = accessor; rest
    // ==========================================================================

    (read $pattern:ident = $accessor:expr ; $($rest:tt)+) => {
        $crate::Program::access($accessor).sequence(move |$pattern| {
            $crate::program!($($rest)+)
        })
    };

    (read ($($pattern:tt)*) = $accessor:expr ; $($rest:tt)+) => {
        $crate::Program::access($accessor).sequence(move |($($pattern)*)| {
            $crate::program!($($rest)+)
        })
    };

    // ==========================================================================
    // Guard: ensure condition, error; rest
    // ==========================================================================

    (ensure $condition:expr , $error:expr ; $($rest:tt)+) => {
        if $condition {
            $crate::program!($($rest)+)
        } else {
            $crate::Program::raise($error)
        }
    };

    // ==========================================================================
    // Let: let pattern = expression; rest
    // ==========================================================================

    (let $pattern:ident = $expr:expr ; $($rest:tt)+) => {
        {
            let $pattern = $expr;
            $crate::program!($($rest)+)
        }
    };

    (let ($($pattern:tt)*) = $expr:expr ; $($rest:tt)+) => {
        {
            let ($($pattern)*) = $expr;
            $crate::program!($($rest)+)
        }
    };

    // ==========================================================================
    // Bind: pattern <= program; rest
    // ==========================================================================

    ($pattern:ident <= $program:expr ; $($rest:tt)+) => {
        $program.sequence(move |$pattern| {
            $crate::program!($($rest)+)
        })
    };

    (($($pattern:tt)*) <= $program:expr ; $($rest:tt)+) => {
        $program.sequence(move |($($pattern)*)| {
            $crate::program!($($rest)+)
        })
    };

    (_ <= $program:expr ; $($rest:tt)+) => {
        $program.sequence(move |_| {
            $crate::program!($($rest)+)
        })
    };

    // ==========================================================================
    // Terminal
    // ==========================================================================

    ($result:expr) => {
        $result
    };
}
