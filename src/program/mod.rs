//! The program algebra.
//!
//! A [`Program<R, E, A>`] is an immutable description of a deferred
//! computation that reads an environment of type `R`, may fail with an error
//! of type `E`, and otherwise produces a value of type `A`. Building a
//! program never runs anything; evaluation happens only through
//! [`Program::evaluate`] or [`Program::evaluate_safe`].
//!
//! # Design
//!
//! ```text
//! Program<R, E, A> = Succeed(A)
//!                  | Raise(E)
//!                  | Access(&R -> A)
//!                  | Sequence(Program<R, E, T>, T -> Program<R, E, A>)
//!                  | Recover(Program<R, E0, T>, E0 -> Program<R, E, A>, T -> Program<R, E, A>)
//! ```
//!
//! The intermediate types `T` and `E0` of the two internal nodes are hidden
//! behind trait objects, so they never appear in the program's own type.
//! Internal nodes are reference counted: cloning a program is cheap and the
//! same program can be evaluated any number of times, from any thread.
//!
//! # Examples
//!
//! ```rust
//! use effect_algebra::{Outcome, Program};
//!
//! struct Environment {
//!     n: i32,
//! }
//!
//! let program = Program::access(|environment: &Environment| environment.n).sequence(|n| {
//!     if n > 0 {
//!         Program::raise("positive")
//!     } else {
//!         Program::succeed(format!("got {n}"))
//!     }
//! });
//!
//! assert_eq!(program.evaluate(&Environment { n: 1 }), Outcome::Failure("positive"));
//! assert_eq!(
//!     program.evaluate_safe(&Environment { n: -1 }),
//!     Outcome::Success("got -1".to_string())
//! );
//! ```

mod derived;
mod node;

pub use node::{RecoverNode, SequenceNode};

pub(crate) use node::Continuation;

use node::{Chain, Fold};
use std::fmt;
use std::sync::Arc;

/// Values and errors that can flow through a program.
///
/// Evaluation borrows the program, so leaf values and errors are cloned out
/// of it; programs are shareable across threads, so their contents must be
/// `Send + Sync`. Every type meeting those bounds implements `Data`.
pub trait Data: Clone + Send + Sync + 'static {}

impl<T: Clone + Send + Sync + 'static> Data for T {}

/// A function reading a value out of the environment.
pub type Accessor<R, A> = Arc<dyn Fn(&R) -> A + Send + Sync>;

/// An immutable description of a deferred, environment-dependent, fallible
/// computation.
///
/// # Type Parameters
///
/// * `R` - The environment the program reads
/// * `E` - The error the program may raise
/// * `A` - The value the program produces
///
/// # Laws
///
/// For every environment, both evaluators agree, and:
///
/// - **Left Identity**: `succeed(a).sequence(f) == f(a)`
/// - **Right Identity**: `m.sequence(succeed) == m`
/// - **Associativity**: `m.sequence(f).sequence(g) == m.sequence(|x| f(x).sequence(g))`
/// - **Short-circuit**: `raise(e).sequence(f) == raise(e)`
/// - **Catch**: `raise(e).catch_all(h) == h(e)`
pub enum Program<R, E, A> {
    /// Always succeeds with the value; ignores the environment.
    Succeed(A),
    /// Always fails with the error; ignores the environment.
    Raise(E),
    /// Reads the environment; never fails.
    Access(Accessor<R, A>),
    /// Runs a source program and feeds its value into a continuation.
    Sequence(SequenceNode<R, E, A>),
    /// Runs a source program and hands either outcome to a handler.
    Recover(RecoverNode<R, E, A>),
}

impl<R, E, A> Program<R, E, A>
where
    R: 'static,
    E: Data,
    A: Data,
{
    // =========================================================================
    // Primitive Constructors
    // =========================================================================

    /// Creates a program that always succeeds with `value`.
    ///
    /// Choose `E = Infallible` to make the absence of failure visible in the
    /// type.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use effect_algebra::{Outcome, Program};
    ///
    /// let program: Program<(), String, i32> = Program::succeed(42);
    /// assert_eq!(program.evaluate(&()), Outcome::Success(42));
    /// ```
    #[inline]
    pub const fn succeed(value: A) -> Self {
        Self::Succeed(value)
    }

    /// Creates a program that always fails with `error`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use effect_algebra::{Outcome, Program};
    ///
    /// let program: Program<(), &str, i32> = Program::raise("boom");
    /// assert_eq!(program.evaluate(&()), Outcome::Failure("boom"));
    /// ```
    #[inline]
    pub const fn raise(error: E) -> Self {
        Self::Raise(error)
    }

    /// Creates a program that applies `read` to the environment.
    ///
    /// `read` must be total. To fail based on the environment, read it and
    /// then `sequence` into [`Program::raise`].
    ///
    /// # Examples
    ///
    /// ```rust
    /// use effect_algebra::{Outcome, Program};
    ///
    /// let program: Program<String, (), usize> = Program::access(|text: &String| text.len());
    /// assert_eq!(program.evaluate(&"hello".to_string()), Outcome::Success(5));
    /// ```
    #[inline]
    pub fn access<F>(read: F) -> Self
    where
        F: Fn(&R) -> A + Send + Sync + 'static,
    {
        Self::Access(Arc::new(read))
    }

    // =========================================================================
    // Primitive Combinators
    // =========================================================================

    /// Sequences this program with a continuation.
    ///
    /// When evaluated, this program runs first. A failure propagates
    /// unchanged and `continuation` is never invoked; a success is fed into
    /// `continuation` and the resulting program runs with the same
    /// environment.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use effect_algebra::{Outcome, Program};
    ///
    /// let program: Program<(), String, i32> =
    ///     Program::succeed(20).sequence(|value| Program::succeed(value + 1));
    /// assert_eq!(program.evaluate_safe(&()), Outcome::Success(21));
    /// ```
    pub fn sequence<B, F>(self, continuation: F) -> Program<R, E, B>
    where
        B: Data,
        F: Fn(A) -> Program<R, E, B> + Send + Sync + 'static,
    {
        Program::Sequence(SequenceNode::new(Chain::new(self, Arc::new(continuation))))
    }

    /// Observes both outcomes of this program.
    ///
    /// A failure is handed to `on_error`, a success to `on_success`; the
    /// program returned by the chosen handler runs next. A handled failure
    /// is consumed and only resurfaces if the handler raises again.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use effect_algebra::{Outcome, Program};
    ///
    /// let program: Program<(), String, String> = Program::<(), &str, i32>::raise("bad")
    ///     .recover(
    ///         |error| Program::succeed(format!("recovered from {error}")),
    ///         |value| Program::succeed(value.to_string()),
    ///     );
    /// assert_eq!(
    ///     program.evaluate_safe(&()),
    ///     Outcome::Success("recovered from bad".to_string())
    /// );
    /// ```
    pub fn recover<E2, B, F, G>(self, on_error: F, on_success: G) -> Program<R, E2, B>
    where
        E2: Data,
        B: Data,
        F: Fn(E) -> Program<R, E2, B> + Send + Sync + 'static,
        G: Fn(A) -> Program<R, E2, B> + Send + Sync + 'static,
    {
        Program::Recover(RecoverNode::new(Fold::new(
            self,
            Arc::new(on_error),
            Arc::new(on_success),
        )))
    }
}

impl<R, E, A> Program<R, E, A> {
    /// Returns `true` for `Succeed`, `Raise` and `Access` nodes.
    #[inline]
    pub const fn is_leaf(&self) -> bool {
        matches!(self, Self::Succeed(_) | Self::Raise(_) | Self::Access(_))
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

impl<R, E: Clone, A: Clone> Clone for Program<R, E, A> {
    fn clone(&self) -> Self {
        match self {
            Self::Succeed(value) => Self::Succeed(value.clone()),
            Self::Raise(error) => Self::Raise(error.clone()),
            Self::Access(read) => Self::Access(Arc::clone(read)),
            Self::Sequence(node) => Self::Sequence(node.clone()),
            Self::Recover(node) => Self::Recover(node.clone()),
        }
    }
}

impl<R, E: fmt::Debug, A: fmt::Debug> fmt::Debug for Program<R, E, A> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Succeed(value) => formatter.debug_tuple("Succeed").field(value).finish(),
            Self::Raise(error) => formatter.debug_tuple("Raise").field(error).finish(),
            Self::Access(_) => formatter.write_str("Access(<function>)"),
            Self::Sequence(_) => formatter.write_str("Sequence(<source>, <continuation>)"),
            Self::Recover(_) => formatter.write_str("Recover(<source>, <on_error>, <on_success>)"),
        }
    }
}

static_assertions::assert_impl_all!(Program<(), String, i32>: Send, Sync, Clone);
static_assertions::assert_impl_all!(Program<std::rc::Rc<i32>, String, i32>: Send, Sync);
