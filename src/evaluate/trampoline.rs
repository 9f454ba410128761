//! The stack-safe, trampolined evaluator.
//!
//! Instead of recursing into the sources of `Sequence` and `Recover`, the
//! evaluator keeps the pending combinators in an explicit frame stack and
//! runs a single loop over a cursor that is either descending into a
//! program or ascending with a settled result:
//!
//! ```text
//! Descending(Sequence(source, k))      => push Continuation(k), descend into source
//! Descending(Recover(source, h, k))    => push Recovery(h, k),  descend into source
//! Descending(leaf)                     => Ascending(result of the leaf)
//! Ascending(Success(v)) + Continuation => Descending(k(v))
//! Ascending(Failure(e)) + Continuation => Ascending(Failure(e)), frame skipped
//! Ascending(Success(v)) + Recovery     => Descending(k(v))
//! Ascending(Failure(e)) + Recovery     => Descending(h(e))
//! Ascending(result)     + no frame     => done
//! ```
//!
//! Values crossing a frame have different types at every level, so they
//! travel as `Box<dyn Any>` and each frame's [`TypedArrow`] downcasts them
//! back before calling the user's function.

use super::Statistics;
use crate::Outcome;
use crate::program::{Continuation, Data, Program};
use smallvec::SmallVec;
use std::any::Any;

const FRAME_INLINE_CAPACITY: usize = 8;

/// A settled result whose value and error types have been erased.
pub(crate) type Erased = Outcome<Box<dyn Any>, Box<dyn Any>>;

// =============================================================================
// Erased Programs
// =============================================================================

/// One descent step of an erased program.
pub(crate) enum Step<R> {
    /// The program was a leaf and produced a result.
    Settled(Erased),
    /// The program was an internal node.
    Nested {
        frame: Frame<R>,
        source: Box<dyn Descend<R>>,
    },
}

/// A program whose error and value types have been erased.
pub(crate) trait Descend<R> {
    fn descend(self: Box<Self>, environment: &R) -> Step<R>;
}

impl<R, E, A> Descend<R> for Program<R, E, A>
where
    R: 'static,
    E: Data,
    A: Data,
{
    fn descend(self: Box<Self>, environment: &R) -> Step<R> {
        match *self {
            Self::Succeed(value) => Step::Settled(Outcome::Success(erase(value))),
            Self::Raise(error) => Step::Settled(Outcome::Failure(erase(error))),
            Self::Access(read) => Step::Settled(Outcome::Success(erase(read(environment)))),
            Self::Sequence(node) => node.unfold(),
            Self::Recover(node) => node.unfold(),
        }
    }
}

fn erase<T: 'static>(value: T) -> Box<dyn Any> {
    Box::new(value)
}

// =============================================================================
// Frames
// =============================================================================

/// A type-erased continuation: takes a value of the hidden input type and
/// produces the next program.
pub(crate) trait Arrow<R> {
    fn apply(self: Box<Self>, input: Box<dyn Any>) -> Box<dyn Descend<R>>;
}

pub(crate) struct TypedArrow<T, R, E, A> {
    function: Continuation<T, R, E, A>,
}

impl<T, R, E, A> TypedArrow<T, R, E, A> {
    pub(crate) const fn new(function: Continuation<T, R, E, A>) -> Self {
        Self { function }
    }
}

impl<T, R, E, A> Arrow<R> for TypedArrow<T, R, E, A>
where
    T: 'static,
    R: 'static,
    E: Data,
    A: Data,
{
    fn apply(self: Box<Self>, input: Box<dyn Any>) -> Box<dyn Descend<R>> {
        let value = *input
            .downcast::<T>()
            .expect("Type mismatch in frame application");
        Box::new((self.function)(value))
    }
}

/// A pending combinator waiting for the result of its source.
pub(crate) enum Frame<R> {
    /// Left by a `Sequence`: applied on success, skipped on failure.
    Continuation(Box<dyn Arrow<R>>),
    /// Left by a `Recover`: always applied, to the handler matching the result.
    Recovery {
        on_error: Box<dyn Arrow<R>>,
        on_success: Box<dyn Arrow<R>>,
    },
}

// =============================================================================
// Evaluation Loop
// =============================================================================

enum Cursor<R> {
    Descending(Box<dyn Descend<R>>),
    Ascending(Erased),
}

/// Evaluates `program` with an explicit frame stack.
///
/// # Panics
///
/// Panics if a value crossing a frame does not have the type the frame
/// expects. The program constructors make this impossible for well-typed
/// programs.
pub(crate) fn evaluate<R, E, A>(
    program: &Program<R, E, A>,
    environment: &R,
) -> (Outcome<E, A>, Statistics)
where
    R: 'static,
    E: Data,
    A: Data,
{
    let mut frames: SmallVec<[Frame<R>; FRAME_INLINE_CAPACITY]> = SmallVec::new();
    let mut statistics = Statistics::default();
    let root: Box<dyn Descend<R>> = Box::new(program.clone());
    let mut cursor = Cursor::Descending(root);

    let settled = loop {
        statistics.steps += 1;
        cursor = match cursor {
            Cursor::Descending(current) => {
                statistics.nodes_visited += 1;
                match current.descend(environment) {
                    Step::Settled(result) => Cursor::Ascending(result),
                    Step::Nested { frame, source } => {
                        frames.push(frame);
                        statistics.frames_pushed += 1;
                        statistics.max_frame_depth = statistics.max_frame_depth.max(frames.len());
                        Cursor::Descending(source)
                    }
                }
            }
            Cursor::Ascending(result) => match (frames.pop(), result) {
                (None, result) => break result,
                (Some(Frame::Continuation(continuation)), Outcome::Success(value)) => {
                    Cursor::Descending(continuation.apply(value))
                }
                (Some(Frame::Continuation(_)), Outcome::Failure(error)) => {
                    statistics.frames_skipped += 1;
                    #[cfg(feature = "tracing")]
                    tracing::trace!(depth = frames.len(), "continuation frame skipped by failure");
                    Cursor::Ascending(Outcome::Failure(error))
                }
                (Some(Frame::Recovery { on_success, .. }), Outcome::Success(value)) => {
                    Cursor::Descending(on_success.apply(value))
                }
                (Some(Frame::Recovery { on_error, .. }), Outcome::Failure(error)) => {
                    #[cfg(feature = "tracing")]
                    tracing::trace!(depth = frames.len(), "recovery frame handling failure");
                    Cursor::Descending(on_error.apply(error))
                }
            },
        };
    };

    #[cfg(feature = "tracing")]
    tracing::debug!(
        steps = statistics.steps,
        nodes_visited = statistics.nodes_visited,
        frames_pushed = statistics.frames_pushed,
        frames_skipped = statistics.frames_skipped,
        max_frame_depth = statistics.max_frame_depth,
        success = settled.is_success(),
        "trampolined evaluation finished"
    );

    (reify(settled), statistics)
}

fn reify<E: 'static, A: 'static>(settled: Erased) -> Outcome<E, A> {
    match settled {
        Outcome::Success(value) => Outcome::Success(
            *value
                .downcast::<A>()
                .expect("Final value type mismatch"),
        ),
        Outcome::Failure(error) => Outcome::Failure(
            *error
                .downcast::<E>()
                .expect("Final error type mismatch"),
        ),
    }
}
