//! Internal nodes with their intermediate types erased.
//!
//! `Sequence` and `Recover` both hide a source program whose value (and, for
//! `Recover`, error) type differs from the node's own. Each concrete node is
//! a generic struct that knows those types; the program enum only holds it
//! behind the object-safe [`Composite`] trait, which offers the three things
//! the rest of the crate needs without naming the hidden types:
//!
//! - `evaluate_direct`: recursive evaluation, for the direct evaluator;
//! - `unfold`: split into a frame and the source, for the trampoline;
//! - `detach_source`: hand the source out, for iterative teardown along
//!   source links.

use super::{Data, Program};
use crate::Outcome;
use crate::evaluate::direct;
use crate::evaluate::trampoline::{Arrow, Frame, Step, TypedArrow};
use std::sync::Arc;

/// A shared function producing the next program from a value.
pub(crate) type Continuation<T, R, E, A> = Arc<dyn Fn(T) -> Program<R, E, A> + Send + Sync>;

/// Object-safe view of an internal node.
pub(crate) trait Composite<R, E, A>: Send + Sync {
    /// Evaluates the node by recursing into its source.
    fn evaluate_direct(&self, environment: &R) -> Outcome<E, A>;

    /// Splits the node into the frame it leaves behind and its source.
    fn unfold(&self) -> Step<R>;

    /// Moves the source out of the node. Only called on the last owner.
    fn detach_source(&mut self) -> Option<Box<dyn Detach>>;
}

/// A program that can give up its source, so deep trees are dropped with a
/// loop instead of recursive drop glue.
///
/// Only source links are followed. Programs captured by a continuation or
/// handler closure drop with that closure, recursively.
pub(crate) trait Detach {
    fn detach(&mut self) -> Option<Box<dyn Detach>>;
}

impl<R, E, A> Detach for Program<R, E, A> {
    fn detach(&mut self) -> Option<Box<dyn Detach>> {
        match self {
            Self::Sequence(node) => node.detach_source(),
            Self::Recover(node) => node.detach_source(),
            Self::Succeed(_) | Self::Raise(_) | Self::Access(_) => None,
        }
    }
}

fn dismantle(mut detached: Option<Box<dyn Detach>>) {
    while let Some(mut program) = detached {
        detached = program.detach();
    }
}

// =============================================================================
// Sequence
// =============================================================================

pub(crate) struct Chain<R, E, T, A> {
    source: Option<Program<R, E, T>>,
    continuation: Continuation<T, R, E, A>,
}

impl<R, E, T, A> Chain<R, E, T, A> {
    pub(crate) const fn new(source: Program<R, E, T>, continuation: Continuation<T, R, E, A>) -> Self {
        Self {
            source: Some(source),
            continuation,
        }
    }

    fn source(&self) -> &Program<R, E, T> {
        self.source
            .as_ref()
            .unwrap_or_else(|| unreachable!("sequence node used after teardown"))
    }
}

impl<R, E, T, A> Composite<R, E, A> for Chain<R, E, T, A>
where
    R: 'static,
    E: Data,
    T: Data,
    A: Data,
{
    fn evaluate_direct(&self, environment: &R) -> Outcome<E, A> {
        match direct::evaluate(self.source(), environment) {
            Outcome::Success(value) => direct::evaluate(&(self.continuation)(value), environment),
            Outcome::Failure(error) => Outcome::Failure(error),
        }
    }

    fn unfold(&self) -> Step<R> {
        let continuation: Box<dyn Arrow<R>> =
            Box::new(TypedArrow::new(Arc::clone(&self.continuation)));
        Step::Nested {
            frame: Frame::Continuation(continuation),
            source: Box::new(self.source().clone()),
        }
    }

    fn detach_source(&mut self) -> Option<Box<dyn Detach>> {
        self.source
            .take()
            .map(|source| Box::new(source) as Box<dyn Detach>)
    }
}

/// The payload of a [`Program::Sequence`] node.
///
/// Holds the source program and its continuation; the source's value type
/// is not part of this type.
pub struct SequenceNode<R, E, A> {
    node: Arc<dyn Composite<R, E, A>>,
}

impl<R, E, A> SequenceNode<R, E, A> {
    pub(crate) fn new<N>(node: N) -> Self
    where
        N: Composite<R, E, A> + 'static,
    {
        Self {
            node: Arc::new(node),
        }
    }

    pub(crate) fn evaluate_direct(&self, environment: &R) -> Outcome<E, A> {
        self.node.evaluate_direct(environment)
    }

    pub(crate) fn unfold(&self) -> Step<R> {
        self.node.unfold()
    }

    fn detach_source(&mut self) -> Option<Box<dyn Detach>> {
        Arc::get_mut(&mut self.node)?.detach_source()
    }
}

impl<R, E, A> Clone for SequenceNode<R, E, A> {
    fn clone(&self) -> Self {
        Self {
            node: Arc::clone(&self.node),
        }
    }
}

impl<R, E, A> Drop for SequenceNode<R, E, A> {
    fn drop(&mut self) {
        dismantle(self.detach_source());
    }
}

// =============================================================================
// Recover
// =============================================================================

pub(crate) struct Fold<R, E0, T, E, A> {
    source: Option<Program<R, E0, T>>,
    on_error: Continuation<E0, R, E, A>,
    on_success: Continuation<T, R, E, A>,
}

impl<R, E0, T, E, A> Fold<R, E0, T, E, A> {
    pub(crate) const fn new(
        source: Program<R, E0, T>,
        on_error: Continuation<E0, R, E, A>,
        on_success: Continuation<T, R, E, A>,
    ) -> Self {
        Self {
            source: Some(source),
            on_error,
            on_success,
        }
    }

    fn source(&self) -> &Program<R, E0, T> {
        self.source
            .as_ref()
            .unwrap_or_else(|| unreachable!("recover node used after teardown"))
    }
}

impl<R, E0, T, E, A> Composite<R, E, A> for Fold<R, E0, T, E, A>
where
    R: 'static,
    E0: Data,
    T: Data,
    E: Data,
    A: Data,
{
    fn evaluate_direct(&self, environment: &R) -> Outcome<E, A> {
        let next = match direct::evaluate(self.source(), environment) {
            Outcome::Success(value) => (self.on_success)(value),
            Outcome::Failure(error) => (self.on_error)(error),
        };
        direct::evaluate(&next, environment)
    }

    fn unfold(&self) -> Step<R> {
        let on_error: Box<dyn Arrow<R>> = Box::new(TypedArrow::new(Arc::clone(&self.on_error)));
        let on_success: Box<dyn Arrow<R>> =
            Box::new(TypedArrow::new(Arc::clone(&self.on_success)));
        Step::Nested {
            frame: Frame::Recovery {
                on_error,
                on_success,
            },
            source: Box::new(self.source().clone()),
        }
    }

    fn detach_source(&mut self) -> Option<Box<dyn Detach>> {
        self.source
            .take()
            .map(|source| Box::new(source) as Box<dyn Detach>)
    }
}

/// The payload of a [`Program::Recover`] node.
///
/// Holds the source program and both handlers; the source's error and value
/// types are not part of this type.
pub struct RecoverNode<R, E, A> {
    node: Arc<dyn Composite<R, E, A>>,
}

impl<R, E, A> RecoverNode<R, E, A> {
    pub(crate) fn new<N>(node: N) -> Self
    where
        N: Composite<R, E, A> + 'static,
    {
        Self {
            node: Arc::new(node),
        }
    }

    pub(crate) fn evaluate_direct(&self, environment: &R) -> Outcome<E, A> {
        self.node.evaluate_direct(environment)
    }

    pub(crate) fn unfold(&self) -> Step<R> {
        self.node.unfold()
    }

    fn detach_source(&mut self) -> Option<Box<dyn Detach>> {
        Arc::get_mut(&mut self.node)?.detach_source()
    }
}

impl<R, E, A> Clone for RecoverNode<R, E, A> {
    fn clone(&self) -> Self {
        Self {
            node: Arc::clone(&self.node),
        }
    }
}

impl<R, E, A> Drop for RecoverNode<R, E, A> {
    fn drop(&mut self) {
        dismantle(self.detach_source());
    }
}
