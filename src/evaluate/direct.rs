//! The direct, recursive evaluator.
//!
//! This evaluator is the reference semantics: every other evaluator must
//! produce the same outcome for every program and environment. Each nested
//! `Sequence` or `Recover` costs one native call frame (through the node's
//! `evaluate_direct`), so deeply nested programs can exhaust the thread's
//! stack. Use the trampolined evaluator for those.

use crate::Outcome;
use crate::program::{Data, Program};

/// Evaluates `program` by structural recursion.
pub(crate) fn evaluate<R, E, A>(program: &Program<R, E, A>, environment: &R) -> Outcome<E, A>
where
    R: 'static,
    E: Data,
    A: Data,
{
    match program {
        Program::Succeed(value) => Outcome::Success(value.clone()),
        Program::Raise(error) => Outcome::Failure(error.clone()),
        Program::Access(read) => Outcome::Success(read(environment)),
        Program::Sequence(node) => node.evaluate_direct(environment),
        Program::Recover(node) => node.evaluate_direct(environment),
    }
}
