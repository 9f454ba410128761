//! # effect-algebra
//!
//! A small algebra of deferred, environment-dependent, fallible programs,
//! with two evaluators that agree on every program.
//!
//! ## Overview
//!
//! - **Program**: [`Program<R, E, A>`] describes a computation that reads an
//!   environment `R`, may fail with `E`, and otherwise produces `A`. It is
//!   built from five primitives: `succeed`, `raise`, `access`, `sequence`
//!   and `recover`.
//! - **Outcome**: [`Outcome<E, A>`] is the result of evaluating a program.
//! - **Evaluators**: [`Program::evaluate`] recurses over the program, while
//!   [`Program::evaluate_safe`] runs in bounded native stack however deeply
//!   the program is nested (recursion through `provide_some` excepted).
//! - **Derived combinators**: `map`, `map_error`, `catch_all`, `zip_with`,
//!   `bracket`, `provide_some` and more, all defined on top of the
//!   primitives.
//! - **Do-notation**: the [`program!`] macro.
//!
//! ## Feature Flags
//!
//! - `tracing` (default): evaluation events through the `tracing` crate
//! - `serde`: `Serialize` and `Deserialize` for [`Outcome`] and [`Statistics`]
//! - `full`: enable all features
//!
//! ## Example
//!
//! ```rust
//! use effect_algebra::prelude::*;
//!
//! fn safe_divide(numerator: i32) -> Program<i32, String, i32> {
//!     Program::access(|divisor: &i32| *divisor).sequence(move |divisor| {
//!         if divisor == 0 {
//!             Program::raise("division by zero".to_string())
//!         } else {
//!             Program::succeed(numerator / divisor)
//!         }
//!     })
//! }
//!
//! let program: Program<i32, String, i32> = safe_divide(10).catch_all(|_| Program::succeed(0));
//!
//! assert_eq!(program.evaluate(&2), Outcome::Success(5));
//! assert_eq!(program.evaluate_safe(&0), Outcome::Success(0));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
// Note: Disabling redundant_closure_for_method_calls due to clippy 0.1.92 panic bug
#![allow(clippy::redundant_closure_for_method_calls)]

/// Prelude module for convenient imports.
///
/// # Usage
///
/// ```rust
/// use effect_algebra::prelude::*;
/// ```
pub mod prelude {
    pub use crate::evaluate::Statistics;
    pub use crate::outcome::Outcome;
    pub use crate::program;
    pub use crate::program::{Data, Program};
}

pub mod evaluate;
pub mod outcome;
pub mod program;

mod program_macro;

pub use evaluate::Statistics;
pub use outcome::Outcome;
pub use program::{Accessor, Data, Program, RecoverNode, SequenceNode};
