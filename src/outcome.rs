//! Outcome type - the terminal result of evaluating a program.
//!
//! An [`Outcome<E, A>`] is either a `Success(A)` carrying the value a program
//! produced, or a `Failure(E)` carrying the typed error it raised. Exactly
//! one outcome is produced per evaluation, by either evaluator.
//!
//! # Examples
//!
//! ```rust
//! use effect_algebra::Outcome;
//!
//! let success: Outcome<String, i32> = Outcome::Success(42);
//! let failure: Outcome<String, i32> = Outcome::Failure("boom".to_string());
//!
//! assert!(success.is_success());
//! assert!(failure.is_failure());
//!
//! let described = failure.fold(
//!     |error| format!("failed with {error}"),
//!     |value| format!("succeeded with {value}"),
//! );
//! assert_eq!(described, "failed with boom");
//! ```

use std::convert::Infallible;
use std::fmt;

/// The result of evaluating a program: a value or a typed error.
///
/// # Type Parameters
///
/// * `E` - The error type carried by `Failure`
/// * `A` - The value type carried by `Success`
///
/// # Examples
///
/// ```rust
/// use effect_algebra::Outcome;
///
/// let outcome: Outcome<String, i32> = Outcome::Success(21);
/// assert_eq!(outcome.map(|value| value * 2), Outcome::Success(42));
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Outcome<E, A> {
    /// The program produced a value.
    Success(A),
    /// The program raised an error.
    Failure(E),
}

impl<E, A> Outcome<E, A> {
    // =========================================================================
    // Type Checking
    // =========================================================================

    /// Returns `true` if this is a `Success`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use effect_algebra::Outcome;
    ///
    /// let outcome: Outcome<&str, i32> = Outcome::Success(1);
    /// assert!(outcome.is_success());
    /// ```
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Returns `true` if this is a `Failure`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use effect_algebra::Outcome;
    ///
    /// let outcome: Outcome<&str, i32> = Outcome::Failure("error");
    /// assert!(outcome.is_failure());
    /// ```
    #[inline]
    pub const fn is_failure(&self) -> bool {
        matches!(self, Self::Failure(_))
    }

    // =========================================================================
    // Value Extraction
    // =========================================================================

    /// Converts the outcome into an `Option` of the success value.
    #[inline]
    pub fn success(self) -> Option<A> {
        match self {
            Self::Success(value) => Some(value),
            Self::Failure(_) => None,
        }
    }

    /// Converts the outcome into an `Option` of the failure error.
    #[inline]
    pub fn failure(self) -> Option<E> {
        match self {
            Self::Success(_) => None,
            Self::Failure(error) => Some(error),
        }
    }

    /// Borrows the contents of the outcome.
    #[inline]
    pub const fn as_ref(&self) -> Outcome<&E, &A> {
        match self {
            Self::Success(value) => Outcome::Success(value),
            Self::Failure(error) => Outcome::Failure(error),
        }
    }

    /// Converts the outcome into a standard `Result`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use effect_algebra::Outcome;
    ///
    /// let outcome: Outcome<String, i32> = Outcome::Success(42);
    /// assert_eq!(outcome.into_result(), Ok(42));
    /// ```
    #[inline]
    pub fn into_result(self) -> Result<A, E> {
        self.into()
    }

    // =========================================================================
    // Transformation
    // =========================================================================

    /// Applies a function to the success value, leaving a failure untouched.
    #[inline]
    pub fn map<B, F>(self, function: F) -> Outcome<E, B>
    where
        F: FnOnce(A) -> B,
    {
        match self {
            Self::Success(value) => Outcome::Success(function(value)),
            Self::Failure(error) => Outcome::Failure(error),
        }
    }

    /// Applies a function to the failure error, leaving a success untouched.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use effect_algebra::Outcome;
    ///
    /// let outcome: Outcome<&str, i32> = Outcome::Failure("bad");
    /// assert_eq!(outcome.map_failure(str::len), Outcome::Failure(3));
    /// ```
    #[inline]
    pub fn map_failure<E2, F>(self, function: F) -> Outcome<E2, A>
    where
        F: FnOnce(E) -> E2,
    {
        match self {
            Self::Success(value) => Outcome::Success(value),
            Self::Failure(error) => Outcome::Failure(function(error)),
        }
    }

    /// Collapses both cases into a single value.
    #[inline]
    pub fn fold<T, F, G>(self, on_failure: F, on_success: G) -> T
    where
        F: FnOnce(E) -> T,
        G: FnOnce(A) -> T,
    {
        match self {
            Self::Success(value) => on_success(value),
            Self::Failure(error) => on_failure(error),
        }
    }
}

impl<A> Outcome<Infallible, A> {
    /// Extracts the value of an outcome that cannot be a failure.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use effect_algebra::{Outcome, Program};
    /// use std::convert::Infallible;
    ///
    /// let program: Program<(), Infallible, i32> = Program::succeed(7);
    /// assert_eq!(program.evaluate_safe(&()).into_success(), 7);
    /// ```
    #[inline]
    pub fn into_success(self) -> A {
        match self {
            Self::Success(value) => value,
            Self::Failure(never) => match never {},
        }
    }
}

impl<E> Outcome<E, Infallible> {
    /// Extracts the error of an outcome that cannot be a success.
    #[inline]
    pub fn into_failure(self) -> E {
        match self {
            Self::Success(never) => match never {},
            Self::Failure(error) => error,
        }
    }
}

// =============================================================================
// Debug and Display Implementations
// =============================================================================

impl<E: fmt::Debug, A: fmt::Debug> fmt::Debug for Outcome<E, A> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success(value) => formatter.debug_tuple("Success").field(value).finish(),
            Self::Failure(error) => formatter.debug_tuple("Failure").field(error).finish(),
        }
    }
}

impl<E: fmt::Display, A: fmt::Display> fmt::Display for Outcome<E, A> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success(value) => write!(formatter, "Success({value})"),
            Self::Failure(error) => write!(formatter, "Failure({error})"),
        }
    }
}

// =============================================================================
// From Implementations
// =============================================================================

impl<E, A> From<Result<A, E>> for Outcome<E, A> {
    /// `Ok(a)` becomes `Success(a)`, and `Err(e)` becomes `Failure(e)`.
    #[inline]
    fn from(result: Result<A, E>) -> Self {
        match result {
            Ok(value) => Self::Success(value),
            Err(error) => Self::Failure(error),
        }
    }
}

impl<E, A> From<Outcome<E, A>> for Result<A, E> {
    /// `Success(a)` becomes `Ok(a)`, and `Failure(e)` becomes `Err(e)`.
    #[inline]
    fn from(outcome: Outcome<E, A>) -> Self {
        match outcome {
            Outcome::Success(value) => Ok(value),
            Outcome::Failure(error) => Err(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Outcome::Success(1), true)]
    #[case(Outcome::Failure("error"), false)]
    fn test_outcome_tag(#[case] outcome: Outcome<&str, i32>, #[case] expected_success: bool) {
        assert_eq!(outcome.is_success(), expected_success);
        assert_eq!(outcome.is_failure(), !expected_success);
    }

    #[rstest]
    fn test_success_and_failure_extraction() {
        let success: Outcome<&str, i32> = Outcome::Success(42);
        let failure: Outcome<&str, i32> = Outcome::Failure("error");

        assert_eq!(success.success(), Some(42));
        assert_eq!(success.failure(), None);
        assert_eq!(failure.success(), None);
        assert_eq!(failure.failure(), Some("error"));
    }

    #[rstest]
    fn test_map_leaves_failure_untouched() {
        let failure: Outcome<&str, i32> = Outcome::Failure("error");
        assert_eq!(failure.map(|value| value + 1), Outcome::Failure("error"));
    }

    #[rstest]
    fn test_result_conversion_roundtrip() {
        let ok: Result<i32, String> = Ok(42);
        let outcome: Outcome<String, i32> = ok.into();
        assert_eq!(outcome.clone().into_result(), Ok(42));

        let err: Result<i32, String> = Err("error".to_string());
        let outcome: Outcome<String, i32> = err.into();
        assert_eq!(Result::from(outcome), Err("error".to_string()));
    }

    #[rstest]
    fn test_debug_and_display() {
        let success: Outcome<String, i32> = Outcome::Success(3);
        let failure: Outcome<String, i32> = Outcome::Failure("boom".to_string());

        assert_eq!(format!("{success:?}"), "Success(3)");
        assert_eq!(format!("{failure:?}"), "Failure(\"boom\")");
        assert_eq!(format!("{failure}"), "Failure(boom)");
    }

    #[rstest]
    fn test_infallible_extraction() {
        let success: Outcome<Infallible, i32> = Outcome::Success(5);
        let failure: Outcome<&str, Infallible> = Outcome::Failure("only");

        assert_eq!(success.into_success(), 5);
        assert_eq!(failure.into_failure(), "only");
    }
}
