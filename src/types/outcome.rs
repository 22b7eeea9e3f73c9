//! Three-valued completion type.
//!
//! The outcome of one logical execution is exactly one of:
//!
//! - `Ok(T)`: success with a value
//! - `Err(E)`: typed domain error, expected and recoverable
//! - `Terminated(Defect)`: fatal defect, outside the typed error channel
//!
//! These form a severity order: `Ok < Err < Terminated`. Every region
//! operator forwards all three kinds unchanged; none converts one kind into
//! another.

use crate::error::Defect;
use core::fmt;

/// The three-valued outcome of one logical execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T, E> {
    /// Success with a value.
    Ok(T),
    /// Typed domain error.
    Err(E),
    /// Fatal defect; the execution terminated abnormally.
    Terminated(Defect),
}

impl<T, E> Outcome<T, E> {
    /// Returns the severity level of this outcome (0 = Ok, 2 = Terminated).
    #[must_use]
    pub const fn severity(&self) -> u8 {
        match self {
            Self::Ok(_) => 0,
            Self::Err(_) => 1,
            Self::Terminated(_) => 2,
        }
    }

    /// Returns true if this outcome is `Ok`.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        matches!(self, Self::Ok(_))
    }

    /// Returns true if this outcome is `Err`.
    #[must_use]
    pub const fn is_err(&self) -> bool {
        matches!(self, Self::Err(_))
    }

    /// Returns true if this outcome is `Terminated`.
    #[must_use]
    pub const fn is_terminated(&self) -> bool {
        matches!(self, Self::Terminated(_))
    }

    /// Maps the success value using the provided function.
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Outcome<U, E> {
        match self {
            Self::Ok(v) => Outcome::Ok(f(v)),
            Self::Err(e) => Outcome::Err(e),
            Self::Terminated(d) => Outcome::Terminated(d),
        }
    }

    /// Maps the error value using the provided function.
    pub fn map_err<F2, G: FnOnce(E) -> F2>(self, g: G) -> Outcome<T, F2> {
        match self {
            Self::Ok(v) => Outcome::Ok(v),
            Self::Err(e) => Outcome::Err(g(e)),
            Self::Terminated(d) => Outcome::Terminated(d),
        }
    }

    /// Converts this outcome to a standard `Result`, folding both failure
    /// channels into [`Failure`].
    pub fn into_result(self) -> Result<T, Failure<E>> {
        match self {
            Self::Ok(v) => Ok(v),
            Self::Err(e) => Err(Failure::Err(e)),
            Self::Terminated(d) => Err(Failure::Terminated(d)),
        }
    }
}

/// The failure half of an [`Outcome`]: a typed error or a defect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Failure<E> {
    /// Typed domain error.
    Err(E),
    /// Fatal defect.
    Terminated(Defect),
}

impl<E: fmt::Display> fmt::Display for Failure<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Err(e) => write!(f, "error: {e}"),
            Self::Terminated(d) => write!(f, "{d}"),
        }
    }
}

impl<E: fmt::Debug + fmt::Display> std::error::Error for Failure<E> {}
