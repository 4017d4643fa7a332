//! Fatal selector errors.
//!
//! Selector errors surface when a query runs, never silently: an
//! unrecognized pseudo-class or an unimplemented attribute operator aborts
//! the query instead of reporting "no match". The tree being queried is
//! already built and unaffected.

use thiserror::Error;

/// A selector could not be parsed or evaluated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectorError {
    /// The pseudo-class name is not in the registry.
    #[error("unknown pseudo-class ':{0}'")]
    UnknownPseudoClass(String),

    /// Only `=` is implemented; `^=`, `$=`, `*=`, `~=` and `|=` are not.
    #[error("attribute selector operator '{0}=' is not implemented")]
    UnsupportedOperator(char),

    /// The pseudo-class requires an argument (`:nth-child(2)`).
    #[error("missing argument to pseudo-class ':{0}'")]
    MissingArgument(String),

    /// `:nth-child` only accepts a plain integer.
    #[error("':nth-child' expects an integer argument, got '{0}'")]
    InvalidNthChild(String),
}
