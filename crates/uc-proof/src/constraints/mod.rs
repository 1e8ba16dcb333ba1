//! Constraint families, one module per proof type.
//!
//! Every family evaluates all of its sub-checks in a fixed order so the
//! resulting claim always carries the full set of flags; the first failing
//! check becomes the [`Violation`](crate::claim::Violation).

pub mod economic;
pub mod quality;
pub mod route;
