//! Profile validation shared by the risk calculators.
//!
//! Each calculator declares the fields it cannot work without and calls
//! `validate_profile` with that set before touching any value.

mod validator;

pub use validator::*;
