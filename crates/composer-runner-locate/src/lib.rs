//! Discovery of the PHP interpreter and of an existing Composer executable
//!
//! [`RuntimeLocator`] answers "which interpreter, with which flags", and
//! [`BinaryLocator`] answers "is the tool already installed somewhere".
//! Neither ever installs anything; a missing binary is a normal result.

pub mod binary;
pub mod error;
pub mod interpreter;

pub use binary::{BinaryLocator, ancestor_dirs};
pub use error::LocateError;
pub use interpreter::{Interpreter, RuntimeLocator};
