//! Reads lines of infix or postfix arithmetic, converts infix to postfix with
//! the shunting-yard algorithm, and evaluates the postfix form.

#![allow(nonstandard_style)]

pub mod calculator;
pub mod error_handling;
pub mod evaluating;
pub mod parsing;
pub mod scanning;

pub use calculator::{evaluate_infix, evaluate_postfix, Calculator, Command, Evaluation, Mode};
pub use error_handling::{CalcError, ErrorClass, Result};
pub use scanning::{Scanner, SourceLocation, Token, TokenKind, TokenSource};
