use crate::scanning::SourceLocation;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CalcError {
    #[error("expected a {expected} token but found {found}")]
    wrong_variant {
        expected: &'static str,
        found: &'static str,
    },

    #[error("{0}: invalid character, '{1}', encountered")]
    invalid_character(SourceLocation, char),

    #[error("{0}: '{1}' is not a valid number")]
    invalid_number(SourceLocation, String),

    #[error("{0}: string is missing its closing '\"'")]
    unterminated_string(SourceLocation),

    #[error("{0}: could not find '{1}'")]
    could_not_find(SourceLocation, &'static str),

    #[error("{0}: the '{1}' operator is missing an operand")]
    missing_operand(SourceLocation, String),

    #[error("{0}: '{1}' is not an arithmetic operator")]
    invalid_operator(SourceLocation, String),

    #[error("{0}: did not expect '{1}'")]
    did_not_expect(SourceLocation, String),

    #[error("'{0}' is not a command, expected infix, postfix, or quit")]
    unknown_command(String),

    #[error("expression ended abruptly")]
    abrupt_end,

    #[error("could not read input: {0}")]
    io(#[from] std::io::Error),
}

/// Broad families of [`CalcError`], used to report what went wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// A token payload was requested from the wrong kind of token.
    contract,
    lexical,
    /// Unbalanced parentheses or a malformed postfix sequence.
    structural,
    input,
}

impl CalcError {
    pub fn class(&self) -> ErrorClass {
        use CalcError::*;
        match self {
            wrong_variant { .. } => ErrorClass::contract,
            invalid_character(..) | invalid_number(..) | unterminated_string(_) => {
                ErrorClass::lexical
            }
            could_not_find(..) | missing_operand(..) | invalid_operator(..) | did_not_expect(..) => {
                ErrorClass::structural
            }
            unknown_command(_) | abrupt_end | io(_) => ErrorClass::input,
        }
    }
}

pub type Result<T> = std::result::Result<T, CalcError>;
