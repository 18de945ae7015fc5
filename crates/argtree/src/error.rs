use thiserror::Error;

use crate::value::OptionKind;

/// Everything that can go wrong while turning argv into a resolved tree.
///
/// Messages mirror the diagnostics printed by [`crate::ArgParser::parse_or_exit`],
/// which wraps them as `Error: <message>.`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("{option} is not a recognised option")]
    UnrecognizedOption { option: String },

    #[error("'{name}' is not a recognised command")]
    UnrecognizedCommand { name: String },

    #[error("missing argument for the {option} option")]
    MissingOptionValue { option: String },

    #[error("invalid format for boolean flag {option}")]
    FlagTakesNoValue { option: String },

    #[error("cannot parse '{literal}' as {expected}")]
    MalformedNumericLiteral { literal: String, expected: OptionKind },

    #[error("'{literal}' is out of range")]
    OutOfRangeNumericLiteral { literal: String },

    #[error("the help command requires an argument")]
    MissingHelpTarget,

    /// Only produced by [`crate::ArgParser::try_option`]; the panicking
    /// getters use the same message.
    #[error("'{name}' is not a registered option")]
    UnknownRegisteredName { name: String },
}

impl ParseError {
    pub(crate) fn unrecognized_option(prefix: &str, name: &str) -> Self {
        Self::UnrecognizedOption {
            option: format!("{prefix}{name}"),
        }
    }

    pub(crate) fn missing_value(prefix: &str, name: &str) -> Self {
        Self::MissingOptionValue {
            option: format!("{prefix}{name}"),
        }
    }

    pub(crate) fn malformed(literal: &str, expected: OptionKind) -> Self {
        Self::MalformedNumericLiteral {
            literal: literal.to_string(),
            expected,
        }
    }

    pub(crate) fn out_of_range(literal: &str) -> Self {
        Self::OutOfRangeNumericLiteral {
            literal: literal.to_string(),
        }
    }
}

pub type ParseResult<T> = Result<T, ParseError>;
