use crate::ast;
use custom_error::custom_error;

custom_error! {
    #[derive(Clone, PartialEq)]
    pub RuntimeError

    UndefinedVariable{name: String} = "undefined variable '{name}'",
    UnsupportedOperands{left: &'static str, operator: ast::Operator, right: &'static str} = "unsupported operands: {left} {operator} {right}",
    UnsupportedNegation{type_name: &'static str} = "unsupported type for negation: {type_name}",
    NotAFunction{name: String, type_name: &'static str} = "'{name}' is not a mission, got {type_name}",
    NotNative{name: String, type_name: &'static str} = "'{name}' must be a native mission, got {type_name}",
    NotIndexable{type_name: &'static str} = "index operator not supported: {type_name}",
    InvalidIndexType{type_name: &'static str} = "array index must be a number, got {type_name}",
    NotIterable{type_name: &'static str} = "can only patrol through arrays, got {type_name}",
    NotAnArray{fn_name: &'static str, type_name: &'static str} = "argument to `{fn_name}` must be an array, got {type_name}",
    IndexOutOfBounds{index: f64, length: usize} = "array index {index} out of bounds for length {length}",
    IncorrectArity{fn_name: String, got: usize, want: usize} = "wrong number of arguments to `{fn_name}`. got={got}, want={want}",
    EmptyArray{fn_name: &'static str} = "cannot `{fn_name}` from an empty array",
    ReportOutsideMission = "report used outside of a mission",
    CallDepthExceeded{limit: usize} = "maximum mission call depth of {limit} exceeded",
    Output{message: String} = "failed to write output: {message}",
    Input{message: String} = "failed to read input: {message}",
}

/// The broad class a runtime failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum ErrorKind {
    NameError,
    TypeError,
    IndexError,
    ArityOrUnderflowError,
    UncaughtReport,
    RecursionError,
    IoError,
}

impl RuntimeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UndefinedVariable { .. } => ErrorKind::NameError,
            Self::UnsupportedOperands { .. }
            | Self::UnsupportedNegation { .. }
            | Self::NotAFunction { .. }
            | Self::NotNative { .. }
            | Self::NotIndexable { .. }
            | Self::InvalidIndexType { .. }
            | Self::NotIterable { .. }
            | Self::NotAnArray { .. } => ErrorKind::TypeError,
            Self::IndexOutOfBounds { .. } => ErrorKind::IndexError,
            Self::IncorrectArity { .. } | Self::EmptyArray { .. } => {
                ErrorKind::ArityOrUnderflowError
            }
            Self::ReportOutsideMission => ErrorKind::UncaughtReport,
            Self::CallDepthExceeded { .. } => ErrorKind::RecursionError,
            Self::Output { .. } | Self::Input { .. } => ErrorKind::IoError,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_messages_and_kinds() {
        let cases = vec![
            (
                RuntimeError::UndefinedVariable {
                    name: "ghost".to_owned(),
                },
                "undefined variable 'ghost'",
                ErrorKind::NameError,
            ),
            (
                RuntimeError::UnsupportedOperands {
                    left: "ARRAY",
                    operator: ast::Operator::Amplify,
                    right: "NUMBER",
                },
                "unsupported operands: ARRAY amplify NUMBER",
                ErrorKind::TypeError,
            ),
            (
                RuntimeError::IndexOutOfBounds {
                    index: 3.0,
                    length: 3,
                },
                "array index 3 out of bounds for length 3",
                ErrorKind::IndexError,
            ),
            (
                RuntimeError::EmptyArray { fn_name: "extract" },
                "cannot `extract` from an empty array",
                ErrorKind::ArityOrUnderflowError,
            ),
            (
                RuntimeError::ReportOutsideMission,
                "report used outside of a mission",
                ErrorKind::UncaughtReport,
            ),
            (
                RuntimeError::CallDepthExceeded { limit: 1000 },
                "maximum mission call depth of 1000 exceeded",
                ErrorKind::RecursionError,
            ),
        ];

        for (err, message, kind) in cases.into_iter() {
            assert_eq!(err.to_string(), message);
            assert_eq!(err.kind(), kind);
        }
    }
}
