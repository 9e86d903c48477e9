use crate::lexer::LexError;
use crate::parser::ParseError;
use crate::value::RuntimeError;
use custom_error::custom_error;

custom_error! {
    /// Any failure from reading, lexing, parsing or running a program.
    pub Error

    Lex{source: LexError} = "{source}",
    Parse{source: ParseError} = "{source}",
    Runtime{source: RuntimeError} = "{source}",
    Io{source: std::io::Error} = "{source}",
}
