pub mod ast;
pub mod builtins;
mod environment;
mod error;
pub mod evaluator;
mod lexer;
mod parser;
pub mod repl;
mod stack;
mod token;
pub mod value;

use std::io::Write;

pub use ast::Program;
pub use error::Error;
pub use evaluator::interpret;
pub use lexer::{tokenize, LexError, Lexer};
pub use parser::{parse, ParseError, Parser};
pub use token::{Token, TokenKind, TokenType};
pub use value::{ErrorKind, HostFunction, HostFunctions, RuntimeError, Value};

/// Tokenizes, parses and interprets `source`, writing `shout` output to
/// `output`.
pub fn run(
    source: &str,
    host_functions: HostFunctions,
    output: &mut dyn Write,
) -> Result<(), Error> {
    let tokens = tokenize(source)?;
    let program = parse(&tokens)?;
    interpret(&program, host_functions, output)?;
    Ok(())
}
