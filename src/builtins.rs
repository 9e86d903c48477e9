use crate::value::*;
use lazy_static::lazy_static;
use std::cell::RefCell;
use std::collections::HashMap;
use std::convert::TryFrom;
use std::io::{self, BufRead, Write};

pub type Builtin = fn(Vec<Value>) -> Result<Value>;

fn take_args<const N: usize>(fn_name: &str, args: Vec<Value>) -> Result<[Value; N]> {
    let got = args.len();
    <[Value; N]>::try_from(args).map_err(|_| RuntimeError::IncorrectArity {
        fn_name: fn_name.to_owned(),
        got,
        want: N,
    })
}

fn expect_array(fn_name: &'static str, value: Value) -> Result<Array> {
    match value {
        Value::Array(array) => Ok(array),
        obj => Err(RuntimeError::NotAnArray {
            fn_name,
            type_name: obj.type_name(),
        }),
    }
}

/// Checks a numeric position against `limit` (exclusive), then truncates it.
/// Negative positions are rejected before truncation, so `-0.5` is out of
/// bounds rather than zero.
pub(crate) fn expect_position(value: &Value, limit: usize) -> Result<usize> {
    let index = match value {
        Value::Number(n) => *n,
        obj => {
            return Err(RuntimeError::InvalidIndexType {
                type_name: obj.type_name(),
            })
        }
    };
    // NaN fails the sign check
    if index >= 0.0 && index.trunc() < limit as f64 {
        Ok(index.trunc() as usize)
    } else {
        Err(RuntimeError::IndexOutOfBounds {
            index,
            length: limit,
        })
    }
}

fn deploy(args: Vec<Value>) -> Result<Value> {
    let [array, element] = take_args::<2>("deploy", args)?;
    let array = expect_array("deploy", array)?;
    let mut elements = array.borrow_mut();
    elements.push(element);
    Ok(elements.len().into())
}

fn extract(args: Vec<Value>) -> Result<Value> {
    let [array] = take_args::<1>("extract", args)?;
    let array = expect_array("extract", array)?;
    let popped = array.borrow_mut().pop();
    popped.ok_or(RuntimeError::EmptyArray { fn_name: "extract" })
}

fn headcount(args: Vec<Value>) -> Result<Value> {
    let [array] = take_args::<1>("headcount", args)?;
    let array = expect_array("headcount", array)?;
    let len = array.borrow().len();
    Ok(len.into())
}

fn reinforce_at(args: Vec<Value>) -> Result<Value> {
    let [array, index, element] = take_args::<3>("reinforce_at", args)?;
    let array = expect_array("reinforce_at", array)?;
    let mut elements = array.borrow_mut();
    let len = elements.len();
    // inserting at the end is allowed
    let position = expect_position(&index, len + 1).map_err(|err| match err {
        RuntimeError::IndexOutOfBounds { index, .. } => {
            RuntimeError::IndexOutOfBounds { index, length: len }
        }
        err => err,
    })?;
    elements.insert(position, element);
    Ok(elements.len().into())
}

fn evacuate_at(args: Vec<Value>) -> Result<Value> {
    let [array, index] = take_args::<2>("evacuate_at", args)?;
    let array = expect_array("evacuate_at", array)?;
    let mut elements = array.borrow_mut();
    if elements.is_empty() {
        return Err(RuntimeError::EmptyArray {
            fn_name: "evacuate_at",
        });
    }
    let position = expect_position(&index, elements.len())?;
    Ok(elements.remove(position))
}

lazy_static! {
    pub static ref BUILTINS: HashMap<&'static str, Builtin> = vec![
        ("deploy", deploy as Builtin),
        ("extract", extract as Builtin),
        ("headcount", headcount as Builtin),
        ("reinforce_at", reinforce_at as Builtin),
        ("evacuate_at", evacuate_at as Builtin),
    ]
    .into_iter()
    .collect();
}

/// Source of answers for `interrogate`.
pub trait Prompt {
    /// Shows `prompt` and reads one line; `None` at end of input.
    fn ask(&mut self, prompt: &str) -> io::Result<Option<String>>;
}

/// Prompts on the terminal and reads from stdin.
pub struct ConsolePrompt {
    to_stderr: bool,
}

impl ConsolePrompt {
    pub fn new() -> Self {
        Self { to_stderr: false }
    }

    /// Writes prompts to stderr, leaving stdout to the program's output.
    pub fn on_stderr() -> Self {
        Self { to_stderr: true }
    }
}

impl Default for ConsolePrompt {
    fn default() -> Self {
        Self::new()
    }
}

impl Prompt for ConsolePrompt {
    fn ask(&mut self, prompt: &str) -> io::Result<Option<String>> {
        if self.to_stderr {
            let mut err = io::stderr();
            write!(err, "{}", prompt)?;
            err.flush()?;
        } else {
            let mut out = io::stdout();
            write!(out, "{}", prompt)?;
            out.flush()?;
        }
        read_answer(&mut io::stdin().lock())
    }
}

/// Answers from any reader, echoing prompts to `prompts`.
pub struct ScriptedPrompt<R, W> {
    input: R,
    prompts: W,
}

impl<R: BufRead, W: Write> ScriptedPrompt<R, W> {
    pub fn new(input: R, prompts: W) -> Self {
        Self { input, prompts }
    }
}

impl<R: BufRead, W: Write> Prompt for ScriptedPrompt<R, W> {
    fn ask(&mut self, prompt: &str) -> io::Result<Option<String>> {
        write!(self.prompts, "{}", prompt)?;
        self.prompts.flush()?;
        read_answer(&mut self.input)
    }
}

fn read_answer<R: BufRead>(input: &mut R) -> io::Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    let trimmed = line.trim_end_matches(|c| c == '\n' || c == '\r');
    Ok(Some(trimmed.to_owned()))
}

pub fn interrogate<P: Prompt + 'static>(prompt: P) -> HostFunction {
    let prompt = RefCell::new(prompt);
    HostFunction::new("interrogate", move |args| {
        let [question] = take_args::<1>("interrogate", args)?;
        let answer = prompt
            .borrow_mut()
            .ask(&question.to_string())
            .map_err(|e| RuntimeError::Input {
                message: e.to_string(),
            })?;
        Ok(answer.map_or(Value::Null, Value::from))
    })
}

/// The array primitives plus `interrogate` backed by `prompt`.
pub fn standard<P: Prompt + 'static>(prompt: P) -> HostFunctions {
    let mut functions: HostFunctions = BUILTINS
        .iter()
        .map(|(name, builtin)| (name.to_string(), HostFunction::new(name, *builtin)))
        .collect();
    functions.insert("interrogate".to_owned(), interrogate(prompt));
    functions
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Cursor;

    fn numbers(ns: &[f64]) -> Value {
        ns.iter().map(|n| Value::from(*n)).collect::<Vec<_>>().into()
    }

    fn call(name: &str, args: Vec<Value>) -> Result<Value> {
        BUILTINS[name](args)
    }

    #[test]
    fn test_deploy_and_extract_share_the_array() {
        let squad = numbers(&[1.0, 2.0]);

        assert_eq!(call("deploy", vec![squad.clone(), Value::from(3.0)]), Ok(Value::from(3.0)));
        assert_eq!(squad.to_string(), "[1, 2, 3]");

        assert_eq!(call("extract", vec![squad.clone()]), Ok(Value::from(3.0)));
        assert_eq!(call("headcount", vec![squad.clone()]), Ok(Value::from(2.0)));
    }

    #[test]
    fn test_insert_and_remove_at() {
        let squad = numbers(&[1.0, 3.0]);

        assert_eq!(
            call("reinforce_at", vec![squad.clone(), Value::from(1.0), Value::from(2.0)]),
            Ok(Value::from(3.0))
        );
        assert_eq!(
            call("reinforce_at", vec![squad.clone(), Value::from(3.7), Value::from(4.0)]),
            Ok(Value::from(4.0))
        );
        assert_eq!(squad.to_string(), "[1, 2, 3, 4]");

        assert_eq!(
            call("evacuate_at", vec![squad.clone(), Value::from(0.0)]),
            Ok(Value::from(1.0))
        );
        assert_eq!(squad.to_string(), "[2, 3, 4]");
    }

    #[test]
    fn test_misuse() {
        let empty = numbers(&[]);
        let cases = vec![
            (
                "deploy",
                vec![Value::from("squad"), Value::from(1.0)],
                RuntimeError::NotAnArray {
                    fn_name: "deploy",
                    type_name: "STRING",
                },
            ),
            (
                "extract",
                vec![empty.clone()],
                RuntimeError::EmptyArray { fn_name: "extract" },
            ),
            (
                "evacuate_at",
                vec![empty.clone(), Value::from(0.0)],
                RuntimeError::EmptyArray {
                    fn_name: "evacuate_at",
                },
            ),
            (
                "evacuate_at",
                vec![numbers(&[1.0]), Value::from(1.0)],
                RuntimeError::IndexOutOfBounds {
                    index: 1.0,
                    length: 1,
                },
            ),
            (
                "reinforce_at",
                vec![numbers(&[1.0]), Value::from(-1.0), Value::from(0.0)],
                RuntimeError::IndexOutOfBounds {
                    index: -1.0,
                    length: 1,
                },
            ),
            (
                "reinforce_at",
                vec![numbers(&[1.0]), Value::from(2.0), Value::from(0.0)],
                RuntimeError::IndexOutOfBounds {
                    index: 2.0,
                    length: 1,
                },
            ),
            (
                "evacuate_at",
                vec![numbers(&[1.0]), Value::from(-0.5)],
                RuntimeError::IndexOutOfBounds {
                    index: -0.5,
                    length: 1,
                },
            ),
            (
                "reinforce_at",
                vec![numbers(&[1.0]), Value::from(-0.5), Value::from(0.0)],
                RuntimeError::IndexOutOfBounds {
                    index: -0.5,
                    length: 1,
                },
            ),
            (
                "evacuate_at",
                vec![numbers(&[1.0]), Value::Null],
                RuntimeError::InvalidIndexType { type_name: "NULL" },
            ),
            (
                "headcount",
                vec![],
                RuntimeError::IncorrectArity {
                    fn_name: "headcount".to_owned(),
                    got: 0,
                    want: 1,
                },
            ),
        ];

        for (name, args, expected) in cases.into_iter() {
            assert_eq!(call(name, args), Err(expected));
        }
    }

    #[test]
    fn test_interrogate_reads_lines() {
        let input = Cursor::new("Bravo\r\nCharlie\n");
        let interrogate = interrogate(ScriptedPrompt::new(input, io::sink()));

        assert_eq!(
            interrogate.call(vec![Value::from("Callsign? ")]),
            Ok(Value::from("Bravo"))
        );
        assert_eq!(
            interrogate.call(vec![Value::from("Again? ")]),
            Ok(Value::from("Charlie"))
        );
        assert_eq!(interrogate.call(vec![Value::from("More? ")]), Ok(Value::Null));
    }

    #[test]
    fn test_standard_table() {
        let functions = standard(ScriptedPrompt::new(Cursor::new(""), io::sink()));
        let mut names: Vec<&str> = functions.keys().map(String::as_str).collect();
        names.sort_unstable();
        assert_eq!(
            names,
            vec![
                "deploy",
                "evacuate_at",
                "extract",
                "headcount",
                "interrogate",
                "reinforce_at"
            ]
        );
    }
}
