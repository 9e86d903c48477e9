use crate::builtins::{self, ConsolePrompt, Prompt};
use crate::error::Error;
use serde::Serialize;
use std::fs;
use std::io::{self, BufRead, Write};

static PROMPT: &str = "commandant> ";

/// Reads one line at a time and runs each as its own program.
pub fn start() {
    let stdin = io::stdin();
    loop {
        print!("{}", PROMPT);
        let _ = io::stdout().flush();
        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) | Err(_) => return,
            Ok(_) => {}
        }
        if line.trim().is_empty() {
            continue;
        }

        let mut stdout = io::stdout();
        match crate::run(&line, builtins::standard(ConsolePrompt::new()), &mut stdout) {
            Ok(()) => {}
            Err(err @ Error::Lex { .. }) | Err(err @ Error::Parse { .. }) => {
                println!("\t{}", err)
            }
            Err(err) => println!("ERROR: {}", err),
        }
    }
}

pub fn run_file(path: &str) -> Result<(), Error> {
    let source = fs::read_to_string(path)?;
    tracing::debug!(path, bytes = source.len(), "running file");
    let mut stdout = io::stdout();
    crate::run(&source, builtins::standard(ConsolePrompt::new()), &mut stdout)
}

/// Outcome of a captured run, serialized for the JSON runner.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunResult {
    pub success: bool,
    pub output: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Runs `source` with its output captured instead of printed.
pub fn run_with_output<P: Prompt + 'static>(source: &str, prompt: P) -> RunResult {
    let mut buffer = Vec::new();
    let result = crate::run(source, builtins::standard(prompt), &mut buffer);

    match result {
        Ok(()) => {
            let printed = String::from_utf8_lossy(&buffer);
            RunResult {
                success: true,
                output: printed.strip_suffix('\n').unwrap_or(&printed).to_owned(),
                error: None,
            }
        }
        Err(err) => RunResult {
            success: false,
            output: format!("Error: {}", err),
            error: Some(err.to_string()),
        },
    }
}
