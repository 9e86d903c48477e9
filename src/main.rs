use commandant::builtins::ConsolePrompt;
use commandant::repl;
use std::env;
use std::fs;
use std::process;

fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    // Only initialize if RUST_LOG is set
    if env::var("RUST_LOG").is_ok() {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_level(true)
                    .with_writer(std::io::stderr),
            )
            .with(EnvFilter::from_default_env())
            .init();
    }
}

fn run_json(path: &str) -> bool {
    let result = match fs::read_to_string(path) {
        Ok(source) => repl::run_with_output(&source, ConsolePrompt::on_stderr()),
        Err(err) => repl::RunResult {
            success: false,
            output: format!("Error: {}", err),
            error: Some(err.to_string()),
        },
    };
    match serde_json::to_string(&result) {
        Ok(json) => println!("{}", json),
        Err(err) => eprintln!("ERROR: {}", err),
    }
    result.success
}

fn main() {
    init_tracing();
    let args: Vec<String> = env::args().skip(1).collect();

    match args.as_slice() {
        [] => {
            println!("Commandant ready. Awaiting orders.");
            repl::start()
        }
        [path] if env::var("COMMANDANT_JSON").is_ok() => {
            if !run_json(path) {
                process::exit(1);
            }
        }
        [path] => {
            if let Err(err) = repl::run_file(path) {
                eprintln!("ERROR: {}", err);
                process::exit(1);
            }
        }
        _ => {
            eprintln!("Usage: commandant [script]");
            process::exit(64);
        }
    }
}
