//! minicc-drv - Compiler driver.
//!
//! Orchestrates the pipeline: read the source, lex, parse, analyze, build
//! blocks or emit IR depending on the selected stage, and write the result to
//! the chosen output. Every failure class maps onto a fixed exit code so
//! scripts can tell them apart:
//!
//! | code | meaning |
//! |------|-----------------------------|
//! | 0    | success |
//! | 1    | missing input / bad usage |
//! | 2    | input file does not exist |
//! | 3    | conflicting stage flags |
//! | 4    | read or write error |
//! | 77   | parser error |
//! | 88   | semantic error |
//! | 99   | emitter error |

use anyhow::Context;
use minicc_util::{Handler, Stage};
use std::path::PathBuf;
use std::process::ExitCode;
use thiserror::Error;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Which stage the compilation stops after.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    /// Dump tokens.
    Lex,
    /// Dump the AST.
    Yacc,
    /// Dump the sentence stream.
    Analyze,
    /// Dump base blocks and their successor edges.
    Cfg,
    /// Emit IR (explicitly requested).
    Ir,
    /// Full pipeline to IR; the default.
    All,
}

/// One driver invocation.
#[derive(Clone, Debug)]
pub struct Config {
    pub input: PathBuf,
    pub output: Option<PathBuf>,
    pub action: Action,
    pub json: bool,
}

/// A parsed command line.
#[derive(Clone, Debug)]
pub enum Command {
    Compile(Config),
    Version,
}

/// Driver failure, carrying its exit code.
#[derive(Debug, Error)]
pub enum DriverError {
    #[error("no input file")]
    MissingInput,

    #[error("{0} not exist!")]
    InputNotFound(String),

    #[error("too many action args")]
    ConflictingActions,

    #[error("unrecognized argument {0}")]
    Usage(String),

    #[error(transparent)]
    Io(#[from] anyhow::Error),

    /// Syntax error; the diagnostic has already been printed.
    #[error("syntax error")]
    Parse,

    /// Semantic errors; the diagnostics have already been printed.
    #[error("semantic error")]
    Semantic,

    /// Emitter invariant violation; the diagnostic has already been printed.
    #[error("emitter error")]
    Emit,
}

impl DriverError {
    pub fn exit_code(&self) -> u8 {
        match self {
            DriverError::MissingInput | DriverError::Usage(_) => 1,
            DriverError::InputNotFound(_) => 2,
            DriverError::ConflictingActions => 3,
            DriverError::Io(_) => 4,
            DriverError::Parse => 77,
            DriverError::Semantic => 88,
            DriverError::Emit => 99,
        }
    }
}

/// Entry point used by the `minicc` binary.
pub fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = match parse_args(&args) {
        Ok(command) => command,
        Err(e) => return fail(e),
    };
    match command {
        Command::Version => {
            println!("v{VERSION}");
            ExitCode::SUCCESS
        }
        Command::Compile(config) => match run(&config) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => fail(e),
        },
    }
}

fn fail(e: DriverError) -> ExitCode {
    // Pipeline failures already reported themselves on stdout.
    if !matches!(e, DriverError::Parse | DriverError::Semantic | DriverError::Emit) {
        eprintln!("error: {e}");
    }
    ExitCode::from(e.exit_code())
}

/// Parses the command line.
pub fn parse_args(args: &[String]) -> Result<Command, DriverError> {
    let mut input: Option<PathBuf> = None;
    let mut output: Option<PathBuf> = None;
    let mut json = false;
    let mut actions: Vec<Action> = Vec::new();

    let mut iter = args.iter().peekable();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-l" | "--lex" => actions.push(Action::Lex),
            "-y" | "--yacc" => actions.push(Action::Yacc),
            "-a" | "--analyze" => actions.push(Action::Analyze),
            "-c" | "--cfg" => actions.push(Action::Cfg),
            "-i" | "--ir" => actions.push(Action::Ir),
            "-j" | "--json" => json = true,
            "-v" | "--version" => return Ok(Command::Version),
            "-o" => {
                // An omitted value keeps the default (stdout).
                if iter.peek().is_some_and(|next| !next.starts_with('-')) {
                    output = Some(PathBuf::from(iter.next().unwrap()));
                }
            }
            flag if flag.starts_with('-') => return Err(DriverError::Usage(flag.to_string())),
            positional => {
                if input.is_some() {
                    return Err(DriverError::Usage(positional.to_string()));
                }
                input = Some(PathBuf::from(positional));
            }
        }
    }

    if actions.len() > 1 {
        return Err(DriverError::ConflictingActions);
    }
    let action = actions.pop().unwrap_or(Action::All);
    let input = input.ok_or(DriverError::MissingInput)?;
    Ok(Command::Compile(Config {
        input,
        output,
        action,
        json,
    }))
}

/// Runs one compilation according to `config`.
pub fn run(config: &Config) -> Result<(), DriverError> {
    if !config.input.exists() {
        return Err(DriverError::InputNotFound(
            config.input.display().to_string(),
        ));
    }
    let source = std::fs::read_to_string(&config.input)
        .with_context(|| format!("can't read {}", config.input.display()))?;

    let handler = Handler::new();

    let tokens = minicc_lex::tokenize(&source);
    if config.action == Action::Lex {
        let text = if config.json {
            pretty(&serde_json::json!({ "tokens": tokens }))?
        } else {
            tokens
                .iter()
                .map(|t| t.to_string())
                .collect::<Vec<_>>()
                .join("\n")
        };
        return write_output(config, &text);
    }

    let program = match minicc_par::parse(tokens) {
        Ok(program) => program,
        Err(e) => {
            handler.error(Stage::Yacc, e.line, e.message);
            return Err(DriverError::Parse);
        }
    };
    if config.action == Action::Yacc {
        let text = if config.json {
            pretty(&serde_json::json!({ "root": program }))?
        } else {
            format!("{program:#?}")
        };
        return write_output(config, &text);
    }

    let analysis = minicc_sem::analyze(&program, &handler);
    if handler.has_errors() {
        return Err(DriverError::Semantic);
    }
    if config.action == Action::Analyze {
        let text = if config.json {
            pretty(&serde_json::json!({ "sentences": analysis.sentences }))?
        } else {
            analysis
                .sentences
                .iter()
                .map(|s| format!("{s:?}"))
                .collect::<Vec<_>>()
                .join("\n")
        };
        return write_output(config, &text);
    }

    if config.action == Action::Cfg {
        let blocks = minicc_mir::build_blocks(&analysis.sentences);
        let text = if config.json {
            pretty(&serde_json::json!({ "blocks": blocks }))?
        } else {
            blocks
                .iter()
                .map(|b| format!("{} -> {}", b.label, b.successors.join(", ")))
                .collect::<Vec<_>>()
                .join("\n")
        };
        return write_output(config, &text);
    }

    let ir = match minicc_gen::emit(&analysis.sentences) {
        Ok(ir) => ir,
        Err(e) => {
            handler.error(Stage::Ir, e.line(), e.to_string());
            return Err(DriverError::Emit);
        }
    };
    write_output(config, &ir)
}

fn pretty(value: &serde_json::Value) -> Result<String, DriverError> {
    serde_json::to_string_pretty(value)
        .context("can't serialize dump")
        .map_err(DriverError::Io)
}

fn write_output(config: &Config, text: &str) -> Result<(), DriverError> {
    match &config.output {
        Some(path) => {
            let mut data = text.to_string();
            if !data.ends_with('\n') {
                data.push('\n');
            }
            std::fs::write(path, data)
                .with_context(|| format!("can't write {}", path.display()))?;
        }
        None => println!("{text}"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn default_action_is_full_pipeline() {
        match parse_args(&args(&["prog.c"])).unwrap() {
            Command::Compile(config) => {
                assert_eq!(config.action, Action::All);
                assert!(!config.json);
                assert!(config.output.is_none());
            }
            other => panic!("expected compile, got {other:?}"),
        }
    }

    #[test]
    fn stage_flags_conflict() {
        let err = parse_args(&args(&["prog.c", "--lex", "--ir"])).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn missing_input_is_an_error() {
        let err = parse_args(&args(&["--lex"])).unwrap_err();
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn output_flag_takes_a_value() {
        match parse_args(&args(&["prog.c", "-o", "out.ll"])).unwrap() {
            Command::Compile(config) => {
                assert_eq!(config.output.unwrap(), PathBuf::from("out.ll"));
            }
            other => panic!("expected compile, got {other:?}"),
        }
    }

    #[test]
    fn bare_output_flag_keeps_stdout() {
        match parse_args(&args(&["prog.c", "-o"])).unwrap() {
            Command::Compile(config) => assert!(config.output.is_none()),
            other => panic!("expected compile, got {other:?}"),
        }
    }

    #[test]
    fn version_wins() {
        assert!(matches!(
            parse_args(&args(&["-v"])).unwrap(),
            Command::Version
        ));
    }

    #[test]
    fn unknown_flag_is_usage_error() {
        let err = parse_args(&args(&["prog.c", "--wat"])).unwrap_err();
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn missing_file_maps_to_exit_two() {
        let config = Config {
            input: PathBuf::from("definitely/not/here.c"),
            output: None,
            action: Action::All,
            json: false,
        };
        let err = run(&config).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
