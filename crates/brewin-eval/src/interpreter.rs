//! Program loading and the source-to-execution pipeline.

use crate::config::EvalConfig;
use crate::error::{EvalResult, RunError};
use crate::evaluator::Evaluator;
use crate::host::Host;
use crate::registry::FunctionRegistry;
use brewin_lexer::Lexer;
use brewin_parser::Parser;
use brewin_types::ast::{FunctionDecl, Program};
use brewin_types::{CompileErrors, SourceFile};
use std::rc::Rc;

/// A loaded program, ready to run.
///
/// Loading validates everything that can be checked before execution:
/// no duplicate (name, arity) pairs and a well-formed `main`.
#[derive(Debug)]
pub struct Interpreter {
    registry: FunctionRegistry,
    main: Rc<FunctionDecl>,
    config: EvalConfig,
}

impl Interpreter {
    pub fn new(program: &Program) -> EvalResult<Self> {
        Self::with_config(program, EvalConfig::default())
    }

    pub fn with_config(program: &Program, config: EvalConfig) -> EvalResult<Self> {
        let registry = FunctionRegistry::from_program(program)?;
        let main = registry.main()?;
        Ok(Self {
            registry,
            main,
            config,
        })
    }

    pub fn registry(&self) -> &FunctionRegistry {
        &self.registry
    }

    pub fn config(&self) -> EvalConfig {
        self.config
    }

    /// Execute `main`. Output already emitted stays emitted when an error
    /// stops the run.
    pub fn run(&self, host: &mut dyn Host) -> EvalResult<()> {
        tracing::debug!(max_call_depth = self.config.max_call_depth, "running main");
        let mut evaluator = Evaluator::new(&self.registry, host, self.config);
        evaluator.call_entry(&self.main)?;
        Ok(())
    }
}

/// Lex and parse `source`, collecting syntax errors from both stages.
pub fn parse_source(source: &str, file_name: &str) -> Result<Program, CompileErrors> {
    let source_file = SourceFile::new(file_name, source);
    let lexed = Lexer::new(&source_file).lex();
    let mut errors = lexed.errors;
    let parsed = Parser::new(lexed.tokens, &source_file).parse();
    errors.extend(parsed.errors);
    match parsed.program {
        Some(program) if !errors.has_errors() => Ok(program),
        _ => Err(errors),
    }
}

/// Parse and load without executing.
pub fn check_source(source: &str, file_name: &str) -> Result<Program, RunError> {
    let program = parse_source(source, file_name)?;
    Interpreter::new(&program)?;
    Ok(program)
}

/// Parse, load and run a program against `host`.
pub fn run_source(
    source: &str,
    file_name: &str,
    host: &mut dyn Host,
    config: EvalConfig,
) -> Result<(), RunError> {
    let program = parse_source(source, file_name)?;
    let interpreter = Interpreter::with_config(&program, config)?;
    interpreter.run(host)?;
    Ok(())
}
