pub mod formatter;
pub mod outcome;

use std::io::{self, BufRead, Write};

use crate::{
    interpreter::{context::BufferedContext, environment::Environment, TreeWalkEvaluator},
    lexer::{tokenize, LexicalError, LexicalErrorKind, Span},
    parser::{error::ParseFailure, Parser},
};
use formatter::{BasicFormatter, OutcomeFormatter};
pub use outcome::{Outcome, Stage};

pub const PROMPT: &str = ">> ";
pub const CONTINUATION_PROMPT: &str = ".. ";
/// Inputs that end the session when entered at the primary prompt.
pub const EXIT_DIRECTIVES: [&str; 2] = [":quit", ":q"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    AwaitingInput,
    /// A unit is pending and ran out of input at `pending`.
    Accumulating { pending: Span },
    Processing,
    Terminated,
}

/// An interactive read-process-report loop over one input/output stream pair.
///
/// The session owns a single [`Environment`] for its whole lifetime, so
/// bindings made by one input unit are visible to every later one.
pub struct Session<R, W> {
    input: R,
    output: W,
    environment: Environment,
    evaluator: TreeWalkEvaluator,
    context: BufferedContext,
    formatter: Box<dyn OutcomeFormatter>,
    state: SessionState,
    unit: String,
}

impl<R: BufRead, W: Write> Session<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            environment: Environment::new(),
            evaluator: TreeWalkEvaluator::new(),
            context: BufferedContext::new(),
            formatter: Box::new(BasicFormatter),
            state: SessionState::AwaitingInput,
            unit: String::new(),
        }
    }

    pub fn with_formatter(mut self, formatter: impl OutcomeFormatter + 'static) -> Self {
        self.formatter = Box::new(formatter);
        self
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    pub fn into_output(self) -> W {
        self.output
    }

    fn transition(&mut self, next: SessionState) {
        tracing::trace!(from = ?self.state, to = ?next, "session transition");
        self.state = next;
    }

    /// Runs until end of input or an exit directive.
    ///
    /// Only failures of the streams themselves are returned. Every pipeline
    /// failure is rendered and the loop carries on.
    pub fn run(&mut self) -> io::Result<()> {
        while self.state != SessionState::Terminated {
            self.step()?;
        }
        self.output.flush()
    }

    /// Prompts for and handles one raw line of input.
    pub fn step(&mut self) -> io::Result<()> {
        let prompt = match self.state {
            SessionState::Terminated => return Ok(()),
            SessionState::Accumulating { .. } => CONTINUATION_PROMPT,
            SessionState::AwaitingInput | SessionState::Processing => PROMPT,
        };
        write!(self.output, "{prompt}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            if let SessionState::Accumulating { pending } = self.state {
                let unit = std::mem::take(&mut self.unit);
                self.report(&unit, &unfinished(&unit, pending))?;
            }
            tracing::debug!("end of input");
            self.transition(SessionState::Terminated);
            return Ok(());
        }

        if self.state == SessionState::AwaitingInput {
            let trimmed = line.trim();
            if EXIT_DIRECTIVES.contains(&trimmed) {
                tracing::debug!(directive = trimmed, "exit requested");
                self.transition(SessionState::Terminated);
                return Ok(());
            }
            if trimmed.is_empty() {
                return Ok(());
            }
        }

        self.unit.push_str(&line);
        self.transition(SessionState::Processing);
        let unit = std::mem::take(&mut self.unit);
        let outcome = self.process(&unit);

        match outcome {
            Outcome::Incomplete(pending) => {
                self.write_program_output()?;
                self.unit = unit;
                self.transition(SessionState::Accumulating { pending });
            }
            outcome => {
                self.report(&unit, &outcome)?;
                self.transition(SessionState::AwaitingInput);
            }
        }
        Ok(())
    }

    /// Pushes one input unit through lexing, parsing and evaluation.
    ///
    /// Lex and parse failures leave the environment untouched. A runtime
    /// failure keeps whatever the unit bound before the failing statement.
    pub fn process(&mut self, unit: &str) -> Outcome {
        let tokens = match tokenize(unit) {
            Ok(tokens) => tokens,
            Err(LexicalError {
                kind: LexicalErrorKind::UnclosedString,
                span,
            }) => {
                tracing::debug!("string literal continues past the unit");
                return Outcome::Incomplete(span);
            }
            Err(error) => {
                tracing::debug!(code = error.code(), "lexing failed");
                return Outcome::LexError(error);
            }
        };

        let program = match Parser::new(unit, tokens).parse() {
            Ok(program) => program,
            Err(ParseFailure::NeedsMoreInput { span }) => {
                tracing::debug!("unit is incomplete");
                return Outcome::Incomplete(span);
            }
            Err(ParseFailure::Structural(error)) => {
                tracing::debug!(code = error.code(), "parsing failed");
                return Outcome::ParseError(error);
            }
        };
        tracing::debug!(statements = program.len(), "parsed unit");

        let outcome = match self
            .evaluator
            .evaluate(&program, &mut self.environment, &mut self.context)
        {
            Ok(value) => Outcome::Value(value),
            Err(error) => {
                tracing::debug!(code = error.code(), "evaluation failed");
                Outcome::RuntimeError(error)
            }
        };

        self.environment.collect_garbage();
        outcome
    }

    fn write_program_output(&mut self) -> io::Result<()> {
        let printed = self.context.take();
        self.output.write_all(printed.as_bytes())
    }

    /// Writes any pending program output followed by the rendered `outcome`.
    pub fn report(&mut self, unit: &str, outcome: &Outcome) -> io::Result<()> {
        self.write_program_output()?;
        if let Some(rendered) = self.formatter.format(unit, outcome) {
            writeln!(self.output, "{rendered}")?;
        }
        Ok(())
    }
}

/// The diagnostic for a unit that was still open when input ended.
///
/// An unclosed string stays a lexical error; anything else is an unexpected
/// end of input at `pending`.
pub fn unfinished(unit: &str, pending: Span) -> Outcome {
    match tokenize(unit) {
        Err(error) => Outcome::LexError(error),
        Ok(_) => {
            let error = ParseFailure::NeedsMoreInput { span: pending }.into_error();
            Outcome::ParseError(error)
        }
    }
}

/// Runs an interactive session over `input` and `output` until end of input or
/// an exit directive.
pub fn start_session(input: impl BufRead, output: impl Write) -> io::Result<()> {
    Session::new(input, output).run()
}
