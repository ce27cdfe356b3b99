use clap::{Parser, Subcommand, ValueEnum};
use color_eyre::eyre::Result;
use std::io::{self, Write};
use std::path::PathBuf;
use std::{fs::read_to_string, process::ExitCode};

#[derive(Debug, Parser)]
#[clap(name = "rif", version)]
pub struct CLArgs {
    #[clap(subcommand)]
    pub routine: Option<RifCommand>,
    /// How diagnostics are rendered.
    #[clap(long = "diagnostics", value_enum, default_value = "basic", global = true)]
    pub diagnostics: DiagnosticFormat,
}

#[derive(Debug, Subcommand)]
pub enum RifCommand {
    /// Start an interactive session (the default).
    Repl,
    Tokenize {
        path: PathBuf,
        #[clap(long = "format", value_enum, default_value = "basic")]
        format: TokenFormat,
    },
    Parse {
        path: PathBuf,
        #[clap(long = "format", value_enum, default_value = "sexpr")]
        format: ProgramFormat,
    },
    Run {
        path: PathBuf,
    },
}

#[derive(Debug, Clone, ValueEnum)]
pub enum TokenFormat {
    Debug,
    Basic,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ProgramFormat {
    Debug,
    #[clap(name = "sexpr")]
    SExpr,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum DiagnosticFormat {
    Basic,
    Pretty,
}

fn main() -> ExitCode {
    rif_main().expect("Encountered an error!")
}

fn rif_main() -> Result<ExitCode> {
    color_eyre::install().expect("Can't fail at first call!");
    init_tracing();
    let args = CLArgs::parse();
    let code = match args.routine.unwrap_or(RifCommand::Repl) {
        RifCommand::Repl => {
            repl(args.diagnostics)?;
            ExitCode::SUCCESS
        }
        RifCommand::Tokenize { path, format } => {
            tracing::info!(?path, "tokenizing");
            let src = read_to_string(path)?;
            exit_code(tokenize(&src, &format), 65)
        }
        RifCommand::Parse { path, format } => {
            tracing::info!(?path, "parsing");
            let src = read_to_string(path)?;
            exit_code(parse(&src, &format), 65)
        }
        RifCommand::Run { path } => {
            tracing::info!(?path, "running");
            let src = read_to_string(&path)?;
            run(&src, &path, args.diagnostics)?
        }
    };
    Ok(code)
}

/// Installs a stderr subscriber, but only when `RUST_LOG` asks for one.
fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    if std::env::var("RUST_LOG").is_ok() {
        let filter = EnvFilter::from_default_env();
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(io::stderr)
                    .with_target(true)
                    .with_level(true),
            )
            .with(filter)
            .init();
    }
}

fn exit_code(succeeded: bool, failure: u8) -> ExitCode {
    if succeeded {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(failure)
    }
}

fn current_user() -> String {
    std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "there".into())
}

fn repl(diagnostics: DiagnosticFormat) -> Result<()> {
    use rif::session::{
        formatter::{BasicFormatter, PrettyFormatter},
        Session,
    };

    let stdin = io::stdin().lock();
    let mut stdout = io::stdout().lock();
    writeln!(
        stdout,
        "Hello {}! Welcome to the Rif programming language!",
        current_user()
    )?;

    let session = Session::new(stdin, stdout);
    let mut session = match diagnostics {
        DiagnosticFormat::Basic => session.with_formatter(BasicFormatter),
        DiagnosticFormat::Pretty => session.with_formatter(PrettyFormatter::default()),
    };
    session.run()?;
    Ok(())
}

fn tokenize(src: &str, format: &TokenFormat) -> bool {
    use rif::lexer::formatter::{BasicFormatter, DebugFormatter, ToFormatter, TokenFormatter};
    use rif::lexer::{Lexer, TokenKind};

    let mut lexer = Lexer::new(src);
    let formatter: Box<dyn TokenFormatter + '_> = match format {
        TokenFormat::Debug => Box::new(ToFormatter::<DebugFormatter>::create_formatter(&lexer)),
        TokenFormat::Basic => Box::new(ToFormatter::<BasicFormatter>::create_formatter(&lexer)),
    };
    loop {
        match lexer.next_token() {
            Ok(token) => {
                println!("{}", formatter.format(&token));
                if matches!(token.kind, TokenKind::Eof) {
                    return true;
                }
            }
            Err(error) => {
                eprintln!("{}", formatter.format_lexical_error(&error));
                return false;
            }
        }
    }
}

fn parse(src: &str, format: &ProgramFormat) -> bool {
    use rif::lexer::formatter::{BasicFormatter, TokenFormatter};
    use rif::parser::formatter::{DebugParserFormatter, ParserFormatter, SExpressionFormatter};
    use rif::parser::Parser;

    let tokens = match rif::lexer::tokenize(src) {
        Ok(tokens) => tokens,
        Err(error) => {
            eprintln!("{}", BasicFormatter::new(src).format_lexical_error(&error));
            return false;
        }
    };
    let formatter: Box<dyn ParserFormatter> = match format {
        ProgramFormat::Debug => Box::new(DebugParserFormatter),
        ProgramFormat::SExpr => Box::new(SExpressionFormatter::new(src)),
    };
    match Parser::new(src, tokens).parse() {
        Ok(program) => {
            println!("{}", formatter.format(&program));
            true
        }
        Err(failure) => {
            eprintln!("{}", formatter.format_failure(&failure));
            false
        }
    }
}

/// Runs a whole file as one unit. Exits with 65 on lex or parse errors and 70 on
/// runtime errors.
fn run(src: &str, path: &std::path::Path, diagnostics: DiagnosticFormat) -> Result<ExitCode> {
    use rif::session::{
        formatter::{BasicFormatter, PrettyFormatter},
        unfinished, Outcome, Session, Stage,
    };

    let stdout = io::stdout().lock();
    let session = Session::new(io::empty(), stdout);
    let mut session = match diagnostics {
        DiagnosticFormat::Basic => session.with_formatter(BasicFormatter),
        DiagnosticFormat::Pretty => {
            session.with_formatter(PrettyFormatter::new(path.to_string_lossy()))
        }
    };

    let outcome = match session.process(src) {
        Outcome::Incomplete(span) => unfinished(src, span),
        outcome => outcome,
    };
    // A file's trailing value is not echoed, only program output and errors.
    let shown = match outcome {
        Outcome::Value(_) => Outcome::Value(None),
        ref other => other.clone(),
    };
    session.report(src, &shown)?;
    session.into_output().flush()?;

    Ok(match outcome.stage() {
        None => ExitCode::SUCCESS,
        Some(Stage::Lex | Stage::Parse) => ExitCode::from(65),
        Some(Stage::Runtime) => ExitCode::from(70),
    })
}
