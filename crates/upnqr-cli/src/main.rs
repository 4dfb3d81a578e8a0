mod agent;
mod commands;
mod mode;
mod operator;
mod output;

use std::fmt;
use std::path::PathBuf;

use anyhow::Context;
use clap::{error::ErrorKind, Parser, Subcommand, ValueEnum};
use serde_json::json;
use tracing_subscriber::EnvFilter;
use upnqr_core::{FieldIssue, UpnError, DEFAULT_QR_SIZE};

use mode::{Mode, OutputMode};
use output::{CommandOutput, OutputHandler};

const DEFAULT_LOG_FILTER: &str = "warn";

#[derive(Debug, Parser)]
#[command(
    name = "upnqr",
    version,
    about = "Validate, serialize and render Slovenian UPN QR payment orders"
)]
struct Cli {
    /// Output style: `json` for machines, `human` for terminals.
    #[arg(long = "output", value_enum, global = true, default_value_t = OutputMode::Auto)]
    output_mode: OutputMode,

    #[arg(long, global = true)]
    quiet: bool,

    #[arg(long = "no-color", global = true)]
    no_color: bool,

    /// Tracing filter, e.g. `debug` or `upnqr_core=trace`. Overrides RUST_LOG.
    #[arg(long = "log-level", global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Subcommand)]
enum Commands {
    /// Check an order document and show its normalized fields.
    Validate { file: PathBuf },
    /// Print the UPN QR payload of an order document.
    Serialize { file: PathBuf },
    /// Render an order document to a PNG, SVG or EPS QR code.
    Generate {
        file: PathBuf,
        #[arg(long)]
        out: PathBuf,
        #[arg(
            long,
            default_value_t = DEFAULT_QR_SIZE,
            value_parser = clap::value_parser!(u32).range(1..)
        )]
        size: u32,
        /// Image format; defaults to the extension of `--out`.
        #[arg(long)]
        format: Option<String>,
    },
    /// Split a serialized payload and verify its checksum.
    Inspect { file: PathBuf },
}

impl Commands {
    const fn label(&self) -> &'static str {
        match self {
            Commands::Validate { .. } => "validate",
            Commands::Serialize { .. } => "serialize",
            Commands::Generate { .. } => "generate",
            Commands::Inspect { .. } => "inspect",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExitCode {
    Success = 0,
    ValidationError = 1,
    ConfigError = 2,
    IoError = 3,
    InternalError = 4,
}

impl ExitCode {
    const fn as_i32(self) -> i32 {
        self as i32
    }
}

#[derive(Debug)]
pub(crate) enum CliError {
    Core(UpnError),
    InvalidOrder(Vec<FieldIssue>),
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    Usage(String),
    Internal(anyhow::Error),
}

impl From<UpnError> for CliError {
    fn from(value: UpnError) -> Self {
        Self::Core(value)
    }
}

impl From<anyhow::Error> for CliError {
    fn from(value: anyhow::Error) -> Self {
        Self::Internal(value)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Core(err) => write!(f, "{err}"),
            CliError::InvalidOrder(issues) if issues.len() == 1 => {
                f.write_str("order has 1 invalid field")
            }
            CliError::InvalidOrder(issues) => {
                write!(f, "order has {} invalid fields", issues.len())
            }
            CliError::Read { path, source } => {
                write!(f, "failed to read '{}': {source}", path.display())
            }
            CliError::Usage(message) => f.write_str(message),
            CliError::Internal(err) => write!(f, "internal error: {err:#}"),
        }
    }
}

fn build_output_handler(mode: Mode, quiet: bool, no_color: bool) -> Box<dyn OutputHandler> {
    match mode {
        Mode::Operator => Box::new(operator::OperatorOutput::new(quiet, no_color)),
        Mode::Agent => Box::new(agent::AgentOutputHandler::new()),
    }
}

fn init_tracing(log_level: Option<&str>, no_color: bool) -> anyhow::Result<()> {
    let filter = match log_level {
        Some(level) => {
            EnvFilter::try_new(level).with_context(|| format!("invalid log level '{level}'"))?
        }
        None => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(!no_color)
        .with_target(false)
        .try_init()
        .map_err(|err| anyhow::anyhow!("failed to install log subscriber: {err}"))
}

fn detect_mode_from_raw_args(args: &[String]) -> Mode {
    let mut requested = OutputMode::Auto;

    let mut index = 1;
    while index < args.len() {
        let arg = &args[index];
        let value = if arg == "--output" {
            index += 1;
            args.get(index).map(String::as_str)
        } else {
            arg.strip_prefix("--output=")
        };
        if let Some(parsed) = value.and_then(|value| OutputMode::from_str(value, true).ok()) {
            requested = parsed;
        }
        index += 1;
    }

    mode::detect_mode(requested)
}

fn infer_operation_from_raw_args(args: &[String]) -> &'static str {
    for arg in args.iter().skip(1) {
        match arg.as_str() {
            "validate" => return "validate",
            "serialize" => return "serialize",
            "generate" => return "generate",
            "inspect" => return "inspect",
            _ => {}
        }
    }
    "upnqr"
}

fn dispatch(
    command: &Commands,
    output: &mut dyn OutputHandler,
) -> std::result::Result<CommandOutput, CliError> {
    match command {
        Commands::Validate { file } => commands::validate::run(file, output),
        Commands::Serialize { file } => commands::serialize::run(file, output),
        Commands::Generate {
            file,
            out,
            size,
            format,
        } => commands::generate::run(file, out, *size, format.as_deref(), output),
        Commands::Inspect { file } => commands::inspect::run(file, output),
    }
}

fn exit_code_for_core_error(err: &UpnError) -> ExitCode {
    if err.is_validation() {
        return ExitCode::ValidationError;
    }
    match err {
        UpnError::Encoding(_) | UpnError::Payload(_) => ExitCode::ValidationError,
        UpnError::UnsupportedFormat(_) | UpnError::InvalidSize(_) | UpnError::Json(_) => {
            ExitCode::ConfigError
        }
        UpnError::Io(_) => ExitCode::IoError,
        _ => ExitCode::InternalError,
    }
}

fn exit_code_for_error(err: &CliError) -> ExitCode {
    match err {
        CliError::Core(core) => exit_code_for_core_error(core),
        CliError::InvalidOrder(_) => ExitCode::ValidationError,
        CliError::Read { .. } => ExitCode::IoError,
        CliError::Usage(_) => ExitCode::ConfigError,
        CliError::Internal(_) => ExitCode::InternalError,
    }
}

fn error_code(err: &CliError) -> &'static str {
    match err {
        CliError::Core(core) => match core {
            UpnError::Required { .. } | UpnError::Validation { .. } | UpnError::Amount(_) => {
                "VALIDATION_FAILED"
            }
            UpnError::UnsupportedFormat(_) => "UNSUPPORTED_FORMAT",
            UpnError::InvalidSize(_) => "INVALID_SIZE",
            UpnError::Encoding(_) => "ENCODING_FAILED",
            UpnError::Render(_) => "RENDER_FAILED",
            UpnError::Payload(_) => "MALFORMED_PAYLOAD",
            UpnError::Io(_) => "IO_ERROR",
            UpnError::Json(_) => "INVALID_JSON_INPUT",
        },
        CliError::InvalidOrder(_) => "VALIDATION_FAILED",
        CliError::Read { .. } => "IO_ERROR",
        CliError::Usage(_) => "USAGE_ERROR",
        CliError::Internal(_) => "INTERNAL_ERROR",
    }
}

fn cli_error_to_agent_error(err: &CliError) -> agent::AgentError {
    let details = match err {
        CliError::InvalidOrder(issues) => Some(json!({ "issues": issues })),
        CliError::Core(core) => core.field().map(|field| {
            json!({
                "issues": [{ "field": field, "message": core.to_string() }]
            })
        }),
        CliError::Read { path, .. } => Some(json!({ "path": path.to_string_lossy() })),
        CliError::Usage(_) | CliError::Internal(_) => None,
    };

    agent::AgentError {
        code: error_code(err).to_string(),
        message: err.to_string(),
        details,
    }
}

fn output_from_error(err: &CliError, command: &str) -> CommandOutput {
    let agent_error = cli_error_to_agent_error(err);
    let mut output = CommandOutput::failure(command, agent_error.message.clone(), Vec::new());
    output.payload = Some(json!({ "error": agent_error }));
    output
}

fn run(cli: Cli) -> ExitCode {
    let mode = mode::detect_mode(cli.output_mode);
    let mut output = build_output_handler(mode, cli.quiet, cli.no_color);
    let command = cli.command.label();

    if let Err(err) = init_tracing(cli.log_level.as_deref(), cli.no_color) {
        let err = CliError::Usage(format!("{err:#}"));
        output.complete(&output_from_error(&err, command));
        return exit_code_for_error(&err);
    }
    tracing::debug!(command, ?mode, "starting");

    output.start_operation(command);
    match dispatch(&cli.command, output.as_mut()) {
        Ok(result) => {
            output.complete(&result);
            ExitCode::Success
        }
        Err(err) => {
            tracing::debug!(error = %err, "command failed");
            if let CliError::InvalidOrder(issues) = &err {
                output.display_field_issues(issues);
            }
            output.complete(&output_from_error(&err, command));
            exit_code_for_error(&err)
        }
    }
}

fn main() {
    let raw_args: Vec<String> = std::env::args().collect();
    let cli = match Cli::try_parse_from(&raw_args) {
        Ok(parsed) => parsed,
        Err(err) => {
            if matches!(
                err.kind(),
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion
            ) {
                let _ = err.print();
                std::process::exit(ExitCode::Success.as_i32());
            }

            if detect_mode_from_raw_args(&raw_args) == Mode::Agent {
                let cli_error = CliError::Usage(err.to_string().trim().to_string());
                let operation = infer_operation_from_raw_args(&raw_args);
                let mut output = agent::AgentOutputHandler::new();
                output.complete(&output_from_error(&cli_error, operation));
                std::process::exit(exit_code_for_error(&cli_error).as_i32());
            }

            let _ = err.print();
            std::process::exit(ExitCode::ConfigError.as_i32());
        }
    };
    let code = run(cli);
    std::process::exit(code.as_i32());
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::path::PathBuf;

    use clap::Parser;
    use upnqr_core::{Field, FieldIssue, UpnError};

    use crate::commands::test_support::{unique_path, write_temp, VALID_ORDER};
    use crate::mode::{Mode, OutputMode};
    use crate::output::{CommandOutput, FieldRow, OutputHandler};

    use super::{
        cli_error_to_agent_error, detect_mode_from_raw_args, dispatch, exit_code_for_error,
        infer_operation_from_raw_args, output_from_error, Cli, CliError, Commands, ExitCode,
    };

    #[derive(Default)]
    struct MockOutput {
        progress: Vec<String>,
        rows: usize,
    }

    impl OutputHandler for MockOutput {
        fn start_operation(&mut self, _operation: &str) {}
        fn progress(&mut self, message: &str) {
            self.progress.push(message.to_string());
        }
        fn display_order(&mut self, rows: &[FieldRow]) {
            self.rows = rows.len();
        }
        fn display_field_issues(&mut self, _issues: &[FieldIssue]) {}
        fn complete(&mut self, _output: &CommandOutput) {}
    }

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn cli_parses_validate_with_machine_flags() {
        let cli = Cli::try_parse_from([
            "upnqr",
            "--output",
            "json",
            "--quiet",
            "validate",
            "order.json",
        ])
        .unwrap();

        assert_eq!(cli.output_mode, OutputMode::Json);
        assert!(cli.quiet);
        match cli.command {
            Commands::Validate { file } => assert_eq!(file, PathBuf::from("order.json")),
            _ => panic!("expected validate command"),
        }
    }

    #[test]
    fn cli_parses_generate_with_defaults() {
        let cli = Cli::try_parse_from(["upnqr", "generate", "order.json", "--out", "qr.png"])
            .unwrap();

        assert_eq!(cli.output_mode, OutputMode::Auto);
        match cli.command {
            Commands::Generate {
                file,
                out,
                size,
                format,
            } => {
                assert_eq!(file, PathBuf::from("order.json"));
                assert_eq!(out, PathBuf::from("qr.png"));
                assert_eq!(size, 400);
                assert_eq!(format, None);
            }
            _ => panic!("expected generate command"),
        }
    }

    #[test]
    fn global_flags_are_accepted_after_subcommand() {
        let cli = Cli::try_parse_from([
            "upnqr",
            "generate",
            "order.json",
            "--out",
            "qr.eps",
            "--size",
            "800",
            "--format",
            "eps",
            "--no-color",
            "--log-level",
            "debug",
            "--output",
            "human",
        ])
        .unwrap();

        assert!(cli.no_color);
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
        assert_eq!(cli.output_mode, OutputMode::Human);
        match cli.command {
            Commands::Generate { size, format, .. } => {
                assert_eq!(size, 800);
                assert_eq!(format.as_deref(), Some("eps"));
            }
            _ => panic!("expected generate command"),
        }
    }

    #[test]
    fn zero_size_and_missing_out_are_usage_errors() {
        assert!(Cli::try_parse_from([
            "upnqr", "generate", "order.json", "--out", "qr.png", "--size", "0"
        ])
        .is_err());
        assert!(Cli::try_parse_from(["upnqr", "generate", "order.json"]).is_err());
    }

    #[test]
    fn raw_args_select_agent_mode_for_json() {
        assert_eq!(
            detect_mode_from_raw_args(&args(&["upnqr", "--output", "json", "bogus"])),
            Mode::Agent
        );
        assert_eq!(
            detect_mode_from_raw_args(&args(&["upnqr", "--output=JSON", "bogus"])),
            Mode::Agent
        );
        assert_eq!(
            detect_mode_from_raw_args(&args(&["upnqr", "--output", "human", "bogus"])),
            Mode::Operator
        );
    }

    #[test]
    fn operation_is_inferred_from_raw_args() {
        assert_eq!(
            infer_operation_from_raw_args(&args(&["upnqr", "--quiet", "inspect", "--bad"])),
            "inspect"
        );
        assert_eq!(infer_operation_from_raw_args(&args(&["upnqr"])), "upnqr");
    }

    #[test]
    fn exit_code_mapping() {
        let cases = [
            (
                CliError::Core(UpnError::Required {
                    field: Field::RecipientIban,
                }),
                ExitCode::ValidationError,
            ),
            (CliError::InvalidOrder(Vec::new()), ExitCode::ValidationError),
            (
                CliError::Core(UpnError::Payload("bad".to_string())),
                ExitCode::ValidationError,
            ),
            (
                CliError::Core(UpnError::UnsupportedFormat("gif".to_string())),
                ExitCode::ConfigError,
            ),
            (
                CliError::Core(UpnError::InvalidSize(0)),
                ExitCode::ConfigError,
            ),
            (CliError::Usage("bad flag".to_string()), ExitCode::ConfigError),
            (
                CliError::Read {
                    path: PathBuf::from("order.json"),
                    source: io::Error::other("denied"),
                },
                ExitCode::IoError,
            ),
            (
                CliError::Core(UpnError::Io(io::Error::other("disk full"))),
                ExitCode::IoError,
            ),
            (
                CliError::Core(UpnError::Render("too big".to_string())),
                ExitCode::InternalError,
            ),
            (
                CliError::Internal(anyhow::anyhow!("boom")),
                ExitCode::InternalError,
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(exit_code_for_error(&err), expected, "{err}");
        }
    }

    #[test]
    fn invalid_order_error_lists_issues() {
        let err = CliError::InvalidOrder(vec![FieldIssue {
            field: Field::Amount,
            message: "Amount must either be null or a value between 0 and 1,000,000,000"
                .to_string(),
        }]);
        let agent_error = cli_error_to_agent_error(&err);
        assert_eq!(agent_error.code, "VALIDATION_FAILED");
        assert_eq!(agent_error.message, "order has 1 invalid field");
        let details = agent_error.details.unwrap();
        assert_eq!(details["issues"][0]["field"], "amount");

        let output = output_from_error(&err, "validate");
        assert!(!output.ok);
        assert_eq!(output.payload.unwrap()["error"]["code"], "VALIDATION_FAILED");
    }

    #[test]
    fn single_field_core_error_names_the_field() {
        let err = CliError::Core(UpnError::Required {
            field: Field::RecipientCity,
        });
        let details = cli_error_to_agent_error(&err).details.unwrap();
        assert_eq!(details["issues"][0]["field"], "recipientCity");
        assert_eq!(
            details["issues"][0]["message"],
            "recipientCity is required."
        );
    }

    #[test]
    fn dispatch_runs_every_command() {
        let order = write_temp("upnqr-dispatch", "json", VALID_ORDER);
        let out = unique_path("upnqr-dispatch-out", "svg");
        let mut output = MockOutput::default();

        let validate = dispatch(&Commands::Validate { file: order.clone() }, &mut output).unwrap();
        assert!(validate.ok);
        assert_eq!(output.rows, Field::ALL.len());

        let serialized =
            dispatch(&Commands::Serialize { file: order.clone() }, &mut output).unwrap();
        let payload = serialized.body.unwrap();

        let generated = dispatch(
            &Commands::Generate {
                file: order,
                out: out.clone(),
                size: 200,
                format: None,
            },
            &mut output,
        )
        .unwrap();
        assert_eq!(generated.payload.unwrap()["format"], "svg");
        assert!(out.exists());

        let payload_file = write_temp("upnqr-dispatch-payload", "txt", &payload);
        let inspected = dispatch(&Commands::Inspect { file: payload_file }, &mut output).unwrap();
        assert!(inspected.ok);
        assert_eq!(output.progress.len(), 4);
    }
}
