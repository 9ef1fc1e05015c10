//! shellcall - run one external command through a session
//!
//! Resolves the command, runs it with live output, and exits with its exit
//! code. Mostly useful for checking a configuration file.

use std::env;
use std::path::PathBuf;
use std::process;
use std::time::Duration;

use tracing::{debug, error, info};

use shellcall::config::loader::ConfigLoader;
use shellcall::error::Result;
use shellcall::{CommandKind, Session, SessionConfig};

/// Command line configuration
#[derive(Debug, Default)]
struct CliArgs {
    /// Configuration file path
    config_path: Option<PathBuf>,
    /// Enable debug logging
    debug: bool,
    /// Trace each invocation before it runs
    trace: bool,
    /// Time limit in milliseconds
    timeout_ms: Option<u64>,
    /// Command name or path
    command: Option<String>,
    /// Arguments passed to the command
    args: Vec<String>,
}

impl CliArgs {
    /// Parse command line arguments
    fn parse() -> Result<Self> {
        Self::parse_from(env::args().skip(1).collect())
    }

    fn parse_from(args: Vec<String>) -> Result<Self> {
        let mut cli = CliArgs::default();

        let mut i = 0;
        while i < args.len() {
            match args[i].as_str() {
                "--config" | "-c" => {
                    if i + 1 < args.len() {
                        cli.config_path = Some(PathBuf::from(&args[i + 1]));
                        i += 1;
                    } else {
                        return Err("Missing config file path".into());
                    }
                }
                "--timeout" | "-t" => {
                    let value = args.get(i + 1).ok_or("Missing timeout value")?;
                    let ms = value
                        .parse()
                        .map_err(|_| format!("Invalid timeout: {}", value))?;
                    cli.timeout_ms = Some(ms);
                    i += 1;
                }
                "--debug" | "-d" => {
                    cli.debug = true;
                }
                "--trace" | "-x" => {
                    cli.trace = true;
                }
                "--help" | "-h" => {
                    print_help();
                    process::exit(0);
                }
                "--version" | "-v" => {
                    println!("shellcall v{}", shellcall::VERSION);
                    process::exit(0);
                }
                "--" => {
                    i += 1;
                    break;
                }
                arg if arg.starts_with('-') => {
                    return Err(format!("Unknown option: {}", arg).into());
                }
                _ => break,
            }
            i += 1;
        }

        // Everything from the first positional on belongs to the command
        let mut rest = args.into_iter().skip(i);
        cli.command = rest.next();
        cli.args = rest.collect();
        Ok(cli)
    }
}

/// Print help information
fn print_help() {
    println!("shellcall - run an external command through a shellcall session");
    println!();
    println!("USAGE:");
    println!("    shellcall [OPTIONS] <COMMAND> [ARGS]...");
    println!();
    println!("OPTIONS:");
    println!("    -c, --config <FILE>     Use a specific configuration file");
    println!("    -t, --timeout <MS>      Terminate the command after MS milliseconds");
    println!("    -x, --trace             Log each invocation before it runs");
    println!("    -d, --debug             Enable debug logging");
    println!("    -h, --help              Print help information");
    println!("    -v, --version           Print version information");
    println!();
    println!("Output is echoed live unless echo_stdout / echo_stderr are");
    println!("set to false in the configuration file.");
    println!();
    println!("ENVIRONMENT:");
    println!("    SHELLCALL_CONFIG       Configuration file path");
    println!("    SHELLCALL_DEBUG        Enable debug mode (1 or true)");
    println!("    RUST_LOG               Set logging level (error, warn, info, debug, trace)");
}

/// Load configuration from file or use defaults, then apply flags
fn load_configuration(cli: &CliArgs) -> Result<SessionConfig> {
    // Echo follows the file's echo_stdout / echo_stderr settings
    let mut config = match &cli.config_path {
        Some(path) => ConfigLoader::load_from_path(path)?,
        None => ConfigLoader::load_or_default(),
    };
    if cli.trace {
        config = config.with_xtrace(true);
    }
    if let Some(ms) = cli.timeout_ms {
        config = config.with_timeout(Some(Duration::from_millis(ms)));
    }
    Ok(config)
}

#[tokio::main]
async fn main() {
    let cli = CliArgs::parse().unwrap_or_else(|e| {
        eprintln!("shellcall: {}", e);
        print_help();
        process::exit(2);
    });

    // Initialize logging based on debug flag
    let debug_env = env::var("SHELLCALL_DEBUG")
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false);
    let log_level = if cli.debug || debug_env { "debug" } else { "info" };

    let env_filter = env::var("RUST_LOG").unwrap_or_else(|_| log_level.to_string());
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from(env_filter))
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    let Some(command) = cli.command.clone() else {
        print_help();
        process::exit(2);
    };

    let code = match run(&cli, &command).await {
        Ok(()) => 0,
        Err(e) => {
            error!("{}", e);
            e.exit_code().unwrap_or(1)
        }
    };
    debug!("Exiting with {}", code);
    process::exit(code);
}

async fn run(cli: &CliArgs, command: &str) -> Result<()> {
    let config = load_configuration(cli)?;
    let session = Session::new(config)?;
    info!("Running '{}' in {}", command, session.current_directory().display());

    let resolved = session.command(command).await?;
    let output = session.run(command, &cli.args).await?;

    // Regular output went through the configured sinks; `cd` only reports where it went
    if resolved.kind() == CommandKind::ChangeDirectory {
        println!("{}", output);
    }
    Ok(())
}
