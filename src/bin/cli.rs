//! Blocklink CLI - Command-line interface
//!
//! Thin wrapper around the core library: selects the device, performs one
//! compute exchange, renders the response. None of the protocol contract
//! lives here.

use blocklink_core::{
    compute, format_bytes, frame, hexdump, list_ports, AppConfig, CliResult, ExitCodes,
    HexFormat, SerialChannel, SerialSettings, BLOCK_SIZE, RESPONSE_SIZE,
};
use clap::{Parser, Subcommand, ValueEnum};
use std::io::Write;
use std::process::ExitCode;

/// CLI output format
#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Lowercase hex string
    Hex,
    /// Uppercase hex string
    HexUpper,
    /// xxd-style dump with offsets and ASCII sidebar
    Hexdump,
    /// Raw bytes on stdout
    Raw,
}

/// Blocklink CLI
#[derive(Parser, Debug)]
#[command(
    name = "blocklink",
    author = "Blocklink Team",
    version,
    about = "Fixed-block serial transaction client for hardware coprocessors",
    long_about = None
)]
struct Cli {
    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Hex)]
    format: OutputFormat,

    /// Quiet mode (errors only)
    #[arg(short, long)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List available serial ports
    ListPorts {
        /// Show detailed info
        #[arg(short, long)]
        detailed: bool,
    },

    /// Frame a message and perform one exchange with the device
    Compute {
        /// Serial port name (e.g., COM3, /dev/ttyUSB0); falls back to the
        /// configured device
        #[arg(short, long)]
        port: Option<String>,

        /// Use a saved device profile
        #[arg(long, conflicts_with = "port")]
        profile: Option<String>,

        /// Baud rate (with --port)
        #[arg(short, long, default_value = "9600")]
        baud: u32,

        /// Response timeout in milliseconds (with --port)
        #[arg(long, default_value = "1000")]
        timeout_ms: u64,

        /// Parse the message as hex instead of text
        #[arg(long)]
        hex_input: bool,

        /// Message to send (must fit one block)
        message: String,
    },

    /// Print the transmission block for a message without touching hardware
    Frame {
        /// Parse the message as hex instead of text
        #[arg(long)]
        hex_input: bool,

        /// Message to frame
        message: String,
    },

    /// Show tool information and exit codes
    Info,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = blocklink_core::config::init_directories() {
        tracing::warn!("Failed to initialize config directories: {e}");
    }

    let result = match &cli.command {
        Commands::ListPorts { detailed } => run_list_ports(&cli, *detailed),
        Commands::Compute {
            port,
            profile,
            baud,
            timeout_ms,
            hex_input,
            message,
        } => run_compute(
            &cli,
            port.as_deref(),
            profile.as_deref(),
            *baud,
            *timeout_ms,
            *hex_input,
            message,
        ),
        Commands::Frame { hex_input, message } => run_frame(&cli, *hex_input, message),
        Commands::Info => run_info(),
    };

    if let CliResult::Error(_, msg) = &result {
        eprintln!("Error: {msg}");
    }
    result.to_exit_code()
}

fn run_list_ports(cli: &Cli, detailed: bool) -> CliResult {
    let ports = match list_ports() {
        Ok(ports) => ports,
        Err(e) => return CliResult::error(ExitCodes::ERROR, e.to_string()),
    };

    if ports.is_empty() {
        if !cli.quiet {
            println!("No serial ports found.");
        }
        return CliResult::success();
    }

    if detailed {
        println!("Available Serial Ports:");
        println!("{:-<60}", "");
        for port in &ports {
            println!("  {} [{:?}]", port.port_name, port.port_type);
        }
    } else {
        for port in &ports {
            println!("{}", port.port_name);
        }
    }

    CliResult::success()
}

fn run_compute(
    cli: &Cli,
    port: Option<&str>,
    profile: Option<&str>,
    baud: u32,
    timeout_ms: u64,
    hex_input: bool,
    message: &str,
) -> CliResult {
    let message = match parse_message(hex_input, message) {
        Ok(bytes) => bytes,
        Err(result) => return result,
    };

    let settings = match resolve_settings(port, profile, baud, timeout_ms) {
        Ok(settings) => settings,
        Err(result) => return result,
    };

    if !cli.quiet {
        eprintln!(
            "Connecting to {} @ {} baud...",
            settings.port, settings.baud_rate
        );
    }

    let timeout = settings.response_timeout();
    let mut channel = match SerialChannel::open(settings) {
        Ok(channel) => channel,
        Err(e) => return CliResult::from(&e),
    };

    match compute(&mut channel, &message, timeout) {
        Ok(response) => {
            output_data(cli, &response);
            CliResult::success()
        }
        Err(e) => CliResult::from(&e),
    }
}

fn run_frame(cli: &Cli, hex_input: bool, message: &str) -> CliResult {
    let message = match parse_message(hex_input, message) {
        Ok(bytes) => bytes,
        Err(result) => return result,
    };

    match frame(&message, BLOCK_SIZE) {
        Ok(block) => {
            output_data(cli, &block);
            CliResult::success()
        }
        Err(e) => CliResult::error(ExitCodes::PROTOCOL_ERROR, e.to_string()),
    }
}

fn run_info() -> CliResult {
    println!("{} v{}", blocklink_core::NAME, blocklink_core::VERSION);
    println!("Platform: {} ({})", std::env::consts::OS, std::env::consts::ARCH);
    println!();
    println!("Request block: {BLOCK_SIZE} bytes, response: {RESPONSE_SIZE} bytes");
    println!();
    blocklink_core::cli::print_exit_codes();
    CliResult::success()
}

fn parse_message(hex_input: bool, message: &str) -> Result<Vec<u8>, CliResult> {
    if hex_input {
        hex::decode(message.replace(' ', "")).map_err(|e| {
            CliResult::error(ExitCodes::INVALID_ARGS, format!("Invalid hex message: {e}"))
        })
    } else {
        Ok(message.as_bytes().to_vec())
    }
}

fn resolve_settings(
    port: Option<&str>,
    profile: Option<&str>,
    baud: u32,
    timeout_ms: u64,
) -> Result<SerialSettings, CliResult> {
    if let Some(port) = port {
        return Ok(SerialSettings::new(port, baud).response_timeout_ms(timeout_ms));
    }

    let config = AppConfig::load()
        .map_err(|e| CliResult::error(ExitCodes::CONFIG_ERROR, e.to_string()))?;

    match profile {
        Some(name) => config
            .find_profile(name)
            .map(|p| p.serial.clone())
            .ok_or_else(|| {
                CliResult::error(
                    ExitCodes::CONFIG_ERROR,
                    format!("No saved profile named '{name}'"),
                )
            }),
        None => Ok(config.device),
    }
}

fn output_data(cli: &Cli, data: &[u8]) {
    match cli.format {
        OutputFormat::Hex => println!("{}", format_bytes(data, HexFormat::Lower)),
        OutputFormat::HexUpper => println!("{}", format_bytes(data, HexFormat::Upper)),
        OutputFormat::Hexdump => print!("{}", hexdump(data, 16)),
        OutputFormat::Raw => {
            let _ = std::io::stdout().write_all(data);
            let _ = std::io::stdout().flush();
        }
    }
}
