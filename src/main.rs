//! Binary entrypoint for the MREx node tool CLI.
//!
//! Commands:
//! - `traction [--mode N=P,I,D]...` - send PID gains for all five traction modes
//! - `brake --profile <name>` - select the service brake profile
//! - `control --mode <manual|auto|diagnostic>` - switch the controller mode
//! - `node --node <id> --direction <read|write> [--data <d>]` - custom node access (no wire format yet)
//! - `ports` - list serial devices
//! - `presets` - show saved traction presets
//! - `init` - write a starter `config.toml`
//!
//! See the library crate docs for module-level details: `mrex_nodetool::`.
use anyhow::Result;
use clap::{Parser, Subcommand};
use log::{error, info, warn};

use mrex_nodetool::config::Config;
use mrex_nodetool::frame::{self, ConfigRequest, ControllerMode, NodeDirection, PidTriple, MODE_COUNT};
use mrex_nodetool::presets::PresetStore;
use mrex_nodetool::programmer::NodeProgrammer;
use mrex_nodetool::transport::{self, Transmitter};
use mrex_nodetool::validation::validate_field;

#[derive(Parser)]
#[command(name = "mrex-nodetool")]
#[command(about = "Send configuration frames to an MREx Ultra train node")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path (can be used before or after subcommand)
    #[arg(short, long, default_value = "config.toml", global = true)]
    config: String,

    /// Serial device to send to (overrides the configured port)
    #[arg(short, long, global = true)]
    port: Option<String>,

    /// Verbose logging (-v, -vv for more; may appear before or after subcommand)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Send traction PID gains (modes not given start from saved presets)
    Traction {
        /// Gains for one mode as N=P,I,D (e.g. 2=1.5,0.2,0); blanks send 0
        #[arg(short, long = "mode", value_parser = parse_mode_gains)]
        modes: Vec<(usize, PidTriple)>,
        /// Print the frame without saving presets or sending
        #[arg(long)]
        dry_run: bool,
    },
    /// Select the brake profile
    Brake {
        #[arg(long)]
        profile: String,
        #[arg(long)]
        dry_run: bool,
    },
    /// Switch the controller mode
    Control {
        /// Manual, Auto or Diagnostic (case-insensitive)
        #[arg(short, long, value_parser = str::parse::<ControllerMode>)]
        mode: ControllerMode,
        #[arg(long)]
        dry_run: bool,
    },
    /// Read or write a custom node value
    Node {
        #[arg(long)]
        node: String,
        /// Read or Write (case-insensitive)
        #[arg(long, value_parser = str::parse::<NodeDirection>)]
        direction: NodeDirection,
        #[arg(long, default_value = "")]
        data: String,
    },
    /// List serial devices
    Ports,
    /// Show saved traction presets
    Presets,
    /// Write a default configuration file
    Init,
}

/// Parse `N=P,I,D` where N is 1..=5 and any gain may be blank.
fn parse_mode_gains(s: &str) -> std::result::Result<(usize, PidTriple), String> {
    let (index, gains) = s
        .split_once('=')
        .ok_or_else(|| format!("expected N=P,I,D, got '{}'", s))?;
    let index: usize = index
        .trim()
        .parse()
        .map_err(|_| format!("invalid mode number '{}'", index))?;
    if !(1..=MODE_COUNT).contains(&index) {
        return Err(format!("mode must be between 1 and {}, got {}", MODE_COUNT, index));
    }
    let parts: Vec<&str> = gains.split(',').map(str::trim).collect();
    let [p, i, d] = parts.as_slice() else {
        return Err(format!("expected three gains P,I,D for mode {}, got '{}'", index, gains));
    };
    for (name, value) in [("P", p), ("I", i), ("D", d)] {
        validate_field(name, value).map_err(|e| e.to_string())?;
    }
    Ok((index, PidTriple::new(*p, *i, *d)))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Init writes the config, so it must not try to read one first
    let loaded = match cli.command {
        Commands::Init => None,
        _ => Some(Config::load(&cli.config).await),
    };
    init_logging(&loaded.as_ref().and_then(|r| r.as_ref().ok().cloned()), cli.verbose);
    // A missing or unreadable config is not fatal; fall back to defaults.
    let config = match loaded {
        Some(Ok(cfg)) => cfg,
        Some(Err(e)) => {
            warn!("{} (using defaults)", e);
            Config::default()
        }
        None => Config::default(),
    };

    let port = config.resolve_port(cli.port.as_deref());
    let programmer = NodeProgrammer::new(PresetStore::new(&config.presets.path), Transmitter::system());

    let (request, dry_run) = match cli.command {
        Commands::Traction { modes, dry_run } => {
            let mut profile = programmer.startup_profile();
            for (index, triple) in modes {
                profile.set_mode(index, triple);
            }
            (ConfigRequest::Traction(profile), dry_run)
        }
        Commands::Brake { profile, dry_run } => {
            validate_field("profile", &profile)?;
            (ConfigRequest::Brake { profile }, dry_run)
        }
        Commands::Control { mode, dry_run } => (ConfigRequest::Control { mode }, dry_run),
        Commands::Node {
            node,
            direction,
            data,
        } => {
            validate_field("node", &node)?;
            validate_field("data", &data)?;
            let request = ConfigRequest::CustomNode {
                node,
                direction,
                data,
            };
            (request, false)
        }
        Commands::Ports => {
            let ports = transport::list_ports();
            if ports.is_empty() {
                println!("No serial ports found.");
            }
            for name in ports {
                println!("{}", name);
            }
            return Ok(());
        }
        Commands::Presets => {
            let profile = programmer.startup_profile();
            for (key, triple) in profile.keyed() {
                let (p, i, d) = triple.rendered();
                println!("{}: P={} I={} D={}", key, p, i, d);
            }
            return Ok(());
        }
        Commands::Init => {
            info!("Initializing new node tool configuration");
            Config::create_default(&cli.config).await?;
            info!("Configuration file created at {}", cli.config);
            return Ok(());
        }
    };

    if dry_run {
        println!("{}", frame::encode(&request)?);
        return Ok(());
    }

    let outcome = programmer.configure(&port, &request)?;
    println!("{}", outcome);
    if !outcome.is_sent() {
        error!("Configuration not delivered: {}", outcome);
        std::process::exit(1);
    }
    Ok(())
}

fn init_logging(config: &Option<Config>, verbosity: u8) {
    use std::io::Write;
    let mut builder = env_logger::Builder::new();
    // CLI verbosity raises the configured level
    let base_level = match verbosity {
        0 => config
            .as_ref()
            .map(|cfg| cfg.logging.level_filter())
            .unwrap_or(log::LevelFilter::Info),
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    builder.filter_level(base_level);
    let log_file = config
        .as_ref()
        .and_then(|cfg| cfg.logging.file.as_ref())
        .and_then(|file| {
            std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(file)
                .ok()
        });
    if let Some(f) = log_file {
        let write_mutex = std::sync::Arc::new(std::sync::Mutex::new(f));
        // Mirror to the console only when a person is watching
        let is_tty = atty::is(atty::Stream::Stdout);
        builder.format(move |fmt, record| {
            let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
            let line = format!("{} [{}] {}", ts, record.level(), record.args());
            if let Ok(mut guard) = write_mutex.lock() {
                let _ = writeln!(guard, "{}", line);
            }
            if is_tty {
                writeln!(fmt, "{}", line)
            } else {
                Ok(())
            }
        });
    } else {
        builder.format(|fmt, record| {
            writeln!(
                fmt,
                "{} [{}] {}",
                chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ"),
                record.level(),
                record.args()
            )
        });
    }
    let _ = builder.try_init();
}
