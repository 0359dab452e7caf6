//! PICO Face Bridge CLI
//!
//! Receives PICO face tracking packets and prints unified expressions.

use clap::{Parser, Subcommand};
use pico_face_bridge::{
    config::Config,
    core::{create_shared_tracking_data, decode, ExpressionComposer, PacketFormat},
    core::{ModuleState, PacketHeader, UnifiedTrackingData, UpdateOutcome, Updater},
    logging::{init_tracing, TracingSink, WarningSink},
    stats::create_shared_stats,
    transport::UdpPacketSource,
    VERSION,
};
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "pico-face-bridge")]
#[command(version = VERSION)]
#[command(about = "Decode PICO face tracking packets into unified expressions", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Listen for tracking packets and keep the expression store updated
    Listen {
        /// Address to bind (overrides config)
        #[arg(long)]
        bind: Option<IpAddr>,

        /// UDP port (overrides config)
        #[arg(long)]
        port: Option<u16>,

        /// Expect the legacy packet layout
        #[arg(long)]
        legacy: bool,

        /// Do not write eye data
        #[arg(long)]
        no_eye: bool,

        /// Do not write expression data
        #[arg(long)]
        no_expression: bool,

        /// Print the store as JSON every N composed frames (0 disables)
        #[arg(long, default_value = "0")]
        dump_every: u64,
    },

    /// Decode a captured packet file and print the composed store
    Decode {
        /// File holding one raw packet
        file: PathBuf,

        /// Treat the packet as the legacy layout
        #[arg(long)]
        legacy: bool,
    },

    /// Show configuration
    Config,
}

fn main() {
    init_tracing("info");
    let cli = Cli::parse();

    match cli.command {
        Commands::Listen {
            bind,
            port,
            legacy,
            no_eye,
            no_expression,
            dump_every,
        } => {
            let mut config = Config::load().unwrap_or_else(|e| {
                eprintln!("Warning: Could not load config, using defaults: {e}");
                Config::default()
            });
            if let Some(bind) = bind {
                config.bind_address = bind;
            }
            if let Some(port) = port {
                config.port = port;
            }
            if legacy {
                config.format = PacketFormat::Legacy;
            }
            config.capabilities.eye &= !no_eye;
            config.capabilities.expression &= !no_expression;
            cmd_listen(&config, dump_every);
        }
        Commands::Decode { file, legacy } => {
            cmd_decode(&file, PacketFormat::from_legacy_flag(legacy));
        }
        Commands::Config => {
            cmd_config();
        }
    }
}

fn cmd_listen(config: &Config, dump_every: u64) {
    println!("PICO Face Bridge v{VERSION}");
    println!();

    let source =
        match UdpPacketSource::bind_with_timeout(config.socket_addr(), config.receive_timeout) {
            Ok(source) => source,
            Err(e) => {
                eprintln!("Error: Could not bind {}: {e}", config.socket_addr());
                std::process::exit(1);
            }
        };

    println!("Listening on {}", source.local_addr());
    println!("  Format: {:?}", config.format);
    println!(
        "  Eye: {}",
        if config.capabilities.eye {
            "enabled"
        } else {
            "disabled"
        }
    );
    println!(
        "  Expression: {}",
        if config.capabilities.expression {
            "enabled"
        } else {
            "disabled"
        }
    );
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    let store = create_shared_tracking_data();
    let stats = create_shared_stats();
    let sink: Arc<dyn WarningSink> = Arc::new(TracingSink);
    let mut updater = Updater::new(
        Some(source),
        Some(sink),
        config.format,
        config.capabilities,
        store.clone(),
    )
    .with_stats(stats.clone())
    .with_timeout_warning_threshold(config.timeout_warning_threshold);
    tracing::info!(instance = %updater.instance_id(), "pipeline started");

    let running = Arc::new(AtomicBool::new(true));
    ctrlc_handler(running.clone());

    let mut composed: u64 = 0;
    while running.load(Ordering::SeqCst) {
        if updater.update(ModuleState::Active) == UpdateOutcome::Composed {
            composed += 1;
            if dump_every > 0 && composed % dump_every == 0 {
                print_store(&store.read());
            }
        }
    }

    println!();
    println!("{}", stats.summary());
}

fn cmd_decode(file: &Path, format: PacketFormat) {
    let bytes = match std::fs::read(file) {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("Error reading {file:?}: {e}");
            std::process::exit(1);
        }
    };

    println!("Packet: {} bytes, {:?} format", bytes.len(), format);
    if format == PacketFormat::Current {
        match PacketHeader::parse(&bytes) {
            Ok(header) => println!("Header: {header:?}"),
            Err(e) => println!("Header: {e}"),
        }
    }

    let frame = decode(&bytes, format);
    if frame.is_empty() {
        println!("Packet carries no blendshape weights.");
        return;
    }

    let mut data = UnifiedTrackingData::new();
    let mut composer = ExpressionComposer::new();
    composer.compose_eye(&frame, &mut data);
    composer.compose_expression(&frame, &mut data);
    print_store(&data);
}

fn cmd_config() {
    let config = Config::load().unwrap_or_default();

    println!("Configuration");
    println!("=============");
    println!();
    println!("Config file: {:?}", Config::config_path());
    println!();
    println!(
        "{}",
        serde_json::to_string_pretty(&config).unwrap_or_else(|_| "Error".to_string())
    );
}

fn print_store(data: &UnifiedTrackingData) {
    match serde_json::to_string_pretty(&data.snapshot()) {
        Ok(json) => println!("{json}"),
        Err(e) => eprintln!("Error serializing store: {e}"),
    }
}

/// Set up Ctrl+C handler.
fn ctrlc_handler(running: Arc<AtomicBool>) {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .expect("Error setting Ctrl+C handler");
}
