//! ttsdiag entry point
//!
//! Two commands share nothing but configuration:
//! 1. `probe` - audio system, synthesis tool and system engine checks
//! 2. `guide` - troubleshooting guide plus application process check

use anyhow::Context;
use clap::{Parser, Subcommand};
use log::{error, info};
use std::io;
use std::path::PathBuf;
use std::process;
use ttsdiag::config::Config;
use ttsdiag::process::SystemRunner;
use ttsdiag::report::{render_guide, render_probe, Console};
use ttsdiag::{guide, probe};

/// Text-to-speech diagnostics for Linux hosts
#[derive(Parser)]
#[command(name = "ttsdiag")]
#[command(version)]
#[command(about = "Check that text-to-speech works on this machine", long_about = None)]
struct Cli {
    /// Write debug logs to ttsdiag.log
    #[arg(short, long, global = true)]
    debug: bool,

    /// Config file (default: ~/.ttsdiag.cfg)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Directory relative paths resolve against (default: current directory)
    #[arg(short, long, global = true)]
    workdir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Probe the audio system, synthesis tool and system speech engines
    Probe {
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write the test guide and check whether the application is running
    Guide,

    /// Show effective settings
    Config {
        /// Save the built-in defaults to the config file
        #[arg(long)]
        write: bool,
    },
}

fn init_logging(debug_mode: bool) {
    if debug_mode {
        use std::fs::OpenOptions;
        match OpenOptions::new()
            .create(true)
            .append(true)
            .open("ttsdiag.log")
        {
            Ok(log_file) => {
                env_logger::Builder::new()
                    .filter_level(log::LevelFilter::Debug)
                    .target(env_logger::Target::Pipe(Box::new(log_file)))
                    .init();
            }
            Err(e) => {
                eprintln!("Warning: Failed to open ttsdiag.log for debug logging: {}", e);
                eprintln!("Continuing without file logging...");
                env_logger::Builder::new()
                    .filter_level(log::LevelFilter::Warn)
                    .init();
            }
        }

        info!(
            "ttsdiag version {} starting (debug mode, logging to ttsdiag.log)",
            ttsdiag::VERSION
        );
    } else {
        // Errors only unless RUST_LOG asks for more
        env_logger::Builder::new()
            .filter_level(log::LevelFilter::Error)
            .parse_default_env()
            .init();
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.debug);

    if let Err(e) = run(cli) {
        error!("Fatal error: {:#}", e);
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<Config> {
    match path {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("loading config {}", path.display())),
        None => Config::load().context("loading ~/.ttsdiag.cfg"),
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let workdir = match cli.workdir {
        Some(dir) => dir,
        None => std::env::current_dir().context("resolving current directory")?,
    };
    let runner = SystemRunner::new();
    let stdout = io::stdout();

    match cli.command {
        Commands::Probe { json } => {
            let config = load_config(cli.config.as_ref())?;
            let report = probe::run_probe(&runner, &config, &workdir);
            if json {
                let text = serde_json::to_string_pretty(&report).context("serializing report")?;
                println!("{}", text);
            } else {
                render_probe(&report, &mut Console::new(stdout.lock()))?;
            }
        }
        Commands::Guide => {
            let config = load_config(cli.config.as_ref())?;
            let report = guide::generate(&runner, &config, &workdir);
            render_guide(&report, &mut Console::new(stdout.lock()))?;
        }
        Commands::Config { write } => {
            let config = if write {
                let path = cli.config.clone().unwrap_or_else(|| Config::default().path().to_path_buf());
                let config = Config::defaults_at(path);
                config.save()?;
                println!("Wrote defaults to {}", config.path().display());
                config
            } else {
                load_config(cli.config.as_ref())?
            };
            print_config(&config);
        }
    }
    Ok(())
}

fn print_config(config: &Config) {
    println!("Configuration: {}", config.path().display());
    println!("  Synthesis tool: {} (bundled: {})", config.tool_name(), config.local_tool().display());
    println!("  Voice: {}", config.voice());
    println!("  Text: {}", config.synthesis_text());
    println!("  Synthesis timeout: {:?}", config.synthesis_timeout());
    let players: Vec<String> = config.players().iter().map(|p| p.to_string()).collect();
    println!("  Players: {}", players.join(", "));
    println!("  Playback timeout: {:?}", config.playback_timeout());
    println!("  Engine timeout: {:?}", config.engine_timeout());
    println!("  Application process: {}", config.process_name());
    println!("  Guide output: {}", config.guide_output().display());
}
