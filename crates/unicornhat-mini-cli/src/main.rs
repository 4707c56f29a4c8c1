//! Unicorn HAT Mini Control Tool
//!
//! CLI for drawing on the Unicorn HAT Mini LED matrix.

mod config;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use unicornhat_mini_hw::{
    Color, MemoryTransport, ScrollHandle, ScrollOptions, Transport, UnicornHatMini,
};

use config::Config;

#[derive(Parser)]
#[command(name = "unicornctl")]
#[command(about = "Control tool for the Unicorn HAT Mini LED matrix")]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Configuration file
    #[arg(short, long, default_value = "config/default.toml")]
    config: PathBuf,

    /// Record frames in memory instead of opening the SPI links
    #[arg(long)]
    dry_run: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fill the matrix with one colour
    Fill {
        /// Colour as r,g,b or #rrggbb
        color: Color,
    },
    /// Set a single pixel
    Pixel {
        /// Column (0-16)
        #[arg(allow_negative_numbers = true)]
        x: i32,
        /// Row (0-6)
        #[arg(allow_negative_numbers = true)]
        y: i32,
        /// Colour as r,g,b or #rrggbb
        color: Color,
    },
    /// Turn every pixel off
    Clear,
    /// Set the global brightness
    Brightness {
        /// Brightness (0.0-1.0)
        value: f32,
    },
    /// Draw a rainbow gradient
    Rainbow,
    /// Scroll text across the matrix
    Text {
        /// Text to scroll
        text: String,

        /// Delay between frames in milliseconds (default from config)
        #[arg(long)]
        interval_ms: Option<u64>,

        /// Repeat until interrupted
        #[arg(long = "loop")]
        looping: bool,

        /// Solid text colour (default: gradient)
        #[arg(long)]
        color: Option<Color>,
    },
    /// Print the effective configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = Config::load(&cli.config)
        .with_context(|| format!("Failed to load {}", cli.config.display()))?;

    if let Commands::Config = cli.command {
        print!("{}", config.to_toml()?);
        return Ok(());
    }

    if cli.dry_run {
        let left = MemoryTransport::new();
        let right = MemoryTransport::new();
        let display = UnicornHatMini::new(left.clone(), right.clone())?;
        run(display, cli.command, &config).await?;
        println!(
            "Dry run: {} frames to left link, {} frames to right link",
            left.frames().len(),
            right.frames().len()
        );
        return Ok(());
    }

    open_and_run(cli.command, &config).await
}

#[cfg(target_os = "linux")]
async fn open_and_run(command: Commands, config: &Config) -> Result<()> {
    let display = UnicornHatMini::open_paths(
        &config.links.left,
        &config.links.right,
        config.links.speed_hz,
    )
    .context("Failed to open the matrix. Is SPI enabled?")?;
    run(display, command, config).await
}

#[cfg(not(target_os = "linux"))]
async fn open_and_run(_command: Commands, _config: &Config) -> Result<()> {
    anyhow::bail!("SPI links are only available on Linux; use --dry-run")
}

async fn run<T: Transport>(
    mut display: UnicornHatMini<T>,
    command: Commands,
    config: &Config,
) -> Result<()> {
    config.apply(&mut display)?;

    match command {
        Commands::Fill { color } => {
            display.set_all(color.r, color.g, color.b);
            display.show()?;
            println!("Matrix filled with {}", color);
        }
        Commands::Pixel { x, y, color } => {
            display.set_pixel(x, y, color.r, color.g, color.b)?;
            display.show()?;
            println!("Pixel ({}, {}) set to {}", x, y, color);
        }
        Commands::Clear => {
            display.clear();
            display.show()?;
            println!("Matrix cleared");
        }
        Commands::Brightness { value } => {
            display.set_brightness(value)?;
            println!("Brightness set to {}", value);
        }
        Commands::Rainbow => {
            display.set_rainbow();
            display.show()?;
        }
        Commands::Text {
            text,
            interval_ms,
            looping,
            color,
        } => {
            let options = ScrollOptions {
                interval: Duration::from_millis(interval_ms.unwrap_or(config.scroll.interval_ms)),
                looping,
                color,
            };
            scroll(&mut display, &text, &options).await?;
        }
        Commands::Config => print!("{}", config.to_toml()?),
    }

    Ok(())
}

async fn scroll<T: Transport>(
    display: &mut UnicornHatMini<T>,
    text: &str,
    options: &ScrollOptions,
) -> Result<()> {
    let handle = ScrollHandle::new();

    let stopper = handle.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received SIGINT, stopping scroll");
            stopper.stop();
        }
    });

    display
        .scroll_text(
            text,
            options,
            &handle,
            Some(|| info!("Scroll of {:?} complete", text)),
        )
        .await
        .context("Scroll failed")?;

    if handle.is_stopped() {
        display.clear();
        if let Err(e) = display.show() {
            warn!("Failed to blank the matrix: {}", e);
        }
    }
    Ok(())
}
