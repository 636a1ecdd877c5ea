//! CLI module for Sketchbot
//!
//! One-shot device commands plus an interactive drawing console:
//! - `position`, `move`, `command`: direct arm control
//! - `draw`: send a stroke file as one path
//! - `image`: show the current reference image
//! - `console`: line-oriented drawing session

use clap::{Parser, Subcommand};
use sketchbot_core::{Category, Notifier};
use sketchbot_device::DeviceCommand;
use std::path::PathBuf;

use crate::app::{self, AppConfig};

pub mod console;
pub mod device;

/// Sketchbot drawing console
#[derive(Parser, Debug)]
#[command(name = "sketchbot")]
#[command(about = "Draw on a canvas and mirror it on a robotic arm")]
#[command(version)]
pub struct Cli {
    /// Arm controller URL (overrides configuration)
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Read the current arm position
    Position,
    /// Move the arm to an absolute position
    Move {
        #[arg(long, allow_negative_numbers = true)]
        x: i32,
        #[arg(long, allow_negative_numbers = true)]
        y: i32,
        #[arg(long, allow_negative_numbers = true)]
        z: i32,
        #[arg(long, allow_negative_numbers = true, default_value_t = 0)]
        e: i32,
    },
    /// Run a named arm command (home, reset, stop, setworkheight, testworkheight)
    Command {
        name: DeviceCommand,
    },
    /// Send a JSON stroke file as a single path
    Draw {
        file: PathBuf,
    },
    /// Show the current reference image
    Image,
    /// Start an interactive drawing session (default)
    Console,
}

/// Prints notifications straight to the terminal
#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutNotifier;

impl Notifier for StdoutNotifier {
    fn notify(&self, category: Category, message: String) {
        println!("{}", render(category, &message));
    }
}

pub(crate) fn render(category: Category, message: &str) -> String {
    let icon = match category {
        Category::Success => "✅",
        Category::Error => "❌",
        Category::Info => "ℹ️ ",
    };
    format!("{icon} {message}")
}

/// Run the CLI command
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = app::load_config()?;
    if let Some(url) = cli.base_url {
        config.device.base_url = url;
    }

    match cli.command.unwrap_or(Commands::Console) {
        Commands::Position => device::position(&config).await,
        Commands::Move { x, y, z, e } => device::move_to(&config, [x, y, z, e]).await,
        Commands::Command { name } => device::command(&config, name).await,
        Commands::Draw { file } => device::draw(&config, &file).await,
        Commands::Image => device::image(&config).await,
        Commands::Console => console::run(config).await,
    }
}

fn one_shot_dispatcher(config: &AppConfig) -> anyhow::Result<sketchbot_core::CommandDispatcher> {
    app::dispatcher(config, std::sync::Arc::new(StdoutNotifier))
}
