use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use gesture_control::{GestureConfig, GestureKind};

#[derive(Parser, Debug)]
#[command(name = "config_check", about = "Validate a gesture configuration")]
struct Cli {
    /// Config file (default: the platform config dir)
    file: Option<PathBuf>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    let path = cli.file.or_else(GestureConfig::default_path);
    let result = match &path {
        Some(path) if path.exists() => {
            println!("Checking {}...\n", path.display());
            GestureConfig::load(path)
        }
        Some(path) => {
            println!("No config at {}, checking built-in defaults\n", path.display());
            let config = GestureConfig::default();
            config.validate().map(|_| config)
        }
        None => {
            println!("No config directory available, checking built-in defaults\n");
            let config = GestureConfig::default();
            config.validate().map(|_| config)
        }
    };

    match result {
        Ok(config) => {
            println!("✓ Configuration valid");
            println!(
                "✓ Pinch band {} / {} px, palm band {} / {}",
                config.pinch.close_threshold,
                config.pinch.open_threshold,
                config.palm.close_threshold,
                config.palm.open_threshold
            );
            let disabled: Vec<&str> = GestureKind::ALL
                .iter()
                .filter(|k| !config.is_enabled(**k))
                .map(|k| k.as_str())
                .collect();
            if disabled.is_empty() {
                println!("✓ All gestures enabled");
            } else {
                println!("✓ Disabled gestures: {}", disabled.join(", "));
            }
            match serde_json::to_string_pretty(&config) {
                Ok(json) => println!("\nEffective settings:\n{}", json),
                Err(e) => println!("✗ Failed to print settings: {}", e),
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            println!("✗ {}", e);
            ExitCode::FAILURE
        }
    }
}
