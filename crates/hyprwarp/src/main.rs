use clap::{Parser, Subcommand};
use hyprwarp::wm::{self, Point};
use std::io::{BufRead, BufReader, Write};
use std::os::unix::net::UnixStream;
use std::path::PathBuf;

const SOCKET_PATH: &str = "/tmp/corolla.sock";

#[derive(Parser, Debug)]
#[command(name = "hyprwarp", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
enum Commands {
    /// Open a menu from the corolla config and print its events.
    Show {
        /// Name of the configured menu
        menu: String,
    },
    /// Open a configured menu centered on the monitor, for editing.
    Edit { menu: String },
    /// Open a menu described by a JSON file.
    ShowFile { path: PathBuf },
    /// Hide the open menu without reporting a cancel.
    Hide,
    /// Cancel the open menu.
    Cancel,
    /// Move the pointer to a global position.
    Warp { x: f64, y: f64 },
    /// Print the pointer position and the focused monitor bounds.
    Where,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Show { menu } => open_session(&format!("show {menu}")),
        Commands::Edit { menu } => open_session(&format!("edit {menu}")),
        Commands::ShowFile { path } => {
            let raw = fs_err::read_to_string(&path)?;
            let structure: serde_json::Value = serde_json::from_str(&raw)?;
            open_session(&format!("show-json {}", serde_json::to_string(&structure)?))
        }
        Commands::Hide => send_command("hide").map(drop),
        Commands::Cancel => send_command("cancel").map(drop),
        Commands::Warp { x, y } => {
            wm::warp_cursor(Point::new(x, y))?;
            Ok(())
        }
        Commands::Where => {
            let cursor = wm::get_cursor_pos()
                .ok_or_else(|| anyhow::anyhow!("Could not query the cursor position"))?;
            println!("cursor {} {}", cursor.x, cursor.y);
            if let Some(bounds) = wm::get_active_monitor_bounds() {
                println!(
                    "monitor {} {} {} {}",
                    bounds.x, bounds.y, bounds.width, bounds.height
                );
            }
            Ok(())
        }
    }
}

/// Sends a show request and echoes the daemon's replies until the session ends.
fn open_session(cmd: &str) -> anyhow::Result<()> {
    let stream = send_command(cmd)?;
    let reader = BufReader::new(stream);

    for line in reader.lines() {
        let line = line?;
        println!("{line}");

        let done = serde_json::from_str::<serde_json::Value>(&line)
            .ok()
            .and_then(|v| v.get("event").and_then(|e| e.as_str()).map(str::to_owned))
            .is_some_and(|event| matches!(event.as_str(), "select" | "cancel" | "error" | "closed"));
        if done {
            break;
        }
    }
    Ok(())
}

fn send_command(cmd: &str) -> anyhow::Result<UnixStream> {
    let mut stream = UnixStream::connect(SOCKET_PATH).map_err(|e| {
        anyhow::anyhow!(
            "Failed to connect to corolla daemon at {}: {}. Is corolla running?",
            SOCKET_PATH,
            e
        )
    })?;

    log::debug!("sending '{}'", cmd);
    writeln!(stream, "{}", cmd)?;
    Ok(stream)
}
