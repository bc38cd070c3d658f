//! Line-oriented stdin console driving the market handle.

use anyhow::{Context, bail};
use common::shutdown::ShutdownSignal;
use market::{MarketHandle, SortDirection, SortField, SortSpec};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{info, warn};

pub const HELP: &str = "commands: track <mint> | pin <mint> | watch <mint> | untrack <mint> | \
sort <field> [asc|desc] | set key=value ... | quit";

#[derive(Debug, PartialEq)]
pub enum ConsoleCommand {
    Track(String),
    Pin(String),
    /// Flips the explicit-track flag without touching the pin.
    ToggleTrack(String),
    Untrack(String),
    Sort(SortSpec),
    Set(Vec<(String, String)>),
    Help,
    Quit,
}

/// Parses one input line. Blank lines yield `Ok(None)`.
pub fn parse_line(line: &str) -> anyhow::Result<Option<ConsoleCommand>> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(None);
    };
    let args: Vec<&str> = words.collect();

    let cmd = match (verb.to_ascii_lowercase().as_str(), args.as_slice()) {
        ("track", [mint]) => ConsoleCommand::Track(mint.to_string()),
        ("pin", [mint]) => ConsoleCommand::Pin(mint.to_string()),
        ("watch", [mint]) => ConsoleCommand::ToggleTrack(mint.to_string()),
        ("untrack", [mint]) => ConsoleCommand::Untrack(mint.to_string()),
        ("sort", [field, rest @ ..]) if rest.len() <= 1 => {
            let field: SortField = field.parse()?;
            let direction = match rest.first() {
                Some(dir) => dir.parse()?,
                None => SortDirection::Desc,
            };
            ConsoleCommand::Sort(SortSpec { field, direction })
        }
        ("set", pairs) if !pairs.is_empty() => {
            let patches = pairs
                .iter()
                .map(|pair| {
                    pair.split_once('=')
                        .map(|(k, v)| (k.to_string(), v.to_string()))
                        .with_context(|| format!("expected key=value, got `{pair}`"))
                })
                .collect::<anyhow::Result<Vec<_>>>()?;
            ConsoleCommand::Set(patches)
        }
        ("help" | "?", []) => ConsoleCommand::Help,
        ("quit" | "exit" | "q", []) => ConsoleCommand::Quit,
        (other, _) => bail!("cannot parse `{other}` with {} argument(s); {HELP}", args.len()),
    };
    Ok(Some(cmd))
}

/// Reads commands until EOF, `quit` or shutdown. `quit` triggers shutdown.
pub async fn run_console<R>(input: R, handle: MarketHandle, shutdown: ShutdownSignal)
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();
    loop {
        let line = tokio::select! {
            _ = shutdown.wait() => break,
            line = lines.next_line() => line,
        };

        let line = match line {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                warn!(error = %e, "console input failed");
                break;
            }
        };

        let cmd = match parse_line(&line) {
            Ok(Some(cmd)) => cmd,
            Ok(None) => continue,
            Err(e) => {
                eprintln!("{e}");
                continue;
            }
        };

        if cmd == ConsoleCommand::Quit {
            info!("quit requested from console");
            shutdown.trigger();
            break;
        }

        if let Err(e) = execute(cmd, &handle).await {
            eprintln!("{e}");
        }
    }
}

async fn execute(cmd: ConsoleCommand, handle: &MarketHandle) -> anyhow::Result<()> {
    match cmd {
        ConsoleCommand::Track(mint) => handle.track(mint).await?,
        ConsoleCommand::Pin(mint) => handle.toggle_pin(mint).await?,
        ConsoleCommand::ToggleTrack(mint) => handle.toggle_track(mint).await?,
        ConsoleCommand::Untrack(mint) => handle.untrack(mint).await?,
        ConsoleCommand::Sort(sort) => handle.set_sort(sort).await?,
        ConsoleCommand::Set(patches) => {
            let version = handle.patch_settings(patches).await?;
            eprintln!("settings applied (v{version})");
        }
        ConsoleCommand::Help => eprintln!("{HELP}"),
        ConsoleCommand::Quit => {}
    }
    Ok(())
}
