//! mermaid-inline - view a Mermaid diagram inline with zoom controls.
//!
//! # Usage
//!
//! ```bash
//! mermaid-inline flow.mmd
//! mermaid-inline --watch --theme dark flow.mmd
//! mermaid-inline --html - flow.mmd > flow.html
//! ```

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};

use mermaid_inline::app::App;
use mermaid_inline::config::{
    ConfigFlags, ThemeMode, clear_config_flags, global_config_path, load_config_flags,
    local_override_path, parse_flag_tokens, save_config_flags,
};
use mermaid_inline::perf;
use mermaid_inline::theme::PaletteMode;
use mermaid_inline::ui::render_once;
use mermaid_inline::zoom::Zoom;

/// View a Mermaid diagram inline with zoom controls
#[derive(Parser, Debug)]
#[command(name = "mermaid-inline", version, about, long_about = None)]
struct Cli {
    /// Mermaid source file to view
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Watch file for changes and auto-reload
    #[arg(short, long)]
    watch: bool,

    /// Diagram palette (light or dark); auto asks the terminal
    #[arg(long, value_enum, default_value = "auto")]
    theme: ThemeMode,

    /// Initial zoom, e.g. 1.4 or 140%
    #[arg(long, value_name = "SCALE")]
    scale: Option<Zoom>,

    /// Render once, write the HTML fragment to PATH (or - for stdout) and exit
    #[arg(long, value_name = "PATH")]
    html: Option<PathBuf>,

    /// Extra class for the HTML fragment's outer element
    #[arg(long = "class", value_name = "NAME")]
    class_name: Option<String>,

    /// Enable startup performance logging
    #[arg(long)]
    perf: bool,

    /// Write detailed render/image debug events to a file
    #[arg(long, value_name = "PATH")]
    render_debug_log: Option<PathBuf>,

    /// Force image rendering to use half-cell fallback mode
    #[arg(long)]
    force_half_cell: bool,

    /// Save current command-line flags as defaults
    #[arg(long)]
    save: bool,

    /// Clear saved defaults
    #[arg(long)]
    clear: bool,
}

// Query the terminal background using OSC 11.
// We talk to /dev/tty so the terminal responds even when stdout is piped.
// On non-Unix platforms the query is skipped: the stdin fallback leaves an
// orphaned reader thread that swallows console input.
#[cfg(not(unix))]
fn query_terminal_background() -> std::io::Result<Option<(u8, u8, u8)>> {
    Ok(None)
}

#[cfg(unix)]
fn query_terminal_background() -> std::io::Result<Option<(u8, u8, u8)>> {
    use std::io::Read;
    use std::sync::mpsc;

    let (tx, rx) = mpsc::channel();

    let mut io = std::fs::OpenOptions::new()
        .read(true)
        .write(true)
        .open("/dev/tty")?;
    let reader = io.try_clone()?;

    // OSC 11 query: ESC ] 11 ; ? BEL
    io.write_all(b"\x1b]11;?\x07")?;
    io.flush()?;

    std::thread::spawn(move || {
        let mut reader = reader;
        let mut buf = [0u8; 256];
        let mut collected: Vec<u8> = Vec::new();
        loop {
            match reader.read(&mut buf) {
                Ok(0) => {}
                Ok(n) => {
                    collected.extend_from_slice(&buf[..n]);
                    if collected.contains(&b'\x07') || collected.windows(2).any(|w| w == b"\x1b\\")
                    {
                        let _ = tx.send(collected);
                        break;
                    }
                }
                Err(_) => break,
            }
        }
    });

    let Ok(collected) = rx.recv_timeout(std::time::Duration::from_millis(75)) else {
        tracing::debug!("no OSC 11 reply from terminal");
        return Ok(None);
    };
    let text = String::from_utf8_lossy(&collected);
    Ok(parse_osc11_reply(&text))
}

fn detect_palette() -> Option<PaletteMode> {
    let _raw = enable_raw_mode();
    let result = query_terminal_background();
    let _ = disable_raw_mode();
    let (r, g, b) = result.ok().flatten()?;
    let mode = PaletteMode::from_background_rgb(r, g, b);
    tracing::debug!(r, g, b, mode = mode.label(), "detected terminal background");
    Some(mode)
}

fn parse_osc11_reply(reply: &str) -> Option<(u8, u8, u8)> {
    // Expect: ESC ] 11 ; rgb:RRRR/GGGG/BBBB BEL or ST
    let start = reply.find("rgb:")?;
    let data = &reply[start + 4..];
    let mut parts = data.split(['/', '\x07', '\x1b']);
    let r = parts.next()?;
    let g = parts.next()?;
    let b = parts.next()?;
    Some((
        parse_osc_component(r)?,
        parse_osc_component(g)?,
        parse_osc_component(b)?,
    ))
}

fn parse_osc_component(s: &str) -> Option<u8> {
    let hex = s.trim();
    if hex.len() >= 4 {
        let v = u16::from_str_radix(hex.get(..4)?, 16).ok()?;
        u8::try_from(v >> 8).ok()
    } else if hex.len() == 2 {
        u8::from_str_radix(hex, 16).ok()
    } else {
        None
    }
}

fn write_html(target: &Path, html: &str) -> Result<()> {
    if target == Path::new("-") {
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{html}").context("Failed to write HTML to stdout")
    } else {
        std::fs::write(target, format!("{html}\n"))
            .with_context(|| format!("Failed to write {}", target.display()))
    }
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let raw_args = std::env::args().collect::<Vec<_>>();
    let cli = Cli::parse();
    let global_path = global_config_path();
    let local_path = local_override_path();
    let cli_flags = parse_flag_tokens(&raw_args);

    if cli.clear {
        clear_config_flags(&global_path)?;
    }
    if cli.save {
        save_config_flags(&global_path, &cli_flags)?;
    }

    let file_flags = if cli.clear {
        ConfigFlags::default()
    } else {
        let global_flags = load_config_flags(&global_path)?;
        let local_flags = load_config_flags(&local_path)?;
        global_flags.union(&local_flags)
    };
    let effective = file_flags.union(&cli_flags);

    perf::set_enabled(effective.perf);
    let render_debug_log_path = effective
        .render_debug_log
        .clone()
        .or_else(|| std::env::var_os("MERMAID_INLINE_RENDER_DEBUG_LOG").map(PathBuf::from));
    if let Err(err) = perf::set_debug_log_path(render_debug_log_path.as_deref()) {
        tracing::warn!(
            path = %render_debug_log_path
                .as_ref()
                .map_or_else(|| "<unset>".to_string(), |p| p.display().to_string()),
            error = %err,
            "failed to initialize render debug log"
        );
    }

    if !cli.file.exists() {
        anyhow::bail!("File not found: {}", cli.file.display());
    }
    let zoom = effective.scale.unwrap_or_default();
    let theme = effective.theme.unwrap_or(ThemeMode::Auto);

    if let Some(target) = cli.html.as_deref() {
        // No terminal to ask in batch mode; auto falls back to light.
        let palette = PaletteMode::resolve(theme, None);
        let source = std::fs::read_to_string(&cli.file)
            .with_context(|| format!("Failed to read {}", cli.file.display()))?;
        let html = {
            let _scope = perf::scope("html.render_once");
            render_once(&source, palette, zoom, cli.class_name.as_deref())
        };
        return write_html(target, &html);
    }

    let detected = if theme == ThemeMode::Auto {
        detect_palette()
    } else {
        None
    };
    let palette = PaletteMode::resolve(theme, detected);

    let mut app = App::new(cli.file)
        .with_watch(effective.watch)
        .with_palette(palette)
        .with_zoom(zoom)
        .with_force_half_cell(effective.force_half_cell);

    app.run().context("Application error")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_osc11_reply_with_bel() {
        let reply = "\x1b]11;rgb:1e1e/1e1e/2e2e\x07";
        assert_eq!(parse_osc11_reply(reply), Some((0x1e, 0x1e, 0x2e)));
    }

    #[test]
    fn test_parse_osc11_reply_with_st_and_short_components() {
        let reply = "\x1b]11;rgb:ff/ff/ff\x1b\\";
        assert_eq!(parse_osc11_reply(reply), Some((255, 255, 255)));
    }

    #[test]
    fn test_parse_osc11_reply_rejects_garbage() {
        assert_eq!(parse_osc11_reply("no colour here"), None);
        assert_eq!(parse_osc11_reply("rgb:zz/00/00"), None);
    }

    #[test]
    fn test_cli_parses_html_and_scale() {
        let cli = Cli::try_parse_from([
            "mermaid-inline",
            "--html",
            "-",
            "--scale",
            "140%",
            "--class",
            "chat",
            "flow.mmd",
        ])
        .unwrap();
        assert_eq!(cli.html, Some(PathBuf::from("-")));
        assert_eq!(cli.scale.map(Zoom::percent), Some(140));
        assert_eq!(cli.class_name.as_deref(), Some("chat"));
        assert_eq!(cli.theme, ThemeMode::Auto);
    }

    #[test]
    fn test_cli_rejects_bad_scale() {
        let result = Cli::try_parse_from(["mermaid-inline", "--scale", "huge", "flow.mmd"]);
        assert!(result.is_err());
    }
}
