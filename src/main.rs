//! pyhl - highlight a Python file in the terminal
//!
//! Drives the same debounced pass an editor widget would get and prints
//! the result with 24-bit colors.

use std::env;
use std::io;
use std::path::PathBuf;
use std::process;

use tracing::{debug, warn, Level};

use pyhl::{
    render, Config, HighlightController, HighlightError, Highlighter, MemoryBuffer, PassOutcome, Result,
    TextBuffer, ThemeConfig, ThemeRegistry,
};

struct Args {
    file: Option<PathBuf>,
    theme: Option<String>,
    verbose: bool,
    check: bool,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let Some(args) = parse_args()? else {
        return Ok(());
    };

    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_max_level(if args.verbose { Level::DEBUG } else { Level::WARN })
        .init();

    let config = Config::load();
    let theme = select_theme(&config, args.theme.as_deref())?;

    let path = args
        .file
        .ok_or_else(|| HighlightError::Message("no input file (try --help)".to_string()))?;
    let mut buffer = MemoryBuffer::from_file(&path)?;
    if args.check {
        Highlighter::new()?.check(&buffer.text())?;
        println!("{}: ok", path.display());
        return Ok(());
    }
    debug!(file = %path.display(), lines = buffer.line_count(), theme = %theme.name, "highlighting");

    let mut controller = HighlightController::polling(&config, theme)?;
    controller.attach(&mut buffer);
    match controller.settle(&mut buffer) {
        Some(PassOutcome::Highlighted { mode, applied, skipped }) => {
            debug!(?mode, applied, skipped, "pass complete");
        }
        outcome => warn!(?outcome, "no highlight pass ran"),
    }

    render::render(&mut io::stdout(), &buffer, true)
}

/// Parse command line arguments; `None` means help or version was printed
fn parse_args() -> Result<Option<Args>> {
    let mut args = Args {
        file: None,
        theme: None,
        verbose: false,
        check: false,
    };

    let mut iter = env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--help" | "-h" => {
                print_usage();
                return Ok(None);
            }
            "--version" | "-V" => {
                print_version();
                return Ok(None);
            }
            "--verbose" | "-v" => args.verbose = true,
            "--check" | "-c" => args.check = true,
            "--theme" | "-t" => {
                let name = iter
                    .next()
                    .ok_or_else(|| HighlightError::Message(format!("{arg} needs a theme name")))?;
                args.theme = Some(name);
            }
            s if s.starts_with('-') => {
                return Err(HighlightError::Message(format!("unknown option '{s}'")));
            }
            _ => args.file = Some(PathBuf::from(arg)),
        }
    }

    Ok(Some(args))
}

/// Resolve the theme: command line, then config, with `theme-file` registered first
fn select_theme(config: &Config, requested: Option<&str>) -> Result<ThemeConfig> {
    let mut registry = ThemeRegistry::new();
    if let Some(path) = &config.theme_file {
        match ThemeConfig::load(path, &registry) {
            Ok(theme) => registry.insert(theme),
            Err(e) => warn!(error = %e, path = %path.display(), "cannot load theme file"),
        }
    }

    let name = requested.unwrap_or(&config.theme);
    registry.get(name).cloned().ok_or_else(|| {
        let known: Vec<&str> = registry.names().collect();
        HighlightError::Theme(format!("unknown theme '{}' (available: {})", name, known.join(", ")))
    })
}

fn print_usage() {
    println!("pyhl {} - Python syntax highlighter", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Usage: pyhl [OPTIONS] FILE");
    println!();
    println!("Options:");
    println!("  -t, --theme NAME  Color theme (Light, Dark or one from theme-file)");
    println!("  -c, --check       Report the first syntax error instead of printing");
    println!("  -v, --verbose     Log highlight passes to stderr");
    println!("  -h, --help        Show this help message");
    println!("  -V, --version     Show version information");
    println!();
    println!("Settings are read from ~/.pyhl.conf");
}

fn print_version() {
    println!("pyhl {}", env!("CARGO_PKG_VERSION"));
}
