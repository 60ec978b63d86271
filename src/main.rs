use std::io;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tracing::{error, info};

use term_menus::app::MenuApp;
use term_menus::config::Config;
use term_menus::drivers::console::{ConsoleInputDriver, ConsoleOutputDriver};
use term_menus::drivers::{InputDriver, OutputDriver};
use term_menus::event_loop::{ControlFlow, EventLoop};
use term_menus::layout::Viewport;
use term_menus::tracing_sub;

/// Interactive demo of dropdown menus and select controls.
///
/// Click the menu bar to open menus and nested rows to open submenus. Tab
/// moves between selects; arrows, Enter and Esc drive them. Ctrl+Q quits.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Extra template files, on top of those named in the config.
    #[arg(short, long = "templates", value_name = "FILE")]
    templates: Vec<PathBuf>,

    /// Write logs here instead of stderr.
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,
}

fn main() -> io::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::from_toml_file(path).map_err(io::Error::other)?,
        None => Config::default(),
    };
    config.templates.extend(cli.templates);
    let log_file = cli.log_file.or_else(|| config.log_file.clone());
    tracing_sub::init_default(log_file.as_deref())?;

    let (width, height) = crossterm::terminal::size()?;
    let mut app = MenuApp::new(Viewport::new(width, height), &config).map_err(|err| {
        error!("failed to build demo: {err}");
        io::Error::other(err)
    })?;

    let mut output = ConsoleOutputDriver::new()?;
    output.enter()?;
    let mut event_loop = EventLoop::new(ConsoleInputDriver::new(), Duration::from_millis(16));
    event_loop.driver().set_mouse_capture(true)?;
    info!(width, height, "demo started");

    let result = event_loop.run(|_, event| match event {
        None => {
            output.draw(|mut frame| app.draw(&mut frame))?;
            Ok(ControlFlow::Continue)
        }
        Some(event) => Ok(app.handle_event(&event)),
    });

    output.exit()?;
    if let Some(action) = app.last_action() {
        info!(action, "last menu action");
    }
    result
}
