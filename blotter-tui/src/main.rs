//! Blotter TUI — a desk blotter and the combined blotter side by side in
//! one terminal, exchanging orders over the shared in-process bus.
//!
//! Panels:
//! 1. Desk — draft orders, execute them, send them to the combined app
//! 2. Combined — the aggregator blotter receiving orders from the desk
//! 3. Help — keyboard shortcuts

mod app;
mod input;
mod theme;
mod ui;

use std::io::{self, stdout};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use blotter_core::{BlotterConfig, ContextBus, InProcessBus, Session};

use crate::app::AppState;

const CONFIG_PATH: &str = "blotter.toml";

fn main() -> Result<()> {
    // Install a panic hook that restores the terminal before printing the panic.
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stderr(), LeaveAlternateScreen);
        default_hook(info);
    }));

    // Optional config file in the working directory.
    let config = if Path::new(CONFIG_PATH).exists() {
        BlotterConfig::from_file(CONFIG_PATH)?
    } else {
        BlotterConfig::default()
    };

    // One bus, two apps.
    let bus: Arc<dyn ContextBus> = Arc::new(InProcessBus::new());
    let desk = Session::connect(config.desk_app(), Arc::clone(&bus), config.fill_settings());
    let combined = Session::connect(
        config.combined_app(),
        Arc::clone(&bus),
        config.fill_settings(),
    );

    let mut app = AppState::new(desk, combined, config.combined_app(), config.draft.clone());

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // Run the main event loop
    let result = run_app(&mut terminal, &mut app);

    // Stop fill chains and release bus listeners before tearing down.
    let AppState { desk, combined, .. } = app;
    desk.session.shutdown();
    combined.session.shutdown();

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut AppState,
) -> Result<()> {
    loop {
        // 1. Render
        terminal.draw(|f| ui::draw(f, app))?;

        // 2. Drain bus traffic and fill events (non-blocking)
        app.pump_sessions();

        // 3. Poll for input events (50ms timeout for ~20 FPS tick)
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                input::handle_key(app, key);
            }
        }

        // 4. Check quit
        if !app.running {
            break;
        }
    }
    Ok(())
}
