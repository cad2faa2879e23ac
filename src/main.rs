use clap::Parser;
use color_eyre::Result;
use std::path::PathBuf;
use std::sync::mpsc::channel;
use std::sync::Arc;

use chartui::panel::Framework;
use chartui::providers::{DashboardStubMode, StubDashboard};
use chartui::{App, AppConfig, AppEvent, CacheManager, ConfigManager, Theme, APP_NAME};
use ratatui::DefaultTerminal;

#[derive(Parser, Debug)]
#[command(version, about = "chartui")]
struct Args {
    /// Query file (JSON) to open in the playground
    path: PathBuf,

    /// Charting library to select at startup
    #[arg(long = "library")]
    library: Option<String>,

    /// Framework to select at startup (vanilla, react, angular, vue)
    #[arg(long = "framework")]
    framework: Option<String>,

    /// Chart type passed to the code generator (line, bar, area, pie)
    #[arg(long = "chart-type")]
    chart_type: Option<String>,

    /// Attach a stub dashboard source (supported, unsupported, broken)
    #[arg(long = "dashboard")]
    dashboard: Option<String>,

    /// Render only the chart, hiding tabs and actions
    #[arg(long = "hide-actions", action)]
    hide_actions: bool,

    /// Enable debug logging to the cache directory
    #[arg(long = "debug", action)]
    debug: bool,

    /// Clear all cache data and exit
    #[arg(long = "clear-cache", action)]
    clear_cache: bool,

    /// Write the default config file and exit
    #[arg(long = "init-config", action)]
    init_config: bool,

    /// Overwrite an existing config file with --init-config
    #[arg(long = "force", action)]
    force: bool,
}

fn parse_framework(id: &str) -> Result<Framework> {
    Framework::ALL
        .into_iter()
        .find(|f| f.id() == id)
        .ok_or_else(|| color_eyre::eyre::eyre!("Unknown framework: {}", id))
}

fn parse_dashboard_mode(mode: &str) -> Result<DashboardStubMode> {
    match mode {
        "supported" => Ok(DashboardStubMode::Supported),
        "unsupported" => Ok(DashboardStubMode::Unsupported),
        "broken" => Ok(DashboardStubMode::Broken),
        other => Err(color_eyre::eyre::eyre!(
            "Unknown dashboard mode: {}. Expected supported, unsupported, or broken",
            other
        )),
    }
}

fn render(terminal: &mut DefaultTerminal, app: &mut App) -> Result<()> {
    terminal.draw(|frame| frame.render_widget(app, frame.area()))?;
    Ok(())
}

fn build_app(tx: std::sync::mpsc::Sender<AppEvent>, args: &Args, config: &AppConfig) -> Result<App> {
    let mut app = App::new(tx)
        .with_theme(Theme::from_config(config)?)
        .with_cache_manager(CacheManager::new(APP_NAME)?)
        .with_hide_actions(args.hide_actions);

    if let Some(library) = args
        .library
        .clone()
        .or_else(|| config.playground.charting_library.clone())
    {
        app = app.with_charting_library(library);
    }
    if let Some(framework) = args
        .framework
        .as_deref()
        .or(config.playground.framework.as_deref())
    {
        app = app.with_framework(parse_framework(framework)?);
    }
    if let Some(chart_type) = args
        .chart_type
        .clone()
        .or_else(|| config.playground.chart_type.clone())
    {
        app = app.with_chart_type(chart_type);
    }
    if let Some(mode) = args.dashboard.as_deref() {
        let mode = parse_dashboard_mode(mode)?;
        app = app.with_dashboard_source(Arc::new(StubDashboard::new(mode)));
    }

    Ok(app)
}

fn run(mut terminal: DefaultTerminal, args: &Args, config: &AppConfig) -> Result<()> {
    let (tx, rx) = channel::<AppEvent>();
    let mut app = build_app(tx.clone(), args, config)?;
    render(&mut terminal, &mut app)?;
    tx.send(AppEvent::Open(args.path.clone()))?;
    // The demo renderer is ready as soon as the first frame is drawn;
    // this is the one (and only) firing of the readiness signal.
    tx.send(AppEvent::RendererReady)?;

    let poll_interval = std::time::Duration::from_millis(config.performance.event_poll_interval_ms);

    loop {
        if crossterm::event::poll(poll_interval)? {
            match crossterm::event::read()? {
                crossterm::event::Event::Key(key) => tx.send(AppEvent::Key(key))?,
                crossterm::event::Event::Resize(cols, rows) => {
                    tx.send(AppEvent::Resize(cols, rows))?
                }
                _ => {}
            }
        }

        let updated = match rx.recv_timeout(std::time::Duration::from_millis(0)) {
            Ok(event) => {
                match event {
                    AppEvent::Exit => break,
                    AppEvent::Crash(msg) => {
                        return Err(color_eyre::eyre::eyre!(msg));
                    }
                    event => {
                        if let Some(event) = app.event(&event) {
                            tx.send(event)?;
                        }
                    }
                }
                true
            }
            Err(std::sync::mpsc::RecvTimeoutError::Timeout) => false,
            Err(std::sync::mpsc::RecvTimeoutError::Disconnected) => break,
        };

        if updated {
            render(&mut terminal, &mut app)?;
        }
    }
    Ok(())
}

fn handle_early_exit_flags(args: &Args) -> Result<Option<()>> {
    if args.clear_cache {
        match CacheManager::new(APP_NAME) {
            Ok(cache) => {
                if let Err(e) = cache.clear_all() {
                    eprintln!("Error clearing cache: {}", e);
                    std::process::exit(1);
                }
                println!("Cache cleared successfully");
                return Ok(Some(()));
            }
            Err(_e) => {
                println!("No cache to clear");
                return Ok(Some(()));
            }
        }
    }

    if args.init_config {
        match ConfigManager::new(APP_NAME) {
            Ok(config) => match config.write_default_config(args.force) {
                Ok(path) => {
                    println!("Config written to {}", path.display());
                    return Ok(Some(()));
                }
                Err(e) => {
                    eprintln!("Error writing config: {}", e);
                    std::process::exit(1);
                }
            },
            Err(e) => {
                eprintln!("Error initializing config manager: {}", e);
                std::process::exit(1);
            }
        }
    }

    Ok(None)
}

/// Route debug logging to a file in the cache directory; the terminal
/// belongs to the TUI.
fn init_tracing(args: &Args, config: &AppConfig) -> Result<()> {
    if !(args.debug || config.debug.enabled) {
        return Ok(());
    }
    let cache = CacheManager::new(APP_NAME)?;
    cache.ensure_cache_dir()?;
    let file = std::fs::File::create(cache.cache_file("debug.log"))?;
    tracing_subscriber::fmt()
        .with_writer(Arc::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    if let Some(()) = handle_early_exit_flags(&args)? {
        return Ok(());
    }

    color_eyre::install()?;
    let config = AppConfig::load(APP_NAME)?;
    init_tracing(&args, &config)?;
    let terminal = ratatui::init();
    let result = run(terminal, &args, &config);
    ratatui::restore();
    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
    Ok(())
}
