use std::fs::OpenOptions;
use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event;
use crossterm::execute;
use crossterm::style::{Attribute, SetAttribute};
use crossterm::terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use tokio::sync::mpsc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use vtdash_client::HttpApiClient;
use vtdash_core::config::{Config, LoggingConfig};
use vtdash_core::TabId;
use vtdash_tui::terminal::{
    compose_frame, map_event, max_scroll, HostCommand, ScreenPainter, StatusLine,
};
use vtdash_tui::{LoadOutcome, NavigationController, RefreshScheduler, ViewContext};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Html,
}

#[derive(Debug, Parser)]
#[command(name = "vtdash", version, about = "Read-only terminal dashboard for the VTAdmin API")]
struct Cli {
    /// VTAdmin API base URL (overrides config and VTDASH_API_BASE).
    #[arg(long, value_name = "URL")]
    api_base: Option<String>,

    /// Starting address query, e.g. `tab=vschema&keyspace=c1/commerce`.
    #[arg(long, value_name = "QUERY", default_value = "")]
    query: String,

    /// Auto-refresh interval in seconds; 0 turns auto-refresh off.
    #[arg(long, value_name = "SECONDS")]
    refresh: Option<u64>,

    /// Load the selected tab once, print it and exit.
    #[arg(long)]
    once: bool,

    /// Snapshot output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Configuration file (YAML).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("vtdash: {err}");
            std::process::exit(2);
        }
    }
}

fn run(cli: Cli) -> Result<i32, String> {
    let mut config = Config::load(cli.config.as_deref()).map_err(|err| err.to_string())?;
    apply_cli_overrides(&mut config, &cli);
    config.validate().map_err(|err| err.to_string())?;

    let interactive = !cli.once && io::stdin().is_terminal() && io::stdout().is_terminal();
    init_logging(&config.logging, interactive)?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|err| format!("start runtime: {err}"))?;
    runtime.block_on(run_async(cli, config, interactive))
}

fn apply_cli_overrides(config: &mut Config, cli: &Cli) {
    if let Some(base) = cli.api_base.as_deref().map(str::trim).filter(|b| !b.is_empty()) {
        config.api.base_url = base.to_string();
    }
    match cli.refresh {
        Some(0) => config.refresh.enabled = false,
        Some(seconds) => {
            config.refresh.enabled = true;
            config.refresh.interval_seconds = seconds;
        }
        None => {}
    }
}

fn init_logging(logging: &LoggingConfig, interactive: bool) -> Result<(), String> {
    let level = logging.level.trim().to_lowercase();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let json = logging.format.trim().eq_ignore_ascii_case("json");
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let file = logging.file.trim();
    let result = if !file.is_empty() {
        let handle = OpenOptions::new()
            .create(true)
            .append(true)
            .open(file)
            .map_err(|err| format!("open log file {file}: {err}"))?;
        let writer = Mutex::new(handle);
        if json {
            builder.json().with_ansi(false).with_writer(writer).try_init()
        } else {
            builder.with_ansi(false).with_writer(writer).try_init()
        }
    } else if interactive {
        // Anything written to the terminal would tear the frame.
        builder.with_writer(io::sink).try_init()
    } else if json {
        builder.json().with_writer(io::stderr).try_init()
    } else {
        builder.with_writer(io::stderr).try_init()
    };
    result.map_err(|err| format!("init logging: {err}"))
}

fn initial_location(base_path: &str, query: &str) -> String {
    let query = query.trim().trim_start_matches('?');
    if query.is_empty() {
        base_path.to_string()
    } else {
        format!("{base_path}?{query}")
    }
}

async fn run_async(cli: Cli, config: Config, interactive: bool) -> Result<i32, String> {
    let client = HttpApiClient::with_timeout(config.api.base_url.clone(), config.request_timeout())
        .map_err(|err| err.to_string())?;
    info!(api = %client.base_url(), interactive, "vtdash starting");

    let ctx = Arc::new(ViewContext::new(Arc::new(client)));
    let nav = NavigationController::new(
        ctx,
        initial_location(&config.ui.base_path, &cli.query),
        config.ui.base_path.clone(),
        config.default_tab(),
    );

    if interactive {
        run_interactive(nav, &config).await?;
        Ok(0)
    } else {
        run_snapshot(nav, cli.format).await
    }
}

async fn run_snapshot(mut nav: NavigationController, format: OutputFormat) -> Result<i32, String> {
    let outcome = nav
        .initialize()
        .await
        .map_err(|err| format!("load task failed: {err}"))?;
    let tab = nav.current_tab().unwrap_or(TabId::DEFAULT);
    let fragment = nav.context().regions().fragment(tab);
    let rendered = match format {
        OutputFormat::Text => fragment.plain_text(),
        OutputFormat::Html => fragment.to_html(),
    };

    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{rendered}").map_err(|err| format!("write output: {err}"))?;
    Ok(match outcome {
        LoadOutcome::Failed { .. } => 1,
        _ => 0,
    })
}

async fn run_interactive(mut nav: NavigationController, config: &Config) -> Result<(), String> {
    let mut session =
        TerminalSession::enter().map_err(|err| format!("enter terminal mode: {err}"))?;
    let (mut width, mut height) =
        terminal::size().map_err(|err| format!("read terminal size: {err}"))?;

    let mut events = spawn_event_reader();
    let mut changes = nav.context().regions().subscribe();
    let toggle_interval = Duration::from_secs(config.refresh.interval_seconds);
    let mut scheduler = RefreshScheduler::new();
    if let Some(interval) = config.refresh_interval() {
        scheduler.enable_reload(interval, nav.context());
    }

    drop(nav.initialize());
    let mut painter = ScreenPainter::default();
    let mut scroll = 0usize;

    loop {
        let body = current_body(&nav);
        scroll = scroll.min(max_scroll(body.len(), height));
        let status = StatusLine {
            location: nav.location().to_string(),
            refresh_secs: scheduler.interval().map(|interval| interval.as_secs()),
            loading: nav
                .current_tab()
                .is_some_and(|tab| nav.context().regions().fragment(tab).is_loading()),
        };
        let frame = compose_frame(nav.current_tab(), &body, scroll, &status, width, height);
        painter
            .paint(&mut session.stdout, &frame)
            .map_err(|err| format!("render frame: {err}"))?;

        tokio::select! {
            changed = changes.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            next = events.recv() => {
                let Some(next) = next else {
                    break;
                };
                let Some(command) = map_event(&next) else {
                    continue;
                };
                let page = usize::from(height.saturating_sub(3)).max(1);
                match command {
                    HostCommand::Quit => break,
                    HostCommand::Activate(tab) => {
                        scroll = 0;
                        drop(nav.activate_tab(tab, true));
                    }
                    HostCommand::NextTab | HostCommand::PrevTab => {
                        let current = nav.current_tab().unwrap_or(TabId::DEFAULT);
                        let tab = if command == HostCommand::NextTab {
                            current.next()
                        } else {
                            current.prev()
                        };
                        scroll = 0;
                        drop(nav.activate_tab(tab, true));
                    }
                    HostCommand::Back => {
                        if nav.back().is_some() {
                            scroll = 0;
                        }
                    }
                    HostCommand::Forward => {
                        if nav.forward().is_some() {
                            scroll = 0;
                        }
                    }
                    HostCommand::ToggleRefresh => {
                        if !scheduler.disable() {
                            scheduler.enable_reload(toggle_interval, nav.context());
                        }
                    }
                    HostCommand::Reload => {
                        drop(nav.context().reload_current());
                    }
                    HostCommand::NextKeyspace => {
                        if let Some(selector) = nav.next_keyspace() {
                            scroll = 0;
                            drop(nav.select_keyspace(&selector));
                        }
                    }
                    HostCommand::ScrollUp => scroll = scroll.saturating_sub(1),
                    HostCommand::ScrollDown => scroll = scroll.saturating_add(1),
                    HostCommand::PageUp => scroll = scroll.saturating_sub(page),
                    HostCommand::PageDown => scroll = scroll.saturating_add(page),
                    HostCommand::Resize { width: w, height: h } => {
                        width = w;
                        height = h;
                        painter.invalidate();
                    }
                }
            }
        }
    }

    scheduler.disable();
    Ok(())
}

fn current_body(nav: &NavigationController) -> Vec<String> {
    match nav.current_tab() {
        Some(tab) => nav.context().regions().fragment(tab).to_lines(),
        None => Vec::new(),
    }
}

/// Blocking terminal reads run on their own thread and feed the async loop.
fn spawn_event_reader() -> mpsc::UnboundedReceiver<event::Event> {
    let (tx, rx) = mpsc::unbounded_channel();
    thread::spawn(move || loop {
        match event::read() {
            Ok(next) => {
                if tx.send(next).is_err() {
                    break;
                }
            }
            Err(err) => {
                error!(error = %err, "terminal event read failed");
                break;
            }
        }
    });
    rx
}

struct TerminalSession {
    stdout: io::Stdout,
}

impl TerminalSession {
    fn enter() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(
            stdout,
            EnterAlternateScreen,
            Hide,
            Clear(ClearType::All),
            MoveTo(0, 0)
        )?;
        Ok(Self { stdout })
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        let _ = execute!(
            self.stdout,
            SetAttribute(Attribute::Reset),
            LeaveAlternateScreen,
            Show,
            MoveTo(0, 0)
        );
        let _ = terminal::disable_raw_mode();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_refresh_zero_disables_refresh() {
        let mut config = Config::default();
        config.refresh.enabled = true;
        let cli = Cli::parse_from(["vtdash", "--refresh", "0"]);
        apply_cli_overrides(&mut config, &cli);
        assert!(!config.refresh.enabled);

        let cli = Cli::parse_from(["vtdash", "--refresh", "15", "--api-base", "http://vtadmin:14200/api"]);
        apply_cli_overrides(&mut config, &cli);
        assert_eq!(config.refresh_interval(), Some(Duration::from_secs(15)));
        assert_eq!(config.api.base_url, "http://vtadmin:14200/api");
    }

    #[test]
    fn initial_location_joins_base_path_and_query() {
        assert_eq!(initial_location("/", ""), "/");
        assert_eq!(initial_location("/", "?tab=tablets"), "/?tab=tablets");
        assert_eq!(initial_location("/dash", "tab=schemas"), "/dash?tab=schemas");
    }

    #[test]
    fn format_flag_parses_html() {
        let cli = Cli::parse_from(["vtdash", "--once", "--format", "html"]);
        assert!(cli.once);
        assert_eq!(cli.format, OutputFormat::Html);
    }
}
