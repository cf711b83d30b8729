use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use crossterm::event::{self, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use daodash::app::App;
use daodash::config::{self, Overrides, Settings};
use daodash::core::Action;
use daodash::infrastructure::ethereum::{AlloyConnector, ConnectionManager};
use daodash::infrastructure::runtime::{RuntimeBridge, RuntimeCommand};
use daodash::logger;
use daodash::modules::dao::DaoService;
use daodash::ui;

#[derive(Debug, Parser)]
#[command(
    name = "daodash",
    version,
    about = "daodash: a terminal dashboard for DAO governance"
)]
struct Args {
    /// HTTP JSON-RPC endpoint (e.g. http://localhost:8545)
    #[arg(long)]
    rpc: Option<String>,

    /// WebSocket endpoint (e.g. ws://localhost:8546)
    #[arg(long)]
    ws: Option<String>,

    /// IPC path (e.g. ~/.ethereum/geth.ipc). Unix only.
    #[arg(long)]
    ipc: Option<PathBuf>,

    /// Chain id the DAO is deployed on
    #[arg(long)]
    chain_id: Option<u64>,

    /// DAO contract address
    #[arg(long)]
    dao: Option<String>,

    /// Membership NFT contract address
    #[arg(long)]
    nft: Option<String>,

    /// Unlocked node account to send transactions from
    #[arg(long)]
    account: Option<String>,

    /// Config file (default: ~/.config/daodash/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,
}

impl Args {
    fn overrides(&self) -> Overrides {
        Overrides {
            rpc: self.rpc.clone(),
            ws: self.ws.clone(),
            ipc: self.ipc.clone(),
            chain_id: self.chain_id,
            dao: self.dao.clone(),
            nft: self.nft.clone(),
            account: self.account.clone(),
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = config::load(args.config.as_deref())?;
    let settings = Settings::resolve(&config, &args.overrides(), |var| std::env::var(var).ok())
        .context("Invalid configuration")?;

    if let Some(dir) = config::data_dir() {
        if let Err(err) = logger::init(&dir) {
            eprintln!("Logging disabled: {err}");
        }
    }
    tracing::info!(
        endpoint = %settings.endpoint.display(),
        chain_id = settings.chain_id,
        wallet = ?settings.wallet,
        "starting"
    );

    let connector = AlloyConnector::new(settings.endpoint.clone(), settings.wallet.clone());
    let conn = Arc::new(ConnectionManager::new(
        Box::new(connector),
        settings.chain_id,
    ));
    let service = Arc::new(DaoService::new(conn, settings.contracts));
    let runtime = RuntimeBridge::new(service)?;

    let mut stdout = io::stdout();
    enable_raw_mode()?;
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new();
    app.dispatch(Action::Connect);

    let res = run_app(&mut terminal, app, &runtime);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        tracing::error!("{err:#}");
        eprintln!("{err:?}");
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    mut app: App,
    runtime: &RuntimeBridge,
) -> Result<()> {
    let tick_rate = Duration::from_millis(200);
    let mut last_tick = Instant::now();

    loop {
        pump_background(&mut app, runtime)?;
        terminal.draw(|f| ui::draw(f, &app, Utc::now()))?;
        if app.should_quit {
            let _ = runtime.send(RuntimeCommand::Shutdown);
            return Ok(());
        }

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_secs(0));

        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key, Utc::now());
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }
    }
}

/// Feed worker events into the app and forward whatever it queued
fn pump_background(app: &mut App, runtime: &RuntimeBridge) -> Result<()> {
    for event in runtime.poll_events() {
        app.apply_event(event);
    }
    for command in app.take_commands() {
        runtime.send(command)?;
    }
    Ok(())
}
