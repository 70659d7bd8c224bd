mod display;

use std::fs::File;
use std::io::{stdout, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    cursor,
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
    },
    terminal, ExecutableCommand,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;
use tracing_subscriber::EnvFilter;

use display::Viewport;
use sling_swap::config::{GameConfig, TriggerPolicy};
use sling_swap::entities::Token;
use sling_swap::wallet::{DemoWallet, NoticeLog};
use sling_swap::{Game, GameState, SwapMode};

const FRAME: Duration = Duration::from_millis(16); // ≈60 FPS

type TermGame = Game<DemoWallet, NoticeLog, StdRng>;

#[derive(Parser, Debug)]
#[command(name = "sling_swap", about = "Knock down towers to swap tokens")]
struct Args {
    /// JSON file with gameplay constants; missing keys use defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Bird to start with.
    #[arg(long, default_value = "USDC")]
    token: Token,

    /// Which blocks trigger a swap: target-only or any-block.
    #[arg(long)]
    trigger: Option<TriggerPolicy>,

    /// Seed for tower layouts.
    #[arg(long)]
    seed: Option<u64>,

    /// Simulated wallet round-trip per swap.
    #[arg(long, default_value_t = 800)]
    swap_latency_ms: u64,

    /// Make every demo swap fail.
    #[arg(long)]
    fail_swaps: bool,

    #[arg(long, default_value = "sling_swap.log")]
    log_file: PathBuf,

    /// Minimum width of one terminal cell, in field pixels.
    #[arg(long, default_value_t = 8.0)]
    cell_width: f64,

    /// Minimum height of one terminal cell, in field pixels.
    #[arg(long, default_value_t = 16.0)]
    cell_height: f64,
}

// ── Setup ─────────────────────────────────────────────────────────────────────

fn init_logging(path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("cannot create log file {}", path.display()))?;
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("sling_swap=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn load_config(args: &Args) -> Result<GameConfig> {
    let mut cfg = match &args.config {
        Some(path) => GameConfig::load(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => GameConfig::default(),
    };
    if let Some(policy) = args.trigger {
        cfg.trigger_policy = policy;
    }
    Ok(cfg)
}

// ── Game loop ─────────────────────────────────────────────────────────────────

/// Returns when the player quits.
///
/// Input arrives from a dedicated reader thread; every frame drains the
/// channel, advances the game once and redraws.
fn game_loop<W: Write>(
    out: &mut W,
    game: &mut TermGame,
    rx: &mpsc::Receiver<Event>,
    args: &Args,
) -> Result<()> {
    let (cols, rows) = terminal::size()?;
    let mut view = Viewport::fit(cols, rows, args.cell_width, args.cell_height);
    game.set_field_size(view.field_size());

    let mut last = Instant::now();
    loop {
        let frame_start = Instant::now();

        while let Ok(ev) = rx.try_recv() {
            match ev {
                Event::Key(KeyEvent { code, kind: KeyEventKind::Press, modifiers, .. }) => {
                    match code {
                        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => return Ok(()),
                        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                            return Ok(());
                        }
                        KeyCode::Char('c') | KeyCode::Char('C') => game.connect_wallet(),
                        KeyCode::Char('d') | KeyCode::Char('D') => game.disconnect_wallet(),
                        KeyCode::Char('r') | KeyCode::Char('R') => {
                            if game.state() == GameState::GameOver {
                                game.new_turn();
                            }
                        }
                        KeyCode::Char('1') => {
                            game.select_token(Token::Usdc);
                        }
                        KeyCode::Char('2') => {
                            game.select_token(Token::Mon);
                        }
                        KeyCode::Char('3') => {
                            game.select_token(Token::Weth);
                        }
                        _ => {}
                    }
                }
                Event::Mouse(MouseEvent { kind, column, row, .. }) => {
                    let at = view.to_field(column, row);
                    match kind {
                        MouseEventKind::Down(MouseButton::Left) => game.pointer_down(at),
                        MouseEventKind::Drag(MouseButton::Left) => game.pointer_move(at),
                        MouseEventKind::Up(MouseButton::Left) => game.pointer_up(at),
                        _ => {}
                    }
                }
                Event::Resize(cols, rows) => {
                    view = Viewport::fit(cols, rows, args.cell_width, args.cell_height);
                    game.set_field_size(view.field_size());
                }
                _ => {}
            }
        }

        let now = Instant::now();
        game.update(now - last);
        last = now;

        display::render(out, game, &view)?;

        let elapsed = frame_start.elapsed();
        if elapsed < FRAME {
            thread::sleep(FRAME - elapsed);
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_file)?;
    let cfg = load_config(&args)?;

    let wallet = Arc::new(
        DemoWallet::with_default_balances()
            .with_latency(Duration::from_millis(args.swap_latency_ms))
            .with_failing_swaps(args.fail_swaps),
    );
    let rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    info!(token = %args.token, trigger = ?cfg.trigger_policy, "starting");
    let mut game = Game::new(cfg, wallet, NoticeLog::new(16), rng, args.token)
        .context("invalid configuration")?
        .with_swap_mode(SwapMode::Detached);

    let mut out = BufWriter::new(stdout());
    terminal::enable_raw_mode()?;
    out.execute(terminal::EnterAlternateScreen)?;
    out.execute(cursor::Hide)?;
    out.execute(EnableMouseCapture)?;

    // Dedicate a thread to blocking event reads so the frame loop never waits on I/O.
    let (tx, rx) = mpsc::channel::<Event>();
    thread::spawn(move || {
        while let Ok(ev) = event::read() {
            if tx.send(ev).is_err() {
                break;
            }
        }
    });

    let result = game_loop(&mut out, &mut game, &rx, &args);
    game.shutdown();

    // Always restore the terminal
    let _ = out.execute(DisableMouseCapture);
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();

    result
}
