//! Turn lifecycle: aiming, flight, resolution, swap and reset.
//!
//! `Game` owns the authoritative `RoundState` together with its collaborators.
//! The frame loop calls [`Game::update`] once per display refresh; physics only
//! runs while the scheduler has a pending step, which is only ever true in the
//! `Flying` state.

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use rand::Rng;
use tracing::{debug, info, warn};

use crate::config::GameConfig;
use crate::entities::{
    FieldSize, GameState, Notice, RoundState, Severity, StepOutcome, Token, TowerStructure,
    Vector2D,
};
use crate::error::{ConfigError, SwapError};
use crate::physics;
use crate::scheduler::{Scheduler, TimerKind};
use crate::tower::generate_towers;
use crate::wallet::{Balances, Notifier, SwapReceipt, Wallet};

type SwapResult = Result<SwapReceipt, SwapError>;

/// How swap requests are run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SwapMode {
    /// On a detached thread; the result is picked up by a later `update`.
    #[default]
    Detached,
    /// Synchronously on the caller's thread; the result is still delivered
    /// through the channel and handled by the next `update`.
    Inline,
}

pub struct Game<W: Wallet, N: Notifier, R: Rng> {
    cfg: GameConfig,
    wallet: Arc<W>,
    notifier: N,
    rng: R,
    selected: Token,
    balances: Balances,
    field: Option<FieldSize>,
    towers_pending: bool,
    round: RoundState,
    scheduler: Scheduler,
    swap_mode: SwapMode,
    swap_tx: Sender<SwapResult>,
    swap_rx: Receiver<SwapResult>,
    swaps_issued: u64,
}

impl<W: Wallet, N: Notifier, R: Rng> Game<W, N, R> {
    /// Fails if `cfg` does not pass [`GameConfig::validate`].
    pub fn new(
        cfg: GameConfig,
        wallet: Arc<W>,
        notifier: N,
        rng: R,
        selected: Token,
    ) -> Result<Self, ConfigError> {
        cfg.validate()?;
        let (swap_tx, swap_rx) = mpsc::channel();
        let balances = wallet.balances();
        let round = RoundState::new(cfg.anchor, cfg.chances);
        let mut game = Self {
            cfg,
            wallet,
            notifier,
            rng,
            selected,
            balances,
            field: None,
            towers_pending: false,
            round,
            scheduler: Scheduler::new(),
            swap_mode: SwapMode::default(),
            swap_tx,
            swap_rx,
            swaps_issued: 0,
        };
        game.new_turn();
        Ok(game)
    }

    pub fn with_swap_mode(mut self, mode: SwapMode) -> Self {
        self.swap_mode = mode;
        self
    }

    // ── Read access for the render collaborator ──────────────────────────────

    pub fn round(&self) -> &RoundState {
        &self.round
    }

    pub fn state(&self) -> GameState {
        self.round.game_state
    }

    pub fn chances(&self) -> u32 {
        self.round.chances
    }

    pub fn towers(&self) -> &[TowerStructure] {
        &self.round.towers
    }

    pub fn selected(&self) -> Token {
        self.selected
    }

    pub fn balances(&self) -> &Balances {
        &self.balances
    }

    pub fn config(&self) -> &GameConfig {
        &self.cfg
    }

    pub fn field(&self) -> Option<FieldSize> {
        self.field
    }

    pub fn wallet(&self) -> &W {
        &self.wallet
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Total swap requests dispatched since construction.
    pub fn swaps_issued(&self) -> u64 {
        self.swaps_issued
    }

    pub fn status_line(&self) -> String {
        match self.round.game_state {
            GameState::Ready if !self.wallet.is_connected() => {
                "Connect your wallet to play".to_string()
            }
            GameState::Ready => format!("Drag the {} bird to aim", self.selected),
            GameState::Aiming => "Release to launch!".to_string(),
            GameState::Flying => "Bird in flight!".to_string(),
            GameState::Hit => match self.round.hit_tower {
                Some(_) => "Tower hit! Swapping...".to_string(),
                None => "Only packaging blocks! Try again!".to_string(),
            },
            GameState::Miss => "Missed towers! Try again!".to_string(),
            GameState::Swapping => match self.round.hit_tower {
                Some(to) => format!("Swapping {} for {}...", self.selected, to),
                None => "Swapping tokens...".to_string(),
            },
            GameState::GameOver => format!("Game over. Try again with {}", self.selected),
        }
    }

    // ── Turn setup ───────────────────────────────────────────────────────────

    /// Record the measured field size, generating towers if that was deferred.
    pub fn set_field_size(&mut self, field: FieldSize) {
        self.field = Some(field);
        if self.towers_pending {
            self.setup_towers();
        }
    }

    /// Fresh turn: projectile on the anchor, new towers, full chances.
    pub fn new_turn(&mut self) {
        self.scheduler.clear();
        self.reset_projectile();
        self.setup_towers();
        self.round.chances = self.cfg.chances;
        info!(token = %self.selected, chances = self.round.chances, "new turn");
    }

    fn setup_towers(&mut self) {
        match self.field {
            Some(field) => {
                self.round.towers =
                    generate_towers(self.selected, field.width, &self.cfg, &mut self.rng);
                self.towers_pending = false;
            }
            None => {
                debug!("play field not measured yet, deferring tower generation");
                self.round.towers.clear();
                self.towers_pending = true;
            }
        }
    }

    fn reset_projectile(&mut self) {
        let anchor = self.cfg.anchor;
        self.round.projectile_position = anchor;
        self.round.projectile_velocity = Vector2D::ZERO;
        self.round.is_dragging = false;
        self.round.drag_end = anchor;
        self.round.hit_tower = None;
        self.round.game_state = GameState::Ready;
    }

    // ── Wallet actions ───────────────────────────────────────────────────────

    /// Switch to another bird. Returns whether a new round started.
    ///
    /// Re-selecting the current bird only restarts after a game over, so the
    /// chance count cannot be refilled mid-round.
    pub fn select_token(&mut self, token: Token) -> bool {
        if token == self.selected && self.round.game_state != GameState::GameOver {
            return false;
        }
        if self.round.game_state == GameState::Swapping {
            self.notify("Swap in progress", "Wait for the current swap to settle.", Severity::Info);
            return false;
        }
        if self.wallet.is_connected() && !self.balances.has(token) {
            self.notify(
                "No Balance",
                format!("You need {token} tokens to select this bird."),
                Severity::Error,
            );
            return false;
        }
        self.selected = token;
        self.new_turn();
        true
    }

    pub fn connect_wallet(&mut self) {
        match self.wallet.connect() {
            Ok(address) => {
                self.refresh_balances();
                self.notify("Wallet Connected", format!("Connected as {address}"), Severity::Success);
                self.suggest_funded_token();
            }
            Err(err) => {
                warn!(error = %err, "wallet connection failed");
                self.notify("Connection Failed", err.to_string(), Severity::Error);
            }
        }
    }

    pub fn disconnect_wallet(&mut self) {
        self.wallet.disconnect();
        self.refresh_balances();
        self.notify("Wallet Disconnected", "Connect again to keep playing.", Severity::Info);
    }

    fn refresh_balances(&mut self) {
        self.balances = self.wallet.balances();
        debug!(balances = ?self.balances, "balances refreshed");
    }

    fn suggest_funded_token(&mut self) {
        if self.balances.has(self.selected) {
            return;
        }
        if let Some(token) = self.balances.first_funded() {
            self.notify(
                "Pick Another Bird",
                format!("You hold {}; select the {token} bird to play.", token.name()),
                Severity::Info,
            );
        }
    }

    // ── Input ────────────────────────────────────────────────────────────────

    pub fn pointer_down(&mut self, at: Vector2D) {
        if self.round.game_state != GameState::Ready || self.field.is_none() {
            return;
        }
        if !self.wallet.is_connected() {
            return;
        }
        if !self.balances.has(self.selected) {
            self.notify(
                "No Balance",
                format!("You need some {} tokens to play with this bird.", self.selected),
                Severity::Error,
            );
            return;
        }
        if at.distance(self.cfg.anchor) > self.cfg.capture_radius {
            return;
        }
        self.round.game_state = GameState::Aiming;
        self.round.is_dragging = true;
        self.round.drag_start = at;
        self.round.drag_end = self.cfg.anchor;
    }

    pub fn pointer_move(&mut self, at: Vector2D) {
        if !self.round.is_dragging {
            return;
        }
        self.round.drag_end = physics::clamp_drag(self.cfg.anchor, at, &self.cfg);
    }

    pub fn pointer_up(&mut self, at: Vector2D) {
        if !self.round.is_dragging {
            return;
        }
        self.pointer_move(at);
        self.round.is_dragging = false;

        match physics::launch_velocity(self.cfg.anchor, self.round.drag_end, &self.cfg) {
            None => {
                self.round.drag_end = self.cfg.anchor;
                self.round.game_state = GameState::Ready;
            }
            Some(velocity) => {
                self.round.projectile_velocity = velocity;
                self.round.game_state = GameState::Flying;
                self.scheduler.schedule_step();
                info!(token = %self.selected, vx = velocity.x, vy = velocity.y, "launch");
            }
        }
    }

    // ── Frame ────────────────────────────────────────────────────────────────

    /// One display refresh. `dt` is the wall time since the previous call and
    /// only drives the delay timers.
    pub fn update(&mut self, dt: Duration) {
        if self.round.game_state == GameState::Flying && self.scheduler.take_step() {
            self.run_step();
        }

        for timer in self.scheduler.advance(dt) {
            match timer {
                TimerKind::Retry => {
                    if matches!(self.round.game_state, GameState::Miss | GameState::Hit) {
                        self.reset_projectile();
                    }
                }
                TimerKind::Settle => self.new_turn(),
            }
        }

        self.poll_swap();
    }

    /// Drop the pending step and timers; nothing runs until the next launch.
    pub fn shutdown(&mut self) {
        self.scheduler.clear();
    }

    fn run_step(&mut self) {
        let Some(field) = self.field else {
            self.scheduler.cancel_step();
            return;
        };

        let (next, outcome) = physics::step(&self.round, field, &self.cfg);
        self.round = next;
        match outcome {
            StepOutcome::Flying => self.scheduler.schedule_step(),
            StepOutcome::Miss => {
                self.scheduler.cancel_step();
                self.round.game_state = GameState::Miss;
                self.spend_chance();
            }
            StepOutcome::Hit { struck } => {
                self.scheduler.cancel_step();
                self.round.game_state = GameState::Hit;
                match struck {
                    Some(token) => {
                        if self.round.hit_tower.is_none() {
                            self.round.hit_tower = Some(token);
                        }
                        self.begin_swap(token);
                    }
                    None => self.spend_chance(),
                }
            }
        }
    }

    fn spend_chance(&mut self) {
        self.round.chances = self.round.chances.saturating_sub(1);
        if self.round.chances == 0 {
            self.round.game_state = GameState::GameOver;
            info!(token = %self.selected, "out of chances, game over");
        } else {
            self.scheduler.arm(TimerKind::Retry, self.cfg.retry_delay());
            info!(chances = self.round.chances, "chance lost");
        }
    }

    fn begin_swap(&mut self, to: Token) {
        let from = self.selected;
        // Flip before dispatch so nothing can issue a second request for this hit.
        self.round.game_state = GameState::Swapping;
        self.swaps_issued += 1;
        info!(%from, %to, "dispatching swap");
        self.notify("Tower Hit!", format!("Swapping {from} for {to}..."), Severity::Info);

        match self.swap_mode {
            SwapMode::Inline => {
                let result = self.wallet.submit_swap(from, to);
                let _ = self.swap_tx.send(result);
            }
            SwapMode::Detached => {
                let wallet = Arc::clone(&self.wallet);
                let tx = self.swap_tx.clone();
                thread::spawn(move || {
                    let result = wallet.submit_swap(from, to);
                    // Receiver gone means the game was dropped mid-swap.
                    let _ = tx.send(result);
                });
            }
        }
    }

    fn poll_swap(&mut self) {
        while let Ok(result) = self.swap_rx.try_recv() {
            if self.round.game_state != GameState::Swapping {
                warn!("swap result arrived outside the swapping state, ignoring");
                continue;
            }
            match result {
                Ok(receipt) => {
                    info!(tx = %receipt.tx_hash, amount_out = receipt.amount_out, "swap succeeded");
                    self.notify(
                        "Swap Submitted!",
                        format!(
                            "Swapped {:.4} {} for {:.4} {} ({})",
                            receipt.amount_in,
                            receipt.from,
                            receipt.amount_out,
                            receipt.to,
                            short_hash(&receipt.tx_hash)
                        ),
                        Severity::Success,
                    );
                }
                Err(err) => {
                    warn!(error = %err, "swap failed");
                    self.notify("Swap Failed", err.to_string(), Severity::Error);
                }
            }
            self.refresh_balances();
            self.scheduler.arm(TimerKind::Settle, self.cfg.settle_delay());
        }
    }

    fn notify(&mut self, title: &str, message: impl Into<String>, severity: Severity) {
        self.notifier.notify(Notice::new(title, message, severity));
    }
}

fn short_hash(hash: &str) -> String {
    let chars: Vec<char> = hash.chars().collect();
    if chars.len() <= 12 {
        return hash.to_string();
    }
    let head: String = chars[..8].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}…{tail}")
}
