//! Wallet and notification collaborators.
//!
//! The state machine only ever sees these traits. `DemoWallet` is an
//! in-memory wallet that quotes swaps from fixed reference prices, so the game
//! can be played without a chain connection.

use std::collections::{BTreeMap, VecDeque};
use std::sync::{Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

use rand::Rng;
use tracing::{info, warn};

use crate::entities::{Notice, Token};
use crate::error::{SwapError, WalletError};

// ── Balances ──────────────────────────────────────────────────────────────────

/// Read-only snapshot of spendable balances, in human-readable units.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Balances(BTreeMap<Token, f64>);

impl Balances {
    pub fn new(entries: impl IntoIterator<Item = (Token, f64)>) -> Self {
        Self(entries.into_iter().collect())
    }

    pub fn get(&self, token: Token) -> f64 {
        self.0.get(&token).copied().unwrap_or(0.0)
    }

    pub fn set(&mut self, token: Token, amount: f64) {
        self.0.insert(token, amount);
    }

    pub fn has(&self, token: Token) -> bool {
        self.get(token) > 0.0
    }

    /// First token (in `Token::ALL` order) with a positive balance.
    pub fn first_funded(&self) -> Option<Token> {
        Token::ALL.into_iter().find(|t| self.has(*t))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SwapReceipt {
    pub from: Token,
    pub to: Token,
    pub amount_in: f64,
    pub amount_out: f64,
    pub tx_hash: String,
}

// ── Collaborator traits ───────────────────────────────────────────────────────

/// Wallet capability set. Swaps may run on a detached thread, hence the bounds.
pub trait Wallet: Send + Sync + 'static {
    fn is_connected(&self) -> bool;
    fn address(&self) -> Option<String>;
    fn balances(&self) -> Balances;
    fn connect(&self) -> Result<String, WalletError>;
    fn disconnect(&self);
    /// Swap the whole spendable balance of `from` into `to`.
    fn submit_swap(&self, from: Token, to: Token) -> Result<SwapReceipt, SwapError>;
}

/// Fire-and-forget user notifications.
pub trait Notifier {
    fn notify(&mut self, notice: Notice);
}

/// Keeps the most recent notices, oldest dropped first.
#[derive(Clone, Debug)]
pub struct NoticeLog {
    notices: VecDeque<Notice>,
    capacity: usize,
}

impl NoticeLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            notices: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    pub fn all(&self) -> impl DoubleEndedIterator<Item = &Notice> {
        self.notices.iter()
    }

    pub fn last(&self) -> Option<&Notice> {
        self.notices.back()
    }

    pub fn len(&self) -> usize {
        self.notices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notices.is_empty()
    }

    pub fn titles(&self) -> Vec<&str> {
        self.notices.iter().map(|n| n.title.as_str()).collect()
    }
}

impl Default for NoticeLog {
    fn default() -> Self {
        Self::new(32)
    }
}

impl Notifier for NoticeLog {
    fn notify(&mut self, notice: Notice) {
        if self.notices.len() == self.capacity {
            self.notices.pop_front();
        }
        self.notices.push_back(notice);
    }
}

// ── Demo wallet ───────────────────────────────────────────────────────────────

/// Reference USD price used to quote demo swaps.
pub fn reference_price(token: Token) -> f64 {
    match token {
        Token::Usdc => 1.0,
        Token::Mon => 0.5,
        Token::Weth => 3000.0,
    }
}

const DEMO_ADDRESS: &str = "0x5a11ee5a11ee5a11ee5a11ee5a11ee5a11ee5a11";

#[derive(Debug)]
struct DemoInner {
    connected: bool,
    balances: Balances,
}

#[derive(Debug)]
pub struct DemoWallet {
    inner: Mutex<DemoInner>,
    latency: Duration,
    fail_swaps: bool,
}

impl DemoWallet {
    pub fn new(balances: Balances) -> Self {
        Self {
            inner: Mutex::new(DemoInner {
                connected: false,
                balances,
            }),
            latency: Duration::ZERO,
            fail_swaps: false,
        }
    }

    /// Starting balances used by the terminal game.
    pub fn with_default_balances() -> Self {
        Self::new(Balances::new([
            (Token::Usdc, 100.0),
            (Token::Mon, 250.0),
            (Token::Weth, 0.05),
        ]))
    }

    /// Sleep this long inside every `submit_swap`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Make every swap fail with `SwapError::Rejected`.
    pub fn with_failing_swaps(mut self, fail: bool) -> Self {
        self.fail_swaps = fail;
        self
    }

    fn lock(&self) -> MutexGuard<'_, DemoInner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Wallet for DemoWallet {
    fn is_connected(&self) -> bool {
        self.lock().connected
    }

    fn address(&self) -> Option<String> {
        self.lock().connected.then(|| DEMO_ADDRESS.to_string())
    }

    fn balances(&self) -> Balances {
        let inner = self.lock();
        if inner.connected {
            inner.balances.clone()
        } else {
            Balances::default()
        }
    }

    fn connect(&self) -> Result<String, WalletError> {
        let mut inner = self.lock();
        if inner.connected {
            return Err(WalletError::AlreadyConnected);
        }
        inner.connected = true;
        info!(address = DEMO_ADDRESS, "demo wallet connected");
        Ok(DEMO_ADDRESS.to_string())
    }

    fn disconnect(&self) {
        self.lock().connected = false;
        info!("demo wallet disconnected");
    }

    fn submit_swap(&self, from: Token, to: Token) -> Result<SwapReceipt, SwapError> {
        if !self.latency.is_zero() {
            thread::sleep(self.latency);
        }

        let mut inner = self.lock();
        if !inner.connected {
            return Err(SwapError::NotConnected);
        }
        if from == to {
            return Err(SwapError::SameToken(from));
        }
        let amount_in = inner.balances.get(from);
        if amount_in <= 0.0 {
            return Err(SwapError::InsufficientBalance(from));
        }
        if self.fail_swaps {
            warn!(%from, %to, "demo wallet rejecting swap");
            return Err(SwapError::Rejected("transaction reverted by provider".to_string()));
        }

        let amount_out = amount_in * reference_price(from) / reference_price(to);
        inner.balances.set(from, 0.0);
        let held = inner.balances.get(to);
        inner.balances.set(to, held + amount_out);

        let mut rng = rand::thread_rng();
        let tx_hash = format!("0x{:032x}{:032x}", rng.gen::<u128>(), rng.gen::<u128>());
        info!(%from, %to, amount_in, amount_out, tx = %tx_hash, "demo swap settled");
        Ok(SwapReceipt {
            from,
            to,
            amount_in,
            amount_out,
            tx_hash,
        })
    }
}
