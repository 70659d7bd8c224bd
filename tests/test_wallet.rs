use std::time::Duration;

use sling_swap::entities::{Notice, Severity, Token};
use sling_swap::error::{SwapError, WalletError};
use sling_swap::wallet::*;

fn connected(balances: Balances) -> DemoWallet {
    let w = DemoWallet::new(balances);
    w.connect().unwrap();
    w
}

// ── Connection ────────────────────────────────────────────────────────────────

#[test]
fn connect_twice_is_an_error() {
    let w = DemoWallet::with_default_balances();
    assert!(!w.is_connected());
    assert!(w.address().is_none());

    let address = w.connect().unwrap();
    assert!(address.starts_with("0x"));
    assert_eq!(w.address(), Some(address));
    assert_eq!(w.connect(), Err(WalletError::AlreadyConnected));
}

#[test]
fn balances_hidden_while_disconnected() {
    let w = DemoWallet::with_default_balances();
    assert_eq!(w.balances(), Balances::default());
    w.connect().unwrap();
    assert_eq!(w.balances().get(Token::Mon), 250.0);
    w.disconnect();
    assert!(!w.balances().has(Token::Mon));
}

#[test]
fn first_funded_follows_token_order() {
    let b = Balances::new([(Token::Weth, 1.0), (Token::Mon, 2.0)]);
    assert_eq!(b.first_funded(), Some(Token::Mon));
    assert_eq!(Balances::default().first_funded(), None);
}

// ── Swaps ─────────────────────────────────────────────────────────────────────

#[test]
fn swap_converts_whole_balance_at_reference_prices() {
    let w = connected(Balances::new([(Token::Mon, 10.0), (Token::Usdc, 1.0)]));
    let receipt = w.submit_swap(Token::Mon, Token::Usdc).unwrap();

    assert_eq!(receipt.amount_in, 10.0);
    assert_eq!(receipt.amount_out, 5.0);
    assert!(receipt.tx_hash.starts_with("0x"));
    assert_eq!(receipt.tx_hash.len(), 66);

    let after = w.balances();
    assert_eq!(after.get(Token::Mon), 0.0);
    assert_eq!(after.get(Token::Usdc), 6.0);
}

#[test]
fn swap_errors() {
    let w = DemoWallet::new(Balances::new([(Token::Usdc, 5.0)]));
    assert_eq!(w.submit_swap(Token::Usdc, Token::Mon), Err(SwapError::NotConnected));

    w.connect().unwrap();
    assert_eq!(w.submit_swap(Token::Usdc, Token::Usdc), Err(SwapError::SameToken(Token::Usdc)));
    assert_eq!(
        w.submit_swap(Token::Weth, Token::Usdc),
        Err(SwapError::InsufficientBalance(Token::Weth))
    );
}

#[test]
fn failing_wallet_leaves_balances_alone() {
    let w = DemoWallet::new(Balances::new([(Token::Usdc, 5.0)]))
        .with_failing_swaps(true)
        .with_latency(Duration::from_millis(1));
    w.connect().unwrap();
    assert!(matches!(w.submit_swap(Token::Usdc, Token::Weth), Err(SwapError::Rejected(_))));
    assert_eq!(w.balances().get(Token::Usdc), 5.0);
}

// ── Notices ───────────────────────────────────────────────────────────────────

#[test]
fn notice_log_drops_oldest_at_capacity() {
    let mut log = NoticeLog::new(2);
    for title in ["one", "two", "three"] {
        log.notify(Notice::new(title, "", Severity::Info));
    }
    assert_eq!(log.len(), 2);
    assert_eq!(log.titles(), vec!["two", "three"]);
    assert_eq!(log.last().unwrap().title, "three");
}

#[test]
fn notice_log_reverses_to_newest_first() {
    let mut log = NoticeLog::default();
    for title in ["connected", "hit", "swapped"] {
        log.notify(Notice::new(title, "", Severity::Success));
    }
    let newest: Vec<_> = log.all().rev().take(2).map(|n| n.title.as_str()).collect();
    assert_eq!(newest, vec!["swapped", "hit"]);
}
