//! End-to-end checks of the persistence gateway against a real SQLite file

mod common;

use std::sync::{Arc, Barrier};
use std::thread;

use chrono::{Duration, Utc};
use common::TestDb;
use postacore::storage::{ApprovalOutcome, Database, PoolSettings};
use postacore::TariffCode;
use pretty_assertions::assert_eq;

#[test]
fn get_or_create_example_alice() {
    let env = TestDb::new();

    let created = env.db.get_or_create_user(555, Some("alice"), Some("Alice A")).unwrap();
    assert_eq!(created.tariff_code.as_str(), "MINI");
    assert_eq!(created.username.as_deref(), Some("alice"));

    let again = env.db.get_or_create_user(555, Some("alice"), Some("Alice A")).unwrap();
    assert_eq!(again, created);
    assert_eq!(env.count("SELECT COUNT(*) FROM users"), 1);
}

#[test]
fn grant_matches_request_and_appends_one_row() {
    let env = TestDb::new();
    let user = env.db.get_or_create_user(555, None, None).unwrap();
    let before = Utc::now();

    let until = env.db.set_tariff(user.id, TariffCode::Standard, 14).unwrap();

    let stored = env.db.user_by_id(user.id).unwrap().unwrap();
    assert_eq!(stored.tariff_code, TariffCode::Standard);
    assert_eq!(stored.subscribed_until, Some(until));
    assert!(until - before >= Duration::days(14));
    assert!(stored.has_active_subscription(Utc::now()));

    let history = env.db.subscriptions_for_user(user.id).unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].ends_at, until);
}

#[test]
fn toggled_tariff_hidden_from_users_until_toggled_back() {
    let env = TestDb::new();

    env.db.toggle_tariff(TariffCode::Vip).unwrap();
    assert!(env.db.active_tariffs().unwrap().iter().all(|t| t.code != TariffCode::Vip));

    env.db.toggle_tariff(TariffCode::Vip).unwrap();
    assert!(env.db.tariff(TariffCode::Vip).unwrap().unwrap().is_active);
    assert!(env.db.active_tariffs().unwrap().iter().any(|t| t.code == TariffCode::Vip));
}

#[test]
fn recorded_payment_copies_price_and_is_unconfirmed() {
    let env = TestDb::new();
    let user = env.db.get_or_create_user(555, None, None).unwrap();

    let payment = env.db.record_crypto_payment(user.id, TariffCode::Pro, Some("CQ-1")).unwrap();

    assert_eq!(payment.amount, Some(4.0));
    assert!(!payment.confirmed);
    assert_eq!(env.db.pending_crypto_payments().unwrap().len(), 1);
}

#[test]
fn payment_without_crypto_price_records_null_amount() {
    let env = TestDb::new();
    let user = env.db.get_or_create_user(555, None, None).unwrap();

    let payment = env.db.record_crypto_payment(user.id, TariffCode::Standard, None).unwrap();

    assert_eq!(payment.amount, None);
}

#[test]
fn approving_twice_grants_once() {
    let env = TestDb::new();
    let user = env.db.get_or_create_user(555, None, None).unwrap();
    let payment = env.db.record_crypto_payment(user.id, TariffCode::Vip, None).unwrap();

    let first = env.db.approve_crypto_payment(payment.id, 30).unwrap();
    let second = env.db.approve_crypto_payment(payment.id, 30).unwrap();

    assert!(matches!(first, ApprovalOutcome::Approved { tariff_code: TariffCode::Vip, .. }));
    assert_eq!(second, ApprovalOutcome::AlreadyProcessed);
    assert_eq!(env.count("SELECT COUNT(*) FROM subscriptions"), 1);
    assert_eq!(env.count("SELECT COUNT(*) FROM crypto_payments WHERE confirmed = 1"), 1);
}

#[test]
fn concurrent_approvals_grant_once() {
    let env = TestDb::new();
    let user = env.db.get_or_create_user(555, None, None).unwrap();
    let payment = env.db.record_crypto_payment(user.id, TariffCode::Pro, None).unwrap();

    let workers = 4;
    let barrier = Arc::new(Barrier::new(workers));
    let handles: Vec<_> = (0..workers)
        .map(|_| {
            let db = env.db.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                db.approve_crypto_payment(payment.id, 30).unwrap()
            })
        })
        .collect();

    let outcomes: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let approved = outcomes
        .iter()
        .filter(|o| matches!(o, ApprovalOutcome::Approved { .. }))
        .count();

    assert_eq!(approved, 1);
    assert_eq!(env.count("SELECT COUNT(*) FROM subscriptions"), 1);
}

#[test]
fn bootstrap_twice_keeps_four_tariffs_and_prices() {
    let env = TestDb::new();
    env.db
        .connection()
        .unwrap()
        .execute("UPDATE tariffs SET stars_price = 999 WHERE code = 'PRO'", [])
        .unwrap();

    env.db.bootstrap().unwrap();
    env.db.bootstrap().unwrap();

    assert_eq!(env.count("SELECT COUNT(*) FROM tariffs"), 4);
    let prices: Vec<_> = env
        .db
        .all_tariffs()
        .unwrap()
        .into_iter()
        .map(|t| (t.code, t.stars_price, t.crypto_price))
        .collect();
    assert_eq!(
        prices,
        vec![
            (TariffCode::Mini, 0, None),
            (TariffCode::Standard, 300, None),
            (TariffCode::Vip, 800, Some(6.5)),
            (TariffCode::Pro, 999, Some(4.0)),
        ]
    );
}

#[test]
fn reopening_existing_file_keeps_data() {
    let env = TestDb::new();
    let user = env.db.get_or_create_user(555, Some("alice"), None).unwrap();
    env.db.bind_tariff_channel(TariffCode::Pro, -1001234567890, "https://t.me/+abc").unwrap();

    let reopened = Database::open_with(&env.path, PoolSettings { min_idle: 1, max_size: 2 }).unwrap();

    assert_eq!(reopened.user_by_telegram_id(555).unwrap(), Some(user));
    assert_eq!(
        reopened.tariff_channel(TariffCode::Pro).unwrap().map(|c| c.channel_id),
        Some(-1001234567890)
    );
    reopened.close();
}
