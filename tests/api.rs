//! End-to-end API tests. These need a running Postgres (DATABASE_URL) and are
//! ignored by default; run them with `cargo test -- --ignored`.

use papertrade::api::routes::{AppState, app_router};
use papertrade::{persistence, simulator};
use uuid::Uuid;

async fn spawn_app() -> (String, reqwest::Client) {
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = persistence::create_pool_and_migrate(&database_url)
        .await
        .expect("pool + migrations");
    simulator::seed_if_empty(&pool).await.expect("seeding");

    let state = AppState {
        pool,
        session_ttl_hours: 24,
        starting_balance: 100_000.0,
    };
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = app_router(state);
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let client = reqwest::Client::builder()
        .cookie_store(true)
        .build()
        .unwrap();
    (format!("http://{addr}"), client)
}

fn fresh_username() -> String {
    format!("trader-{}", Uuid::new_v4().simple())
}

#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn tick_rolls_previous_close_forward() {
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = persistence::create_pool_and_migrate(&database_url)
        .await
        .expect("pool + migrations");
    simulator::seed_if_empty(&pool).await.expect("seeding");

    let before = persistence::list_instruments(&pool).await.unwrap();
    simulator::tick(&pool).await.unwrap();
    let after = persistence::list_instruments(&pool).await.unwrap();

    for (old, new) in before.iter().zip(after.iter()) {
        assert_eq!(old.id, new.id);
        // previous_close after a tick is the price immediately before it.
        assert_eq!(new.previous_close, old.current_price);
        assert!(new.current_price > 0.0);
    }
}

#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn register_login_logout_roundtrip() {
    let (base_url, client) = spawn_app().await;
    let username = fresh_username();

    let res = client
        .post(format!("{base_url}/api/register"))
        .json(&serde_json::json!({ "username": username, "password": "secret123" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 201);
    let user: serde_json::Value = res.json().await.unwrap();
    assert_eq!(user["username"].as_str(), Some(username.as_str()));
    assert_eq!(user["walletBalance"].as_f64(), Some(100_000.0));
    assert!(user.get("passwordHash").is_none());

    // Registration auto-logs-in via the session cookie.
    let res = client
        .get(format!("{base_url}/api/user"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 200);

    let res = client
        .post(format!("{base_url}/api/logout"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 200);

    let res = client
        .get(format!("{base_url}/api/user"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 401);
}

#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn duplicate_username_is_rejected() {
    let (base_url, client) = spawn_app().await;
    let username = fresh_username();

    let res = client
        .post(format!("{base_url}/api/register"))
        .json(&serde_json::json!({ "username": username, "password": "first" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 201);

    let res = client
        .post(format!("{base_url}/api/register"))
        .json(&serde_json::json!({ "username": username, "password": "second" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 400);
    let body: serde_json::Value = res.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("taken"));
}

#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn trade_flow_updates_ledger_and_audit_trail() {
    let (base_url, client) = spawn_app().await;
    let username = fresh_username();

    let res = client
        .post(format!("{base_url}/api/register"))
        .json(&serde_json::json!({ "username": username, "password": "secret123" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 201);

    let stocks: serde_json::Value = client
        .get(format!("{base_url}/api/stocks"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let stock = &stocks.as_array().unwrap()[0];
    let stock_id = stock["id"].as_str().unwrap();
    let price = stock["currentPrice"].as_f64().unwrap();

    // BUY 10 shares at the quoted price.
    let res = client
        .post(format!("{base_url}/api/trade"))
        .json(&serde_json::json!({
            "stockId": stock_id, "type": "BUY", "quantity": 10, "price": price
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 201);
    let txn: serde_json::Value = res.json().await.unwrap();
    assert_eq!(txn["status"].as_str(), Some("COMPLETED"));
    assert_eq!(txn["total"].as_f64(), Some(10.0 * price));

    let portfolio: serde_json::Value = client
        .get(format!("{base_url}/api/portfolio"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let holdings = portfolio.as_array().unwrap();
    assert_eq!(holdings.len(), 1);
    assert_eq!(holdings[0]["quantity"].as_i64(), Some(10));
    assert_eq!(holdings[0]["averageCost"].as_f64(), Some(price));

    // A buy far beyond the wallet fails, mutates nothing, and is audited.
    let res = client
        .post(format!("{base_url}/api/trade"))
        .json(&serde_json::json!({
            "stockId": stock_id, "type": "BUY", "quantity": 1_000_000, "price": price
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 400);

    let transactions: serde_json::Value = client
        .get(format!("{base_url}/api/transactions"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let newest = &transactions.as_array().unwrap()[0];
    assert_eq!(newest["status"].as_str(), Some("FAILED"));

    // SELL 4 of the 10; wallet ends at 100000 - 6 * price.
    let res = client
        .post(format!("{base_url}/api/trade"))
        .json(&serde_json::json!({
            "stockId": stock_id, "type": "SELL", "quantity": 4, "price": price
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 201);

    let summary: serde_json::Value = client
        .get(format!("{base_url}/api/portfolio/summary"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let wallet = summary["walletBalance"].as_f64().unwrap();
    assert!((wallet - (100_000.0 - 6.0 * price)).abs() < 1e-6);
    assert_eq!(
        summary["totalValue"].as_f64().unwrap(),
        summary["totalCurrentValue"].as_f64().unwrap() + wallet
    );
}
