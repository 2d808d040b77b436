mod common;

use std::time::Duration;

use amplifi_backend::{handlers, models::trade::TradeInput};
use futures_util::{Stream, StreamExt};
use serde_json::Value;
use tokio_tungstenite::{connect_async, tungstenite::Message};

use crate::common::test_state;

async fn next_json<S>(ws: &mut S) -> Value
where
    S: Stream<Item = Result<Message, tokio_tungstenite::tungstenite::Error>> + Unpin,
{
    loop {
        let msg = tokio::time::timeout(Duration::from_secs(5), ws.next())
            .await
            .expect("timed out waiting for message")
            .expect("stream ended")
            .expect("websocket error");
        if let Message::Text(text) = msg {
            return serde_json::from_str(&text).unwrap();
        }
    }
}

#[tokio::test]
async fn test_stream_delivers_own_settlements() {
    let state = test_state();
    let app = handlers::router(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let (mut ws, _) = connect_async(format!("ws://{}/api/notifications/ws?user=alice", addr))
        .await
        .unwrap();

    let initial = next_json(&mut ws).await;
    assert_eq!(initial["type"], "initial");
    assert!(initial["notifications"].as_array().unwrap().is_empty());

    // Another user's trade is not forwarded
    state
        .trading
        .buy(Some("bob"), "2", TradeInput::Tokens("1".to_string()))
        .await
        .unwrap();
    state
        .trading
        .buy(Some("alice"), "1", TradeInput::Tokens("10".to_string()))
        .await
        .unwrap();

    let event = next_json(&mut ws).await;
    assert_eq!(event["type"], "notification");
    assert_eq!(event["user_id"], "alice");
    assert_eq!(event["token_symbol"], "TILL");
}

#[tokio::test]
async fn test_stream_without_user_reports_error() {
    let app = handlers::router(test_state());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let (mut ws, _) = connect_async(format!("ws://{}/api/notifications/ws", addr))
        .await
        .unwrap();

    let message = next_json(&mut ws).await;
    assert_eq!(message["type"], "error");
}
