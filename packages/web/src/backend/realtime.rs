//! Row-change subscription over the realtime WebSocket.
//!
//! The realtime endpoint speaks a channel protocol: a join frame per topic,
//! periodic heartbeats, and JSON frames for row changes. One background task
//! per subscription owns the socket; dropping the returned handle stops it.

use std::cell::Cell;
use std::rc::Rc;

use futures_util::{SinkExt, StreamExt};
use gloo_net::websocket::{futures::WebSocket, Message as WsMessage, WebSocketError};
use gloo_timers::future::IntervalStream;
use serde::Deserialize;
use serde_json::json;
use wasm_bindgen_futures::spawn_local;

use super::{Backend, BackendError};

const HEARTBEAT_MS: u32 = 30_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

/// A decoded row change delivered to subscribers.
#[derive(Debug, Clone)]
pub struct ChangeEvent {
    pub kind: ChangeKind,
    pub record: serde_json::Value,
}

/// Keeps a subscription alive; dropping it stops the socket task.
pub struct RealtimeHandle {
    alive: Rc<Cell<bool>>,
}

impl Drop for RealtimeHandle {
    fn drop(&mut self) {
        self.alive.set(false);
    }
}

#[derive(Debug, Deserialize)]
struct Frame {
    topic: String,
    event: String,
    #[serde(default)]
    payload: serde_json::Value,
}

enum Tick {
    Ws(Result<WsMessage, WebSocketError>),
    Beat,
}

impl Backend {
    /// Subscribe to row changes on a public table. The callback runs on the
    /// main task for every decoded change until the handle is dropped.
    pub fn subscribe(
        &self,
        table: &str,
        on_change: impl Fn(ChangeEvent) + 'static,
    ) -> Result<RealtimeHandle, BackendError> {
        let ws_url = format!(
            "{}/realtime/v1/websocket?apikey={}&vsn=1.0.0",
            self.api_url().replacen("http", "ws", 1),
            self.anon_key()
        );
        let topic = format!("realtime:public:{table}");
        let socket =
            WebSocket::open(&ws_url).map_err(|err| BackendError::Socket(err.to_string()))?;
        let alive = Rc::new(Cell::new(true));

        let task_alive = alive.clone();
        spawn_local(async move {
            let (mut write, read) = socket.split();
            let join = json!({
                "topic": topic,
                "event": "phx_join",
                "payload": {},
                "ref": "1",
            });
            if write.send(WsMessage::Text(join.to_string())).await.is_err() {
                tracing::warn!(%topic, "realtime join failed");
                return;
            }

            let beats = IntervalStream::new(HEARTBEAT_MS).map(|_| Tick::Beat);
            let mut merged = futures_util::stream::select(read.map(Tick::Ws), beats);
            while let Some(tick) = merged.next().await {
                if !task_alive.get() {
                    break;
                }
                match tick {
                    Tick::Ws(Ok(WsMessage::Text(text))) => {
                        if let Some(event) = parse_change(&text, &topic) {
                            on_change(event);
                        }
                    }
                    Tick::Ws(Ok(_)) => {}
                    Tick::Ws(Err(err)) => {
                        tracing::warn!(%err, %topic, "realtime socket error");
                        break;
                    }
                    Tick::Beat => {
                        let beat = json!({
                            "topic": "phoenix",
                            "event": "heartbeat",
                            "payload": {},
                            "ref": "hb",
                        });
                        if write.send(WsMessage::Text(beat.to_string())).await.is_err() {
                            break;
                        }
                    }
                }
            }
            tracing::debug!(%topic, "realtime subscription closed");
        });

        Ok(RealtimeHandle { alive })
    }
}

/// Decode a socket frame into a row change, filtering by topic.
fn parse_change(text: &str, topic: &str) -> Option<ChangeEvent> {
    let frame: Frame = serde_json::from_str(text).ok()?;
    if frame.topic != topic {
        return None;
    }
    let kind = match frame.event.as_str() {
        "INSERT" => ChangeKind::Insert,
        "UPDATE" => ChangeKind::Update,
        "DELETE" => ChangeKind::Delete,
        _ => return None,
    };
    let key = if kind == ChangeKind::Delete {
        "old_record"
    } else {
        "record"
    };
    let record = frame.payload.get(key)?.clone();
    Some(ChangeEvent { kind, record })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_frames_decode_to_changes() {
        let text = r#"{
            "topic": "realtime:public:messages",
            "event": "INSERT",
            "payload": { "record": { "id": 1, "body": "hi" } }
        }"#;
        let event = parse_change(text, "realtime:public:messages").unwrap();
        assert_eq!(event.kind, ChangeKind::Insert);
        assert_eq!(event.record["body"], "hi");
    }

    #[test]
    fn frames_for_other_topics_are_dropped() {
        let text = r#"{
            "topic": "realtime:public:listings",
            "event": "INSERT",
            "payload": { "record": {} }
        }"#;
        assert!(parse_change(text, "realtime:public:messages").is_none());
    }

    #[test]
    fn protocol_frames_are_dropped() {
        let text = r#"{
            "topic": "realtime:public:messages",
            "event": "phx_reply",
            "payload": { "status": "ok" }
        }"#;
        assert!(parse_change(text, "realtime:public:messages").is_none());
    }

    #[test]
    fn deletes_carry_the_old_record() {
        let text = r#"{
            "topic": "realtime:public:messages",
            "event": "DELETE",
            "payload": { "old_record": { "id": 9 } }
        }"#;
        let event = parse_change(text, "realtime:public:messages").unwrap();
        assert_eq!(event.kind, ChangeKind::Delete);
        assert_eq!(event.record["id"], 9);
    }
}
