use futures::{SinkExt, StreamExt};
use huddle_api::{build_router, state::AppState};
use huddle_config::{AppSettings, MeetingSettings, Settings};
use huddle_protocol::ClientEvent;
use serde_json::Value;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, tungstenite::Message};

/// A running test server with in-memory state.
pub struct TestApp {
    pub addr: SocketAddr,
    pub base_url: String,
    pub settings: Settings,
    pub client: reqwest::Client,
}

impl TestApp {
    /// Spawn a test server on an ephemeral port with default settings.
    pub async fn spawn() -> Self {
        Self::spawn_with_settings(|_| {}).await
    }

    /// Spawn a test server with customized settings.
    ///
    /// The `mutator` closure receives a `&mut Settings` after defaults are
    /// applied, allowing tests to tweak specific fields (e.g., waiting-room
    /// defaults).
    pub async fn spawn_with_settings(mutator: impl FnOnce(&mut Settings)) -> Self {
        let mut settings = Settings::load().unwrap_or_else(|_| test_settings());
        mutator(&mut settings);

        let app_state = AppState::new(settings.clone());
        let app = build_router(app_state);

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let base_url = format!("http://{}", addr);
        let client = reqwest::Client::new();

        Self {
            addr,
            base_url,
            settings,
            client,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Open a WebSocket connection and consume the initial `connected` frame.
    pub async fn connect_ws(&self) -> WsClient {
        let ws_url = format!("ws://{}/ws", self.addr);
        let (stream, _) = tokio_tungstenite::connect_async(&ws_url)
            .await
            .expect("WS connect failed");

        let mut client = WsClient {
            stream,
            socket_id: String::new(),
        };
        let connected = client.recv().await;
        assert_eq!(connected["type"], "connected");
        client.socket_id = connected["data"]["socket_id"]
            .as_str()
            .expect("connected frame without socket_id")
            .to_string();
        client
    }
}

/// One WebSocket participant in a test, identified by the server-assigned
/// socket id from the `connected` frame.
pub struct WsClient {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
    pub socket_id: String,
}

impl WsClient {
    pub async fn send(&mut self, event: &ClientEvent) {
        let text = serde_json::to_string(event).unwrap();
        self.stream
            .send(Message::text(text))
            .await
            .expect("WS send failed");
    }

    pub async fn send_raw(&mut self, text: &str) {
        self.stream
            .send(Message::text(text.to_string()))
            .await
            .expect("WS send failed");
    }

    /// Receives the next text frame as JSON, with a timeout.
    pub async fn recv(&mut self) -> Value {
        loop {
            let msg = tokio::time::timeout(Duration::from_secs(5), self.stream.next())
                .await
                .expect("Timeout waiting for WS message")
                .expect("WS stream closed")
                .expect("WS error");
            if let Message::Text(text) = msg {
                return serde_json::from_str(&text).expect("non-JSON WS frame");
            }
        }
    }

    /// Skips frames until one with the given `type` arrives. Bounded so a
    /// missing event fails the test instead of hanging it.
    pub async fn recv_type(&mut self, event_type: &str) -> Value {
        for _ in 0..10 {
            let frame = self.recv().await;
            if frame["type"] == event_type {
                return frame;
            }
        }
        panic!("never received a '{event_type}' frame");
    }

    pub async fn close(mut self) {
        let _ = self.stream.close(None).await;
    }
}

fn test_settings() -> Settings {
    Settings {
        app: AppSettings {
            host: "127.0.0.1".to_string(),
            port: 0,
            static_dir: None,
            cors_origins: Vec::new(),
        },
        meeting: MeetingSettings {
            waiting_room_enabled: false,
            mute_on_entry: false,
            welcome_message: None,
            rename_max_len: 50,
            max_waiting_participants: 100,
        },
    }
}
