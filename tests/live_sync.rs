use std::{fs, net::SocketAddr, path::Path, sync::Arc, time::Duration};

use awards_live_back::{
    config::AppConfig,
    dao::{app_state_store::memory::MemoryAppStateStore, roster_store::file::FileRosterStore},
    routes,
    state::{ServerState, SharedState},
    sync::{
        Backoff, FactListener, HttpSnapshotSource, Poller, ScoreboardRefresher, SnapshotSource,
        ViewHandle,
    },
};
use futures::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tempfile::TempDir;
use tokio::{net::TcpStream, time::timeout};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

struct Server {
    base: String,
    ws: String,
    state: SharedState,
    backend: MemoryAppStateStore,
    _data: TempDir,
}

fn write_roster(dir: &Path) {
    fs::create_dir_all(dir.join("db")).unwrap();
    fs::write(
        dir.join("awards.json"),
        json!({"awards": [
            {"id": 1, "name": "Best Picture", "nominees": [{"id": 5, "name": "Dune"}, {"id": 6, "name": "Heat"}]},
            {"id": 2, "name": "Best Score", "nominees": [{"id": 9, "name": "Arrival"}]}
        ]})
        .to_string(),
    )
    .unwrap();
    fs::write(
        dir.join("db/guests.json"),
        json!({"guests": [{"name": "Ada", "predictions": {"1": 5}, "rooms": ["salon"]}]}).to_string(),
    )
    .unwrap();
}

async fn start_server() -> Server {
    let data = tempfile::tempdir().unwrap();
    write_roster(data.path());

    let config = AppConfig {
        data_dir: data.path().to_path_buf(),
        ..AppConfig::default()
    };
    let state = ServerState::new(config, Arc::new(FileRosterStore::new(data.path())));
    let backend = MemoryAppStateStore::new();
    state
        .store()
        .install_backend(Arc::new(backend.clone()))
        .await
        .unwrap();

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    let app = routes::router(state.clone());
    tokio::spawn(async move {
        axum::serve(listener, app.into_make_service()).await.unwrap();
    });

    Server {
        base: format!("http://{addr}"),
        ws: format!("ws://{addr}/ws"),
        state,
        backend,
        _data: data,
    }
}

impl Server {
    /// Open a relay connection and wait until it is subscribed to the hub.
    async fn connect(&self, role: &str) -> Client {
        let before = self.state.facts().subscriber_count();
        let (client, _) = connect_async(format!("{}?role={role}", self.ws)).await.unwrap();
        wait_until(|| self.state.facts().subscriber_count() > before).await;
        client
    }

    async fn get(&self, path: &str) -> Value {
        reqwest::get(format!("{}{path}", self.base))
            .await
            .unwrap()
            .json()
            .await
            .unwrap()
    }
}

async fn wait_until(mut condition: impl FnMut() -> bool) {
    timeout(Duration::from_secs(2), async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .unwrap();
}

async fn send(client: &mut Client, action: Value) {
    client.send(Message::Text(action.to_string())).await.unwrap();
}

async fn next_json(client: &mut Client) -> Value {
    loop {
        let message = timeout(Duration::from_secs(2), client.next())
            .await
            .expect("no message within two seconds")
            .unwrap()
            .unwrap();
        if let Message::Text(text) = message {
            return serde_json::from_str(&text).unwrap();
        }
    }
}

async fn expect_silence(client: &mut Client) {
    assert!(
        timeout(Duration::from_millis(150), client.next()).await.is_err(),
        "unexpected message"
    );
}

#[tokio::test]
async fn every_connection_receives_the_same_fact_including_the_sender() {
    let server = start_server().await;
    let mut admin = server.connect("admin").await;
    let mut guest = server.connect("guest").await;
    let mut display = server.connect("display").await;

    send(&mut admin, json!({"kind": "showAward", "award_id": 2})).await;

    let expected = json!({"kind": "screenChanged", "screen": {"mode": "award", "award_id": 2}});
    assert_eq!(next_json(&mut admin).await, expected);
    assert_eq!(next_json(&mut guest).await, expected);
    assert_eq!(next_json(&mut display).await, expected);
}

#[tokio::test]
async fn declaring_and_clearing_a_winner_moves_the_score() {
    let server = start_server().await;
    let mut admin = server.connect("admin").await;

    send(&mut admin, json!({"kind": "selectWinner", "award_id": 1, "nominee_id": 5})).await;
    assert_eq!(next_json(&mut admin).await["kind"], "winnerSelected");
    assert_eq!(server.get("/api/guests/with-scores").await[0]["score"], 1);

    send(&mut admin, json!({"kind": "clearWinner", "award_id": 1})).await;
    assert_eq!(next_json(&mut admin).await["kind"], "winnerCleared");
    assert_eq!(server.get("/api/guests/with-scores").await[0]["score"], 0);
}

#[tokio::test]
async fn concurrent_winners_from_different_connections_both_persist() {
    let server = start_server().await;
    let mut first = server.connect("admin").await;
    let mut second = server.connect("admin").await;
    let mut display = server.connect("display").await;

    tokio::join!(
        send(&mut first, json!({"kind": "selectWinner", "award_id": 1, "nominee_id": 5})),
        send(&mut second, json!({"kind": "selectWinner", "award_id": 2, "nominee_id": 9})),
    );
    next_json(&mut display).await;
    next_json(&mut display).await;

    let state = server.get("/api/app-state").await;
    assert_eq!(state["winners"], json!({"1": 5, "2": 9}));
    let persisted = server.backend.document().unwrap();
    assert_eq!(persisted.winners.len(), 2);
}

#[tokio::test]
async fn disconnected_client_catches_up_on_next_poll() {
    let server = start_server().await;
    let view = ViewHandle::new();
    let source = Arc::new(HttpSnapshotSource::new(&server.base, Duration::from_secs(1)).unwrap());
    let poller = Poller::new(source, view.clone(), Duration::from_secs(5));
    poller.poll_once().await.unwrap();

    let client = server.connect("display").await;
    drop(client);
    wait_until(|| server.state.connections().is_empty()).await;

    let mut admin = server.connect("admin").await;
    send(&mut admin, json!({"kind": "lockPredictions"})).await;
    assert_eq!(next_json(&mut admin).await, json!({"kind": "lockChanged", "locked": true}));
    assert!(!view.current().state().predictions_locked);

    assert!(poller.poll_once().await.unwrap());
    assert!(view.current().state().predictions_locked);
}

#[tokio::test]
async fn unknown_action_changes_nothing_and_broadcasts_nothing() {
    let server = start_server().await;
    let mut admin = server.connect("admin").await;
    let mut display = server.connect("display").await;
    let before = server.get("/api/app-state").await;
    let saves = server.backend.save_count();

    send(&mut admin, json!({"kind": "frobnicate", "award_id": 1})).await;
    admin
        .send(Message::Text("not even json".to_string()))
        .await
        .unwrap();
    send(&mut admin, json!({"kind": "ping"})).await;

    assert_eq!(next_json(&mut admin).await, json!({"kind": "pong"}));
    expect_silence(&mut display).await;
    assert_eq!(server.get("/api/app-state").await, before);
    assert_eq!(server.backend.save_count(), saves);
}

#[tokio::test]
async fn failed_write_is_reported_to_the_sender_only() {
    let server = start_server().await;
    let mut admin = server.connect("admin").await;
    let mut display = server.connect("display").await;
    server.backend.set_failing(true);

    send(&mut admin, json!({"kind": "showScoreboard"})).await;

    let reply = next_json(&mut admin).await;
    assert_eq!(reply["kind"], "actionFailed");
    assert_eq!(reply["action"], "showScoreboard");
    expect_silence(&mut display).await;
    assert_eq!(
        server.get("/api/app-state").await["active_screen"],
        json!({"mode": "logo"})
    );
}

#[tokio::test]
async fn listener_mirrors_the_server_view() {
    let server = start_server().await;
    let view = ViewHandle::new();
    let source: Arc<dyn SnapshotSource> =
        Arc::new(HttpSnapshotSource::new(&server.base, Duration::from_secs(1)).unwrap());
    let listener = FactListener::new(&server.base, view.clone(), source)
        .unwrap()
        .with_backoff(Backoff {
            initial: Duration::from_millis(10),
            max: Duration::from_millis(50),
        });
    let before = server.state.facts().subscriber_count();
    let task = tokio::spawn(listener.run());
    wait_until(|| server.state.facts().subscriber_count() > before && view.current().is_synced())
        .await;

    let mut admin = server.connect("admin").await;
    send(&mut admin, json!({"kind": "setEventTitle", "title": "Gala"})).await;
    send(&mut admin, json!({"kind": "selectWinner", "award_id": 1, "nominee_id": 6})).await;

    let mut changes = view.subscribe();
    timeout(
        Duration::from_secs(2),
        changes.wait_for(|view| view.state().winner_for(1) == Some(6)),
    )
    .await
    .unwrap()
    .unwrap();
    let current = view.current();
    assert_eq!(current.state().event_title, "Gala");
    assert!(current.is_roster_stale());

    let scores = Arc::new(HttpSnapshotSource::new(&server.base, Duration::from_secs(1)).unwrap());
    let refresher = ScoreboardRefresher::new(scores, view.clone());
    let scoreboard = refresher.refresh_if_stale().await.unwrap().unwrap();
    assert_eq!(scoreboard[0].guest.name, "Ada");
    assert_eq!(scoreboard[0].score, 0);
    assert!(!view.current().is_roster_stale());
    task.abort();
}
