use crate::client::{Client, Clients, Sender};
use crate::config::{IDLE_TIMEOUT, PING_INTERVAL};
use crate::game::{broadcast, SharedGame};
use futures::{FutureExt, Stream, StreamExt};
use tokio::sync::mpsc;
use tokio::time::{self, Instant};
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::{error, info, warn};
use uuid::Uuid;
use warp::ws::{Message, WebSocket};

pub async fn client_connection(ws: WebSocket, game: SharedGame, clients: Clients) {
    let id = Uuid::new_v4().as_simple().to_string();
    let (client_ws_sender, client_ws_rcv) = ws.split();
    let (client_sender, client_rcv) = mpsc::unbounded_channel();

    let client_rcv = UnboundedReceiverStream::new(client_rcv);
    tokio::task::spawn(client_rcv.forward(client_ws_sender).map(|result| {
        if let Err(e) = result {
            error!("error sending websocket msg: {}", e);
        }
    }));

    let client = Client {
        sender: Sender(client_sender),
    };

    serve(id, client_ws_rcv, client, game, clients).await;
}

// Registers the connection, reads until it closes or goes quiet, then deregisters
async fn serve<S>(id: String, mut incoming: S, client: Client, game: SharedGame, clients: Clients)
where
    S: Stream<Item = Result<Message, warp::Error>> + Unpin,
{
    // Join the broadcast group and receive the roster under the game lock, so no
    // update can land between the two.
    {
        let game = game.lock().await;
        broadcast(&game.snapshot(), [&client]);
        clients.write().await.insert(id.clone(), client.clone());
    }

    info!("{} connected", id);

    let mut keepalive = time::interval_at(Instant::now() + PING_INTERVAL, PING_INTERVAL);
    let mut last_seen = Instant::now();

    loop {
        tokio::select! {
            result = incoming.next() => {
                let msg = match result {
                    Some(Ok(msg)) => msg,
                    Some(Err(e)) => {
                        error!("error receiving ws message for id: {}): {}", id, e);
                        break;
                    }
                    None => break,
                };
                last_seen = Instant::now();
                if msg.is_close() {
                    break;
                }
                client_msg(&id, msg, &game, &clients).await;
            }
            _ = keepalive.tick() => {
                if last_seen.elapsed() > PING_INTERVAL + IDLE_TIMEOUT {
                    warn!("{} stopped responding, closing connection", id);
                    let _ = client.sender.close();
                    break;
                }
                if client.sender.ping().is_err() {
                    break;
                }
            }
        }
    }

    clients.write().await.remove(&id);
    info!("{} disconnected", id);
}

#[tracing::instrument(skip(game, clients))]
async fn client_msg(id: &str, msg: Message, game: &SharedGame, clients: &Clients) {
    info!("received message from {}: {:?}", id, msg);
    // Ping, pong and binary frames only count towards liveness
    let message = match msg.to_str() {
        Ok(v) => v.trim(),
        Err(_) => return,
    };

    if message == "ping" {
        return;
    }

    let mut game = game.lock().await;
    let clients = clients.read().await;
    match game.apply_and_broadcast(message, clients.values()) {
        Ok(sent) => info!("broadcast update from {} to {} clients", id, sent),
        Err(err) => warn!("Dropped message from {}: {}", id, err),
    }
}
