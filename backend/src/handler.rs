use crate::{
    client::Clients,
    game::{broadcast, SharedGame},
    ws,
};
use tracing::info;
use warp::{http::StatusCode, reply::json, Rejection, Reply};

type Result<T> = std::result::Result<T, Rejection>;

pub async fn ws_handler(ws: warp::ws::Ws, game: SharedGame, clients: Clients) -> Result<impl Reply> {
    Ok(ws
        .max_frame_size(usize::MAX)
        .max_message_size(usize::MAX)
        .on_upgrade(move |socket| ws::client_connection(socket, game, clients)))
}

// Current roster and turn pointer, for rendering
pub async fn state_handler(game: SharedGame) -> Result<impl Reply> {
    let snapshot = game.lock().await.snapshot();
    Ok(json(&snapshot))
}

// Rolls for whoever's turn it is and pushes the result to every client
pub async fn roll_handler(game: SharedGame, clients: Clients) -> Result<impl Reply> {
    let mut game = game.lock().await;
    let report = game.roll();
    let sent = broadcast(&game.snapshot(), clients.read().await.values());
    info!("broadcast turn of {} to {} clients", report.player, sent);
    Ok(json(&report))
}

pub async fn health_handler() -> Result<impl Reply> {
    Ok(StatusCode::OK)
}
