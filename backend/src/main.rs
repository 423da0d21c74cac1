use crate::client::Clients;
use crate::config::{Args, StartupError};
use crate::game::SharedGame;
use clap::Parser;
use hashbrown::HashMap;
use std::convert::Infallible;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::info;
use warp::{
    http::{header, Method},
    Filter, Rejection, Reply,
};

mod client;
mod config;
mod game;
mod handler;
mod util;
mod ws;

#[tokio::main]
async fn main() -> Result<(), StartupError> {
    let args = Args::parse();

    let file_appender = tracing_appender::rolling::daily(&args.log_dir, "server.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let subscriber = tracing_subscriber::fmt()
        .json()
        .with_writer(non_blocking)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let game: SharedGame = Arc::new(Mutex::new(args.new_game()?));
    let clients: Clients = Arc::new(RwLock::new(HashMap::new()));
    info!("created game and clients map");

    let addr = args.socket_addr()?;
    info!("listening on ws://{}/{}", addr, config::GAME_PATH);
    warp::serve(routes(game, clients)).run(addr).await;
    Ok(())
}

fn routes(
    game: SharedGame,
    clients: Clients,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    let health_route = warp::path!("health").and_then(handler::health_handler);

    let state_route = warp::path!("state")
        .and(warp::get())
        .and(with_game(game.clone()))
        .and_then(handler::state_handler);

    let roll_route = warp::path!("roll")
        .and(warp::post())
        .and(with_game(game.clone()))
        .and(with_clients(clients.clone()))
        .and_then(handler::roll_handler);

    let ws_route = warp::path(config::GAME_PATH)
        .and(warp::path::end())
        .and(warp::ws())
        .and(with_game(game))
        .and(with_clients(clients))
        .and_then(handler::ws_handler);

    health_route
        .or(state_route)
        .or(roll_route)
        .or(ws_route)
        .with(
            warp::cors()
                .allow_methods(&[Method::OPTIONS, Method::GET, Method::POST])
                .allow_headers(vec![header::CONTENT_TYPE, header::ACCEPT])
                .max_age(300)
                .allow_any_origin(),
        )
}

fn with_clients(clients: Clients) -> impl Filter<Extract = (Clients,), Error = Infallible> + Clone {
    warp::any().map(move || clients.clone())
}

fn with_game(game: SharedGame) -> impl Filter<Extract = (SharedGame,), Error = Infallible> + Clone {
    warp::any().map(move || game.clone())
}
