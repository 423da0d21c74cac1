use hashbrown::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{mpsc, RwLock};
use warp::ws::Message;

#[derive(Error, Debug)]
#[error("Error sending message")]
pub struct SendError;

// Broadcast group, keyed by connection ID
pub type Clients = Arc<RwLock<HashMap<String, Client>>>;

#[derive(Debug, Clone)]
pub struct Sender(pub mpsc::UnboundedSender<Result<Message, warp::Error>>);

impl Sender {
    pub fn ping(&self) -> Result<(), SendError> {
        self.0.send(Ok(Message::ping(Vec::new()))).map_err(|_| SendError)
    }

    pub fn close(&self) -> Result<(), SendError> {
        self.0.send(Ok(Message::close())).map_err(|_| SendError)
    }
}

#[derive(Debug, Clone)]
pub struct Client {
    pub sender: Sender,
}

pub trait SendMsg {
    fn send(&self, msg: &str) -> Result<(), SendError>;
}

impl SendMsg for Sender {
    fn send(&self, msg: &str) -> Result<(), SendError> {
        self.0.send(Ok(Message::text(msg))).map_err(|_| SendError)
    }
}

impl SendMsg for Client {
    fn send(&self, msg: &str) -> Result<(), SendError> {
        self.sender.send(msg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_send_after_receiver_dropped() {
        let (tx, rx) = mpsc::unbounded_channel();
        let client = Client {
            sender: Sender(tx),
        };
        assert!(client.send("[]").is_ok());
        drop(rx);
        assert!(client.send("[]").is_err());
        assert!(client.sender.ping().is_err());
    }

    #[test]
    fn test_send_queues_text_frame() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let sender = Sender(tx);
        sender.send("hello").unwrap();
        sender.ping().unwrap();
        let msg = rx.try_recv().unwrap().unwrap();
        assert_eq!(msg.to_str(), Ok("hello"));
        assert!(rx.try_recv().unwrap().unwrap().is_ping());
    }
}
