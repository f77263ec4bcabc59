//! A small pub-sub channel for engine events.
//!
//! Each [`EventHandler`] owns the receiving end of a bounded tokio channel and a single async callback. Any number of
//! [`EventProducer`]s can be handed out to the APIs. The handler runs every event through the callback on its own
//! task, and shuts down once every producer has been dropped and all in-flight callbacks have finished.
//!
//! Handlers see only the event. They have no access to engine state, and nothing they do can affect a settlement that
//! has already been committed.
use std::{
    future::Future,
    pin::Pin,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};

use log::*;
use tokio::sync::{mpsc, Notify};

pub type Handler<E> = Arc<dyn Fn(E) -> Pin<Box<dyn Future<Output = ()> + Send>> + Send + Sync>;

pub struct EventHandler<E: Send + Sync + 'static> {
    inbox: mpsc::Receiver<E>,
    outbox: mpsc::Sender<E>,
    callback: Handler<E>,
}

impl<E: Send + Sync + 'static> EventHandler<E> {
    pub fn new(buffer_size: usize, handler: Handler<E>) -> Self {
        let (outbox, inbox) = mpsc::channel(buffer_size.max(1));
        Self { inbox, outbox, callback: handler }
    }

    pub fn subscribe(&self) -> EventProducer<E> {
        EventProducer::new(self.outbox.clone())
    }

    /// Runs until every producer is dropped, then waits for the outstanding callbacks.
    pub async fn start_handler(mut self) {
        debug!("📬️ Event handler listening");
        // Only producers may keep the channel open.
        drop(self.outbox);
        let in_flight = Arc::new(AtomicUsize::new(0));
        let idle = Arc::new(Notify::new());
        while let Some(event) = self.inbox.recv().await {
            let callback = Arc::clone(&self.callback);
            let in_flight = Arc::clone(&in_flight);
            let idle = Arc::clone(&idle);
            in_flight.fetch_add(1, Ordering::SeqCst);
            tokio::spawn(async move {
                (callback)(event).await;
                if in_flight.fetch_sub(1, Ordering::SeqCst) == 1 {
                    idle.notify_one();
                }
            });
        }
        while in_flight.load(Ordering::SeqCst) > 0 {
            trace!("📬️ Waiting for {} event callbacks to finish", in_flight.load(Ordering::SeqCst));
            idle.notified().await;
        }
        debug!("📬️ All producers are gone and every callback has returned. Event handler stopped.");
    }
}

#[derive(Clone)]
pub struct EventProducer<E: Send + Sync> {
    sender: mpsc::Sender<E>,
}

impl<E: Send + Sync> EventProducer<E> {
    pub fn new(sender: mpsc::Sender<E>) -> Self {
        Self { sender }
    }

    /// Failures are logged and swallowed. A closed handler never blocks the engine.
    pub async fn publish_event(&self, event: E) {
        if let Err(e) = self.sender.send(event).await {
            warn!("📬️ Failed to publish event: {e}");
        }
    }
}
