use std::{future::Future, pin::Pin, sync::Arc};

use log::*;

use crate::{
    db_types::{Game, Tournament},
    events::{
        EventHandler,
        EventProducer,
        GameSettledEvent,
        GameStartedEvent,
        Handler,
        Notification,
        TournamentCompletedEvent,
    },
};

type BoxedHook = Pin<Box<dyn Future<Output = ()> + Send>>;

/// The senders that the APIs publish through. An empty set of producers is valid and simply discards every event.
#[derive(Default, Clone)]
pub struct EventProducers {
    pub game_started_producer: Vec<EventProducer<GameStartedEvent>>,
    pub game_settled_producer: Vec<EventProducer<GameSettledEvent>>,
    pub notification_producer: Vec<EventProducer<Notification>>,
    pub tournament_completed_producer: Vec<EventProducer<TournamentCompletedEvent>>,
}

impl EventProducers {
    pub async fn publish_game_started(&self, game: &Game) {
        for emitter in &self.game_started_producer {
            trace!("📬️ Publishing game started event for {}", game.id);
            emitter.publish_event(GameStartedEvent::new(game.clone())).await;
        }
    }

    pub async fn publish_game_settled(&self, event: &GameSettledEvent) {
        for emitter in &self.game_settled_producer {
            trace!("📬️ Publishing game settled event for {}", event.game.id);
            emitter.publish_event(event.clone()).await;
        }
    }

    pub async fn publish_tournament_completed(&self, tournament: &Tournament) {
        for emitter in &self.tournament_completed_producer {
            trace!("📬️ Publishing tournament completed event for {}", tournament.id);
            emitter.publish_event(TournamentCompletedEvent::new(tournament.clone())).await;
        }
    }

    pub async fn notify(&self, notification: Notification) {
        for emitter in &self.notification_producer {
            emitter.publish_event(notification.clone()).await;
        }
    }
}

pub struct EventHandlers {
    pub on_game_started: Option<EventHandler<GameStartedEvent>>,
    pub on_game_settled: Option<EventHandler<GameSettledEvent>>,
    pub on_notification: Option<EventHandler<Notification>>,
    pub on_tournament_completed: Option<EventHandler<TournamentCompletedEvent>>,
}

impl EventHandlers {
    pub fn new(buffer_size: usize, hooks: EventHooks) -> Self {
        let on_game_started = hooks.on_game_started.map(|f| EventHandler::new(buffer_size, f));
        let on_game_settled = hooks.on_game_settled.map(|f| EventHandler::new(buffer_size, f));
        let on_notification = hooks.on_notification.map(|f| EventHandler::new(buffer_size, f));
        let on_tournament_completed = hooks.on_tournament_completed.map(|f| EventHandler::new(buffer_size, f));
        Self { on_game_started, on_game_settled, on_notification, on_tournament_completed }
    }

    pub fn producers(&self) -> EventProducers {
        let mut result = EventProducers::default();
        if let Some(handler) = &self.on_game_started {
            result.game_started_producer.push(handler.subscribe());
        }
        if let Some(handler) = &self.on_game_settled {
            result.game_settled_producer.push(handler.subscribe());
        }
        if let Some(handler) = &self.on_notification {
            result.notification_producer.push(handler.subscribe());
        }
        if let Some(handler) = &self.on_tournament_completed {
            result.tournament_completed_producer.push(handler.subscribe());
        }
        result
    }

    /// Spawns a task per registered hook. The tasks end once every producer has been dropped.
    pub async fn start_handlers(self) {
        if let Some(handler) = self.on_game_started {
            tokio::spawn(handler.start_handler());
        }
        if let Some(handler) = self.on_game_settled {
            tokio::spawn(handler.start_handler());
        }
        if let Some(handler) = self.on_notification {
            tokio::spawn(handler.start_handler());
        }
        if let Some(handler) = self.on_tournament_completed {
            tokio::spawn(handler.start_handler());
        }
    }
}

#[derive(Default, Clone)]
pub struct EventHooks {
    pub on_game_started: Option<Handler<GameStartedEvent>>,
    pub on_game_settled: Option<Handler<GameSettledEvent>>,
    pub on_notification: Option<Handler<Notification>>,
    pub on_tournament_completed: Option<Handler<TournamentCompletedEvent>>,
}

impl EventHooks {
    pub fn on_game_started<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(GameStartedEvent) -> BoxedHook) + Send + Sync + 'static {
        self.on_game_started = Some(Arc::new(f));
        self
    }

    pub fn on_game_settled<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(GameSettledEvent) -> BoxedHook) + Send + Sync + 'static {
        self.on_game_settled = Some(Arc::new(f));
        self
    }

    /// Registers the outbound notification hook. This is where push, email or chat delivery plugs in.
    pub fn on_notification<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(Notification) -> BoxedHook) + Send + Sync + 'static {
        self.on_notification = Some(Arc::new(f));
        self
    }

    pub fn on_tournament_completed<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(TournamentCompletedEvent) -> BoxedHook) + Send + Sync + 'static {
        self.on_tournament_completed = Some(Arc::new(f));
        self
    }
}
