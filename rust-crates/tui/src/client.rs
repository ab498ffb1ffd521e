use crate::{
    config_client::ServerClient,
    transport::{
        ChannelEndpoint,
        ChannelEvent,
        GameChannel,
        IntentSink,
    },
    ui,
};
use board_core::{
    gatekeeper::{
        ActionGate,
        Gatekeeper,
    },
    layout::BoardLayout,
    protocol::{
        Intent,
        ServerMessage,
    },
    scheduler::{
        DEFAULT_TICK_RATE,
        Frame,
        RenderScheduler,
        tick_interval,
    },
    session::SessionContext,
    store::{
        ReplaceOutcome,
        SnapshotStore,
    },
};
use color_eyre::eyre::{
    Result,
    WrapErr,
};
use std::time::Instant;
use tokio::{
    sync::{
        mpsc,
        oneshot,
    },
    time::{
        self,
        MissedTickBehavior,
    },
};
use tracing::{
    debug,
    info,
    warn,
};
use url::Url;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub server_url: Url,
    pub session: SessionContext,
    pub tick_rate: u32,
}

impl AppConfig {
    pub fn new(server_url: Url, session: SessionContext) -> Self {
        Self {
            server_url,
            session,
            tick_rate: DEFAULT_TICK_RATE,
        }
    }
}

/// The local player's row in the side panel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlayerHud {
    pub name: String,
    pub color: String,
    pub money: i64,
    pub properties: usize,
    pub in_jail: bool,
}

/// Everything one draw call needs.
#[derive(Clone, Debug)]
pub struct BoardView {
    pub frame: Frame,
    pub gate: ActionGate,
    pub room_id: String,
    pub player_name: String,
    pub connected: bool,
    pub local: Option<PlayerHud>,
    pub log: Vec<String>,
    pub status: String,
}

pub struct AppController<S = GameChannel> {
    session: SessionContext,
    store: SnapshotStore,
    scheduler: RenderScheduler,
    gatekeeper: Gatekeeper,
    channel: S,
    connected: bool,
    status: String,
}

impl<S: IntentSink> AppController<S> {
    pub fn new(session: SessionContext, channel: S) -> Self {
        let gatekeeper = Gatekeeper::new(&session);
        Self {
            status: format!("Connecting to room {}...", session.room_id),
            session,
            store: SnapshotStore::new(),
            scheduler: RenderScheduler::new(),
            gatekeeper,
            channel,
            connected: false,
        }
    }

    pub fn handle_channel_event(&mut self, event: ChannelEvent) {
        match event {
            ChannelEvent::Connected => {
                self.connected = true;
                self.set_status(format!("Connected to room {}", self.session.room_id));
            }
            ChannelEvent::Disconnected => {
                self.connected = false;
                self.set_status("Disconnected from game server");
            }
            ChannelEvent::Message(message) => self.apply_message(message),
        }
    }

    fn apply_message(&mut self, message: ServerMessage) {
        let started = matches!(message, ServerMessage::GameStarted(_));
        let Some(snapshot) = message.into_snapshot() else {
            return;
        };
        match self.store.replace(snapshot) {
            ReplaceOutcome::Accepted => {
                if let Some(current) = self.store.current() {
                    self.scheduler.on_snapshot(current);
                }
                if started {
                    self.set_status("Game started");
                }
            }
            ReplaceOutcome::Stale { latest, received } => {
                debug!(latest, received, "stale snapshot not applied");
            }
        }
    }

    /// A failed fetch leaves the board empty for the rest of the session.
    pub fn apply_layout(&mut self, layout: Result<BoardLayout>) {
        match layout {
            Ok(layout) => {
                info!(tiles = layout.tiles().len(), "board configuration loaded");
                self.store.set_layout(layout);
            }
            Err(err) => {
                warn!(?err, "board configuration unavailable");
                self.set_status("Board configuration unavailable");
            }
        }
    }

    /// The dice start spinning even when the intent cannot be sent.
    pub fn roll(&mut self, now: Instant) {
        if !self.gate().can_roll {
            return;
        }
        let sent = self.channel.send(Intent::RollDice);
        self.scheduler.on_roll_intent(now);
        if sent {
            self.set_status("Rolling...");
        } else {
            self.set_status("Not connected; roll not sent");
        }
    }

    pub fn buy(&mut self) -> bool {
        let gate = self.gate();
        let Some(tile) = gate.buyable_tile else {
            self.set_status("Nothing to buy here");
            return false;
        };
        if self.channel.send(Intent::BuyProperty) {
            self.set_status(format!("Buying {} for ₹{}", tile.name, tile.price));
            true
        } else {
            self.set_status("Not connected; purchase not sent");
            false
        }
    }

    pub fn gate(&self) -> ActionGate {
        self.gatekeeper
            .evaluate(self.store.current(), self.store.layout())
    }

    pub fn tick(&mut self, now: Instant) -> BoardView {
        let frame = self.scheduler.tick(now, &self.store);
        let local = self
            .store
            .current()
            .and_then(|snapshot| snapshot.player(&self.session.player_id))
            .map(|player| PlayerHud {
                name: player.name.clone(),
                color: player.color.clone(),
                money: player.money,
                properties: player.properties.len(),
                in_jail: player.in_jail,
            });
        BoardView {
            frame,
            gate: self.gate(),
            room_id: self.session.room_id.clone(),
            player_name: self.session.player_name.clone(),
            connected: self.connected,
            local,
            log: self.store.log_history().map(str::to_string).collect(),
            status: self.status.clone(),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn channel(&self) -> &S {
        &self.channel
    }

    pub fn shutdown(&mut self) {
        self.channel.close();
    }

    pub fn into_channel(self) -> S {
        self.channel
    }

    fn set_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
    }
}

pub async fn run_app(config: AppConfig) -> Result<()> {
    let endpoint = ChannelEndpoint::for_session(&config.server_url, &config.session)?;
    let server = ServerClient::new(config.server_url.as_str())?;
    info!(url = %endpoint.url(), %server, "opening game channel");
    let (channel, events) = GameChannel::connect(endpoint);
    let controller = AppController::new(config.session.clone(), channel);
    let mut ui_state = ui::UiState::default();
    let mut input_events = ui::input_event_stream();

    ui::terminal_enter(&mut ui_state)?;
    info!("UI ready");
    let res = run_loop(
        controller,
        server,
        events,
        config.tick_rate,
        &mut ui_state,
        &mut input_events,
    )
    .await;
    ui::terminal_exit()?;
    res
}

async fn run_loop(
    mut controller: AppController,
    server: ServerClient,
    mut events: mpsc::UnboundedReceiver<ChannelEvent>,
    tick_rate: u32,
    ui_state: &mut ui::UiState,
    input_events: &mut ui::InputEventReceiver,
) -> Result<()> {
    let (layout_tx, mut layout_rx) = oneshot::channel();
    tokio::spawn(async move {
        let _ = layout_tx.send(server.board_layout().await);
    });
    let mut layout_pending = true;
    let mut events_open = true;

    let mut ticker = time::interval(tick_interval(tick_rate));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let res = loop {
        tokio::select! {
            _ = ticker.tick() => {
                let view = controller.tick(Instant::now());
                if let Err(err) = ui::draw(ui_state, &view).wrap_err("draw failed") {
                    break Err(err);
                }
            }
            layout = &mut layout_rx, if layout_pending => {
                layout_pending = false;
                match layout {
                    Ok(layout) => controller.apply_layout(layout),
                    Err(_) => warn!("board configuration task dropped"),
                }
            }
            event = events.recv(), if events_open => match event {
                Some(event) => controller.handle_channel_event(event),
                None => {
                    debug!("channel event stream ended");
                    events_open = false;
                }
            },
            _ = tokio::signal::ctrl_c() => break Ok(()),
            raw_ev = ui::next_raw_event(input_events) => {
                let event = match raw_ev {
                    Ok(event) => event,
                    Err(err) => break Err(err),
                };
                let Some(ev) = ui::interpret_event(ui_state, event) else {
                    continue;
                };
                match ev {
                    ui::UserEvent::Quit => break Ok(()),
                    ui::UserEvent::Roll => controller.roll(Instant::now()),
                    ui::UserEvent::Buy => {
                        controller.buy();
                    }
                    ui::UserEvent::Redraw => {
                        let view = controller.tick(Instant::now());
                        if let Err(err) = ui::draw(ui_state, &view).wrap_err("redraw failed") {
                            break Err(err);
                        }
                    }
                }
            }
        }
    };

    info!("leaving game view");
    controller.into_channel().shutdown().await;
    res
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]
    use super::*;
    use board_core::layout::{
        Tile,
        TileKind,
    };
    use color_eyre::eyre::eyre;
    use serde_json::json;
    use std::cell::{
        Cell,
        RefCell,
    };

    const PROPERTY_SLOT: u8 = 6;

    #[derive(Default)]
    struct RecordingSink {
        open: bool,
        sent: RefCell<Vec<Intent>>,
        closes: Cell<usize>,
    }

    impl RecordingSink {
        fn open() -> Self {
            Self {
                open: true,
                ..Self::default()
            }
        }
    }

    impl IntentSink for RecordingSink {
        fn send(&self, intent: Intent) -> bool {
            if self.open {
                self.sent.borrow_mut().push(intent);
            }
            self.open
        }

        fn is_open(&self) -> bool {
            self.open
        }

        fn close(&mut self) {
            if self.open {
                self.open = false;
                self.closes.set(self.closes.get() + 1);
            }
        }
    }

    fn controller(sink: RecordingSink) -> AppController<RecordingSink> {
        AppController::new(SessionContext::new("room-1", "me", "Asha"), sink)
    }

    fn layout(price: u32) -> BoardLayout {
        let tiles = (0..40)
            .map(|slot| {
                if slot == PROPERTY_SLOT {
                    Tile::new(slot, "Pune Camp", TileKind::Property, price)
                } else {
                    Tile::new(slot, format!("Tile {slot}"), TileKind::Chance, 0)
                }
            })
            .collect();
        BoardLayout::from_tiles(tiles).unwrap()
    }

    fn update(kind: &str, slot: u8, money: i64, log: &str) -> ChannelEvent {
        let text = json!({
            "type": kind,
            "state": {
                "players": {
                    "me": { "id": "me", "name": "Asha", "position": slot, "money": money, "properties": [1, 3] }
                },
                "ownership": {},
                "game_log": log
            }
        })
        .to_string();
        ChannelEvent::Message(ServerMessage::decode(&text).unwrap())
    }

    #[test]
    fn handle_channel_event__update_state__view_shows_local_player() {
        // given
        let mut controller = controller(RecordingSink::open());

        // when
        controller.handle_channel_event(ChannelEvent::Connected);
        controller.handle_channel_event(update("UPDATE_STATE", 4, 1320, "Asha rolled 4"));
        let view = controller.tick(Instant::now());

        // then
        assert!(view.connected);
        assert_eq!(
            view.local,
            Some(PlayerHud {
                name: "Asha".to_string(),
                color: "#FF6B00".to_string(),
                money: 1320,
                properties: 2,
                in_jail: false,
            })
        );
        assert_eq!(view.frame.players.len(), 1);
        assert_eq!(view.log, vec!["Asha rolled 4".to_string()]);
    }

    #[test]
    fn handle_channel_event__game_started__treated_like_update() {
        // given
        let mut controller = controller(RecordingSink::open());

        // when
        controller.handle_channel_event(update("GAME_STARTED", 0, 1500, ""));

        // then
        let view = controller.tick(Instant::now());
        assert_eq!(view.local.map(|hud| hud.money), Some(1500));
        assert_eq!(controller.status(), "Game started");
    }

    #[test]
    fn handle_channel_event__disconnected__connectivity_flag_cleared() {
        // given
        let mut controller = controller(RecordingSink::open());
        controller.handle_channel_event(ChannelEvent::Connected);

        // when
        controller.handle_channel_event(ChannelEvent::Disconnected);

        // then
        assert!(!controller.is_connected());
        assert!(!controller.tick(Instant::now()).connected);
    }

    #[test]
    fn handle_channel_event__log_lines__newest_first() {
        // given
        let mut controller = controller(RecordingSink::open());

        // when
        for line in ["one", "two", "three"] {
            controller.handle_channel_event(update("UPDATE_STATE", 0, 1500, line));
        }

        // then
        assert_eq!(controller.tick(Instant::now()).log, vec!["three", "two", "one"]);
    }

    #[test]
    fn roll__open_channel__intent_sent_and_dice_spin() {
        // given
        let mut controller = controller(RecordingSink::open());

        // when
        controller.roll(Instant::now());

        // then
        assert_eq!(*controller.channel().sent.borrow(), vec![Intent::RollDice]);
        assert!(controller.tick(Instant::now()).frame.dice.spinning);
    }

    #[test]
    fn roll__channel_not_open__dice_spin_without_sending() {
        // given
        let mut controller = controller(RecordingSink::default());

        // when
        controller.roll(Instant::now());

        // then
        assert!(controller.channel().sent.borrow().is_empty());
        assert!(controller.tick(Instant::now()).frame.dice.spinning);
        assert_eq!(controller.status(), "Not connected; roll not sent");
    }

    #[test]
    fn roll__then_roll_result__dice_rest_on_result() {
        // given
        let mut controller = controller(RecordingSink::open());
        controller.roll(Instant::now());
        let text = json!({
            "type": "UPDATE_STATE",
            "state": { "players": {}, "ownership": {}, "last_roll": [6, 3] }
        })
        .to_string();

        // when
        controller.handle_channel_event(ChannelEvent::Message(
            ServerMessage::decode(&text).unwrap(),
        ));
        let dice = controller.tick(Instant::now()).frame.dice;

        // then
        assert!(!dice.spinning);
        assert_eq!(dice.faces, [6, 3]);
    }

    #[test]
    fn buy__affordable_property__intent_sent() {
        // given
        let mut controller = controller(RecordingSink::open());
        controller.apply_layout(Ok(layout(180)));
        controller.handle_channel_event(update("UPDATE_STATE", PROPERTY_SLOT, 200, ""));

        // when
        let sent = controller.buy();

        // then
        assert!(sent);
        assert_eq!(*controller.channel().sent.borrow(), vec![Intent::BuyProperty]);
        assert_eq!(controller.status(), "Buying Pune Camp for ₹180");
    }

    #[test]
    fn buy__unaffordable_property__nothing_sent() {
        // given
        let mut controller = controller(RecordingSink::open());
        controller.apply_layout(Ok(layout(220)));
        controller.handle_channel_event(update("UPDATE_STATE", PROPERTY_SLOT, 200, ""));

        // when
        let sent = controller.buy();

        // then
        assert!(!sent);
        assert!(controller.channel().sent.borrow().is_empty());
    }

    #[test]
    fn apply_layout__fetch_failed__board_stays_empty() {
        // given
        let mut controller = controller(RecordingSink::open());

        // when
        controller.apply_layout(Err(eyre!("connection refused")));
        let view = controller.tick(Instant::now());

        // then
        assert!(view.frame.is_empty_board());
        assert_eq!(view.status, "Board configuration unavailable");
        assert!(view.gate.can_roll);
    }

    #[test]
    fn shutdown__twice__channel_closed_once() {
        // given
        let mut controller = controller(RecordingSink::open());

        // when
        controller.shutdown();
        controller.shutdown();

        // then
        assert_eq!(controller.channel().closes.get(), 1);
        assert!(!controller.channel().is_open());
    }
}
