use std::collections::VecDeque;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::time::{Duration, Instant};

use log::{debug, error};

use crate::engine::identity::AuthKind;
use crate::engine::protocol::{EngineCommand, EngineResponse};
use crate::engine::session::{choice_availability, AgeGate, ChoiceAvailability, Session};
use crate::engine::transport::Transport;
use crate::model::game_state::{Choice, GameState};
use crate::model::message::{Acknowledgement, Notice};

/// Runs a [`Session`] on its own thread, one command at a time.
pub struct Engine<T: Transport> {
    rx: Receiver<EngineCommand>,
    tx: Sender<EngineResponse>,
    session: Session<T>,
}

impl<T: Transport> Engine<T> {
    pub fn new(
        rx: Receiver<EngineCommand>,
        tx: Sender<EngineResponse>,
        session: Session<T>,
    ) -> Self {
        Self { rx, tx, session }
    }

    pub fn run(&mut self) {
        while let Ok(cmd) = self.rx.recv() {
            let Some(op) = cmd.operation() else {
                if let EngineCommand::SetDebugUserId(id) = cmd {
                    if !self.session.set_debug_user_id(&id) {
                        debug!("Ignoring debug id edit in host-authenticated mode");
                    }
                }
                continue;
            };

            let outcome = match cmd {
                EngineCommand::Load { story_code, lang } => self
                    .session
                    .load(&story_code, &lang)
                    .map(|s| vec![EngineResponse::StateReplaced(s.clone())]),

                EngineCommand::Choose {
                    story_code,
                    choice_code,
                    lang,
                } => self
                    .session
                    .choose(&story_code, &choice_code, &lang)
                    .map(|s| vec![EngineResponse::StateReplaced(s.clone())]),

                EngineCommand::BuyItem {
                    story_code,
                    item_code,
                    price_gems,
                    lang,
                } => self
                    .session
                    .buy_item(&story_code, &item_code, price_gems, &lang)
                    .map(|s| vec![EngineResponse::StateReplaced(s.clone())]),

                EngineCommand::GrantDebugResources {
                    grant,
                    story_code,
                    lang,
                } => self
                    .session
                    .grant_debug_resources(grant, &story_code, &lang)
                    .map(|ack| {
                        let mut out = self.snapshot();
                        out.push(EngineResponse::Acknowledged(ack));
                        out
                    }),

                EngineCommand::ConfirmAge {
                    agree,
                    story_code,
                    lang,
                } => self
                    .session
                    .confirm_age(agree, &story_code, &lang)
                    .map(|gate| match gate {
                        AgeGate::Confirmed => self.snapshot(),
                        AgeGate::Blocked => vec![EngineResponse::AgeGateBlocked],
                    }),

                EngineCommand::Restart { story_code, lang } => self
                    .session
                    .restart(&story_code, &lang)
                    .map(|s| vec![EngineResponse::StateReplaced(s.clone())]),

                EngineCommand::Purchase {
                    kind,
                    story_code,
                    lang,
                } => self
                    .session
                    .purchase(kind, &story_code, &lang)
                    .map(|s| vec![EngineResponse::StateReplaced(s.clone())]),

                EngineCommand::SetDebugUserId(_) => Ok(Vec::new()),
            };

            let responses = match outcome {
                Ok(responses) => responses,
                Err(e) => vec![EngineResponse::Failed {
                    operation: op,
                    message: e.user_message(op),
                    denial: e.denial().cloned(),
                }],
            };

            for resp in responses {
                let _ = self.tx.send(resp);
            }
            let _ = self.tx.send(EngineResponse::Finished(op));
        }
    }

    fn snapshot(&self) -> Vec<EngineResponse> {
        self.session
            .state()
            .map(|s| EngineResponse::StateReplaced(s.clone()))
            .into_iter()
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Uninitialized,
    Loading,
    Ready,
}

/// The renderer's side of the engine. Holds the busy flag and a read-only
/// copy of the latest snapshot.
pub struct SessionHandle {
    cmd_tx: Sender<EngineCommand>,
    resp_rx: Receiver<EngineResponse>,
    auth: AuthKind,
    default_item_price: u32,
    busy: bool,
    snapshot: Option<GameState>,
    ack: Option<Acknowledgement>,
    notices: VecDeque<Notice>,
    stopped: bool,
}

impl SessionHandle {
    pub fn spawn<T: Transport + 'static>(session: Session<T>) -> Self {
        let auth = session.identity().kind();
        let default_item_price = session.options().default_item_price;
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (resp_tx, resp_rx) = mpsc::channel();

        std::thread::spawn(move || {
            let mut engine = Engine::new(cmd_rx, resp_tx, session);
            engine.run();
        });

        Self {
            cmd_tx,
            resp_rx,
            auth,
            default_item_price,
            busy: false,
            snapshot: None,
            ack: None,
            notices: VecDeque::new(),
            stopped: false,
        }
    }

    pub fn auth(&self) -> AuthKind {
        self.auth
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn phase(&self) -> Phase {
        match (self.busy, &self.snapshot) {
            (true, _) => Phase::Loading,
            (false, None) => Phase::Uninitialized,
            (false, Some(_)) => Phase::Ready,
        }
    }

    pub fn state(&self) -> Option<&GameState> {
        self.snapshot.as_ref()
    }

    pub fn availability(&self, choice: &Choice) -> ChoiceAvailability {
        choice_availability(self.snapshot.as_ref(), choice, self.default_item_price)
    }

    /// Send an operation to the engine. Returns `false`, and sends nothing,
    /// while another operation is outstanding.
    pub fn dispatch(&mut self, cmd: EngineCommand) -> bool {
        if let Some(op) = cmd.operation() {
            if self.busy {
                debug!("{} ignored: another operation is in flight", op.name());
                return false;
            }
            self.busy = true;
        }

        if self.cmd_tx.send(cmd).is_err() {
            self.engine_gone();
            return false;
        }
        true
    }

    /// Forward an edited debug identifier. Host-authenticated sessions never
    /// send one.
    pub fn set_debug_user_id(&mut self, id: &str) {
        if self.auth == AuthKind::Host {
            return;
        }
        let _ = self.cmd_tx.send(EngineCommand::SetDebugUserId(id.to_string()));
    }

    /// Drain whatever the engine has sent. Returns true if anything arrived.
    pub fn poll(&mut self) -> bool {
        let mut changed = false;
        loop {
            match self.resp_rx.try_recv() {
                Ok(resp) => {
                    self.apply(resp);
                    changed = true;
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    changed |= self.engine_gone();
                    break;
                }
            }
        }
        changed
    }

    /// Block until the current operation finishes or `timeout` passes.
    /// Returns true once idle.
    pub fn wait_idle(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while self.busy {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.resp_rx.recv_timeout(remaining) {
                Ok(resp) => self.apply(resp),
                Err(RecvTimeoutError::Timeout) => return false,
                Err(RecvTimeoutError::Disconnected) => {
                    self.engine_gone();
                    return false;
                }
            }
        }
        true
    }

    pub fn take_notice(&mut self) -> Option<Notice> {
        self.notices.pop_front()
    }

    /// The grant acknowledgement, while it is still fresh.
    pub fn acknowledgement(&mut self, now: Instant) -> Option<&Acknowledgement> {
        if self.ack.as_ref().is_some_and(|ack| !ack.is_visible_at(now)) {
            self.ack = None;
        }
        self.ack.as_ref()
    }

    /// The worker thread has exited. Release the busy flag and tell the
    /// player once. Returns true the first time.
    fn engine_gone(&mut self) -> bool {
        self.busy = false;
        if self.stopped {
            return false;
        }
        error!("Engine thread stopped; no further operations can run");
        self.stopped = true;
        self.notices.push_back(Notice::EngineStopped);
        true
    }

    fn apply(&mut self, resp: EngineResponse) {
        match resp {
            EngineResponse::StateReplaced(state) => self.snapshot = Some(state),
            EngineResponse::Failed {
                operation,
                message,
                denial,
            } => self.notices.push_back(Notice::Failed {
                operation,
                message,
                denial,
            }),
            EngineResponse::Acknowledged(ack) => self.ack = Some(ack),
            EngineResponse::AgeGateBlocked => self.notices.push_back(Notice::AgeGateBlocked),
            EngineResponse::Finished(_) => self.busy = false,
        }
    }
}
