//! Conversation controller: the state machine driving one active session.
//!
//! Owns the turn list, runs the classifier, dispatches to the gateway
//! client, manages the placeholder lifecycle, and reconciles with the
//! session store. Only one dispatch may be in flight; excess submissions
//! are dropped, not queued (mirrors the disabled-input-while-loading
//! contract of a chat UI).
//!
//! The async boundary is explicit: [`ConversationController::begin`]
//! transitions to `AwaitingResponse` and hands back a [`DispatchTicket`];
//! the caller drives the gateway and feeds the result to
//! [`ConversationController::complete`]. Tickets carry a generation
//! counter so a `clear()` issued while a request is in flight drops the
//! stale resolution instead of writing it into the fresh conversation.
//! [`ConversationController::submit`] composes the full cycle.

use tracing::{info, warn};

use glimmer_types::config::{ChatConfig, ClassifierRules};
use glimmer_types::error::GatewayError;
use glimmer_types::turn::{ImageRef, Pending, Turn};

use crate::classifier::{Operation, classify};
use crate::gateway::GatewayClient;
use crate::session::store::SessionStore;
use crate::storage::kv_store::KvStore;

/// Assistant reply synthesized when an image arrives with no instruction.
const ACK_MESSAGE: &str =
    "Thanks for sharing the image! Tell me what you'd like me to do with it.";

/// Assistant reply appended when a dispatch fails.
const APOLOGY_MESSAGE: &str =
    "Sorry, something went wrong while processing your request. Please try again.";

/// Controller dispatch states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Idle,
    AwaitingResponse,
}

/// Why a submission was dropped without dispatching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Both text and image were absent.
    Blank,
    /// No API credential is configured.
    MissingCredential,
    /// A dispatch is already in flight.
    Busy,
}

/// Handle for an in-flight dispatch, returned by [`ConversationController::begin`].
#[derive(Debug)]
pub struct DispatchTicket {
    generation: u64,
    operation: Operation,
}

impl DispatchTicket {
    /// The classified operation this dispatch should execute.
    pub fn operation(&self) -> &Operation {
        &self.operation
    }
}

/// Outcome of [`ConversationController::begin`].
#[derive(Debug)]
pub enum Submission {
    /// A dispatch was started; drive the gateway and call `complete`.
    Dispatched(DispatchTicket),
    /// Image-with-no-instruction: acknowledged directly, nothing dispatched.
    Acknowledged,
    /// Dropped without touching the turn list.
    Rejected(RejectReason),
}

/// Outcome of [`ConversationController::complete`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompleteOutcome {
    /// The result was applied to the conversation.
    Applied,
    /// The ticket belonged to a cleared conversation; result dropped.
    Stale,
}

/// Outcome of the composed [`ConversationController::submit`] cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Completed,
    Acknowledged,
    Rejected(RejectReason),
}

/// Explicit configuration for the controller (no ambient globals).
#[derive(Debug, Clone, Default)]
pub struct ControllerConfig {
    pub rules: ClassifierRules,
    pub chat: ChatConfig,
    /// Whether an API credential is available; when false every submission
    /// is rejected before any network call.
    pub credential_configured: bool,
}

/// State machine for the active conversation.
pub struct ConversationController<G, K> {
    gateway: G,
    sessions: SessionStore<K>,
    config: ControllerConfig,
    turns: Vec<Turn>,
    session_id: Option<String>,
    state: ControllerState,
    generation: u64,
}

impl<G: GatewayClient, K: KvStore> ConversationController<G, K> {
    pub fn new(gateway: G, sessions: SessionStore<K>, config: ControllerConfig) -> Self {
        Self {
            gateway,
            sessions,
            config,
            turns: Vec::new(),
            session_id: None,
            state: ControllerState::Idle,
            generation: 0,
        }
    }

    /// Seed the welcome turn into an empty conversation.
    pub fn initialize(&mut self) {
        if self.turns.is_empty() {
            self.turns
                .push(Turn::system(self.config.chat.welcome_message.clone()));
        }
    }

    /// The current turn list, placeholders included.
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    /// Id of the persisted session backing this conversation, if any.
    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    /// Adopt a stored session as the active conversation.
    ///
    /// Any in-flight dispatch is invalidated. Returns false when the id is
    /// unknown, leaving the controller untouched.
    pub async fn load_session(&mut self, id: &str) -> bool {
        let Some(session) = self.sessions.get_by_id(id).await else {
            return false;
        };
        self.generation += 1;
        self.turns = session.turns;
        self.session_id = Some(session.id.clone());
        self.state = ControllerState::Idle;
        if let Err(err) = self.sessions.set_current(Some(session.id.as_str())).await {
            warn!(error = %err, "failed to persist current-session pointer");
        }
        true
    }

    /// Reset to a fresh draft: a single cleared-notice turn, no session id.
    ///
    /// Valid from either state; an in-flight dispatch resolving afterwards
    /// is dropped as stale.
    pub async fn clear(&mut self) {
        self.generation += 1;
        self.turns = vec![Turn::system(self.config.chat.cleared_message.clone())];
        self.session_id = None;
        self.state = ControllerState::Idle;
        if let Err(err) = self.sessions.set_current(None).await {
            warn!(error = %err, "failed to detach current-session pointer");
        }
    }

    /// Accept or reject a user submission.
    ///
    /// On acceptance the user turn is appended and either the exchange is
    /// acknowledged directly (image with no instruction) or a placeholder
    /// turn is recorded and a [`DispatchTicket`] returned.
    pub async fn begin(&mut self, text: &str, image: Option<ImageRef>) -> Submission {
        if self.state == ControllerState::AwaitingResponse {
            return Submission::Rejected(RejectReason::Busy);
        }
        let blank = text.trim().is_empty();
        if blank && image.is_none() {
            return Submission::Rejected(RejectReason::Blank);
        }
        if !self.config.credential_configured {
            return Submission::Rejected(RejectReason::MissingCredential);
        }

        let mut user_turn = Turn::user(text);
        if let Some(ref image) = image {
            user_turn = user_turn.with_image(image.clone());
        }
        self.turns.push(user_turn);

        // An attached image with no instruction is not dispatched as an
        // edit; acknowledge it and wait for the instruction.
        if blank {
            self.turns.push(Turn::assistant(ACK_MESSAGE));
            self.persist().await;
            return Submission::Acknowledged;
        }

        let operation = classify(&self.config.rules, text, image.as_ref(), &self.turns);
        let (kind, notice) = match &operation {
            Operation::Text => (Pending::Response, "Thinking..."),
            Operation::GenerateImage => (Pending::ImageGeneration, "Generating image..."),
            Operation::EditImage { .. } => (Pending::ImageEdit, "Editing image..."),
        };
        self.turns.push(Turn::placeholder(kind, notice));
        self.state = ControllerState::AwaitingResponse;

        info!(operation = ?kind, "dispatch started");
        Submission::Dispatched(DispatchTicket {
            generation: self.generation,
            operation,
        })
    }

    /// Resolve an in-flight dispatch with the gateway result.
    ///
    /// Stale tickets (the conversation was cleared or replaced since
    /// `begin`) are dropped without touching the turn list.
    pub async fn complete(
        &mut self,
        ticket: DispatchTicket,
        result: Result<Turn, GatewayError>,
    ) -> CompleteOutcome {
        if ticket.generation != self.generation || self.state != ControllerState::AwaitingResponse
        {
            info!("dropping stale dispatch resolution");
            return CompleteOutcome::Stale;
        }

        self.turns.retain(|t| !t.is_pending());
        match result {
            Ok(turn) => self.turns.push(turn),
            Err(err) => {
                warn!(error = %err, "dispatch failed");
                self.turns.push(Turn::assistant(APOLOGY_MESSAGE));
            }
        }
        self.state = ControllerState::Idle;
        self.persist().await;
        CompleteOutcome::Applied
    }

    /// Run one full submit cycle: begin, drive the gateway, complete.
    pub async fn submit(&mut self, text: &str, image: Option<ImageRef>) -> SubmitOutcome {
        let ticket = match self.begin(text, image).await {
            Submission::Dispatched(ticket) => ticket,
            Submission::Acknowledged => return SubmitOutcome::Acknowledged,
            Submission::Rejected(reason) => return SubmitOutcome::Rejected(reason),
        };

        let result = match ticket.operation() {
            Operation::Text => {
                let wire: Vec<Turn> = self
                    .turns
                    .iter()
                    .filter(|t| !t.is_pending())
                    .cloned()
                    .collect();
                self.gateway.send_text(&wire).await
            }
            Operation::GenerateImage => self.gateway.generate_image(text).await,
            Operation::EditImage { source } => {
                let source = source.clone();
                self.gateway.edit_image(text, &source).await
            }
        };

        self.complete(ticket, result).await;
        SubmitOutcome::Completed
    }

    async fn persist(&mut self) {
        match self
            .sessions
            .save(&self.turns, self.session_id.as_deref())
            .await
        {
            Ok(Some(id)) => self.session_id = Some(id),
            Ok(None) => {}
            Err(err) => warn!(error = %err, "failed to persist session"),
        }
    }

    /// Access the underlying session store.
    pub fn sessions(&self) -> &SessionStore<K> {
        &self.sessions
    }
}
