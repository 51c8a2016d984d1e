//! TransportClient: one persistent connection with fixed-delay reconnect.
//!
//! # State machine
//!
//! ```text
//!                connect()
//! Disconnected ───────────► Connecting ──ok──► Connected
//!      ▲                        │                  │
//!      │ after delay            │ fail/timeout     │ close
//!      │                        ▼                  ▼
//!      └──────────────────── Error          Disconnected ── after delay ──► Connecting
//! ```
//!
//! The reconnect delay is fixed and retries never stop: an operator cannot
//! give up on a physical panel.  Only one connect attempt is in flight at a
//! time.  While a reconnect is pending the state stays `Disconnected` (or
//! `Error` after a failed attempt); it becomes `Connecting` only when the next
//! attempt actually starts.
//!
//! # For beginners: driving the client
//!
//! The client owns no task of its own.  The event loop calls
//! [`TransportClient::next_event`] inside `tokio::select!`; that future waits
//! for whichever happens first (the connect attempt finishes, a frame arrives,
//! the link closes, or the reconnect timer fires), updates the state and
//! reports the change.  `next_event` is cancel-safe, so losing a `select!`
//! race never drops an event.
//!
//! Sending is synchronous: [`TransportClient::send`] pushes the frame into the
//! link's channel and the connector's writer task does the actual I/O.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinHandle};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::application::{EventSink, TransportError};
use crate::domain::ConnectionState;

/// An established connection, as seen by the transport client.
///
/// Dropping `outgoing` asks the connector's writer to close the connection.
#[derive(Debug)]
pub struct Link {
    /// Text frames to send.
    pub outgoing: mpsc::UnboundedSender<String>,
    /// Frames and the close notification coming back.
    pub incoming: mpsc::UnboundedReceiver<LinkEvent>,
}

/// Something that happened on an established link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkEvent {
    /// A text frame from the remote end.
    Message(String),
    /// The connection ended, with an optional reason.
    Closed(Option<String>),
}

/// Opens links.  Implemented over WebSocket in production and by scripted
/// doubles in tests.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, endpoint: &str) -> Result<Link, TransportError>;
}

/// What [`TransportClient::next_event`] reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    StateChanged(ConnectionState),
    /// A text frame from the backend.
    Incoming(String),
}

type Attempt = JoinHandle<Result<Link, TransportError>>;

/// Reconnecting client for one endpoint.
pub struct TransportClient {
    connector: Arc<dyn Connector>,
    endpoint: String,
    state: ConnectionState,
    reconnect_delay: Duration,
    connect_timeout: Duration,
    link: Option<Link>,
    attempt: Option<Attempt>,
    reconnect_at: Option<Instant>,
    closed: bool,
    pending: VecDeque<TransportEvent>,
    attempts: u64,
}

impl TransportClient {
    /// Creates a disconnected client.  Nothing happens until
    /// [`Self::connect`] is called.
    pub fn new(
        connector: Arc<dyn Connector>,
        endpoint: impl Into<String>,
        reconnect_delay: Duration,
        connect_timeout: Duration,
    ) -> Self {
        Self {
            connector,
            endpoint: endpoint.into(),
            state: ConnectionState::Disconnected,
            reconnect_delay,
            connect_timeout,
            link: None,
            attempt: None,
            reconnect_at: None,
            closed: false,
            pending: VecDeque::new(),
            attempts: 0,
        }
    }

    /// Starts a connect attempt.
    ///
    /// Never fails: a failed attempt shows up later as
    /// [`ConnectionState::Error`] followed by a scheduled retry.  Ignored when
    /// an attempt is already in flight, the link is up, or the client was
    /// closed.
    pub fn connect(&mut self) {
        if self.closed {
            debug!("transport closed, not connecting");
            return;
        }
        if self.attempt.is_some() || self.link.is_some() {
            debug!(state = %self.state, "connect ignored, attempt in flight or already connected");
            return;
        }
        self.reconnect_at = None;
        self.attempts += 1;
        info!(endpoint = %self.endpoint, attempt = self.attempts, "connecting");

        let connector = Arc::clone(&self.connector);
        let endpoint = self.endpoint.clone();
        let timeout = self.connect_timeout;
        self.attempt = Some(tokio::spawn(async move {
            let result = tokio::time::timeout(timeout, connector.connect(&endpoint)).await;
            match result {
                Ok(result) => result,
                Err(_) => Err(TransportError::Timeout {
                    endpoint,
                    after_ms: timeout.as_millis() as u64,
                }),
            }
        }));
        self.set_state(ConnectionState::Connecting);
    }

    /// Waits for the next state change or incoming frame.
    ///
    /// Cancel-safe.  Pends forever when there is nothing to wait for (closed
    /// client with no pending events).
    pub async fn next_event(&mut self) -> TransportEvent {
        loop {
            if let Some(event) = self.pending.pop_front() {
                return event;
            }
            tokio::select! {
                result = join_attempt(&mut self.attempt) => {
                    self.attempt = None;
                    self.on_attempt_finished(result);
                }
                event = recv_link(&mut self.link) => match event {
                    Some(LinkEvent::Message(text)) => return TransportEvent::Incoming(text),
                    Some(LinkEvent::Closed(reason)) => self.on_link_closed(reason),
                    None => self.on_link_closed(None),
                },
                _ = wait_until(self.reconnect_at) => {
                    self.reconnect_at = None;
                    self.connect();
                }
            }
        }
    }

    fn on_attempt_finished(&mut self, result: Result<Result<Link, TransportError>, JoinError>) {
        let error = match result {
            Ok(Ok(link)) => {
                info!(endpoint = %self.endpoint, "connected");
                self.link = Some(link);
                self.set_state(ConnectionState::Connected);
                return;
            }
            Ok(Err(e)) => e,
            Err(e) => TransportError::ConnectFailed {
                endpoint: self.endpoint.clone(),
                reason: e.to_string(),
            },
        };
        warn!(error = %error, "connect attempt failed");
        self.set_state(ConnectionState::Error);
        self.schedule_reconnect(self.reconnect_delay);
    }

    fn on_link_closed(&mut self, reason: Option<String>) {
        self.link = None;
        info!(reason = reason.as_deref().unwrap_or("none"), "connection closed");
        self.set_state(ConnectionState::Disconnected);
        self.schedule_reconnect(self.reconnect_delay);
    }

    fn schedule_reconnect(&mut self, delay: Duration) {
        if self.closed {
            return;
        }
        info!(delay_ms = delay.as_millis() as u64, "reconnect scheduled");
        self.reconnect_at = Some(Instant::now() + delay);
    }

    fn set_state(&mut self, state: ConnectionState) {
        if self.state != state {
            self.state = state;
            self.pending.push_back(TransportEvent::StateChanged(state));
        }
    }

    /// Queues a text frame.
    ///
    /// # Errors
    ///
    /// [`TransportError::NotConnected`] unless the state is `Connected`;
    /// [`TransportError::Closed`] if the link's writer already stopped.
    pub fn send(&mut self, frame: String) -> Result<(), TransportError> {
        if !self.state.is_connected() {
            return Err(TransportError::NotConnected);
        }
        let link = self.link.as_ref().ok_or(TransportError::NotConnected)?;
        link.outgoing
            .send(frame)
            .map_err(|_| TransportError::Closed)
    }

    /// Drops the current link (or attempt) and connects again after `delay`.
    pub fn request_reconnect(&mut self, delay: Duration) {
        if self.closed {
            return;
        }
        if let Some(attempt) = self.attempt.take() {
            attempt.abort();
        }
        self.link = None;
        self.set_state(ConnectionState::Disconnected);
        self.schedule_reconnect(delay);
    }

    /// Closes the link and stops reconnecting for good.
    pub fn close(&mut self) {
        self.closed = true;
        if let Some(attempt) = self.attempt.take() {
            attempt.abort();
        }
        self.link = None;
        self.reconnect_at = None;
        self.set_state(ConnectionState::Disconnected);
        info!(endpoint = %self.endpoint, "transport closed");
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Number of connect attempts started so far.
    pub fn attempts(&self) -> u64 {
        self.attempts
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// When the next reconnect attempt starts, if one is scheduled.
    pub fn reconnect_at(&self) -> Option<Instant> {
        self.reconnect_at
    }
}

impl Drop for TransportClient {
    fn drop(&mut self) {
        if let Some(attempt) = self.attempt.take() {
            attempt.abort();
        }
    }
}

impl EventSink for TransportClient {
    fn state(&self) -> ConnectionState {
        self.state
    }

    fn send(&mut self, frame: String) -> Result<(), TransportError> {
        TransportClient::send(self, frame)
    }
}

async fn join_attempt(
    attempt: &mut Option<Attempt>,
) -> Result<Result<Link, TransportError>, JoinError> {
    match attempt {
        Some(handle) => handle.await,
        None => std::future::pending().await,
    }
}

async fn recv_link(link: &mut Option<Link>) -> Option<LinkEvent> {
    match link {
        Some(link) => link.incoming.recv().await,
        None => std::future::pending().await,
    }
}

/// Sleeps until `deadline`, or forever when there is none.
pub(crate) async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
