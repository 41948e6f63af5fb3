//! In-process link between the editor and the host task.
//!
//! Commands are posted without waiting. Requests get a fresh [`RequestId`]
//! and their responses are parked until the caller asks for them, so a
//! response and a burst of notifications may arrive in any order.

use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};

use anyhow::{Result, bail};
use serde::Serialize;
use tokio::sync::mpsc::error::TryRecvError;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tracing::warn;

use crate::plan::CommandSink;
use crate::protocol::{
    FromHost, HostCommand, HostNotification, HostRequest, HostResponse, RequestId, ToHost,
};
use crate::trace::SessionTrace;

/// The host's half of the link.
pub struct HostEndpoint {
    pub inbox: UnboundedReceiver<ToHost>,
    pub outbox: UnboundedSender<FromHost>,
}

pub fn channel() -> (HostLink, HostEndpoint) {
    let (to_host_tx, to_host_rx) = unbounded_channel();
    let (from_host_tx, from_host_rx) = unbounded_channel();
    let link = HostLink {
        tx: to_host_tx,
        rx: from_host_rx,
        next_id: 0,
        responses: HashMap::new(),
        notifications: VecDeque::new(),
        trace: None,
        disconnected: false,
    };
    let endpoint = HostEndpoint {
        inbox: to_host_rx,
        outbox: from_host_tx,
    };
    (link, endpoint)
}

pub struct HostLink {
    tx: UnboundedSender<ToHost>,
    rx: UnboundedReceiver<FromHost>,
    next_id: u64,
    responses: HashMap<RequestId, HostResponse>,
    notifications: VecDeque<HostNotification>,
    trace: Option<SessionTrace>,
    disconnected: bool,
}

impl HostLink {
    pub fn with_trace(mut self, trace: Option<SessionTrace>) -> Self {
        self.trace = trace;
        self
    }

    pub fn is_disconnected(&self) -> bool {
        self.disconnected
    }

    fn record<T: Serialize>(&mut self, event: &str, payload: &T) {
        let Some(trace) = self.trace.as_mut() else {
            return;
        };
        if let Err(err) = trace.record(event, payload) {
            warn!(error = %format!("{:#}", err), "session trace disabled");
            self.trace = None;
        }
    }

    fn post(&mut self, msg: ToHost) {
        self.record("to_host", &msg);
        if self.tx.send(msg).is_err() && !self.disconnected {
            warn!("host channel closed; dropping outbound messages");
            self.disconnected = true;
        }
    }

    pub fn request(&mut self, request: HostRequest) -> RequestId {
        self.next_id += 1;
        let id = RequestId(self.next_id);
        self.post(ToHost::Request { id, request });
        id
    }

    fn accept(&mut self, msg: FromHost) {
        self.record("from_host", &msg);
        match msg {
            FromHost::Notification { notification } => self.notifications.push_back(notification),
            FromHost::Response { id, response } => {
                self.responses.insert(id, response);
            }
        }
    }

    /// Drains whatever the host has sent so far and returns the
    /// notifications in arrival order.
    pub fn poll(&mut self) -> Vec<HostNotification> {
        loop {
            match self.rx.try_recv() {
                Ok(msg) => self.accept(msg),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.disconnected = true;
                    break;
                }
            }
        }
        self.notifications.drain(..).collect()
    }

    pub fn take_response(&mut self, id: RequestId) -> Option<HostResponse> {
        self.responses.remove(&id)
    }

    /// Blocks until the response for `id` arrives. Notifications received
    /// meanwhile stay queued for the next [`HostLink::poll`].
    pub fn wait_for(&mut self, id: RequestId, timeout: Duration) -> Result<HostResponse> {
        let deadline = Instant::now() + timeout;
        loop {
            if let Some(response) = self.responses.remove(&id) {
                return Ok(response);
            }
            match self.rx.try_recv() {
                Ok(msg) => {
                    self.accept(msg);
                    continue;
                }
                Err(TryRecvError::Empty) => {}
                Err(TryRecvError::Disconnected) => {
                    self.disconnected = true;
                    bail!("host disconnected before answering request {}", id.0);
                }
            }
            if Instant::now() >= deadline {
                bail!("timed out waiting for host reply to request {}", id.0);
            }
            std::thread::sleep(Duration::from_millis(5));
        }
    }
}

impl CommandSink for HostLink {
    fn send(&mut self, command: HostCommand) {
        self.post(ToHost::Command { command });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{PlanState, PlanStatus};

    #[test]
    fn responses_are_matched_by_id_regardless_of_order() -> Result<()> {
        let (mut link, mut endpoint) = channel();
        let first = link.request(HostRequest::Bootstrap);
        let second = link.request(HostRequest::Command {
            command: HostCommand::Start,
        });

        let mut seen = Vec::new();
        while let Ok(msg) = endpoint.inbox.try_recv() {
            if let ToHost::Request { id, .. } = msg {
                seen.push(id);
            }
        }
        assert_eq!(seen, vec![first, second]);

        endpoint.outbox.send(FromHost::Response {
            id: second,
            response: HostResponse::Ack {
                status: PlanStatus::Started,
            },
        })?;
        endpoint.outbox.send(FromHost::Notification {
            notification: HostNotification::DidChange {
                state: PlanState::default(),
            },
        })?;
        endpoint.outbox.send(FromHost::Response {
            id: first,
            response: HostResponse::State {
                state: PlanState::default(),
            },
        })?;

        let r = link.wait_for(first, Duration::from_secs(1))?;
        assert!(matches!(r, HostResponse::State { .. }));
        assert_eq!(link.poll().len(), 1);
        assert!(matches!(
            link.take_response(second),
            Some(HostResponse::Ack {
                status: PlanStatus::Started
            })
        ));
        Ok(())
    }

    #[test]
    fn closed_host_is_reported() {
        let (mut link, endpoint) = channel();
        drop(endpoint);
        link.send(HostCommand::Search);
        assert!(link.is_disconnected());
        let id = link.request(HostRequest::Bootstrap);
        assert!(link.wait_for(id, Duration::from_millis(50)).is_err());
    }
}
