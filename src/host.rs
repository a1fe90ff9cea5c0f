//! Messaging with the window that opened the viewer.
//!
//! The exchange is a one-shot handshake over two independent queues: the
//! viewer announces it has loaded, the opener posts the data once, and the
//! viewer acknowledges the first render. Nothing waits on the other side,
//! nothing is retried.

use std::sync::mpsc::{Receiver, Sender, channel};

use serde::Deserialize;
use serde_json::{Value, json};
use tracing::debug;

use crate::node::RootNode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowId(pub u64);

/// A message as delivered to this window.
#[derive(Debug, Clone)]
pub struct MessageEvent {
    pub source: WindowId,
    pub data: Value,
}

/// The data message posted by the opener.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewerPayload {
    pub document_url: String,
    pub id: String,
    pub root_nodes: Vec<RootNode>,
}

fn truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) | Some(Value::Bool(false)) => false,
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Number(n)) => n.as_f64().is_some_and(|n| n != 0.0),
        Some(_) => true,
    }
}

impl ViewerPayload {
    /// Extracts a payload, or `None` when any field is missing or falsy.
    pub fn from_message(data: &Value) -> Option<Self> {
        let fields = ["documentUrl", "id", "rootNodes"];
        if let Some(missing) = fields.iter().find(|f| !truthy(data.get(**f))) {
            debug!(field = *missing, "ignoring message without payload field");
            return None;
        }
        match Self::deserialize(data) {
            Ok(payload) => Some(payload),
            Err(err) => {
                debug!(%err, "ignoring malformed payload");
                None
            }
        }
    }
}

/// Replies posted back to the opener.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostReply {
    /// Sent on load; the opener may now post its data.
    Opened,
    /// Sent once the first render completed.
    Rendered,
}

impl HostReply {
    pub fn to_json(self) -> Value {
        match self {
            HostReply::Opened => json!({ "opened": true }),
            HostReply::Rendered => json!({ "rendered": true }),
        }
    }
}

#[derive(Debug)]
struct Opener {
    id: WindowId,
    outbox: Sender<Value>,
}

/// This window's side of the channel to its opener.
#[derive(Debug, Default)]
pub struct HostLink {
    opener: Option<Opener>,
}

impl HostLink {
    /// A link for a window opened by `opener`, plus the opener's inbox.
    pub fn opened_by(opener: WindowId) -> (Self, Receiver<Value>) {
        let (outbox, inbox) = channel();
        let link = Self {
            opener: Some(Opener { id: opener, outbox }),
        };
        (link, inbox)
    }

    /// A window nobody opened. Nothing is ever posted.
    pub fn detached() -> Self {
        Self::default()
    }

    pub fn has_opener(&self) -> bool {
        self.opener.is_some()
    }

    pub fn is_from_opener(&self, source: WindowId) -> bool {
        self.opener.as_ref().is_some_and(|o| o.id == source)
    }

    /// Fire-and-forget post to the opener.
    pub fn post(&self, reply: HostReply) {
        let Some(opener) = &self.opener else { return };
        if opener.outbox.send(reply.to_json()).is_err() {
            debug!(?reply, "opener is gone, dropping reply");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> Value {
        json!({
            "documentUrl": "https://x",
            "id": "a.js",
            "rootNodes": [{"id": "a.js", "group": "js", "node": {"size": 100, "wastedBytes": 40, "children": []}}]
        })
    }

    #[test]
    fn parses_payload() {
        let payload = ViewerPayload::from_message(&payload()).unwrap();
        assert_eq!(payload.document_url, "https://x");
        assert_eq!(payload.root_nodes.len(), 1);
        assert_eq!(payload.root_nodes[0].node.size, 100.0);
    }

    #[test]
    fn falsy_fields_are_ignored() {
        for field in ["documentUrl", "id", "rootNodes"] {
            let mut data = payload();
            data.as_object_mut().unwrap().remove(field);
            assert!(ViewerPayload::from_message(&data).is_none(), "{field} missing");
        }
        let mut data = payload();
        data["id"] = json!("");
        assert!(ViewerPayload::from_message(&data).is_none());
        assert!(ViewerPayload::from_message(&json!({ "opened": true })).is_none());
        assert!(ViewerPayload::from_message(&json!(null)).is_none());
    }

    #[test]
    fn malformed_nodes_are_ignored() {
        let mut data = payload();
        data["rootNodes"] = json!([{ "id": "a.js" }]);
        assert!(ViewerPayload::from_message(&data).is_none());
    }

    #[test]
    fn replies_reach_the_opener() {
        let (link, inbox) = HostLink::opened_by(WindowId(1));
        link.post(HostReply::Opened);
        link.post(HostReply::Rendered);
        assert_eq!(inbox.try_recv().unwrap(), json!({ "opened": true }));
        assert_eq!(inbox.try_recv().unwrap(), json!({ "rendered": true }));
        assert!(link.is_from_opener(WindowId(1)));
        assert!(!link.is_from_opener(WindowId(2)));
    }

    #[test]
    fn closed_opener_is_tolerated() {
        let (link, inbox) = HostLink::opened_by(WindowId(1));
        drop(inbox);
        link.post(HostReply::Rendered);
        assert!(!HostLink::detached().is_from_opener(WindowId(1)));
    }
}
