//! In-memory transport that replays canned responses and records every call.

use super::transport::{Body, Method, Response, Transport, TransportError};
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Mutex;

#[derive(Clone, Debug, PartialEq)]
pub struct RecordedCall {
    pub endpoint: String,
    pub method: Method,
    pub body: Option<Body>,
}

enum Scripted {
    Reply(Response),
    NotJson(u16),
}

#[derive(Default)]
pub struct ScriptedTransport {
    script: Mutex<VecDeque<Scripted>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(&self, status: u16, payload: Value) {
        self.script
            .lock()
            .unwrap()
            .push_back(Scripted::Reply(Response::new(status, payload)));
    }

    /// Next call fails the way an HTML error page would.
    pub fn fail(&self) {
        self.script
            .lock()
            .unwrap()
            .push_back(Scripted::NotJson(502));
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl Transport for ScriptedTransport {
    fn call(
        &self,
        endpoint: &str,
        method: Method,
        body: Option<Body>,
    ) -> Result<Response, TransportError> {
        self.calls.lock().unwrap().push(RecordedCall {
            endpoint: endpoint.to_string(),
            method,
            body,
        });

        match self.script.lock().unwrap().pop_front() {
            Some(Scripted::Reply(response)) => Ok(response),
            Some(Scripted::NotJson(status)) => {
                let source = serde_json::from_str::<Value>("<html>").unwrap_err();
                Err(TransportError::InvalidBody { status, source })
            }
            None => panic!("unexpected call to {endpoint}: script exhausted"),
        }
    }
}
