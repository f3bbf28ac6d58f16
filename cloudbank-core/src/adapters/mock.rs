//! Scripted collaborators for unit tests
//!
//! `ScriptedGateway` answers each endpoint from a queue of canned replies and
//! records every request, so tests can assert which calls were (or were not)
//! made. `MemoryStackStore` keeps stack files in a map.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::result::{Error, Result};
use crate::ports::{HttpGateway, RawResponse, StackStore};

/// A request the gateway saw
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub method: &'static str,
    pub url: String,
    pub fields: Vec<(String, String)>,
}

impl RecordedCall {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

enum Scripted {
    Reply(RawResponse),
    TransportFailure(String),
}

/// Gateway that replays canned replies keyed by endpoint name
#[derive(Default)]
pub struct ScriptedGateway {
    script: Mutex<Vec<(String, Scripted)>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a reply for the next request whose URL contains `endpoint`
    pub fn reply(self, endpoint: &str, response: RawResponse) -> Self {
        self.script
            .lock()
            .unwrap()
            .push((endpoint.to_string(), Scripted::Reply(response)));
        self
    }

    /// Queue a 200 reply with a JSON body
    pub fn reply_json(self, endpoint: &str, body: serde_json::Value) -> Self {
        self.reply(endpoint, RawResponse::ok(body.to_string()))
    }

    /// Queue a transport failure
    pub fn fail(self, endpoint: &str, message: &str) -> Self {
        self.script
            .lock()
            .unwrap()
            .push((endpoint.to_string(), Scripted::TransportFailure(message.to_string())));
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of requests made to `endpoint`
    pub fn calls_to(&self, endpoint: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.url.contains(endpoint))
            .count()
    }

    fn answer(&self, method: &'static str, url: &str, fields: &[(&str, &str)]) -> Result<RawResponse> {
        self.calls.lock().unwrap().push(RecordedCall {
            method,
            url: url.to_string(),
            fields: fields
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        });

        let mut script = self.script.lock().unwrap();
        let position = script.iter().position(|(endpoint, _)| url.contains(endpoint.as_str()));
        match position.map(|idx| script.remove(idx).1) {
            Some(Scripted::Reply(response)) => Ok(response),
            Some(Scripted::TransportFailure(message)) => Err(Error::transport(message)),
            None => Err(Error::transport(format!("no scripted reply for {}", url))),
        }
    }
}

#[async_trait]
impl HttpGateway for ScriptedGateway {
    async fn post_form(&self, url: &str, fields: &[(&str, &str)]) -> Result<RawResponse> {
        self.answer("POST", url, fields)
    }

    async fn get(&self, url: &str) -> Result<RawResponse> {
        self.answer("GET", url, &[])
    }
}

/// In-memory stack store
#[derive(Default)]
pub struct MemoryStackStore {
    files: Mutex<HashMap<PathBuf, Vec<u8>>>,
}

impl MemoryStackStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(self, path: impl Into<PathBuf>, contents: &str) -> Self {
        self.files
            .lock()
            .unwrap()
            .insert(path.into(), contents.as_bytes().to_vec());
        self
    }

    pub fn contents(&self, path: &Path) -> Option<String> {
        self.files
            .lock()
            .unwrap()
            .get(path)
            .map(|b| String::from_utf8_lossy(b).into_owned())
    }
}

impl StackStore for MemoryStackStore {
    fn read(&self, path: &Path) -> Result<Vec<u8>> {
        self.files
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| Error::precondition(format!("No stack file at {}", path.display())))
    }

    fn write(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        self.files
            .lock()
            .unwrap()
            .insert(path.to_path_buf(), bytes.to_vec());
        Ok(())
    }
}
