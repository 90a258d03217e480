//! Scripted `ListingClient` for tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use crate::ingest::client::{FetchError, ListingClient};

enum Scripted {
    Body(Value),
    Status(u16),
}

/// Answers GETs from a fixed URL table. Unscripted URLs get a 404.
#[derive(Default)]
pub struct ScriptedClient {
    responses: HashMap<String, Scripted>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ok(mut self, url: &str, body: Value) -> Self {
        self.responses.insert(url.to_string(), Scripted::Body(body));
        self
    }

    pub fn status(mut self, url: &str, status: u16) -> Self {
        self.responses.insert(url.to_string(), Scripted::Status(status));
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn was_called(&self, url: &str) -> bool {
        self.calls.lock().unwrap().iter().any(|c| c == url)
    }
}

#[async_trait]
impl ListingClient for ScriptedClient {
    async fn get_json(&self, url: &str) -> Result<Value, FetchError> {
        self.calls.lock().unwrap().push(url.to_string());
        match self.responses.get(url) {
            Some(Scripted::Body(body)) => Ok(body.clone()),
            Some(Scripted::Status(status)) => Err(FetchError::Status {
                status: *status,
                url: url.to_string(),
            }),
            None => Err(FetchError::Status {
                status: 404,
                url: url.to_string(),
            }),
        }
    }
}
