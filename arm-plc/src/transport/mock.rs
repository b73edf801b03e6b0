//! Mock transport for testing

use super::Transport;
use crate::error::Result;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

type Responder = Box<dyn FnMut(&str) -> Option<String> + Send>;

/// Scripted transport for unit testing
///
/// Replies are taken from the script queue first, then from the responder
/// closure if one is set. With neither, the request times out.
#[derive(Clone)]
pub struct MockTransport {
    inner: Arc<Mutex<MockTransportInner>>,
}

struct MockTransportInner {
    script: VecDeque<Option<String>>,
    responder: Option<Responder>,
    requests: Vec<String>,
}

impl MockTransport {
    /// Create a new mock transport
    pub fn new() -> Self {
        MockTransport {
            inner: Arc::new(Mutex::new(MockTransportInner {
                script: VecDeque::new(),
                responder: None,
                requests: Vec::new(),
            })),
        }
    }

    /// Queue one reply
    pub fn push_reply(&self, reply: &str) {
        self.inner.lock().script.push_back(Some(reply.to_string()));
    }

    /// Queue one timeout
    pub fn push_silence(&self) {
        self.inner.lock().script.push_back(None);
    }

    /// Answer requests with a closure once the script is exhausted
    pub fn set_responder<F>(&self, responder: F)
    where
        F: FnMut(&str) -> Option<String> + Send + 'static,
    {
        self.inner.lock().responder = Some(Box::new(responder));
    }

    /// Stop answering unscripted requests
    pub fn clear_responder(&self) {
        self.inner.lock().responder = None;
    }

    /// All requests sent so far
    pub fn requests(&self) -> Vec<String> {
        self.inner.lock().requests.clone()
    }

    /// Number of requests that start with `prefix`, e.g. `"POST;armAngle"`
    pub fn count(&self, prefix: &str) -> usize {
        self.inner
            .lock()
            .requests
            .iter()
            .filter(|r| r.starts_with(prefix))
            .count()
    }

    /// Clear the request log
    pub fn clear_requests(&self) {
        self.inner.lock().requests.clear();
    }
}

impl Transport for MockTransport {
    fn exchange(&mut self, request: &[u8]) -> Result<Option<Vec<u8>>> {
        let mut inner = self.inner.lock();
        let request = String::from_utf8_lossy(request).into_owned();
        inner.requests.push(request.clone());

        let reply = match inner.script.pop_front() {
            Some(scripted) => scripted,
            None => match inner.responder.as_mut() {
                Some(responder) => responder(&request),
                None => None,
            },
        };
        Ok(reply.map(String::into_bytes))
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_then_responder() {
        let mock = MockTransport::new();
        let mut transport = mock.clone();
        mock.push_reply("REP;login;{\"state\":\"ready\"}");
        mock.push_silence();
        mock.set_responder(|_| Some("REP;deny;{}".to_string()));

        let first = transport.exchange(b"GET;login;{}").unwrap();
        assert_eq!(first.as_deref(), Some(&b"REP;login;{\"state\":\"ready\"}"[..]));
        assert!(transport.exchange(b"GET;cubePos;{}").unwrap().is_none());
        assert!(transport.exchange(b"GET;cubePos;{}").unwrap().is_some());

        assert_eq!(mock.count("GET;cubePos"), 2);
        assert_eq!(mock.requests().len(), 3);
    }
}
