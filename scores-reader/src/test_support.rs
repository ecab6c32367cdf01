use std::{
    collections::VecDeque,
    future::Future,
    sync::{Arc, Mutex},
    time::Duration,
};
use tokio::time::Instant;
use ultiscores_common::ultiscores::{FormFields, Transport, TransportError};

/// Replays scripted responses in order, then answers every further request
/// with a 503
#[derive(Clone, Default)]
pub struct ScriptedTransport {
    responses: Arc<Mutex<VecDeque<Result<String, u16>>>>,
    requests: Arc<Mutex<Vec<FormFields>>>,
}

impl ScriptedTransport {
    pub fn new<'a>(responses: impl IntoIterator<Item = Result<&'a str, u16>>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(
                responses
                    .into_iter()
                    .map(|r| r.map(str::to_string))
                    .collect(),
            )),
            ..Default::default()
        }
    }

    pub fn requests(&self) -> Vec<FormFields> {
        self.requests.lock().unwrap().clone()
    }
}

impl Transport for ScriptedTransport {
    fn post(
        &self,
        form: FormFields,
    ) -> impl Future<Output = Result<String, TransportError>> + Send {
        self.requests.lock().unwrap().push(form);
        let next = self.responses.lock().unwrap().pop_front().unwrap_or(Err(503));
        async move {
            next.map_err(|status| TransportError::Status {
                status,
                reason: "Service Unavailable".to_string(),
            })
        }
    }
}

/// Answers the first request with `first`, then never answers again. Records
/// how long after `start` each unanswered request was dropped.
#[derive(Clone)]
pub struct HangingTransport {
    first: Arc<Mutex<Option<String>>>,
    calls: Arc<Mutex<usize>>,
    dropped_at: Arc<Mutex<Vec<Duration>>>,
    start: Instant,
}

impl HangingTransport {
    pub fn new(first: String) -> Self {
        Self {
            first: Arc::new(Mutex::new(Some(first))),
            calls: Default::default(),
            dropped_at: Default::default(),
            start: Instant::now(),
        }
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }

    pub fn dropped_at(&self) -> Vec<Duration> {
        self.dropped_at.lock().unwrap().clone()
    }
}

struct DropRecorder {
    start: Instant,
    dropped_at: Arc<Mutex<Vec<Duration>>>,
}

impl Drop for DropRecorder {
    fn drop(&mut self) {
        self.dropped_at.lock().unwrap().push(self.start.elapsed());
    }
}

impl Transport for HangingTransport {
    fn post(
        &self,
        _form: FormFields,
    ) -> impl Future<Output = Result<String, TransportError>> + Send {
        *self.calls.lock().unwrap() += 1;
        let first = self.first.lock().unwrap().take();
        let recorder = first.is_none().then(|| DropRecorder {
            start: self.start,
            dropped_at: self.dropped_at.clone(),
        });
        async move {
            let _recorder = recorder;
            match first {
                Some(body) => Ok(body),
                None => std::future::pending().await,
            }
        }
    }
}
