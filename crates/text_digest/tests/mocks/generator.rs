use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use text_generation::{
    Candidate, FinishReason, GenerationError, GenerationResponse, Generator, SafetyPolicy,
};

#[derive(Clone, Debug)]
pub enum Reply {
    Text(String),
    Finished(FinishReason, String),
    Blocked(String),
    Empty,
    Fail(String),
    Delayed(Duration, Box<Reply>),
}

impl Reply {
    pub fn text(text: &str) -> Self {
        Reply::Text(text.to_string())
    }

    pub fn delayed(millis: u64, reply: Reply) -> Self {
        Reply::Delayed(Duration::from_millis(millis), Box::new(reply))
    }
}

/// Scripted generator. Replies are chosen by the first rule whose needle
/// occurs in the prompt, falling back to the default reply.
#[derive(Clone, Debug)]
pub struct MockGenerator {
    pub calls: Arc<Mutex<Vec<String>>>,
    pub peak_in_flight: Arc<AtomicUsize>,
    in_flight: Arc<AtomicUsize>,
    rules: Vec<(String, Reply)>,
    default_reply: Reply,
    delay: Option<Duration>,
}

impl MockGenerator {
    pub fn new(default_text: &str) -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            peak_in_flight: Arc::new(AtomicUsize::new(0)),
            in_flight: Arc::new(AtomicUsize::new(0)),
            rules: Vec::new(),
            default_reply: Reply::text(default_text),
            delay: None,
        }
    }

    pub fn failing(msg: &str) -> Self {
        Self {
            default_reply: Reply::Fail(msg.to_string()),
            ..Self::new("")
        }
    }

    pub fn on(mut self, needle: &str, reply: Reply) -> Self {
        self.rules.push((needle.to_string(), reply));
        self
    }

    /// Delay applied to every call, on top of any per-rule delay
    pub fn with_delay(mut self, millis: u64) -> Self {
        self.delay = Some(Duration::from_millis(millis));
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn recorded_calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn reply_for(&self, prompt: &str) -> Reply {
        self.rules
            .iter()
            .find(|(needle, _)| prompt.contains(needle.as_str()))
            .map(|(_, reply)| reply.clone())
            .unwrap_or_else(|| self.default_reply.clone())
    }
}

async fn resolve(reply: Reply) -> Result<GenerationResponse, GenerationError> {
    let mut reply = reply;
    while let Reply::Delayed(delay, inner) = reply {
        tokio::time::sleep(delay).await;
        reply = *inner;
    }

    match reply {
        Reply::Text(text) => Ok(GenerationResponse::completed(text)),
        Reply::Finished(reason, text) => Ok(GenerationResponse {
            candidates: vec![Candidate {
                finish_reason: Some(reason),
                text: Some(text),
            }],
            prompt_feedback: None,
        }),
        Reply::Blocked(reason) => Ok(GenerationResponse::blocked(reason)),
        Reply::Empty => Ok(GenerationResponse::default()),
        Reply::Fail(message) => Err(GenerationError::Api {
            status: 503,
            message,
        }),
        Reply::Delayed(..) => unreachable!(),
    }
}

impl Generator for MockGenerator {
    fn model(&self) -> &str {
        "mock-gemini"
    }

    async fn generate(
        &self,
        prompt: &str,
        _safety: &SafetyPolicy,
    ) -> Result<GenerationResponse, GenerationError> {
        self.calls.lock().unwrap().push(prompt.to_string());
        let reply = self.reply_for(prompt);

        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(current, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let result = resolve(reply).await;

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}
