//! HTTP narrator for the runner.
//!
//! Model-agnostic: speaks both the Anthropic messages format and the
//! OpenAI-compatible chat format, picked from the API URL. Requests run on
//! a single worker thread with a blocking client, so `request()` returns a
//! ticket at once and the engine polls for the reply like any other
//! narrator. Cancelling a ticket that is still queued stops the worker
//! from ever sending it.

use anyhow::{anyhow, Context, Result};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;
use thermos_core::narrator::{NarrationError, NarrationRequest, NarrationTicket, Narrator};

const DEFAULT_API_URL: &str = "https://api.anthropic.com/v1/messages";
const DEFAULT_MODEL: &str = "claude-3-haiku-20240307";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(6);

#[derive(Debug, Clone, PartialEq)]
pub enum ApiFormat {
    Anthropic,
    OpenAI,
}

impl ApiFormat {
    fn detect(url: &str) -> Self {
        if url.contains("anthropic.com") {
            Self::Anthropic
        } else {
            Self::OpenAI
        }
    }
}

/// Connection settings, read from the environment.
#[derive(Debug, Clone)]
pub struct HttpSettings {
    pub api_key: String,
    pub api_url: String,
    pub model:   String,
}

impl HttpSettings {
    /// Required: LLM_API_KEY
    /// Optional: LLM_API_URL, LLM_MODEL
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("LLM_API_KEY").context("LLM_API_KEY not set")?;
        let api_url = std::env::var("LLM_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.into());
        let model = std::env::var("LLM_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.into());
        Ok(Self { api_key, api_url, model })
    }
}

struct Job {
    ticket:  NarrationTicket,
    request: NarrationRequest,
}

type Reply = Result<String, NarrationError>;
type CancelSet = Arc<Mutex<HashSet<NarrationTicket>>>;

pub struct HttpNarrator {
    jobs:      Sender<Job>,
    replies:   Receiver<(NarrationTicket, Reply)>,
    ready:     HashMap<NarrationTicket, Reply>,
    cancelled: CancelSet,
    next:      u64,
}

impl HttpNarrator {
    pub fn spawn(settings: HttpSettings) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("building HTTP client")?;
        let (jobs, job_rx) = mpsc::channel::<Job>();
        let (reply_tx, replies) = mpsc::channel();
        let cancelled = CancelSet::default();
        let worker_cancelled = Arc::clone(&cancelled);

        thread::Builder::new()
            .name("narrator".into())
            .spawn(move || worker(client, settings, job_rx, reply_tx, worker_cancelled))
            .context("spawning narrator worker")?;

        Ok(Self {
            jobs,
            replies,
            ready: HashMap::new(),
            cancelled,
            next: 0,
        })
    }

    pub fn from_env() -> Result<Self> {
        Self::spawn(HttpSettings::from_env()?)
    }

    fn drain_replies(&mut self) {
        while let Ok((ticket, reply)) = self.replies.try_recv() {
            let dropped = self.cancelled.lock().map(|mut set| set.remove(&ticket)).unwrap_or(false);
            if !dropped {
                self.ready.insert(ticket, reply);
            }
        }
    }
}

impl Narrator for HttpNarrator {
    fn request(&mut self, request: NarrationRequest) -> NarrationTicket {
        let ticket = NarrationTicket(self.next);
        self.next += 1;
        if self.jobs.send(Job { ticket, request }).is_err() {
            self.ready
                .insert(ticket, Err(NarrationError::Unavailable("narrator worker stopped".into())));
        }
        ticket
    }

    fn poll(&mut self, ticket: NarrationTicket) -> Option<Reply> {
        self.drain_replies();
        self.ready.remove(&ticket)
    }

    fn cancel(&mut self, ticket: NarrationTicket) {
        if self.ready.remove(&ticket).is_some() {
            return;
        }
        match self.cancelled.lock() {
            Ok(mut set) => {
                set.insert(ticket);
            }
            Err(_) => log::warn!("narration cancel set poisoned; {ticket:?} will still be sent"),
        }
    }
}

/// Next queued job whose ticket has not been cancelled. Cancelled jobs
/// are consumed along with their cancel mark.
fn next_live_job(
    jobs:      &Receiver<Job>,
    cancelled: &Mutex<HashSet<NarrationTicket>>,
) -> Option<Job> {
    for job in jobs.iter() {
        let skip = cancelled.lock().map(|mut set| set.remove(&job.ticket)).unwrap_or(false);
        if skip {
            log::debug!("narration {:?} cancelled before sending", job.ticket);
            continue;
        }
        return Some(job);
    }
    None
}

fn worker(
    client:    Client,
    settings:  HttpSettings,
    jobs:      Receiver<Job>,
    replies:   Sender<(NarrationTicket, Reply)>,
    cancelled: CancelSet,
) {
    let format = ApiFormat::detect(&settings.api_url);
    while let Some(job) = next_live_job(&jobs, &cancelled) {
        let (prompt, temperature) = prompt_for(&job.request);
        let reply = complete(&client, &settings, &format, &prompt, temperature)
            .map_err(|e| NarrationError::Unavailable(format!("{e:#}")));
        if let Err(e) = &reply {
            log::debug!("narration {:?} failed: {e}", job.ticket);
        }
        if replies.send((job.ticket, reply)).is_err() {
            break;
        }
    }
    log::debug!("narrator worker exiting");
}

fn prompt_for(request: &NarrationRequest) -> (String, Option<f32>) {
    match request {
        NarrationRequest::Describe { subject } => (
            format!(
                "You are the 'CORP' AI system. Analyze this frozen object found at absolute \
                 zero: \"{subject}\". Describe it in a cold, clinical, yet horrifying way. \
                 Keep it under 50 words. Focus on how it shouldn't exist in the ice."
            ),
            Some(0.9),
        ),
        NarrationRequest::Instruction { target_id } => (
            format!(
                "Generate a cryptic, authoritative corporate instruction for a pilot stuck in \
                 a 1km deep ice moon. Target ID: {target_id}. Mention things like 'Heat \
                 signature stability', 'Layer integrity', or 'The Archive requires \
                 observation'. Maximum 2 sentences."
            ),
            None,
        ),
    }
}

fn complete(
    client:      &Client,
    settings:    &HttpSettings,
    format:      &ApiFormat,
    prompt:      &str,
    temperature: Option<f32>,
) -> Result<String> {
    let messages = vec![Message { role: "user".into(), content: prompt.into() }];
    let builder = client.post(&settings.api_url).header("content-type", "application/json");

    let response = match format {
        ApiFormat::Anthropic => builder
            .header("x-api-key", &settings.api_key)
            .header("anthropic-version", "2023-06-01")
            .json(&ChatRequest { model: settings.model.clone(), max_tokens: 256, temperature, messages })
            .send()?,
        ApiFormat::OpenAI => builder
            .header("Authorization", format!("Bearer {}", settings.api_key))
            .json(&ChatRequest { model: settings.model.clone(), max_tokens: 256, temperature, messages })
            .send()?,
    };

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().unwrap_or_default();
        return Err(anyhow!("API error {status}: {body}"));
    }

    let text = match format {
        ApiFormat::Anthropic => {
            let body: AnthropicResponse = response.json()?;
            body.content.into_iter().next().map(|c| c.text)
        }
        ApiFormat::OpenAI => {
            let body: OpenAIResponse = response.json()?;
            body.choices.into_iter().next().map(|c| c.message.content)
        }
    };
    text.ok_or_else(|| anyhow!("empty response"))
}

// Both APIs accept the same request shape for a single user turn.
#[derive(Serialize)]
struct ChatRequest {
    model:       String,
    max_tokens:  u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    messages:    Vec<Message>,
}

#[derive(Serialize)]
struct Message {
    role:    String,
    content: String,
}

#[derive(Deserialize)]
struct AnthropicResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    text: String,
}

#[derive(Deserialize)]
struct OpenAIResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: String,
}
