use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use parking_lot::{Mutex, RwLock};
use serde_json::json;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;
use voicechain_core::{
    normalize_text, sample_commands, welcome_message, AddressBook, AddressBookError,
    AssistantReply, Contact, ConversationContext, Directive, IntentResponder, Language, Message,
    Page, ResponseCategory, SeededPicker, TemplateCatalog, TemplatePicker,
};
use voicechain_observability::AppMetrics;

use crate::delay::ProcessingDelay;
use crate::sink::DirectiveSink;

pub const DEFAULT_ASSISTANT_NAME: &str = "Nova";

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("\"{0}\" is already being processed")]
    DuplicateSubmission(String),
    #[error("session is closed")]
    Closed,
    #[error(transparent)]
    AddressBook(#[from] AddressBookError),
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub assistant_name: String,
    pub language: Language,
    pub delay: ProcessingDelay,
    /// Seeds template and sample-command choice; `None` draws from the OS.
    pub seed: Option<u64>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            assistant_name: DEFAULT_ASSISTANT_NAME.to_string(),
            language: Language::DEFAULT,
            delay: ProcessingDelay::chat(),
            seed: None,
        }
    }
}

/// One open chat/voice interaction. Owns the conversation log, the responder
/// and the session's address book; directives go to the sink.
pub struct AssistantSession<S> {
    id: String,
    delay: ProcessingDelay,
    language: RwLock<Language>,
    context: Mutex<ConversationContext>,
    responder: Mutex<IntentResponder<SeededPicker>>,
    voice_picker: Mutex<SeededPicker>,
    address_book: Mutex<AddressBook>,
    in_flight: Mutex<HashSet<String>>,
    closed: AtomicBool,
    sink: Arc<S>,
    metrics: Arc<AppMetrics>,
}

impl<S> AssistantSession<S>
where
    S: DirectiveSink,
{
    pub fn new(config: SessionConfig, sink: Arc<S>, metrics: Arc<AppMetrics>) -> Self {
        let picker = |offset: u64| {
            config
                .seed
                .map(|seed| SeededPicker::new(seed.wrapping_add(offset)))
                .unwrap_or_else(SeededPicker::from_os_rng)
        };

        Self {
            id: Uuid::new_v4().to_string(),
            delay: config.delay,
            language: RwLock::new(config.language),
            context: Mutex::new(ConversationContext::new()),
            responder: Mutex::new(IntentResponder::new(
                TemplateCatalog::builtin(),
                config.assistant_name.clone(),
                picker(0),
            )),
            voice_picker: Mutex::new(picker(1)),
            address_book: Mutex::new(AddressBook::with_demo_contacts()),
            in_flight: Mutex::new(HashSet::new()),
            closed: AtomicBool::new(false),
            sink,
            metrics,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn language(&self) -> Language {
        *self.language.read()
    }

    pub fn set_language(&self, language: Language) {
        *self.language.write() = language;
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn is_busy(&self) -> bool {
        !self.in_flight.lock().is_empty()
    }

    pub fn metrics(&self) -> &AppMetrics {
        &self.metrics
    }

    /// Posts the welcome message when the log is still empty.
    pub fn open(&self) -> Option<Message> {
        let mut context = self.context.lock();
        if !context.is_empty() {
            return None;
        }

        let name = self.responder.lock().assistant_name().to_string();
        let welcome = Message::assistant(welcome_message(&name));
        context.push(welcome.clone());
        info!(session_id = %self.id, "session opened");
        Some(welcome)
    }

    pub fn transcript(&self) -> Vec<Message> {
        self.context.lock().messages().to_vec()
    }

    /// Records the user message, waits out the processing delay and posts the
    /// reply. Blank input is ignored; an identical input still in flight is
    /// rejected.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub async fn submit(&self, text: &str) -> Result<Option<AssistantReply>, SessionError> {
        if self.is_closed() {
            return Err(SessionError::Closed);
        }

        let text = normalize_text(text);
        if text.is_empty() {
            return Ok(None);
        }

        let Some(_claim) = InFlightClaim::acquire(&self.in_flight, &text) else {
            self.metrics.inc_rejected();
            warn!(input = %text, "duplicate submission rejected");
            return Err(SessionError::DuplicateSubmission(text));
        };

        Ok(self.process(&text).await)
    }

    /// Picks a sample phrase for the active language, as if it had been
    /// heard, and submits it. Returns the phrase with the reply.
    pub async fn simulate_voice_command(
        &self,
    ) -> Result<(String, Option<AssistantReply>), SessionError> {
        let commands = sample_commands(self.language());
        let heard = {
            let mut picker = self.voice_picker.lock();
            commands[picker.pick(commands.len())].to_string()
        };
        debug!(heard = %heard, "simulated voice capture");

        let reply = self.submit(&heard).await?;
        Ok((heard, reply))
    }

    /// Closes the picker and routes to the send flow for the chosen contact.
    pub fn choose_contact(&self, contact_id: &str) -> Result<Contact, SessionError> {
        let contact = self
            .address_book
            .lock()
            .get(contact_id)
            .cloned()
            .ok_or_else(|| AddressBookError::UnknownContact(contact_id.to_string()))?;

        self.sink.set_address_book_open(false);
        self.sink.navigate(Page::Send);
        info!(session_id = %self.id, contact = %contact.voice_handle, "contact chosen");
        Ok(contact)
    }

    pub fn with_address_book<R>(&self, f: impl FnOnce(&mut AddressBook) -> R) -> R {
        f(&mut self.address_book.lock())
    }

    /// Discards the conversation. Later submissions fail with `Closed`.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        *self.context.lock() = ConversationContext::new();
        info!(session_id = %self.id, "session closed");
    }

    async fn process(&self, text: &str) -> Option<AssistantReply> {
        let started = Instant::now();
        let language = self.language();

        self.context.lock().push(Message::user(text));
        tokio::time::sleep(self.delay.sample()).await;

        let snapshot = self.context.lock().clone();
        let reply = self.responder.lock().respond(text, language, &snapshot)?;
        debug!(rule = reply.rule, category = reply.category.as_str(), "rule matched");

        if self.is_closed() {
            info!(session_id = %self.id, "reply produced after close; not posted");
            return Some(reply);
        }

        self.context.lock().push(Message::assistant(reply.text.clone()));
        if let Some(directive) = reply.directive {
            self.dispatch(directive, text);
        }

        self.metrics.record_message(reply.category.as_str());
        if reply.category == ResponseCategory::Default {
            self.metrics.inc_fallback();
        }
        self.metrics.observe_latency(started.elapsed());
        info!(
            session_id = %self.id,
            language = language.as_code(),
            category = reply.category.as_str(),
            directive = ?reply.directive,
            "message handled"
        );

        Some(reply)
    }

    fn dispatch(&self, directive: Directive, text: &str) {
        self.metrics.inc_directive();
        match directive {
            Directive::NavigateTo(page) => self.sink.navigate(page),
            Directive::OpenAddressBook => self.sink.set_address_book_open(true),
            Directive::ExecuteTransaction(kind) => self
                .sink
                .trigger_transaction(kind, json!({ "message": text })),
        }
    }
}

/// Marks an input as in flight until dropped, so a cancelled submission
/// releases its key.
struct InFlightClaim<'a> {
    in_flight: &'a Mutex<HashSet<String>>,
    text: String,
}

impl<'a> InFlightClaim<'a> {
    fn acquire(in_flight: &'a Mutex<HashSet<String>>, text: &str) -> Option<Self> {
        in_flight.lock().insert(text.to_string()).then(|| Self {
            in_flight,
            text: text.to_string(),
        })
    }
}

impl Drop for InFlightClaim<'_> {
    fn drop(&mut self) {
        self.in_flight.lock().remove(&self.text);
    }
}
