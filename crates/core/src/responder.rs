use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use crate::intent::{classify_intent, ReplySource};
use crate::models::{ConversationContext, Directive, Language, ResponseCategory, Sender};
use crate::templates::{render_template, TemplateCatalog};

pub const EMPTY_TABLE_REPLY: &str = "I'm here to help. What would you like to do?";

/// Source of the uniform template choice.
pub trait TemplatePicker {
    /// Returns an index in `0..len`. Never called with `len == 0`.
    fn pick(&mut self, len: usize) -> usize;
}

#[derive(Debug, Clone)]
pub struct SeededPicker {
    rng: StdRng,
}

impl SeededPicker {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_os_rng() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }
}

impl TemplatePicker for SeededPicker {
    fn pick(&mut self, len: usize) -> usize {
        self.rng.random_range(0..len)
    }
}

/// Always picks the same slot, clamped to the table length.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedPicker(pub usize);

impl TemplatePicker for FixedPicker {
    fn pick(&mut self, len: usize) -> usize {
        self.0.min(len - 1)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssistantReply {
    pub text: String,
    pub category: ResponseCategory,
    pub directive: Option<Directive>,
    pub rule: &'static str,
    pub language: Language,
    /// Id of the latest user message in the context, when there is one.
    pub in_reply_to: Option<String>,
}

#[derive(Debug, Clone)]
pub struct IntentResponder<P> {
    catalog: TemplateCatalog,
    assistant_name: String,
    picker: P,
}

impl<P: TemplatePicker> IntentResponder<P> {
    pub fn new(catalog: TemplateCatalog, assistant_name: impl Into<String>, picker: P) -> Self {
        Self {
            catalog,
            assistant_name: assistant_name.into(),
            picker,
        }
    }

    pub fn assistant_name(&self) -> &str {
        &self.assistant_name
    }

    pub fn catalog(&self) -> &TemplateCatalog {
        &self.catalog
    }

    /// Returns `None` for blank input. Never mutates the context.
    pub fn respond(
        &mut self,
        text: &str,
        language: Language,
        context: &ConversationContext,
    ) -> Option<AssistantReply> {
        if text.trim().is_empty() {
            return None;
        }

        let matched = classify_intent(text);
        let reply_text = match matched.reply {
            ReplySource::Fixed(text) => text.to_string(),
            ReplySource::Template(category) => self.pick_template(language, category),
        };

        Some(AssistantReply {
            text: reply_text,
            category: matched.category,
            directive: matched.directive,
            rule: matched.rule,
            language,
            in_reply_to: context.last_from(Sender::User).map(|message| message.id.clone()),
        })
    }

    fn pick_template(&mut self, language: Language, category: ResponseCategory) -> String {
        let templates = self.catalog.templates(language, category);
        if templates.is_empty() {
            return EMPTY_TABLE_REPLY.to_string();
        }

        let index = self.picker.pick(templates.len()).min(templates.len() - 1);
        render_template(&templates[index], &self.assistant_name, language)
    }
}
