use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::address_book::Contact;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    En,
    Tw,
    Yo,
    Fr,
    Ar,
    Ha,
    Zu,
    Es,
    Zh,
    Hi,
    Pt,
    Ru,
    Ja,
    De,
    Ko,
    Sw,
}

impl Language {
    pub const DEFAULT: Self = Self::En;

    pub const ALL: [Self; 16] = [
        Self::En,
        Self::Tw,
        Self::Yo,
        Self::Fr,
        Self::Ar,
        Self::Ha,
        Self::Zu,
        Self::Es,
        Self::Zh,
        Self::Hi,
        Self::Pt,
        Self::Ru,
        Self::Ja,
        Self::De,
        Self::Ko,
        Self::Sw,
    ];

    /// Accepts bare codes (`fr`) as well as region-qualified tags (`fr-FR`, `pt_BR`).
    pub fn from_code(value: &str) -> Option<Self> {
        let lower = value.trim().to_lowercase();
        let primary = lower.split(['-', '_']).next().unwrap_or_default();

        Self::ALL
            .into_iter()
            .find(|language| language.as_code() == primary)
    }

    pub fn from_code_or_default(value: Option<&str>) -> Self {
        value.and_then(Self::from_code).unwrap_or(Self::DEFAULT)
    }

    pub fn as_code(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Tw => "tw",
            Self::Yo => "yo",
            Self::Fr => "fr",
            Self::Ar => "ar",
            Self::Ha => "ha",
            Self::Zu => "zu",
            Self::Es => "es",
            Self::Zh => "zh",
            Self::Hi => "hi",
            Self::Pt => "pt",
            Self::Ru => "ru",
            Self::Ja => "ja",
            Self::De => "de",
            Self::Ko => "ko",
            Self::Sw => "sw",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::En => "English",
            Self::Tw => "Twi",
            Self::Yo => "Yoruba",
            Self::Fr => "Français",
            Self::Ar => "العربية",
            Self::Ha => "Hausa",
            Self::Zu => "Zulu",
            Self::Es => "Español",
            Self::Zh => "中文",
            Self::Hi => "हिन्दी",
            Self::Pt => "Português",
            Self::Ru => "Русский",
            Self::Ja => "日本語",
            Self::De => "Deutsch",
            Self::Ko => "한국어",
            Self::Sw => "Kiswahili",
        }
    }

    pub fn region(self) -> &'static str {
        match self {
            Self::En => "Global",
            Self::Tw => "Ghana",
            Self::Yo => "Nigeria",
            Self::Fr => "West Africa",
            Self::Ar => "North Africa",
            Self::Ha => "Nigeria/Niger",
            Self::Zu => "South Africa",
            Self::Es => "500M+ Speakers",
            Self::Zh => "1B+ Speakers",
            Self::Hi => "600M+ Speakers",
            Self::Pt => "Brazil Market",
            Self::Ru => "250M+ Speakers",
            Self::Ja => "Tech Market",
            Self::De => "EU Market",
            Self::Ko => "Crypto Heavy",
            Self::Sw => "East Africa",
        }
    }

    /// Locale tag handed to a speech recognizer. Languages without a
    /// recognizer model listen in US English.
    pub fn speech_locale(self) -> &'static str {
        match self {
            Self::En => "en-US",
            Self::Es => "es-ES",
            Self::Fr => "fr-FR",
            Self::De => "de-DE",
            Self::Pt => "pt-PT",
            Self::Ru => "ru-RU",
            Self::Ja => "ja-JP",
            Self::Ko => "ko-KR",
            Self::Zh => "zh-CN",
            Self::Hi => "hi-IN",
            Self::Ar => "ar-SA",
            Self::Sw => "sw-KE",
            Self::Tw | Self::Yo | Self::Ha | Self::Zu => "en-US",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseCategory {
    Greeting,
    Buy,
    Send,
    Swap,
    Stake,
    Knowledge,
    Recommendation,
    Navigation,
    AddressBook,
    MarketAnalysis,
    PersonalAdvice,
    Default,
}

impl ResponseCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Greeting => "greeting",
            Self::Buy => "buy",
            Self::Send => "send",
            Self::Swap => "swap",
            Self::Stake => "stake",
            Self::Knowledge => "knowledge",
            Self::Recommendation => "recommendation",
            Self::Navigation => "navigation",
            Self::AddressBook => "address_book",
            Self::MarketAnalysis => "market_analysis",
            Self::PersonalAdvice => "personal_advice",
            Self::Default => "default",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Buy,
    Send,
    Swap,
    Stake,
}

impl TransactionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Buy => "buy",
            Self::Send => "send",
            Self::Swap => "swap",
            Self::Stake => "stake",
        }
    }

    pub fn page(self) -> Page {
        match self {
            Self::Buy => Page::Buy,
            Self::Send => Page::Send,
            Self::Swap => Page::Swap,
            Self::Stake => Page::Stake,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Page {
    Portfolio,
    Buy,
    Send,
    Swap,
    Stake,
    Defi,
}

impl Page {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Portfolio => "portfolio",
            Self::Buy => "buy",
            Self::Send => "send",
            Self::Swap => "swap",
            Self::Stake => "stake",
            Self::Defi => "defi",
        }
    }
}

/// Side effect the caller should perform after a reply is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "target", rename_all = "snake_case")]
pub enum Directive {
    NavigateTo(Page),
    OpenAddressBook,
    ExecuteTransaction(TransactionKind),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub text: String,
    pub sender: Sender,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn new(sender: Sender, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            text: text.into(),
            sender,
            timestamp: Utc::now(),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Sender::User, text)
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(Sender::Assistant, text)
    }
}

/// Conversation log for one session. Messages can only be appended; the
/// ancillary fields are carried for callers but not consulted by the
/// responder.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversationContext {
    messages: Vec<Message>,
    pub portfolio: Vec<Value>,
    pub recent_transactions: Vec<Value>,
    pub preferences: Value,
    pub address_book: Vec<Contact>,
}

impl ConversationContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn last_from(&self, sender: Sender) -> Option<&Message> {
        self.messages
            .iter()
            .rev()
            .find(|message| message.sender == sender)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_region_qualified_codes() {
        assert_eq!(Language::from_code("fr-FR"), Some(Language::Fr));
        assert_eq!(Language::from_code(" PT_br "), Some(Language::Pt));
        assert_eq!(Language::from_code("xx"), None);
        assert_eq!(Language::from_code_or_default(Some("xx")), Language::En);
    }

    #[test]
    fn unmapped_languages_listen_in_english() {
        assert_eq!(Language::Tw.speech_locale(), "en-US");
        assert_eq!(Language::Sw.speech_locale(), "sw-KE");
    }

    #[test]
    fn conversation_keeps_send_order() {
        let mut context = ConversationContext::new();
        for index in 0..5 {
            context.push(Message::user(format!("message {index}")));
        }

        let texts = context
            .messages()
            .iter()
            .map(|message| message.text.as_str())
            .collect::<Vec<_>>();
        assert_eq!(
            texts,
            ["message 0", "message 1", "message 2", "message 3", "message 4"]
        );
    }

    #[test]
    fn directive_serializes_with_target() {
        let value = serde_json::to_value(Directive::NavigateTo(Page::Portfolio)).unwrap();
        assert_eq!(value["type"], "navigate_to");
        assert_eq!(value["target"], "portfolio");
    }
}
