pub mod address_book;
pub mod intent;
pub mod market;
pub mod models;
pub mod responder;
pub mod templates;
pub mod wallet;

pub use address_book::{default_voice_handle, AddressBook, AddressBookError, Contact, NewContact};
pub use intent::{classify_intent, normalize_text, IntentMatch, ReplySource, Rule, RULES};
pub use market::{
    BuyQuote, MarketCatalog, MarketError, PaymentMethod, PortfolioSummary, StakingProduct,
    SwapQuote, Token,
};
pub use models::*;
pub use responder::{AssistantReply, FixedPicker, IntentResponder, SeededPicker, TemplatePicker};
pub use templates::{render_template, sample_commands, welcome_message, TemplateCatalog};
pub use wallet::{TransactionReceipt, Wallet};
