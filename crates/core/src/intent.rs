use crate::models::{Directive, Page, ResponseCategory, TransactionKind};

pub const GREETING_WORDS: &[&str] = &["hello", "hi", "hey", "hola", "salut", "bonjour"];

pub const EXECUTE_NOW_WORDS: &[&str] = &["execute", "do it", "now"];

pub const ADDRESS_BOOK_WORDS: &[&str] = &["address book", "contacts", "send to"];

pub const NAVIGATION_VERBS: &[&str] = &["go to", "open", "navigate", "show me"];

/// Checked in order; the first verb found wins.
pub const TRANSACTION_VERBS: &[(&str, TransactionKind)] = &[
    ("buy", TransactionKind::Buy),
    ("send", TransactionKind::Send),
    ("swap", TransactionKind::Swap),
    ("stake", TransactionKind::Stake),
];

pub const NAVIGATION_DESTINATIONS: &[(&[&str], Page)] = &[
    (&["portfolio"], Page::Portfolio),
    (&["buy"], Page::Buy),
    (&["swap"], Page::Swap),
    (&["stake", "staking"], Page::Stake),
    (&["defi"], Page::Defi),
];

/// Topic keyword sets in priority order. "advice" appears under both
/// recommendation and personal advice; recommendation wins.
pub const TOPICS: &[(&[&str], ResponseCategory)] = &[
    (&["buy", "purchase"], ResponseCategory::Buy),
    (&["send", "transfer"], ResponseCategory::Send),
    (&["swap", "exchange"], ResponseCategory::Swap),
    (&["stake", "staking"], ResponseCategory::Stake),
    (
        &["what is", "explain", "how does", "tell me about"],
        ResponseCategory::Knowledge,
    ),
    (
        &["recommend", "advice", "suggest"],
        ResponseCategory::Recommendation,
    ),
    (
        &["market", "price", "analysis"],
        ResponseCategory::MarketAnalysis,
    ),
    (
        &["personal", "help me", "advice"],
        ResponseCategory::PersonalAdvice,
    ),
];

pub const ADDRESS_BOOK_REPLY: &str = "Opening your address book! You can select a contact to send money to, or add new contacts for easy transfers.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplySource {
    /// Pick one template from the category's topic table.
    Template(ResponseCategory),
    /// Fixed acknowledgement text.
    Fixed(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntentMatch {
    pub rule: &'static str,
    pub category: ResponseCategory,
    pub directive: Option<Directive>,
    pub reply: ReplySource,
}

impl IntentMatch {
    fn template(rule: &'static str, category: ResponseCategory) -> Self {
        Self {
            rule,
            category,
            directive: None,
            reply: ReplySource::Template(category),
        }
    }

    fn fallback() -> Self {
        Self::template("default", ResponseCategory::Default)
    }
}

/// One entry of the ordered rule list. Matchers receive lower-cased text.
#[derive(Clone, Copy)]
pub struct Rule {
    pub name: &'static str,
    pub matcher: fn(&str) -> Option<IntentMatch>,
}

pub const RULES: &[Rule] = &[
    Rule {
        name: "greeting",
        matcher: match_greeting,
    },
    Rule {
        name: "execute_now",
        matcher: match_execute_now,
    },
    Rule {
        name: "address_book",
        matcher: match_address_book,
    },
    Rule {
        name: "navigation",
        matcher: match_navigation,
    },
    Rule {
        name: "topic",
        matcher: match_topic,
    },
];

pub fn normalize_text(input: &str) -> String {
    input
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string()
}

/// First matching rule wins; unmatched text resolves to the default category.
pub fn classify_intent(text: &str) -> IntentMatch {
    let lower = text.to_lowercase();

    RULES
        .iter()
        .find_map(|rule| (rule.matcher)(&lower))
        .unwrap_or_else(IntentMatch::fallback)
}

fn match_greeting(lower: &str) -> Option<IntentMatch> {
    contains_any(lower, GREETING_WORDS)
        .then(|| IntentMatch::template("greeting", ResponseCategory::Greeting))
}

fn match_execute_now(lower: &str) -> Option<IntentMatch> {
    if !contains_any(lower, EXECUTE_NOW_WORDS) {
        return None;
    }

    let kind = TRANSACTION_VERBS
        .iter()
        .find(|(verb, _)| lower.contains(verb))
        .map(|(_, kind)| *kind)?;

    Some(IntentMatch {
        rule: "execute_now",
        category: category_for(kind),
        directive: Some(Directive::ExecuteTransaction(kind)),
        reply: ReplySource::Fixed(execute_acknowledgement(kind)),
    })
}

fn match_address_book(lower: &str) -> Option<IntentMatch> {
    contains_any(lower, ADDRESS_BOOK_WORDS).then_some(IntentMatch {
        rule: "address_book",
        category: ResponseCategory::AddressBook,
        directive: Some(Directive::OpenAddressBook),
        reply: ReplySource::Fixed(ADDRESS_BOOK_REPLY),
    })
}

fn match_navigation(lower: &str) -> Option<IntentMatch> {
    if !contains_any(lower, NAVIGATION_VERBS) {
        return None;
    }

    let page = NAVIGATION_DESTINATIONS
        .iter()
        .find(|(keywords, _)| contains_any(lower, keywords))
        .map(|(_, page)| *page)?;

    Some(IntentMatch {
        rule: "navigation",
        category: ResponseCategory::Navigation,
        directive: Some(Directive::NavigateTo(page)),
        reply: ReplySource::Fixed(navigation_confirmation(page)),
    })
}

fn match_topic(lower: &str) -> Option<IntentMatch> {
    TOPICS
        .iter()
        .find(|(keywords, _)| contains_any(lower, keywords))
        .map(|(_, category)| IntentMatch::template("topic", *category))
}

fn category_for(kind: TransactionKind) -> ResponseCategory {
    match kind {
        TransactionKind::Buy => ResponseCategory::Buy,
        TransactionKind::Send => ResponseCategory::Send,
        TransactionKind::Swap => ResponseCategory::Swap,
        TransactionKind::Stake => ResponseCategory::Stake,
    }
}

pub fn execute_acknowledgement(kind: TransactionKind) -> &'static str {
    match kind {
        TransactionKind::Buy => {
            "Executing buy order now! Opening the purchase interface for you..."
        }
        TransactionKind::Send => {
            "Executing send transaction! Opening the send interface for you..."
        }
        TransactionKind::Swap => {
            "Executing swap transaction! Opening the swap interface for you..."
        }
        TransactionKind::Stake => {
            "Executing staking transaction! Opening the staking interface for you..."
        }
    }
}

pub fn navigation_confirmation(page: Page) -> &'static str {
    match page {
        Page::Portfolio => {
            "Taking you to your portfolio now! You can see all your assets and their performance."
        }
        Page::Buy => {
            "Opening the buy interface! You can purchase crypto with your preferred payment method."
        }
        Page::Swap => "Opening the swap interface! You can exchange tokens at the best rates.",
        Page::Stake => {
            "Taking you to staking! You can earn up to 15% APY by staking your ICP tokens."
        }
        Page::Defi => {
            "Opening DeFi services! Explore staking, lending, and yield farming opportunities."
        }
        Page::Send => "Opening the send interface! Pick a contact or paste a wallet address.",
    }
}

fn contains_any(input: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| input.contains(needle))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn greeting_ignores_case() {
        for text in ["Hello", "HELLO there", "hEy", "Bonjour!", "HOLA amigo"] {
            assert_eq!(classify_intent(text).category, ResponseCategory::Greeting);
        }
    }

    #[test]
    fn greeting_outranks_execute_now() {
        let matched = classify_intent("hey, buy ICP now");
        assert_eq!(matched.category, ResponseCategory::Greeting);
        assert_eq!(matched.directive, None);
    }

    #[test]
    fn execute_now_emits_transaction_directive() {
        let matched = classify_intent("Buy $50 worth of Bitcoin now");
        assert_eq!(matched.rule, "execute_now");
        assert_eq!(
            matched.directive,
            Some(Directive::ExecuteTransaction(TransactionKind::Buy))
        );
        assert_eq!(
            matched.reply,
            ReplySource::Fixed(execute_acknowledgement(TransactionKind::Buy))
        );
    }

    #[test]
    fn execute_now_takes_first_listed_verb() {
        let matched = classify_intent("stake what I buy, execute");
        assert_eq!(
            matched.directive,
            Some(Directive::ExecuteTransaction(TransactionKind::Buy))
        );
    }

    #[test]
    fn execute_now_stops_before_address_book() {
        let matched = classify_intent("send to alice now");
        assert_eq!(
            matched.directive,
            Some(Directive::ExecuteTransaction(TransactionKind::Send))
        );
    }

    #[test]
    fn send_to_opens_address_book() {
        let matched = classify_intent("send to bob please");
        assert_eq!(matched.category, ResponseCategory::AddressBook);
        assert_eq!(matched.directive, Some(Directive::OpenAddressBook));
    }

    #[test]
    fn navigation_requires_destination() {
        let matched = classify_intent("Show me my portfolio");
        assert_eq!(matched.directive, Some(Directive::NavigateTo(Page::Portfolio)));

        let matched = classify_intent("open the staking page");
        assert_eq!(matched.directive, Some(Directive::NavigateTo(Page::Stake)));

        let matched = classify_intent("navigate somewhere");
        assert_eq!(matched.directive, None);
        assert_eq!(matched.category, ResponseCategory::Default);
    }

    #[test]
    fn navigation_verb_without_destination_falls_through_to_topics() {
        let matched = classify_intent("open a market analysis");
        assert_eq!(matched.category, ResponseCategory::MarketAnalysis);
        assert_eq!(matched.directive, None);
    }

    #[test]
    fn topics_follow_priority_order() {
        let cases = [
            ("I want to purchase ckBTC", ResponseCategory::Buy),
            ("transfer funds", ResponseCategory::Send),
            ("exchange ICP for ckETH", ResponseCategory::Swap),
            ("staking rewards", ResponseCategory::Stake),
            ("explain canisters", ResponseCategory::Knowledge),
            ("any advice?", ResponseCategory::Recommendation),
            ("price of ICP", ResponseCategory::MarketAnalysis),
            ("a personal question", ResponseCategory::PersonalAdvice),
            ("buy or stake?", ResponseCategory::Buy),
        ];

        for (text, expected) in cases {
            assert_eq!(classify_intent(text).category, expected, "input: {text}");
        }
    }

    #[test]
    fn substring_matching_has_no_negation() {
        assert_eq!(
            classify_intent("don't send it").category,
            ResponseCategory::Send
        );
        assert_eq!(
            classify_intent("is this a good time to stake").category,
            ResponseCategory::Greeting
        );
    }

    #[test]
    fn unmatched_text_is_default() {
        let matched = classify_intent("asdkjashd");
        assert_eq!(matched.category, ResponseCategory::Default);
        assert_eq!(matched.directive, None);
    }

    #[test]
    fn each_rule_matches_independently() {
        let greeting = RULES.iter().find(|rule| rule.name == "greeting").unwrap();
        assert!((greeting.matcher)("hola").is_some());
        assert!((greeting.matcher)("asdkjashd").is_none());

        let address_book = RULES.iter().find(|rule| rule.name == "address_book").unwrap();
        assert!((address_book.matcher)("open my contacts").is_some());
    }

    #[test]
    fn normalizes_whitespace() {
        assert_eq!(normalize_text("  buy \t ICP\n now "), "buy ICP now");
    }
}
