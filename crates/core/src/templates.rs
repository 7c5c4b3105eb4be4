use std::collections::HashMap;

use crate::models::{Language, ResponseCategory};

pub const ASSISTANT_PLACEHOLDER: &str = "{assistant}";
pub const LANGUAGE_PLACEHOLDER: &str = "{language}";

/// Canned replies keyed by language, then category. Lookups fall back to the
/// default language, then to the default language's `Default` table.
#[derive(Debug, Clone)]
pub struct TemplateCatalog {
    default_language: Language,
    tables: HashMap<Language, HashMap<ResponseCategory, Vec<String>>>,
}

impl TemplateCatalog {
    pub fn new(default_language: Language) -> Self {
        Self {
            default_language,
            tables: HashMap::new(),
        }
    }

    pub fn default_language(&self) -> Language {
        self.default_language
    }

    pub fn insert<I, S>(&mut self, language: Language, category: ResponseCategory, templates: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tables
            .entry(language)
            .or_default()
            .insert(category, templates.into_iter().map(Into::into).collect());
    }

    pub fn has_language(&self, language: Language) -> bool {
        self.tables.contains_key(&language)
    }

    pub fn languages(&self) -> Vec<Language> {
        Language::ALL
            .into_iter()
            .filter(|language| self.has_language(*language))
            .collect()
    }

    pub fn templates(&self, language: Language, category: ResponseCategory) -> &[String] {
        [
            (language, category),
            (self.default_language, category),
            (self.default_language, ResponseCategory::Default),
        ]
        .into_iter()
        .find_map(|(language, category)| self.lookup(language, category))
        .unwrap_or(&[])
    }

    fn lookup(&self, language: Language, category: ResponseCategory) -> Option<&[String]> {
        self.tables
            .get(&language)
            .and_then(|table| table.get(&category))
            .filter(|templates| !templates.is_empty())
            .map(Vec::as_slice)
    }

    pub fn builtin() -> Self {
        let mut catalog = Self::new(Language::DEFAULT);

        catalog.insert(
            Language::En,
            ResponseCategory::Greeting,
            [
                "Hello! I'm {assistant}, your universal AI assistant powered by advanced language models. I can help you with crypto transactions, provide real-world information, give financial advice, and answer any questions you have. I understand and respond in {language}. How can I assist you today?",
                "Hi there! I'm {assistant}, your intelligent companion. I have access to real-time information and can help with everything from crypto trading to general knowledge questions. I adapt to your language preference and learn from our conversations. What would you like to explore?",
                "Greetings! I'm {assistant}, your personal AI advisor. I can execute transactions, provide market analysis, answer questions about any topic, and give personalized recommendations based on your portfolio and preferences. I'm here to make your crypto journey seamless. How may I help?",
            ],
        );
        catalog.insert(
            Language::En,
            ResponseCategory::Buy,
            [
                "I'll help you buy crypto instantly! Just tell me what you want to buy and how much. For example, say \"Buy $100 worth of Bitcoin\" and I'll execute the purchase immediately with your preferred payment method. I can also recommend the best tokens based on current market conditions.",
                "Ready to execute your buy order! I can purchase any supported cryptocurrency for you. Based on current market analysis, ICP is showing strong fundamentals with 15% staking rewards available. What would you like to buy today?",
                "I can execute buy orders instantly! Tell me the amount and token, like \"Buy 50 ICP\" and I'll process it immediately. I also provide real-time market insights to help you make informed decisions.",
            ],
        );
        catalog.insert(
            Language::En,
            ResponseCategory::Send,
            [
                "I'll execute your send transaction right away! Just say \"Send 50 ICP to alice.voice\" and I'll process it instantly. I have access to your address book for quick transfers. Would you like me to open your contacts?",
                "Ready to send crypto! I can transfer to any VoiceChain ID or wallet address. For security, I'll ask for PIN confirmation before executing. Tell me the amount, token, and recipient.",
                "I'll handle your transfer immediately! I can send to contacts in your address book or any wallet address. Just specify the details and I'll execute the transaction securely.",
            ],
        );
        catalog.insert(
            Language::En,
            ResponseCategory::Swap,
            [
                "I'll execute your swap instantly! Tell me what you want to swap, like \"Swap 100 ICP for ckBTC\" and I'll get you the best rates and execute immediately. I monitor all DEX prices in real-time.",
                "Ready to swap tokens! I can execute trades at optimal prices across multiple exchanges. Based on current liquidity, I recommend swapping during low-volatility periods for better rates.",
                "I'll handle your token swap right now! Just specify the tokens and amounts. I provide real-time price analysis and can suggest the best timing for your trades.",
            ],
        );
        catalog.insert(
            Language::En,
            ResponseCategory::Stake,
            [
                "I'll set up staking for you immediately! Current ICP staking offers up to 15% APY with 8-year terms. Tell me how much you want to stake and for how long, and I'll execute it right away.",
                "Ready to stake your tokens! Based on your portfolio, I recommend staking 60% of your ICP for maximum rewards. I can execute staking transactions instantly with your preferred terms.",
                "I'll start staking for you now! Current network rewards are excellent. Tell me your staking preferences and I'll optimize your returns automatically.",
            ],
        );
        catalog.insert(
            Language::En,
            ResponseCategory::Knowledge,
            [
                "I have access to real-time information and can answer questions about any topic. Whether it's crypto markets, world events, technology, science, or personal advice - I'm here to help with accurate, up-to-date information.",
                "I can research and explain anything you need to know! From complex DeFi protocols to current events, scientific concepts, or practical advice. My knowledge is constantly updated and I can provide detailed explanations in your preferred language.",
                "Ask me anything! I have comprehensive knowledge about cryptocurrency, blockchain technology, global markets, current events, and general topics. I can provide detailed analysis and explanations tailored to your level of understanding.",
            ],
        );
        catalog.insert(
            Language::En,
            ResponseCategory::Recommendation,
            [
                "Based on your portfolio analysis, I recommend: 40% ICP (for staking rewards), 25% ckBTC (store of value), 20% ckETH (DeFi opportunities), 15% stablecoins (liquidity). This provides optimal risk-adjusted returns for your profile.",
                "For your investment strategy, I suggest dollar-cost averaging into ICP over the next month, staking 70% for long-term rewards, and keeping 30% liquid for trading opportunities. Current market conditions favor this approach.",
                "Portfolio optimization recommendation: Increase your ICP staking to 8-year terms for maximum 15% APY, diversify with 20% ckBTC for stability, and maintain 10% in stablecoins for opportunities. This matches your risk tolerance perfectly.",
            ],
        );
        catalog.insert(
            Language::En,
            ResponseCategory::MarketAnalysis,
            [
                "Current market analysis: Bitcoin is consolidating around key support levels, ICP is building momentum with strong fundamentals and 15% staking rewards, Ethereum is preparing for major upgrades. Overall sentiment is cautiously optimistic with institutional adoption increasing.",
                "Real-time market insights: DeFi sector is experiencing growth, particularly on Internet Computer due to reverse gas fees and web-speed transactions. ICP staking is highly attractive at current rates. Recommend accumulating quality assets during this consolidation phase.",
                "Market update: Crypto markets are showing resilience with increasing institutional adoption. ICP ecosystem is expanding rapidly with new DeFi protocols launching. Current staking rewards of 15% make ICP particularly attractive for long-term holders.",
            ],
        );
        catalog.insert(
            Language::En,
            ResponseCategory::PersonalAdvice,
            [
                "I can provide personalized advice on any topic! Whether it's financial planning, career guidance, relationship advice, health and wellness, or personal development - I'm here to help with thoughtful, practical suggestions tailored to your situation.",
                "Need personal guidance? I can help with life decisions, goal setting, productivity tips, learning strategies, or any challenges you're facing. I provide supportive, actionable advice based on proven principles and your specific circumstances.",
                "I'm here for personal support too! Beyond crypto and finance, I can discuss any topic that's important to you. From daily challenges to major life decisions, I provide thoughtful perspectives and practical solutions.",
            ],
        );
        catalog.insert(
            Language::En,
            ResponseCategory::Default,
            [
                "I'm your universal AI assistant with real-time knowledge and transaction capabilities. I can execute crypto operations, provide market analysis, answer questions about any topic, give personalized recommendations, and help with daily tasks. I adapt to your language and learn from our conversations. What would you like to explore?",
                "I'm a comprehensive AI that combines financial services with universal knowledge. I can handle all your crypto needs while also serving as your personal advisor for any topic. From executing trades to explaining complex concepts, I'm here to help in your preferred language.",
                "I'm your intelligent companion for both crypto and life! I can execute transactions instantly, provide real-world information, give investment advice, answer any questions, and help with personal matters. I'm constantly learning and adapting to serve you better.",
            ],
        );

        catalog.insert(
            Language::Es,
            ResponseCategory::Greeting,
            ["¡Hola! Soy {assistant}, tu asistente de IA universal. Puedo ayudarte con transacciones de cripto, proporcionar información del mundo real, dar consejos financieros y responder cualquier pregunta. Entiendo y respondo en español. ¿Cómo puedo ayudarte hoy?"],
        );
        catalog.insert(
            Language::Es,
            ResponseCategory::Default,
            ["Soy tu asistente de IA universal con conocimiento en tiempo real y capacidades de transacción. Puedo ejecutar operaciones de cripto, proporcionar análisis de mercado, responder preguntas sobre cualquier tema y dar recomendaciones personalizadas. Me adapto a tu idioma. ¿Qué te gustaría explorar?"],
        );

        catalog.insert(
            Language::Fr,
            ResponseCategory::Greeting,
            ["Salut! Je suis {assistant}, votre assistant IA universel. Je peux vous aider avec les transactions crypto, fournir des informations du monde réel, donner des conseils financiers et répondre à toutes vos questions. Je comprends et réponds en français. Comment puis-je vous aider aujourd'hui?"],
        );
        catalog.insert(
            Language::Fr,
            ResponseCategory::Default,
            ["Je suis votre assistant IA universel avec des connaissances en temps réel et des capacités de transaction. Je peux exécuter des opérations crypto, fournir une analyse de marché, répondre à des questions sur n'importe quel sujet et donner des recommandations personnalisées. Je m'adapte à votre langue. Que souhaitez-vous explorer?"],
        );

        catalog
    }
}

pub fn render_template(template: &str, assistant_name: &str, language: Language) -> String {
    template
        .replace(ASSISTANT_PLACEHOLDER, assistant_name)
        .replace(LANGUAGE_PLACEHOLDER, language.display_name())
}

pub fn welcome_message(assistant_name: &str) -> String {
    format!(
        "Hello! I'm {assistant_name}, your universal AI assistant. I can execute crypto transactions, provide real-world information, give financial advice, and answer any questions. I understand multiple languages and adapt to your preferences. I can also help you manage your address book and contacts. How can I assist you today?"
    )
}

/// Phrases a simulated voice capture can "hear" in each language.
pub fn sample_commands(language: Language) -> &'static [&'static str] {
    match language {
        Language::Tw => &["Mema John dɔla 50", "Tɔ Bitcoin fi mobile money", "Hwɛ me sika"],
        Language::Es => &[
            "Envía $50 a María",
            "Compra Bitcoin con dinero móvil",
            "Verifica mi saldo",
        ],
        Language::Zh => &["给约翰发送50美元", "用手机支付买比特币", "查看我的余额"],
        Language::Fr => &[
            "Envoie 50$ à Marie",
            "Achète Bitcoin avec mobile money",
            "Vérifie mon solde",
        ],
        _ => &[
            "Send $50 to John",
            "Buy Bitcoin with mobile money",
            "Check my balance",
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falls_back_to_default_language_for_missing_category() {
        let catalog = TemplateCatalog::builtin();
        let spanish = catalog.templates(Language::Es, ResponseCategory::Stake);
        let english = catalog.templates(Language::En, ResponseCategory::Stake);
        assert_eq!(spanish, english);
    }

    #[test]
    fn unsupported_language_uses_default_tables() {
        let catalog = TemplateCatalog::builtin();
        assert!(!catalog.has_language(Language::De));
        assert_eq!(
            catalog.templates(Language::De, ResponseCategory::Greeting),
            catalog.templates(Language::En, ResponseCategory::Greeting)
        );
    }

    #[test]
    fn missing_category_everywhere_uses_default_table() {
        let catalog = TemplateCatalog::builtin();
        assert_eq!(
            catalog.templates(Language::Fr, ResponseCategory::Navigation),
            catalog.templates(Language::En, ResponseCategory::Default)
        );
    }

    #[test]
    fn empty_catalog_yields_no_templates() {
        let catalog = TemplateCatalog::new(Language::En);
        assert!(catalog
            .templates(Language::En, ResponseCategory::Greeting)
            .is_empty());
    }

    #[test]
    fn renders_placeholders() {
        let text = render_template("I'm {assistant}, speaking {language}", "Nova", Language::Fr);
        assert_eq!(text, "I'm Nova, speaking Français");
    }

    #[test]
    fn builtin_languages_are_listed_in_display_order() {
        let catalog = TemplateCatalog::builtin();
        assert_eq!(
            catalog.languages(),
            vec![Language::En, Language::Fr, Language::Es]
        );
    }
}
