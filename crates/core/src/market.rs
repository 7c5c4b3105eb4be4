use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum MarketError {
    #[error("unknown token {0}")]
    UnknownToken(String),
    #[error("unknown payment method {0}")]
    UnknownPaymentMethod(String),
    #[error("unknown staking product {0}")]
    UnknownStakingProduct(String),
    #[error("staking product {0} is not available yet")]
    StakingUnavailable(String),
    #[error("amount must be a positive number, got {0}")]
    InvalidAmount(f64),
    #[error("cannot swap {0} for itself")]
    SameToken(String),
    #[error("insufficient {symbol} balance: have {available}, need {requested}")]
    InsufficientBalance {
        symbol: String,
        available: f64,
        requested: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub symbol: String,
    pub name: String,
    pub price_usd: f64,
    pub balance: f64,
    pub change_24h: f64,
}

impl Token {
    pub fn value_usd(&self) -> f64 {
        self.balance * self.price_usd
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentMethod {
    pub id: String,
    pub label: String,
    pub fee_percent: f64,
    pub settlement: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StakingProduct {
    pub id: String,
    pub title: String,
    pub apy_percent: f64,
    pub available: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuyQuote {
    pub symbol: String,
    pub payment_method: String,
    pub amount_usd: f64,
    pub fee_usd: f64,
    pub total_usd: f64,
    pub tokens_received: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwapQuote {
    pub from_symbol: String,
    pub to_symbol: String,
    pub from_amount: f64,
    pub to_amount: f64,
    pub exchange_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSummary {
    pub total_value_usd: f64,
    pub holdings: Vec<Token>,
}

/// Static demo market: fixed prices, payment methods and staking products.
#[derive(Debug, Clone)]
pub struct MarketCatalog {
    tokens: Vec<Token>,
    payment_methods: Vec<PaymentMethod>,
    staking_products: Vec<StakingProduct>,
}

impl Default for MarketCatalog {
    fn default() -> Self {
        Self::demo()
    }
}

impl MarketCatalog {
    pub fn demo() -> Self {
        let tokens = [
            ("ICP", "Internet Computer", 12.45, 245.67, 5.67),
            ("ckBTC", "Chain Key Bitcoin", 43250.30, 0.0847, -2.34),
            ("ckETH", "Chain Key Ethereum", 2650.75, 1.234, 3.21),
            ("USDT", "Tether USD", 1.00, 1500.00, 0.01),
            ("USDC", "USD Coin", 1.00, 500.00, 0.0),
        ]
        .into_iter()
        .map(|(symbol, name, price_usd, balance, change_24h)| Token {
            symbol: symbol.to_string(),
            name: name.to_string(),
            price_usd,
            balance,
            change_24h,
        })
        .collect();

        let payment_methods = [
            ("card", "Credit/Debit Card", 2.9, "Instant"),
            ("bank", "Bank Transfer", 1.5, "1-3 days"),
            ("applepay", "Apple Pay", 2.9, "Instant"),
            ("googlepay", "Google Pay", 2.9, "Instant"),
            ("paypal", "PayPal", 3.5, "Instant"),
        ]
        .into_iter()
        .map(|(id, label, fee_percent, settlement)| PaymentMethod {
            id: id.to_string(),
            label: label.to_string(),
            fee_percent,
            settlement: settlement.to_string(),
        })
        .collect();

        let staking_products = [
            ("staking", "Staking Rewards", 10.5, true),
            ("liquidity", "Liquidity Pools", 12.3, false),
            ("yield", "Yield Farming", 18.7, false),
            ("lending", "Lending", 8.2, false),
            ("borrowing", "Borrowing", 5.5, false),
            ("governance", "Governance", 3.2, false),
        ]
        .into_iter()
        .map(|(id, title, apy_percent, available)| StakingProduct {
            id: id.to_string(),
            title: title.to_string(),
            apy_percent,
            available,
        })
        .collect();

        Self {
            tokens,
            payment_methods,
            staking_products,
        }
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn payment_methods(&self) -> &[PaymentMethod] {
        &self.payment_methods
    }

    pub fn staking_products(&self) -> &[StakingProduct] {
        &self.staking_products
    }

    pub fn token(&self, symbol: &str) -> Result<&Token, MarketError> {
        let symbol = symbol.trim();
        self.tokens
            .iter()
            .find(|token| token.symbol.eq_ignore_ascii_case(symbol))
            .ok_or_else(|| MarketError::UnknownToken(symbol.to_string()))
    }

    pub fn payment_method(&self, id: &str) -> Result<&PaymentMethod, MarketError> {
        let id = id.trim();
        self.payment_methods
            .iter()
            .find(|method| method.id.eq_ignore_ascii_case(id))
            .ok_or_else(|| MarketError::UnknownPaymentMethod(id.to_string()))
    }

    pub fn staking_product(&self, id: &str) -> Result<&StakingProduct, MarketError> {
        let id = id.trim();
        self.staking_products
            .iter()
            .find(|product| product.id.eq_ignore_ascii_case(id))
            .ok_or_else(|| MarketError::UnknownStakingProduct(id.to_string()))
    }

    pub fn buy_quote(
        &self,
        symbol: &str,
        payment_method: &str,
        amount_usd: f64,
    ) -> Result<BuyQuote, MarketError> {
        ensure_positive(amount_usd)?;
        let token = self.token(symbol)?;
        let method = self.payment_method(payment_method)?;

        let fee_usd = amount_usd * method.fee_percent / 100.0;
        Ok(BuyQuote {
            symbol: token.symbol.clone(),
            payment_method: method.id.clone(),
            amount_usd,
            fee_usd,
            total_usd: amount_usd + fee_usd,
            tokens_received: amount_usd / token.price_usd,
        })
    }

    pub fn exchange_rate(&self, from: &str, to: &str) -> Result<f64, MarketError> {
        Ok(self.token(from)?.price_usd / self.token(to)?.price_usd)
    }

    /// Quotes `from_amount` of `from` into `to` at USD parity.
    pub fn swap_quote(
        &self,
        from: &str,
        to: &str,
        from_amount: f64,
    ) -> Result<SwapQuote, MarketError> {
        ensure_positive(from_amount)?;
        let from_token = self.token(from)?;
        let to_token = self.token(to)?;
        if from_token.symbol == to_token.symbol {
            return Err(MarketError::SameToken(from_token.symbol.clone()));
        }

        let exchange_rate = from_token.price_usd / to_token.price_usd;
        Ok(SwapQuote {
            from_symbol: from_token.symbol.clone(),
            to_symbol: to_token.symbol.clone(),
            from_amount,
            to_amount: from_amount * exchange_rate,
            exchange_rate,
        })
    }

    /// Quotes how much of `from` is needed to receive `to_amount` of `to`.
    pub fn reverse_swap_quote(
        &self,
        from: &str,
        to: &str,
        to_amount: f64,
    ) -> Result<SwapQuote, MarketError> {
        ensure_positive(to_amount)?;
        let rate = self.exchange_rate(from, to)?;
        self.swap_quote(from, to, to_amount / rate)
            .map(|quote| SwapQuote { to_amount, ..quote })
    }

    pub fn portfolio(&self) -> PortfolioSummary {
        portfolio_of(&self.tokens)
    }
}

pub fn portfolio_of(tokens: &[Token]) -> PortfolioSummary {
    PortfolioSummary {
        total_value_usd: tokens.iter().map(Token::value_usd).sum(),
        holdings: tokens.to_vec(),
    }
}

pub(crate) fn ensure_positive(amount: f64) -> Result<(), MarketError> {
    if amount.is_finite() && amount > 0.0 {
        Ok(())
    } else {
        Err(MarketError::InvalidAmount(amount))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(left: f64, right: f64) -> bool {
        (left - right).abs() < 1e-9
    }

    #[test]
    fn buy_quote_applies_payment_fee() {
        let market = MarketCatalog::demo();
        let quote = market.buy_quote("icp", "card", 100.0).unwrap();

        assert_eq!(quote.symbol, "ICP");
        assert!(close(quote.fee_usd, 2.9));
        assert!(close(quote.total_usd, 102.9));
        assert!(close(quote.tokens_received, 100.0 / 12.45));
    }

    #[test]
    fn bank_transfer_is_cheapest() {
        let market = MarketCatalog::demo();
        let cheapest = market
            .payment_methods()
            .iter()
            .min_by(|a, b| a.fee_percent.total_cmp(&b.fee_percent))
            .unwrap();
        assert_eq!(cheapest.id, "bank");
    }

    #[test]
    fn swap_quote_uses_price_ratio() {
        let market = MarketCatalog::demo();
        let quote = market.swap_quote("ICP", "ckBTC", 100.0).unwrap();
        assert!(close(quote.exchange_rate, 12.45 / 43250.30));
        assert!(close(quote.to_amount, 100.0 * 12.45 / 43250.30));

        let reverse = market.reverse_swap_quote("ICP", "ckBTC", quote.to_amount).unwrap();
        assert!((reverse.from_amount - 100.0).abs() < 1e-6);
    }

    #[test]
    fn rejects_bad_inputs() {
        let market = MarketCatalog::demo();
        assert_eq!(
            market.buy_quote("DOGE", "card", 10.0).unwrap_err(),
            MarketError::UnknownToken("DOGE".to_string())
        );
        assert_eq!(
            market.buy_quote("ICP", "cash", 10.0).unwrap_err(),
            MarketError::UnknownPaymentMethod("cash".to_string())
        );
        assert!(matches!(
            market.swap_quote("ICP", "icp", 1.0),
            Err(MarketError::SameToken(_))
        ));
        assert!(matches!(
            market.buy_quote("ICP", "card", 0.0),
            Err(MarketError::InvalidAmount(_))
        ));
        assert!(matches!(
            market.buy_quote("ICP", "card", f64::NAN),
            Err(MarketError::InvalidAmount(_))
        ));
    }

    #[test]
    fn portfolio_totals_holdings() {
        let market = MarketCatalog::demo();
        let summary = market.portfolio();
        let expected = market.tokens().iter().map(Token::value_usd).sum::<f64>();
        assert!(close(summary.total_value_usd, expected));
        assert_eq!(summary.holdings.len(), 5);
    }
}
