use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::market::{
    ensure_positive, portfolio_of, MarketCatalog, MarketError, PortfolioSummary, Token,
};
use crate::models::TransactionKind;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionReceipt {
    pub id: String,
    pub kind: TransactionKind,
    pub symbol: String,
    pub amount: f64,
    pub counter_symbol: Option<String>,
    pub counter_amount: Option<f64>,
    pub counterparty: Option<String>,
    pub fee_usd: f64,
    pub at: DateTime<Utc>,
}

impl TransactionReceipt {
    fn new(kind: TransactionKind, symbol: &str, amount: f64) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            kind,
            symbol: symbol.to_string(),
            amount,
            counter_symbol: None,
            counter_amount: None,
            counterparty: None,
            fee_usd: 0.0,
            at: Utc::now(),
        }
    }
}

/// In-memory demo wallet. Every operation is a plain balance mutation.
#[derive(Debug, Clone)]
pub struct Wallet {
    market: MarketCatalog,
    holdings: Vec<Token>,
    staked: BTreeMap<String, f64>,
    history: Vec<TransactionReceipt>,
}

impl Wallet {
    pub fn new(market: MarketCatalog) -> Self {
        let holdings = market.tokens().to_vec();
        Self {
            market,
            holdings,
            staked: BTreeMap::new(),
            history: Vec::new(),
        }
    }

    pub fn market(&self) -> &MarketCatalog {
        &self.market
    }

    pub fn balance(&self, symbol: &str) -> Result<f64, MarketError> {
        Ok(self.holding(symbol)?.balance)
    }

    pub fn staked(&self, symbol: &str) -> f64 {
        self.staked
            .iter()
            .find(|(staked_symbol, _)| staked_symbol.eq_ignore_ascii_case(symbol.trim()))
            .map(|(_, amount)| *amount)
            .unwrap_or(0.0)
    }

    pub fn history(&self) -> &[TransactionReceipt] {
        &self.history
    }

    pub fn portfolio(&self) -> PortfolioSummary {
        portfolio_of(&self.holdings)
    }

    pub fn buy(
        &mut self,
        symbol: &str,
        payment_method: &str,
        amount_usd: f64,
    ) -> Result<TransactionReceipt, MarketError> {
        let quote = self.market.buy_quote(symbol, payment_method, amount_usd)?;
        self.holding_mut(&quote.symbol)?.balance += quote.tokens_received;

        let mut receipt =
            TransactionReceipt::new(TransactionKind::Buy, &quote.symbol, quote.tokens_received);
        receipt.counter_symbol = Some("USD".to_string());
        receipt.counter_amount = Some(quote.total_usd);
        receipt.counterparty = Some(quote.payment_method);
        receipt.fee_usd = quote.fee_usd;
        Ok(self.record(receipt))
    }

    pub fn swap(
        &mut self,
        from: &str,
        to: &str,
        amount: f64,
    ) -> Result<TransactionReceipt, MarketError> {
        let quote = self.market.swap_quote(from, to, amount)?;
        self.debit(&quote.from_symbol, quote.from_amount)?;
        self.holding_mut(&quote.to_symbol)?.balance += quote.to_amount;

        let mut receipt = TransactionReceipt::new(
            TransactionKind::Swap,
            &quote.from_symbol,
            quote.from_amount,
        );
        receipt.counter_symbol = Some(quote.to_symbol);
        receipt.counter_amount = Some(quote.to_amount);
        Ok(self.record(receipt))
    }

    pub fn send(
        &mut self,
        symbol: &str,
        amount: f64,
        recipient: &str,
    ) -> Result<TransactionReceipt, MarketError> {
        ensure_positive(amount)?;
        let symbol = self.holding(symbol)?.symbol.clone();
        self.debit(&symbol, amount)?;

        let mut receipt = TransactionReceipt::new(TransactionKind::Send, &symbol, amount);
        receipt.counterparty = Some(recipient.to_string());
        Ok(self.record(receipt))
    }

    /// Moves `amount` from the liquid balance into the staking ledger.
    pub fn stake(
        &mut self,
        product_id: &str,
        symbol: &str,
        amount: f64,
    ) -> Result<TransactionReceipt, MarketError> {
        ensure_positive(amount)?;
        let product = self.market.staking_product(product_id)?;
        if !product.available {
            return Err(MarketError::StakingUnavailable(product.id.clone()));
        }
        let product_id = product.id.clone();

        let symbol = self.holding(symbol)?.symbol.clone();
        self.debit(&symbol, amount)?;
        *self.staked.entry(symbol.clone()).or_insert(0.0) += amount;

        let mut receipt = TransactionReceipt::new(TransactionKind::Stake, &symbol, amount);
        receipt.counterparty = Some(product_id);
        Ok(self.record(receipt))
    }

    fn debit(&mut self, symbol: &str, amount: f64) -> Result<(), MarketError> {
        let holding = self.holding_mut(symbol)?;
        if holding.balance < amount {
            return Err(MarketError::InsufficientBalance {
                symbol: holding.symbol.clone(),
                available: holding.balance,
                requested: amount,
            });
        }
        holding.balance -= amount;
        Ok(())
    }

    fn holding(&self, symbol: &str) -> Result<&Token, MarketError> {
        let symbol = symbol.trim();
        self.holdings
            .iter()
            .find(|token| token.symbol.eq_ignore_ascii_case(symbol))
            .ok_or_else(|| MarketError::UnknownToken(symbol.to_string()))
    }

    fn holding_mut(&mut self, symbol: &str) -> Result<&mut Token, MarketError> {
        let symbol = symbol.trim();
        self.holdings
            .iter_mut()
            .find(|token| token.symbol.eq_ignore_ascii_case(symbol))
            .ok_or_else(|| MarketError::UnknownToken(symbol.to_string()))
    }

    fn record(&mut self, receipt: TransactionReceipt) -> TransactionReceipt {
        self.history.push(receipt.clone());
        receipt
    }
}

impl Default for Wallet {
    fn default() -> Self {
        Self::new(MarketCatalog::demo())
    }
}
