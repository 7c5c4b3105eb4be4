use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use voicechain_core::{MarketError, PortfolioSummary, TransactionKind, TransactionReceipt, Wallet};
use voicechain_observability::AppMetrics;

use crate::delay::ProcessingDelay;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowStep {
    Details,
    Confirm,
    Processing,
    Success,
}

impl FlowStep {
    pub fn next(self) -> Self {
        match self {
            Self::Details => Self::Confirm,
            Self::Confirm => Self::Processing,
            Self::Processing | Self::Success => Self::Success,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransactionRequest {
    Buy {
        symbol: String,
        payment_method: String,
        amount_usd: f64,
    },
    Swap {
        from: String,
        to: String,
        amount: f64,
    },
    Send {
        symbol: String,
        amount: f64,
        recipient: String,
    },
    Stake {
        product: String,
        symbol: String,
        amount: f64,
    },
}

impl TransactionRequest {
    pub fn kind(&self) -> TransactionKind {
        match self {
            Self::Buy { .. } => TransactionKind::Buy,
            Self::Swap { .. } => TransactionKind::Swap,
            Self::Send { .. } => TransactionKind::Send,
            Self::Stake { .. } => TransactionKind::Stake,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowOutcome {
    pub steps: Vec<FlowStep>,
    pub receipt: TransactionReceipt,
}

/// Runs mocked transaction flows against an in-memory wallet.
pub struct TransactionDesk {
    wallet: Mutex<Wallet>,
    delay: ProcessingDelay,
    metrics: Arc<AppMetrics>,
}

impl TransactionDesk {
    pub fn new(wallet: Wallet, delay: ProcessingDelay, metrics: Arc<AppMetrics>) -> Self {
        Self {
            wallet: Mutex::new(wallet),
            delay,
            metrics,
        }
    }

    pub fn portfolio(&self) -> PortfolioSummary {
        self.wallet.lock().portfolio()
    }

    pub fn history(&self) -> Vec<TransactionReceipt> {
        self.wallet.lock().history().to_vec()
    }

    pub fn with_wallet<R>(&self, f: impl FnOnce(&Wallet) -> R) -> R {
        f(&self.wallet.lock())
    }

    /// Walks details, confirm, processing and success. The request is checked
    /// against a scratch copy of the wallet before the processing wait, so a
    /// rejected request never sleeps.
    #[instrument(skip(self), fields(kind = request.kind().as_str()))]
    pub async fn execute(&self, request: TransactionRequest) -> Result<FlowOutcome, MarketError> {
        let mut steps = vec![FlowStep::Details];

        let mut scratch = self.wallet.lock().clone();
        apply(&mut scratch, &request)?;
        advance(&mut steps);

        advance(&mut steps);
        tokio::time::sleep(self.delay.sample()).await;

        let receipt = apply(&mut self.wallet.lock(), &request)?;
        advance(&mut steps);

        self.metrics.inc_transaction();
        info!(
            receipt_id = %receipt.id,
            symbol = %receipt.symbol,
            amount = receipt.amount,
            "mock transaction completed"
        );

        Ok(FlowOutcome { steps, receipt })
    }
}

fn advance(steps: &mut Vec<FlowStep>) {
    if let Some(last) = steps.last().copied() {
        steps.push(last.next());
    }
}

fn apply(
    wallet: &mut Wallet,
    request: &TransactionRequest,
) -> Result<TransactionReceipt, MarketError> {
    match request {
        TransactionRequest::Buy {
            symbol,
            payment_method,
            amount_usd,
        } => wallet.buy(symbol, payment_method, *amount_usd),
        TransactionRequest::Swap { from, to, amount } => wallet.swap(from, to, *amount),
        TransactionRequest::Send {
            symbol,
            amount,
            recipient,
        } => wallet.send(symbol, *amount, recipient),
        TransactionRequest::Stake {
            product,
            symbol,
            amount,
        } => wallet.stake(product, symbol, *amount),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn desk() -> TransactionDesk {
        TransactionDesk::new(Wallet::default(), ProcessingDelay::none(), AppMetrics::shared())
    }

    #[tokio::test]
    async fn buy_flow_walks_every_step() {
        let desk = desk();
        let outcome = desk
            .execute(TransactionRequest::Buy {
                symbol: "ckETH".to_string(),
                payment_method: "card".to_string(),
                amount_usd: 265.075,
            })
            .await
            .unwrap();

        assert_eq!(
            outcome.steps,
            vec![
                FlowStep::Details,
                FlowStep::Confirm,
                FlowStep::Processing,
                FlowStep::Success
            ]
        );
        assert_eq!(outcome.receipt.kind, TransactionKind::Buy);
        assert_eq!(desk.history().len(), 1);
    }

    #[tokio::test]
    async fn rejected_request_leaves_wallet_untouched() {
        let desk = desk();
        let before = desk.portfolio();
        let err = desk
            .execute(TransactionRequest::Send {
                symbol: "ICP".to_string(),
                amount: 10_000.0,
                recipient: "bob.voice".to_string(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, MarketError::InsufficientBalance { .. }));
        assert_eq!(desk.portfolio(), before);
        assert!(desk.history().is_empty());
    }

    #[test]
    fn requests_deserialize_by_kind() {
        let request: TransactionRequest = serde_json::from_value(serde_json::json!({
            "kind": "swap",
            "from": "ICP",
            "to": "ckBTC",
            "amount": 5.0
        }))
        .unwrap();
        assert_eq!(request.kind(), TransactionKind::Swap);
    }
}
