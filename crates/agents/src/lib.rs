mod delay;
mod desk;
mod session;
mod sink;

pub use delay::ProcessingDelay;
pub use desk::{FlowOutcome, FlowStep, TransactionDesk, TransactionRequest};
pub use session::{AssistantSession, SessionConfig, SessionError, DEFAULT_ASSISTANT_NAME};
pub use sink::{DirectiveSink, RecordingSink, SinkEvent};
