//! Transaction pipeline: balance check, dry run, broadcast and status tracking

mod attempt;
mod balance;
mod classifier;
mod gas;
mod sender;

pub use attempt::{AttemptState, TransactionAttempt, TransactionResult};
pub use balance::{BalanceCheckError, BalanceGuard};
pub use classifier::ErrorClassifier;
pub use gas::DryRunEstimator;
pub use sender::{StatusObserver, TransactionSubmitter};
