//! Usecases Layer - Orchestration over Ports
//!
//! The flows the crate exists for, composed entirely over the port
//! traits so every one of them is testable against mocks:
//! - `DeploymentController`: proxy deployment with relayer polling
//! - `CredentialService`: exchange credential create/derive
//! - `ApprovalBatcher`: the six exchange approvals, checked and set
//! - `SessionOrchestrator`: the idempotent onboarding pipeline
//! - `OrderBookPricer`: cached books and execution pricing
//! - `OrderExecutionEngine`: intent validation through order posting
//! - `LegacyWalletRecovery`: sweeping stranded old-scheme balances

pub mod approvals;
pub mod credentials;
pub mod deployment;
pub mod execution;
pub mod orchestrator;
pub mod pricer;
pub mod recovery;

pub use approvals::{ApprovalBatcher, ApprovalStatus, ApprovalTargets, build_approval_batch};
pub use credentials::CredentialService;
pub use deployment::{DeploymentController, PollPolicy, poll_to_terminal};
pub use execution::{ExecutedOrder, ExecutionPolicy, OrderExecutionEngine};
pub use orchestrator::{SessionOrchestrator, SessionReport};
pub use pricer::{OrderBookPricer, PricingPolicy, buffered_price, raw_execution_price};
pub use recovery::{LegacyWalletRecovery, RecoveryReport};
