//! Core domain logic for the cost tracker.
//!
//! This crate contains the fundamental types and logic for:
//! - Parsing: turning assistant JSONL log lines into priced usage records
//! - Dedup: collapsing streaming frames and mirrored sub-task records per call
//! - Tailing: following log files live, and reading them in bulk
//! - Flow: converting activity events into focus time, per branch
//! - Cost: combining focus time and model spend

pub mod activity;
pub mod branch;
mod cost;
pub mod dedup;
pub mod discovery;
pub mod flow;
pub mod history;
mod ledger;
pub mod parser;
pub mod pricing;
pub mod tailer;
pub mod types;
mod usage;

pub use activity::{ActivityEvent, ActivityKind};
pub use branch::{BranchResolver, FixedBranch, GitBranchResolver, ReflogHistory};
pub use cost::{CostBreakdown, breakdown};
pub use dedup::{DedupBuffer, SharedDedup};
pub use flow::{FlowConfig, FlowEngine, FlowState};
pub use history::{HistoryScan, read_history, read_history_many};
pub use ledger::FocusLedger;
pub use parser::{ParsedFrame, parse_line};
pub use pricing::{ModelPricing, PricingTable};
pub use tailer::{TailError, TailEvent, Tailer, TailerConfig};
pub use types::{BranchName, ValidationError};
pub use usage::{TokenCounts, UsageRecord};
