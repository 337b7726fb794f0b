//! Worker task board: status filters, workload split, and delivery proofs.

pub mod domain;
pub mod proof;
pub mod workload;

pub use domain::{Task, TaskError, TaskFilter, TaskStatus};
pub use proof::{DeliveryProof, DeliveryProofForm, ProofError, ProofStatus};
pub use workload::{summarize, workload_by_status, TaskSummary, WorkloadEntry};
