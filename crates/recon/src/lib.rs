//! `concilia-recon` — Multi-phase bank/ledger reconciliation engine.
//!
//! Pure engine crate: receives normalized records, returns matched groups
//! plus both sides' discrepancies. No CLI or network dependencies; the
//! only IO helper is column-mapped CSV ingestion.

pub mod bucket;
pub mod config;
pub mod connect;
pub mod engine;
pub mod error;
pub mod ingest;
pub mod model;
pub mod normalize;
pub mod phases;
pub mod similarity;

pub use config::RunConfig;
pub use engine::{reconcile, reconcile_with};
pub use error::ReconError;
pub use ingest::{load_bank_csv, load_ledger_csv};
pub use model::{BankRecord, LedgerRecord, PhaseId, ReconResult, ReconciledEntry};
pub use phases::{default_pipeline, MatchPhase, Pipeline};
