//! # Sentinel Engine
//!
//! Service layer of the screening match resolution engine. Wires the
//! domain core to SQLite persistence, the external search provider and
//! the case subsystem.
//!
//! ## Flow
//!
//! ```text
//! provider search ──► create_screening ──► archive priors + persist matches
//!                                              │
//!                    review_match ◄────────────┘ (later, per reviewer)
//!                         │  one transaction: guards, transition,
//!                         │  cascade, aggregate recompute
//!                         └──► post-commit: CaseNotifier ──► case subsystem
//! ```

pub mod cases;
pub mod error;
pub mod provider;
pub mod service;

pub use cases::{Case, CaseError, CaseGateway, CaseNotification, CaseNotifier};
pub use error::{EngineError, EngineResult};
pub use provider::{ProviderError, SearchProvider};
pub use service::{CreateScreeningRequest, MatchDetail, ScreeningDetail, ScreeningService};
