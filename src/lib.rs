//! `path-admission` -- a request-admission engine for a payload-delivery
//! HTTP server used in offensive-security operations (redirector / C2
//! staging).
//!
//! For every inbound request bound to a served path, the engine decides
//! whether the configured payload should be returned or the request
//! rejected, based on a declarative per-path *condition document* loaded
//! from disk. This crate covers three things:
//!
//! - the **condition model** ([`condition`], [`merge`]): parsing,
//!   validating and combining condition documents;
//! - the **evaluator** ([`evaluator`]): the pure predicate that decides
//!   admit/deny given one request, the ledger and a GeoIP resolver;
//! - the **hit ledger** ([`ledger`]): persistent per-client history backing
//!   `serve` budgets and `prereq` chains.
//!
//! The HTTP listener, TLS termination, condition-file discovery/hot-reload,
//! the GeoIP database reader, CLI and management API are all external
//! collaborators -- only their contracts are defined here.
//!
//! # Example
//!
//! ```rust
//! use path_admission::{
//!     condition, evaluator, config::EngineConfig, geoip::NilGeoIp,
//!     ledger::MemoryLedger, request::SimpleRequest, script::ScriptRunner,
//! };
//!
//! let doc = condition::parse(b"serve: 1\nauthorized_methods:\n  - GET\n").unwrap();
//! let ledger = MemoryLedger::new();
//! let scripts = ScriptRunner::new(&EngineConfig::default());
//! let request = SimpleRequest::new("GET", "/payload").with_remote_addr("203.0.113.9:51422");
//!
//! assert!(evaluator::should_host(&request, &ledger, &NilGeoIp, &scripts, &doc));
//! ledger.hit("203.0.113.9", "/payload").unwrap();
//! assert!(!evaluator::should_host(&request, &ledger, &NilGeoIp, &scripts, &doc));
//! ```

pub mod condition;
pub mod config;
pub mod error;
pub mod evaluator;
pub mod geoip;
pub mod ledger;
pub mod matcher;
pub mod merge;
pub mod request;
pub mod script;

pub use condition::{parse, ConditionDoc, ExecSpec};
pub use config::EngineConfig;
pub use error::{AdmissionError, Result};
pub use evaluator::should_host;
pub use geoip::{GeoIp, MaxMindGeoIp, NilGeoIp, StaticGeoIp};
pub use ledger::{HitLedger, MemoryLedger, SledLedger};
pub use merge::merge;
pub use request::{client_identity, Request, SimpleRequest};
pub use script::ScriptRunner;
