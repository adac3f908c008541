//! Request recording subsystem.
//!
//! # Data Flow
//! ```text
//! Dispatcher resolves a host
//!     → RecordStore::open (Log/<host>/<host>.<uuid>.json, "Incoming header")
//!     → RequestRecord::record, called by whichever task owns the record:
//!         dispatcher: "Modified header", "Proxy response sent"
//!         forward pump: "Server response received"
//! ```
//!
//! # Design Decisions
//! - Recording is a side channel; its failures never affect proxying
//! - One file per request, so concurrent sessions never share a writer
//! - Directory creation is idempotent (`create_dir_all`)

pub mod store;

pub use store::{Event, RecordStore, RequestRecord};
