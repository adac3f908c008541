//! Byte relay subsystem.
//!
//! # Data Flow
//! ```text
//! CONNECT tunnel:
//!     client  ──read──▶ pump (client_to_upstream) ──write──▶ upstream
//!     upstream ─read──▶ pump (upstream_to_client) ──write──▶ client
//!     both pumps share one Teardown
//!
//! Plain forward:
//!     upstream ─read──▶ pump (upstream_to_client, recorded) ──write──▶ client
//! ```
//!
//! # Design Decisions
//! - Fixed chunk size (2048 bytes by default), written in receipt order
//! - No retry: any I/O error closes both directions
//! - Pumps own their socket halves; dropping them is the close

pub mod pump;
pub mod teardown;
pub mod tunnel;

pub use pump::{Direction, PumpEnd, PumpReport, RelayPump};
pub use teardown::Teardown;
pub use tunnel::{RelayOptions, TunnelHandles, spawn_forward, spawn_tunnel};
