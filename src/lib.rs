//! Forward HTTP/HTTPS proxy library.

pub mod config;
pub mod dispatch;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod record;
pub mod relay;
pub mod resilience;

pub use config::schema::ProxyConfig;
pub use dispatch::Dispatcher;
pub use error::{ProxyError, Result};
pub use lifecycle::{RunningProxy, Shutdown};
