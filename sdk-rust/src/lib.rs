mod catalog;
mod classification;
mod client_utils;
mod errors;
mod lifecycle;
mod normalize;
mod opentelemetry;
mod serde_utils;
mod transport;
mod types;
mod types_ext;

pub use catalog::RiskApiClient;
pub use classification::{risk_category, severity_tier, RiskCategory, SeverityTier};
pub use errors::*;
pub use lifecycle::{CallLifecycle, CallState};
pub use normalize::unwrap_envelope;
pub use transport::*;
pub use types::*;
