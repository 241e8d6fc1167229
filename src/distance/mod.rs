pub mod cache;
pub mod client;
pub mod error;
pub mod oracle;
pub mod retry;
pub mod types;

pub use cache::{Clock, DistanceCache, ManualClock, SystemClock};
pub use client::{DistanceMatrixClient, DistanceProvider};
pub use error::LookupError;
pub use oracle::DistanceOracle;
pub use retry::RetryPolicy;
pub use types::{normalize_address, Distance, DistanceQuery, DistanceResult};
