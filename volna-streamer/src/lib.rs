pub mod config;
pub mod device;
pub mod error;
pub mod metrics;
pub mod pipeline;
pub mod publisher;

pub use config::*;
pub use device::*;
pub use error::*;
pub use metrics::*;
pub use pipeline::*;
pub use publisher::*;
