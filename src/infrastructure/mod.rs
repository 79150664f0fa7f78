//! Infrastructure layer: filesystem access and service wiring
//!
//! Everything that touches the outside world lives here; the domain stays pure.

pub mod di;
pub mod error;
pub mod traits;

pub use di::ServiceContainer;
pub use error::{InfraError, InfraResult};
