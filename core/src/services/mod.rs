//! Business services containing domain logic and use cases.

pub mod auth;
pub mod clock;
pub mod logging;
pub mod token;

// Re-export commonly used types
pub use auth::{AuthService, AuthServiceConfig};
pub use clock::{Clock, ManualClock, SystemClock};
pub use logging::{LogLevel, RotatingLogger};
pub use token::{TokenService, TokenServiceConfig};
