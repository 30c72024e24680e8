//! Authentication route handlers
//!
//! Account signup, credential login and token refresh. All three are on
//! the default allow-list, so they run without a bearer token.

pub mod login;
pub mod refresh;
pub mod signup;

pub use login::login;
pub use refresh::refresh;
pub use signup::signup;
