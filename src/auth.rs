//! ClientLogin credentials, the redacted token wrapper, and the caching token authority.

pub mod authority;
pub mod credentials;
pub mod secret;

pub use authority::*;
pub use credentials::*;
pub use secret::*;
