//! Guild authorization linking
//!
//! Lifecycle of one guild:
//!
//! ```text
//! unregistered --register--> pending --promote--> linked
//!                               |
//!                               +------expire----> unregistered
//! ```

pub mod linked_store;
pub mod ports;
pub mod reconcile;
pub mod service;
pub mod session_registry;
