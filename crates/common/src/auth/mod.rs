//! Authorization helpers
//!
//! Only the coordinator's side of the flow lives here: minting the expected
//! state token that is echoed back through the external provider, comparing
//! it, and hashing identifiers before they reach the logs.

pub mod state;

pub use state::{generate_state_token, redact_identifier, states_match};
