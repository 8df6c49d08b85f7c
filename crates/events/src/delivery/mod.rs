//! Outbound HTTP delivery channels.
//!
//! - [`forward`]: mirror each normalized event to a second endpoint
//!   (best-effort, single attempt, short timeout).
//! - [`slack`]: post notification text to a Slack incoming webhook with
//!   retry.

pub mod forward;
pub mod slack;
