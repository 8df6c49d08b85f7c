pub mod events;
pub mod notifications;
pub mod webhook;
pub mod workflows;
