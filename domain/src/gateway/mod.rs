//! Outbound integrations used by the domain layer.

pub mod google;
