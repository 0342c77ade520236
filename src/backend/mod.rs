//! Usage: Network-facing core: login negotiation and protected-resource calls.
//!
//! Classification of raw HTTP outcomes into the error taxonomy happens here
//! and only here; nothing above this layer sees a status code.

pub(crate) mod negotiator;
pub(crate) mod protected;
pub(crate) mod strategy;
