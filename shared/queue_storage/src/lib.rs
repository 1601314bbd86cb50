//! Queue storage for the SQS console
//!
//! This crate is the only place that talks to the queue provider. It owns the
//! normalized queue/message data model, the provider capability trait and the
//! adapter that translates between the two.

pub mod queue;
