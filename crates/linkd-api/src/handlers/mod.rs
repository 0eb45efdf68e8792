//! Route handlers, one module per resource.

pub mod authentication;
pub mod feed;
pub mod notifications;
