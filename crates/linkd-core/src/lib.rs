//! Core types and trait definitions for linkd.
//!
//! This crate is free of HTTP and database dependencies. The server, the
//! store backends and the terminal client all depend on it.

#![allow(async_fn_in_trait)]

pub mod error;
pub mod notification;
pub mod post;
pub mod store;
pub mod user;
pub mod wire;

pub use error::{Error, Result};
