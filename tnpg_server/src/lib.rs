//! # TNPG server
//! This crate hosts the HTTP side of the TNPG request signing layer. It is responsible for:
//! Receiving instant payment notifications (IPN) from the gateway, verifying them, and passing authentic ones on to an
//! [`tnpg_auth::IpnProcessor`].
//! Guarding the `/api` scope so that only correctly signed requests reach its handlers.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! The server exposes the following routes:
//! * `/health`: A health check route that returns a 200 OK response.
//! * `/ipn`: The payment notification callback. It always answers 200.
//! * `/api/whoami`: Returns the merchant identity of a signed request.

pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod helpers;
pub mod middleware;
pub mod processor;
pub mod routes;
pub mod server;

#[cfg(test)]
mod endpoint_tests;
