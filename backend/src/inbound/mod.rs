//! Inbound adapters. HTTP is currently the only transport.

pub mod http;
