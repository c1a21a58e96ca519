//! HTTP access for steps that fetch remote data.
//!
//! Steps take an `HttpClient` at construction time so tests can swap in
//! `MockClient` for the network.

mod client;

pub use client::{
    HttpClient, MockClient, MockResponse, ReqwestClient, ReqwestClientBuilder, DEFAULT_TIMEOUT_SECS,
    DEFAULT_USER_AGENT,
};
