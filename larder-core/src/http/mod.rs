//! Outbound page fetching.
//!
//! Recipe imports download exactly one page; everything outgoing goes through
//! [`HttpClient`] so tests can swap in [`MockClient`].

pub(crate) mod charset;
mod client;

pub use client::{
    check_url, FetchClient, HttpClient, MockClient, MockResponse, DEFAULT_FETCH_TIMEOUT_SECS,
};
