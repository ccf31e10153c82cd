//! Retrieval of the raw listing.

mod html;
mod http;

use std::future::Future;

use crate::error::FetchError;

pub use http::HttpFetcher;

/// Source of raw listing blocks, one text block per listed dog.
pub trait Fetcher {
  /// Fetch the current listing. An empty list is a valid result.
  fn fetch(&mut self) -> impl Future<Output = Result<Vec<String>, FetchError>>;
}
