use sha2::{Digest, Sha256};
use url::Url;

/// Storage namespace for a watched listing.
///
/// Derived from the target URL so one cache file can serve several targets
/// without mixing their histories.
pub fn cache_namespace(target: &Url) -> String {
  // Url already lowercases scheme and host; the path stays case-sensitive
  let mut normalized = target.clone();
  normalized.set_fragment(None);
  let input = normalized.as_str().trim_end_matches('/');

  // SHA256 hash for stable, fixed-length keys
  let mut hasher = Sha256::new();
  hasher.update(input.as_bytes());
  hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
  use super::*;

  fn url(s: &str) -> Url {
    Url::parse(s).unwrap()
  }

  #[test]
  fn test_namespace_is_fixed_length_hex() {
    let ns = cache_namespace(&url("http://dpsrescue.org/adopt/available/"));
    assert_eq!(ns.len(), 64);
    assert!(ns.chars().all(|c| c.is_ascii_hexdigit()));
  }

  #[test]
  fn test_trailing_slash_and_fragment_ignored() {
    assert_eq!(
      cache_namespace(&url("http://dpsrescue.org/adopt/available/")),
      cache_namespace(&url("http://dpsrescue.org/adopt/available#dogs")),
    );
  }

  #[test]
  fn test_host_case_ignored_path_case_kept() {
    assert_eq!(
      cache_namespace(&url("HTTP://DPSRescue.org/adopt/available/")),
      cache_namespace(&url("http://dpsrescue.org/adopt/available/")),
    );
    assert_ne!(
      cache_namespace(&url("http://dpsrescue.org/Adopt/Available/")),
      cache_namespace(&url("http://dpsrescue.org/adopt/available/")),
    );
  }

  #[test]
  fn test_different_targets_differ() {
    assert_ne!(
      cache_namespace(&url("http://dpsrescue.org/adopt/available/")),
      cache_namespace(&url("http://dpsrescue.org/adopt/pending/")),
    );
  }
}
