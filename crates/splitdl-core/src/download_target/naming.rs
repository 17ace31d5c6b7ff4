//! File name derivation and collision avoidance.

use std::path::Path;

use super::full_path_for;

/// Last non-empty path segment of `url`.
///
/// Parses with the `url` crate so query strings and fragments are dropped;
/// input that is not an absolute URL is split on `/` as-is.
pub fn name_from_url(url: &str) -> Option<String> {
    let segment = match url::Url::parse(url) {
        Ok(parsed) => parsed
            .path_segments()
            .and_then(|mut segs| segs.rfind(|s| !s.is_empty()).map(str::to_string)),
        Err(_) => url
            .split('/')
            .rfind(|s| !s.is_empty())
            .map(str::to_string),
    }?;
    if segment == "." || segment == ".." {
        return None;
    }
    Some(segment)
}

/// Returns `original`, or `original-N` for the smallest `N >= 1` such that
/// no file of that name exists in `directory`.
pub fn unique_file_name(directory: Option<&Path>, original: &str) -> String {
    let mut name = original.to_string();
    let mut suffix = 1u64;
    while full_path_for(directory, &name).exists() {
        name = format!("{}-{}", original, suffix);
        suffix += 1;
    }
    name
}
