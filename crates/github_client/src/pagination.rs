// Copyright 2021-2024 SecureDNA Stiftung (SecureDNA Foundation) <licensing@securedna.org>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! RFC 8288 `Link` header handling, as used by GitHub's paginated list
//! endpoints.

/// Extract the `rel="next"` target from a `Link` header value, if any.
///
/// The header looks like:
/// `<https://api.github.com/...?page=2>; rel="next", <...?page=9>; rel="last"`
pub fn next_url(link_header: &str) -> Option<String> {
    for part in link_header.split(',') {
        let mut segments = part.split(';');
        let target = segments.next()?.trim();
        if !(target.starts_with('<') && target.ends_with('>')) {
            continue;
        }
        let is_next = segments
            .any(|param| matches!(param.trim(), "rel=\"next\"" | "rel=next"));
        if is_next {
            return Some(target[1..target.len() - 1].to_string());
        }
    }
    None
}
