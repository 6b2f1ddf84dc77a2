// Copyright AGNTCY Contributors (https://github.com/agntcy)
// SPDX-License-Identifier: Apache-2.0

//! HTTP header to gRPC metadata forwarding.

use http::{HeaderMap, HeaderName};
use tonic::metadata::MetadataMap;
use tracing::debug;

use crate::errors::GatewayError;

/// Names of the HTTP headers allowed through to the backend.
///
/// Names are normalized to lowercase, so matching is case-insensitive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllowList {
    names: Vec<HeaderName>,
}

impl AllowList {
    /// Build the list. Binary (`-bin`) and reserved (`grpc-`) metadata
    /// names are refused, as are names that are not valid header names.
    pub fn new<S: AsRef<str>>(names: &[S]) -> Result<Self, GatewayError> {
        let mut list = Vec::with_capacity(names.len());

        for name in names {
            let raw = name.as_ref().trim();
            let header = HeaderName::from_bytes(raw.as_bytes())
                .map_err(|_| GatewayError::InvalidHeader(raw.to_string()))?;

            let lower = header.as_str();
            if lower.ends_with("-bin") || lower.starts_with("grpc-") {
                return Err(GatewayError::InvalidHeader(raw.to_string()));
            }

            if !list.contains(&header) {
                list.push(header);
            }
        }

        Ok(Self { names: list })
    }

    pub fn contains(&self, name: &HeaderName) -> bool {
        self.names.contains(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &HeaderName> {
        self.names.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Copy the allow-listed entries of `headers` into gRPC metadata. Repeated
/// headers keep all their values, in order. Everything else is dropped.
pub fn forward_headers(headers: &HeaderMap, allow_list: &AllowList) -> MetadataMap {
    let mut forwarded = HeaderMap::new();

    for name in allow_list.iter() {
        for value in headers.get_all(name) {
            forwarded.append(name.clone(), value.clone());
        }
    }

    if !forwarded.is_empty() {
        let names: Vec<&str> = forwarded.keys().map(HeaderName::as_str).collect();
        debug!(?names, "forwarding headers");
    }

    MetadataMap::from_headers(forwarded)
}

#[cfg(test)]
mod tests {
    use http::HeaderValue;

    use super::*;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for &(name, value) in pairs {
            map.append(name, HeaderValue::from_static(value));
        }
        map
    }

    #[test]
    fn test_allow_list() {
        let list = AllowList::new(&["Login", " password ", "login"]).unwrap();
        assert_eq!(list.iter().count(), 2);
        assert!(list.contains(&HeaderName::from_static("login")));
        assert!(list.contains(&HeaderName::from_static("password")));

        assert!(AllowList::new::<&str>(&[]).unwrap().is_empty());
        assert!(matches!(
            AllowList::new(&["not a header"]),
            Err(GatewayError::InvalidHeader(_))
        ));
        assert!(matches!(
            AllowList::new(&["token-bin"]),
            Err(GatewayError::InvalidHeader(_))
        ));
        assert!(matches!(
            AllowList::new(&["grpc-timeout"]),
            Err(GatewayError::InvalidHeader(_))
        ));
    }

    #[test]
    fn test_only_allowed_headers_are_forwarded() {
        let list = AllowList::new(&["login", "password"]).unwrap();
        let headers = headers(&[
            ("login", "john"),
            ("password", "doe"),
            ("authorization", "Bearer abc"),
            ("cookie", "session=1"),
            ("x-request-id", "7"),
        ]);

        let metadata = forward_headers(&headers, &list);
        assert_eq!(metadata.len(), 2);
        assert_eq!(metadata.get("login").unwrap().to_str().unwrap(), "john");
        assert_eq!(metadata.get("password").unwrap().to_str().unwrap(), "doe");
        assert!(metadata.get("authorization").is_none());
        assert!(metadata.get("cookie").is_none());
    }

    #[test]
    fn test_matching_ignores_case() {
        let list = AllowList::new(&["LOGIN"]).unwrap();

        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_bytes(b"Login").unwrap(),
            HeaderValue::from_static("john"),
        );

        let metadata = forward_headers(&headers, &list);
        assert_eq!(metadata.get("login").unwrap().to_str().unwrap(), "john");
    }

    #[test]
    fn test_repeated_values_are_kept_in_order() {
        let list = AllowList::new(&["login"]).unwrap();
        let headers = headers(&[("login", "jo"), ("login", "hn")]);

        let metadata = forward_headers(&headers, &list);
        let values: Vec<_> = metadata
            .get_all("login")
            .iter()
            .map(|v| v.to_str().unwrap().to_string())
            .collect();
        assert_eq!(values, vec!["jo", "hn"]);
    }

    #[test]
    fn test_empty_allow_list_forwards_nothing() {
        let headers = headers(&[("login", "john"), ("password", "doe")]);
        assert!(forward_headers(&headers, &AllowList::default()).is_empty());
    }
}
