// Copyright 2021-2024 SecureDNA Stiftung (SecureDNA Foundation) <licensing@securedna.org>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Client for the GitHub REST v3 API, covering the endpoints the audit
//! reads. Every request is authenticated, carries the API version header,
//! and is retried with capped backoff when the failure looks transient.

use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use http_client::{ApiResponse, BaseApiClient, HttpError};
use shared_types::github::{BranchProtection, Collaborator, Repository, Team};

use crate::error::Error;
use crate::pagination;
use crate::retry_if::retry_if;

const ACCEPT: &str = "application/vnd.github+json";
const API_VERSION: &str = "2022-11-28";

/// List endpoints ask for the largest page the API allows.
const PER_PAGE: &str = "100";

#[derive(Debug)]
pub struct GithubClient {
    api: BaseApiClient,
    api_root: Url,
    token: String,
}

impl GithubClient {
    pub fn new(
        api: BaseApiClient,
        api_root: &str,
        token: impl Into<String>,
    ) -> Result<Self, Error> {
        let api_root = Url::parse(api_root).map_err(|e| Error::BadApiRoot {
            url: api_root.into(),
            reason: e.to_string(),
        })?;
        if api_root.cannot_be_a_base() {
            return Err(Error::BadApiRoot {
                url: api_root.into(),
                reason: "not a base URL".into(),
            });
        }
        Ok(Self {
            api,
            api_root,
            token: token.into(),
        })
    }

    /// All repositories of the given organization.
    pub async fn org_repos(&self, org: &str) -> Result<Vec<Repository>, Error> {
        self.get_paged(self.endpoint(&["orgs", org, "repos"], &[("per_page", PER_PAGE)]))
            .await
    }

    /// The protection configuration of a branch, or `None` if the branch is
    /// not protected (the API reports that as a 404).
    pub async fn branch_protection(
        &self,
        full_name: &str,
        branch: &str,
    ) -> Result<Option<BranchProtection>, Error> {
        let url = self.repo_endpoint(full_name, &["branches", branch, "protection"], &[]);
        match self.get_one(&url).await {
            Ok((protection, _)) => Ok(Some(protection)),
            Err(HttpError::NotFound { .. }) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Collaborators with the given affiliation (`direct`, `outside`, `all`).
    pub async fn collaborators(
        &self,
        full_name: &str,
        affiliation: &str,
    ) -> Result<Vec<Collaborator>, Error> {
        self.get_paged(self.repo_endpoint(
            full_name,
            &["collaborators"],
            &[("affiliation", affiliation), ("per_page", PER_PAGE)],
        ))
        .await
    }

    /// Teams with access to the repository.
    pub async fn teams(&self, full_name: &str) -> Result<Vec<Team>, Error> {
        self.get_paged(self.repo_endpoint(full_name, &["teams"], &[("per_page", PER_PAGE)]))
            .await
    }

    /// Fetch every page of a list endpoint, following `Link: rel="next"`.
    async fn get_paged<T: DeserializeOwned>(&self, first_url: String) -> Result<Vec<T>, Error> {
        let mut items: Vec<T> = Vec::new();
        let mut next = Some(first_url);
        while let Some(url) = next {
            let (page, response): (Vec<T>, _) = self.get_one(&url).await?;
            debug!("github_client: {url} returned {} items", page.len());
            items.extend(page);
            next = response.header("link").and_then(pagination::next_url);
        }
        Ok(items)
    }

    async fn get_one<T: DeserializeOwned>(
        &self,
        url: &str,
    ) -> Result<(T, ApiResponse), HttpError> {
        let headers = self.request_headers();
        retry_if(
            || self.api.json_get_with_response(url, &headers),
            |e: &HttpError| e.is_retriable(),
        )
        .await
    }

    fn request_headers(&self) -> Vec<(String, String)> {
        vec![
            ("Authorization".into(), format!("Bearer {}", self.token)),
            ("Accept".into(), ACCEPT.into()),
            ("X-GitHub-Api-Version".into(), API_VERSION.into()),
        ]
    }

    /// `/repos/{owner}/{repo}/...`. The owner and repo land in separate path
    /// segments; anything after them (branch names in particular, which may
    /// contain `/`) is percent-encoded into a single segment.
    fn repo_endpoint(&self, full_name: &str, rest: &[&str], query: &[(&str, &str)]) -> String {
        let mut segments = vec!["repos"];
        match full_name.split_once('/') {
            Some((owner, repo)) => {
                segments.push(owner);
                segments.push(repo);
            }
            None => segments.push(full_name),
        }
        segments.extend(rest);
        self.endpoint(&segments, query)
    }

    fn endpoint(&self, segments: &[&str], query: &[(&str, &str)]) -> String {
        let mut url = self.api_root.clone();
        url.path_segments_mut()
            .expect("api root validated in GithubClient::new")
            .pop_if_empty()
            .extend(segments);
        for (k, v) in query {
            url.query_pairs_mut().append_pair(k, v);
        }
        url.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::{Arc, Mutex};

    use futures::FutureExt;

    use http_client::test_utils::{json_response, ApiClientCoreMock};

    fn client_with_mock(mock: ApiClientCoreMock) -> GithubClient {
        GithubClient::new(BaseApiClient::from(mock), "https://api.github.example", "x-token")
            .unwrap()
    }

    #[tokio::test]
    async fn org_repos_follows_link_pagination() {
        let calls: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
        let recorded = calls.clone();
        let mock = ApiClientCoreMock::from(move |url: String, headers: Vec<(String, String)>| {
            let calls = recorded.clone();
            async move {
                assert!(headers
                    .iter()
                    .any(|(k, v)| k == "Authorization" && v == "Bearer x-token"));
                calls.lock().unwrap().push(url.clone());
                if url.contains("page=2") {
                    Ok(json_response(
                        r#"[{"full_name": "acme/camera", "default_branch": "main"}]"#,
                        &[],
                    ))
                } else {
                    Ok(json_response(
                        r#"[{"full_name": "acme/anvil", "default_branch": "main"},
                            {"full_name": "acme/rocket", "default_branch": "trunk"}]"#,
                        &[(
                            "Link",
                            "<https://api.github.example/orgs/acme/repos?per_page=100&page=2>; rel=\"next\"",
                        )],
                    ))
                }
            }
            .boxed()
        });

        let repos = client_with_mock(mock).org_repos("acme").await.unwrap();
        assert_eq!(
            repos.iter().map(|r| r.full_name.as_str()).collect::<Vec<_>>(),
            ["acme/anvil", "acme/rocket", "acme/camera"]
        );
        assert_eq!(calls.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn unprotected_branch_is_none() {
        let mock = ApiClientCoreMock::from(|url: String, _headers| {
            async move { Err(HttpError::NotFound { url }) }.boxed()
        });
        let protection = client_with_mock(mock)
            .branch_protection("acme/anvil", "main")
            .await
            .unwrap();
        assert!(protection.is_none());
    }

    #[tokio::test]
    async fn branch_names_are_encoded_into_one_segment() {
        let calls: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
        let recorded = calls.clone();
        let mock = ApiClientCoreMock::from(move |url: String, _headers| {
            let calls = recorded.clone();
            async move {
                calls.lock().unwrap().push(url);
                Ok(json_response(r#"{"enforce_admins": {"enabled": true}}"#, &[]))
            }
            .boxed()
        });

        client_with_mock(mock)
            .branch_protection("acme/anvil", "release/1.0")
            .await
            .unwrap();

        let calls = calls.lock().unwrap();
        assert_eq!(
            calls[0],
            "https://api.github.example/repos/acme/anvil/branches/release%2F1.0/protection"
        );
    }

    #[tokio::test]
    async fn non_404_errors_are_not_swallowed() {
        let mock = ApiClientCoreMock::from(|url: String, _headers| {
            async move {
                Err(HttpError::RequestError {
                    ctx: format!("requesting {url}"),
                    status: Some(401),
                    retriable: false,
                    source: "401 Unauthorized: bad credentials".into(),
                })
            }
            .boxed()
        });
        let err = client_with_mock(mock)
            .branch_protection("acme/anvil", "main")
            .await
            .unwrap_err();
        assert!(!err.is_not_found());
    }

    #[test]
    fn rejects_unusable_api_root() {
        let mock = ApiClientCoreMock::from(|_url, _headers| {
            async { Err(HttpError::NotFound { url: "unused".into() }) }.boxed()
        });
        let err = GithubClient::new(BaseApiClient::from(mock), "data:text/plain,nope", "t")
            .unwrap_err();
        assert!(matches!(err, Error::BadApiRoot { .. }));
    }
}
