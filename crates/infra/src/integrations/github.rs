//! GitHub pull-request source
//!
//! Searches the author's open pull requests, then resolves each one to a
//! [`PullState`] from the pull itself, its reviews, the combined commit
//! status and the check runs of the head commit.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use notifier_core::PullSource;
use notifier_domain::config::GithubConfig;
use notifier_domain::{NotifierError, Pull, PullState, Result};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, instrument, warn};
use url::Url;

use super::error::{FetchError, FetchResult};
use super::retry::RetryPolicy;

const USER_AGENT: &str = concat!("notifier/", env!("CARGO_PKG_VERSION"));

/// [`PullSource`] backed by the GitHub REST API.
#[derive(Clone)]
pub struct GitHubPullSource {
    client: Client,
    api_base: Url,
    author: String,
    token: Option<String>,
    fetch_timeout: Duration,
    retry: RetryPolicy,
}

impl GitHubPullSource {
    /// # Errors
    /// [`FetchError::InvalidUrl`] for a bad `api_base`, [`FetchError::Network`]
    /// if the HTTP client cannot be built.
    pub fn new(config: &GithubConfig) -> FetchResult<Self> {
        let api_base = parse_base(&config.api_base)?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(config.fetch_timeout())
            .build()
            .map_err(FetchError::Network)?;

        if config.token.is_none() {
            warn!("No GitHub token configured; requests are unauthenticated");
        }

        Ok(Self {
            client,
            api_base,
            author: config.author.clone(),
            token: config.token.clone(),
            fetch_timeout: config.fetch_timeout(),
            retry: RetryPolicy::default(),
        })
    }

    /// Replace the per-request retry policy.
    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Open pulls of the configured author, most recently updated first.
    #[instrument(skip(self), fields(author = %self.author))]
    pub async fn open_pulls(&self) -> FetchResult<Vec<Pull>> {
        let query = format!("author:{} is:open is:pr", self.author);
        let search: SearchResponse = self
            .get_json(
                self.endpoint("search/issues")?,
                &[("q", query.as_str()), ("sort", "updated"), ("order", "desc")],
            )
            .await?;

        let mut pulls = Vec::with_capacity(search.items.len());
        for item in &search.items {
            pulls.push(self.resolve(item).await?);
        }

        debug!(count = pulls.len(), "Resolved open pulls");
        Ok(pulls)
    }

    async fn resolve(&self, item: &SearchItem) -> FetchResult<Pull> {
        let path = pull_path(&item.url)?;
        let pull: PullResponse = self.get_json(self.endpoint(&path)?, &[]).await?;
        let reviews: Vec<ReviewResponse> =
            self.get_json(self.endpoint(&format!("{path}/reviews"))?, &[]).await?;

        let repo_path = path.split("/pulls/").next().unwrap_or_default();
        let sha = &pull.head.sha;
        let status: CombinedStatusResponse =
            self.get_json(self.endpoint(&format!("{repo_path}/commits/{sha}/status"))?, &[]).await?;
        let checks: CheckRunsResponse = self
            .get_json(self.endpoint(&format!("{repo_path}/commits/{sha}/check-runs"))?, &[])
            .await?;

        let state = derive_state(&pull, &reviews, &status, &checks);
        debug!(url = %pull.html_url, state = %state, "Pull resolved");
        Ok(Pull::new(pull.html_url, state))
    }

    fn endpoint(&self, path: &str) -> FetchResult<Url> {
        self.api_base
            .join(path.trim_start_matches('/'))
            .map_err(|err| FetchError::InvalidUrl(format!("{path}: {err}")))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url, query: &[(&str, &str)]) -> FetchResult<T> {
        self.retry.run(url.path(), || self.request_json(&url, query)).await
    }

    async fn request_json<T: DeserializeOwned>(&self, url: &Url, query: &[(&str, &str)]) -> FetchResult<T> {
        let mut request = self.client.get(url.clone()).query(query);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|err| {
            if err.is_timeout() {
                FetchError::Timeout(self.fetch_timeout)
            } else {
                FetchError::from(err)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::from_status(status, url.as_str()));
        }

        response.json::<T>().await.map_err(|err| FetchError::Decode(format!("{url}: {err}")))
    }
}

#[async_trait]
impl PullSource for GitHubPullSource {
    async fn fetch_open_pulls(&self) -> Result<Vec<Pull>> {
        self.open_pulls().await.map_err(NotifierError::from)
    }
}

/// Parses an API base so relative joins keep its full path.
pub(crate) fn parse_base(base: &str) -> FetchResult<Url> {
    let normalised = if base.ends_with('/') { base.to_string() } else { format!("{base}/") };
    Url::parse(&normalised).map_err(|err| FetchError::InvalidUrl(format!("{base}: {err}")))
}

/// `/repos/{owner}/{repo}/pulls/{number}` for a search item's API url.
fn pull_path(item_url: &str) -> FetchResult<String> {
    let url = Url::parse(item_url).map_err(|err| FetchError::Decode(format!("{item_url}: {err}")))?;
    let segments: Vec<&str> = url.path_segments().map(Iterator::collect).unwrap_or_default();

    match segments.as_slice() {
        [.., owner, repo, _, number] if !owner.is_empty() && !number.is_empty() => {
            Ok(format!("repos/{owner}/{repo}/pulls/{number}"))
        }
        _ => Err(FetchError::Decode(format!("unexpected pull url {item_url}"))),
    }
}

/// Collapse review, status and check data into one panel state.
fn derive_state(
    pull: &PullResponse,
    reviews: &[ReviewResponse],
    status: &CombinedStatusResponse,
    checks: &CheckRunsResponse,
) -> PullState {
    if pull.merged || pull.state != "open" {
        return PullState::Done;
    }

    // Latest decisive review per reviewer; comments do not override a verdict.
    let mut verdicts: HashMap<&str, &str> = HashMap::new();
    for review in reviews {
        if matches!(review.state.as_str(), "APPROVED" | "CHANGES_REQUESTED" | "DISMISSED") {
            let login = review.user.as_ref().map_or("", |user| user.login.as_str());
            verdicts.insert(login, review.state.as_str());
        }
    }
    let changes_requested = verdicts.values().any(|state| *state == "CHANGES_REQUESTED");
    let approved = verdicts.values().any(|state| *state == "APPROVED");

    let status_failed = matches!(status.state.as_str(), "failure" | "error");
    let status_pending = status.total_count > 0 && status.state == "pending";

    let checks_failed = checks.check_runs.iter().any(|run| {
        matches!(
            run.conclusion.as_deref(),
            Some("failure" | "timed_out" | "cancelled" | "action_required")
        )
    });
    let checks_pending = checks.check_runs.iter().any(|run| run.status != "completed");

    if status_failed || checks_failed || changes_requested {
        PullState::Failed
    } else if approved && !status_pending && !checks_pending {
        PullState::Merge
    } else {
        PullState::Pending
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    url: String,
}

#[derive(Debug, Deserialize)]
struct PullResponse {
    html_url: String,
    state: String,
    #[serde(default)]
    merged: bool,
    head: HeadResponse,
}

#[derive(Debug, Deserialize)]
struct HeadResponse {
    sha: String,
}

#[derive(Debug, Deserialize)]
struct ReviewResponse {
    state: String,
    user: Option<UserResponse>,
}

#[derive(Debug, Deserialize)]
struct UserResponse {
    login: String,
}

#[derive(Debug, Default, Deserialize)]
struct CombinedStatusResponse {
    state: String,
    #[serde(default)]
    total_count: u32,
}

#[derive(Debug, Default, Deserialize)]
struct CheckRunsResponse {
    #[serde(default)]
    check_runs: Vec<CheckRunResponse>,
}

#[derive(Debug, Deserialize)]
struct CheckRunResponse {
    status: String,
    conclusion: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_pull() -> PullResponse {
        PullResponse {
            html_url: "https://github.com/acme/widgets/pull/7".into(),
            state: "open".into(),
            merged: false,
            head: HeadResponse { sha: "abc123".into() },
        }
    }

    fn review(login: &str, state: &str) -> ReviewResponse {
        ReviewResponse { state: state.into(), user: Some(UserResponse { login: login.into() }) }
    }

    fn status(state: &str, total_count: u32) -> CombinedStatusResponse {
        CombinedStatusResponse { state: state.into(), total_count }
    }

    fn run(status: &str, conclusion: Option<&str>) -> CheckRunResponse {
        CheckRunResponse { status: status.into(), conclusion: conclusion.map(Into::into) }
    }

    fn checks(runs: Vec<CheckRunResponse>) -> CheckRunsResponse {
        CheckRunsResponse { check_runs: runs }
    }

    #[test]
    fn pull_path_from_issue_url() {
        assert_eq!(
            pull_path("https://api.github.com/repos/acme/widgets/issues/42").unwrap(),
            "repos/acme/widgets/pulls/42"
        );
        assert!(pull_path("https://api.github.com/42").is_err());
    }

    #[test]
    fn merged_or_closed_is_done() {
        let mut pull = open_pull();
        pull.merged = true;
        assert_eq!(derive_state(&pull, &[], &status("success", 1), &checks(vec![])), PullState::Done);

        let mut pull = open_pull();
        pull.state = "closed".into();
        assert_eq!(derive_state(&pull, &[], &status("success", 1), &checks(vec![])), PullState::Done);
    }

    #[test]
    fn failing_checks_or_requested_changes_fail() {
        let pull = open_pull();
        let failing = checks(vec![run("completed", Some("failure"))]);
        assert_eq!(derive_state(&pull, &[], &status("pending", 0), &failing), PullState::Failed);

        assert_eq!(
            derive_state(&pull, &[], &status("error", 2), &checks(vec![])),
            PullState::Failed
        );

        let reviews = [review("alice", "CHANGES_REQUESTED")];
        assert_eq!(
            derive_state(&pull, &reviews, &status("success", 1), &checks(vec![])),
            PullState::Failed
        );
    }

    #[test]
    fn approved_and_green_is_merge() {
        let pull = open_pull();
        let reviews = [review("alice", "CHANGES_REQUESTED"), review("alice", "APPROVED")];
        let green = checks(vec![run("completed", Some("success"))]);

        assert_eq!(derive_state(&pull, &reviews, &status("success", 1), &green), PullState::Merge);
        // No statuses at all reports "pending" with a zero count.
        assert_eq!(derive_state(&pull, &reviews, &status("pending", 0), &green), PullState::Merge);
    }

    #[test]
    fn running_checks_or_missing_approval_stay_pending() {
        let pull = open_pull();
        let reviews = [review("alice", "APPROVED")];
        let running = checks(vec![run("in_progress", None)]);
        assert_eq!(derive_state(&pull, &reviews, &status("success", 1), &running), PullState::Pending);

        let commented = [review("bob", "COMMENTED")];
        assert_eq!(
            derive_state(&pull, &commented, &status("success", 1), &checks(vec![])),
            PullState::Pending
        );
    }
}
