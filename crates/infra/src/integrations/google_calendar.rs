//! Google Calendar event source

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use notifier_core::{CalendarSource, Clock, SystemClock};
use notifier_domain::config::CalendarConfig;
use notifier_domain::{CalendarEvent, NotifierError, Result};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, instrument, warn};
use url::Url;

use super::error::{FetchError, FetchResult};
use super::github::parse_base;
use super::retry::RetryPolicy;

/// [`CalendarSource`] reading upcoming events of several Google calendars.
///
/// Only events with a `start.dateTime` are kept; all-day events carry a bare
/// date and never produce a reminder.
#[derive(Clone)]
pub struct GoogleCalendarSource {
    client: Client,
    api_base: Url,
    calendar_ids: Vec<String>,
    max_results: u32,
    access_token: Option<String>,
    fetch_timeout: Duration,
    retry: RetryPolicy,
    clock: Arc<dyn Clock>,
}

impl GoogleCalendarSource {
    /// # Errors
    /// [`FetchError::InvalidUrl`] for a bad `api_base`, [`FetchError::Network`]
    /// if the HTTP client cannot be built.
    pub fn new(config: &CalendarConfig) -> FetchResult<Self> {
        let client = Client::builder()
            .timeout(config.fetch_timeout())
            .build()
            .map_err(FetchError::Network)?;

        if config.access_token.is_none() {
            warn!("No Google access token configured; calendar requests will be rejected");
        }

        Ok(Self {
            client,
            api_base: parse_base(&config.api_base)?,
            calendar_ids: config.calendar_ids.clone(),
            max_results: config.max_results,
            access_token: config.access_token.clone(),
            fetch_timeout: config.fetch_timeout(),
            retry: RetryPolicy::default(),
            clock: Arc::new(SystemClock),
        })
    }

    /// Replace the clock used for `timeMin`.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replace the per-request retry policy.
    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Future events of all calendars, merged and sorted by start.
    #[instrument(skip(self), fields(calendars = self.calendar_ids.len()))]
    pub async fn upcoming_events(&self) -> FetchResult<Vec<CalendarEvent>> {
        let time_min = self.clock.now().to_rfc3339_opts(SecondsFormat::Secs, true);

        let mut events = Vec::new();
        for calendar_id in &self.calendar_ids {
            let items = self.list_events(calendar_id, &time_min).await?;
            let before = events.len();
            events.extend(items.into_iter().filter_map(into_calendar_event));
            debug!(calendar_id, count = events.len() - before, "Calendar events fetched");
        }

        events.sort_by_key(|event| event.start);
        Ok(events)
    }

    async fn list_events(&self, calendar_id: &str, time_min: &str) -> FetchResult<Vec<Map<String, Value>>> {
        let mut url = self.api_base.clone();
        url.path_segments_mut()
            .map_err(|()| FetchError::InvalidUrl(self.api_base.to_string()))?
            .pop_if_empty()
            .extend(["calendars", calendar_id, "events"]);

        self.retry.run(calendar_id, || self.request_events(&url, time_min)).await
    }

    async fn request_events(&self, url: &Url, time_min: &str) -> FetchResult<Vec<Map<String, Value>>> {
        let max_results = self.max_results.to_string();
        let mut request = self.client.get(url.clone()).query(&[
            ("timeMin", time_min),
            ("singleEvents", "true"),
            ("orderBy", "startTime"),
            ("maxResults", max_results.as_str()),
        ]);
        if let Some(token) = &self.access_token {
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

        let body: EventsResponse =
            response.json().await.map_err(|err| FetchError::Decode(format!("{url}: {err}")))?;
        Ok(body.items)
    }
}

#[async_trait]
impl CalendarSource for GoogleCalendarSource {
    async fn fetch_upcoming_events(&self) -> Result<Vec<CalendarEvent>> {
        self.upcoming_events().await.map_err(NotifierError::from)
    }
}

#[derive(Debug, Deserialize)]
struct EventsResponse {
    #[serde(default)]
    items: Vec<Map<String, Value>>,
}

/// Keeps timed events; the provider payload rides along as `raw`.
fn into_calendar_event(item: Map<String, Value>) -> Option<CalendarEvent> {
    let stamp = item.get("start")?.get("dateTime")?.as_str()?;
    let start = match DateTime::parse_from_rfc3339(stamp) {
        Ok(start) => start.with_timezone(&Utc),
        Err(err) => {
            warn!(stamp, error = %err, "Skipping event with unparseable start");
            return None;
        }
    };
    let summary = item.get("summary").and_then(Value::as_str).unwrap_or("(no title)").to_string();

    Some(CalendarEvent { start, summary, raw: item })
}
