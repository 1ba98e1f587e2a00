//! REST adapter for the calendar collaborator.
//!
//! Inserts events into a single default calendar. Start and end are
//! rendered in the host's local timezone (RFC 3339); no other timezone
//! logic lives here. The audio file's content hash travels along as a
//! stable `iCalUID` so a retried insert de-duplicates provider-side.

use async_trait::async_trait;
use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
use serde::{Deserialize, Serialize};

use super::{Calendar, CalendarError};
use crate::config::CalendarConfig;
use crate::domain::EventRequest;

/// Calendar REST client
pub struct CalendarApiClient {
    endpoint: String,
    calendar_id: String,
    token: String,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InsertEventRequest {
    summary: String,
    description: String,
    start: EventInstant,
    end: EventInstant,
    #[serde(rename = "iCalUID")]
    i_cal_uid: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EventInstant {
    date_time: String,
}

#[derive(Debug, Deserialize)]
struct InsertEventResponse {
    id: String,
}

impl CalendarApiClient {
    pub fn new(config: &CalendarConfig) -> Self {
        Self {
            endpoint: config.endpoint.clone(),
            calendar_id: config.calendar_id.clone(),
            token: config.token.clone(),
            client: reqwest::Client::new(),
        }
    }

    fn events_url(&self) -> String {
        format!("{}/calendars/{}/events", self.endpoint, self.calendar_id)
    }

    /// Interpret a naive instant in the host's local timezone.
    fn to_local(instant: NaiveDateTime) -> Result<DateTime<Local>, CalendarError> {
        Local
            .from_local_datetime(&instant)
            .earliest()
            .ok_or(CalendarError::InvalidLocalTime(instant))
    }
}

#[async_trait]
impl Calendar for CalendarApiClient {
    fn name(&self) -> &str {
        "calendar-api"
    }

    async fn create_event(&self, request: &EventRequest) -> Result<String, CalendarError> {
        let body = InsertEventRequest {
            summary: request.summary.clone(),
            description: request.description.clone(),
            start: EventInstant {
                date_time: Self::to_local(request.start)?.to_rfc3339(),
            },
            end: EventInstant {
                date_time: Self::to_local(request.end)?.to_rfc3339(),
            },
            i_cal_uid: format!("{}@agendavoz", request.idempotency_key),
        };

        let response = self
            .client
            .post(self.events_url())
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(CalendarError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let created: InsertEventResponse = response
            .json()
            .await
            .map_err(CalendarError::Http)?;

        Ok(created.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn test_client() -> CalendarApiClient {
        CalendarApiClient::new(&CalendarConfig {
            endpoint: "https://calendar.example.com".to_string(),
            calendar_id: "primary".to_string(),
            token: "TOKEN".to_string(),
        })
    }

    #[test]
    fn events_url_targets_default_calendar() {
        assert_eq!(
            test_client().events_url(),
            "https://calendar.example.com/calendars/primary/events"
        );
    }

    #[test]
    fn local_rendering_keeps_wall_clock() {
        let naive = NaiveDate::from_ymd_opt(2025, 5, 10)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        let local = CalendarApiClient::to_local(naive).unwrap();
        assert_eq!(local.naive_local(), naive);
    }

    #[test]
    fn insert_body_carries_ical_uid() {
        let body = InsertEventRequest {
            summary: "s".to_string(),
            description: "d".to_string(),
            start: EventInstant {
                date_time: "2025-05-10T09:00:00-03:00".to_string(),
            },
            end: EventInstant {
                date_time: "2025-05-10T10:00:00-03:00".to_string(),
            },
            i_cal_uid: "abc123def456@agendavoz".to_string(),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["iCalUID"], "abc123def456@agendavoz");
        assert_eq!(json["start"]["dateTime"], "2025-05-10T09:00:00-03:00");
    }
}
