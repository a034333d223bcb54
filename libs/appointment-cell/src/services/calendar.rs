use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, error, info};

use shared_config::AppConfig;

/// Marker stored in booking metadata so reconciliation only touches bookings
/// this API created.
pub const BOOKING_SOURCE: &str = "carelink-api";

#[derive(Error, Debug)]
pub enum CalendarError {
    #[error("Cal.com is not configured")]
    NotConfigured,

    #[error("No Cal.com event type is configured for this doctor")]
    NoEventType,

    #[error("Cal.com API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Cal.com request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Unexpected Cal.com response: {0}")]
    Decode(String),
}

#[derive(Debug, Clone, Serialize)]
pub struct Attendee {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone)]
pub struct NewBooking {
    pub event_type_id: i64,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub attendee: Attendee,
    pub title: String,
    pub notes: Option<String>,
    pub metadata: HashMap<String, String>,
}

/// The parts of a Cal.com booking this service reads. The full payload is
/// kept alongside for auditing.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalBooking {
    pub id: i64,
    pub uid: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: Option<String>,
    #[serde(default)]
    pub metadata: Option<Value>,
    pub location: Option<String>,
    #[serde(skip)]
    pub raw: Value,
}

impl CalBooking {
    fn from_value(value: Value) -> Result<Self, CalendarError> {
        let mut booking: CalBooking =
            serde_json::from_value(value.clone()).map_err(|e| CalendarError::Decode(e.to_string()))?;
        booking.raw = value;
        Ok(booking)
    }

    pub fn metadata_str(&self, key: &str) -> Option<&str> {
        self.metadata.as_ref()?.get(key)?.as_str()
    }

    /// Video link when the event type has a conferencing location.
    pub fn meeting_link(&self) -> Option<String> {
        self.metadata_str("videoCallUrl")
            .map(str::to_string)
            .or_else(|| self.location.clone().filter(|l| l.starts_with("http")))
    }

    pub fn is_cancelled(&self) -> bool {
        self.status
            .as_deref()
            .map(|s| s.eq_ignore_ascii_case("cancelled") || s.eq_ignore_ascii_case("rejected"))
            .unwrap_or(false)
    }
}

/// External calendar the booking workflow mirrors appointments into.
#[async_trait]
pub trait CalendarProvider: Send + Sync {
    /// Whether the exact `[start, end)` slot is bookable for the event type.
    async fn check_availability(
        &self,
        event_type_id: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<bool, CalendarError>;

    async fn create_booking(&self, booking: &NewBooking) -> Result<CalBooking, CalendarError>;

    async fn cancel_booking(&self, booking_id: i64, reason: &str) -> Result<(), CalendarError>;

    /// Bookings visible to the API key, newest first as returned by Cal.com.
    async fn list_bookings(&self) -> Result<Vec<CalBooking>, CalendarError>;

    fn default_event_type_id(&self) -> Option<i64>;
}

#[derive(Debug, Deserialize)]
struct SlotEntry {
    time: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct SlotsResponse {
    #[serde(default)]
    slots: HashMap<String, Vec<SlotEntry>>,
}

#[derive(Debug, Deserialize)]
struct BookingsResponse {
    #[serde(default)]
    bookings: Vec<Value>,
}

/// Cal.com v1 REST client. Authenticates with the `apiKey` query parameter.
pub struct CalComClient {
    client: Client,
    base_url: String,
    api_key: String,
    default_event_type_id: Option<i64>,
    configured: bool,
}

impl CalComClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.cal_com_base_url.trim_end_matches('/').to_string(),
            api_key: config.cal_com_api_key.clone(),
            default_event_type_id: config.cal_com_default_event_type_id,
            configured: config.is_calendar_configured(),
        }
    }

    fn ensure_configured(&self) -> Result<(), CalendarError> {
        if self.configured {
            Ok(())
        } else {
            Err(CalendarError::NotConfigured)
        }
    }

    async fn read_body(response: reqwest::Response, operation: &str) -> Result<String, CalendarError> {
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            error!("Cal.com {} failed: {} - {}", operation, status, text);
            return Err(CalendarError::Api {
                status: status.as_u16(),
                message: text,
            });
        }

        debug!("Cal.com {} response: {}", operation, text);
        Ok(text)
    }
}

#[async_trait]
impl CalendarProvider for CalComClient {
    /// GET /slots
    async fn check_availability(
        &self,
        event_type_id: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<bool, CalendarError> {
        self.ensure_configured()?;

        let url = format!("{}/slots", self.base_url);
        let event_type = event_type_id.to_string();
        let start_param = start.to_rfc3339();
        let end_param = end.to_rfc3339();

        let response = self
            .client
            .get(&url)
            .query(&[
                ("apiKey", self.api_key.as_str()),
                ("eventTypeId", event_type.as_str()),
                ("startTime", start_param.as_str()),
                ("endTime", end_param.as_str()),
                ("timeZone", "UTC"),
            ])
            .send()
            .await?;

        let text = Self::read_body(response, "slot lookup").await?;
        let slots: SlotsResponse =
            serde_json::from_str(&text).map_err(|e| CalendarError::Decode(e.to_string()))?;

        Ok(slots.slots.values().flatten().any(|slot| slot.time == start))
    }

    /// POST /bookings
    async fn create_booking(&self, booking: &NewBooking) -> Result<CalBooking, CalendarError> {
        self.ensure_configured()?;

        let url = format!("{}/bookings", self.base_url);
        let body = json!({
            "eventTypeId": booking.event_type_id,
            "start": booking.start.to_rfc3339(),
            "end": booking.end.to_rfc3339(),
            "responses": {
                "name": booking.attendee.name,
                "email": booking.attendee.email,
                "notes": booking.notes
            },
            "title": booking.title,
            "timeZone": "UTC",
            "language": "en",
            "metadata": booking.metadata
        });

        let response = self
            .client
            .post(&url)
            .query(&[("apiKey", self.api_key.as_str())])
            .json(&body)
            .send()
            .await?;

        let text = Self::read_body(response, "booking").await?;
        let value: Value = serde_json::from_str(&text).map_err(|e| CalendarError::Decode(e.to_string()))?;
        let created = CalBooking::from_value(value)?;

        info!("Cal.com booking {} ({}) created", created.id, created.uid);
        Ok(created)
    }

    /// DELETE /bookings/{id}/cancel
    async fn cancel_booking(&self, booking_id: i64, reason: &str) -> Result<(), CalendarError> {
        self.ensure_configured()?;

        let url = format!("{}/bookings/{}/cancel", self.base_url, booking_id);
        let response = self
            .client
            .delete(&url)
            .query(&[("apiKey", self.api_key.as_str()), ("cancellationReason", reason)])
            .send()
            .await?;

        Self::read_body(response, "cancellation").await?;
        info!("Cal.com booking {} cancelled", booking_id);
        Ok(())
    }

    /// GET /bookings
    async fn list_bookings(&self) -> Result<Vec<CalBooking>, CalendarError> {
        self.ensure_configured()?;

        let url = format!("{}/bookings", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("apiKey", self.api_key.as_str())])
            .send()
            .await?;

        let text = Self::read_body(response, "booking list").await?;
        let listed: BookingsResponse =
            serde_json::from_str(&text).map_err(|e| CalendarError::Decode(e.to_string()))?;

        listed.bookings.into_iter().map(CalBooking::from_value).collect()
    }

    fn default_event_type_id(&self) -> Option<i64> {
        self.default_event_type_id
    }
}
