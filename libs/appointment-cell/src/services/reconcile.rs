use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use reqwest::Method;
use serde::Deserialize;
use serde_json::json;
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration as TickInterval};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use shared_database::SupabaseClient;

use crate::models::AppointmentError;
use crate::services::calendar::{CalBooking, CalendarProvider, BOOKING_SOURCE};

/// Bookings younger than this may still be between the remote and local
/// writes and are never treated as orphans.
pub const ORPHAN_GRACE_MINUTES: i64 = 10;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReconcileReport {
    pub examined: usize,
    pub synced: usize,
    pub orphans_cancelled: usize,
    pub orphans_failed: usize,
}

#[derive(Debug, Deserialize)]
struct LocalRef {
    id: Uuid,
    cal_booking_id: Option<i64>,
}

/// What to do with one remote booking.
#[derive(Debug, PartialEq, Eq)]
pub enum Verdict {
    Skip,
    Candidate,
}

pub fn classify(booking: &CalBooking, now: DateTime<Utc>) -> Verdict {
    if booking.metadata_str("source") != Some(BOOKING_SOURCE)
        || booking.metadata_str("appointment_number").is_none()
        || booking.is_cancelled()
    {
        return Verdict::Skip;
    }

    let created = booking
        .metadata_str("created_at")
        .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
        .map(|t| t.with_timezone(&Utc));

    match created {
        Some(created) if now - created < Duration::minutes(ORPHAN_GRACE_MINUTES) => Verdict::Skip,
        _ => Verdict::Candidate,
    }
}

/// Periodically matches Cal.com bookings made by this API against local
/// appointments: orphans are cancelled remotely, matches get `last_synced_at`.
pub struct ReconciliationJob {
    supabase: Arc<SupabaseClient>,
    calendar: Arc<dyn CalendarProvider>,
}

impl ReconciliationJob {
    pub fn new(supabase: Arc<SupabaseClient>, calendar: Arc<dyn CalendarProvider>) -> Self {
        Self { supabase, calendar }
    }

    pub async fn run_once(&self) -> Result<ReconcileReport, AppointmentError> {
        let now = Utc::now();
        let bookings = self.calendar.list_bookings().await?;

        let candidates: Vec<&CalBooking> = bookings
            .iter()
            .filter(|booking| classify(booking, now) == Verdict::Candidate)
            .collect();

        let mut report = ReconcileReport {
            examined: candidates.len(),
            ..ReconcileReport::default()
        };

        if candidates.is_empty() {
            return Ok(report);
        }

        let ids = candidates
            .iter()
            .map(|b| b.id.to_string())
            .collect::<Vec<_>>()
            .join(",");
        let path = format!(
            "/rest/v1/appointments?cal_booking_id=in.({})&select=id,cal_booking_id",
            ids
        );
        let local: Vec<LocalRef> = self.supabase.request(Method::GET, &path, None).await?;

        let mut synced_ids = Vec::new();
        for booking in candidates {
            match local.iter().find(|row| row.cal_booking_id == Some(booking.id)) {
                Some(row) => synced_ids.push(row.id),
                None => {
                    let number = booking.metadata_str("appointment_number").unwrap_or("?");
                    warn!("Cal.com booking {} ({}) has no local appointment", booking.id, number);
                    match self
                        .calendar
                        .cancel_booking(booking.id, "No matching appointment record")
                        .await
                    {
                        Ok(()) => report.orphans_cancelled += 1,
                        Err(e) => {
                            error!("Failed to cancel orphaned booking {}: {}", booking.id, e);
                            report.orphans_failed += 1;
                        }
                    }
                }
            }
        }

        if !synced_ids.is_empty() {
            let ids = synced_ids
                .iter()
                .map(Uuid::to_string)
                .collect::<Vec<_>>()
                .join(",");
            let path = format!("/rest/v1/appointments?id=in.({})", ids);
            let _: serde_json::Value = self
                .supabase
                .request(
                    Method::PATCH,
                    &path,
                    Some(json!({ "last_synced_at": now.to_rfc3339() })),
                )
                .await?;
            report.synced = synced_ids.len();
        }

        Ok(report)
    }

    /// Run forever on a fixed interval. Failures are logged and the next tick
    /// tries again.
    pub fn spawn(self: Arc<Self>, every_secs: u64) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = interval(TickInterval::from_secs(every_secs.max(1)));
            loop {
                ticker.tick().await;

                match self.run_once().await {
                    Ok(report) if report.orphans_cancelled + report.orphans_failed > 0 => {
                        info!("Calendar reconciliation: {:?}", report);
                    }
                    Ok(report) => debug!("Calendar reconciliation: {:?}", report),
                    Err(e) => error!("Calendar reconciliation failed: {}", e),
                }
            }
        })
    }
}
