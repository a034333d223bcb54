use std::sync::Arc;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeZone, Utc};
use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::SupabaseClient;

use crate::models::{AppointmentError, AvailableSlots, SlotView};
use crate::services::directory::find_doctor;

/// Half-hour starts in the morning (09:00-11:30) and afternoon (14:00-16:30)
/// sessions, local wall-clock time.
pub fn daily_slot_times() -> Vec<NaiveTime> {
    [(9, 12), (14, 17)]
        .iter()
        .flat_map(|&(from, to)| {
            (from..to).flat_map(|hour| {
                [0, 30]
                    .into_iter()
                    .filter_map(move |minute| NaiveTime::from_hms_opt(hour, minute, 0))
            })
        })
        .collect()
}

/// Slots still bookable on `date` given the local time `now`. Past dates have
/// none; today's slots at or before `now` are dropped.
pub fn slots_for_date(date: NaiveDate, now: NaiveDateTime) -> Vec<NaiveTime> {
    let today = now.date();
    if date < today {
        return Vec::new();
    }

    daily_slot_times()
        .into_iter()
        .filter(|time| date > today || *time > now.time())
        .collect()
}

pub fn business_offset(config: &AppConfig) -> FixedOffset {
    FixedOffset::east_opt(config.business_utc_offset_minutes * 60)
        .unwrap_or_else(|| Utc.fix())
}

/// Convert a local wall-clock slot into an instant.
pub fn slot_start(date: NaiveDate, time: NaiveTime, offset: FixedOffset) -> Option<DateTime<Utc>> {
    offset
        .from_local_datetime(&date.and_time(time))
        .single()
        .map(|local| local.with_timezone(&Utc))
}

pub struct SlotService {
    config: Arc<AppConfig>,
    supabase: Arc<SupabaseClient>,
}

impl SlotService {
    pub fn new(config: Arc<AppConfig>, supabase: Arc<SupabaseClient>) -> Self {
        Self { config, supabase }
    }

    /// Fixed schedule only; existing bookings are not subtracted. The calendar
    /// rejects taken slots at booking time.
    pub async fn available_slots(
        &self,
        doctor_id: Uuid,
        date: NaiveDate,
    ) -> Result<AvailableSlots, AppointmentError> {
        find_doctor(&self.supabase, doctor_id)
            .await?
            .ok_or(AppointmentError::DoctorNotFound)?;

        let offset = business_offset(&self.config);
        let now_local = Utc::now().with_timezone(&offset).naive_local();

        let slots: Vec<SlotView> = slots_for_date(date, now_local)
            .into_iter()
            .filter_map(|time| {
                slot_start(date, time, offset).map(|start| SlotView {
                    time: time.format("%H:%M").to_string(),
                    start,
                })
            })
            .collect();

        debug!("{} slots open for doctor {} on {}", slots.len(), doctor_id, date);

        Ok(AvailableSlots { doctor_id, date, slots })
    }
}
