use std::sync::Arc;

use shared_config::AppConfig;
use shared_database::SupabaseClient;

use crate::services::{AppointmentBookingService, AppointmentService, CalendarProvider, SlotService};

pub struct AppointmentState {
    pub config: Arc<AppConfig>,
    pub supabase: Arc<SupabaseClient>,
    pub calendar: Arc<dyn CalendarProvider>,
}

impl AppointmentState {
    pub fn new(
        config: Arc<AppConfig>,
        supabase: Arc<SupabaseClient>,
        calendar: Arc<dyn CalendarProvider>,
    ) -> Self {
        Self { config, supabase, calendar }
    }

    pub fn booking_service(&self) -> AppointmentBookingService {
        AppointmentBookingService::new(self.config.clone(), self.supabase.clone(), self.calendar.clone())
    }

    pub fn appointment_service(&self) -> AppointmentService {
        AppointmentService::new(self.supabase.clone(), self.calendar.clone())
    }

    pub fn slot_service(&self) -> SlotService {
        SlotService::new(self.config.clone(), self.supabase.clone())
    }
}
