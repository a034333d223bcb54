pub mod directory;
pub mod hospital;
pub mod staff;

pub use hospital::HospitalOnboardingService;
pub use staff::StaffOnboardingService;
