pub mod credentials;
pub mod otp;
pub mod rate_limit;
pub mod sms;
pub mod staff;

pub use credentials::CredentialService;
pub use otp::OtpService;
pub use rate_limit::OtpRateLimiter;
pub use sms::{SmsError, SmsSender, TwilioSmsClient};
pub use staff::StaffAuthService;
