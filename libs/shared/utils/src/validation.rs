use std::sync::OnceLock;

use regex::Regex;

fn indian_phone_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\+91[0-9]{10}$").expect("static phone regex"))
}

fn otp_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[0-9]{4}$").expect("static otp regex"))
}

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9-]+(\.[A-Za-z0-9-]+)+$").expect("static email regex")
    })
}

/// `+91` followed by exactly ten ASCII digits. `\d` would also admit other
/// scripts' digits, which the SMS gateway rejects.
pub fn is_valid_indian_phone(phone: &str) -> bool {
    indian_phone_regex().is_match(phone)
}

pub fn is_valid_otp_code(code: &str) -> bool {
    otp_regex().is_match(code)
}

pub fn is_valid_email(email: &str) -> bool {
    email_regex().is_match(email)
}
