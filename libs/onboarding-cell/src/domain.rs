/// Hospital name as it must appear in staff email domains: lowercased, with
/// each run of whitespace collapsed to a single hyphen.
pub fn hospital_slug(hospital_name: &str) -> String {
    hospital_name
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

/// The email's domain up to its first dot.
pub fn email_domain_prefix(email: &str) -> Option<&str> {
    let (_, domain) = email.trim().rsplit_once('@')?;
    domain.split('.').next().filter(|prefix| !prefix.is_empty())
}

/// Every onboarding path (hospital admin, doctor, pharmacist) requires the
/// new account's email domain prefix to match the hospital name.
pub fn email_matches_hospital(email: &str, hospital_name: &str) -> bool {
    let slug = hospital_slug(hospital_name);
    if slug.is_empty() {
        return false;
    }

    email_domain_prefix(email)
        .map(|prefix| prefix.to_lowercase() == slug)
        .unwrap_or(false)
}
