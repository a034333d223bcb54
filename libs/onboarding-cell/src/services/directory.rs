use serde_json::Value;
use uuid::Uuid;

use shared_database::SupabaseClient;

use crate::models::{Hospital, OnboardingError};

/// Escape LIKE metacharacters so `ilike` behaves as case-insensitive equality.
fn like_literal(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '%' | '_' | '*') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

pub async fn find_hospital(
    supabase: &SupabaseClient,
    hospital_id: Uuid,
) -> Result<Option<Hospital>, OnboardingError> {
    let path = format!("/rest/v1/hospitals?id=eq.{}", hospital_id);
    Ok(supabase.select_one(&path).await?)
}

pub async fn hospital_name_taken(supabase: &SupabaseClient, name: &str) -> Result<bool, OnboardingError> {
    let path = format!(
        "/rest/v1/hospitals?name=ilike.{}&select=id&limit=1",
        urlencoding::encode(&like_literal(name))
    );
    Ok(supabase.select_one::<Value>(&path).await?.is_some())
}

pub async fn email_taken(supabase: &SupabaseClient, email: &str) -> Result<bool, OnboardingError> {
    let path = format!(
        "/rest/v1/users?email=eq.{}&select=id&limit=1",
        urlencoding::encode(email)
    );
    Ok(supabase.select_one::<Value>(&path).await?.is_some())
}

#[cfg(test)]
mod tests {
    use super::like_literal;

    #[test]
    fn wildcards_are_escaped() {
        assert_eq!(like_literal("St. Mary_s 100%"), "St. Mary\\_s 100\\%");
        assert_eq!(like_literal("Apollo"), "Apollo");
    }
}
