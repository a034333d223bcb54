pub mod supabase;

pub use supabase::{postgrest_error, PostgrestError, SupabaseClient};
