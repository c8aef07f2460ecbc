pub mod gotrue;
pub mod postgrest;
pub mod supabase;

pub use gotrue::GoTrueAuthAdapter;
pub use postgrest::PostgrestJobAdapter;
pub use supabase::SupabaseClient;
