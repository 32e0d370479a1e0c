pub mod archive;
pub mod auth;
pub mod supabase;

pub use auth::TokenVerifier;
pub use supabase::SupabaseClient;
