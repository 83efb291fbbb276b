// Service exports
pub mod cache;
pub mod memory;
pub mod store;
pub mod supabase;

pub use cache::{CacheError, CacheKey, CacheManager, CacheStats};
pub use memory::MemoryStore;
pub use store::{AuthGateway, DataStore, StoreError};
pub use supabase::{SupabaseClient, SupabaseTables};
