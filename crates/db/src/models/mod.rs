pub mod api_binding;
pub mod recent_file;
pub mod user;

pub use api_binding::ApiBinding;
pub use recent_file::RecentFile;
pub use user::{IdentityProvider, User};
