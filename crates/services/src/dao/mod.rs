pub mod api_binding;
pub mod base;
pub mod recent_file;
pub mod user;

pub use base::BaseDao;
