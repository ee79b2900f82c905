pub mod auth;
pub mod binding;
pub mod dao;
pub mod dooray;
pub mod recent;

pub use auth::AuthService;
pub use binding::{ResolveError, ResolvedBinding, TokenResolver};
pub use dao::*;
pub use recent::{RecentError, RecentFileRing};
