pub mod admin_guard;
pub mod cookies;
