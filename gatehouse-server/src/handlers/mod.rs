//! HTTP request handlers organized by functionality

pub mod accounts;
pub mod admin;
pub mod home;
