//! The mail app

pub mod admin;
