// src/models/mod.rs

pub mod application;
pub mod question;
pub mod session;
pub mod user;
