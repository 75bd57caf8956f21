// src/handlers/mod.rs

pub mod admin;
pub mod applications;
pub mod auth;
pub mod survey;
