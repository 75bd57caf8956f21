// src/survey/mod.rs

pub mod catalog;
pub mod controller;
pub mod renderer;
pub mod store;
