// src/models/mod.rs

pub mod attempt;
pub mod classroom;
pub mod profile;
pub mod question;
pub mod user;
