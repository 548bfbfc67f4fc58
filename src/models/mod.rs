// src/models/mod.rs

pub mod badge;
pub mod course;
pub mod insight;
pub mod lesson;
pub mod question;
pub mod quiz_attempt;
pub mod report;
pub mod user;
