// src/handlers/mod.rs

pub mod access;
pub mod admin;
pub mod attendee;
pub mod auth;
pub mod catalog;
pub mod curriculum;
pub mod enrollment;
pub mod insight;
pub mod lesson;
pub mod manage;
pub mod quiz;
pub mod report;
