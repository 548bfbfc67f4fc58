// src/utils/mod.rs

pub mod agent;
pub mod csv;
pub mod hash;
pub mod html;
pub mod jwt;
pub mod search;
