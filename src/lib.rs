// src/lib.rs

//! sitescope crawler library

pub mod analysis;
pub mod crawl;
pub mod error;
pub mod models;
pub mod services;
pub mod storage;
pub mod utils;
