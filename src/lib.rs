// src/lib.rs

pub mod constants;
pub mod database;
pub mod error;
pub mod importer;
pub mod models;
pub mod progress;
pub mod repository;
pub mod roadmaps;

pub use error::{Error, Result};
