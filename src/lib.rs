//! libapi - REST API for a personal bibliographic catalog
//!
//! Catalog views are built by folding flat joined rows into nested entities;
//! see [`catalog`].

pub mod api;
pub mod app;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod services;

pub use app::{AppState, build_app};
