#![allow(non_snake_case)]

pub mod config;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod models;
pub mod service;
