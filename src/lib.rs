//! # Character Sheet Telegram Bot
//!
//! A Telegram bot that keeps a role-playing character profile per user, rolls dice
//! expressions, and lets anyone browse a profile's sections through inline buttons
//! that rewrite the same message.

pub mod admission_gate;
pub mod bot;
pub mod config;
pub mod db;
pub mod dice;
pub mod localization;
pub mod menu;
pub mod profile_model;
pub mod profile_parser;
pub mod server;
pub mod transport;
pub mod transport_errors;
