pub mod api;
pub mod config;
pub mod dto;
pub mod platform;
pub mod vod;
