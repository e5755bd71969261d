pub mod config;
pub mod crud;
pub mod data;
pub mod format;
pub mod image;
pub mod state;
pub mod web;
