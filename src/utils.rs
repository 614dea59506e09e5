#![forbid(unsafe_code)]

pub mod config;
pub mod errors;
pub mod pages;
pub mod templates;
pub mod wiki_utils;
