pub mod application;
pub mod bot;
pub mod domain;
