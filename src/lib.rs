pub mod app;
pub mod checkin;
pub mod core;
pub mod render;
pub mod scan;
pub mod scanner;
