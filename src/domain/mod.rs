pub mod actions;
pub mod catalog;
pub mod indicators;
pub mod marquee;
pub mod models;
pub mod preview;
pub mod schedule;
pub mod search;
