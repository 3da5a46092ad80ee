//! Admin dashboard and list-view toolkit for the AntechLearn site.
//!
//! The list pipeline (`listview`, `pager`, `render`, `html`) is usable on its
//! own; `model`, `controller` and `ui` put it into a terminal dashboard.

pub mod app;
pub mod cli;
pub mod client;
pub mod config;
pub mod controller;
pub mod dates;
pub mod dispatch;
pub mod domain;
pub mod export;
pub mod forms;
pub mod html;
pub mod inputter;
pub mod items;
pub mod listview;
pub mod logging;
pub mod model;
pub mod pager;
pub mod render;
pub mod store;
pub mod ui;

#[cfg(test)]
mod tests;
