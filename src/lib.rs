pub mod config;
pub mod host;
pub mod logging;
pub mod model;
pub mod plan;
pub mod protocol;
pub mod todo;
pub mod trace;
pub mod transport;
pub mod tui;

mod tui_shell;
