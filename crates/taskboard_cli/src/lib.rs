pub mod cli;
pub mod event_loop;
pub mod logging;
pub mod render;
