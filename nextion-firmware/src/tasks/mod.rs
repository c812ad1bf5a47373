//! Embassy async tasks
//!
//! Each task runs independently and communicates via channels.

pub mod app;
pub mod display_rx;

pub use app::app_task;
pub use display_rx::display_rx_task;
