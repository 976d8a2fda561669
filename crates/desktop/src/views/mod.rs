pub mod log_console;
pub mod map_panel;
pub mod toast;
pub mod video_panel;
