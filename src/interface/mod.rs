pub mod debug_cli;
pub mod debug_display;
