pub mod cmd_bundle;
pub mod cmd_check;
pub mod cmd_inspect;
pub mod cmd_render;
pub mod common;
