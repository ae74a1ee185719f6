pub mod handler;
pub mod msg_update_handler;
pub mod msg_cursor_handler;
