pub mod connection;
pub mod handler;
pub mod msg_get_document_handler;
pub mod msg_changes_handler;
pub mod msg_cursor_handler;
pub mod msg_save_handler;
pub mod msg_leave_handler;
