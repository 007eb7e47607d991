pub mod derive_notifications_cmd;
pub mod dispatch_notifications_cmd;
pub mod mark_read_cmd;
