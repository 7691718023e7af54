pub mod format;
pub mod gate;
pub mod security;
pub mod slug;
