pub mod connection;
pub mod layout;
pub mod messages;
pub mod presentation;
