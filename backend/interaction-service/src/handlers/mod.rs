pub mod interactions;
pub mod notifications;
