pub mod notifications;
pub mod sensors;
