pub mod reminders;
pub mod service;

pub use reminders::{LogReminderSink, ReminderSink};
pub use service::AttestationService;
