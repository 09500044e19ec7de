pub mod schedules;
pub mod sessions;
