pub mod media_probe;
pub mod schedule_repository;
pub mod settings_store;
pub mod user_directory;

pub use media_probe::{MediaError, MediaProbe};
pub use schedule_repository::{OneOffScheduleRepository, RecurringScheduleRepository, ScheduleError};
pub use settings_store::SettingsStore;
pub use user_directory::{DirectoryError, NewUser, UserDirectory};
