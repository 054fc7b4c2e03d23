pub mod schedule;
pub mod settings;
pub mod user;

pub use schedule::{
    OneOffSchedule, OneOffScheduleDraft, OneOffScheduleFields, RecurringSchedule, RecurringScheduleDraft,
    RecurringScheduleFields,
};
pub use settings::{Settings, SettingsView};
pub use user::{Role, User, UserView};
