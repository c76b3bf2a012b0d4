pub mod agent;
pub mod notification;
pub mod property;

pub use agent::{Agent, NewAgent, SocialLink};
pub use notification::{relative_time, NewNotification, Notification, NotificationKind};
pub use property::{Category, NewProperty, Property};
