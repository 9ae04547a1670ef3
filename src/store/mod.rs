pub mod check;
pub mod logbook;
pub mod notification;
pub mod subscription;

pub use logbook::{LogBook, SharedLogBook, StoreError};
pub use notification::{DeleteHint, Notification};
pub use subscription::Subscription;
