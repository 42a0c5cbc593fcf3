pub mod accountability;
pub mod category;
pub mod request;

pub use accountability::{AccountabilityReport, ExpenseItem};
pub use category::Category;
pub use request::{Request, RequestKind, RequestStatus};
