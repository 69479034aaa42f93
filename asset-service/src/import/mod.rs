pub mod coordinator;
pub mod progress;
pub mod validator;

pub use coordinator::ImportCoordinator;
pub use progress::{ImportOutcome, ImportStatus, ProgressEvent, ProgressSender};
pub use validator::FileValidator;
