pub mod external;
pub mod outbox;
pub mod questions;
