pub mod candidate;
pub mod history;
pub mod room;
