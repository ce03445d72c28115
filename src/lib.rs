pub mod aggregate;
pub mod error;
pub mod event;
pub mod grid;
pub mod merge;
pub mod report;
pub mod selection;
pub mod store;
pub mod time;
