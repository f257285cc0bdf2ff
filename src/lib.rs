pub mod console;
pub mod gui;
pub mod index;
pub mod query;
