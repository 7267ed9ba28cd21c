pub mod command;
pub mod count;
pub mod fileformat;
pub mod runtime;

