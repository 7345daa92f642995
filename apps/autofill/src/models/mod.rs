pub mod cv;
pub mod file;
