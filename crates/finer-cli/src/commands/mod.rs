pub mod navigation;
pub mod session;
pub mod steps;

mod output;
