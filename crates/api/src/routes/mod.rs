pub mod dooray;
pub mod recent;
