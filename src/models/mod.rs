pub mod driver;
pub mod job;
pub mod plan;
pub mod point;
pub mod pricing;
