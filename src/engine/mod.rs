pub mod balancer;
pub mod optimizer;
pub mod pricing;
pub mod queue;
pub mod sequencer;
pub mod worker;
