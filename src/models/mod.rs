pub mod market;
pub mod proxy;
