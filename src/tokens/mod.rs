pub mod generator;
pub mod jwt;
pub mod session;
