pub mod health;
pub mod recognize;
pub mod status;
