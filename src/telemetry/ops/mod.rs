pub mod recipes;
pub mod shop;
pub mod export;
pub mod serve;
pub mod plan;
