pub mod illustration;
pub mod narrative;
pub mod quote;
