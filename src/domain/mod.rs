pub mod iris;

pub use iris::*;
