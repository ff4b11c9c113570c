pub mod step;
pub mod symbol;
