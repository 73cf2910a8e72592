pub mod notes;
pub mod order;
