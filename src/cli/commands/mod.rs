pub mod extract;
pub mod models;
pub mod predict;
