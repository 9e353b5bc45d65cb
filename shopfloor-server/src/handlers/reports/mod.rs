pub mod recent;
pub mod summary;
