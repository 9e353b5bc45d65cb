pub mod archive;
pub mod cancel;
pub mod create;
pub mod duplicate;
pub mod get;
pub mod heat_number;
pub mod list;
pub mod operator;
pub mod pause;
pub mod reorder;
pub mod resume;
