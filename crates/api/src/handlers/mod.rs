pub mod contents;
pub mod entities;
pub mod records;
