pub mod convert;
pub mod languages;
pub mod rewrite;
pub mod serialize;
pub mod source_map;
pub mod tree;
pub mod types;
