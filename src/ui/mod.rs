pub mod diagnostics;
pub mod map;
pub mod panels;
pub mod table;
