pub mod construction;
pub mod equity;
pub mod lending;
pub mod returns;
