pub mod dispatch;
pub mod parse;
pub mod sync;
