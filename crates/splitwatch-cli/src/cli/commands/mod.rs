pub mod classify;
pub mod dispatch;
pub mod parse;
pub mod run;

pub use dispatch::dispatch;
