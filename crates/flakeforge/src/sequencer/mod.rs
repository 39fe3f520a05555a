mod basic;
mod interface;
mod lock;
mod mode;
mod sleep;
mod state;

pub use basic::*;
pub use interface::*;
pub use lock::*;
pub use mode::*;
pub use sleep::*;
pub use state::*;
