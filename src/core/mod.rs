mod alias;
mod classifier;
mod diff;
mod event;
mod router;

pub use alias::*;
pub use classifier::*;
pub use diff::*;
pub use event::*;
pub use router::*;
