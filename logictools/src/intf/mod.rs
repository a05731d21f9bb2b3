//! Pin model and the command/mailbox transport of the co-processor.

mod ioswitch;
mod memory;
mod spec;
mod transport;

pub use ioswitch::*;
pub use memory::*;
pub use spec::*;
pub use transport::*;
