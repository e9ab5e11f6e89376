mod driver;
mod peer_link;
mod rtc;

pub use driver::*;
pub use peer_link::*;
pub use rtc::*;
