pub mod listener;
pub mod traits;
pub mod udp;

pub use listener::serve;
pub use udp::UdpTransport;
