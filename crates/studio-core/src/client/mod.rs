pub mod session;
pub mod transport;

pub use session::{ApiPrefix, SessionClient};
pub use transport::{HttpRequest, HttpResponse, Transport, TransportConfig};
