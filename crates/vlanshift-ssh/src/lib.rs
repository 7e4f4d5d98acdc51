// vlanshift-ssh: interactive SSH sessions to Cisco IOS-style switches

pub mod error;
pub mod prompt;
pub mod schema;
pub mod session;
pub mod transport;

pub use error::Error;
pub use schema::{Field, Row, Schema};
pub use session::{Credentials, SshSession};
pub use transport::TransportConfig;
