//! HM-10 Driver Library
//!
//! Synchronous AT command driver for the JNHuaMao HM-10 BLE module.
//!
//! The caller owns the byte channel (usually a UART character device) and
//! hands it to the driver as a [`Transport`]. Each operation writes one
//! command and reads one response; there is no queue, no retry and no
//! background work. Share a session across threads by wrapping it in a
//! `Mutex`.
//!
//! # Example
//!
//! ```ignore
//! use hm10_driver::{DriverConfig, Hm10, Role};
//!
//! let mut hm10 = Hm10::init(uart, DriverConfig::default())?;
//! hm10.set_name("Beacon")?;
//! hm10.set_role(Role::Slave)?;
//! println!("address: {}", hm10.get_device_address()?);
//! ```

mod error;
#[cfg(test)]
mod mock;
mod profile;
mod session;
mod transport;

pub use error::{BoxError, Error, ProtocolError, Result, TransportError};
pub use profile::ModuleProfile;
pub use session::{
    DEFAULT_READ_TIMEOUT, DEFAULT_RESPONSE_CAPACITY, DriverConfig, Hm10, SessionState,
};
pub use transport::{FnTransport, StatusError, Transport};

pub use hm10_proto::{
    AdvertisingInterval, AdvertisingType, BondMode, DecodeError, DiscoveryVisibility, Field,
    NotifyMode, ParseError, Role, ValidationError, WireEnum, WorkMode, WorkType,
};
