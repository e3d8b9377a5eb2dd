//! HM-10 wire protocol - value tables, command framing and response parsing
//!
//! The module speaks plain ASCII with no terminator and no length prefix:
//!
//! ```text
//! AT+ROLE1   ->  OK+SET:1
//! AT+ADVI?   ->  OK+GET:A
//! AT+ADDR?   ->  OK+ADDR:20C38FF61DA1
//! ```
//!
//! This crate does no I/O. `hm10-driver` pairs it with a transport.

pub mod codec;
pub mod parser;
pub mod tables;

pub use codec::{
    ADDRESS_LEN, Action, Exchange, Field, MAX_NAME_LEN, PIN_LEN, Query, SET_OK_PREFIX, Setting,
    ValidationError, encode_action, encode_get, encode_set,
};
pub use parser::{ParseError, parse_int, parse_response, payload_string};
pub use tables::{
    AdvertisingInterval, AdvertisingType, BondMode, DecodeError, DiscoveryVisibility, NotifyMode,
    Role, WireEnum, WorkMode, WorkType,
};
