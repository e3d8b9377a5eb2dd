//! Command codec: typed operations to AT command strings
//!
//! A set command is `AT+<MNEMONIC><TOKEN>` and the module acknowledges it by
//! echoing `OK+SET:<TOKEN>`. Success is string equality, nothing more.

use crate::tables::{
    AdvertisingInterval, AdvertisingType, BondMode, DiscoveryVisibility, NotifyMode, Role,
    WireEnum, WorkMode, WorkType,
};

pub const COMMAND_PREFIX: &str = "AT+";
pub const SET_OK_PREFIX: &str = "OK+SET:";
pub const GET_OK_PREFIX: &str = "OK+GET:";

/// Longest device name the module accepts
pub const MAX_NAME_LEN: usize = 12;
/// Pins are always six decimal digits
pub const PIN_LEN: usize = 6;
/// Bluetooth address as reported by `AT+ADDR?`, twelve hex digits
pub const ADDRESS_LEN: usize = 12;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("device name must be 1 to 12 characters, got {0}")]
    NameLength(usize),
    #[error("device name may only contain printable ASCII: {0:?}")]
    NameCharacters(String),
    #[error("security pin must be exactly 6 decimal digits")]
    Pin,
    #[error("characteristic 0x{0:04X} is reserved, use 0x0001..=0xFFFE")]
    Characteristic(u16),
}

/// One controllable property of the module
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Role,
    BondMode,
    SecurityPin,
    Name,
    ConnectionTimeout,
    AdvertisingInterval,
    AdvertisingType,
    NotifyMode,
    Characteristic,
    WorkType,
    WorkMode,
    Discovery,
    Address,
    LastConnectedAddress,
    Rssi,
}

impl Field {
    pub fn mnemonic(self) -> &'static str {
        match self {
            Field::Role => "ROLE",
            Field::BondMode => "TYPE",
            Field::SecurityPin => "PASS",
            Field::Name => "NAME",
            Field::ConnectionTimeout => "TCON",
            Field::AdvertisingInterval => "ADVI",
            Field::AdvertisingType => "ADTY",
            Field::NotifyMode => "NOTI",
            Field::Characteristic => "CHAR",
            Field::WorkType => "IMME",
            Field::WorkMode => "MODE",
            Field::Discovery => "SHOW",
            Field::Address => "ADDR",
            Field::LastConnectedAddress => "RADD",
            Field::Rssi => "RSSI",
        }
    }

    /// Response prefix for a query of this field.
    ///
    /// `None` when the module firmware binding has no working query: the pin
    /// is write-only, and last connected address, connection timeout and
    /// RSSI were never wired up.
    pub fn query_prefix(self) -> Option<&'static str> {
        match self {
            Field::Role
            | Field::BondMode
            | Field::AdvertisingInterval
            | Field::AdvertisingType
            | Field::NotifyMode
            | Field::WorkType
            | Field::WorkMode
            | Field::Discovery => Some(GET_OK_PREFIX),
            Field::Characteristic => Some("OK+GET:0x"),
            Field::Address => Some("OK+ADDR:"),
            Field::Name => Some("OK+NAME:"),
            Field::SecurityPin
            | Field::ConnectionTimeout
            | Field::LastConnectedAddress
            | Field::Rssi => None,
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Field::Role => "role",
            Field::BondMode => "bond mode",
            Field::SecurityPin => "security pin",
            Field::Name => "name",
            Field::ConnectionTimeout => "connection timeout",
            Field::AdvertisingInterval => "advertising interval",
            Field::AdvertisingType => "advertising type",
            Field::NotifyMode => "notify mode",
            Field::Characteristic => "characteristic",
            Field::WorkType => "work type",
            Field::WorkMode => "work mode",
            Field::Discovery => "discovery visibility",
            Field::Address => "device address",
            Field::LastConnectedAddress => "last connected address",
            Field::Rssi => "rssi",
        };
        f.write_str(name)
    }
}

/// A value to write to the module
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Setting<'a> {
    Role(Role),
    BondMode(BondMode),
    SecurityPin(&'a str),
    Name(&'a str),
    /// Seconds
    ConnectionTimeout(u16),
    AdvertisingInterval(AdvertisingInterval),
    AdvertisingType(AdvertisingType),
    NotifyMode(NotifyMode),
    Characteristic(u16),
    WorkType(WorkType),
    WorkMode(WorkMode),
    Discovery(DiscoveryVisibility),
}

impl Setting<'_> {
    pub fn field(&self) -> Field {
        match self {
            Setting::Role(_) => Field::Role,
            Setting::BondMode(_) => Field::BondMode,
            Setting::SecurityPin(_) => Field::SecurityPin,
            Setting::Name(_) => Field::Name,
            Setting::ConnectionTimeout(_) => Field::ConnectionTimeout,
            Setting::AdvertisingInterval(_) => Field::AdvertisingInterval,
            Setting::AdvertisingType(_) => Field::AdvertisingType,
            Setting::NotifyMode(_) => Field::NotifyMode,
            Setting::Characteristic(_) => Field::Characteristic,
            Setting::WorkType(_) => Field::WorkType,
            Setting::WorkMode(_) => Field::WorkMode,
            Setting::Discovery(_) => Field::Discovery,
        }
    }

    /// Validated wire token for this value
    pub fn token(&self) -> Result<String, ValidationError> {
        let token = match *self {
            Setting::Role(v) => v.token().to_string(),
            Setting::BondMode(v) => v.token().to_string(),
            Setting::AdvertisingInterval(v) => v.token().to_string(),
            Setting::AdvertisingType(v) => v.token().to_string(),
            Setting::NotifyMode(v) => v.token().to_string(),
            Setting::WorkType(v) => v.token().to_string(),
            Setting::WorkMode(v) => v.token().to_string(),
            Setting::Discovery(v) => v.token().to_string(),
            Setting::SecurityPin(pin) => {
                validate_pin(pin)?;
                pin.to_string()
            }
            Setting::Name(name) => {
                validate_name(name)?;
                name.to_string()
            }
            Setting::ConnectionTimeout(seconds) => seconds.to_string(),
            Setting::Characteristic(value) => {
                if value == 0x0000 || value == 0xFFFF {
                    return Err(ValidationError::Characteristic(value));
                }
                format!("0x{value:X}")
            }
        };
        Ok(token)
    }
}

/// Commands with a fixed literal acknowledgement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    SelfTest,
    Reset,
    FactoryReset,
    ClearLastConnected,
    StartTransmission,
}

/// An outgoing command and the exact response that means success
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exchange {
    pub command: String,
    pub expected: String,
}

/// An outgoing query and the prefix its answer starts with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub command: String,
    pub prefix: &'static str,
}

pub fn encode_set(setting: &Setting<'_>) -> Result<Exchange, ValidationError> {
    let token = setting.token()?;
    Ok(Exchange {
        command: format!("{COMMAND_PREFIX}{}{token}", setting.field().mnemonic()),
        expected: format!("{SET_OK_PREFIX}{token}"),
    })
}

pub fn encode_action(action: Action) -> Exchange {
    let (command, expected) = match action {
        Action::SelfTest => ("AT", "OK"),
        Action::Reset => ("AT+RESET", "OK+RESET"),
        Action::FactoryReset => ("AT+RENEW", "OK+RENEW"),
        Action::ClearLastConnected => ("AT+CLEAR", "OK+CLEAR"),
        Action::StartTransmission => ("AT+START", "OK+START"),
    };
    Exchange {
        command: command.to_string(),
        expected: expected.to_string(),
    }
}

/// `None` when the field cannot be queried, see [`Field::query_prefix`]
pub fn encode_get(field: Field) -> Option<Query> {
    let prefix = field.query_prefix()?;
    Some(Query {
        command: format!("{COMMAND_PREFIX}{}?", field.mnemonic()),
        prefix,
    })
}

fn validate_name(name: &str) -> Result<(), ValidationError> {
    let len = name.chars().count();
    if len == 0 || len > MAX_NAME_LEN {
        return Err(ValidationError::NameLength(len));
    }
    if !name.bytes().all(|b| b.is_ascii_graphic() || b == b' ') {
        return Err(ValidationError::NameCharacters(name.to_string()));
    }
    Ok(())
}

fn validate_pin(pin: &str) -> Result<(), ValidationError> {
    if pin.len() != PIN_LEN || !pin.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ValidationError::Pin);
    }
    Ok(())
}
