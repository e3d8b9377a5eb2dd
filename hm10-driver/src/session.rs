//! The HM-10 session: one command out, one response back
//!
//! Every operation runs the same skeleton: validate locally, encode, write,
//! read with the session timeout, then compare (set) or parse (get). Nothing
//! is retried and nothing about the module is cached.

use std::time::Duration;

use hm10_proto::{
    ADDRESS_LEN, Action, AdvertisingInterval, AdvertisingType, BondMode, DiscoveryVisibility,
    Exchange, Field, MAX_NAME_LEN, NotifyMode, ParseError, Role, Setting, WireEnum, WorkMode,
    WorkType, encode_action, encode_get, encode_set, parse_int, parse_response, payload_string,
};
use log::{debug, warn};

use crate::error::{Error, ProtocolError, Result, TransportError};
use crate::transport::Transport;

/// Read timeout used by the module's reference protocol
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(1000);

/// Query answers are short; the longest is `OK+ADDR:` plus twelve hex digits
pub const DEFAULT_RESPONSE_CAPACITY: usize = 40;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriverConfig {
    pub read_timeout: Duration,
    /// Size of the buffer a query answer is read into; longer answers are cut
    pub response_capacity: usize,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            read_timeout: DEFAULT_READ_TIMEOUT,
            response_capacity: DEFAULT_RESPONSE_CAPACITY,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Transport supplied, self-test not passed yet
    Unbound,
    /// Self-test passed; operations may run
    Bound,
}

/// A session with one HM-10 module over an owned transport
pub struct Hm10<T: Transport> {
    transport: T,
    config: DriverConfig,
    state: SessionState,
}

impl<T: Transport> Hm10<T> {
    /// Wrap a transport without talking to the module yet
    pub fn new(transport: T, config: DriverConfig) -> Self {
        let response_capacity = config.response_capacity.clamp(1, usize::from(u16::MAX));
        Self {
            transport,
            config: DriverConfig {
                response_capacity,
                ..config
            },
            state: SessionState::Unbound,
        }
    }

    /// Bind the transport and run the self-test.
    ///
    /// On failure the transport is dropped; use [`Hm10::new`] and
    /// [`Hm10::self_test`] to keep it.
    pub fn init(transport: T, config: DriverConfig) -> Result<Self> {
        let mut hm10 = Self::new(transport, config);
        hm10.self_test()?;
        Ok(hm10)
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_bound(&self) -> bool {
        self.state == SessionState::Bound
    }

    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn into_transport(self) -> T {
        self.transport
    }

    /// `AT` / `OK` handshake. Marks the session bound on success; a failure
    /// leaves the state unchanged.
    pub fn self_test(&mut self) -> Result<()> {
        self.run(&encode_action(Action::SelfTest))?;
        self.state = SessionState::Bound;
        Ok(())
    }

    pub fn reset(&mut self) -> Result<()> {
        self.action(Action::Reset)
    }

    pub fn factory_reset(&mut self) -> Result<()> {
        self.action(Action::FactoryReset)
    }

    pub fn clear_last_connected(&mut self) -> Result<()> {
        self.action(Action::ClearLastConnected)
    }

    /// Leave passive work type and start working (`AT+START`)
    pub fn start_transmission_mode(&mut self) -> Result<()> {
        self.action(Action::StartTransmission)
    }

    pub fn set_role(&mut self, role: Role) -> Result<()> {
        self.set(Setting::Role(role))
    }

    pub fn set_bond_mode(&mut self, mode: BondMode) -> Result<()> {
        self.set(Setting::BondMode(mode))
    }

    pub fn set_security_pin(&mut self, pin: &str) -> Result<()> {
        self.set(Setting::SecurityPin(pin))
    }

    pub fn set_name(&mut self, name: &str) -> Result<()> {
        self.set(Setting::Name(name))
    }

    pub fn set_connection_timeout(&mut self, seconds: u16) -> Result<()> {
        self.set(Setting::ConnectionTimeout(seconds))
    }

    pub fn set_notification_mode(&mut self, mode: NotifyMode) -> Result<()> {
        self.set(Setting::NotifyMode(mode))
    }

    pub fn set_advertising_interval(&mut self, interval: AdvertisingInterval) -> Result<()> {
        self.set(Setting::AdvertisingInterval(interval))
    }

    pub fn set_advertising_type(&mut self, kind: AdvertisingType) -> Result<()> {
        self.set(Setting::AdvertisingType(kind))
    }

    pub fn set_characteristic(&mut self, value: u16) -> Result<()> {
        self.set(Setting::Characteristic(value))
    }

    pub fn set_module_work_type(&mut self, kind: WorkType) -> Result<()> {
        self.set(Setting::WorkType(kind))
    }

    pub fn set_module_work_mode(&mut self, mode: WorkMode) -> Result<()> {
        self.set(Setting::WorkMode(mode))
    }

    pub fn set_discovery_parameter(&mut self, visibility: DiscoveryVisibility) -> Result<()> {
        self.set(Setting::Discovery(visibility))
    }

    pub fn get_device_address(&mut self) -> Result<String> {
        let payload = self.query(Field::Address)?;
        Ok(payload_string(&payload, ADDRESS_LEN))
    }

    pub fn get_name(&mut self) -> Result<String> {
        let payload = self.query(Field::Name)?;
        Ok(payload_string(&payload, MAX_NAME_LEN))
    }

    pub fn get_role(&mut self) -> Result<Role> {
        self.query_enum(Field::Role)
    }

    pub fn get_bond_mode(&mut self) -> Result<BondMode> {
        self.query_enum(Field::BondMode)
    }

    pub fn get_notification_mode(&mut self) -> Result<NotifyMode> {
        self.query_enum(Field::NotifyMode)
    }

    /// The interval variant; [`AdvertisingInterval::millis`] gives the value
    pub fn get_advertising_interval(&mut self) -> Result<AdvertisingInterval> {
        self.query_enum(Field::AdvertisingInterval)
    }

    pub fn get_advertising_type(&mut self) -> Result<AdvertisingType> {
        self.query_enum(Field::AdvertisingType)
    }

    pub fn get_characteristic(&mut self) -> Result<u16> {
        let payload = self.query(Field::Characteristic)?;
        parse_int(&payload, 16)
            .ok()
            .and_then(|value| u16::try_from(value).ok())
            .ok_or_else(|| malformed(Field::Characteristic, ParseError::NotNumeric(payload)))
    }

    pub fn get_module_work_type(&mut self) -> Result<WorkType> {
        self.query_enum(Field::WorkType)
    }

    pub fn get_module_work_mode(&mut self) -> Result<WorkMode> {
        self.query_enum(Field::WorkMode)
    }

    pub fn get_discovery_parameter(&mut self) -> Result<DiscoveryVisibility> {
        self.query_enum(Field::Discovery)
    }

    pub fn get_last_connected_address(&mut self) -> Result<String> {
        Err(Error::NotImplemented(Field::LastConnectedAddress))
    }

    pub fn get_connection_timeout(&mut self) -> Result<u16> {
        Err(Error::NotImplemented(Field::ConnectionTimeout))
    }

    pub fn get_rssi(&mut self) -> Result<i16> {
        Err(Error::NotImplemented(Field::Rssi))
    }

    pub(crate) fn set(&mut self, setting: Setting<'_>) -> Result<()> {
        let exchange = encode_set(&setting)?;
        self.ensure_bound()?;
        self.run(&exchange)
    }

    fn action(&mut self, action: Action) -> Result<()> {
        self.ensure_bound()?;
        self.run(&encode_action(action))
    }

    fn ensure_bound(&self) -> Result<()> {
        match self.state {
            SessionState::Bound => Ok(()),
            SessionState::Unbound => Err(Error::Unbound),
        }
    }

    /// Send a command and compare the echo. Reads exactly as many bytes as
    /// the expected acknowledgement.
    fn run(&mut self, exchange: &Exchange) -> Result<()> {
        self.send(&exchange.command)?;

        let mut response = vec![0u8; exchange.expected.len()];
        let n = self.receive(&exchange.command, &mut response)?;
        let received = String::from_utf8_lossy(&response[..n]);
        let received = received.trim_end_matches('\0');
        debug!("hm10: {} --> {}", exchange.command, received.escape_debug());

        if !received.eq_ignore_ascii_case(&exchange.expected) {
            warn!(
                "hm10: {} rejected, expected {:?} got {:?}",
                exchange.command, exchange.expected, received
            );
            return Err(ProtocolError::Rejected {
                command: exchange.command.clone(),
                expected: exchange.expected.clone(),
                received: received.to_string(),
            }
            .into());
        }
        Ok(())
    }

    /// Send a query and return its payload with the prefix stripped
    fn query(&mut self, field: Field) -> Result<String> {
        let query = encode_get(field).ok_or(Error::NotImplemented(field))?;
        self.ensure_bound()?;
        self.send(&query.command)?;

        let mut response = vec![0u8; self.config.response_capacity];
        let n = self.receive(&query.command, &mut response)?;
        let raw = &response[..n];
        debug!("hm10: {} --> {}", query.command, String::from_utf8_lossy(raw).escape_debug());

        match parse_response(raw, query.prefix) {
            Ok(payload) => Ok(payload.to_string()),
            Err(source) => {
                warn!("hm10: {} answered with a malformed response: {source}", query.command);
                Err(malformed(field, source))
            }
        }
    }

    fn query_enum<E: WireEnum>(&mut self, field: Field) -> Result<E> {
        let payload = self.query(field)?;
        Ok(E::decode(&payload)?)
    }

    fn send(&mut self, command: &str) -> Result<()> {
        match self.transport.write(command.as_bytes()) {
            Ok(n) if n == command.len() => Ok(()),
            Ok(n) => {
                warn!("hm10: short write for {command}, {n} of {} bytes", command.len());
                Err(TransportError::WriteFailed {
                    command: command.to_string(),
                    source: None,
                }
                .into())
            }
            Err(e) => Err(TransportError::WriteFailed {
                command: command.to_string(),
                source: Some(Box::new(e)),
            }
            .into()),
        }
    }

    fn receive(&mut self, command: &str, buf: &mut [u8]) -> Result<usize> {
        let timeout = self.config.read_timeout;
        match self.transport.read(buf, timeout) {
            Ok(0) => Err(TransportError::ReadTimeout {
                command: command.to_string(),
                timeout,
                source: None,
            }
            .into()),
            Ok(n) => Ok(n.min(buf.len())),
            Err(e) => Err(TransportError::ReadTimeout {
                command: command.to_string(),
                timeout,
                source: Some(Box::new(e)),
            }
            .into()),
        }
    }
}

fn malformed(field: Field, source: ParseError) -> Error {
    let command = encode_get(field).map(|q| q.command).unwrap_or_default();
    ProtocolError::MalformedResponse { command, source }.into()
}
