//! Module profiles: a desired configuration applied in one go

use hm10_proto::{
    AdvertisingInterval, AdvertisingType, BondMode, DiscoveryVisibility, NotifyMode, Role,
    Setting, ValidationError, WorkMode, WorkType,
};
use log::info;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::session::Hm10;
use crate::transport::Transport;

/// Every field is optional; absent fields are left as the module has them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModuleProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bond_mode: Option<BondMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security_pin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notify_mode: Option<NotifyMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub advertising_interval: Option<AdvertisingInterval>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub advertising_type: Option<AdvertisingType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub characteristic: Option<u16>,
    /// Seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_timeout: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work_type: Option<WorkType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work_mode: Option<WorkMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discovery: Option<DiscoveryVisibility>,
}

impl ModuleProfile {
    /// Present fields in the order they are written to the module
    pub fn settings(&self) -> Vec<Setting<'_>> {
        let mut settings = Vec::new();
        if let Some(name) = &self.name {
            settings.push(Setting::Name(name));
        }
        if let Some(role) = self.role {
            settings.push(Setting::Role(role));
        }
        if let Some(mode) = self.bond_mode {
            settings.push(Setting::BondMode(mode));
        }
        if let Some(pin) = &self.security_pin {
            settings.push(Setting::SecurityPin(pin));
        }
        if let Some(mode) = self.notify_mode {
            settings.push(Setting::NotifyMode(mode));
        }
        if let Some(interval) = self.advertising_interval {
            settings.push(Setting::AdvertisingInterval(interval));
        }
        if let Some(kind) = self.advertising_type {
            settings.push(Setting::AdvertisingType(kind));
        }
        if let Some(value) = self.characteristic {
            settings.push(Setting::Characteristic(value));
        }
        if let Some(seconds) = self.connection_timeout {
            settings.push(Setting::ConnectionTimeout(seconds));
        }
        if let Some(kind) = self.work_type {
            settings.push(Setting::WorkType(kind));
        }
        if let Some(mode) = self.work_mode {
            settings.push(Setting::WorkMode(mode));
        }
        if let Some(visibility) = self.discovery {
            settings.push(Setting::Discovery(visibility));
        }
        settings
    }

    pub fn validate(&self) -> std::result::Result<(), ValidationError> {
        for setting in self.settings() {
            setting.token()?;
        }
        Ok(())
    }
}

impl<T: Transport> Hm10<T> {
    /// Write every present field of `profile`, stopping at the first error.
    ///
    /// The whole profile is validated before anything is sent. Returns the
    /// number of settings written.
    pub fn apply_profile(&mut self, profile: &ModuleProfile) -> Result<usize> {
        profile.validate()?;
        let settings = profile.settings();
        info!("hm10: applying {} settings", settings.len());
        for setting in &settings {
            self.set(*setting)?;
        }
        Ok(settings.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, ProtocolError};
    use crate::mock::{MockTransport, bound};

    #[test]
    fn parses_json() {
        let profile = serde_json::from_str::<ModuleProfile>(
            r#"{
                "name": "Beacon",
                "role": "slave",
                "advertising_interval": "152.5ms",
                "advertising_type": "scan-response",
                "characteristic": 65505,
                "work_type": "passive"
            }"#,
        );
        let profile = match profile {
            Ok(profile) => profile,
            Err(e) => panic!("profile did not parse: {e}"),
        };
        assert_eq!(profile.name.as_deref(), Some("Beacon"));
        assert_eq!(profile.role, Some(Role::Slave));
        assert_eq!(
            profile.advertising_interval,
            Some(AdvertisingInterval::Ms152_5)
        );
        assert_eq!(profile.advertising_type, Some(AdvertisingType::ScanResponse));
        assert_eq!(profile.characteristic, Some(0xFFE1));
        assert_eq!(profile.work_type, Some(WorkType::Passive));
        assert_eq!(profile.discovery, None);
    }

    #[test]
    fn rejects_unknown_fields_and_values() {
        assert!(serde_json::from_str::<ModuleProfile>(r#"{"colour": "red"}"#).is_err());
        assert!(serde_json::from_str::<ModuleProfile>(r#"{"role": "boss"}"#).is_err());
    }

    #[test]
    fn round_trips_through_json() {
        let profile = ModuleProfile {
            name: Some("Beacon".to_string()),
            work_mode: Some(WorkMode::Remote),
            ..ModuleProfile::default()
        };
        assert_eq!(
            serde_json::to_string(&profile).ok().as_deref(),
            Some(r#"{"name":"Beacon","work_mode":"remote"}"#)
        );
    }

    #[test]
    fn applies_in_fixed_order() {
        let profile = ModuleProfile {
            discovery: Some(DiscoveryVisibility::ShowName),
            role: Some(Role::Master),
            name: Some("Beacon".to_string()),
            ..ModuleProfile::default()
        };
        let mut hm10 = bound(
            MockTransport::new()
                .reply("OK+SET:Beacon")
                .reply("OK+SET:1")
                .reply("OK+SET:1"),
        );
        assert_eq!(hm10.apply_profile(&profile).ok(), Some(3));
        assert_eq!(
            hm10.transport().writes,
            ["AT", "AT+NAMEBeacon", "AT+ROLE1", "AT+SHOW1"]
        );
    }

    #[test]
    fn stops_at_first_rejection() {
        let profile = ModuleProfile {
            role: Some(Role::Master),
            work_mode: Some(WorkMode::Transmission),
            ..ModuleProfile::default()
        };
        let mut hm10 = bound(MockTransport::new().reply("OK+SET:0").reply("OK+SET:0"));
        assert!(matches!(
            hm10.apply_profile(&profile),
            Err(Error::Protocol(ProtocolError::Rejected { .. }))
        ));
        assert_eq!(hm10.transport().writes, ["AT", "AT+ROLE1"]);
    }

    #[test]
    fn invalid_profile_sends_nothing() {
        let profile = ModuleProfile {
            role: Some(Role::Master),
            security_pin: Some("12".to_string()),
            ..ModuleProfile::default()
        };
        let mut hm10 = bound(MockTransport::new());
        assert!(matches!(
            hm10.apply_profile(&profile),
            Err(Error::Validation(ValidationError::Pin))
        ));
        assert_eq!(hm10.transport().writes, ["AT"]);
    }
}
