//! Value tables: typed configuration values and their wire tokens
//!
//! Every table is closed. A token the module sends that is not in the table
//! is a [`DecodeError`], never a fallback variant.

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("unknown {kind} token: {token:?}")]
    UnknownToken { kind: &'static str, token: String },
}

/// A configuration value with a fixed wire token per variant
pub trait WireEnum: Copy + Eq + Sized + 'static {
    /// Human readable name of the table, used in errors
    const KIND: &'static str;

    /// All variants in wire index order
    const TABLE: &'static [(Self, &'static str)];

    /// The token sent to (and echoed back by) the module
    fn token(self) -> &'static str;

    /// Name used in profiles and on the command line
    fn label(self) -> &'static str;

    fn decode(token: &str) -> Result<Self, DecodeError> {
        Self::TABLE
            .iter()
            .find(|(_, t)| t.eq_ignore_ascii_case(token))
            .map(|(v, _)| *v)
            .ok_or_else(|| DecodeError::UnknownToken {
                kind: Self::KIND,
                token: token.to_string(),
            })
    }

    fn from_index(index: usize) -> Result<Self, DecodeError> {
        Self::TABLE
            .get(index)
            .map(|(v, _)| *v)
            .ok_or_else(|| DecodeError::UnknownToken {
                kind: Self::KIND,
                token: index.to_string(),
            })
    }

    fn index(self) -> usize {
        Self::TABLE
            .iter()
            .position(|(v, _)| *v == self)
            .unwrap_or_default()
    }

    /// Parse a [`WireEnum::label`], ignoring ASCII case
    fn from_label(label: &str) -> Result<Self, DecodeError> {
        Self::TABLE
            .iter()
            .map(|(v, _)| *v)
            .find(|v| v.label().eq_ignore_ascii_case(label))
            .ok_or_else(|| DecodeError::UnknownToken {
                kind: Self::KIND,
                token: label.to_string(),
            })
    }
}

macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal {
            $( $(#[$vmeta:meta])* $variant:ident = $token:literal, $label:literal; )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        pub enum $name {
            $(
                $(#[$vmeta])*
                #[serde(rename = $label)]
                $variant,
            )+
        }

        impl WireEnum for $name {
            const KIND: &'static str = $kind;
            const TABLE: &'static [(Self, &'static str)] = &[$(($name::$variant, $token)),+];

            fn token(self) -> &'static str {
                match self {
                    $($name::$variant => $token,)+
                }
            }

            fn label(self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.label())
            }
        }

        impl std::str::FromStr for $name {
            type Err = DecodeError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                <$name as WireEnum>::from_label(s)
            }
        }
    };
}

wire_enum! {
    /// Central (master) or peripheral (slave)
    Role, "role" {
        Slave = "0", "slave";
        Master = "1", "master";
    }
}

wire_enum! {
    /// Security bond mode (`AT+TYPE`)
    BondMode, "bond mode" {
        NoPin = "0", "no-pin";
        PinRequired = "1", "pin-required";
    }
}

wire_enum! {
    /// Whether the module notifies the host on connect/disconnect (`AT+NOTI`)
    NotifyMode, "notify mode" {
        None = "0", "none";
        Notify = "1", "notify";
    }
}

wire_enum! {
    /// Advertising interval (`AT+ADVI`), one hex digit on the wire
    #[allow(non_camel_case_types)]
    AdvertisingInterval, "advertising interval" {
        Ms100 = "0", "100ms";
        Ms152_5 = "1", "152.5ms";
        Ms211_25 = "2", "211.25ms";
        Ms318_75 = "3", "318.75ms";
        Ms417_5 = "4", "417.5ms";
        Ms546_25 = "5", "546.25ms";
        Ms760 = "6", "760ms";
        Ms852_5 = "7", "852.5ms";
        Ms1022_5 = "8", "1022.5ms";
        Ms1285 = "9", "1285ms";
        Ms2000 = "A", "2000ms";
        Ms3000 = "B", "3000ms";
        Ms4000 = "C", "4000ms";
        Ms5000 = "D", "5000ms";
        Ms6000 = "E", "6000ms";
        Ms7000 = "F", "7000ms";
    }
}

impl AdvertisingInterval {
    pub fn millis(self) -> f32 {
        match self {
            AdvertisingInterval::Ms100 => 100.0,
            AdvertisingInterval::Ms152_5 => 152.5,
            AdvertisingInterval::Ms211_25 => 211.25,
            AdvertisingInterval::Ms318_75 => 318.75,
            AdvertisingInterval::Ms417_5 => 417.5,
            AdvertisingInterval::Ms546_25 => 546.25,
            AdvertisingInterval::Ms760 => 760.0,
            AdvertisingInterval::Ms852_5 => 852.5,
            AdvertisingInterval::Ms1022_5 => 1022.5,
            AdvertisingInterval::Ms1285 => 1285.0,
            AdvertisingInterval::Ms2000 => 2000.0,
            AdvertisingInterval::Ms3000 => 3000.0,
            AdvertisingInterval::Ms4000 => 4000.0,
            AdvertisingInterval::Ms5000 => 5000.0,
            AdvertisingInterval::Ms6000 => 6000.0,
            AdvertisingInterval::Ms7000 => 7000.0,
        }
    }
}

wire_enum! {
    /// Advertising type (`AT+ADTY`)
    AdvertisingType, "advertising type" {
        /// Advertising, scan response and connectable
        ScanResponseConnectable = "0", "scan-response-connectable";
        /// Only the last connected device may connect
        AllowLastDevice = "1", "allow-last-device";
        /// Advertising and scan response only
        ScanResponse = "2", "scan-response";
        AdvertisingOnly = "3", "advertising-only";
    }
}

wire_enum! {
    /// What the module does at power on (`AT+IMME`)
    WorkType, "work type" {
        /// Only answer AT commands until `AT+START` (or a connect command)
        Passive = "0", "passive";
        /// Start working immediately
        Active = "1", "active";
    }
}

wire_enum! {
    /// Module work mode (`AT+MODE`)
    WorkMode, "work mode" {
        Transmission = "0", "transmission";
        TransmissionPioCollection = "1", "transmission-pio-collection";
        Remote = "2", "remote";
    }
}

wire_enum! {
    /// Whether the device name shows up in scan results (`AT+SHOW`)
    DiscoveryVisibility, "discovery visibility" {
        HideName = "0", "hide-name";
        ShowName = "1", "show-name";
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_table_bijective<T: WireEnum + std::fmt::Debug>() {
        for (index, (variant, token)) in T::TABLE.iter().enumerate() {
            assert_eq!(variant.token(), *token);
            assert_eq!(T::decode(variant.token()), Ok(*variant));
            assert_eq!(T::from_index(index), Ok(*variant));
            assert_eq!(variant.index(), index);
            assert_eq!(T::from_label(variant.label()), Ok(*variant));
        }
        let mut tokens: Vec<_> = T::TABLE.iter().map(|(_, t)| *t).collect();
        tokens.sort_unstable();
        tokens.dedup();
        assert_eq!(tokens.len(), T::TABLE.len(), "duplicate {} token", T::KIND);
    }

    #[test]
    fn tables_round_trip() {
        assert_table_bijective::<Role>();
        assert_table_bijective::<BondMode>();
        assert_table_bijective::<NotifyMode>();
        assert_table_bijective::<AdvertisingInterval>();
        assert_table_bijective::<AdvertisingType>();
        assert_table_bijective::<WorkType>();
        assert_table_bijective::<WorkMode>();
        assert_table_bijective::<DiscoveryVisibility>();
    }

    #[test]
    fn unknown_tokens_are_rejected() {
        assert_eq!(
            Role::decode("2"),
            Err(DecodeError::UnknownToken {
                kind: "role",
                token: "2".to_string()
            })
        );
        assert!(WorkMode::decode("3").is_err());
        assert!(AdvertisingType::decode("").is_err());
        assert!(AdvertisingInterval::decode("G").is_err());
        assert!(AdvertisingInterval::decode("10").is_err());
        assert!(WorkMode::from_index(3).is_err());
        assert!(AdvertisingInterval::from_index(16).is_err());
    }

    #[test]
    fn hex_interval_tokens() {
        assert_eq!(
            AdvertisingInterval::decode("A"),
            Ok(AdvertisingInterval::Ms2000)
        );
        assert_eq!(
            AdvertisingInterval::decode("a"),
            Ok(AdvertisingInterval::Ms2000)
        );
        assert_eq!(AdvertisingInterval::Ms2000.index(), 10);
        assert_eq!(AdvertisingInterval::Ms2000.millis(), 2000.0);
        assert_eq!(AdvertisingInterval::Ms7000.token(), "F");
    }

    #[test]
    fn labels_parse() {
        assert_eq!("Master".parse::<Role>(), Ok(Role::Master));
        assert_eq!(
            "152.5ms".parse::<AdvertisingInterval>(),
            Ok(AdvertisingInterval::Ms152_5)
        );
        assert!("fast".parse::<AdvertisingInterval>().is_err());
    }
}
