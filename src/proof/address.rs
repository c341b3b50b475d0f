// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! TON wallet addresses.
//!
//! Two textual forms are accepted:
//!
//! - raw: `<workchain>:<64 hex chars>`, e.g. `0:83df...`
//! - user-friendly: 48 base64 or base64url characters encoding
//!   `flags(1) || workchain(1) || hash(32) || crc16(2)`
//!
//! Both parse into the same [`TonAddress`]; the raw form is canonical.

use std::fmt;
use std::str::FromStr;

use base64ct::{Base64, Base64Url, Encoding};
use thiserror::Error;

const HASH_LEN: usize = 32;
const FRIENDLY_LEN: usize = 36;
const FRIENDLY_TEXT_LEN: usize = 48;

pub(crate) const FLAG_BOUNCEABLE: u8 = 0x11;
pub(crate) const FLAG_NON_BOUNCEABLE: u8 = 0x51;
pub(crate) const FLAG_TESTNET: u8 = 0x80;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AddressError {
    #[error("address has an invalid workchain")]
    Workchain,
    #[error("address hash must be 32 bytes of hex")]
    Hash,
    #[error("address is not valid base64")]
    Encoding,
    #[error("address flags byte is unknown")]
    Flags,
    #[error("address checksum mismatch")]
    Checksum,
}

/// Network a user-friendly address was encoded for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressNetwork {
    Mainnet,
    Testnet,
}

impl AddressNetwork {
    /// TON Connect network id (`CHAIN` in the wallet reply).
    pub const fn id(self) -> &'static str {
        match self {
            Self::Mainnet => "-239",
            Self::Testnet => "-3",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TonAddress {
    pub workchain: i32,
    pub hash: [u8; HASH_LEN],
}

impl TonAddress {
    /// Parse either form. A user-friendly address also reports the network
    /// its flags were encoded for; a raw address carries none.
    pub fn parse_with_network(s: &str) -> Result<(Self, Option<AddressNetwork>), AddressError> {
        if s.contains(':') {
            Ok((Self::parse_raw(s)?, None))
        } else {
            let (address, network) = Self::parse_friendly(s)?;
            Ok((address, Some(network)))
        }
    }

    fn parse_raw(s: &str) -> Result<Self, AddressError> {
        let (wc, hash_hex) = s.split_once(':').ok_or(AddressError::Workchain)?;
        let workchain: i32 = wc.parse().map_err(|_| AddressError::Workchain)?;

        let mut hash = [0u8; HASH_LEN];
        hex::decode_to_slice(hash_hex, &mut hash).map_err(|_| AddressError::Hash)?;

        Ok(Self { workchain, hash })
    }

    fn parse_friendly(s: &str) -> Result<(Self, AddressNetwork), AddressError> {
        if s.len() != FRIENDLY_TEXT_LEN {
            return Err(AddressError::Encoding);
        }

        let decoded = if s.contains(['-', '_']) {
            Base64Url::decode_vec(s)
        } else {
            Base64::decode_vec(s)
        };
        let bytes = decoded.map_err(|_| AddressError::Encoding)?;

        if bytes.len() != FRIENDLY_LEN {
            return Err(AddressError::Encoding);
        }

        let network = if bytes[0] & FLAG_TESTNET != 0 {
            AddressNetwork::Testnet
        } else {
            AddressNetwork::Mainnet
        };
        let flags = bytes[0] & !FLAG_TESTNET;
        if flags != FLAG_BOUNCEABLE && flags != FLAG_NON_BOUNCEABLE {
            return Err(AddressError::Flags);
        }

        let expected = u16::from_be_bytes([bytes[34], bytes[35]]);
        if crc16_xmodem(&bytes[..34]) != expected {
            return Err(AddressError::Checksum);
        }

        let mut hash = [0u8; HASH_LEN];
        hash.copy_from_slice(&bytes[2..34]);

        let address = Self {
            workchain: i32::from(bytes[1] as i8),
            hash,
        };
        Ok((address, network))
    }
}

impl FromStr for TonAddress {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_with_network(s).map(|(address, _)| address)
    }
}

impl fmt::Display for TonAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.workchain, hex::encode(self.hash))
    }
}

/// CRC-16/XMODEM (poly 0x1021, init 0), as used by TON address checksums.
fn crc16_xmodem(data: &[u8]) -> u16 {
    let mut crc: u16 = 0;
    for &byte in data {
        crc ^= u16::from(byte) << 8;
        for _ in 0..8 {
            crc = if crc & 0x8000 != 0 {
                (crc << 1) ^ 0x1021
            } else {
                crc << 1
            };
        }
    }
    crc
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    const RAW: &str = "0:83dfd552e63729b472fcbcc8c45ebcc6691702558b68ec7527e1ba403a0f31a8";

    pub(crate) fn friendly(flags: u8, workchain: i8, hash: [u8; 32], url_safe: bool) -> String {
        let mut bytes = vec![flags, workchain as u8];
        bytes.extend_from_slice(&hash);
        let crc = crc16_xmodem(&bytes);
        bytes.extend_from_slice(&crc.to_be_bytes());
        if url_safe {
            Base64Url::encode_string(&bytes)
        } else {
            Base64::encode_string(&bytes)
        }
    }

    #[test]
    fn crc16_check_value() {
        assert_eq!(crc16_xmodem(b"123456789"), 0x31c3);
    }

    #[test]
    fn raw_form_round_trips_through_display() {
        let addr: TonAddress = RAW.parse().unwrap();
        assert_eq!(addr.workchain, 0);
        assert_eq!(addr.hash[0], 0x83);
        assert_eq!(addr.to_string(), RAW);
    }

    #[test]
    fn masterchain_raw_address() {
        let raw = format!("-1:{}", "ab".repeat(32));
        let addr: TonAddress = raw.parse().unwrap();
        assert_eq!(addr.workchain, -1);
    }

    #[test]
    fn friendly_forms_match_raw() {
        let raw: TonAddress = RAW.parse().unwrap();
        for (flags, url_safe) in [
            (FLAG_BOUNCEABLE, true),
            (FLAG_NON_BOUNCEABLE, true),
            (FLAG_BOUNCEABLE | FLAG_TESTNET, false),
        ] {
            let text = friendly(flags, 0, raw.hash, url_safe);
            assert_eq!(text.len(), 48);
            assert_eq!(text.parse::<TonAddress>().unwrap(), raw);
        }
    }

    #[test]
    fn friendly_form_reports_network() {
        let raw: TonAddress = RAW.parse().unwrap();
        assert_eq!(TonAddress::parse_with_network(RAW).unwrap(), (raw, None));

        let mainnet = friendly(FLAG_NON_BOUNCEABLE, 0, raw.hash, true);
        assert_eq!(
            TonAddress::parse_with_network(&mainnet).unwrap(),
            (raw, Some(AddressNetwork::Mainnet))
        );

        let testnet = friendly(FLAG_BOUNCEABLE | FLAG_TESTNET, 0, raw.hash, true);
        assert_eq!(
            TonAddress::parse_with_network(&testnet).unwrap(),
            (raw, Some(AddressNetwork::Testnet))
        );
        assert_eq!(AddressNetwork::Testnet.id(), "-3");
    }

    #[test]
    fn friendly_checksum_enforced() {
        let raw: TonAddress = RAW.parse().unwrap();
        let mut bytes = vec![FLAG_BOUNCEABLE, 0];
        bytes.extend_from_slice(&raw.hash);
        bytes.extend_from_slice(&[0, 0]);
        let text = Base64Url::encode_string(&bytes);
        assert_eq!(text.parse::<TonAddress>(), Err(AddressError::Checksum));
    }

    #[test]
    fn malformed_addresses_rejected() {
        assert_eq!("x:00".parse::<TonAddress>(), Err(AddressError::Workchain));
        assert_eq!("0:abcd".parse::<TonAddress>(), Err(AddressError::Hash));
        assert_eq!("short".parse::<TonAddress>(), Err(AddressError::Encoding));
    }
}
