// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Wallet state init.
//!
//! A TON address is the hash of the contract's initial state, so a state init
//! whose hash matches the claimed address is authoritative for that address.
//! The wallet's public key is read from the data cell, never from the request.
//!
//! ```text
//! StateInit = split_depth:(Maybe (## 5)) special:(Maybe TickTock)
//!             code:(Maybe ^Cell) data:(Maybe ^Cell) library:(Maybe ^Cell)
//! ```

use thiserror::Error;

use super::boc::{BagOfCells, BocError, CellParser, CellRef};

const SPLIT_DEPTH_BITS: usize = 5;
const TICK_TOCK_BITS: usize = 2;

/// Standard wallet data layouts, keyed by data cell length in bits, with the
/// bit offset of the 256-bit public key.
///
/// | Wallet | Data fields | Bits |
/// |--------|-------------|------|
/// | v1, v2 | `seqno:32 public_key:256` | 288 |
/// | v3 | `seqno:32 subwallet:32 public_key:256` | 320 |
/// | v4 | `seqno:32 subwallet:32 public_key:256 plugins:dict` | 321 |
/// | v5 | `signature_allowed:1 seqno:32 wallet_id:32 public_key:256 extensions:dict` | 322 |
const WALLET_LAYOUTS: [(usize, usize); 4] = [(288, 32), (320, 64), (321, 64), (322, 65)];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StateInitError {
    #[error("state init is not a valid bag of cells: {0}")]
    Boc(#[from] BocError),
    #[error("state init has no {0} cell")]
    Missing(&'static str),
    #[error("wallet data layout is not recognised ({0} bits)")]
    UnknownLayout(usize),
}

/// What a wallet state init commits to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalletStateInit {
    /// Representation hash of the state init; equals the address hash.
    pub hash: [u8; 32],
    pub public_key: [u8; 32],
}

impl WalletStateInit {
    /// Parse a base64 `walletStateInit` as sent by TON Connect wallets.
    pub fn from_base64(text: &str) -> Result<Self, StateInitError> {
        let boc = BagOfCells::parse_base64(text)?;
        let root = boc.single_root()?;

        let mut parser = root.parser();
        if parser.load_bit()? {
            parser.skip_bits(SPLIT_DEPTH_BITS)?;
        }
        if parser.load_bit()? {
            parser.skip_bits(TICK_TOCK_BITS)?;
        }
        let code = optional_ref(&mut parser)?;
        let data = optional_ref(&mut parser)?;

        if code.is_none() {
            return Err(StateInitError::Missing("code"));
        }
        let data = data.ok_or(StateInitError::Missing("data"))?;

        Ok(Self {
            hash: root.hash(),
            public_key: wallet_public_key(data)?,
        })
    }
}

fn optional_ref<'a>(parser: &mut CellParser<'a>) -> Result<Option<CellRef<'a>>, BocError> {
    if parser.load_bit()? {
        parser.load_ref().map(Some)
    } else {
        Ok(None)
    }
}

fn wallet_public_key(data: CellRef<'_>) -> Result<[u8; 32], StateInitError> {
    let bits = data.bit_len();
    let (_, offset) = WALLET_LAYOUTS
        .iter()
        .find(|(len, _)| *len == bits)
        .ok_or(StateInitError::UnknownLayout(bits))?;

    let mut parser = data.parser();
    parser.skip_bits(*offset)?;
    Ok(parser.load_bytes::<32>()?)
}
