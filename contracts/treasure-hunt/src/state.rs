use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Addr, Coin, HexBinary, Uint256};
use cw_storage_plus::{Item, Map};

use crate::phase::Timeline;

#[cw_serde]
pub struct Config {
    pub name: String,
    pub description: String,
    pub timeline: Timeline,
    /// The exact amount every participant deposits. Its denom is the denom of the prize pool.
    pub registration_fee: Coin,
    /// sha256 digest of the hidden treasure coordinate
    pub treasure_commitment: HexBinary,
    // None means participants can submit as many coordinates as they like
    pub max_coordinates: Option<u32>,
}

/// A point in scaled integer degrees (1e-9 degree resolution).
#[cw_serde]
#[derive(Copy, Eq)]
pub struct Coordinate {
    pub x: i64,
    pub y: i64,
}

impl Coordinate {
    pub fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}

#[cw_serde]
#[derive(Default)]
pub struct ParticipantData {
    // false after a refund, the coordinates submitted so far are kept
    pub active_deposit: bool,
    // number of entries of this participant in COORDINATES
    pub coordinate_count: u32,
}

#[cw_serde]
pub struct ClosestRecord {
    /// Uint256::MAX until the first candidate is recorded
    pub best_distance: Uint256,
    pub best_coordinate: Option<Coordinate>,
    pub best_player: Option<Addr>,
}

impl ClosestRecord {
    pub fn empty() -> Self {
        Self {
            best_distance: Uint256::MAX,
            best_coordinate: None,
            best_player: None,
        }
    }

    pub fn has_candidate(&self) -> bool {
        self.best_player.is_some()
    }
}

pub const CONFIG_KEY: &str = "config";
pub const CONFIG: Item<Config> = Item::new(CONFIG_KEY);

/// Set once a coordinate matching the commitment is revealed
pub const TREASURE: Item<Coordinate> = Item::new("treasure");

pub const CLOSEST: Item<ClosestRecord> = Item::new("closest");

/// Number of participants currently holding a deposit
pub const ACTIVE_DEPOSITORS: Item<u32> = Item::new("active");

/// A map that stores participant addresses and their deposit state.
pub const PARTICIPANTS: Map<&Addr, ParticipantData> = Map::new("p");

/// Submitted coordinates keyed by participant and submission index.
pub const COORDINATES: Map<(&Addr, u32), Coordinate> = Map::new("c");
