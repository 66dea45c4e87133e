use cosmwasm_schema::{cw_serde, QueryResponses};
use cosmwasm_std::{Addr, Coin, HexBinary, Timestamp, Uint256};

use crate::phase::Phase;
use crate::state::Coordinate;

#[cw_serde]
pub struct InstantiateMsg {
    pub name: String,
    pub description: String,
    /// Deposits are accepted until this time
    pub registration_end_time: Timestamp,
    /// Coordinates are accepted until this time
    pub game_end_time: Timestamp,
    /// Seconds after game_end_time during which the treasure is revealed
    /// and the closest player tracked
    pub resolution_duration: u64,
    /// Exact amount to deposit in order to play
    pub registration_fee: Coin,
    /// hex-encoded sha256 digest of the treasure coordinate
    pub treasure_commitment: HexBinary,
    /// Maximum number of coordinates per participant. None means unbounded.
    pub max_coordinates: Option<u32>,
}

#[cw_serde]
pub enum ExecuteMsg {
    // Pays the registration fee. Must be sent with exactly the fee as funds.
    Deposit {},
    // Refunds the fee during registration, or after completion when nobody was ever closest
    WithdrawDeposit {},
    AddCoordinate {
        x: i64,
        y: i64,
    },
    // Anyone can reveal, only the committed coordinate is accepted.
    // A reveal after the resolution phase can no longer produce a winner.
    Reveal {
        x: i64,
        y: i64,
    },
    // Anyone can post an improvement on behalf of a player
    UpdateClosest {
        player: String,
        coordinate_index: u32,
    },
    // Sends the whole prize pool to the closest player
    WithdrawReward {},
}

#[cw_serde]
pub struct MigrateMsg {}

#[cw_serde]
#[derive(QueryResponses)]
pub enum QueryMsg {
    #[returns(ConfigResponse)]
    Config {},
    #[returns(PhaseResponse)]
    Phase {},
    #[returns(TreasureResponse)]
    Treasure {},
    /// Fails if no closest player has been recorded yet
    #[returns(ClosestPlayerResponse)]
    ClosestPlayer {},
    #[returns(ActiveDepositResponse)]
    ActiveDeposit { address: String },
    #[returns(ParticipantResponse)]
    Participant { address: String },
    #[returns(CoordinateResponse)]
    Coordinate { address: String, index: u32 },
    #[returns(CoordinatesResponse)]
    Coordinates {
        address: String,
        start_after: Option<u32>,
        limit: Option<u32>,
    },
    #[returns(ParticipantsResponse)]
    Participants {
        start_after: Option<String>,
        limit: Option<u32>,
    },
    /// The prize pool held by the contract
    #[returns(PoolResponse)]
    Pool {},
}

#[cw_serde]
pub struct ConfigResponse {
    pub name: String,
    pub description: String,
    pub registration_end_time: Timestamp,
    pub game_end_time: Timestamp,
    pub resolution_end_time: Timestamp,
    pub registration_fee: Coin,
    pub treasure_commitment: HexBinary,
    pub max_coordinates: Option<u32>,
}

#[cw_serde]
pub struct PhaseResponse {
    pub phase: Phase,
}

#[cw_serde]
pub struct TreasureResponse {
    pub commitment: HexBinary,
    // None until the treasure is revealed
    pub revealed: Option<Coordinate>,
}

#[cw_serde]
pub struct ClosestPlayerResponse {
    pub player: Addr,
    pub distance: Uint256,
    pub coordinate: Coordinate,
}

#[cw_serde]
pub struct ActiveDepositResponse {
    pub active_deposit: bool,
}

#[cw_serde]
pub struct ParticipantResponse {
    // None means never deposited
    pub participant: Option<ParticipantDataResponse>,
}

#[cw_serde]
pub struct ParticipantDataResponse {
    pub active_deposit: bool,
    pub coordinate_count: u32,
}

#[cw_serde]
pub struct CoordinateResponse {
    pub coordinate: Coordinate,
}

#[cw_serde]
pub struct CoordinatesResponse {
    pub coordinates: Vec<IndexedCoordinate>,
}

#[cw_serde]
pub struct IndexedCoordinate {
    pub index: u32,
    pub coordinate: Coordinate,
}

#[cw_serde]
pub struct ParticipantsResponse {
    pub participants: Vec<ParticipantEntry>,
}

#[cw_serde]
pub struct ParticipantEntry {
    pub address: Addr,
    pub active_deposit: bool,
    pub coordinate_count: u32,
}

#[cw_serde]
pub struct PoolResponse {
    pub balance: Coin,
    pub active_depositors: u32,
}
