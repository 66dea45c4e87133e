use thiserror::Error;

use cosmwasm_std::{StdError, Uint128, Uint256};

use crate::phase::Phase;

#[derive(Error, Debug, PartialEq)]
pub enum ContractError {
    #[error("{0}")]
    Std(#[from] StdError),

    #[error("Registration must end before the game ends")]
    InvalidTimeline {},

    #[error("Registration fee must be greater than zero")]
    ZeroRegistrationFee {},

    #[error("Treasure commitment must be a 32 byte digest")]
    WrongCommitmentLength {},

    #[error("Coordinate cap must be greater than zero")]
    InvalidCoordinateCap {},

    #[error("Cannot migrate from different contract type: {previous_contract}")]
    CannotMigrate { previous_contract: String },

    #[error("Not allowed during the {phase} phase")]
    NotInPhase { phase: Phase },

    // funds attached to a message that does not take a deposit would never be accounted for
    #[error("Unexpected funds sent in {denom}")]
    UnexpectedFunds { denom: String },

    #[error("Deposit must match the registration fee, got {amount}")]
    InvalidDepositAmount { amount: Uint128 },

    #[error("The sender already holds an active deposit")]
    AlreadyRegistered {},

    #[error("The sender holds no active deposit")]
    NoActiveDeposit {},

    #[error("The sender is not registered for the game")]
    NotRegistered {},

    #[error("Player {player} holds no active deposit")]
    PlayerNotActive { player: String },

    #[error("Coordinate limit of {max} reached")]
    CoordinateLimitReached { max: u32 },

    #[error("Coordinate index {index} out of range, {len} coordinates submitted")]
    CoordinateIndexOutOfRange { index: u32, len: u32 },

    #[error("Coordinate does not match the treasure commitment")]
    InvalidTreasureCoordinate {},

    #[error("The treasure has not been revealed yet")]
    TreasureNotRevealed {},

    #[error("Distance {distance} does not improve on the closest distance {best}")]
    TooFar { distance: Uint256, best: Uint256 },

    #[error("No closest player has been recorded")]
    NoClosestCandidate {},

    #[error("The sender is not the closest player")]
    NotTheWinner {},

    #[error("The prize pool is empty")]
    EmptyPool {},
}
