use cosmwasm_std::{
    ensure, ensure_eq, entry_point, to_binary, Attribute, BankMsg, Deps, DepsMut, Env,
    MessageInfo, Order, QueryResponse, Response, StdResult, Timestamp, Uint128,
};
use cw2::{get_contract_version, set_contract_version};
use cw_storage_plus::Bound;

use crate::commitment::{squared_distance, Sha256Commitment, TreasureVerifier};
use crate::error::ContractError;
use crate::msg::{
    ActiveDepositResponse, ClosestPlayerResponse, ConfigResponse, CoordinateResponse,
    CoordinatesResponse, ExecuteMsg, IndexedCoordinate, InstantiateMsg, MigrateMsg,
    ParticipantDataResponse, ParticipantEntry, ParticipantResponse, ParticipantsResponse,
    PhaseResponse, PoolResponse, QueryMsg, TreasureResponse,
};
use crate::phase::{Phase, Timeline};
use crate::state::{
    ClosestRecord, Config, Coordinate, ParticipantData, ACTIVE_DEPOSITORS, CLOSEST, CONFIG,
    COORDINATES, PARTICIPANTS, TREASURE,
};

const CONTRACT_NAME: &str = concat!("crates.io:", env!("CARGO_PKG_NAME"));
const CONTRACT_VERSION: &str = env!("CARGO_PKG_VERSION");

const DEFAULT_LIMIT: u32 = 30;
const MAX_LIMIT: u32 = 100;

/// Checks revealed coordinates against the treasure commitment
type Verifier = Sha256Commitment;

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn instantiate(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    msg: InstantiateMsg,
) -> Result<Response, ContractError> {
    nonpayable(&info)?;

    if msg.registration_end_time > msg.game_end_time {
        return Err(ContractError::InvalidTimeline {});
    }
    let resolution_end = msg
        .resolution_duration
        .checked_mul(1_000_000_000)
        .and_then(|nanos| msg.game_end_time.nanos().checked_add(nanos))
        .map(Timestamp::from_nanos)
        .ok_or(ContractError::InvalidTimeline {})?;
    if msg.registration_fee.amount.is_zero() {
        return Err(ContractError::ZeroRegistrationFee {});
    }
    if msg.treasure_commitment.len() != 32 {
        return Err(ContractError::WrongCommitmentLength {});
    }
    if msg.max_coordinates == Some(0) {
        return Err(ContractError::InvalidCoordinateCap {});
    }

    let config = Config {
        name: msg.name,
        description: msg.description,
        timeline: Timeline {
            registration_end: msg.registration_end_time,
            game_end: msg.game_end_time,
            resolution_end,
        },
        registration_fee: msg.registration_fee,
        treasure_commitment: msg.treasure_commitment,
        max_coordinates: msg.max_coordinates,
    };
    set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;
    CONFIG.save(deps.storage, &config)?;
    CLOSEST.save(deps.storage, &ClosestRecord::empty())?;
    ACTIVE_DEPOSITORS.save(deps.storage, &0)?;

    Ok(Response::new().add_attributes(vec![
        Attribute::new("action", "instantiate"),
        Attribute::new("name", config.name),
        Attribute::new("registration_fee", config.registration_fee.to_string()),
        Attribute::new("treasure_commitment", config.treasure_commitment.to_hex()),
        Attribute::new(
            "resolution_end_time",
            config.timeline.resolution_end.to_string(),
        ),
    ]))
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn execute(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    msg: ExecuteMsg,
) -> Result<Response, ContractError> {
    match msg {
        ExecuteMsg::Deposit {} => execute_deposit(deps, env, info),
        ExecuteMsg::WithdrawDeposit {} => execute_withdraw_deposit(deps, env, info),
        ExecuteMsg::AddCoordinate { x, y } => execute_add_coordinate(deps, env, info, x, y),
        ExecuteMsg::Reveal { x, y } => execute_reveal(deps, env, info, x, y),
        // Permissionless, anyone can race to post a better candidate for any player
        ExecuteMsg::UpdateClosest {
            player,
            coordinate_index,
        } => execute_update_closest(deps, env, info, player, coordinate_index),
        ExecuteMsg::WithdrawReward {} => execute_withdraw_reward(deps, env, info),
    }
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn query(deps: Deps, env: Env, msg: QueryMsg) -> Result<QueryResponse, ContractError> {
    let response = match msg {
        QueryMsg::Config {} => to_binary(&query_config(deps)?)?,
        QueryMsg::Phase {} => to_binary(&query_phase(deps, env)?)?,
        QueryMsg::Treasure {} => to_binary(&query_treasure(deps)?)?,
        QueryMsg::ClosestPlayer {} => to_binary(&query_closest_player(deps)?)?,
        QueryMsg::ActiveDeposit { address } => to_binary(&query_active_deposit(deps, address)?)?,
        QueryMsg::Participant { address } => to_binary(&query_participant(deps, address)?)?,
        QueryMsg::Coordinate { address, index } => {
            to_binary(&query_coordinate(deps, address, index)?)?
        }
        QueryMsg::Coordinates {
            address,
            start_after,
            limit,
        } => to_binary(&query_coordinates(deps, address, start_after, limit)?)?,
        QueryMsg::Participants { start_after, limit } => {
            to_binary(&query_participants(deps, start_after, limit)?)?
        }
        QueryMsg::Pool {} => to_binary(&query_pool(deps, env)?)?,
    };
    Ok(response)
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn migrate(deps: DepsMut, _env: Env, _msg: MigrateMsg) -> Result<Response, ContractError> {
    let previous = get_contract_version(deps.storage)?;
    if previous.contract != CONTRACT_NAME {
        return Err(ContractError::CannotMigrate {
            previous_contract: previous.contract,
        });
    }
    set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;

    Ok(Response::new()
        .add_attribute("action", "migrate")
        .add_attribute("previous_version", previous.version)
        .add_attribute("version", CONTRACT_VERSION))
}

fn execute_deposit(deps: DepsMut, env: Env, info: MessageInfo) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    let phase = config.timeline.phase_at(env.block.time);
    ensure_eq!(phase, Phase::Registration, ContractError::NotInPhase { phase });

    let amount = sent_amount(&info, &config.registration_fee.denom)?;
    ensure_eq!(
        amount,
        config.registration_fee.amount,
        ContractError::InvalidDepositAmount { amount }
    );

    // A participant who withdrew during registration can deposit again and keeps its record
    let participant = PARTICIPANTS
        .may_load(deps.storage, &info.sender)?
        .unwrap_or_default();
    ensure!(!participant.active_deposit, ContractError::AlreadyRegistered {});

    PARTICIPANTS.save(
        deps.storage,
        &info.sender,
        &ParticipantData {
            active_deposit: true,
            ..participant
        },
    )?;
    ACTIVE_DEPOSITORS.update(deps.storage, |count| -> StdResult<_> { Ok(count + 1) })?;

    Ok(Response::new().add_attributes(vec![
        Attribute::new("action", "deposit_received"),
        Attribute::new("player", info.sender),
        Attribute::new("amount", config.registration_fee.to_string()),
    ]))
}

fn execute_withdraw_deposit(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
) -> Result<Response, ContractError> {
    nonpayable(&info)?;
    let config = CONFIG.load(deps.storage)?;
    let phase = config.timeline.phase_at(env.block.time);

    // After completion the pool is only refunded when nobody was ever closest
    let refunds_open = match phase {
        Phase::Registration => true,
        Phase::Completed => !CLOSEST.load(deps.storage)?.has_candidate(),
        Phase::Active | Phase::Resolution => false,
    };
    ensure!(refunds_open, ContractError::NotInPhase { phase });

    let mut participant = PARTICIPANTS
        .may_load(deps.storage, &info.sender)?
        .filter(|participant| participant.active_deposit)
        .ok_or(ContractError::NoActiveDeposit {})?;

    // Bookkeeping is final before the refund leaves the contract.
    // If the send fails the whole transaction, including these writes, is reverted.
    participant.active_deposit = false;
    PARTICIPANTS.save(deps.storage, &info.sender, &participant)?;
    ACTIVE_DEPOSITORS.update(deps.storage, |count| -> StdResult<_> { Ok(count - 1) })?;

    let refund = config.registration_fee;
    Ok(Response::new()
        .add_message(BankMsg::Send {
            to_address: info.sender.to_string(),
            amount: vec![refund.clone()],
        })
        .add_attributes(vec![
            Attribute::new("action", "deposit_withdrawn"),
            Attribute::new("player", info.sender),
            Attribute::new("amount", refund.to_string()),
        ]))
}

fn execute_add_coordinate(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    x: i64,
    y: i64,
) -> Result<Response, ContractError> {
    nonpayable(&info)?;
    let config = CONFIG.load(deps.storage)?;
    let phase = config.timeline.phase_at(env.block.time);
    ensure_eq!(phase, Phase::Active, ContractError::NotInPhase { phase });

    let mut participant = PARTICIPANTS
        .may_load(deps.storage, &info.sender)?
        .filter(|participant| participant.active_deposit)
        .ok_or(ContractError::NotRegistered {})?;

    let max = config.max_coordinates.unwrap_or(u32::MAX);
    ensure!(
        participant.coordinate_count < max,
        ContractError::CoordinateLimitReached { max }
    );

    let index = participant.coordinate_count;
    COORDINATES.save(deps.storage, (&info.sender, index), &Coordinate::new(x, y))?;
    participant.coordinate_count += 1;
    PARTICIPANTS.save(deps.storage, &info.sender, &participant)?;

    Ok(Response::new().add_attributes(vec![
        Attribute::new("action", "coordinate_added"),
        Attribute::new("player", info.sender),
        Attribute::new("index", index.to_string()),
        Attribute::new("x", x.to_string()),
        Attribute::new("y", y.to_string()),
    ]))
}

fn execute_reveal(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    x: i64,
    y: i64,
) -> Result<Response, ContractError> {
    nonpayable(&info)?;
    let config = CONFIG.load(deps.storage)?;
    let phase = config.timeline.phase_at(env.block.time);
    ensure!(
        matches!(phase, Phase::Resolution | Phase::Completed),
        ContractError::NotInPhase { phase }
    );

    // Only the committed coordinate passes, so repeating a reveal cannot change the treasure
    let coordinate = Coordinate::new(x, y);
    ensure!(
        Verifier::verify(&config.treasure_commitment, &coordinate),
        ContractError::InvalidTreasureCoordinate {}
    );
    TREASURE.save(deps.storage, &coordinate)?;

    Ok(Response::new().add_attributes(vec![
        Attribute::new("action", "treasure_revealed"),
        Attribute::new("address", info.sender),
        Attribute::new("x", x.to_string()),
        Attribute::new("y", y.to_string()),
    ]))
}

fn execute_update_closest(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    player: String,
    coordinate_index: u32,
) -> Result<Response, ContractError> {
    nonpayable(&info)?;
    let config = CONFIG.load(deps.storage)?;
    let phase = config.timeline.phase_at(env.block.time);
    ensure_eq!(phase, Phase::Resolution, ContractError::NotInPhase { phase });

    let treasure = TREASURE
        .may_load(deps.storage)?
        .ok_or(ContractError::TreasureNotRevealed {})?;

    let player = deps.api.addr_validate(&player)?;
    let participant = PARTICIPANTS
        .may_load(deps.storage, &player)?
        .filter(|participant| participant.active_deposit)
        .ok_or_else(|| ContractError::PlayerNotActive {
            player: player.to_string(),
        })?;
    let coordinate = COORDINATES
        .may_load(deps.storage, (&player, coordinate_index))?
        .ok_or(ContractError::CoordinateIndexOutOfRange {
            index: coordinate_index,
            len: participant.coordinate_count,
        })?;

    let distance = squared_distance(&coordinate, &treasure);
    let closest = CLOSEST.load(deps.storage)?;
    // Strict improvement only. Equal distances keep the player who posted first.
    ensure!(
        distance < closest.best_distance,
        ContractError::TooFar {
            distance,
            best: closest.best_distance,
        }
    );
    CLOSEST.save(
        deps.storage,
        &ClosestRecord {
            best_distance: distance,
            best_coordinate: Some(coordinate),
            best_player: Some(player.clone()),
        },
    )?;

    Ok(Response::new().add_attributes(vec![
        Attribute::new("action", "closest_player_updated"),
        Attribute::new("address", info.sender),
        Attribute::new("player", player),
        Attribute::new("distance", distance.to_string()),
        Attribute::new("x", coordinate.x.to_string()),
        Attribute::new("y", coordinate.y.to_string()),
    ]))
}

fn execute_withdraw_reward(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
) -> Result<Response, ContractError> {
    nonpayable(&info)?;
    let config = CONFIG.load(deps.storage)?;
    let phase = config.timeline.phase_at(env.block.time);
    ensure_eq!(phase, Phase::Completed, ContractError::NotInPhase { phase });

    let closest = CLOSEST.load(deps.storage)?;
    ensure!(
        closest.best_player.as_ref() == Some(&info.sender),
        ContractError::NotTheWinner {}
    );

    // The whole pool goes out in a single send, the chain reverts everything if it fails
    let pool = deps
        .querier
        .query_balance(env.contract.address, config.registration_fee.denom)?;
    ensure!(!pool.amount.is_zero(), ContractError::EmptyPool {});

    Ok(Response::new()
        .add_message(BankMsg::Send {
            to_address: info.sender.to_string(),
            amount: vec![pool.clone()],
        })
        .add_attributes(vec![
            Attribute::new("action", "reward_withdrawn"),
            Attribute::new("player", info.sender),
            Attribute::new("amount", pool.to_string()),
        ]))
}

/// Sum of the funds sent in `denom`. Any other denom is rejected.
fn sent_amount(info: &MessageInfo, denom: &str) -> Result<Uint128, ContractError> {
    let mut amount = Uint128::zero();
    for coin in &info.funds {
        if coin.denom != denom {
            return Err(ContractError::UnexpectedFunds {
                denom: coin.denom.clone(),
            });
        }
        amount += coin.amount;
    }
    Ok(amount)
}

fn nonpayable(info: &MessageInfo) -> Result<(), ContractError> {
    match info.funds.first() {
        Some(coin) => Err(ContractError::UnexpectedFunds {
            denom: coin.denom.clone(),
        }),
        None => Ok(()),
    }
}

fn query_config(deps: Deps) -> StdResult<ConfigResponse> {
    let config = CONFIG.load(deps.storage)?;
    Ok(ConfigResponse {
        name: config.name,
        description: config.description,
        registration_end_time: config.timeline.registration_end,
        game_end_time: config.timeline.game_end,
        resolution_end_time: config.timeline.resolution_end,
        registration_fee: config.registration_fee,
        treasure_commitment: config.treasure_commitment,
        max_coordinates: config.max_coordinates,
    })
}

fn query_phase(deps: Deps, env: Env) -> StdResult<PhaseResponse> {
    let config = CONFIG.load(deps.storage)?;
    Ok(PhaseResponse {
        phase: config.timeline.phase_at(env.block.time),
    })
}

fn query_treasure(deps: Deps) -> StdResult<TreasureResponse> {
    let config = CONFIG.load(deps.storage)?;
    Ok(TreasureResponse {
        commitment: config.treasure_commitment,
        revealed: TREASURE.may_load(deps.storage)?,
    })
}

fn query_closest_player(deps: Deps) -> Result<ClosestPlayerResponse, ContractError> {
    let closest = CLOSEST.load(deps.storage)?;
    match (closest.best_player, closest.best_coordinate) {
        (Some(player), Some(coordinate)) => Ok(ClosestPlayerResponse {
            player,
            distance: closest.best_distance,
            coordinate,
        }),
        _ => Err(ContractError::NoClosestCandidate {}),
    }
}

fn query_active_deposit(deps: Deps, address: String) -> StdResult<ActiveDepositResponse> {
    let address = deps.api.addr_validate(&address)?;
    let active_deposit = PARTICIPANTS
        .may_load(deps.storage, &address)?
        .map_or(false, |participant| participant.active_deposit);
    Ok(ActiveDepositResponse { active_deposit })
}

fn query_participant(deps: Deps, address: String) -> StdResult<ParticipantResponse> {
    let address = deps.api.addr_validate(&address)?;
    let participant = PARTICIPANTS
        .may_load(deps.storage, &address)?
        .map(|participant| ParticipantDataResponse {
            active_deposit: participant.active_deposit,
            coordinate_count: participant.coordinate_count,
        });
    Ok(ParticipantResponse { participant })
}

fn query_coordinate(
    deps: Deps,
    address: String,
    index: u32,
) -> Result<CoordinateResponse, ContractError> {
    let address = deps.api.addr_validate(&address)?;
    match COORDINATES.may_load(deps.storage, (&address, index))? {
        Some(coordinate) => Ok(CoordinateResponse { coordinate }),
        None => {
            let len = PARTICIPANTS
                .may_load(deps.storage, &address)?
                .map_or(0, |participant| participant.coordinate_count);
            Err(ContractError::CoordinateIndexOutOfRange { index, len })
        }
    }
}

fn query_coordinates(
    deps: Deps,
    address: String,
    start_after: Option<u32>,
    limit: Option<u32>,
) -> StdResult<CoordinatesResponse> {
    let address = deps.api.addr_validate(&address)?;
    let limit = limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT) as usize;
    let coordinates = COORDINATES
        .prefix(&address)
        .range(
            deps.storage,
            start_after.map(Bound::exclusive),
            None,
            Order::Ascending,
        )
        .take(limit)
        .map(|item| item.map(|(index, coordinate)| IndexedCoordinate { index, coordinate }))
        .collect::<StdResult<Vec<_>>>()?;
    Ok(CoordinatesResponse { coordinates })
}

fn query_participants(
    deps: Deps,
    start_after: Option<String>,
    limit: Option<u32>,
) -> StdResult<ParticipantsResponse> {
    let start_after = start_after
        .map(|address| deps.api.addr_validate(&address))
        .transpose()?;
    let limit = limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT) as usize;
    let participants = PARTICIPANTS
        .range(
            deps.storage,
            start_after.as_ref().map(Bound::exclusive),
            None,
            Order::Ascending,
        )
        .take(limit)
        .map(|item| {
            item.map(|(address, participant)| ParticipantEntry {
                address,
                active_deposit: participant.active_deposit,
                coordinate_count: participant.coordinate_count,
            })
        })
        .collect::<StdResult<Vec<_>>>()?;
    Ok(ParticipantsResponse { participants })
}

fn query_pool(deps: Deps, env: Env) -> StdResult<PoolResponse> {
    let config = CONFIG.load(deps.storage)?;
    let balance = deps
        .querier
        .query_balance(env.contract.address, config.registration_fee.denom)?;
    Ok(PoolResponse {
        balance,
        active_depositors: ACTIVE_DEPOSITORS.load(deps.storage)?,
    })
}
