use cosmwasm_std::{Uint128, Uint256};
use sha2::{Digest, Sha256};

use crate::state::Coordinate;

/// Checks a revealed coordinate against the commitment made at instantiation.
///
/// The game only ships a hash commitment, which discloses the treasure in full once it
/// is revealed. A verifier that keeps the coordinate private can replace it here.
pub trait TreasureVerifier {
    fn digest(coordinate: &Coordinate) -> [u8; 32];

    fn verify(commitment: &[u8], coordinate: &Coordinate) -> bool {
        Self::digest(coordinate).as_slice() == commitment
    }
}

/// sha256 over the big endian bytes of x followed by y
pub struct Sha256Commitment;

impl TreasureVerifier for Sha256Commitment {
    fn digest(coordinate: &Coordinate) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(coordinate.x.to_be_bytes());
        hasher.update(coordinate.y.to_be_bytes());
        hasher.finalize().into()
    }
}

/// Squared euclidean distance on the scaled integer axes. This is not a geodesic distance.
///
/// Each axis difference fits in 65 bits, so the sum of squares always fits in a Uint256.
pub fn squared_distance(a: &Coordinate, b: &Coordinate) -> Uint256 {
    let dx = Uint128::new((i128::from(a.x) - i128::from(b.x)).unsigned_abs());
    let dy = Uint128::new((i128::from(a.y) - i128::from(b.y)).unsigned_abs());
    dx.full_mul(dx) + dy.full_mul(dy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cosmwasm_std::HexBinary;

    #[test]
    fn digest_of_known_coordinates() {
        assert_eq!(
            HexBinary::from(Sha256Commitment::digest(&Coordinate::new(0, 0)).to_vec()),
            HexBinary::from_hex("374708fff7719dd5979ec875d56cd2286f6d3cf7ec317a3b25632aab28ec37bb")
                .unwrap()
        );
        // Eiffel tower, 48.858222 N 2.294481 E
        assert_eq!(
            HexBinary::from(
                Sha256Commitment::digest(&Coordinate::new(48_858_222_000, 2_294_481_000)).to_vec()
            ),
            HexBinary::from_hex("bdc719168f63f3cc8055e88ea202083174fad7565c578c26daea936382e12c08")
                .unwrap()
        );
        assert_eq!(
            HexBinary::from(Sha256Commitment::digest(&Coordinate::new(-1, 1)).to_vec()),
            HexBinary::from_hex("7e6f1ad0dcc726b7fd45df7373af64daa146e1635baac00b6fa80b031a101a47")
                .unwrap()
        );
    }

    #[test]
    fn verify_only_accepts_the_committed_coordinate() {
        let treasure = Coordinate::new(48_858_222_000, 2_294_481_000);
        let commitment = Sha256Commitment::digest(&treasure);

        assert!(Sha256Commitment::verify(&commitment, &treasure));
        let swapped = Coordinate::new(2_294_481_000, 48_858_222_000);
        assert!(!Sha256Commitment::verify(&commitment, &swapped));
        let off_by_one = Coordinate::new(48_858_222_000, 2_294_481_001);
        assert!(!Sha256Commitment::verify(&commitment, &off_by_one));
        assert!(!Sha256Commitment::verify(&commitment[..31], &treasure));
    }

    #[test]
    fn distance_is_squared_euclidean() {
        let origin = Coordinate::new(0, 0);
        assert_eq!(squared_distance(&Coordinate::new(10, 10), &origin), Uint256::from(200u128));
        assert_eq!(squared_distance(&Coordinate::new(5, 5), &origin), Uint256::from(50u128));
        assert_eq!(squared_distance(&Coordinate::new(-3, 4), &origin), Uint256::from(25u128));
        assert_eq!(
            squared_distance(&Coordinate::new(7, -2), &Coordinate::new(-1, 4)),
            squared_distance(&Coordinate::new(-1, 4), &Coordinate::new(7, -2)),
        );
    }

    #[test]
    fn distance_is_zero_only_on_the_treasure() {
        let treasure = Coordinate::new(-12_345, 678);
        assert_eq!(squared_distance(&treasure, &treasure), Uint256::zero());
        assert!(!squared_distance(&Coordinate::new(-12_345, 679), &treasure).is_zero());
        assert!(!squared_distance(&Coordinate::new(-12_344, 678), &treasure).is_zero());
    }

    #[test]
    fn distance_does_not_overflow_at_the_extremes() {
        let min = Coordinate::new(i64::MIN, i64::MIN);
        let max = Coordinate::new(i64::MAX, i64::MAX);
        let span = Uint128::new(u64::MAX as u128);
        let expected = span.full_mul(span) + span.full_mul(span);

        assert_eq!(squared_distance(&min, &max), expected);
        assert!(squared_distance(&min, &max) < Uint256::MAX);
    }
}
