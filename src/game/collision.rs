//! Death resolution from contact events.
//!
//! Own-vehicle contacts are already masked out by the collision groups;
//! the owner check here is a second line against anything the filter
//! lets through.

use crate::physics::{BodyRole, ContactPair};

use super::PlayerId;

/// Scan one tick's started contacts in order and return the first player
/// whose head touched something that is neither a sensor nor their own
/// vehicle. Later qualifying pairs in the same batch are irrelevant: the
/// round-end transition is idempotent.
pub fn first_death(contacts: &[ContactPair]) -> Option<PlayerId> {
    for pair in contacts {
        if pair.sensor {
            continue;
        }
        for (role, other) in [(pair.a, pair.b), (pair.b, pair.a)] {
            if let BodyRole::Head(owner) = role {
                if other.owner() != Some(owner) {
                    return Some(owner);
                }
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(a: BodyRole, b: BodyRole) -> ContactPair {
        ContactPair {
            a,
            b,
            sensor: false,
        }
    }

    #[test]
    fn head_on_terrain_kills_the_owner() {
        let contacts = [pair(BodyRole::Head(PlayerId::One), BodyRole::Terrain)];
        assert_eq!(first_death(&contacts), Some(PlayerId::One));
        // Either ordering of the pair is recognized.
        let flipped = [pair(BodyRole::Terrain, BodyRole::Head(PlayerId::Two))];
        assert_eq!(first_death(&flipped), Some(PlayerId::Two));
    }

    #[test]
    fn head_on_enemy_part_kills_the_head_owner() {
        let contacts = [pair(
            BodyRole::Head(PlayerId::Two),
            BodyRole::Chassis(PlayerId::One),
        )];
        assert_eq!(first_death(&contacts), Some(PlayerId::Two));
    }

    #[test]
    fn own_parts_do_not_kill() {
        let contacts = [
            pair(BodyRole::Head(PlayerId::One), BodyRole::Wheel(PlayerId::One)),
            pair(
                BodyRole::Chassis(PlayerId::One),
                BodyRole::Head(PlayerId::One),
            ),
        ];
        assert_eq!(first_death(&contacts), None);
    }

    #[test]
    fn sensors_are_pass_through() {
        let contacts = [ContactPair {
            a: BodyRole::Head(PlayerId::One),
            b: BodyRole::Hazard,
            sensor: true,
        }];
        assert_eq!(first_death(&contacts), None);
    }

    #[test]
    fn non_head_contacts_are_ignored() {
        let contacts = [
            pair(BodyRole::Wheel(PlayerId::One), BodyRole::Terrain),
            pair(
                BodyRole::Chassis(PlayerId::Two),
                BodyRole::Chassis(PlayerId::One),
            ),
            pair(BodyRole::Debris, BodyRole::Terrain),
        ];
        assert_eq!(first_death(&contacts), None);
    }

    #[test]
    fn first_qualifying_pair_in_batch_order_decides() {
        let contacts = [
            pair(BodyRole::Wheel(PlayerId::One), BodyRole::Terrain),
            pair(BodyRole::Head(PlayerId::Two), BodyRole::Terrain),
            pair(BodyRole::Head(PlayerId::One), BodyRole::Terrain),
        ];
        assert_eq!(first_death(&contacts), Some(PlayerId::Two));
    }

    #[test]
    fn head_to_head_resolves_against_the_first_ordering() {
        let contacts = [pair(
            BodyRole::Head(PlayerId::One),
            BodyRole::Head(PlayerId::Two),
        )];
        assert_eq!(first_death(&contacts), Some(PlayerId::One));
    }

    #[test]
    fn debris_counts_as_foreign() {
        let contacts = [pair(BodyRole::Head(PlayerId::Two), BodyRole::Debris)];
        assert_eq!(first_death(&contacts), Some(PlayerId::Two));
    }
}
