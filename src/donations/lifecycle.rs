use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::{Actor, Role};
use crate::error::ApiError;

use super::repo::Donation;

/// Donation lifecycle states, in transition order. `Delivered` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DonationStatus {
    Pending,
    Accepted,
    InTransit,
    Delivered,
}

impl DonationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            DonationStatus::Pending => "pending",
            DonationStatus::Accepted => "accepted",
            DonationStatus::InTransit => "in_transit",
            DonationStatus::Delivered => "delivered",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(DonationStatus::Pending),
            "accepted" => Some(DonationStatus::Accepted),
            "in_transit" => Some(DonationStatus::InTransit),
            "delivered" => Some(DonationStatus::Delivered),
            _ => None,
        }
    }

    /// The only state a transition may move to from `self`.
    pub fn successor(self) -> Option<Self> {
        match self {
            DonationStatus::Pending => Some(DonationStatus::Accepted),
            DonationStatus::Accepted => Some(DonationStatus::InTransit),
            DonationStatus::InTransit => Some(DonationStatus::Delivered),
            DonationStatus::Delivered => None,
        }
    }
}

impl fmt::Display for DonationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Checks adjacency and the per-edge actor guard against a snapshot of the
/// donation. The repo re-checks the current status in its conditional UPDATE,
/// so a stale snapshot surfaces as `Conflict` there, never as a lost write.
pub fn authorize_transition(
    donation: &Donation,
    actor: Actor,
    target: DonationStatus,
) -> Result<(), ApiError> {
    let from = donation.status()?;
    if from.successor() != Some(target) {
        return Err(ApiError::InvalidTransition { from, to: target });
    }
    match target {
        DonationStatus::Accepted => {
            if actor.role != Role::Volunteer {
                return Err(ApiError::Unauthorized("only volunteers can accept donations"));
            }
            if donation.donor_id == Some(actor.id) {
                return Err(ApiError::Unauthorized(
                    "donors cannot accept their own donation",
                ));
            }
        }
        DonationStatus::InTransit | DonationStatus::Delivered => {
            if donation.volunteer_id != Some(actor.id) {
                return Err(ApiError::Unauthorized(
                    "only the assigned volunteer can advance this donation",
                ));
            }
        }
        // successor() never yields Pending
        DonationStatus::Pending => {}
    }
    Ok(())
}

pub fn authorize_delete(donation: &Donation, actor: Actor) -> Result<(), ApiError> {
    if donation.status()? != DonationStatus::Pending {
        return Err(ApiError::InvalidState(
            "only pending donations can be deleted",
        ));
    }
    if donation.donor_id != Some(actor.id) {
        return Err(ApiError::Unauthorized(
            "only the owning donor can delete a donation",
        ));
    }
    Ok(())
}

/// The other party on a donation, used to authorize a chat channel.
pub fn counterpart_of(donation: &Donation, actor_id: Uuid) -> Result<Option<Uuid>, ApiError> {
    if donation.donor_id == Some(actor_id) {
        Ok(donation.volunteer_id)
    } else if donation.volunteer_id == Some(actor_id) {
        Ok(donation.donor_id)
    } else {
        Err(ApiError::Unauthorized("not a party to this donation"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;

    fn donation(status: DonationStatus, donor: Option<Uuid>, volunteer: Option<Uuid>) -> Donation {
        Donation {
            id: Uuid::new_v4(),
            donor_id: donor,
            volunteer_id: volunteer,
            title: "bread".into(),
            description: None,
            food_type: "baked".into(),
            quantity: "5".into(),
            urgency: "normal".into(),
            status: status.as_str().into(),
            pickup_address: "1 Main St".into(),
            pickup_city: "Springfield".into(),
            expiry_date: "2026-09-01".into(),
            pickup_time: None,
            created_at: OffsetDateTime::now_utc(),
            picked_up_at: None,
            delivered_at: None,
        }
    }

    fn volunteer(id: Uuid) -> Actor {
        Actor {
            id,
            role: Role::Volunteer,
        }
    }

    fn donor(id: Uuid) -> Actor {
        Actor {
            id,
            role: Role::Donor,
        }
    }

    #[test]
    fn successor_chain_is_fixed() {
        use DonationStatus::*;
        assert_eq!(Pending.successor(), Some(Accepted));
        assert_eq!(Accepted.successor(), Some(InTransit));
        assert_eq!(InTransit.successor(), Some(Delivered));
        assert_eq!(Delivered.successor(), None);
    }

    #[test]
    fn parse_roundtrips_all_states() {
        use DonationStatus::*;
        for s in [Pending, Accepted, InTransit, Delivered] {
            assert_eq!(DonationStatus::parse(s.as_str()), Some(s));
        }
        assert_eq!(DonationStatus::parse("expired"), None);
    }

    #[test]
    fn volunteer_may_accept_pending() {
        let d = donation(DonationStatus::Pending, Some(Uuid::new_v4()), None);
        let v = volunteer(Uuid::new_v4());
        assert!(authorize_transition(&d, v, DonationStatus::Accepted).is_ok());
    }

    #[test]
    fn donor_cannot_accept_own_donation() {
        let donor_id = Uuid::new_v4();
        let d = donation(DonationStatus::Pending, Some(donor_id), None);
        // even if the donor somehow carries a volunteer token
        let err = authorize_transition(&d, volunteer(donor_id), DonationStatus::Accepted)
            .unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(_)));
    }

    #[test]
    fn donor_role_cannot_accept() {
        let d = donation(DonationStatus::Pending, Some(Uuid::new_v4()), None);
        let err =
            authorize_transition(&d, donor(Uuid::new_v4()), DonationStatus::Accepted).unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(_)));
    }

    #[test]
    fn skipping_a_state_is_invalid() {
        let d = donation(DonationStatus::Pending, Some(Uuid::new_v4()), None);
        let err = authorize_transition(&d, volunteer(Uuid::new_v4()), DonationStatus::InTransit)
            .unwrap_err();
        assert!(matches!(
            err,
            ApiError::InvalidTransition {
                from: DonationStatus::Pending,
                to: DonationStatus::InTransit
            }
        ));
    }

    #[test]
    fn backward_moves_are_invalid() {
        let vol = Uuid::new_v4();
        let d = donation(DonationStatus::Delivered, Some(Uuid::new_v4()), Some(vol));
        let err =
            authorize_transition(&d, volunteer(vol), DonationStatus::InTransit).unwrap_err();
        assert!(matches!(err, ApiError::InvalidTransition { .. }));
    }

    #[test]
    fn terminal_state_has_no_transitions() {
        let vol = Uuid::new_v4();
        let d = donation(DonationStatus::Delivered, Some(Uuid::new_v4()), Some(vol));
        for target in [
            DonationStatus::Pending,
            DonationStatus::Accepted,
            DonationStatus::InTransit,
            DonationStatus::Delivered,
        ] {
            assert!(authorize_transition(&d, volunteer(vol), target).is_err());
        }
    }

    #[test]
    fn only_assigned_volunteer_advances_past_accepted() {
        let assigned = Uuid::new_v4();
        let d = donation(DonationStatus::Accepted, Some(Uuid::new_v4()), Some(assigned));
        assert!(authorize_transition(&d, volunteer(assigned), DonationStatus::InTransit).is_ok());
        let err = authorize_transition(&d, volunteer(Uuid::new_v4()), DonationStatus::InTransit)
            .unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(_)));
    }

    #[test]
    fn anonymous_donation_acceptable_by_any_volunteer() {
        let d = donation(DonationStatus::Pending, None, None);
        assert!(authorize_transition(&d, volunteer(Uuid::new_v4()), DonationStatus::Accepted).is_ok());
    }

    #[test]
    fn delete_only_while_pending_and_only_by_owner() {
        let donor_id = Uuid::new_v4();
        let pending = donation(DonationStatus::Pending, Some(donor_id), None);
        assert!(authorize_delete(&pending, donor(donor_id)).is_ok());

        let err = authorize_delete(&pending, donor(Uuid::new_v4())).unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(_)));

        let accepted = donation(
            DonationStatus::Accepted,
            Some(donor_id),
            Some(Uuid::new_v4()),
        );
        let err = authorize_delete(&accepted, donor(donor_id)).unwrap_err();
        assert!(matches!(err, ApiError::InvalidState(_)));
    }

    #[test]
    fn counterpart_resolves_both_directions() {
        let donor_id = Uuid::new_v4();
        let vol_id = Uuid::new_v4();
        let d = donation(DonationStatus::Accepted, Some(donor_id), Some(vol_id));
        assert_eq!(counterpart_of(&d, donor_id).unwrap(), Some(vol_id));
        assert_eq!(counterpart_of(&d, vol_id).unwrap(), Some(donor_id));
        assert!(counterpart_of(&d, Uuid::new_v4()).is_err());
    }

    #[test]
    fn counterpart_missing_while_pending() {
        let donor_id = Uuid::new_v4();
        let d = donation(DonationStatus::Pending, Some(donor_id), None);
        assert_eq!(counterpart_of(&d, donor_id).unwrap(), None);
    }
}
