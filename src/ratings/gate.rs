use uuid::Uuid;

use crate::donations::lifecycle::DonationStatus;
use crate::donations::repo::Donation;

/// The user the actor would rate on this donation: the other party, and only
/// once the donation is delivered. `None` otherwise (not delivered, actor is
/// a stranger, or no counterpart exists).
pub fn rating_target(donation: &Donation, actor_id: Uuid) -> Option<Uuid> {
    if DonationStatus::parse(&donation.status) != Some(DonationStatus::Delivered) {
        return None;
    }
    if donation.donor_id == Some(actor_id) {
        donation.volunteer_id
    } else if donation.volunteer_id == Some(actor_id) {
        donation.donor_id
    } else {
        None
    }
}

/// canRate predicate: delivered, counterpart exists, no prior rating by this
/// actor for this donation.
pub fn can_rate(donation: &Donation, actor_id: Uuid, already_rated: bool) -> bool {
    !already_rated && rating_target(donation, actor_id).is_some()
}
