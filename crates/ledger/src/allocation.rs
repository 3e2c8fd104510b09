//! Turns an expense form's share requests into splitter weights.
//!
//! Participants either pin an exact share in cents or leave it open; open
//! participants split what is left equally. Pinned cents are used as weights
//! directly, which the splitter reproduces exactly when they add up to the amount.

use serde::{Deserialize, Serialize};

use splitledger_core::{DomainResult, UserId, ValidationErrors, Violation};

use crate::model::ParticipantWeight;

/// One selected participant, with an optional pinned share.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareRequest {
    pub user_id: UserId,
    /// Exact share in cents; `None` (or a non-positive value) means "split the rest".
    #[serde(default)]
    pub share_cents: Option<i64>,
}

impl ShareRequest {
    pub fn open(user_id: impl Into<UserId>) -> Self {
        Self {
            user_id: user_id.into(),
            share_cents: None,
        }
    }

    pub fn pinned(user_id: impl Into<UserId>, share_cents: i64) -> Self {
        Self {
            user_id: user_id.into(),
            share_cents: Some(share_cents),
        }
    }

    fn pinned_cents(&self) -> Option<i64> {
        self.share_cents.filter(|cents| *cents > 0)
    }
}

/// Compute integer weights for the selected participants.
///
/// Without a positive amount every participant gets weight 1. Otherwise the
/// returned weights sum to `amount`: pinned participants first (input order),
/// then open participants ordered by `UserId`, the first `remaining % n` of them
/// getting one extra cent.
pub fn allocate_weights(amount: Option<i64>, requests: &[ShareRequest]) -> DomainResult<Vec<ParticipantWeight>> {
    if requests.is_empty() {
        return Err(ValidationErrors::from(Violation::new("participants", "must not be empty")).into());
    }

    let amount = match amount.filter(|a| *a > 0) {
        Some(amount) => amount,
        None => {
            return Ok(requests
                .iter()
                .map(|r| ParticipantWeight::new(r.user_id.clone(), 1))
                .collect());
        }
    };

    let (pinned, mut open): (Vec<&ShareRequest>, Vec<&ShareRequest>) =
        requests.iter().partition(|r| r.pinned_cents().is_some());

    let pinned_total = pinned
        .iter()
        .filter_map(|r| r.pinned_cents())
        .try_fold(0i64, i64::checked_add);
    let remaining = match pinned_total.map(|total| amount - total) {
        Some(remaining) if remaining >= 0 => remaining,
        _ => {
            return Err(ValidationErrors::from(Violation::new(
                "participants",
                "allocated shares exceed the total amount",
            ))
            .into());
        }
    };

    let mut weights: Vec<ParticipantWeight> = pinned
        .iter()
        .filter_map(|r| r.pinned_cents().map(|cents| ParticipantWeight::new(r.user_id.clone(), cents)))
        .collect();

    if open.is_empty() {
        if remaining > 0 {
            return Err(ValidationErrors::from(Violation::new(
                "participants",
                "allocated shares are less than the total amount",
            ))
            .into());
        }
        return Ok(weights);
    }

    let n = open.len() as i64;
    if remaining < n {
        return Err(ValidationErrors::from(Violation::new(
            "participants",
            format!("remaining {remaining} cents cannot give each of {n} open participants a share"),
        ))
        .into());
    }

    open.sort_by(|a, b| a.user_id.cmp(&b.user_id));
    let base = remaining / n;
    let extra = remaining % n;
    weights.extend(
        open.iter()
            .enumerate()
            .map(|(idx, r)| ParticipantWeight::new(r.user_id.clone(), base + i64::from((idx as i64) < extra))),
    );

    Ok(weights)
}
