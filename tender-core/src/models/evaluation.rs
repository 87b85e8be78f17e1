use super::{Offer, OfferId, SupplierId, UserId};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::OffsetDateTime;

/// Which of the two independent evaluations a score belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreKind {
    /// Quality of the technical proposal
    Technical,
    /// Attractiveness of the financial proposal
    Financial,
}

impl ScoreKind {
    /// The verb recorded in the audit log
    pub fn action(&self) -> &'static str {
        match self {
            Self::Technical => "evaluate_technical",
            Self::Financial => "evaluate_financial",
        }
    }
}

/// A score outside the closed interval `[0, 100]` (or not a number at all).
#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("score {0} is outside [0, 100]")]
pub struct InvalidScore(pub f64);

/// An evaluation score, guaranteed to lie in `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct Score(f64);

impl Score {
    /// The lowest possible score
    pub const MIN: f64 = 0.0;
    /// The highest possible score
    pub const MAX: f64 = 100.0;

    /// The raw value
    pub fn value(&self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for Score {
    type Error = InvalidScore;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        // NaN fails both comparisons, so it is rejected here as well
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(InvalidScore(value))
        }
    }
}

/// One recorded evaluation of an offer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    /// The score in `[0, 100]`
    pub score: f64,
    /// Evaluator's comments
    pub comments: Option<String>,
    /// Who recorded the score
    pub evaluator_id: UserId,
    /// When it was recorded
    #[serde(with = "time::serde::rfc3339")]
    pub evaluated_at: OffsetDateTime,
}

/// The advisory final score: the mean of both scores, rounded half away
/// from zero to two decimal places.
pub fn final_score(technical: f64, financial: f64) -> f64 {
    ((technical + financial) / 2.0 * 100.0).round() / 100.0
}

/// An offer's position in the advisory ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedOffer {
    /// The offer
    pub offer_id: OfferId,
    /// Its plaintext number
    pub offer_number: String,
    /// The submitting supplier
    pub supplier_id: SupplierId,
    /// Display name of the supplier
    pub supplier_name: String,
    /// Technical score used
    pub technical_score: f64,
    /// Financial score used
    pub financial_score: f64,
    /// `final_score(technical_score, financial_score)`
    pub final_score: f64,
    /// 1-based rank
    pub ranking: u32,
}

/// Rank every offer carrying both scores.
///
/// Offers are expected in submission order. The sort is stable, so offers with
/// equal final scores keep that order and the earlier submission ranks higher.
/// Offers missing either score are left out.
pub fn rank<'a>(offers: impl IntoIterator<Item = &'a Offer>) -> Vec<RankedOffer> {
    let mut ranked: Vec<RankedOffer> = offers
        .into_iter()
        .filter_map(|offer| {
            let technical = offer.technical.as_ref()?.score;
            let financial = offer.financial.as_ref()?.score;
            Some(RankedOffer {
                offer_id: offer.id,
                offer_number: offer.offer_number.clone(),
                supplier_id: offer.supplier_id,
                supplier_name: offer.supplier_name.clone(),
                technical_score: technical,
                financial_score: financial,
                final_score: final_score(technical, financial),
                ranking: 0,
            })
        })
        .collect();

    ranked.sort_by(|a, b| b.final_score.total_cmp(&a.final_score));

    for (position, offer) in ranked.iter_mut().enumerate() {
        offer.ranking = position as u32 + 1;
    }

    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{OfferStatus, TenderId};
    use rstest::rstest;
    use time::macros::datetime;

    fn offer(number: &str, technical: Option<f64>, financial: Option<f64>) -> Offer {
        let at = datetime!(2026-01-10 09:00 UTC);
        let evaluator = UserId::new_v4();
        let record = |score| ScoreRecord {
            score,
            comments: None,
            evaluator_id: evaluator,
            evaluated_at: at,
        };
        Offer {
            id: OfferId::new_v4(),
            tender_id: TenderId::new_v4(),
            supplier_id: SupplierId::new_v4(),
            supplier_name: format!("Supplier {number}"),
            offer_number: number.to_owned(),
            status: OfferStatus::Submitted,
            envelope: None,
            submitted_at: at,
            technical: technical.map(record),
            financial: financial.map(record),
            final_score: None,
            ranking: None,
            evaluation_completed_at: None,
            is_deleted: false,
        }
    }

    #[rstest]
    #[case(80.0, 90.0, 85.0)]
    #[case(70.5, 80.25, 75.38)]
    #[case(85.25, 90.5, 87.88)]
    #[case(60.0, 75.5, 67.75)]
    #[case(0.0, 0.0, 0.0)]
    #[case(100.0, 100.0, 100.0)]
    fn final_score_rounds_to_two_decimals(
        #[case] technical: f64,
        #[case] financial: f64,
        #[case] expected: f64,
    ) {
        assert_eq!(final_score(technical, financial), expected);
    }

    #[rstest]
    #[case(-0.01)]
    #[case(100.01)]
    #[case(f64::NAN)]
    #[case(f64::INFINITY)]
    fn out_of_range_scores_are_rejected(#[case] value: f64) {
        assert!(Score::try_from(value).is_err());
    }

    #[test]
    fn bounds_are_inclusive() {
        assert_eq!(Score::try_from(0.0).unwrap().value(), 0.0);
        assert_eq!(Score::try_from(100.0).unwrap().value(), 100.0);
    }

    #[test]
    fn ties_keep_submission_order() {
        let offers = vec![
            offer("A", Some(80.0), Some(90.0)),
            offer("B", Some(90.0), Some(80.0)),
        ];
        let ranked = rank(&offers);

        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].offer_number, "A");
        assert_eq!(ranked[0].ranking, 1);
        assert_eq!(ranked[1].offer_number, "B");
        assert_eq!(ranked[1].ranking, 2);
        assert_eq!(ranked[0].final_score, ranked[1].final_score);
    }

    #[test]
    fn ranks_descend_by_final_score_and_skip_incomplete() {
        let offers = vec![
            offer("A", Some(50.0), Some(60.0)),
            offer("B", Some(95.0), None),
            offer("C", Some(90.0), Some(70.0)),
            offer("D", Some(70.0), Some(70.0)),
            offer("E", Some(90.0), Some(70.0)),
        ];
        let ranked = rank(&offers);

        let order: Vec<_> = ranked
            .iter()
            .map(|r| (r.offer_number.as_str(), r.ranking, r.final_score))
            .collect();
        assert_eq!(
            order,
            vec![
                ("C", 1, 80.0),
                ("E", 2, 80.0),
                ("D", 3, 70.0),
                ("A", 4, 55.0),
            ]
        );
    }
}
