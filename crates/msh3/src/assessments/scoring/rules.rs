use tracing::warn;

use super::domain::{
    DataQualityIssue, DataQualityKind, Domain, DomainScores, Rating, Score, ScoreField, Totals,
};

/// Resolve a raw rating to a valid value, noting what was wrong with it.
pub(crate) fn resolve_rating(rating: Rating) -> (u8, Option<DataQualityKind>) {
    match rating {
        Rating::Value(value) if (0..=i64::from(Rating::MAX)).contains(&value) => {
            (value as u8, None)
        }
        Rating::Value(value) => {
            let clamped_to = if value < 0 { Rating::MIN } else { Rating::MAX };
            (
                clamped_to,
                Some(DataQualityKind::OutOfRange { value, clamped_to }),
            )
        }
        Rating::Missing => (0, Some(DataQualityKind::MissingValue)),
        Rating::Malformed => (0, Some(DataQualityKind::NonInteger)),
    }
}

/// Sum the resolved ratings and collect every data-quality issue on the way.
pub(crate) fn tally(scores: &DomainScores) -> (Totals, Vec<DataQualityIssue>) {
    let mut total_contribution = 0u8;
    let mut total_growth = 0u8;
    let mut issues = Vec::new();

    for domain in Domain::ALL {
        let score = match scores.get(domain) {
            Some(score) => *score,
            None => {
                issues.push(DataQualityIssue {
                    domain,
                    field: None,
                    kind: DataQualityKind::MissingDomain,
                });
                Score::new(0u8, 0u8)
            }
        };

        for field in [ScoreField::Contribution, ScoreField::Growth] {
            let (value, problem) = resolve_rating(score.rating(field));
            if let Some(kind) = problem {
                issues.push(DataQualityIssue {
                    domain,
                    field: Some(field),
                    kind,
                });
            }
            match field {
                ScoreField::Contribution => total_contribution += value,
                ScoreField::Growth => total_growth += value,
            }
        }
    }

    (Totals::new(total_contribution, total_growth), issues)
}

/// Report data-quality issues without logging them.
pub fn audit(scores: &DomainScores) -> Vec<DataQualityIssue> {
    tally(scores).1
}

/// Sum contribution and growth across the three domains.
///
/// Never fails. Missing domains count as zero and out-of-range values are
/// clamped; each such defect is logged as a warning.
pub fn compute_totals(scores: &DomainScores) -> Totals {
    let (totals, issues) = tally(scores);
    for issue in &issues {
        warn!(domain = %issue.domain, %issue, "score data-quality issue");
    }
    totals
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sums_each_axis_separately() {
        let scores = DomainScores::new(
            Score::new(2, 1),
            Score::new(2, 2),
            Score::new(1, 2),
        );

        let totals = compute_totals(&scores);

        assert_eq!(totals, Totals::new(5, 5));
        assert_eq!(totals.composite, 10);
        assert!(audit(&scores).is_empty());
    }

    #[test]
    fn clamps_out_of_range_values() {
        let scores = DomainScores::new(
            Score::new(7, -3),
            Score::new(1, 1),
            Score::new(0, 0),
        );

        let totals = compute_totals(&scores);
        let issues = audit(&scores);

        assert_eq!(totals.total_contribution, 3);
        assert_eq!(totals.total_growth, 1);
        assert_eq!(issues.len(), 2);
        assert_eq!(
            issues[0].kind,
            DataQualityKind::OutOfRange {
                value: 7,
                clamped_to: 2
            }
        );
        assert_eq!(
            issues[1].kind,
            DataQualityKind::OutOfRange {
                value: -3,
                clamped_to: 0
            }
        );
    }

    #[test]
    fn missing_domain_is_reported_once() {
        let scores = DomainScores::default()
            .with(Domain::Culture, Score::new(1, 1))
            .with(Domain::Competencies, Score::new(1, 1));

        let issues = audit(&scores);

        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].domain, Domain::Execution);
        assert_eq!(issues[0].kind, DataQualityKind::MissingDomain);
    }

    #[test]
    fn malformed_ratings_score_zero() {
        let scores = DomainScores::new(
            Score::new(Rating::Malformed, 2),
            Score::new(2, Rating::Missing),
            Score::new(2, 2),
        );

        let totals = compute_totals(&scores);

        assert_eq!(totals, Totals::new(4, 4));
        let kinds: Vec<_> = audit(&scores).into_iter().map(|issue| issue.kind).collect();
        assert_eq!(
            kinds,
            vec![DataQualityKind::NonInteger, DataQualityKind::MissingValue]
        );
    }

    #[test]
    fn extreme_inputs_do_not_overflow() {
        let scores = DomainScores::new(
            Score::new(i64::MAX, i64::MIN),
            Score::new(i64::MAX, i64::MAX),
            Score::new(i64::MAX, i64::MAX),
        );

        let totals = compute_totals(&scores);

        assert_eq!(totals, Totals::new(6, 4));
    }
}
