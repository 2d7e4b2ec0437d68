use crate::infra::{InMemoryAssessmentRepository, InMemoryMshRepository};
use chrono::{Local, NaiveDate, TimeZone, Utc};
use clap::Args;
use msh3::assessments::{
    score_card, AssessmentDraft, AssessmentKind, AssessmentService, DomainScores,
    HrpReviewRequest, MshView, Potential, ReviewCycle, Score, ScoreCard,
};
use msh3::config::AssessmentConfig;
use msh3::error::AppError;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// Culture rating as CONTRIBUTION,GROWTH (e.g. 2,1)
    #[arg(long, value_parser = crate::infra::parse_score)]
    pub(crate) culture: Option<Score>,
    /// Competencies rating as CONTRIBUTION,GROWTH
    #[arg(long, value_parser = crate::infra::parse_score)]
    pub(crate) competencies: Option<Score>,
    /// Execution rating as CONTRIBUTION,GROWTH
    #[arg(long, value_parser = crate::infra::parse_score)]
    pub(crate) execution: Option<Score>,
    /// Reviewer potential (low, mid, high) for the performance/potential position
    #[arg(long)]
    pub(crate) potential: Option<Potential>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Reporting date for the overdue check (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Review cycle grace period in days
    #[arg(long, default_value_t = AssessmentConfig::DEFAULT_GRACE_DAYS)]
    pub(crate) grace_days: u16,
}

pub(crate) fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let ScoreArgs {
        culture,
        competencies,
        execution,
        potential,
    } = args;

    let scores = DomainScores {
        culture,
        competencies,
        execution,
    };
    let card = score_card(&scores, potential);
    render_score_card(&card);
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs { today, grace_days } = args;
    let today = today.unwrap_or_else(|| Local::now().date_naive());

    let service = AssessmentService::new(
        Arc::new(InMemoryAssessmentRepository::default()),
        Arc::new(InMemoryMshRepository::default()),
        AssessmentConfig {
            review_grace_days: grace_days,
        },
    );
    let cycle: ReviewCycle = "2024-Q4".parse()?;

    println!("MSH3 assessment demo");
    println!(
        "Cycle {}: {} -> {} (deadline {})",
        cycle,
        cycle.starts_on(),
        cycle.ends_on(),
        cycle.deadline(grace_days)
    );

    // aligned 1x1, published on the sample date
    let aligned = service
        .create(AssessmentDraft {
            kind: AssessmentKind::OneOnOne,
            assessor: "supervisor.ramos".to_string(),
            subject: "ic.nguyen".to_string(),
            cycle,
            scores: DomainScores::new(Score::new(2, 1), Score::new(2, 2), Score::new(1, 2)),
            notes: "Consistent delivery; stretch on mentoring".to_string(),
        })?
        .assessment;
    service.submit(&aligned.id)?;
    service.record_alignment(&aligned.id, true, "agreed in 1x1")?;
    let sample_published_at = Utc
        .timestamp_millis_opt(1_728_345_600_000)
        .single()
        .unwrap_or_else(Utc::now);
    let sample = service.publish_at(&aligned.id, "hrp.okafor", sample_published_at)?;
    render_msh(&sample.view());

    // disputed 360, calibrated by the HR partner before publication
    let disputed = service
        .create(AssessmentDraft {
            kind: AssessmentKind::ThreeSixty,
            assessor: "peer.chen".to_string(),
            subject: "ic.adeyemi".to_string(),
            cycle,
            scores: DomainScores::new(Score::new(1, 1), Score::new(2, 1), Score::new(1, 0)),
            notes: String::new(),
        })?
        .assessment;
    service.submit(&disputed.id)?;
    service.record_alignment(&disputed.id, false, "subject disputes execution rating")?;
    service.hrp_review(
        &disputed.id,
        HrpReviewRequest {
            reviewer: "hrp.okafor".to_string(),
            notes: "execution raised after calibration".to_string(),
            potential: Some(Potential::High),
            scores: Some(DomainScores::new(
                Score::new(1, 1),
                Score::new(2, 1),
                Score::new(2, 1),
            )),
        },
    )?;
    let calibrated = service.publish(&disputed.id, "hrp.okafor")?;
    render_msh(&calibrated.view());

    // draft that never left the assessor
    service.create(AssessmentDraft {
        kind: AssessmentKind::OneOnOne,
        assessor: "supervisor.ramos".to_string(),
        subject: "ic.osei".to_string(),
        cycle,
        scores: DomainScores::default(),
        notes: String::new(),
    })?;

    let overdue = service.overdue(today)?;
    if overdue.is_empty() {
        println!("\nOverdue assessments as of {today}: none");
    } else {
        println!("\nOverdue assessments as of {today}");
        for assessment in overdue {
            println!(
                "- {} for {} ({}), {} days past deadline",
                assessment.id,
                assessment.subject,
                assessment.status,
                -assessment.cycle.days_until_deadline(today, grace_days)
            );
        }
    }

    Ok(())
}

fn render_score_card(card: &ScoreCard) {
    println!(
        "Contribution {} ({}), growth {} ({}), composite {}",
        card.totals.total_contribution,
        card.contribution_level.label(),
        card.totals.total_growth,
        card.growth_level.label(),
        card.totals.composite
    );
    println!("Nine-box: {}", card.nine_box);
    match card.performance_position {
        Some(position) => println!("Position: {position}"),
        None => println!("Performance: {}", card.performance_level.label()),
    }

    if !card.issues.is_empty() {
        println!("\nData-quality warnings");
        for issue in &card.issues {
            println!("- {issue}");
        }
    }
}

fn render_msh(view: &MshView) {
    println!("\nMSH {} ({} for {})", view.id, view.cycle, view.subject);
    println!(
        "- contribution {}, growth {}, composite {}",
        view.totals.total_contribution, view.totals.total_growth, view.totals.composite
    );
    println!("- nine-box: {}", view.nine_box);
    if let Some(position) = view.performance_position {
        println!("- position: {position}");
    }
    println!("- published by {} at {}", view.published_by, view.published_at);
}
