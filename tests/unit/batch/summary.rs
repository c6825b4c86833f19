use std::path::PathBuf;

use super::*;

fn job(index: usize, source: &str) -> RenderJob {
    RenderJob {
        index,
        source_id: source.to_string(),
        campaign_id: source.to_string(),
        asset: None,
        format_id: "square".to_string(),
        output_path: PathBuf::from(format!("out/{source}-{index}.jpg")),
    }
}

fn failed(index: usize, source: &str, kind: FailureKind) -> JobOutcome {
    JobOutcome::Failed(JobFailure {
        job: job(index, source),
        kind,
        reason: "boom".to_string(),
    })
}

#[test]
fn status_reflects_mix_of_outcomes() {
    assert_eq!(BatchSummary::default().status(), BatchStatus::TotalFailure);
    assert_eq!(BatchSummary::from_outcomes(Vec::<JobOutcome>::new()).status().exit_code(), 1);

    let all_ok = BatchSummary::from_outcomes([
        JobOutcome::Succeeded(job(0, "a")),
        JobOutcome::Succeeded(job(1, "b")),
    ]);
    assert_eq!(all_ok.status(), BatchStatus::Success);
    assert_eq!(all_ok.status().exit_code(), 0);

    let partial = BatchSummary::from_outcomes([
        JobOutcome::Succeeded(job(0, "a")),
        failed(1, "a", FailureKind::Render),
    ]);
    assert_eq!(partial.status(), BatchStatus::Partial);
    assert_eq!(partial.status().exit_code(), 2);

    let none = BatchSummary::from_outcomes([failed(0, "a", FailureKind::Timeout)]);
    assert_eq!(none.status(), BatchStatus::TotalFailure);
    assert_eq!(none.status().exit_code(), 1);
}

#[test]
fn tallies_are_grouped_by_source() {
    let s = BatchSummary::from_outcomes([
        JobOutcome::Succeeded(job(0, "a")),
        failed(1, "a", FailureKind::Cancelled),
        JobOutcome::Succeeded(job(2, "b")),
        failed(3, "b", FailureKind::Cancelled),
        failed(4, "b", FailureKind::Render),
    ]);
    assert_eq!(s.total(), 5);
    assert_eq!(s.by_source["a"], SourceTally { succeeded: 1, failed: 1 });
    assert_eq!(s.by_source["b"], SourceTally { succeeded: 1, failed: 2 });
    assert_eq!(s.failures_of(FailureKind::Cancelled).count(), 2);
}

#[test]
fn errors_classify_into_kinds() {
    let timeout = PanelError::Timeout(std::time::Duration::from_secs(1));
    assert_eq!(FailureKind::of(&timeout), FailureKind::Timeout);
    assert_eq!(FailureKind::of(&PanelError::render("x")), FailureKind::Render);
    assert_eq!(
        FailureKind::of(&PanelError::resource_exhaustion("x")),
        FailureKind::Render
    );
}
