use super::*;
use crate::foundation::core::Rgb8;

fn tmp_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "panelcraft_job_test_{tag}_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn touch(dir: &Path, names: &[&str]) {
    for name in names {
        std::fs::write(dir.join(name), b"").unwrap();
    }
}

fn campaign(id: &str) -> Campaign {
    Campaign::new(id, "Title", Rgb8::BLACK, Rgb8::WHITE)
}

fn catalog() -> Catalog {
    Catalog {
        campaigns: vec![campaign("web"), campaign("seo"), campaign("courses")],
        ..Catalog::default()
    }
}

fn request(asset_dir: &Path, mode: BatchMode) -> BatchRequest {
    BatchRequest {
        asset_dir: asset_dir.to_path_buf(),
        out_dir: PathBuf::from("out"),
        formats: Vec::new(),
        mode,
        encoding: OutputEncoding::default(),
    }
}

fn paths(dir: &Path, names: &[&str]) -> Vec<PathBuf> {
    names.iter().map(|n| dir.join(n)).collect()
}

#[test]
fn slugify_normalizes_ids() {
    assert_eq!(slugify("Beach Sunset (2)"), "beach-sunset-2");
    assert_eq!(slugify("--web__site--"), "web-site");
    assert_eq!(slugify("???"), "item");
}

#[test]
fn explicit_background_wins() {
    let dir = PathBuf::from("assets");
    let images = paths(&dir, &["a.jpg", "laptop.jpg", "z.jpg"]);
    let mut c = campaign("web");
    c.background = Some("z.jpg".to_string());
    c.keywords = vec!["laptop".to_string()];
    let picked = select_background(&c, &images, &SelectionStrategy::First).unwrap();
    assert_eq!(picked, Some(dir.join("z.jpg")));

    c.background = Some("missing.jpg".to_string());
    let err = select_background(&c, &images, &SelectionStrategy::First).unwrap_err();
    assert!(err.is_fatal());
}

#[test]
fn keyword_match_narrows_candidates() {
    let dir = PathBuf::from("assets");
    let images = paths(&dir, &["a.jpg", "Laptop-desk.jpg", "z.jpg"]);
    let mut c = campaign("web");
    c.keywords = vec!["laptop".to_string()];
    for strategy in [SelectionStrategy::First, SelectionStrategy::StableHash { seed: 9 }] {
        let picked = select_background(&c, &images, &strategy).unwrap();
        assert_eq!(picked, Some(dir.join("Laptop-desk.jpg")));
    }
}

#[test]
fn strategy_is_reproducible_and_restricted_to_campaign_assets() {
    let dir = PathBuf::from("assets");
    let images = paths(&dir, &["a.jpg", "b.jpg", "c.jpg", "d.jpg"]);
    let mut c = campaign("courses");
    let strategy = SelectionStrategy::StableHash { seed: 3 };
    let first = select_background(&c, &images, &strategy).unwrap();
    assert_eq!(first, select_background(&c, &images, &strategy).unwrap());
    assert!(first.is_some());

    c.assets = vec!["c.jpg".to_string()];
    assert_eq!(
        select_background(&c, &images, &strategy).unwrap(),
        Some(dir.join("c.jpg"))
    );

    c.assets.clear();
    assert_eq!(select_background(&c, &[], &strategy).unwrap(), None);
}

#[test]
fn unknown_campaign_asset_is_a_configuration_error() {
    let dir = PathBuf::from("assets");
    let images = paths(&dir, &["a.jpg", "c.jpg"]);
    let mut c = campaign("courses");
    c.assets = vec!["c.jpg".to_string(), "nope.jpg".to_string()];
    let err = select_background(&c, &images, &SelectionStrategy::First).unwrap_err();
    assert!(err.is_fatal(), "{err}");
    assert!(err.to_string().contains("nope.jpg"), "{err}");

    c.assets = vec!["nope.jpg".to_string()];
    assert!(select_background(&c, &images, &SelectionStrategy::First).is_err());
}

#[test]
fn empty_plans_are_configuration_errors() {
    let dir = tmp_dir("empty");
    let strategy = SelectionStrategy::default();
    let no_campaigns = request(&dir, BatchMode::Campaigns(Vec::new()));
    let err = plan_jobs(&Catalog::default(), &no_campaigns, &strategy).unwrap_err();
    assert!(err.is_fatal(), "{err}");

    let no_images = request(
        &dir,
        BatchMode::Assets {
            campaign: "web".to_string(),
        },
    );
    let err = plan_jobs(&catalog(), &no_images, &strategy).unwrap_err();
    assert!(err.is_fatal(), "{err}");
    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn campaign_mode_is_cross_product_with_stable_names() {
    let dir = tmp_dir("campaigns");
    touch(&dir, &["beach.jpg", "notes.txt"]);
    let jobs = plan_jobs(
        &catalog(),
        &request(&dir, BatchMode::Campaigns(Vec::new())),
        &SelectionStrategy::default(),
    )
    .unwrap();
    assert_eq!(jobs.len(), 3 * 4);
    for (i, job) in jobs.iter().enumerate() {
        assert_eq!(job.index, i);
        assert_eq!(job.asset, Some(dir.join("beach.jpg")));
    }
    assert_eq!(jobs[0].output_path, PathBuf::from("out/web-square.jpg"));
    assert_eq!(jobs[0].source_id, "web");
    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn asset_mode_uses_file_stems_and_format_filter() {
    let dir = tmp_dir("assets");
    touch(&dir, &["Beach Day.jpg", "city.png"]);
    let mut req = request(
        &dir,
        BatchMode::Assets {
            campaign: "seo".to_string(),
        },
    );
    req.formats = vec!["story".to_string()];
    req.encoding = OutputEncoding::Png;
    let jobs = plan_jobs(&catalog(), &req, &SelectionStrategy::default()).unwrap();
    let outputs: Vec<_> = jobs.iter().map(|j| j.output_path.clone()).collect();
    assert_eq!(
        outputs,
        vec![
            PathBuf::from("out/beach-day-story.png"),
            PathBuf::from("out/city-story.png")
        ]
    );
    assert!(jobs.iter().all(|j| j.campaign_id == "seo"));
    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn colliding_outputs_are_rejected() {
    let dir = tmp_dir("collide");
    touch(&dir, &["beach.jpg", "beach.png"]);
    let err = plan_jobs(
        &catalog(),
        &request(
            &dir,
            BatchMode::Assets {
                campaign: "web".to_string(),
            },
        ),
        &SelectionStrategy::default(),
    )
    .unwrap_err();
    assert!(err.is_fatal(), "{err}");
    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn unknown_ids_and_missing_dir_are_configuration_errors() {
    let dir = tmp_dir("unknown");
    let strategy = SelectionStrategy::default();
    let unknown_campaign = request(&dir, BatchMode::Campaigns(vec!["nope".to_string()]));
    assert!(plan_jobs(&catalog(), &unknown_campaign, &strategy).unwrap_err().is_fatal());

    let mut unknown_format = request(&dir, BatchMode::Campaigns(Vec::new()));
    unknown_format.formats = vec!["billboard".to_string()];
    assert!(plan_jobs(&catalog(), &unknown_format, &strategy).unwrap_err().is_fatal());

    let missing = request(&dir.join("missing"), BatchMode::Campaigns(Vec::new()));
    assert!(plan_jobs(&catalog(), &missing, &strategy).unwrap_err().is_fatal());
    std::fs::remove_dir_all(&dir).ok();
}
