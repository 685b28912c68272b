//! A failing unit never takes the rest of the batch down with it.

use chrono::TimeZone;
use portal_release::directory::{DirectoryError, ItemType, MemoryPortal};
use portal_release::promotion::{PromotionEngine, PromotionOutcome, PromotionUnit, ReleaseContext};

fn context() -> ReleaseContext {
    let timestamp = chrono::Local
        .with_ymd_and_hms(2026, 8, 25, 9, 5, 0)
        .unwrap();
    ReleaseContext::at("BW", timestamp, Vec::new())
}

fn units() -> Vec<PromotionUnit> {
    vec![
        PromotionUnit::new("Roads STAGED", "Roads", ItemType::TileService),
        PromotionUnit::new("Parks STAGED", "Parks", ItemType::TileService),
        PromotionUnit::new("Zoning STAGED", "Zoning", ItemType::TileService),
    ]
}

#[test]
fn test_middle_unit_failure_does_not_stop_the_batch() {
    let portal = MemoryPortal::new();
    portal.seed_item("Roads STAGED", "Roads_STAGED", ItemType::TileService);
    portal.seed_item("Parks STAGED", "Parks_STAGED", ItemType::TileService);
    portal.seed_item("Zoning STAGED", "Zoning_STAGED", ItemType::TileService);
    // The second unit's staged lookup dies on the wire.
    portal.inject_search_failure_for_title(
        "Parks STAGED",
        DirectoryError::Network("connection reset".to_string()),
    );

    let engine = PromotionEngine::new(&portal, context());
    let batch = engine.run_batch(&units());

    assert_eq!(batch.reports.len(), 3, "every unit gets a report");
    assert_eq!(batch.reports[0].outcome, Some(PromotionOutcome::Published));
    assert!(batch.reports[1].is_aborted());
    assert_eq!(batch.reports[2].outcome, Some(PromotionOutcome::Published));
    assert_eq!(batch.aborted_count(), 1);
    assert!(!batch.is_clean());
}

#[test]
fn test_missing_staged_item_skips_only_that_unit() {
    let portal = MemoryPortal::new();
    portal.seed_item("Roads STAGED", "Roads_STAGED", ItemType::TileService);
    // Nothing staged for Parks or Zoning.

    let engine = PromotionEngine::new(&portal, context());
    let batch = engine.run_batch(&units());

    assert_eq!(batch.reports.len(), 3);
    assert!(!batch.reports[0].is_aborted());
    assert!(batch.reports[1].is_aborted());
    assert!(batch.reports[2].is_aborted());
}

#[test]
fn test_clean_batch_reports_clean() {
    let portal = MemoryPortal::new();
    portal.seed_item("Roads STAGED", "Roads_STAGED", ItemType::TileService);
    portal.seed_item("Parks STAGED", "Parks_STAGED", ItemType::TileService);
    portal.seed_item("Zoning STAGED", "Zoning_STAGED", ItemType::TileService);

    let engine = PromotionEngine::new(&portal, context());
    let batch = engine.run_batch(&units());

    assert!(batch.is_clean());
    assert_eq!(batch.warning_count(), 0);
}
