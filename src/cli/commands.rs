//! CLI command implementations
//!
//! `plan` and `status` are read-only. `release` mutates the portal and exits
//! nonzero when any unit aborted, so a scheduled run fails loudly.

use crate::config::Config;
use crate::directory::{
    resolve_groups, ContentDirectory, ItemProperties, ItemQuery, ItemType, Portal, RestPortal,
};
use crate::promotion::{PromotionEngine, ReleaseContext};
use crate::staging::{StageOutcome, Stager, StagingRequest};

use super::args::{Cli, Command};
use super::errors::{CliError, CliResult};

/// Dispatch one parsed invocation. Returns the process exit code.
pub fn run_command(cli: Cli) -> CliResult<i32> {
    match cli.command {
        Command::Plan { config } => {
            let config = Config::load(&config)?;
            let portal = connect(&config)?;
            plan(&portal, &config)
        }
        Command::Release { config, initials } => {
            let config = Config::load(&config)?;
            let portal = connect(&config)?;
            release(&portal, &config, initials.as_deref())
        }
        Command::Status { config } => {
            let config = Config::load(&config)?;
            let portal = connect(&config)?;
            status(&portal, &config)
        }
        Command::Stage {
            config,
            package,
            title,
            name,
        } => {
            let config = Config::load(&config)?;
            let data = std::fs::read(&package).map_err(|e| CliError::PackageRead {
                path: package.display().to_string(),
                source: e,
            })?;
            let name = name.unwrap_or_else(|| title.replace(' ', "_"));
            let portal = connect(&config)?;
            stage(&portal, &config, &title, &name, data)
        }
    }
}

fn connect(config: &Config) -> CliResult<RestPortal> {
    let session = config.session()?;
    RestPortal::connect(session).map_err(CliError::Connect)
}

/// Classify every unit without mutating anything.
pub fn plan(portal: &dyn Portal, config: &Config) -> CliResult<i32> {
    let context = ReleaseContext::new(config.operator_initials(), Vec::new());
    let engine = PromotionEngine::new(portal, context);

    for unit in &config.units {
        match engine.classify_unit(unit) {
            Ok(state) => {
                println!("{}: {}", unit.target_title, state.state_name());
            }
            Err(error) => {
                println!("{}: error: {}", unit.target_title, error);
            }
        }
    }
    Ok(0)
}

/// Run the full batch. Exit code 1 when any unit aborted.
pub fn release(
    portal: &dyn Portal,
    config: &Config,
    initials_override: Option<&str>,
) -> CliResult<i32> {
    let initials = match initials_override {
        Some(initials) => initials.to_string(),
        None => config.operator_initials(),
    };
    let groups = resolve_groups(portal, &config.release_groups)?;
    let context = ReleaseContext::new(initials, groups);

    let engine = PromotionEngine::new(portal, context);
    let batch = engine.run_batch(&config.units);

    for report in &batch.reports {
        match (&report.outcome, &report.error) {
            (Some(outcome), _) => {
                if report.warnings.is_empty() {
                    println!("{}: {}", report.unit.target_title, outcome);
                } else {
                    println!(
                        "{}: {} ({} warning(s))",
                        report.unit.target_title,
                        outcome,
                        report.warnings.len()
                    );
                }
            }
            (None, Some(error)) => {
                println!("{}: ABORTED: {}", report.unit.target_title, error);
            }
            (None, None) => unreachable!("report carries outcome or error"),
        }
    }

    Ok(if batch.is_clean() { 0 } else { 1 })
}

/// Upload one built package into the staging area, using the config's
/// staging metadata and groups.
pub fn stage(
    portal: &dyn Portal,
    config: &Config,
    title: &str,
    name: &str,
    data: Vec<u8>,
) -> CliResult<i32> {
    let share_groups = resolve_groups(portal, &config.staging_groups)?;
    let request = StagingRequest {
        properties: ItemProperties {
            title: title.to_string(),
            name: name.to_string(),
            item_type: Some(ItemType::TilePackage),
            description: String::new(),
            snippet: String::new(),
            access_information: config.credits.clone(),
            license_info: config.license_text.clone(),
            tags: config.tags.clone(),
        },
        package_type: ItemType::TilePackage,
        data,
        folder: config.folder.clone(),
        overwrite: true,
        share_groups,
    };

    let (outcome, record) = Stager::new(portal).stage(&request)?;
    match (outcome, record) {
        (StageOutcome::Skipped, _) => println!("{title}: skipped"),
        (outcome, Some(record)) => {
            let verb = match outcome {
                StageOutcome::Created => "staged",
                StageOutcome::Replaced => "restaged",
                StageOutcome::Skipped => unreachable!("skips carry no record"),
            };
            println!("{title}: {verb} as {}", record.id);
        }
        (_, None) => unreachable!("uploads carry a record"),
    }
    Ok(0)
}

/// Report the production slot of every unit.
pub fn status(portal: &dyn Portal, config: &Config) -> CliResult<i32> {
    let directory = ContentDirectory::new(portal);
    for unit in &config.units {
        let query = ItemQuery::new().title(unit.target_title.clone());
        match directory.find_one(&query)? {
            Some(record) => {
                println!(
                    "{}: {} status={} protected={} public={}",
                    unit.target_title,
                    record.item_type,
                    record.content_status.as_str(),
                    record.protected,
                    record.sharing.everyone
                );
            }
            None => {
                println!("{}: absent", unit.target_title);
            }
        }
    }
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::{ItemType, MemoryPortal};
    use crate::promotion::PromotionUnit;

    fn config() -> Config {
        Config {
            portal_url: "https://maps.example.gov/portal".to_string(),
            username: "publisher".to_string(),
            initials: "BW".to_string(),
            folder: None,
            release_groups: Vec::new(),
            staging_groups: vec!["GIS EDITORS".to_string()],
            tags: vec!["basemap".to_string()],
            credits: "City GIS".to_string(),
            license_text: "Internal use".to_string(),
            request_timeout_secs: 600,
            units: vec![PromotionUnit::new(
                "Roads STAGED",
                "Roads",
                ItemType::TileService,
            )],
        }
    }

    #[test]
    fn test_plan_leaves_portal_untouched() {
        let portal = MemoryPortal::new();
        portal.seed_item("Roads STAGED", "Roads_STAGED", ItemType::TileService);
        let before = portal.records();

        let code = plan(&portal, &config()).unwrap();
        assert_eq!(code, 0);
        assert_eq!(portal.records(), before);
    }

    #[test]
    fn test_release_exit_code_reflects_aborts() {
        let portal = MemoryPortal::new();
        // Nothing staged and nothing in production: the unit aborts.
        let code = release(&portal, &config(), None).unwrap();
        assert_eq!(code, 1);

        portal.seed_item("Roads STAGED", "Roads_STAGED", ItemType::TileService);
        let code = release(&portal, &config(), None).unwrap();
        assert_eq!(code, 0);
    }

    #[test]
    fn test_status_reports_absent_slots() {
        let portal = MemoryPortal::new();
        let code = status(&portal, &config()).unwrap();
        assert_eq!(code, 0);
    }

    #[test]
    fn test_stage_uploads_with_config_metadata_and_groups() {
        let portal = MemoryPortal::new();
        let editors = portal.seed_group("GIS EDITORS");

        let code = stage(
            &portal,
            &config(),
            "Roads STAGED",
            "Roads_STAGED",
            vec![0x50, 0x4b],
        )
        .unwrap();
        assert_eq!(code, 0);

        let records = portal.records();
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.title, "Roads STAGED");
        assert_eq!(record.access_information, "City GIS");
        assert_eq!(record.license_info, "Internal use");
        assert_eq!(record.sharing.groups, vec![editors]);
        assert!(record.sharing.org);
        assert!(!record.sharing.everyone);
    }
}
