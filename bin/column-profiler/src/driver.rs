use std::{fs, path::Path};

use anyhow::{Context as _, Error};
use column_catalog::{
    profile_column,
    render::{render_distribution, render_domain},
    CatalogColumn, CatalogError, CatalogSnapshot, ColumnProfile, DomainRegistry,
};
use tracing::{debug, info, warn};

use crate::config::Config;

/// Outcome of a profiling run.
#[derive(Debug, Default, Eq, PartialEq)]
pub struct Summary {
    /// Number of columns profiled successfully.
    pub profiled: usize,

    /// Number of columns skipped because they could not be profiled.
    pub skipped: usize,

    /// Number of domain files written.
    pub domain_files: usize,
}

/// Profiling driver.
///
/// Profiles every column of the configured catalog snapshot independently. A column that cannot be profiled is logged
/// and skipped, while failing to read the snapshot or to write an output file aborts the run.
pub struct Driver {
    config: Config,
}

impl Driver {
    /// Creates a new `Driver` based on the given configuration.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Runs the driver over every column of the catalog snapshot.
    ///
    /// # Errors
    ///
    /// If the snapshot cannot be loaded, or an output file cannot be written, an error is returned.
    pub fn run(self) -> Result<Summary, Error> {
        let snapshot = load_snapshot(&self.config.catalog_path)?;
        info!(
            catalog = %self.config.catalog_path.display(),
            columns = snapshot.columns.len(),
            "Loaded catalog snapshot."
        );

        fs::create_dir_all(&self.config.output_dir).with_context(|| {
            format!(
                "Failed to create output directory '{}'.",
                self.config.output_dir.display()
            )
        })?;

        let mut registry = DomainRegistry::with_overrides(self.config.type_overrides.clone());
        let mut summary = Summary::default();

        for column in &snapshot.columns {
            let profile = match register_and_profile(&mut registry, column) {
                Ok(profile) => profile,
                Err(e) => {
                    let kind = e.kind();
                    let error = Error::from(e);
                    warn!(
                        column = %column.qualified_name(),
                        ?kind,
                        error = %format!("{:#}", error),
                        "Failed to profile column. Skipping."
                    );
                    summary.skipped += 1;
                    continue;
                }
            };

            if self.write_profile(&profile)? {
                summary.domain_files += 1;
            }
            summary.profiled += 1;
        }

        Ok(summary)
    }

    /// Writes the output files of a column, returning whether a domain file was written.
    fn write_profile(&self, profile: &ColumnProfile) -> Result<bool, Error> {
        let dist_path = self.config.output_dir.join(format!("{}.dist", profile.column));
        fs::write(&dist_path, render_distribution(profile))
            .with_context(|| format!("Failed to write distribution file '{}'.", dist_path.display()))?;
        debug!(column = %profile.column, path = %dist_path.display(), "Wrote distribution file.");

        if !self.config.write_domain_files {
            return Ok(false);
        }

        let Some(domain) = render_domain(profile) else {
            return Ok(false);
        };

        let domain_path = self.config.output_dir.join(format!("{}.domain", profile.column));
        fs::write(&domain_path, domain)
            .with_context(|| format!("Failed to write domain file '{}'.", domain_path.display()))?;
        debug!(column = %profile.column, path = %domain_path.display(), "Wrote domain file.");

        Ok(true)
    }
}

fn register_and_profile(
    registry: &mut DomainRegistry, column: &CatalogColumn,
) -> Result<ColumnProfile, CatalogError> {
    let name = column.qualified_name();
    registry.register(name.clone(), &column.column_type)?;
    let domain = registry.resolve(&name)?;
    profile_column(column, domain)
}

fn load_snapshot(path: &Path) -> Result<CatalogSnapshot, Error> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read catalog snapshot '{}'.", path.display()))?;

    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let snapshot = if is_json {
        serde_json::from_str(&raw).context("Failed to parse catalog snapshot as JSON.")?
    } else {
        serde_yaml::from_str(&raw).context("Failed to parse catalog snapshot as YAML.")?
    };

    Ok(snapshot)
}
