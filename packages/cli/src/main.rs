#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for the cancer map toolchain.
//!
//! Wraps the API server and the data maintenance tools (statistics
//! merge, geographic county assignment) behind one binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use cancer_map_boundary::BoundarySet;
use cancer_map_ingest::{backfill, stats};
use cancer_map_store::{RestStore, StoreConfig};

#[derive(Parser)]
#[command(name = "cancer-map", about = "Cancer map toolchain")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the API server
    Serve,
    /// Merge cancer statistics from a CSV export into the county file
    MergeStats {
        /// County collection JSON file
        #[arg(long, default_value = "data/counties.json")]
        counties: PathBuf,
        /// Statistics CSV export
        #[arg(long)]
        csv: PathBuf,
        /// Where to write the merged collection
        #[arg(long, default_value = "data/counties-merged.json")]
        output: PathBuf,
    },
    /// Assign unowned environmental sites to counties geographically
    AssignCounties {
        /// County boundary GeoJSON file
        #[arg(long, default_value = "data/texas-counties.geojson")]
        boundaries: PathBuf,
        /// Plan assignments without writing them to the backend
        #[arg(long)]
        dry_run: bool,
    },
}

#[actix_web::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        // run_server installs its own logger
        Commands::Serve => cancer_map_server::run_server().await?,
        Commands::MergeStats {
            counties,
            csv,
            output,
        } => {
            pretty_env_logger::init();
            let report = stats::run(&counties, &csv, &output)?;
            log::info!(
                "Merged {} of {} county rows into {}",
                report.matched,
                report.county_rows,
                output.display()
            );
        }
        Commands::AssignCounties {
            boundaries,
            dry_run,
        } => {
            pretty_env_logger::init();
            let store = RestStore::new(StoreConfig::from_env()?);
            let boundaries = BoundarySet::load(&boundaries)?;

            let counties = store.list_counties().await?;
            let sites = store.list_sites().await?;
            let plan = backfill::plan_assignments(&sites, &counties, &boundaries);

            if plan.is_empty() {
                log::info!("All sites already have a county");
            } else if dry_run {
                for assignment in &plan {
                    log::info!(
                        "Would assign site {} to {}",
                        assignment.site_store_id,
                        assignment.county_name
                    );
                }
                log::info!("Dry run: {} assignments planned", plan.len());
            } else {
                let applied = backfill::apply_assignments(&store, &plan).await?;
                log::info!("Assigned {applied} sites");
            }
        }
    }

    Ok(())
}
