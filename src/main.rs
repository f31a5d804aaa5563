use std::{path::PathBuf, sync::Arc};

use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use tower::ServiceExt;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use trip_points::{
    adapters::api::http::HttpPointsApi,
    commands::{
        view_action::{ViewAction, ViewActionRequest},
        ViewActions,
    },
    config::load_settings,
    domain::{PointId, UpdateType},
    model::PointsModel,
};

#[derive(Debug, Parser)]
#[command(name = "trip-points", about = "Inspect and edit trip points")]
struct Cli {
    /// Path to a TOML config file (defaults to ./trip.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List points
    List,
    /// List known destinations
    Destinations,
    /// List offers per point type
    Offers,
    /// Delete a point by id
    Delete { id: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let settings = load_settings(cli.config.as_deref())?;
    info!(end_point = %settings.end_point, "using points service");

    let api = HttpPointsApi::from_settings(&settings)
        .with_context(|| format!("invalid end point '{}'", settings.end_point))?;
    let model = Arc::new(PointsModel::new(Arc::new(api)));
    model.subscribe(|update_type, point| {
        debug!(?update_type, point_id = ?point.map(|point| &point.id), "model changed");
    });
    model.init().await;

    match cli.command {
        Command::List => {
            let offers = model.offers();
            for point in model.points().iter() {
                let destination = point
                    .destination
                    .as_ref()
                    .and_then(|id| model.destination(id))
                    .map(|destination| destination.name)
                    .unwrap_or_else(|| "-".to_string());
                let selected: Vec<&str> = point
                    .selected_offers(&offers)
                    .into_iter()
                    .map(|offer| offer.title.as_str())
                    .collect();
                println!(
                    "{}\t{}\t{}\t{} - {}\t€{}\t{}",
                    point.id,
                    point.point_type,
                    destination,
                    format_date(point.date_from),
                    format_date(point.date_to),
                    point.base_price,
                    selected.join(", "),
                );
            }
        }
        Command::Destinations => {
            for destination in model.destinations().iter() {
                println!(
                    "{}\t{}\t{}",
                    destination.id,
                    destination.name,
                    destination.description.as_deref().unwrap_or_default()
                );
            }
        }
        Command::Offers => {
            for group in model.offers().iter() {
                for offer in &group.offers {
                    println!("{}\t{}\t{}\t€{}", group.point_type, offer.id, offer.title, offer.price);
                }
            }
        }
        Command::Delete { id } => {
            let id = PointId(id);
            let point = model
                .points()
                .iter()
                .find(|point| point.id == id)
                .cloned()
                .with_context(|| format!("no point with id {id}"))?;
            ViewActions::new(model.clone())
                .oneshot(ViewActionRequest {
                    update_type: UpdateType::Minor,
                    action: ViewAction::DeletePoint(point),
                })
                .await
                .with_context(|| format!("failed to delete point {id}"))?;
            println!("deleted {id}");
        }
    }

    Ok(())
}

fn format_date(date: Option<DateTime<Utc>>) -> String {
    date.map(|date| date.format("%d/%m/%y %H:%M").to_string())
        .unwrap_or_else(|| "--".to_string())
}
