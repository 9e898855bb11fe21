use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{debug, info};
use tripplan::models::{ActivityKind, AttractionRecord, ItineraryDetails, SavedItinerary, parse_date};
use tripplan::planner::ItineraryStore;
use tripplan::{
    AttractionFilter, Catalog, FjallItineraryStore, GeoClusterer, HotelFilter, MemoryItineraryStore,
    PlanningRequest, TripPlanConfig, TripPlanError, TripPlanner,
};

#[derive(Parser)]
#[command(author, version, about = "Plan multi-day trips around a destination's attractions", long_about = None)]
struct Cli {
    /// Configuration file (defaults to <config dir>/tripplan/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Plan an itinerary and print it
    Plan {
        /// Catalog JSON file with destinations, attractions and hotels
        #[arg(long)]
        catalog: PathBuf,

        #[arg(short, long)]
        destination: i64,

        /// Number of days
        #[arg(short = 'n', long)]
        days: u32,

        /// First day of the trip (YYYY-MM-DD)
        #[arg(short, long)]
        start: String,

        /// Use this hotel instead of searching near the attractions
        #[arg(long)]
        hotel: Option<i64>,

        #[arg(long)]
        user: Option<i64>,

        /// JSON array of attractions to plan with instead of the catalog's top picks
        #[arg(long)]
        attractions: Option<PathBuf>,

        /// Keep the itinerary in memory only
        #[arg(long, default_value_t = false)]
        no_persist: bool,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Print the day clusters for a destination as JSON
    Cluster {
        #[arg(long)]
        catalog: PathBuf,

        #[arg(short, long)]
        destination: i64,

        #[arg(short = 'n', long)]
        days: u32,
    },
    /// Print a saved itinerary
    Show {
        #[arg(long)]
        id: u64,

        /// Catalog used to resolve destination and hotel details
        #[arg(long)]
        catalog: Option<PathBuf>,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },
    /// List destinations as JSON, most popular first
    Destinations {
        #[arg(long)]
        catalog: PathBuf,

        /// Case-insensitive match on name or country
        #[arg(long)]
        search: Option<String>,
    },
    /// List a destination's attractions as JSON
    Attractions {
        #[arg(long)]
        catalog: PathBuf,

        #[arg(short, long)]
        destination: i64,

        /// Keep only this category (repeatable)
        #[arg(long = "category")]
        categories: Vec<String>,

        #[arg(long)]
        max_price_range: Option<u8>,

        #[arg(long, default_value_t = false)]
        must_visit: bool,
    },
    /// List a destination's hotels as JSON, highest rated first
    Hotels {
        #[arg(long)]
        catalog: PathBuf,

        #[arg(short, long)]
        destination: i64,

        #[arg(long)]
        min_rating: Option<f64>,

        /// Maximum price per night
        #[arg(long)]
        max_price: Option<f64>,

        #[arg(long, default_value_t = false)]
        restaurant: bool,

        #[arg(long, default_value_t = false)]
        pool: bool,

        #[arg(long, default_value_t = false)]
        gym: bool,

        #[arg(long, default_value_t = false)]
        spa: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            match e.downcast_ref::<TripPlanError>() {
                Some(err) => eprintln!("Error: {}", err.user_message()),
                None => eprintln!("Error: {e:#}"),
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = TripPlanConfig::load_from_path(cli.config).context("Failed to load configuration")?;
    tripplan::logging::init(&config.logging, cli.verbose)?;
    debug!(?config, "Configuration loaded");

    match cli.command {
        Command::Plan {
            catalog,
            destination,
            days,
            start,
            hotel,
            user,
            attractions,
            no_persist,
            format,
        } => {
            let start_date = parse_date(&start)?;
            let catalog = Arc::new(Catalog::load(&catalog)?);
            let attractions = attractions.map(|path| load_attractions(&path)).transpose()?;

            let store: Arc<dyn ItineraryStore> = if no_persist {
                Arc::new(MemoryItineraryStore::new())
            } else {
                Arc::new(FjallItineraryStore::open(config.storage.resolved_location())?)
            };

            let planner = TripPlanner::new(&config, catalog.clone(), catalog.clone(), store)?;
            let saved = planner
                .plan(PlanningRequest {
                    destination_id: destination,
                    num_days: days,
                    start_date,
                    attractions,
                    hotel_id: hotel,
                    user_id: user,
                })
                .await?;

            info!(id = saved.id, persisted = !no_persist, "Itinerary ready");
            print_details(&catalog.resolve_details(saved), format)?;
        }
        Command::Cluster {
            catalog,
            destination,
            days,
        } => {
            let catalog = Catalog::load(&catalog)?;
            let clusterer = GeoClusterer::from_config(&config.clustering);
            let clusters = clusterer.cluster_attractions(catalog.attractions(destination)?, days as usize);
            println!("{}", serde_json::to_string_pretty(&clusters)?);
        }
        Command::Show { id, catalog, format } => {
            let location = config.storage.resolved_location();
            if !location.exists() {
                // nothing was ever saved here; opening would create an empty store
                return Err(TripPlanError::invalid_input(format!(
                    "Itinerary with ID {id} not found (no store at {})",
                    location.display()
                ))
                .into());
            }

            let catalog = Arc::new(match catalog {
                Some(path) => Catalog::load(&path)?,
                None => Catalog::default(),
            });
            let store = Arc::new(FjallItineraryStore::open(&location)?);
            let planner = TripPlanner::new(&config, catalog.clone(), catalog.clone(), store)?;
            let itinerary = planner.get(id).await?;
            print_details(&catalog.resolve_details(SavedItinerary { id, itinerary }), format)?;
        }
        Command::Destinations { catalog, search } => {
            let catalog = Catalog::load(&catalog)?;
            let found = catalog.search_destinations(search.as_deref());
            let summaries: Vec<_> = found.iter().map(|d| d.summary()).collect();
            println!("{}", serde_json::to_string_pretty(&summaries)?);
        }
        Command::Attractions {
            catalog,
            destination,
            categories,
            max_price_range,
            must_visit,
        } => {
            let catalog = Catalog::load(&catalog)?;
            let filter = AttractionFilter {
                categories,
                max_price_range,
                must_visit_only: must_visit,
            };
            let attractions = catalog.filtered_attractions(destination, &filter)?;
            println!("{}", serde_json::to_string_pretty(&attractions)?);
        }
        Command::Hotels {
            catalog,
            destination,
            min_rating,
            max_price,
            restaurant,
            pool,
            gym,
            spa,
        } => {
            let catalog = Catalog::load(&catalog)?;
            let filter = HotelFilter {
                min_rating,
                max_price,
                has_restaurant: restaurant,
                has_pool: pool,
                has_gym: gym,
                has_spa: spa,
            };
            let hotels = catalog.filtered_hotels(destination, &filter)?;
            println!("{}", serde_json::to_string_pretty(&hotels)?);
        }
    }

    Ok(())
}

fn load_attractions(path: &Path) -> Result<Vec<AttractionRecord>> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Invalid attractions in {}", path.display()))
}

fn print_details(details: &ItineraryDetails, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", details.to_json()?),
        OutputFormat::Text => print!("{}", render_text(details)),
    }
    Ok(())
}

fn render_text(details: &ItineraryDetails) -> String {
    let itinerary = &details.itinerary;

    let mut out = format!(
        "{} (#{}): {} to {}\n",
        itinerary.title, details.id, itinerary.start_date, itinerary.end_date
    );
    match &details.destination {
        Some(d) => match &d.country {
            Some(country) => out.push_str(&format!("Destination: {}, {country}\n", d.name)),
            None => out.push_str(&format!("Destination: {}\n", d.name)),
        },
        None => out.push_str(&format!("Destination: {}\n", itinerary.destination_id)),
    }
    match (&details.hotel, itinerary.hotel_id) {
        (Some(hotel), _) if hotel.address.is_empty() => {
            out.push_str(&format!("Hotel: {} ({:.1})\n", hotel.name, hotel.rating));
        }
        (Some(hotel), _) => {
            out.push_str(&format!("Hotel: {}, {} ({:.1})\n", hotel.name, hotel.address, hotel.rating));
        }
        (None, Some(id)) => out.push_str(&format!("Hotel: {id}\n")),
        (None, None) => out.push_str("Hotel: none found nearby\n"),
    }

    for day in &itinerary.days {
        out.push_str(&format!("\nDay {} - {}\n", day.day_number, day.date));
        for activity in &day.activities {
            let detail = match activity.activity_type {
                ActivityKind::Transfer => format!(" ({} min)", activity.travel_duration_minutes),
                _ => String::new(),
            };
            out.push_str(&format!(
                "  {}-{}  {:<10} {}{detail}\n",
                activity.start_time.format("%H:%M"),
                activity.end_time.format("%H:%M"),
                activity.activity_type.to_string(),
                activity.title
            ));
        }
    }
    out
}
