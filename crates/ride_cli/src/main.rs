use std::path::PathBuf;
use std::process::exit;
use std::sync::{mpsc, Arc, Mutex};
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use eyre::WrapErr;
use ride_core::config::RateConfig;
use ride_core::params::{
    DROPOFF_ADDRESS, DROPOFF_LATITUDE, DROPOFF_LONGITUDE, DROPOFF_NAME, PICKUP_ADDRESS,
    PICKUP_LATITUDE, PICKUP_LONGITUDE, PICKUP_NAME,
};
use ride_core::{
    BookingError, FareEstimate, FareEstimator, InMemoryRideStore, RideBooking, RideId,
    RideStatus, RideStore, RouteParams, StatusChange,
};
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

// ── CLI definition ─────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "ride",
    about = "Estimate ride fares and submit ride requests",
    long_about = "Prices a pickup/drop-off pair per vehicle tier from straight-line\n\
                  distance, and books rides against an in-process ride store."
)]
struct Cli {
    /// JSON rate config to use instead of the built-in rates
    #[arg(long, global = true, env = "RIDE_RATES")]
    rates: Option<PathBuf>,
    /// Print machine-readable JSON
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List vehicle tiers and their base rates
    Tiers,
    /// Estimate the fare for one tier
    Quote {
        /// Vehicle tier id (bike, rickshaw, mini, ac_car)
        #[arg(long)]
        tier: String,
        #[command(flatten)]
        route: RouteArgs,
    },
    /// Quote, submit a pending ride and follow its status
    Book {
        /// Vehicle tier id (bike, rickshaw, mini, ac_car)
        #[arg(long)]
        tier: String,
        #[command(flatten)]
        route: RouteArgs,
        /// Have a simulated driver accept the ride right away
        #[arg(long)]
        auto_accept: bool,
        /// How long to wait for a status change
        #[arg(long, default_value_t = 5)]
        wait_secs: u64,
    },
}

/// Route inputs, taken as raw strings and validated by `ride_core`.
#[derive(Args)]
struct RouteArgs {
    #[arg(long, allow_hyphen_values = true)]
    pickup_lat: String,
    #[arg(long, allow_hyphen_values = true)]
    pickup_lng: String,
    #[arg(long, allow_hyphen_values = true)]
    dropoff_lat: String,
    #[arg(long, allow_hyphen_values = true)]
    dropoff_lng: String,
    #[arg(long)]
    pickup_name: Option<String>,
    #[arg(long)]
    pickup_address: Option<String>,
    #[arg(long)]
    dropoff_name: Option<String>,
    #[arg(long)]
    dropoff_address: Option<String>,
}

impl RouteArgs {
    fn to_params(&self) -> RouteParams {
        let mut pairs = vec![
            (PICKUP_LATITUDE, self.pickup_lat.clone()),
            (PICKUP_LONGITUDE, self.pickup_lng.clone()),
            (DROPOFF_LATITUDE, self.dropoff_lat.clone()),
            (DROPOFF_LONGITUDE, self.dropoff_lng.clone()),
        ];
        let optional = [
            (PICKUP_NAME, &self.pickup_name),
            (PICKUP_ADDRESS, &self.pickup_address),
            (DROPOFF_NAME, &self.dropoff_name),
            (DROPOFF_ADDRESS, &self.dropoff_address),
        ];
        pairs.extend(
            optional
                .into_iter()
                .filter_map(|(key, value)| value.clone().map(|value| (key, value))),
        );
        RouteParams::from_pairs(pairs)
    }
}

// ── output ─────────────────────────────────────────────────────────

#[derive(Serialize)]
struct TierRow {
    tier: String,
    label: &'static str,
    rate_per_km: f64,
}

#[derive(Serialize)]
struct BookingReport {
    ride_id: String,
    tier: String,
    distance_km: f64,
    fare: u64,
    status: RideStatus,
}

impl From<&BookingOutcome> for BookingReport {
    fn from(outcome: &BookingOutcome) -> Self {
        Self {
            ride_id: outcome.ride_id.to_string(),
            tier: outcome.estimate.tier.as_str().to_string(),
            distance_km: outcome.estimate.distance_km,
            fare: outcome.estimate.fare,
            status: outcome.status,
        }
    }
}

fn print_json(value: &impl Serialize) -> eyre::Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).wrap_err("failed to serialize output")?
    );
    Ok(())
}

// ── helpers ────────────────────────────────────────────────────────

/// Exit code for failures the rider can act on.
const RIDER_ERROR_EXIT: i32 = 2;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_estimator(rates: Option<&PathBuf>) -> eyre::Result<FareEstimator> {
    let config = match rates {
        Some(path) => RateConfig::load(path)?,
        None => RateConfig::default(),
    };
    debug!(tiers = config.rates.len(), "using rate table");
    Ok(config.into_estimator())
}

/// Rider-facing text when `error` came from the booking flow.
fn rider_message(error: &eyre::Report) -> Option<&'static str> {
    error
        .downcast_ref::<BookingError>()
        .map(BookingError::user_message)
}

// ── commands ───────────────────────────────────────────────────────

struct BookingOutcome {
    ride_id: RideId,
    estimate: FareEstimate,
    /// `Pending` when no driver answered in time.
    status: RideStatus,
}

fn quote_fare(
    estimator: FareEstimator,
    tier: &str,
    route: &RouteArgs,
) -> Result<FareEstimate, BookingError> {
    let store = Arc::new(InMemoryRideStore::new());
    let mut booking = RideBooking::from_params(estimator, &route.to_params(), store)?;
    booking.quote(tier)
}

/// Quote, submit and wait up to `wait` for the first status change.
fn book_ride(
    estimator: FareEstimator,
    tier: &str,
    route: &RouteArgs,
    auto_accept: bool,
    wait: Duration,
) -> Result<BookingOutcome, BookingError> {
    let store = Arc::new(InMemoryRideStore::new());
    let mut booking =
        RideBooking::from_params(estimator, &route.to_params(), Arc::clone(&store))?;
    let estimate = booking.quote(tier)?;
    let ride_id = booking.confirm()?;

    let (sender, receiver) = mpsc::channel::<StatusChange>();
    let sender = Mutex::new(sender);
    let subscription = booking.watch(
        &ride_id,
        Box::new(move |change: &StatusChange| {
            if let Ok(sender) = sender.lock() {
                let _ = sender.send(change.clone());
            }
        }),
    )?;

    if auto_accept {
        let driver_store = Arc::clone(&store);
        let driver_ride = ride_id.clone();
        std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(200));
            if let Err(error) = driver_store.update_status(&driver_ride, RideStatus::Accepted) {
                tracing::warn!(%error, "simulated driver could not accept ride");
            }
        });
    }

    let status = receiver
        .recv_timeout(wait)
        .map_or(RideStatus::Pending, |change| change.current);
    subscription.cancel();

    Ok(BookingOutcome {
        ride_id,
        estimate,
        status,
    })
}

fn run_tiers(estimator: &FareEstimator, json: bool) -> eyre::Result<()> {
    let rows: Vec<TierRow> = estimator
        .rates()
        .iter()
        .map(|(tier, rate)| TierRow {
            tier: tier.as_str().to_string(),
            label: tier.label(),
            rate_per_km: rate,
        })
        .collect();
    if json {
        return print_json(&rows);
    }
    for row in rows {
        println!("{:<10} {:<10} {:>8.2} /km", row.tier, row.label, row.rate_per_km);
    }
    Ok(())
}

fn run_quote(
    estimator: FareEstimator,
    tier: &str,
    route: &RouteArgs,
    json: bool,
) -> eyre::Result<()> {
    let estimate = quote_fare(estimator, tier, route)?;
    if json {
        return print_json(&estimate);
    }
    println!(
        "{} ({:.2} km): {}",
        estimate.tier.label(),
        estimate.distance_km,
        estimate.summary()
    );
    Ok(())
}

fn run_book(
    estimator: FareEstimator,
    tier: &str,
    route: &RouteArgs,
    auto_accept: bool,
    wait_secs: u64,
    json: bool,
) -> eyre::Result<()> {
    let outcome = book_ride(
        estimator,
        tier,
        route,
        auto_accept,
        Duration::from_secs(wait_secs),
    )?;
    if json {
        return print_json(&BookingReport::from(&outcome));
    }
    println!("{}", outcome.estimate.summary());
    println!(
        "{} (ride {})",
        RideStatus::Pending.notice(),
        outcome.ride_id
    );
    match outcome.status {
        RideStatus::Pending => {
            println!("No driver response within {wait_secs}s; ride is still pending.")
        }
        status => println!("{}", status.notice()),
    }
    Ok(())
}

// ── main ───────────────────────────────────────────────────────────

fn main() -> eyre::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let estimator = load_estimator(cli.rates.as_ref())?;

    let result = match cli.command {
        Commands::Tiers => run_tiers(&estimator, cli.json),
        Commands::Quote { tier, route } => run_quote(estimator, &tier, &route, cli.json),
        Commands::Book {
            tier,
            route,
            auto_accept,
            wait_secs,
        } => run_book(estimator, &tier, &route, auto_accept, wait_secs, cli.json),
    };

    if let Err(error) = &result {
        if let Some(message) = rider_message(error) {
            eprintln!("Error: {message}");
            debug!(%error, "request failed");
            exit(RIDER_ERROR_EXIT);
        }
    }
    result
}
