use std::{fs::File, io::BufReader, path::PathBuf};

use anyhow::Context;
use clap::{Args, ValueEnum};
use comfy_table::{Table, presets::UTF8_FULL};
use shuttle_dispatch::{
    insertion::{
        best_insertion_finder::{BestInsertionFinder, InsertionSearchResult, ScoredInsertion},
        cost_calculation_strategy::CostStrategy,
        insertion_params::{InsertionParams, Threads},
    },
    json::types::{JsonDispatchSnapshot, JsonInsertionResult},
    problem::{
        dispatch_snapshot::DispatchSnapshot,
        request::Request,
        vehicle_entry::{VehicleEntry, find_vehicle_entry},
    },
};
use tracing::{debug, info};

use crate::parsers;

#[derive(Clone, Copy, ValueEnum)]
pub enum CostStrategyArg {
    Reject,
    Discourage,
}

impl From<CostStrategyArg> for CostStrategy {
    fn from(value: CostStrategyArg) -> Self {
        match value {
            CostStrategyArg::Reject => CostStrategy::RejectSoftConstraintViolations,
            CostStrategyArg::Discourage => CostStrategy::DiscourageSoftConstraintViolations,
        }
    }
}

#[derive(Args)]
pub struct InsertArgs {
    /// Dispatch snapshot with vehicles, requests and travel times
    #[arg(short, long)]
    snapshot: PathBuf,

    /// JSON file with insertion parameters, defaults to $SHUTTLE_PARAMS
    #[arg(short, long)]
    params: Option<PathBuf>,

    /// Number of worker threads (default: all cores)
    #[arg(short, long)]
    threads: Option<usize>,

    /// Seconds spent at a new pickup or dropoff
    #[arg(long)]
    stop_duration: Option<f64>,

    /// Time budget of each request search (e.g., "50ms", "2s")
    #[arg(long, value_parser = parsers::parse_duration)]
    deadline: Option<jiff::SignedDuration>,

    #[arg(long, value_enum)]
    cost_strategy: Option<CostStrategyArg>,

    /// Lists the N cheapest insertions of every request instead of the best one
    #[arg(long, conflicts_with = "json")]
    top: Option<usize>,

    /// Prints the results as JSON
    #[arg(long)]
    json: bool,
}

pub fn run(args: InsertArgs) -> Result<(), anyhow::Error> {
    let params = load_params(&args)?;
    debug!("{:?}", params);

    let file = File::open(&args.snapshot)
        .with_context(|| format!("cannot open snapshot {}", args.snapshot.display()))?;
    let json: JsonDispatchSnapshot = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("cannot parse snapshot {}", args.snapshot.display()))?;

    let DispatchSnapshot {
        estimator,
        entries,
        requests,
    } = json.build_snapshot()?;

    info!(
        "Inserting {} requests into {} vehicles",
        requests.len(),
        entries.len()
    );

    let finder = BestInsertionFinder::new(estimator, &params)?;

    if let Some(top) = args.top {
        let mut table = create_table();
        for request in &requests {
            let mut ranked = finder.rank_insertions(request, &entries);
            ranked.truncate(top);

            if ranked.is_empty() {
                table.add_row(unassignable_row(request));
            }
            for scored in &ranked {
                table.add_row(insertion_row(request, scored, &entries));
            }
        }
        println!("{table}");

        return Ok(());
    }

    let outcomes = requests
        .iter()
        .map(|request| (request, finder.find_best_insertion(request, &entries)))
        .collect::<Vec<_>>();

    let unassignable = outcomes
        .iter()
        .filter(|(_, outcome)| outcome.result == InsertionSearchResult::Unassignable)
        .count();
    info!("{} of {} requests are unassignable", unassignable, outcomes.len());

    if args.json {
        let results = outcomes
            .iter()
            .map(|(request, outcome)| JsonInsertionResult::from_outcome(request, outcome, &entries))
            .collect::<Vec<_>>();
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        let mut table = create_table();
        for (request, outcome) in &outcomes {
            match &outcome.result {
                InsertionSearchResult::Assigned(best) => {
                    table.add_row(insertion_row(request, best, &entries))
                }
                InsertionSearchResult::Unassignable => table.add_row(unassignable_row(request)),
            };
        }
        println!("{table}");
    }

    Ok(())
}

fn load_params(args: &InsertArgs) -> Result<InsertionParams, anyhow::Error> {
    let path = args
        .params
        .clone()
        .or_else(|| std::env::var_os("SHUTTLE_PARAMS").map(PathBuf::from));

    let mut params = match path {
        Some(path) => {
            let file = File::open(&path)
                .with_context(|| format!("cannot open parameters {}", path.display()))?;
            serde_json::from_reader(BufReader::new(file))
                .with_context(|| format!("cannot parse parameters {}", path.display()))?
        }
        None => InsertionParams::default(),
    };

    if let Some(threads) = args.threads {
        params.threads = Threads::Multi(threads);
    }
    if let Some(stop_duration) = args.stop_duration {
        params.stop_duration = stop_duration;
    }
    if let Some(deadline) = args.deadline {
        params.deadline = Some(deadline);
    }
    if let Some(cost_strategy) = args.cost_strategy {
        params.cost_strategy = cost_strategy.into();
    }

    Ok(params)
}

fn create_table() -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec![
        "Request",
        "Vehicle",
        "Pickup after",
        "Dropoff after",
        "Cost",
        "Pickup time",
        "Dropoff time",
    ]);
    table
}

fn insertion_row(request: &Request, scored: &ScoredInsertion, entries: &[VehicleEntry]) -> Vec<String> {
    vec![
        request.external_id().to_owned(),
        find_vehicle_entry(entries, scored.vehicle_id)
            .map_or_else(|| scored.vehicle_id.to_string(), |entry| {
                entry.vehicle().external_id.clone()
            }),
        scored.pickup_idx.to_string(),
        scored.dropoff_idx.to_string(),
        format!("{:.1}", scored.cost),
        format!("{:.1}", scored.detour_time_info.pickup.departure_time),
        format!("{:.1}", scored.detour_time_info.dropoff.arrival_time),
    ]
}

fn unassignable_row(request: &Request) -> Vec<String> {
    let mut row = vec![request.external_id().to_owned(), "unassignable".to_owned()];
    row.extend(std::iter::repeat_n("-".to_owned(), 5));
    row
}
