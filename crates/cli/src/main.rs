//! Stormnet CLI - sewer network tracing, runoff and pipe capacity

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use stormnet_algorithms::hydraulics::{full_flow_capacity, CapacitySolution, PipeCapacityParams};
use stormnet_algorithms::network::{
    CatchmentLoadParams, GraphBuildParams, MappedNetwork, NetworkParams, StormNetwork, TimeUnit,
};
use stormnet_algorithms::runoff::{compute_runoff, RunoffMethod, RunoffParams};
use stormnet_core::io::{read_network_model, read_rainfall_text, write_series_csv};
use stormnet_core::records::NetworkModel;
use stormnet_core::NodeId;

// ─── CLI structure ──────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "stormnet")]
#[command(author, version, about = "Sewer network tracing, runoff and pipe capacity", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Network model input and graph construction flags
#[derive(Args)]
struct ModelArgs {
    /// Network model file (JSON)
    model: PathBuf,
    /// Cut links into inlet-controlled nodes and cap their inflow
    #[arg(long)]
    use_max_inflow: bool,
    /// Do not apply regulation capping
    #[arg(long)]
    ignore_regulations: bool,
    /// Prune overflow branches so every junction drains to one outlet
    #[arg(long)]
    remove_edges: bool,
    /// Concentration times in the model are stored in seconds
    #[arg(long)]
    tc_seconds: bool,
}

impl ModelArgs {
    fn params(&self) -> NetworkParams {
        NetworkParams {
            graph: GraphBuildParams {
                use_max_inflow: self.use_max_inflow,
                ignore_regulations: self.ignore_regulations,
                remove_edges: self.remove_edges,
            },
            catchments: CatchmentLoadParams {
                concentration_time_unit: if self.tc_seconds {
                    TimeUnit::Seconds
                } else {
                    TimeUnit::Minutes
                },
                ..Default::default()
            },
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Full-flow capacity of a circular pipe
    Capacity {
        /// Internal diameter (m)
        #[arg(short, long)]
        diameter: f64,
        /// Bed slope (m/m)
        #[arg(short, long)]
        slope: f64,
        /// Pipe material; names starting with "p" are plastic
        #[arg(short, long, default_value = "Concrete")]
        material: String,
        /// Convergence tolerance
        #[arg(long, default_value = "1e-6")]
        resolution: f64,
    },
    /// List the nodes upstream of one or more target nodes
    Upstream {
        #[command(flatten)]
        model: ModelArgs,
        /// Target nodes
        #[arg(required = true)]
        targets: Vec<String>,
    },
    /// List the catchments draining into a target node
    Catchments {
        #[command(flatten)]
        model: ModelArgs,
        /// Target node
        target: String,
    },
    /// Runoff time series at a target node
    Runoff {
        #[command(flatten)]
        model: ModelArgs,
        /// Rainfall text file (timestamp and intensity per line)
        rain: PathBuf,
        /// Target node
        target: String,
        /// Method: rational, time-area
        #[arg(long, default_value = "time-area")]
        method: String,
        /// Factor applied to all catchment runoff
        #[arg(long, default_value = "1.0")]
        scaling_factor: f64,
        /// Fixed discharge at a node, as NODE=VALUE (repeatable)
        #[arg(long = "additional", value_name = "NODE=VALUE")]
        additional: Vec<String>,
        /// Output CSV file; printed to stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Nodes and links on the paths between a set of nodes
    Trace {
        #[command(flatten)]
        model: ModelArgs,
        /// Nodes to connect
        #[arg(required = true, num_args = 2..)]
        nodes: Vec<String>,
    },
    /// Travel time from one node to another
    TravelTime {
        #[command(flatten)]
        model: ModelArgs,
        /// Upstream node
        source: String,
        /// Downstream node
        target: String,
    },
}

// ─── Helpers ────────────────────────────────────────────────────────────

fn setup_logging(verbose: bool) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("Setting default subscriber failed")
}

fn spinner(msg: &str) -> Result<ProgressBar> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    Ok(pb)
}

fn read_model(path: &Path) -> Result<NetworkModel> {
    let pb = spinner("Reading network model...")?;
    let model = read_network_model(path)
        .with_context(|| format!("Failed to read network model {}", path.display()))?;
    pb.finish_and_clear();
    info!(
        "Model: {} links, {} weirs, {} pumps, {} orifices, {} catchments",
        model.links.len(),
        model.weirs.len(),
        model.pumps.len(),
        model.orifices.len(),
        model.catchments.len()
    );
    Ok(model)
}

fn open_network(args: &ModelArgs) -> Result<StormNetwork<NetworkModel>> {
    let model = read_model(&args.model)?;
    let mut network = StormNetwork::new(model, args.params());
    let pb = spinner("Mapping network...")?;
    let report = network
        .map_network()
        .context("Failed to map network")?
        .report()
        .clone();
    pb.finish_and_clear();
    if report.has_issues() {
        warn!("{} issues while mapping the network", report.issues.len());
    }
    Ok(network)
}

fn mapped(network: &mut StormNetwork<NetworkModel>) -> Result<&MappedNetwork> {
    network.mapped().context("Failed to map network")
}

fn done(name: &str, path: &Path, elapsed: std::time::Duration) {
    println!("{} saved to: {}", name, path.display());
    println!("  Processing time: {:.2?}", elapsed);
}

fn parse_additional(entries: &[String]) -> Result<Vec<(NodeId, f64)>> {
    entries
        .iter()
        .map(|entry| {
            let Some((node, value)) = entry.split_once('=') else {
                anyhow::bail!("Additional discharge must be 'NODE=VALUE', got: {}", entry);
            };
            let value: f64 = value
                .trim()
                .parse()
                .with_context(|| format!("Invalid discharge in '{}'", entry))?;
            Ok((node.trim().to_string(), value))
        })
        .collect()
}

fn print_set(title: &str, items: &BTreeSet<String>) {
    println!("{} ({}):", title, items.len());
    for item in items {
        println!("  {}", item);
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose)?;

    match cli.command {
        // ── Capacity ─────────────────────────────────────────────────
        Commands::Capacity {
            diameter,
            slope,
            material,
            resolution,
        } => {
            let params = PipeCapacityParams {
                resolution,
                ..Default::default()
            };
            let solution = full_flow_capacity(diameter, slope, &material, &params)
                .context("Failed to calculate pipe capacity")?;
            match solution {
                CapacitySolution::Converged {
                    velocity,
                    discharge,
                    iterations,
                } => {
                    println!("Pipe: D = {} m, I = {}, material = {}", diameter, slope, material);
                    println!("  Velocity:  {:.4} m/s", velocity);
                    println!("  Discharge: {:.5} m³/s ({:.1} l/s)", discharge, discharge * 1e3);
                    println!("  Bisection steps: {}", iterations);
                }
                CapacitySolution::NoSolution => {
                    anyhow::bail!("No full-flow capacity found within resolution {}", resolution);
                }
            }
        }

        // ── Upstream ─────────────────────────────────────────────────
        Commands::Upstream { model, targets } => {
            let mut network = open_network(&model)?;
            let upstream = network
                .find_upstream_nodes(&targets)
                .context("Failed to trace upstream")?;
            for (target, nodes) in &upstream {
                print_set(&format!("Upstream of {}", target), nodes);
            }
        }

        // ── Catchments ───────────────────────────────────────────────
        Commands::Catchments { model, target } => {
            let mut network = open_network(&model)?;
            let mapped = mapped(&mut network)?;
            let upstream = mapped.upstream_of(&target);
            let catchments = mapped.connected_catchments(&upstream);

            println!("Catchments draining into {} ({}):", target, catchments.len());
            println!("  {:<20} {:>12} {:>8} {:>6} {:>8} {:>12}", "id", "area", "imp", "rf", "tc", "reduced");
            for c in &catchments {
                println!(
                    "  {:<20} {:>12.1} {:>8.1} {:>6.2} {:>8.1} {:>12.1}",
                    c.id,
                    c.area,
                    c.imperviousness,
                    c.reduction_factor,
                    c.concentration_time,
                    c.reduced_area()
                );
            }
            let total: f64 = catchments.iter().map(|c| c.reduced_area()).sum();
            let persons: f64 = catchments.iter().map(|c| c.persons).sum();
            println!("  Total reduced area: {:.1} m²", total);
            println!("  Persons: {:.0}", persons);
        }

        // ── Runoff ───────────────────────────────────────────────────
        Commands::Runoff {
            model,
            rain,
            target,
            method,
            scaling_factor,
            additional,
            output,
        } => {
            let method: RunoffMethod = method.parse().context("Unknown runoff method")?;
            let params = RunoffParams {
                additional_discharge: parse_additional(&additional)?.into_iter().collect(),
                scaling_factor,
            };

            let pb = spinner("Reading rainfall...")?;
            let series = read_rainfall_text(&rain)
                .with_context(|| format!("Failed to read rainfall {}", rain.display()))?;
            pb.finish_and_clear();
            info!("Rainfall: {} samples", series.unpadded_len());

            let mut network = open_network(&model)?;
            let mapped = mapped(&mut network)?;

            let start = Instant::now();
            let runoff = compute_runoff(mapped, &series, &target, method, &params)
                .context("Failed to compute runoff")?;
            let elapsed = start.elapsed();
            let column = format!("{}_{}", target, method);

            match output {
                Some(path) => {
                    write_series_csv(&path, &[(column.as_str(), runoff.view())])
                        .context("Failed to write output")?;
                    done("Runoff", &path, elapsed);
                }
                None => {
                    println!("minute,{}", column);
                    for (minute, q) in runoff.iter().enumerate() {
                        println!("{},{}", minute, q);
                    }
                }
            }
            let (peak_minute, peak) = runoff
                .iter()
                .enumerate()
                .fold((0, 0.0), |best, (i, &q)| if q > best.1 { (i, q) } else { best });
            info!("Peak {:.3} at minute {}", peak, peak_minute);
        }

        // ── Trace ────────────────────────────────────────────────────
        Commands::Trace { model, nodes } => {
            let mut network = open_network(&model)?;
            let traced = network
                .trace_between(&nodes)
                .context("Failed to trace between nodes")?;
            print_set("Nodes", &traced.nodes);
            print_set("Links", &traced.links);
        }

        // ── Travel time ──────────────────────────────────────────────
        Commands::TravelTime {
            model,
            source,
            target,
        } => {
            let mut network = open_network(&model)?;
            let time = network
                .travel_time(&source, &target)
                .with_context(|| format!("Failed to compute travel time {} -> {}", source, target))?;
            println!("Travel time {} -> {}: {:.1} s ({:.2} min)", source, target, time, time / 60.0);
        }
    }

    Ok(())
}
