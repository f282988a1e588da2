//! Episim CLI - Command-line interface for the epidemic simulation engine.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use epidemic_simulator_core_rs::{
    InterventionInput, Observables, OutbreakSchedule, RngManager, SamplerConfig, Scenario,
    ScenarioSampler, SimulationEngine,
};
use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;

/// Episim - Stochastic epidemic simulator
#[derive(Parser, Debug)]
#[command(name = "episim")]
#[command(author, version, about = "Stochastic epidemic simulator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run one scenario to termination
    Run {
        /// Population size
        #[arg(short = 'n', long, default_value = "1000000")]
        population: u64,

        /// Day the outbreak is seeded
        #[arg(long, default_value = "10")]
        outbreak_day: u32,

        /// Day vaccination becomes available
        #[arg(long, default_value = "410")]
        vaccine_day: u32,

        /// Horizon: the run ends at this day if the outbreak has not died out
        #[arg(long, default_value = "1000")]
        max_day: u32,

        /// Index cases seeded on the outbreak day
        #[arg(long, default_value = "1")]
        index_cases: u64,

        /// Hospital capacity in beds (default population / 1000)
        #[arg(long)]
        hospital_capacity: Option<u64>,

        /// Vaccination throughput in doses per day (default population / 200)
        #[arg(long)]
        daily_vaccinations: Option<u64>,

        /// Run a control scenario with no outbreak at all
        #[arg(long)]
        no_outbreak: bool,

        /// Intervention policy held for the whole run:
        /// none, recommend, isolate-sick, lockdown, or an action index 0-7
        #[arg(short, long, default_value = "none")]
        policy: String,

        /// Random seed
        #[arg(short, long, default_value = "42")]
        seed: u64,

        /// Write a day-by-day CSV trajectory to this path ("-" for stdout)
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Print the summary as JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Sample random scenarios from the episode distribution
    Sample {
        /// Number of scenarios to draw
        #[arg(short, long, default_value = "10")]
        count: usize,

        /// Probability that a drawn scenario has no outbreak
        #[arg(long, default_value = "0.5")]
        p_no_outbreak: f64,

        /// Population size for every drawn scenario
        #[arg(short = 'n', long, default_value = "1000000")]
        population: u64,

        /// Random seed
        #[arg(short, long, default_value = "42")]
        seed: u64,

        /// Pretty-print each scenario instead of one JSON object per line
        #[arg(long)]
        pretty: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            population,
            outbreak_day,
            vaccine_day,
            max_day,
            index_cases,
            hospital_capacity,
            daily_vaccinations,
            no_outbreak,
            policy,
            seed,
            csv,
            json,
        } => {
            let scenario = build_scenario(
                population,
                outbreak_day,
                vaccine_day,
                max_day,
                index_cases,
                hospital_capacity,
                daily_vaccinations,
                no_outbreak,
            );
            let input = parse_policy(&policy)?;
            run_scenario(scenario, input, seed, csv.as_deref(), json)?;
        }
        Commands::Sample {
            count,
            p_no_outbreak,
            population,
            seed,
            pretty,
        } => {
            sample_scenarios(count, p_no_outbreak, population, seed, pretty)?;
        }
    }

    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn build_scenario(
    population: u64,
    outbreak_day: u32,
    vaccine_day: u32,
    max_day: u32,
    index_cases: u64,
    hospital_capacity: Option<u64>,
    daily_vaccinations: Option<u64>,
    no_outbreak: bool,
) -> Scenario {
    let mut scenario = if no_outbreak {
        Scenario::no_outbreak(population, max_day)
    } else {
        Scenario::with_outbreak(population, outbreak_day, vaccine_day, max_day)
    };
    if let OutbreakSchedule::Outbreak {
        index_cases: cases, ..
    } = &mut scenario.schedule
    {
        *cases = index_cases;
    }
    if let Some(beds) = hospital_capacity {
        scenario.hospital_capacity = beds;
    }
    if let Some(doses) = daily_vaccinations {
        scenario.daily_vaccinations = doses;
    }
    scenario
}

/// Map a policy name (or raw action index) to the intervention flags held
/// for every day of the run.
fn parse_policy(policy: &str) -> Result<InterventionInput> {
    match policy {
        "none" => Ok(InterventionInput::none()),
        "recommend" => Ok(InterventionInput {
            recommend_distancing: true,
            isolate_symptomatic: false,
            isolate_all: false,
        }),
        "isolate-sick" => Ok(InterventionInput {
            recommend_distancing: false,
            isolate_symptomatic: true,
            isolate_all: false,
        }),
        "lockdown" => Ok(InterventionInput::all()),
        other => match other.parse::<u8>() {
            Ok(action) if action < 8 => Ok(InterventionInput::from_action_index(action)),
            _ => bail!(
                "Unknown policy '{}' (expected none, recommend, isolate-sick, lockdown, or 0-7)",
                other
            ),
        },
    }
}

fn run_scenario(
    scenario: Scenario,
    input: InterventionInput,
    seed: u64,
    csv: Option<&std::path::Path>,
    json: bool,
) -> Result<()> {
    let mut engine =
        SimulationEngine::new(scenario, seed).context("Failed to create simulation engine")?;

    let mut csv_out: Option<Box<dyn Write>> = match csv {
        Some(path) if path.as_os_str() == "-" => Some(Box::new(io::stdout().lock())),
        Some(path) => Some(Box::new(
            File::create(path)
                .with_context(|| format!("Failed to create CSV file {}", path.display()))?,
        )),
        None => None,
    };
    if let Some(out) = csv_out.as_mut() {
        writeln!(
            out,
            "day,susceptible,exposed,infected,critical,recovered,dead,vaccinated,step_cost,cumulative_cost,phase"
        )?;
    }

    let mut peak_infected = (0u64, 0u32);
    let mut peak_critical = (0u64, 0u32);

    while !engine.finished() {
        engine.step(input).context("Simulation step failed")?;
        let obs = engine.observe();

        if obs.infected > peak_infected.0 {
            peak_infected = (obs.infected, obs.day);
        }
        if obs.critical > peak_critical.0 {
            peak_critical = (obs.critical, obs.day);
        }
        if let Some(out) = csv_out.as_mut() {
            write_csv_row(out, &obs)?;
        }
    }

    let last = engine.observe();
    let costs = engine.costs();
    let summary = serde_json::json!({
        "seed": seed,
        "scenario": engine.scenario(),
        "days": last.day,
        "phase": last.phase.as_str(),
        "total_infections": engine.total_infections(),
        "peak_infected": { "count": peak_infected.0, "day": peak_infected.1 },
        "peak_critical": { "count": peak_critical.0, "day": peak_critical.1 },
        "dead": last.dead,
        "recovered": last.recovered,
        "vaccinated": last.vaccinated,
        "susceptible": last.susceptible,
        "cumulative_cost": last.cumulative_cost,
        "cost_breakdown": {
            "intervention": costs.total_intervention_cost,
            "death": costs.total_death_cost,
            "overflow": costs.total_overflow_cost,
        },
        "events": engine.event_log().events(),
    });

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("Episim - Epidemic Simulation");
    println!("============================\n");
    println!("Finished after {} days ({})", last.day, last.phase);
    println!("  Total infections:  {}", engine.total_infections());
    println!(
        "  Peak infected:     {} (day {})",
        peak_infected.0, peak_infected.1
    );
    println!(
        "  Peak critical:     {} (day {})",
        peak_critical.0, peak_critical.1
    );
    println!("  Deaths:            {}", last.dead);
    println!("  Recovered:         {}", last.recovered);
    println!("  Vaccinated:        {}", last.vaccinated);
    println!("  Still susceptible: {}", last.susceptible);
    println!("  Cumulative cost:   {:.0}", last.cumulative_cost);
    if !engine.event_log().is_empty() {
        println!("\nEvents:");
        for event in engine.event_log().events() {
            println!("  day {:>4}  {}", event.day(), event.event_type());
        }
    }

    Ok(())
}

fn write_csv_row(out: &mut Box<dyn Write>, obs: &Observables) -> Result<()> {
    writeln!(
        out,
        "{},{},{},{},{},{},{},{},{:.0},{:.0},{}",
        obs.day,
        obs.susceptible,
        obs.exposed,
        obs.infected,
        obs.critical,
        obs.recovered,
        obs.dead,
        obs.vaccinated,
        obs.step_cost,
        obs.cumulative_cost,
        obs.phase.as_str(),
    )?;
    Ok(())
}

fn sample_scenarios(
    count: usize,
    p_no_outbreak: f64,
    population: u64,
    seed: u64,
    pretty: bool,
) -> Result<()> {
    let config = SamplerConfig {
        p_no_outbreak,
        population,
        hospital_capacity: (population / 1000).max(1),
        daily_vaccinations: population / 200,
        ..SamplerConfig::default()
    };
    let sampler = ScenarioSampler::new(config).context("Invalid sampler configuration")?;
    let mut rng = RngManager::new(seed);

    for _ in 0..count {
        let scenario = sampler.sample(&mut rng);
        let line = if pretty {
            serde_json::to_string_pretty(&scenario)?
        } else {
            serde_json::to_string(&scenario)?
        };
        println!("{}", line);
    }

    Ok(())
}
