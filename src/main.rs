use anyhow::{Context, Result};
use log::info;
use recipe_cost::cli::parse_args;
use recipe_cost::config::PipelineConfig;
use recipe_cost::pipeline;

fn main() -> Result<()> {
    dotenv::dotenv().ok(); // .env may hold RECIPE_COST_* paths

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli_args = parse_args();
    if let Some(jobs) = cli_args.jobs {
        rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build_global()
            .with_context(|| format!("Failed to start a pool of {} worker threads", jobs))?;
        info!("Costing with {} worker threads", jobs);
    }

    let config = PipelineConfig::from(&cli_args);
    let summary = pipeline::run(&config)?;
    println!("{}", summary);
    Ok(())
}
