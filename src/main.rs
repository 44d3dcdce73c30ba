//! kql-lens - Projection-minimizing KQL rewriter and result normalizer.

mod cli;
mod logging;

use cli::{read_arg_or_stdin, Cli, Command};
use kql_lens::backend::ReplayBackend;
use kql_lens::config::Config;
use kql_lens::error::{LensError, Result};
use kql_lens::result::{QueryResponse, ResultNormalizer};
use kql_lens::rewrite::QueryOptimizer;
use kql_lens::tool::KqlQueryTool;
use tracing::{error, info};

fn main() {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    let cli = Cli::parse_args();
    logging::init_stderr_logging(cli.verbose);

    if let Err(e) = run(&cli) {
        error!("{}: {}", e.category(), e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let config = load_config(cli)?;

    match &cli.command {
        Command::Optimize { query } => {
            let query = read_arg_or_stdin(query)?;
            let optimizer = QueryOptimizer::new(config.catalog()?);
            let rewrite = optimizer.rewrite(&query);
            info!("Rewrite: {}", rewrite.kind);
            println!("{}", rewrite.query);
        }
        Command::Normalize { response } => {
            let text = if response == "-" {
                read_arg_or_stdin(response)?
            } else {
                std::fs::read_to_string(response).map_err(|e| {
                    LensError::backend(format!("Failed to read response file {response}: {e}"))
                })?
            };
            let response = QueryResponse::from_json(&text)?;
            let output = ResultNormalizer::new(config.normalizer).normalize_response(&response)?;
            println!("{}", output.render()?);
        }
        Command::Run {
            query,
            resource_id,
            replay,
            ..
        } => {
            let query = read_arg_or_stdin(query)?;
            let tool = KqlQueryTool::from_config(&config, ReplayBackend::new(replay))?;
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .map_err(|e| LensError::internal(format!("Failed to start runtime: {e}")))?;
            println!("{}", runtime.block_on(tool.run(&query, resource_id)));
        }
        Command::Tables => {
            println!("{}", config.catalog()?.describe());
        }
    }

    Ok(())
}

/// Resolves configuration with precedence: CLI flags, environment, config file, defaults.
fn load_config(cli: &Cli) -> Result<Config> {
    let config_path = cli.config_path();
    info!("Loading config from: {}", config_path.display());

    let mut config = Config::load_from_file(&config_path)?;
    config.apply_env_overrides()?;
    cli.apply_overrides(&mut config);
    config.validate()?;

    Ok(config)
}
