use microdao::config::{load_config, Config};
use microdao::core::parse_params;
use microdao::db::{DataSourceRegistry, StatementExecutor, StatementType};
use microdao::logging::init_logging;
use microdao::{DaoError, Result};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;

const USAGE: &str = "usage: microdao [--config PATH] SQL [JSON-PARAMS]";

struct Args {
    config: Option<PathBuf>,
    sql: String,
    params: Option<String>,
}

fn parse_args(args: &[String]) -> std::result::Result<Args, String> {
    let mut config = None;
    let mut positional = Vec::new();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" | "-c" => {
                let path = iter.next().ok_or("--config needs a path")?;
                config = Some(PathBuf::from(path));
            }
            "--help" | "-h" => return Err(USAGE.to_string()),
            _ => positional.push(arg.clone()),
        }
    }

    let mut positional = positional.into_iter();
    let sql = positional.next().ok_or_else(|| USAGE.to_string())?;
    let params = positional.next();
    if positional.next().is_some() {
        return Err(USAGE.to_string());
    }
    Ok(Args { config, sql, params })
}

fn run(args: Args) -> Result<()> {
    let path = args
        .config
        .or_else(Config::default_path)
        .ok_or_else(|| DaoError::Config("no configuration file given".to_string()))?;
    let config = load_config(&path)?;
    init_logging(config.logging.as_ref())?;
    info!(config = %path.display(), datasource = %config.datasource, "starting microdao");

    let params = match &args.params {
        Some(json) => parse_params(json)?,
        None => Vec::new(),
    };

    let registry = DataSourceRegistry::from_config(&config);
    let dao = StatementExecutor::new(registry.default_provider()?);

    if StatementType::returns_rows(&args.sql) {
        let rows = dao.fetch_with(&args.sql, &params)?;
        let json = serde_json::to_string_pretty(&rows)?;
        println!("{}", json);
    } else {
        let count = dao.execute_with(&args.sql, &params)?;
        println!("{}", count);
    }
    Ok(())
}

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let args = match parse_args(&args) {
        Ok(args) => args,
        Err(message) => {
            eprintln!("{}", message);
            return ExitCode::FAILURE;
        }
    };

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
