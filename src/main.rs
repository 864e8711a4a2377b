use anyhow::Context;
use branch_locator::adapters::render::OutputFormat;
use branch_locator::app::commands::{Command, HELP_TEXT};
use branch_locator::app::session::{Flow, LocatorSession};
use branch_locator::core::pagination::Pagination;
use branch_locator::domain::ports::{BranchSource, LocationProvider};
use branch_locator::utils::error::{ErrorSeverity, LocatorError};
use branch_locator::utils::{logger, validation::Validate};
use branch_locator::{CliConfig, GeoJsonMap, GraphQlBranchSource};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.log_json {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting branch-locator");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    let config = match cli.resolve().and_then(|config| {
        cli.validate()?;
        config.validate()?;
        Ok(config)
    }) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Configuration validation failed: {}", e);
            tracing::error!("Suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(e.severity().exit_code().max(1));
        }
    };

    let source = GraphQlBranchSource::from_config(&config);
    let locator = config
        .build_location_provider()
        .context("failed to set up the geolocation provider")?;
    let pagination = Pagination::starting_at(config.page_size(), cli.page);
    let mut session = LocatorSession::new(source, locator, GeoJsonMap::new(), pagination);

    let format = config.output_format();
    let map_output = config.map_output().map(str::to_string);

    let initial_failure = session.load_current_page().await.err();
    if let Some(e) = &initial_failure {
        report(e);
    }
    if let Some(query) = &cli.query {
        session.search(query);
    }
    if cli.locate {
        if let Err(e) = session.locate().await {
            report(&e);
        }
    }

    show(&session, format, map_output.as_deref())?;

    if cli.once {
        // 根據錯誤嚴重程度決定退出碼
        if let Some(e) = initial_failure {
            let exit_code = e.severity().exit_code();
            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
        return Ok(());
    }

    println!("\nType 'help' for commands.");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("failed to read command")? {
        if line.trim().is_empty() {
            continue;
        }

        let command = match line.parse::<Command>() {
            Ok(command) => command,
            Err(e) => {
                report(&e);
                continue;
            }
        };

        if command == Command::Help {
            println!("{}", HELP_TEXT);
            continue;
        }

        match session.execute(command).await {
            Ok(Flow::Quit) => break,
            Ok(Flow::Continue) => {}
            Err(e) => report(&e),
        }

        show(&session, format, map_output.as_deref())?;
    }

    tracing::info!("Session ended");
    Ok(())
}

fn show<S, L>(
    session: &LocatorSession<S, L, GeoJsonMap>,
    format: OutputFormat,
    map_output: Option<&str>,
) -> anyhow::Result<()>
where
    S: BranchSource,
    L: LocationProvider,
{
    println!("{}", session.render(format)?);

    if let Some(path) = map_output {
        session
            .map()
            .write_to(path)
            .with_context(|| format!("failed to write map to {}", path))?;
    }
    Ok(())
}

/// Command failures never end the session; they are logged and shown.
fn report(e: &LocatorError) {
    match e.severity() {
        ErrorSeverity::Low => tracing::warn!("{} (Category: {:?})", e, e.category()),
        _ => tracing::error!(
            "{} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        ),
    }
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());
}
