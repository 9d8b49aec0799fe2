use clap::Parser;
use servicebook::config::cli::{BookArgs, Command};
use servicebook::core::filter::ALL_CATEGORIES;
use servicebook::utils::error::ErrorCategory;
use servicebook::utils::logger::{self, LogFormat};
use servicebook::{
    CliConfig, EngineError, StaticIdentity, ToggleOutcome, VerticalConfig, VerticalEngine,
};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 初始化日誌
    let format = if cli.json_logs {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };
    logger::init(format, cli.verbose);

    tracing::info!("Starting servicebook CLI");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    let config = match cli.load_vertical() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Failed to load vertical configuration: {}", e);
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(1);
        }
    };

    if let Err(e) = run(&cli, config).await {
        tracing::error!("❌ Command failed: {} (Category: {:?})", e, e.category());
        eprintln!("❌ {}", e.user_friendly_message());

        let exit_code = match e.category() {
            ErrorCategory::Validation => 2,
            ErrorCategory::Submission | ErrorCategory::NotFound => 3,
            ErrorCategory::Configuration => 1,
            _ => 4,
        };
        std::process::exit(exit_code);
    }

    Ok(())
}

async fn run(cli: &CliConfig, config: VerticalConfig) -> servicebook::Result<()> {
    let mut builder = VerticalEngine::builder(config);
    if let Command::Book(args) = &cli.command {
        if let Some(identity) = args.identity() {
            builder = builder.identity(Arc::new(StaticIdentity::signed_in(identity)));
        }
    }
    let mut engine = builder.build()?;

    // Ctrl-C 視為離開頁面，取消進行中的請求
    let view = engine.view_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            view.cancel();
        }
    });

    match &cli.command {
        Command::List { category } => {
            engine.load_catalog().await?;
            list(&engine, category);
        }
        Command::Show { id } => {
            engine.load_catalog().await?;
            match engine.service_detail(id).await? {
                Some(service) => {
                    println!("{} [{}]", service.title, service.category);
                    println!("  {}", service.description);
                    println!("  Price: {}", engine.formatter().format(&service.pricing));
                    if let Some(duration) = &service.duration {
                        println!("  Duration: {}", duration);
                    }
                    for feature in &service.features {
                        println!("  • {}", feature);
                    }
                }
                None => {
                    println!("Service '{}' not found, showing the catalog instead", id);
                    list(&engine, ALL_CATEGORIES);
                }
            }
        }
        Command::Compare { ids } => {
            engine.load_catalog().await?;
            for id in ids {
                if engine.toggle_compare(id)? == ToggleOutcome::Rejected {
                    eprintln!("⚠️ At most 3 services can be compared; skipped {}", id);
                }
            }
            if !engine.comparison().can_compare() {
                return Err(EngineError::ConfigError {
                    message: "select at least two services to compare".to_string(),
                });
            }
            engine.comparison_table().write_csv(std::io::stdout())?;
        }
        Command::Book(args) => {
            engine.load_catalog().await?;
            book(&engine, args).await?;
        }
        Command::Track { booking_id, phone } => {
            let mut tracker = engine.tracker();
            let result = tracker
                .track(booking_id, phone, &engine.view_token())
                .await?;
            println!("Booking {}: {}", result.booking_id, result.status);
            if let Some(title) = &result.service_title {
                println!("  Service: {}", title);
            }
            if let (Some(date), Some(slot)) = (&result.scheduled_date, &result.time_slot) {
                println!("  Scheduled: {} {}", date, slot);
            }
        }
    }

    Ok(())
}

fn list(engine: &VerticalEngine, category: &str) {
    println!("Categories: {}", engine.categories().join(" | "));
    for service in engine.visible_services(category) {
        let badge = if service.popular {
            " ★ popular"
        } else if service.trending {
            " ↑ trending"
        } else {
            ""
        };
        println!(
            "{:<8} {:<32} {:<18} {}{}",
            service.id,
            service.title,
            service.category,
            engine.formatter().format(&service.pricing),
            badge
        );
    }
}

async fn book(engine: &VerticalEngine, args: &BookArgs) -> servicebook::Result<()> {
    let mut session = engine.start_booking(&args.service)?;
    args.apply_to(session.edit_draft()?);

    match session.submit(&engine.view_token()).await {
        Ok(result) => {
            println!("✅ Booking confirmed: {}", result.booking_id);
            if result.is_mock() {
                println!("ℹ️ The booking service was offline; we will confirm by phone.");
            }
            Ok(())
        }
        Err(EngineError::ValidationError(errors)) => {
            for (field, message) in errors.iter() {
                eprintln!("  {}: {}", field, message);
            }
            Err(EngineError::ValidationError(errors))
        }
        Err(e) => Err(e),
    }
}
