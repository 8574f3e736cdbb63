use anyhow::Context;
use clap::Parser;
use slot_sniper::config::cli::{BookArgs, Command};
use slot_sniper::config::toml_config::TomlConfig;
use slot_sniper::core::orchestrator::PollingSettings;
use slot_sniper::utils::error::ErrorSeverity;
use slot_sniper::utils::prompt::{self, Confirmation};
use slot_sniper::utils::{logger, validation::Validate};
use slot_sniper::{
    BookingOutcome, CliConfig, PollingOrchestrator, ReqwestTransport, RunSettings,
    ServiceCatalog, SniperError,
};
use std::io::Write;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    // 初始化日誌
    if config.log_json {
        logger::init_json_logger(config.log_level.as_str());
    } else {
        logger::init_cli_logger(config.log_level.as_str());
    }
    tracing::debug!("CLI config: {:?}", config);

    let file_config = config.load_file_config().unwrap_or_else(|e| fail(e));
    let settings = config.run_settings(&file_config);
    if let Err(e) = settings.validate() {
        fail(e);
    }

    let transport = ReqwestTransport::new(settings.request_timeout, &settings.user_agent)
        .unwrap_or_else(|e| fail(e));

    match &config.command {
        Command::List => {
            let catalog = ServiceCatalog::fetch(&transport, &settings.endpoint)
                .await
                .unwrap_or_else(|e| fail(e));
            println!("{}", catalog.render());
            Ok(())
        }
        Command::Book(args) => book(args, &file_config, settings, transport).await,
    }
}

async fn book(
    args: &BookArgs,
    file_config: &TomlConfig,
    settings: RunSettings,
    transport: ReqwestTransport,
) -> anyhow::Result<()> {
    let plan = args.booking_plan(file_config).unwrap_or_else(|e| fail(e));
    if let Err(e) = plan.validate() {
        fail(e);
    }

    if !settings.no_confirm {
        println!("{}", prompt::summary(&plan, settings.dry_run));
        print!("Is this correct? [y/N] ");
        std::io::stdout().flush()?;

        let answer = tokio::task::spawn_blocking(|| prompt::read_answer(&mut std::io::stdin().lock()))
            .await
            .context("confirmation prompt was interrupted")??;

        match answer {
            Confirmation::Yes => {}
            Confirmation::No => return Ok(()),
            Confirmation::Invalid => std::process::exit(1),
        }
    }

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        // 第一次中斷：等目前這一輪結束後停止；第二次：立即結束
        while tokio::signal::ctrl_c().await.is_ok() {
            if on_interrupt(&on_signal) == Interrupt::Exit {
                tracing::warn!("🛑 Second interrupt, exiting immediately");
                std::process::exit(130);
            }
            tracing::info!("🛑 Interrupt received, stopping after the current attempt (press Ctrl-C again to exit now)");
        }
    });

    tracing::info!("🚀 Watching {} for appointments", settings.endpoint.base_url);
    let orchestrator = PollingOrchestrator::new(
        transport,
        settings.endpoint,
        plan.job,
        PollingSettings {
            interval: plan.interval,
            dry_run: settings.dry_run,
        },
        cancel,
    );

    match orchestrator.run().await {
        Ok(BookingOutcome::Booked(appointment)) => {
            tracing::info!("✅ Booked the appointment {}! Check your mails :)", appointment);
            Ok(())
        }
        Ok(BookingOutcome::DryRun(appointment)) => {
            tracing::info!("✅ Found {} (dry run, nothing booked)", appointment);
            Ok(())
        }
        Ok(BookingOutcome::NoMatch) => Ok(()),
        Ok(BookingOutcome::Failed(reason)) => fail(SniperError::BookingFailure { reason }),
        Err(e) => fail(e),
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Interrupt {
    Stop,
    Exit,
}

fn on_interrupt(cancel: &CancellationToken) -> Interrupt {
    if cancel.is_cancelled() {
        return Interrupt::Exit;
    }
    cancel.cancel();
    Interrupt::Stop
}

fn fail(e: SniperError) -> ! {
    tracing::error!(
        "❌ {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());

    let exit_code = match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_interrupt_exits() {
        let cancel = CancellationToken::new();
        assert_eq!(on_interrupt(&cancel), Interrupt::Stop);
        assert!(cancel.is_cancelled());
        assert_eq!(on_interrupt(&cancel), Interrupt::Exit);
    }
}
