use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, warn};

use ledger_bot::{BotConfig, BotError, ReportSchedule, Router, TelegramClient, config};
use ledger_core::{CsvLedgerStore, SessionStore, init_observability};

const POLL_ERROR_PAUSE: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> Result<(), BotError> {
    config::init();
    init_observability();

    let config = match BotConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            error!(event = "bot.config_invalid", domain = "bot", error = %err);
            return Err(err);
        }
    };

    let store = Arc::new(CsvLedgerStore::open(&config.ledger_path)?);
    let client = Arc::new(TelegramClient::new(&config)?);
    let router = Arc::new(Router::new(
        client.clone(),
        store,
        Arc::new(SessionStore::new()),
        config.timezone,
    ));

    let mut schedules = Vec::new();
    for schedule in [ReportSchedule::weekly()?, ReportSchedule::monthly()?] {
        let router = Arc::clone(&router);
        let chat_id = config.report_chat_id;
        schedules.push(schedule.spawn(config.timezone, move |kind| {
            let router = Arc::clone(&router);
            async move {
                if let Err(err) = router.send_report(chat_id, kind).await {
                    warn!(
                        event = "schedule.report_failed",
                        domain = "schedule",
                        report = kind.name(),
                        error = %err
                    );
                }
            }
        }));
    }

    info!(
        event = "bot.started",
        domain = "bot",
        ledger = %config.ledger_path.display(),
        timezone = %config.timezone
    );

    tokio::select! {
        _ = poll_updates(&client, &router) => {}
        _ = tokio::signal::ctrl_c() => {
            info!(event = "bot.stopping", domain = "bot");
        }
    }
    for handle in schedules {
        handle.abort();
    }
    Ok(())
}

/// Long-poll Telegram and handle updates one at a time, in order.
async fn poll_updates(client: &TelegramClient, router: &Router) {
    let mut offset: Option<i64> = None;
    loop {
        let updates = match client.get_updates(offset).await {
            Ok(updates) => updates,
            Err(err) => {
                warn!(event = "bot.poll_failed", domain = "bot", error = %err);
                tokio::time::sleep(POLL_ERROR_PAUSE).await;
                continue;
            }
        };
        for update in updates {
            offset = Some(update.update_id + 1);
            let Some(event) = update.into_event() else {
                continue;
            };
            let chat_id = event.chat_id();
            if let Err(err) = router.handle(event).await {
                warn!(
                    event = "bot.update_failed",
                    domain = "bot",
                    chat_id = chat_id,
                    error = %err
                );
            }
        }
    }
}
