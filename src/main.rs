use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use expense_tracker::config::Config;
use expense_tracker::coordinator::ExpenseCoordinator;
use expense_tracker::database;
use expense_tracker::expenses::{ExpenseStore, SqliteExpenseStore};
use expense_tracker::preferences::PreferenceStore;
use expense_tracker::repository::ExpenseRepository;
use expense_tracker::scheduler::{LogNotifier, ReminderScheduler, SystemClock, TokioWakeup};
use expense_tracker::shell::{AlwaysGranted, ReminderShell};
use expense_tracker::utils::{format_amount, format_reminder_time};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // load environment variables
    dotenv::dotenv().ok();
    let config = Config::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_filter)),
        )
        .init();

    let db = database::init_db(&config.data_path).await?;
    let store: Arc<dyn ExpenseStore> = Arc::new(SqliteExpenseStore::new(db.clone()));
    let repository = ExpenseRepository::new(store);
    let preferences = PreferenceStore::new(db);

    let reminder = preferences.get().await?;
    let coordinator = ExpenseCoordinator::new(repository, reminder).await?;

    let (wakeup, mut fired) = TokioWakeup::new();
    let scheduler = Arc::new(ReminderScheduler::new(
        preferences.clone(),
        Arc::new(wakeup),
        Arc::new(LogNotifier),
        Arc::new(SystemClock),
    ));
    let shell = ReminderShell::new(preferences, scheduler.clone(), Arc::new(AlwaysGranted));

    let outcome = shell.restore().await?;
    info!(
        expenses = coordinator.expenses().get().len(),
        total = %format_amount(coordinator.total().get()),
        reminder = %format_reminder_time(reminder.hour, reminder.minute),
        ?outcome,
        "expense tracker ready"
    );

    let wakeups = async {
        while let Some(token) = fired.recv().await {
            if let Err(e) = scheduler.on_fire(token).await {
                error!(error = %e, "failed to handle reminder wake-up");
            }
        }
    };

    tokio::select! {
        result = shell.run(coordinator.reminder_changes()) => result?,
        _ = wakeups => {}
        _ = tokio::signal::ctrl_c() => info!("shutting down"),
    }

    Ok(())
}
