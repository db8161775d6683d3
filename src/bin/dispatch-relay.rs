use dispatch_relay::channels::telegram::{Relay, TelegramApiClient};
use dispatch_relay::config::load_settings_from_env;
use dispatch_relay::runtime::{run_polling, PollingDefaults};
use dispatch_relay::shared::logging::NO_TRACE;
use dispatch_relay::shared::RelayLog;
use std::sync::atomic::AtomicBool;

fn run() -> Result<(), String> {
    let loaded = load_settings_from_env().map_err(|err| format!("[ERROR] {err}"))?;
    let settings = loaded.settings;
    let log = RelayLog::new(settings.tunables.log_path.clone());
    for warning in &loaded.warnings {
        log.warn(NO_TRACE, "config.warning", &warning.to_string());
    }

    log.info(NO_TRACE, "relay.starting", "starting bot");
    let client = TelegramApiClient::new(
        &settings.tunables.telegram_api_base,
        &settings.bot_token,
        settings.tunables.poll_timeout_secs,
    );
    let relay = Relay::from_settings(&settings, log.clone());
    log.info(NO_TRACE, "relay.polling", "bot started, polling");

    let stop = AtomicBool::new(false);
    run_polling(&relay, &client, &stop, &PollingDefaults::default());
    Ok(())
}

fn main() {
    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}
