use anyhow::{Context as _, Result, anyhow, bail};
use launcher_prefs::config::PlatformConfig;
use launcher_prefs::dispatcher::DispatcherDeps;
use launcher_prefs::grid::GridSize;
use launcher_prefs::i18n::{I18n, Language};
use launcher_prefs::icons::{IconCacheGeneration, InstalledPackages};
use launcher_prefs::keys::SettingKey;
use launcher_prefs::os_settings::{OsSettings, Scope};
use launcher_prefs::restart::{
    ProcessRelauncher, RELAUNCH_DELAY_ARG, RELAUNCH_TARGET_ARG, RestartOutcome, RestartScheduler,
};
use launcher_prefs::session::{ClickResponse, SessionOptions, SettingsSession};
use launcher_prefs::store::{self, SettingsStore};
use launcher_prefs::{debug_log, logger};
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use std::time::Duration;

const SCHEDULE_RESTART_ARG: &str = "--schedule-restart";

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Set(SettingKey, String),
    Os(Scope, String, String),
    Grid(u32, u32),
    Click(SettingKey),
    Pack(String),
    Pause,
    Show,
    Log(bool),
    Stop,
    Quit,
}

fn parse_key(raw: &str) -> Result<SettingKey> {
    SettingKey::from_key(raw).ok_or_else(|| anyhow!("unknown setting {raw:?}"))
}

fn parse_command(line: &str) -> Result<Option<Command>> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(None);
    };
    let rest: Vec<&str> = words.collect();

    let command = match (verb, rest.as_slice()) {
        ("set", [key, value @ ..]) if !value.is_empty() => {
            Command::Set(parse_key(key)?, value.join(" "))
        }
        ("os", [scope, key, value]) => Command::Os(
            Scope::parse(scope).ok_or_else(|| anyhow!("scope must be system or secure"))?,
            (*key).to_string(),
            (*value).to_string(),
        ),
        ("grid", [columns, rows]) => Command::Grid(
            columns.parse().context("columns must be a number")?,
            rows.parse().context("rows must be a number")?,
        ),
        ("click", [key]) => Command::Click(parse_key(key)?),
        ("pack", [package]) => Command::Pack((*package).to_string()),
        ("pause", []) => Command::Pause,
        ("show", []) => Command::Show,
        ("log", ["on"]) => Command::Log(true),
        ("log", ["off"]) => Command::Log(false),
        ("stop", []) => Command::Stop,
        ("quit" | "exit", []) => Command::Quit,
        _ => bail!("unrecognized command: {}", line.trim()),
    };
    Ok(Some(command))
}

fn flag_value<'a>(args: &'a [String], name: &str) -> Option<&'a str> {
    args.iter()
        .position(|arg| arg == name)
        .and_then(|index| args.get(index + 1))
        .map(String::as_str)
}

fn print_screen(session: &SettingsSession) {
    let i18n = session.i18n();
    for control in session.screen().controls() {
        let state = if control.enabled { "" } else { " (disabled)" };
        let warning = if control.widget_frame_visible { " [!]" } else { "" };
        println!(
            "{:<28} {}{}{}",
            control.key.as_str(),
            control.title(i18n),
            state,
            warning
        );
        if let Some(summary) = &control.summary {
            for line in summary.lines() {
                println!("{:<28}   {}", "", line);
            }
        }
    }
    if session.restart_required() {
        println!("{}", i18n.restart_pending_notice);
    }
}

fn print_click(session: &mut SettingsSession, key: SettingKey) {
    match session.on_click(key) {
        None => println!("{}: default action", key.as_str()),
        Some(ClickResponse::Confirm(confirmation)) => {
            println!("{}\n{}", confirmation.title, confirmation.message);
            println!("-> {}", confirmation.accept().action);
        }
        Some(ClickResponse::Launch(request)) => println!("-> {}", request.action),
        Some(ClickResponse::GridPicker(initial)) => {
            let i18n = session.i18n();
            println!("{} {} [{}]", i18n.grid_size_text, initial, i18n.grid_size_custom_positive)
        }
        Some(ClickResponse::IconPackPicker) => println!("{}", session.i18n().title_icon_pack),
        Some(ClickResponse::ProtectedApps) => println!("-> {}", session.i18n().title_protected_apps),
    }
}

/// Runs one command; returns false when the session should end.
fn run_command(session: &mut SettingsSession, command: Command) -> Result<bool> {
    match command {
        Command::Set(key, value) => session.apply_user_value(key, &value)?,
        Command::Os(scope, key, value) => session.os_settings().put_string(scope, &key, &value)?,
        Command::Grid(columns, rows) => session.set_grid_size(GridSize::new(columns, rows))?,
        Command::Click(key) => {
            print_click(session, key);
            return Ok(!session.finish_requested());
        }
        Command::Pack(package) => session.choose_icon_pack(&package)?,
        Command::Pause => {
            if session.on_pause() {
                debug_log!("[main] icon pack picker dismissed");
            }
        }
        Command::Show => {}
        Command::Log(true) => {
            logger::enable_file_logging()?;
            println!("{}", logger::log_file_path().display());
        }
        Command::Log(false) => logger::disable_file_logging()?,
        Command::Stop => return Ok(!session.on_stop()),
        Command::Quit => return Ok(false),
    }
    Ok(true)
}

fn main() -> Result<()> {
    logger::initialize();
    let args: Vec<String> = std::env::args().skip(1).collect();

    if let Some(delay) = flag_value(&args, RELAUNCH_DELAY_ARG) {
        let millis = delay.parse::<u64>().unwrap_or_default();
        std::thread::sleep(Duration::from_millis(millis));
        debug_log!(
            "[main] relaunched for {}",
            flag_value(&args, RELAUNCH_TARGET_ARG).unwrap_or("home")
        );
    }

    let i18n = I18n::new(Language::detect());
    let config = PlatformConfig::load();
    let db_path = store::local_state_db_path();
    let db = store::open_database(&db_path)?;

    let deps = DispatcherDeps {
        icon_cache: Arc::new(IconCacheGeneration::default()),
        packages: Arc::new(InstalledPackages::new(config.installed_packages.clone())),
        device_profile: config.device_profile,
    };
    let home = config.home_component.clone();
    let mut session = SettingsSession::setup(
        SettingsStore::from_db(&db)?,
        OsSettings::from_db(&db)?,
        config,
        deps,
        i18n,
        SessionOptions {
            schedule_restart: args.iter().any(|arg| arg == SCHEDULE_RESTART_ARG),
        },
    );
    print_screen(&session);

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("> ");
        io::stdout().flush()?;
        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;

        let keep_going = match parse_command(&line) {
            Ok(None) => true,
            Ok(Some(command)) => run_command(&mut session, command).unwrap_or_else(|err| {
                eprintln!("{err:#}");
                true
            }),
            Err(err) => {
                eprintln!("{err:#}");
                true
            }
        };
        if session.dispatch_pending() > 0 {
            print_screen(&session);
        }
        if !keep_going {
            break;
        }
    }

    if let Err(err) = db.flush() {
        debug_log!("[main] failed to flush {}: {}", db_path.display(), err);
    }
    let scheduler = RestartScheduler::new(ProcessRelauncher, home);
    if session.teardown(&scheduler) == RestartOutcome::NotRequired {
        debug_log!("[main] exiting without restart");
    }
    Ok(())
}
