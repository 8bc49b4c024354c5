#![forbid(unsafe_code)]

mod cli;
mod error;
mod forms;
mod pages;
mod render;

use clap::Parser;
use cli::{BranchCommand, BuildingCommand, Cli, Command, DeleteArgs, FloorCommand, SpaceCommand};
use error::ConsoleError;
use fm_core::model::{Branch, Building, Floor, Space};
use fm_core::{EntityId, EntityKind};
use fm_store::{ApiConfig, Applied, Backend, Gateway, HttpGateway, NoticeLevel, StoreError, Ticket};
use pages::{BranchFilter, BuildingFilter, Console, FloorFilter, Listing, SpaceFilter};
use std::io::{self, BufRead, Write};
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

fn env_bool(name: &str, default: bool) -> bool {
    match fm_store::env_var(name) {
        Some(value) => matches!(
            value.to_ascii_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        ),
        None => default,
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let json = env_bool("FM_LOG_JSON", false);
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
            .init();
    }
}

fn config(cli: &Cli) -> ApiConfig {
    let mut config = ApiConfig::from_env();
    if let Some(api) = &cli.api {
        config = config.with_base_url(api.clone());
    }
    if let Some(ms) = cli.timeout_ms {
        config.timeout = Duration::from_millis(ms.clamp(100, 300_000));
    }
    config
}

/// Mount the page for `E`, load whatever else the forms pick from, and settle.
fn open<E: Listing, B: Backend>(console: &mut Console<B>, extra: &[EntityKind]) -> Result<(), ConsoleError> {
    console.mount::<E>();
    console.prefetch(extra);
    console.finish()?;
    Ok(())
}

fn outcome_of(applied: &[Applied], ticket: Ticket) -> Result<(), ConsoleError> {
    match applied.iter().find(|a| a.ticket == ticket) {
        Some(Applied {
            error: Some(message),
            ..
        }) => Err(StoreError::Rejected(message.clone()).into()),
        _ => Ok(()),
    }
}

fn list<E: Listing, B: Backend>(console: &mut Console<B>, filter: E::Filter) -> Result<String, ConsoleError> {
    open::<E, B>(console, &[])?;
    Ok(render::page(&console.view::<E>(&filter)))
}

fn save<E: Listing, B: Backend + Gateway<E>>(
    console: &mut Console<B>,
    ticket: Ticket,
) -> Result<String, ConsoleError> {
    let applied = console.finish()?;
    outcome_of(&applied, ticket)?;
    Ok(render::page(&console.view::<E>(&E::Filter::default())))
}

fn create<E: Listing, B: Backend + Gateway<E>>(
    console: &mut Console<B>,
    extra: &[EntityKind],
    build: impl FnOnce(&fm_store::AppStore) -> Result<E::Draft, ConsoleError>,
) -> Result<String, ConsoleError> {
    open::<E, B>(console, extra)?;
    let draft = build(console.store())?;
    let ticket = console.submit_create::<E>(draft)?;
    save::<E, B>(console, ticket)
}

fn update<E: Listing, B: Backend + Gateway<E>>(
    console: &mut Console<B>,
    raw_id: String,
    extra: &[EntityKind],
    build: impl FnOnce(&fm_store::AppStore, &E) -> Result<E::Patch, ConsoleError>,
) -> Result<String, ConsoleError> {
    let id = EntityId::try_new(raw_id)?;
    open::<E, B>(console, extra)?;
    let current = console
        .store()
        .slice::<E>()
        .get(&id)
        .cloned()
        .ok_or_else(|| ConsoleError::Unknown {
            kind: E::KIND,
            id: id.clone(),
        })?;
    let patch = build(console.store(), &current)?;
    let ticket = console.submit_update::<E>(id, patch)?;
    save::<E, B>(console, ticket)
}

/// Ask on `output`, read the answer from `input`. Only an explicit yes confirms.
fn ask(input: &mut impl BufRead, output: &mut impl Write, title: &str, message: &str) -> io::Result<bool> {
    writeln!(output, "{title}")?;
    write!(output, "{message} [y/N] ")?;
    output.flush()?;
    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}

fn delete<E: Listing, B: Backend + Gateway<E>>(
    console: &mut Console<B>,
    args: DeleteArgs,
    input: &mut impl BufRead,
    output: &mut impl Write,
) -> Result<String, ConsoleError> {
    let id = EntityId::try_new(args.id)?;
    open::<E, B>(console, &[])?;
    console.request_delete::<E>(id.clone())?;

    let confirmed = args.yes || {
        let dialog = console.dialog();
        let title = dialog.title().unwrap_or_default().to_string();
        let message = dialog.message().unwrap_or_default().to_string();
        ask(input, output, &title, &message)?
    };
    if !confirmed {
        console.cancel();
        return Ok("Cancelled.\n".to_string());
    }

    let applied = console.confirm()?;
    if let Some(rejected) = applied
        .iter()
        .find(|a| a.kind == E::KIND && a.operation.target() == Some(&id) && !a.is_ok())
    {
        return Err(StoreError::Rejected(rejected.error.clone().unwrap_or_default()).into());
    }
    Ok(render::page(&console.view::<E>(&E::Filter::default())))
}

fn overview<B: Backend>(console: &mut Console<B>) -> Result<String, ConsoleError> {
    console.prefetch(&EntityKind::ALL);
    console.finish()?;
    let store = console.store();

    let mut out = String::new();
    for kind in EntityKind::ALL {
        let count = match kind {
            EntityKind::Branch => store.branches().len(),
            EntityKind::Building => store.buildings().len(),
            EntityKind::Floor => store.floors().len(),
            EntityKind::Space => store.spaces().len(),
        };
        out.push_str(&format!("{}: {count}\n", kind.title()));
    }
    out.push_str(&render::list("Branch names", &fm_store::branch_names().select(store.branches().items())));
    out.push_str(&render::list("Building types", &fm_store::building_types().select(store.buildings().items())));
    out.push_str(&render::list("Floor names", &fm_store::floor_names().select(store.floors().items())));
    out.push_str(&render::list(
        "Floor buildings",
        &fm_store::floor_building_names().select(store.floors().items()),
    ));
    out.push_str(&render::list("Space names", &fm_store::space_names().select(store.spaces().items())));
    out.push_str(&render::list("Space managers", &fm_store::space_managers().select(store.spaces().items())));
    Ok(out)
}

const SPACE_PICKERS: &[EntityKind] = &[EntityKind::Branch, EntityKind::Building, EntityKind::Floor];

fn execute<B: Backend>(
    console: &mut Console<B>,
    command: Command,
    input: &mut impl BufRead,
    output: &mut impl Write,
) -> Result<String, ConsoleError> {
    match command {
        Command::Branches(command) => match command {
            BranchCommand::List { name } => list::<Branch, B>(console, BranchFilter { name }),
            BranchCommand::Add(fields) => create::<Branch, B>(console, &[], |_| Ok(forms::branch_draft(fields))),
            BranchCommand::Edit { id, fields } => {
                update::<Branch, B>(console, id, &[], |_, _| forms::branch_patch(fields))
            }
            BranchCommand::Delete(args) => delete::<Branch, B>(console, args, input, output),
        },
        Command::Buildings(command) => match command {
            BuildingCommand::List { name, building_type } => {
                list::<Building, B>(console, BuildingFilter { name, building_type })
            }
            BuildingCommand::Add(fields) => {
                create::<Building, B>(console, &[], |store| forms::building_draft(store, fields))
            }
            BuildingCommand::Edit { id, fields } => {
                update::<Building, B>(console, id, &[], |store, _| forms::building_patch(store, fields))
            }
            BuildingCommand::Delete(args) => delete::<Building, B>(console, args, input, output),
        },
        Command::Floors(command) => match command {
            FloorCommand::List { name, building } => list::<Floor, B>(
                console,
                FloorFilter {
                    floor_name: name,
                    building_name: building,
                },
            ),
            FloorCommand::Add(fields) => create::<Floor, B>(console, &[], |store| forms::floor_draft(store, fields)),
            FloorCommand::Edit { id, fields } => update::<Floor, B>(console, id, &[], |store, current| {
                forms::floor_replacement(store, current, fields)
            }),
            FloorCommand::Delete(args) => delete::<Floor, B>(console, args, input, output),
        },
        Command::Spaces(command) => match command {
            SpaceCommand::List { name, manager } => list::<Space, B>(
                console,
                SpaceFilter {
                    space_name: name,
                    manager,
                },
            ),
            SpaceCommand::Add(fields) => {
                create::<Space, B>(console, SPACE_PICKERS, |store| forms::space_draft(store, fields))
            }
            SpaceCommand::Edit { id, fields } => update::<Space, B>(console, id, SPACE_PICKERS, |store, current| {
                forms::space_replacement(store, current, fields)
            }),
            SpaceCommand::Delete(args) => delete::<Space, B>(console, args, input, output),
        },
        Command::Overview => overview(console),
    }
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();
    let config = config(&cli);
    let gateway = match HttpGateway::new(&config) {
        Ok(gateway) => gateway,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    };
    tracing::debug!(base_url = gateway.base_url(), "gateway ready");
    let mut console = Console::new(gateway);

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut stdout = io::stdout();
    let result = execute(&mut console, cli.command, &mut input, &mut stdout);

    let notices = console.take_notices();
    for notice in &notices {
        eprintln!("{}", render::notice(notice));
    }
    let failed_notice = notices.iter().any(|n| n.level == NoticeLevel::Failure);

    match result {
        Ok(text) => {
            print!("{text}");
            let banner = !console.store().errors().is_empty();
            if failed_notice || banner {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
