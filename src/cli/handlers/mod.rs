use std::fs;

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::cli::script::{self, Action};
use crate::io::{config_io, logbook_io};
use crate::model::config::LogConfig;
use crate::model::flight::{Flight, FlightField};
use crate::store::check;
use crate::store::logbook::{LogBook, SharedLogBook};
use crate::store::notification::DeleteHint;
use crate::sync::live::LiveList;
use crate::sync::ops::{Surface, ViewOp};
use crate::sync::reconciler::Reconciler;
use crate::sync::view::{DataSource, MirrorView};

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli, config: LogConfig) -> Result<(), Box<dyn std::error::Error>> {
    let ctx = Context { cli: &cli, config };
    match &cli.command {
        Commands::List(args) => cmd_list(&ctx, args),
        Commands::Replay(args) => cmd_replay(&ctx, args),
        Commands::Check => cmd_check(&ctx),
    }
}

/// Load the config named by `--config` (or the default lookup)
pub fn load_config(cli: &Cli) -> Result<LogConfig, config_io::ConfigError> {
    config_io::read_config(cli.config.as_deref())
}

struct Context<'a> {
    cli: &'a Cli,
    config: LogConfig,
}

impl Context<'_> {
    fn load_logbook(&self) -> Result<LogBook, logbook_io::LogBookError> {
        logbook_io::load_logbook(&self.cli.logbook, self.config.limits.clone())
    }

    fn search_fields(&self) -> Vec<FlightField> {
        self.config.search.fields.clone()
    }
}

// ---------------------------------------------------------------------------
// Read command handlers
// ---------------------------------------------------------------------------

fn cmd_list(ctx: &Context, args: &ListArgs) -> Result<(), Box<dyn std::error::Error>> {
    let book = ctx.load_logbook()?;
    let mut reconciler = Reconciler::new(&book, ctx.search_fields());
    reconciler.attach();
    if let Some(text) = &args.search {
        reconciler.begin_search(text)?;
    }
    let sections = reconciler.sections(reconciler.displayed());

    if ctx.cli.json {
        println!("{}", serde_json::to_string_pretty(&sections_to_json(sections))?);
    } else if sections.is_empty() {
        println!("no flights");
    } else {
        for line in format_sections(sections) {
            println!("{}", line);
        }
    }
    Ok(())
}

fn cmd_check(ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
    let file = logbook_io::read_logbook_file(&ctx.cli.logbook)?;
    let issues = check::check_flights(&file.flights, file.next_id, &ctx.config.limits);

    if ctx.cli.json {
        let result = CheckJson {
            valid: issues.is_empty(),
            flights: file.flights.len(),
            issues: &issues,
        };
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        for issue in &issues {
            println!("  {}", issue);
        }
        if issues.is_empty() {
            println!("✓ logbook is valid ({} flights)", file.flights.len());
        } else {
            println!("✗ logbook has {} problem(s)", issues.len());
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Replay
// ---------------------------------------------------------------------------

fn cmd_replay(ctx: &Context, args: &ReplayArgs) -> Result<(), Box<dyn std::error::Error>> {
    let text = fs::read_to_string(&args.script)
        .map_err(|e| format!("could not read {}: {}", args.script.display(), e))?;
    let actions = script::parse_script(&text)?;

    let book = ctx.load_logbook()?.shared();
    let mut view = MirrorView::new();
    let mut list = LiveList::attach(&book, ctx.search_fields(), &mut view);

    for (line, action) in actions {
        let name = action.name();
        let (batches, rejected) = match run_action(&book, &mut list, &mut view, action) {
            Ok(batches) => (batches, None),
            Err(Rejected { batches, error }) => (batches, Some(error)),
        };
        if let Some(error) = &rejected {
            tracing::info!(line, action = name, %error, "action rejected");
        }

        if ctx.cli.json {
            for batch in &batches {
                let json = BatchJson {
                    line,
                    action: name,
                    ops: batch,
                };
                println!("{}", serde_json::to_string(&json)?);
            }
            if let Some(error) = rejected {
                let json = RejectedJson {
                    line,
                    action: name,
                    error,
                };
                println!("{}", serde_json::to_string(&json)?);
            }
        } else {
            for l in format_step(line, name, &batches) {
                println!("{}", l);
            }
            if let Some(error) = rejected {
                println!("  rejected: {}", error);
            }
        }
    }

    verify(&list, &view)?;

    if args.save {
        logbook_io::save_logbook(&ctx.cli.logbook, &book.borrow())?;
        if !ctx.cli.json {
            println!("saved {}", ctx.cli.logbook.display());
        }
    }
    Ok(())
}

/// An action the logbook or the list refused, with whatever batches it
/// still caused (a rejected update still notifies)
struct Rejected {
    batches: Vec<Vec<ViewOp>>,
    error: String,
}

impl Rejected {
    fn before_any_change(error: impl ToString) -> Self {
        Rejected {
            batches: Vec::new(),
            error: error.to_string(),
        }
    }
}

fn run_action(
    book: &SharedLogBook,
    list: &mut LiveList,
    view: &mut MirrorView,
    action: Action,
) -> Result<Vec<Vec<ViewOp>>, Rejected> {
    // The logbook borrow must end before pumping; the lists read it.
    let result = match action {
        Action::Add {
            date,
            aircraft,
            route,
            remarks,
            minutes,
        } => {
            let mut flight = Flight::new(date);
            flight.aircraft = aircraft;
            flight.route = route;
            flight.remarks = remarks;
            flight.minutes = minutes;
            book.borrow_mut().add(flight).map(|_| ())
        }
        Action::Update {
            id,
            date,
            aircraft,
            route,
            remarks,
            minutes,
        } => {
            let stored = book.borrow().get(id).cloned();
            let mut flight = stored.unwrap_or_else(|| {
                let mut f = Flight::new(date.unwrap_or_default());
                f.id = id;
                f
            });
            script::apply_update(&mut flight, date, aircraft, route, remarks, minutes);
            book.borrow_mut().update(flight)
        }
        Action::FailUpdate { id } => {
            let stored = book.borrow().get(id).cloned();
            let mut flight = stored.ok_or_else(|| Rejected::before_any_change(format!("no flight with id {id}")))?;
            let max = book.borrow().limits().max_len(FlightField::Aircraft);
            flight.aircraft = "X".repeat(max + 1);
            book.borrow_mut().update(flight)
        }
        Action::Delete {
            surface,
            section,
            row,
        } => {
            let (surface, at) = script::target(surface, list.displayed(), section, row);
            if !list.reconciler().is_live(surface) {
                return Err(Rejected::before_any_change(format!("the {surface} list is not shown")));
            }
            let id = list
                .projection(surface)
                .item_at(at)
                .map_err(Rejected::before_any_change)?
                .id;
            book.borrow_mut()
                .delete(id, DeleteHint { surface, at })
                .map(|_| ())
        }
        Action::Select {
            surface,
            section,
            row,
        } => {
            let (surface, at) = script::target(surface, list.displayed(), section, row);
            list.select(surface, at).map_err(Rejected::before_any_change)?;
            return Ok(Vec::new());
        }
        Action::Search { text } => {
            let ops = if list.is_searching() {
                list.set_search_text(&text, view)
            } else {
                list.begin_search(&text, view)
            };
            return ops.map(|ops| vec![ops]).map_err(Rejected::before_any_change);
        }
        Action::EndSearch => return Ok(vec![list.end_search(view)]),
    };

    let batches = list.pump(view);
    match result {
        Ok(()) => Ok(batches),
        Err(e) => Err(Rejected {
            batches,
            error: e.to_string(),
        }),
    }
}

/// After a replay the mirrored lists must equal the logbook's projections
fn verify(list: &LiveList, view: &MirrorView) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(fault) = view.faults().first() {
        return Err(format!("view rejected an operation: {}", fault).into());
    }
    for surface in Surface::ALL {
        if list.reconciler().is_live(surface) && !view.agrees_with(surface, list.reconciler()) {
            tracing::warn!(%surface, "mirrored list diverged");
            return Err(format!("the {} list diverged from the logbook", surface).into());
        }
    }
    Ok(())
}
