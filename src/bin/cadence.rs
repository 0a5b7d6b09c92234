use anyhow::{Context as _, Result};
use cadence::cli;
use cadence::context::StandardContext;
use cadence::controller::{TaskController, TaskDraft};
use cadence::model::{CalendarDay, Frequency, RecurrenceRule, Task, Weekday};
use simplelog::{ColorChoice, Config as LogConfig, LevelFilter, TermLogger, TerminalMode};
use std::env;
use std::path::PathBuf;
use std::sync::Arc;

fn main() -> Result<()> {
    let mut args: Vec<String> = env::args().skip(1).collect();

    if args
        .iter()
        .any(|a| a == "--help" || a == "-h" || a == "help")
    {
        cli::print_help();
        return Ok(());
    }

    let verbose = take_flag(&mut args, &["--verbose", "-v"]);
    let root = take_value(&mut args, &["--root", "-r"])?.map(PathBuf::from);

    TermLogger::init(
        if verbose {
            LevelFilter::Info
        } else {
            LevelFilter::Warn
        },
        LogConfig::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )
    .ok();

    let ctx = Arc::new(StandardContext::new(root));
    let mut controller = TaskController::open(ctx)?;
    let today = CalendarDay::today();

    // Maintenance trigger: roll overdue recurring tasks forward on startup.
    // Safe to repeat; a second same-day pass changes nothing.
    if controller.config().advance_on_load {
        controller.advance(today)?;
    }

    let command = args.first().cloned().unwrap_or_else(|| "list".to_string());
    match command.as_str() {
        "add" => cmd_add(&mut controller, &args[1..], today),
        "list" => cmd_list(&controller),
        "due" => cmd_due(&controller, &args[1..], today),
        "markers" => cmd_markers(&controller, &args[1..]),
        "done" => cmd_done(&mut controller, &args[1..], today),
        "rm" => cmd_rm(&mut controller, &args[1..]),
        "advance" => cmd_advance(&mut controller, today),
        other => {
            cli::print_help();
            Err(anyhow::anyhow!("Unknown command: {}", other))
        }
    }
}

/// Removes a standalone flag from the arg list, reporting whether it was set.
fn take_flag(args: &mut Vec<String>, names: &[&str]) -> bool {
    match args.iter().position(|a| names.contains(&a.as_str())) {
        Some(i) => {
            args.remove(i);
            true
        }
        None => false,
    }
}

/// Removes a `--name value` pair from the arg list and returns the value.
fn take_value(args: &mut Vec<String>, names: &[&str]) -> Result<Option<String>> {
    let Some(i) = args.iter().position(|a| names.contains(&a.as_str())) else {
        return Ok(None);
    };
    if i + 1 >= args.len() {
        return Err(anyhow::anyhow!("Missing value for {}", args[i]));
    }
    let value = args.remove(i + 1);
    args.remove(i);
    Ok(Some(value))
}

fn parse_day(value: &str) -> Result<CalendarDay> {
    Ok(CalendarDay::normalize(value)?)
}

fn parse_weekdays(value: &str) -> Result<Vec<Weekday>> {
    value
        .split(',')
        .map(|token| {
            token
                .trim()
                .parse::<Weekday>()
                .with_context(|| format!("Unknown weekday: {}", token.trim()))
        })
        .collect()
}

fn cmd_add(controller: &mut TaskController, args: &[String], today: CalendarDay) -> Result<()> {
    let mut args = args.to_vec();
    let due = take_value(&mut args, &["--due"])?
        .map(|v| parse_day(&v))
        .transpose()?;
    let repeat = take_value(&mut args, &["--repeat"])?;
    let every = take_value(&mut args, &["--every"])?
        .map(|v| v.parse::<u32>().with_context(|| format!("Bad interval: {}", v)))
        .transpose()?
        .unwrap_or(1);
    let on = take_value(&mut args, &["--on"])?
        .map(|v| parse_weekdays(&v))
        .transpose()?
        .unwrap_or_default();
    let until = take_value(&mut args, &["--until"])?
        .map(|v| parse_day(&v))
        .transpose()?;

    let summary = args.join(" ");
    if summary.trim().is_empty() {
        return Err(anyhow::anyhow!("Nothing to add: summary is empty"));
    }

    let mut draft = TaskDraft::new(summary.trim());
    if let Some(day) = due {
        draft = draft.due(day);
    }
    if let Some(tag) = repeat {
        let mut rule = RecurrenceRule::new(Frequency::parse_tag(&tag)?, every).on_days(on);
        if let Some(end) = until {
            rule = rule.until(end);
        }
        draft = draft.repeating(rule);
    }

    let uid = controller.create_task(draft, today)?;
    if let Some(task) = controller.get(&uid) {
        println!("Added {}  {}", uid, describe(task));
    }
    Ok(())
}

fn cmd_list(controller: &TaskController) -> Result<()> {
    let hide_completed = controller.config().hide_completed;
    for task in controller.tasks() {
        if hide_completed && task.completed {
            continue;
        }
        println!(
            "{} {}  {}  {}",
            task.checkbox_symbol(),
            task.uid,
            task.summary,
            describe(task)
        );
    }
    Ok(())
}

fn cmd_due(controller: &TaskController, args: &[String], today: CalendarDay) -> Result<()> {
    let day = match args.first() {
        Some(value) => parse_day(value)?,
        None => today,
    };
    for task in controller.tasks_due_on(day) {
        println!("{} {}  {}", task.checkbox_symbol(), task.uid, task.summary);
    }
    Ok(())
}

fn cmd_markers(controller: &TaskController, args: &[String]) -> Result<()> {
    let (Some(from), Some(to)) = (args.first(), args.get(1)) else {
        return Err(anyhow::anyhow!("Usage: cadence markers <from> <to>"));
    };
    for (day, count) in controller.markers(parse_day(from)?, parse_day(to)?) {
        println!("{}  {}", day, count);
    }
    Ok(())
}

fn cmd_done(controller: &mut TaskController, args: &[String], today: CalendarDay) -> Result<()> {
    let uid = resolve_uid(controller, args.first().map(String::as_str))?;
    controller.complete_task(&uid, today)?;
    if let Some(task) = controller.get(&uid) {
        if task.completed {
            println!("Completed {}", task.summary);
        } else if let Some(next) = task.next_occurrence {
            println!("Completed {}; next on {}", task.summary, next);
        }
    }
    Ok(())
}

fn cmd_rm(controller: &mut TaskController, args: &[String]) -> Result<()> {
    let uid = resolve_uid(controller, args.first().map(String::as_str))?;
    controller.remove_task(&uid)?;
    println!("Removed {}", uid);
    Ok(())
}

fn cmd_advance(controller: &mut TaskController, today: CalendarDay) -> Result<()> {
    let report = controller.advance(today)?;
    println!(
        "{} task(s) rolled forward, {} skipped",
        report.updated.len(),
        report.skipped
    );
    Ok(())
}

/// Accepts a full uid or an unambiguous prefix.
fn resolve_uid(controller: &TaskController, arg: Option<&str>) -> Result<String> {
    let prefix = arg.ok_or_else(|| anyhow::anyhow!("Missing task uid"))?;
    let matches: Vec<&Task> = controller
        .tasks()
        .iter()
        .filter(|t| t.uid.starts_with(prefix))
        .collect();
    match matches.as_slice() {
        [task] => Ok(task.uid.clone()),
        [] => Err(anyhow::anyhow!("No task matches uid {}", prefix)),
        _ => Err(anyhow::anyhow!("Ambiguous uid prefix {}", prefix)),
    }
}

fn describe(task: &Task) -> String {
    let mut parts = Vec::new();
    if let Some(due) = task.due_date {
        parts.push(format!("due {}", due));
    }
    if let Some(rule) = &task.recurrence {
        let unit = match rule.frequency {
            Frequency::Daily | Frequency::Custom => "days",
            Frequency::Weekly => "weeks",
            Frequency::Monthly => "months",
            Frequency::Yearly => "years",
        };
        let mut repeat = if rule.interval > 1 {
            format!("every {} {}", rule.interval, unit)
        } else {
            format!("{}", rule.frequency)
        };
        if !rule.days_of_week.is_empty() {
            let days: Vec<String> = rule.days_of_week.iter().map(|d| d.to_string()).collect();
            repeat.push_str(&format!(" on {}", days.join(",")));
        }
        if let Some(end) = rule.end_date {
            repeat.push_str(&format!(" until {}", end));
        }
        parts.push(repeat);
    }
    if let Some(next) = task.next_occurrence {
        parts.push(format!("next {}", next));
    }
    parts.join(", ")
}
