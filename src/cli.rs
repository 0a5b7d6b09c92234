// File: ./src/cli.rs
//! Shared command-line interface logic, like printing help.

pub fn print_help() {
    println!(
        "Cadence v{} - A minimal recurring-task manager",
        env!("CARGO_PKG_VERSION")
    );
    println!();
    println!("USAGE:");
    println!("    cadence [--root <path>] <command> [options]");
    println!("    cadence --help");
    println!();
    println!("COMMANDS:");
    println!("    add <summary>         Create a task");
    println!("    list                  List all tasks");
    println!("    due [date]            Show tasks due on a day (default: today)");
    println!("    markers <from> <to>   Per-day due counts over a date range");
    println!("    done <uid>            Complete a task (recurring tasks roll over)");
    println!("    rm <uid>              Delete a task");
    println!("    advance               Roll forward overdue recurring tasks");
    println!();
    println!("OPTIONS:");
    println!("    -r, --root <path>     Use a different directory for config and data.");
    println!("    -v, --verbose         Log advance/storage activity to stderr.");
    println!("    -h, --help            Show this help message.");
    println!();
    println!("ADD OPTIONS:");
    println!("    --due <date>          Due day (YYYY-MM-DD)");
    println!("    --repeat <freq>       daily | weekly | monthly | yearly | custom");
    println!("    --every <n>           Repeat every n units (default 1)");
    println!("    --on <days>           Weekdays for weekly rules, e.g. Mon,Thu");
    println!("    --until <date>        Last day the recurrence is valid");
    println!();
    println!("EXAMPLES:");
    println!("    cadence add \"Water the plants\" --repeat weekly --on Mon,Thu");
    println!("    cadence add \"Rent\" --repeat monthly --due 2024-04-01");
    println!("    cadence add \"Stretch\" --repeat daily --until 2024-12-31");
    println!("    cadence due 2024-04-01");
    println!("    cadence markers 2024-04-01 2024-04-30");
    println!();
    println!("Dates are calendar days; times and timezones never shift a task's day.");
}
