// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, crate_version, value_parser};

fn json_args(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print pretty JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .conflicts_with("json")
            .help("Print one JSON object per line"),
    )
}

fn as_of_arg() -> Arg {
    Arg::new("as_of")
        .long("as-of")
        .value_name("YYYY-MM-DD")
        .help("Reference date for rolling overdue plans (default: today)")
}

fn project_arg(required: bool) -> Arg {
    Arg::new("project")
        .long("project")
        .value_name("NAME")
        .required(required)
        .help("Project name")
}

fn export_format_args(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("format")
            .long("format")
            .value_parser(["csv", "json"])
            .default_value("csv"),
    )
    .arg(Arg::new("out").long("out").value_name("PATH").required(true))
}

pub fn build_cli() -> Command {
    Command::new("devfin")
        .version(crate_version!())
        .about("Project finance for real-estate developments: budgets, payments and cash-flow forecasts")
        .arg(
            Arg::new("db")
                .long("db")
                .global(true)
                .value_name("PATH")
                .help("SQLite database file (default: $DEVFIN_DB or the platform data dir)"),
        )
        .subcommand(Command::new("init").about("Create the database if missing"))
        .subcommand(
            Command::new("config")
                .about("Persistent settings")
                .subcommand(Command::new("show"))
                .subcommand(
                    Command::new("set")
                        .arg(Arg::new("key").required(true))
                        .arg(Arg::new("value").required(true)),
                ),
        )
        .subcommand(
            Command::new("project")
                .about("Manage projects")
                .subcommand(
                    Command::new("add")
                        .arg(Arg::new("name").long("name").required(true))
                        .arg(Arg::new("status").long("status").default_value("Active"))
                        .arg(
                            Arg::new("no_defaults")
                                .long("no-defaults")
                                .action(ArgAction::SetTrue)
                                .help("Skip the default Buying/Construction budget categories"),
                        ),
                )
                .subcommand(Command::new("list")),
        )
        .subcommand(
            Command::new("account")
                .about("Manage accounts and account types")
                .subcommand(
                    Command::new("add")
                        .arg(Arg::new("name").long("name").required(true))
                        .arg(Arg::new("type").long("type").value_name("ACCOUNT_TYPE"))
                        .arg(
                            Arg::new("system")
                                .long("system")
                                .action(ArgAction::SetTrue)
                                .help("Internal pass-through account (VAT forced to 0)"),
                        )
                        .arg(Arg::new("remarks").long("remarks")),
                )
                .subcommand(Command::new("list"))
                .subcommand(
                    Command::new("type-add")
                        .arg(Arg::new("name").long("name").required(true))
                        .arg(
                            Arg::new("class")
                                .long("class")
                                .value_parser(["income", "expense", "neutral"])
                                .help("Flow class; guessed from the name when omitted"),
                        ),
                )
                .subcommand(Command::new("types")),
        )
        .subcommand(
            Command::new("tx")
                .about("Record and list transactions")
                .subcommand(
                    Command::new("add")
                        .arg(project_arg(true))
                        .arg(Arg::new("date").long("date").value_name("YYYY-MM-DD"))
                        .arg(Arg::new("amount").long("amount").required(true))
                        .arg(Arg::new("from").long("from").value_name("ACCOUNT"))
                        .arg(Arg::new("to").long("to").value_name("ACCOUNT"))
                        .arg(
                            Arg::new("type")
                                .long("type")
                                .value_parser(["income", "expense"]),
                        )
                        .arg(
                            Arg::new("status")
                                .long("status")
                                .value_parser(value_parser!(i64))
                                .default_value("1")
                                .help("1 = executed, 2 = planned"),
                        )
                        .arg(Arg::new("phase").long("phase").value_parser(value_parser!(i64)))
                        .arg(
                            Arg::new("budget_item")
                                .long("budget-item")
                                .value_parser(value_parser!(i64)),
                        )
                        .arg(Arg::new("category").long("category"))
                        .arg(Arg::new("vat").long("vat"))
                        .arg(Arg::new("remarks").long("remarks")),
                )
                .subcommand(json_args(
                    Command::new("list")
                        .arg(project_arg(false))
                        .arg(Arg::new("month").long("month").value_name("YYYY-MM"))
                        .arg(
                            Arg::new("limit")
                                .long("limit")
                                .value_parser(value_parser!(usize)),
                        ),
                )),
        )
        .subcommand(
            Command::new("budget")
                .about("Budget categories and budget plans")
                .subcommand(
                    Command::new("add")
                        .arg(project_arg(true))
                        .arg(Arg::new("name").long("name").required(true))
                        .arg(Arg::new("planned").long("planned").default_value("0"))
                        .arg(
                            Arg::new("parent")
                                .long("parent")
                                .value_parser(value_parser!(i64))
                                .help("Id of the phase this item belongs to"),
                        ),
                )
                .subcommand(
                    Command::new("set")
                        .arg(
                            Arg::new("id")
                                .long("id")
                                .required(true)
                                .value_parser(value_parser!(i64)),
                        )
                        .arg(Arg::new("planned").long("planned").required(true)),
                )
                .subcommand(Command::new("list").arg(project_arg(true)))
                .subcommand(
                    Command::new("plan-add")
                        .arg(
                            Arg::new("category")
                                .long("category")
                                .required(true)
                                .value_parser(value_parser!(i64)),
                        )
                        .arg(Arg::new("date").long("date").value_name("YYYY-MM-DD"))
                        .arg(Arg::new("amount").long("amount").required(true))
                        .arg(Arg::new("description").long("description")),
                )
                .subcommand(Command::new("plans").arg(project_arg(true))),
        )
        .subcommand(
            Command::new("apartment")
                .about("Apartments for sale")
                .subcommand(
                    Command::new("add")
                        .arg(project_arg(true))
                        .arg(Arg::new("customer").long("customer").value_name("ACCOUNT"))
                        .arg(Arg::new("floor").long("floor"))
                        .arg(Arg::new("unit").long("unit"))
                        .arg(Arg::new("price").long("price"))
                        .arg(Arg::new("remarks").long("remarks")),
                )
                .subcommand(Command::new("list").arg(project_arg(true))),
        )
        .subcommand(
            Command::new("payment")
                .about("Customer payment plans")
                .subcommand(
                    Command::new("add")
                        .arg(project_arg(true))
                        .arg(Arg::new("phase").long("phase").value_parser(value_parser!(i64)))
                        .arg(
                            Arg::new("apartment")
                                .long("apartment")
                                .value_parser(value_parser!(i64)),
                        )
                        .arg(Arg::new("date").long("date").value_name("YYYY-MM-DD"))
                        .arg(Arg::new("value").long("value").required(true))
                        .arg(Arg::new("remarks").long("remarks")),
                )
                .subcommand(Command::new("list").arg(project_arg(true))),
        )
        .subcommand(
            Command::new("report")
                .about("Cash-flow, budget and portfolio reports")
                .subcommand(json_args(
                    Command::new("forecast")
                        .arg(project_arg(false))
                        .arg(as_of_arg()),
                ))
                .subcommand(json_args(Command::new("budget").arg(project_arg(true))))
                .subcommand(json_args(Command::new("portfolio").arg(as_of_arg()))),
        )
        .subcommand(
            Command::new("export")
                .about("Write reports to CSV or JSON")
                .subcommand(export_format_args(
                    Command::new("forecast")
                        .arg(project_arg(false))
                        .arg(as_of_arg()),
                ))
                .subcommand(export_format_args(
                    Command::new("budget").arg(project_arg(true)),
                )),
        )
        .subcommand(Command::new("doctor").about("List records the reports will skip"))
}
