// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, value_parser};

fn json_flags(cmd: Command) -> Command {
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

fn id_arg() -> Arg {
    Arg::new("id")
        .long("id")
        .required(true)
        .value_parser(value_parser!(i64))
}

fn text(name: &'static str) -> Arg {
    Arg::new(name).long(name)
}

fn flag(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name)
        .long(name)
        .action(ArgAction::SetTrue)
        .help(help)
}

pub fn build_cli() -> Command {
    Command::new("meiledger")
        .version(clap::crate_version!())
        .about("Business ledger with household bills and MEI income-limit tracking")
        .arg(
            Arg::new("db")
                .long("db")
                .global(true)
                .help("SQLite file to use (overridden by MEILEDGER_DB)"),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Log debug output to stderr"),
        )
        .subcommand(Command::new("init").about("Create the database"))
        .subcommand(
            Command::new("account")
                .about("Manage accounts")
                .subcommand(
                    Command::new("add")
                        .arg(text("name").required(true))
                        .arg(
                            text("type")
                                .required(true)
                                .value_parser(["mei", "cash"]),
                        )
                        .arg(text("initial").help("Opening balance"))
                        .arg(text("cnpj"))
                        .arg(text("description")),
                )
                .subcommand(json_flags(Command::new("list")))
                .subcommand(
                    Command::new("edit")
                        .arg(id_arg())
                        .arg(text("name"))
                        .arg(text("type").value_parser(["mei", "cash"]))
                        .arg(text("initial"))
                        .arg(text("cnpj"))
                        .arg(text("description")),
                )
                .subcommand(Command::new("rm").arg(id_arg())),
        )
        .subcommand(
            Command::new("category")
                .about("Manage category vocabularies")
                .subcommand(
                    Command::new("add")
                        .arg(text("name").required(true))
                        .arg(flag("home", "Household vocabulary")),
                )
                .subcommand(json_flags(
                    Command::new("list").arg(flag("home", "Household vocabulary")),
                )),
        )
        .subcommand(
            Command::new("tx")
                .about("Record and list transactions")
                .subcommand(
                    Command::new("add")
                        .arg(
                            text("type")
                                .required(true)
                                .value_parser(["income", "expense"]),
                        )
                        .arg(text("amount").required(true))
                        .arg(text("date").help("YYYY-MM-DD, defaults to today"))
                        .arg(text("account").help("Account name"))
                        .arg(text("category"))
                        .arg(text("description"))
                        .arg(flag("home", "Household expense"))
                        .arg(flag("paid", "Already paid (household only)")),
                )
                .subcommand(json_flags(
                    Command::new("list")
                        .arg(text("month").help("YYYY-MM"))
                        .arg(text("from").help("YYYY-MM-DD"))
                        .arg(text("to").help("YYYY-MM-DD"))
                        .arg(flag("home", "Household rows only"))
                        .arg(text("limit").value_parser(value_parser!(usize))),
                ))
                .subcommand(
                    Command::new("edit")
                        .arg(id_arg())
                        .arg(text("amount"))
                        .arg(text("date"))
                        .arg(text("account"))
                        .arg(text("category"))
                        .arg(text("description")),
                )
                .subcommand(Command::new("rm").arg(id_arg()))
                .subcommand(
                    Command::new("pay")
                        .arg(id_arg())
                        .arg(flag("undo", "Mark as pending again")),
                ),
        )
        .subcommand(
            Command::new("recurring")
                .about("Monthly household bills")
                .subcommand(
                    Command::new("add")
                        .arg(text("title").required(true))
                        .arg(text("category").required(true))
                        .arg(text("amount").default_value("0"))
                        .arg(
                            text("day")
                                .required(true)
                                .value_parser(value_parser!(u32).range(1..=31)),
                        )
                        .arg(flag("reminder", "Variable bill, amount entered monthly")),
                )
                .subcommand(json_flags(Command::new("list")))
                .subcommand(Command::new("rm").arg(id_arg()))
                .subcommand(Command::new("sync").arg(text("month").help("YYYY-MM")))
                .subcommand(
                    Command::new("resolve")
                        .arg(id_arg())
                        .arg(text("amount").required(true)),
                ),
        )
        .subcommand(
            Command::new("installment")
                .about("Split a purchase across months")
                .subcommand(
                    Command::new("add")
                        .arg(text("category").required(true))
                        .arg(text("amount").required(true))
                        .arg(
                            text("count")
                                .required(true)
                                .value_parser(value_parser!(u32).range(1..)),
                        )
                        .arg(text("start").help("YYYY-MM-DD, defaults to today"))
                        .arg(text("description"))
                        .arg(flag("per-installment", "Amount is charged every month"))
                        .arg(flag("paid", "First installment already paid")),
                ),
        )
        .subcommand(
            Command::new("report")
                .about("Balances, limits and breakdowns")
                .subcommand(json_flags(
                    Command::new("limits").arg(text("account").help("Account name")),
                ))
                .subcommand(json_flags(
                    Command::new("categories")
                        .arg(text("from"))
                        .arg(text("to"))
                        .arg(flag("home", "Household expenses instead of business")),
                ))
                .subcommand(json_flags(Command::new("summary")))
                .subcommand(json_flags(
                    Command::new("household").arg(text("month").help("YYYY-MM")),
                ))
                .subcommand(
                    Command::new("window")
                        .arg(
                            text("filter")
                                .required(true)
                                .value_parser(["weekly", "monthly", "yearly", "custom"]),
                        )
                        .arg(text("from"))
                        .arg(text("to")),
                ),
        )
        .subcommand(
            Command::new("backup")
                .about("Snapshot the whole ledger")
                .subcommand(Command::new("export").arg(text("out").required(true)))
                .subcommand(Command::new("import").arg(text("path").required(true))),
        )
        .subcommand(
            Command::new("export")
                .about("Export transactions")
                .subcommand(
                    Command::new("transactions")
                        .arg(text("format").default_value("csv"))
                        .arg(text("out").required(true)),
                ),
        )
}
