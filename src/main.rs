// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use meiledger::{Store, cli, commands, db};

fn main() -> Result<()> {
    let cli = cli::build_cli();
    let matches = cli.get_matches();

    let level = if matches.get_flag("verbose") {
        "debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(format!("meiledger={level}"))),
        )
        .with_writer(std::io::stderr)
        .init();

    let overridden = matches.get_one::<String>("db").map(String::as_str);
    let conn = db::open_or_init(overridden)?;
    let today = chrono::Local::now().date_naive();
    let mut store = Store::open(conn, today)?;

    match matches.subcommand() {
        Some(("init", _)) => {
            println!(
                "Database initialized at {}",
                db::db_path(overridden)?.display()
            );
        }
        Some(("account", sub)) => commands::accounts::handle(&mut store, sub, today)?,
        Some(("category", sub)) => commands::categories::handle(&mut store, sub)?,
        Some(("tx", sub)) => commands::transactions::handle(&mut store, sub, today)?,
        Some(("recurring", sub)) => commands::recurring::handle(&mut store, sub)?,
        Some(("installment", sub)) => commands::installments::handle(&mut store, sub, today)?,
        Some(("report", sub)) => commands::reports::handle(&mut store, sub, today)?,
        Some(("backup", sub)) => commands::backup::handle(&mut store, sub)?,
        Some(("export", sub)) => commands::exporter::handle(store.state(), sub)?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}
