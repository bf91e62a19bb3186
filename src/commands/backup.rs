// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};

use crate::backup;
use crate::db::KvStore;
use crate::store::Store;
use crate::utils::arg_str;

pub fn handle<S: KvStore>(store: &mut Store<S>, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("export", sub)) => {
            let out = arg_str(sub, "out")?;
            let blob = backup::export(store.state())?;
            std::fs::write(out, blob).with_context(|| format!("Cannot write {}", out))?;
            println!("Backup written to {}", out);
        }
        Some(("import", sub)) => {
            let path = arg_str(sub, "path")?;
            let blob =
                std::fs::read_to_string(path).with_context(|| format!("Cannot read {}", path))?;
            backup::import(store, &blob).context("Backup rejected; nothing was changed")?;
            let state = store.state();
            println!(
                "Restored {} transactions and {} accounts from {}",
                state.transactions.len(),
                state.accounts.len(),
                path
            );
        }
        _ => {}
    }
    Ok(())
}
