// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::db::KvStore;
use crate::models::CategoryList;
use crate::store::Store;
use crate::utils::{arg_str, maybe_print_json, pretty_table};
use anyhow::Result;

pub fn handle<S: KvStore>(store: &mut Store<S>, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let name = arg_str(sub, "name")?;
            let list = list_for(sub);
            if store.add_category(list, name)? {
                println!("Added category '{}'", name);
            } else {
                println!("Category '{}' already exists", name);
            }
        }
        Some(("list", sub)) => {
            let names = store.state().categories(list_for(sub));
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &names)? {
                let data = names.iter().map(|n| vec![n.clone()]).collect();
                println!("{}", pretty_table(&["Category"], data));
            }
        }
        _ => {}
    }
    Ok(())
}

fn list_for(sub: &clap::ArgMatches) -> CategoryList {
    if sub.get_flag("home") {
        CategoryList::Household
    } else {
        CategoryList::Business
    }
}
