mod btree;
mod byte_source;
mod catalog;
mod error;
mod page;
mod query;
mod record;
mod serial_type;
mod sql;
mod varint;

use anyhow::{bail, Result};
use env_logger::Env;
use log::info;

use query::{Database, QueryOutput};

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("debug")).init();

    let args = std::env::args().collect::<Vec<_>>();
    match args.len() {
        0 | 1 => bail!("Missing <database path> and <command>"),
        2 => bail!("Missing <command>"),
        _ => {}
    }

    let db_path = &args[1];
    let command = args[2..].join(" ");

    info!("opening {db_path}");
    let database = Database::open(db_path)?;

    match command.as_str() {
        ".dbinfo" => {
            println!("database page size: {}", database.page_size());
            println!("number of pages {}", database.page_count());
            println!("number of tables: {}", database.schema_entry_count());
        }
        ".tables" => {
            println!("{}", database.table_names().join(" "));
        }
        other => {
            if is_select(other) {
                match database.run_sql(other) {
                    Ok(QueryOutput::Count(n)) => println!("{n}"),
                    Ok(QueryOutput::Rows(rows)) => {
                        for row in rows {
                            println!("{}", row.join("|"));
                        }
                    }
                    Err(e) => eprintln!("{e}"),
                }
            } else {
                println!("Invalid command: {other}");
            }
        }
    }

    Ok(())
}

fn is_select(command: &str) -> bool {
    command
        .trim_start()
        .get(0..6)
        .map(|prefix| prefix.eq_ignore_ascii_case("select"))
        .unwrap_or(false)
}
