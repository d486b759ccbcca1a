/*
 * Copyright 2019 DTAI Research Group - KU Leuven.
 * License: Apache License 2.0
 * Author: Laurens Devos
*/

use std::env;
use std::fs::File;
use std::io;
use std::path::Path;
use std::process;

use callcrm::config::Config;

/// Write the documentation of all config fields to the given path, or to stdout.
pub fn main() {
    let args = env::args().collect::<Vec<String>>();
    let res = match args.get(1) {
        Some(path) => File::create(Path::new(path))
            .map_err(callcrm::Error::from)
            .and_then(|file| Config::write_doc_csv(file)),
        None => Config::write_doc_csv(io::stdout()),
    };

    if let Err(err) = res {
        eprintln!("could not write config csv: {}", err);
        process::exit(1);
    }
}
