/*
 * Copyright 2019 DTAI Research Group - KU Leuven.
 * License: Apache License 2.0
 * Author: Laurens Devos
*/

use std::env;
use std::io;
use std::process;

use log::{error, info};

use callcrm::Result;
use callcrm::config::Config;
use callcrm::data::Data;
use callcrm::record::read_records_from_path;
use callcrm::report::train_and_report;
use callcrm::repl::Repl;

pub fn main() {
    pretty_env_logger::init();

    let args: Vec<String> = env::args().collect();
    match run(&args[1..]) {
        Ok(npredictions) => info!("Done, {} predictions", npredictions),
        Err(err) => {
            error!("Failure: {}", err);
            eprintln!("Error: {}", err);
            process::exit(1);
        }
    }
}

fn run(args: &[String]) -> Result<usize> {
    let config = Config::parse(args.iter().map(|x| x.as_str()))?;

    let records = read_records_from_path(&config, &config.data_path)?;
    let data = Data::from_records(&records);
    let (model, _) = train_and_report(&config, &data, io::stdout())?;

    let stdin = io::stdin();
    let stdout = io::stdout();
    let repl = Repl::new(&model, stdin.lock(), stdout.lock());
    repl.run()
}
