use std::{fs::File, process::exit};

use clap::{Arg, Command};
use serde_yaml::to_writer;

use sched_horizon_map::{DashboardCfg, Error};

fn run(fname: Option<&str>) -> Result<(), Error> {
    let cfg = DashboardCfg::default();
    match fname {
        Some(fname) => {
            to_writer(File::create(fname)?, &cfg)?;
            log::info!("wrote {}", fname);
        }
        None => to_writer(std::io::stdout(), &cfg)?,
    }
    Ok(())
}

pub fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let matches = Command::new("default_cfg")
        .arg(
            Arg::new("outfile")
                .short('o')
                .long("out")
                .takes_value(true)
                .value_name("cfg yaml")
                .required(false),
        )
        .get_matches();

    if let Err(e) = run(matches.value_of("outfile")) {
        log::error!("{}", e);
        exit(1);
    }
}
