use std::process::exit;

use clap::{Arg, Command};

use sched_horizon_map::{aggregate, Error, SchedulerSnapshot};

fn fmt_max(x: Option<f64>) -> String {
    x.map_or("-".to_string(), |m| m.to_string())
}

fn run(fname: &str) -> Result<(), Error> {
    let snapshot = SchedulerSnapshot::from_file(fname)?;
    println!("nside {}", snapshot.nside);
    for tier in snapshot.tiers() {
        println!("tier {}", tier);
        for (i, survey) in snapshot.surveys_in_tier(tier)?.into_iter().enumerate() {
            let reward: Option<f64> = survey.reward.into();
            println!(
                "  survey {} {} reward={} feasible={}",
                i,
                survey.name,
                fmt_max(reward),
                survey.is_feasible()
            );
            for (name, obs) in survey.maps.iter() {
                let field = aggregate(snapshot.nside, obs)?;
                println!(
                    "    map {} max={} area_deg2={:.1}",
                    name,
                    fmt_max(field.max_value()),
                    field.feasible_area_deg2()
                );
            }
            let rows = survey.basis_function_summaries(snapshot.nside)?;
            for (j, (bf, row)) in survey.basis_functions.iter().zip(rows.iter()).enumerate() {
                println!(
                    "    basis_function {} {} class={} feasible={} weight={} max_basis_reward={} basis_area={:.1} max_accum_reward={} accum_area={:.1}",
                    j,
                    bf.name,
                    bf.class,
                    bf.feasible,
                    bf.weight,
                    fmt_max(row.max_basis_reward),
                    row.basis_area,
                    fmt_max(row.max_accum_reward),
                    row.accum_area
                );
            }
        }
    }
    Ok(())
}

pub fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let matches = Command::new("list_maps")
        .arg(
            Arg::new("state")
                .short('s')
                .long("state")
                .takes_value(true)
                .value_name("snapshot yaml")
                .required(true),
        )
        .get_matches();

    if let Err(e) = run(matches.value_of("state").unwrap_or_default()) {
        log::error!("{}", e);
        exit(1);
    }
}
