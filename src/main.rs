use std::{
    fs::File,
    io::{stdout, BufWriter, Write},
    process::exit,
};

use clap::{Arg, ArgMatches, Command};

use sched_horizon_map::{
    conditions::{mjd_from_datetime, parse_datetime},
    compute_field_at, Conditions, DashboardCfg, Error, FieldRenderer, HorizonProjector, MapSelection,
    MapTarget, SchedulerSnapshot, SurveyKey,
};

fn parse_arg<T: std::str::FromStr>(matches: &ArgMatches, name: &str) -> Result<Option<T>, Error> {
    matches
        .value_of(name)
        .map(|s| {
            s.parse::<T>()
                .map_err(|_| Error::InvalidConfig(format!("cannot parse --{} '{}'", name, s)))
        })
        .transpose()
}

fn run(matches: &ArgMatches) -> Result<(), Error> {
    let cfg = match matches.value_of("cfg") {
        Some(fname) => DashboardCfg::from_file(fname)?,
        None => DashboardCfg::default(),
    };
    let snapshot = SchedulerSnapshot::from_file(matches.value_of("state").unwrap_or_default())?;
    let nside = parse_arg::<i64>(matches, "nside")?
        .map(|n| cfg.check_nside(n))
        .transpose()?;

    let survey = SurveyKey {
        tier: parse_arg(matches, "tier")?.unwrap_or(0),
        index: parse_arg(matches, "survey")?.unwrap_or(0),
    };
    let target = match (parse_arg::<usize>(matches, "basis_function")?, matches.value_of("map")) {
        (Some(bf), _) => MapTarget::BasisFunction(bf),
        (None, Some(name)) => MapTarget::Map(name.to_string()),
        (None, None) => {
            let s = snapshot.survey(&survey)?;
            let name = if s.maps.contains_key(&cfg.default_map) {
                cfg.default_map.as_str()
            } else {
                s.default_map().ok_or_else(|| Error::UnknownMap {
                    survey: s.name.clone(),
                    map: cfg.default_map.clone(),
                })?
            };
            MapTarget::Map(name.to_string())
        }
    };
    let selection = MapSelection { survey, target };
    log::info!("{}", selection.title(&snapshot)?.replace('\n', " | "));

    let mjd = match matches.value_of("datetime") {
        Some(s) => mjd_from_datetime(&parse_datetime(s)?),
        None => snapshot.mjd.ok_or_else(|| {
            Error::InvalidConfig("snapshot has no mjd, pass --datetime".to_string())
        })?,
    };
    let projector = HorizonProjector::new(Conditions::new(cfg.site.clone(), mjd), cfg.horizon.clone());
    let field = compute_field_at(&snapshot, &selection, nside)?;
    let hmap = projector.render(&field)?;
    log::info!(
        "horizon map {}x{}, {:.1}% feasible",
        hmap.alt_deg.len(),
        hmap.az_deg.len(),
        100.0 * hmap.feasible_fraction()
    );

    match matches.value_of("outfile") {
        Some(fname) => {
            let mut outfile = BufWriter::new(File::create(fname)?);
            hmap.write_text(&mut outfile)?;
            outfile.flush()?;
        }
        None => {
            let out = stdout();
            let mut lock = out.lock();
            hmap.write_text(&mut lock)?;
            lock.flush()?;
        }
    }
    Ok(())
}

pub fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let matches = Command::new("sched_horizon_map")
        .about("project a scheduler reward map onto the local horizon")
        .arg(
            Arg::new("state")
                .short('s')
                .long("state")
                .takes_value(true)
                .value_name("snapshot yaml")
                .required(true)
                .help("scheduler reward snapshot"),
        )
        .arg(
            Arg::new("cfg")
                .short('c')
                .long("cfg")
                .takes_value(true)
                .value_name("cfg yaml")
                .required(false)
                .help("dashboard config"),
        )
        .arg(
            Arg::new("tier")
                .short('t')
                .long("tier")
                .takes_value(true)
                .value_name("tier")
                .help("tier, default 0"),
        )
        .arg(
            Arg::new("survey")
                .short('u')
                .long("survey")
                .takes_value(true)
                .value_name("index")
                .help("survey index within the tier, default 0"),
        )
        .arg(
            Arg::new("map")
                .short('m')
                .long("map")
                .takes_value(true)
                .value_name("name")
                .help("map name, default from cfg"),
        )
        .arg(
            Arg::new("basis_function")
                .short('b')
                .long("basis-function")
                .takes_value(true)
                .value_name("index")
                .conflicts_with("map")
                .help("basis function index"),
        )
        .arg(
            Arg::new("nside")
                .short('n')
                .long("nside")
                .takes_value(true)
                .value_name("nside")
                .help("display resolution, one of cfg nside_choices, default snapshot nside"),
        )
        .arg(
            Arg::new("datetime")
                .short('d')
                .long("datetime")
                .takes_value(true)
                .value_name("rfc3339")
                .help("e.g. 2023-08-01T23:00:00-04:00, default snapshot mjd"),
        )
        .arg(
            Arg::new("outfile")
                .short('o')
                .long("out")
                .takes_value(true)
                .value_name("outfile")
                .help("alt az value text file, stdout if absent"),
        )
        .get_matches();

    if let Err(e) = run(&matches) {
        log::error!("{}", e);
        exit(1);
    }
}
