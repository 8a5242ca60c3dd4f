pub mod conditions;
pub mod config;
pub mod error;
pub mod field;
pub mod horizon;
pub mod snapshot;
pub mod tessellation;

pub use crate::{
    conditions::{Conditions, Site},
    config::DashboardCfg,
    error::{AggregateError, Error},
    field::{aggregate, Field, Observation, Reward, SENTINEL},
    horizon::{FieldRenderer, HorizonGrid, HorizonMap, HorizonProjector},
    snapshot::{BasisFunctionSummary, MapSelection, MapTarget, RewardSource, SchedulerSnapshot, SurveyKey},
    tessellation::Tessellation,
};

/// Pull the selected map from `source` and aggregate it at the source's resolution.
pub fn compute_field<S: RewardSource>(source: &S, selection: &MapSelection) -> Result<Field, Error> {
    let observations = source.observations(selection)?;
    let field = aggregate(source.nside(), &observations)?;
    log::info!(
        "aggregated {} observations into {} pixels, {} feasible",
        observations.len(),
        field.len(),
        field.feasible_pixels()
    );
    Ok(field)
}

/// As [`compute_field`], then resampled to `nside` when one is given.
pub fn compute_field_at<S: RewardSource>(
    source: &S,
    selection: &MapSelection,
    nside: Option<i64>,
) -> Result<Field, Error> {
    let field = compute_field(source, selection)?;
    match nside {
        Some(n) if n != source.nside() => {
            log::info!("resampling nside={} to nside={}", source.nside(), n);
            Ok(field.regrid(n)?)
        }
        _ => Ok(field),
    }
}

pub fn render_selection<S, R>(
    source: &S,
    selection: &MapSelection,
    renderer: &R,
) -> Result<R::Output, Error>
where
    S: RewardSource,
    R: FieldRenderer,
{
    let field = compute_field(source, selection)?;
    renderer.render(&field)
}
