use sched_horizon_map::{
    compute_field, compute_field_at, render_selection, Conditions, DashboardCfg, Error,
    HorizonGrid, HorizonProjector, MapSelection, SchedulerSnapshot, Site, SENTINEL,
};

fn snapshot() -> SchedulerSnapshot {
    // nside 2: every pixel of the reward map is feasible, the survey's
    // basis function is entirely infeasible.
    let reward: Vec<String> = (0..48).map(|i| format!("[{}, {}.0]", i, i % 5)).collect();
    let text = format!(
        r#"
nside: 2
mjd: 60200.0
surveys:
  - tier: 0
    name: blob
    reward: 4.0
    basis_functions:
      - name: M5Diff
        map: [[0, null], [1, null]]
    maps:
      reward: [{}]
  - tier: 1
    name: pairs
    reward: null
    maps:
      reward: [[47, .nan]]
"#,
        reward.join(", ")
    );
    SchedulerSnapshot::from_yaml_str(&text).unwrap()
}

fn projector() -> HorizonProjector {
    HorizonProjector::new(
        Conditions::new(Site::default(), 60200.0),
        HorizonGrid {
            alt_min_deg: 20.0,
            alt_step_deg: 5.0,
            az_step_deg: 15.0,
        },
    )
}

#[test]
fn feasible_map_renders_everywhere() {
    let s = snapshot();
    let hmap = render_selection(&s, &MapSelection::map(0, 0, "reward"), &projector()).unwrap();
    assert_eq!(hmap.values.dim(), (15, 24));
    assert_eq!(hmap.feasible_fraction(), 1.0);
    assert!(hmap.values.iter().all(|&x| (0.0..=4.0).contains(&x)));
}

#[test]
fn infeasible_survey_renders_sentinel_not_error() {
    let s = snapshot();
    let field = compute_field(&s, &MapSelection::map(1, 0, "reward")).unwrap();
    assert_eq!(field.len(), 48);
    assert_eq!(field.feasible_pixels(), 0);

    let hmap = render_selection(&s, &MapSelection::basis_function(0, 0, 0), &projector()).unwrap();
    assert!(hmap.values.iter().all(|&x| x == SENTINEL));
}

#[test]
fn selection_errors_surface() {
    let s = snapshot();
    assert!(matches!(
        compute_field(&s, &MapSelection::map(3, 0, "reward")),
        Err(Error::UnknownTier(3))
    ));
    assert!(matches!(
        compute_field(&s, &MapSelection::map(0, 0, "g_sky")),
        Err(Error::UnknownMap { .. })
    ));
}

#[test]
fn mismatched_resolution_is_reported() {
    let mut s = snapshot();
    s.nside = 1;
    assert!(matches!(
        compute_field(&s, &MapSelection::map(0, 0, "reward")),
        Err(Error::Aggregate(_))
    ));
}

#[test]
fn resampled_to_chosen_nside() {
    let s = snapshot();
    let sel = MapSelection::map(0, 0, "reward");
    let same = compute_field_at(&s, &sel, None).unwrap();
    assert_eq!(same, compute_field(&s, &sel).unwrap());

    let nside = DashboardCfg::default().check_nside(8).unwrap();
    let fine = compute_field_at(&s, &sel, Some(nside)).unwrap();
    assert_eq!(fine.len(), 768);
    assert_eq!(fine.feasible_pixels(), 768);
    assert_eq!(fine.max_value(), Some(4.0));
    assert!(DashboardCfg::default().check_nside(2).is_err());
}
