use rand::{rngs::StdRng, Rng, SeedableRng};

use sched_horizon_map::{aggregate, AggregateError, Observation, SENTINEL};

fn random_observations(rng: &mut StdRng, npix: i64, n: usize) -> Vec<Observation> {
    (0..n)
        .map(|_| {
            let pixel = rng.gen_range(0..npix);
            if rng.gen_bool(0.2) {
                Observation::infeasible(pixel)
            } else {
                Observation::new(pixel, rng.gen_range(-10.0_f64..10.0))
            }
        })
        .collect()
}

#[test]
fn completeness() {
    let mut rng = StdRng::seed_from_u64(1);
    for nside in [1_i64, 2, 4, 8, 16] {
        let npix = 12 * nside * nside;
        for n in [0, 1, 7, 500] {
            let obs = random_observations(&mut rng, npix, n);
            assert_eq!(aggregate(nside, &obs).unwrap().len(), npix as usize);
        }
    }
}

#[test]
fn unobserved_pixels_are_sentinel() {
    let mut rng = StdRng::seed_from_u64(2);
    let obs = random_observations(&mut rng, 192, 40);
    let field = aggregate(4, &obs).unwrap();
    for (i, &x) in field.values().iter().enumerate() {
        if !obs.iter().any(|o| o.pixel == i as i64) {
            assert_eq!(x, SENTINEL);
        }
    }
}

#[test]
fn last_observation_decides_each_pixel() {
    let mut rng = StdRng::seed_from_u64(3);
    let obs = random_observations(&mut rng, 48, 200);
    let field = aggregate(2, &obs).unwrap();
    for (i, &x) in field.values().iter().enumerate() {
        let expected = obs
            .iter()
            .rev()
            .find(|o| o.pixel == i as i64)
            .map_or(SENTINEL, |o| Option::<f64>::from(o.reward).unwrap_or(SENTINEL));
        assert_eq!(x.to_bits(), expected.to_bits());
    }
}

#[test]
fn infeasible_overwrites_finite() {
    let obs = [Observation::new(5, 2.0), Observation::infeasible(5)];
    assert_eq!(aggregate(1, &obs).unwrap().values()[5], SENTINEL);
}

#[test]
fn last_write_wins() {
    let obs = [Observation::new(3, 5.0), Observation::new(3, 7.0)];
    assert_eq!(aggregate(1, &obs).unwrap().values()[3], 7.0);
}

#[test]
fn out_of_range_rejected() {
    assert_eq!(
        aggregate(1, &[Observation::new(12, 3.0)]),
        Err(AggregateError::PixelIndexOutOfRange { index: 12, npix: 12 })
    );
}

#[test]
fn out_of_range_anywhere_fails_whole_call() {
    let obs = [
        Observation::new(0, 1.0),
        Observation::new(1, 2.0),
        Observation::new(48, 3.0),
    ];
    assert!(matches!(
        aggregate(2, &obs),
        Err(AggregateError::PixelIndexOutOfRange { index: 48, npix: 48 })
    ));
}

#[test]
fn invalid_resolution_rejected() {
    assert_eq!(
        aggregate(0, &[]),
        Err(AggregateError::InvalidResolution { nside: 0 })
    );
    assert_eq!(
        aggregate(-3, &[]),
        Err(AggregateError::InvalidResolution { nside: -3 })
    );
}

#[test]
fn repeated_calls_are_identical() {
    let mut rng = StdRng::seed_from_u64(4);
    let obs = random_observations(&mut rng, 768, 300);
    let a = aggregate(8, &obs).unwrap();
    let b = aggregate(8, &obs).unwrap();
    let bits = |v: &[f64]| v.iter().map(|x| x.to_bits()).collect::<Vec<_>>();
    assert_eq!(bits(a.values()), bits(b.values()));
}

#[test]
fn all_infeasible() {
    let obs: Vec<_> = (0..12).map(Observation::infeasible).collect();
    let field = aggregate(1, &obs).unwrap();
    assert_eq!(field.len(), 12);
    assert!(field.values().iter().all(|&x| x == SENTINEL));
}

#[test]
fn empty_input() {
    let field = aggregate(2, &[]).unwrap();
    assert_eq!(field.len(), 48);
    assert!(field.values().iter().all(|&x| x == SENTINEL));
}

#[test]
fn concurrent_callers_do_not_interfere() {
    let obs: Vec<_> = (0..48).map(|i| Observation::new(i, i as f64)).collect();
    let expected = aggregate(2, &obs).unwrap();
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let obs = obs.clone();
            std::thread::spawn(move || aggregate(2, &obs).unwrap())
        })
        .collect();
    for h in handles {
        assert_eq!(h.join().unwrap(), expected);
    }
}
