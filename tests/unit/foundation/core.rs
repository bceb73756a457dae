use super::*;

#[test]
fn suffixes_match_file_convention() {
    let suffixes: Vec<_> = Role::ALL.iter().map(|r| r.suffix()).collect();
    assert_eq!(suffixes, ["o", "r", "le", "be", "te", "re"]);
}

#[test]
fn layer_order_is_a_permutation_of_all_roles() {
    let mut a = Role::ALL.to_vec();
    let mut b = Role::LAYER_ORDER.to_vec();
    a.sort();
    b.sort();
    assert_eq!(a, b);
    assert_eq!(Role::LAYER_ORDER[0], Role::Top);
    assert_eq!(Role::LAYER_ORDER[5], Role::Reference);
}

#[test]
fn role_map_indexes_every_role() {
    let m = RoleMap::from_fn(|r| r.suffix().len());
    assert_eq!(m[Role::Center], 1);
    assert_eq!(m[Role::Bottom], 2);
    let pairs: Vec<_> = m.into_pairs().map(|(r, _)| r).collect();
    assert_eq!(pairs, Role::ALL.to_vec());
}

#[test]
fn role_map_try_from_fn_stops_on_error() {
    let mut seen = 0;
    let res: Result<RoleMap<()>, Role> = RoleMap::try_from_fn(|r| {
        seen += 1;
        if r == Role::Left { Err(r) } else { Ok(()) }
    });
    assert_eq!(res.unwrap_err(), Role::Left);
    assert_eq!(seen, 3);
}

#[test]
fn resolution_defaults_and_cm_conversion() {
    assert_eq!(Resolution::default(), Resolution::new(72.0, 72.0));
    let r = Resolution::from_dots_per_cm(100.0, 50.0);
    assert!((r.x - 254.0).abs() < 1e-9);
    assert!((r.y - 127.0).abs() < 1e-9);
}
