use super::*;

fn solid(w: u32, h: u32) -> Part {
    Part::new(RgbaImage::from_pixel(w, h, image::Rgba([1, 2, 3, 255])))
}

#[test]
fn from_pairs_requires_every_role() {
    let pairs: Vec<_> = Role::ALL
        .iter()
        .filter(|r| **r != Role::Bottom)
        .map(|r| (*r, solid(1, 1)))
        .collect();
    let err = PartSet::from_pairs(pairs).unwrap_err();
    assert!(err.to_string().contains("missing role 'be'"));
}

#[test]
fn from_pairs_rejects_duplicates() {
    let mut pairs: Vec<_> = Role::ALL.iter().map(|r| (*r, solid(1, 1))).collect();
    pairs.push((Role::Top, solid(2, 2)));
    let err = PartSet::from_pairs(pairs).unwrap_err();
    assert!(err.to_string().contains("duplicate role 'te'"));
}

#[test]
fn resolution_comes_from_center_only() {
    let set = PartSet::from_pairs(Role::ALL.iter().map(|r| {
        let p = solid(1, 1);
        let p = match r {
            Role::Reference => p.with_resolution(Resolution::new(300.0, 300.0)),
            _ => p,
        };
        (*r, p)
    }))
    .unwrap();
    assert_eq!(set.resolution(), Resolution::default());

    let set = PartSet::from_pairs(Role::ALL.iter().map(|r| {
        let p = solid(1, 1);
        let p = match r {
            Role::Center => p.with_resolution(Resolution::new(150.0, 150.0)),
            _ => p,
        };
        (*r, p)
    }))
    .unwrap();
    assert_eq!(set.resolution(), Resolution::new(150.0, 150.0));
}

#[test]
fn sizes_reflect_pixels() {
    let set = PartSet::new(RoleMap::from_fn(|r| solid(r.suffix().len() as u32, 3)));
    assert_eq!(set.sizes()[Role::Left], Size::new(2, 3));
    assert_eq!(set[Role::Center].size(), Size::new(1, 3));
}
