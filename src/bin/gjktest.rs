use glam::DVec3;
use gjk_proximity::{Gjk, PointSet, Segment};

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .init();

    // let t1 = Segment::from_endpoints(-DVec3::X, DVec3::X).unwrap();
    let t1 = DVec3::ZERO;
    let t2 = Segment::from_endpoints(DVec3::new(0.0, 1.0, -1.0), DVec3::new(0.0, 1.0, 1.0))
        .expect("segment endpoints are distinct");

    let mut gjk = Gjk::new();

    let dist = gjk.distance(&t1, &t2);
    println!("distance: {dist}");

    let tile = PointSet::new([
        DVec3::new(-1.0, 0.5, -1.0),
        DVec3::new(1.0, 0.5, -1.0),
        DVec3::new(-1.0, 0.5, 1.0),
        DVec3::new(1.0, 0.5, 1.0),
    ])
    .expect("tile has corners");

    let hit = gjk.intersect(&t2, &tile, None);
    println!("segment hits tile: {hit}");
    println!("distance to tile: {}", gjk.distance(&t1, &tile));
}
