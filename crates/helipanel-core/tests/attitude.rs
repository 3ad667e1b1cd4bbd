use helipanel_core::gauge::attitude::AttitudeGeometry;
use helipanel_core::gauge::{render_attitude_sphere, AttitudeSpec};
use helipanel_core::render::{DrawCommand, Palette, Point};

const EPS: f64 = 1e-9;

fn center() -> Point {
    Point::new(600.0, 250.0)
}

#[test]
fn test_level_attitude_bisects_viewport() {
    let geom = AttitudeGeometry::new(0.0, 0.0, center(), 300.0, &AttitudeSpec::default());
    assert_eq!(geom.horizon_offset, 0.0);
    let [left, right] = geom.horizon;
    assert!((left.y - 250.0).abs() < EPS);
    assert!((right.y - 250.0).abs() < EPS);
    // symmetric about the center, no rotation
    assert!((left.x + right.x - 1200.0).abs() < EPS);
    // sky above, ground below
    assert!(geom.sky.iter().all(|p| p.y <= 250.0 + EPS));
    assert!(geom.ground.iter().all(|p| p.y >= 250.0 - EPS));
}

#[test]
fn test_pitch_offset_uses_pixels_per_degree() {
    let spec = AttitudeSpec::default();
    let geom = AttitudeGeometry::new(0.0, (-5.0f64).to_radians(), center(), 300.0, &spec);
    assert!((geom.horizon_offset + 10.0).abs() < EPS);

    let steep = AttitudeSpec {
        pixels_per_degree: 3.0,
        ..AttitudeSpec::default()
    };
    let geom = AttitudeGeometry::new(0.0, 10f64.to_radians(), center(), 300.0, &steep);
    assert!((geom.horizon_offset - 30.0).abs() < EPS);
}

#[test]
fn test_ladder_stays_aligned_with_horizon_at_any_roll() {
    let spec = AttitudeSpec::default();
    for roll in [-45.0f64, -10.0, 0.0, 20.0, 60.0] {
        let geom = AttitudeGeometry::new(roll.to_radians(), 4f64.to_radians(), center(), 300.0, &spec);
        let y = geom.rung_y(10.0);
        let a = geom.project(-15.0, y);
        let b = geom.project(15.0, y);
        let rung_tilt = (a.y - b.y).atan2(b.x - a.x).to_degrees();
        let [l, r] = geom.horizon;
        let horizon_tilt = (l.y - r.y).atan2(r.x - l.x).to_degrees();
        assert!((rung_tilt - horizon_tilt).abs() < 1e-6, "roll {roll}");
        assert!((rung_tilt - roll).abs() < 1e-6, "roll {roll}");
    }
}

#[test]
fn test_world_is_clipped_to_viewport() {
    let cmds = render_attitude_sphere(0.2, 0.1, &AttitudeSpec::default(), center(), 300.0, &Palette::default()).unwrap();
    match &cmds[0] {
        DrawCommand::ClipCircle { center: c, radius, commands } => {
            assert_eq!(*c, center());
            assert_eq!(*radius, 150.0);
            assert!(matches!(commands[0], DrawCommand::Polygon { .. }));
        }
        other => panic!("expected clip group, got {:?}", other),
    }
}

#[test]
fn test_aircraft_symbol_never_moves() {
    let palette = Palette::default();
    let spec = AttitudeSpec::default();
    let fixed = |roll: f64, pitch: f64| -> Vec<DrawCommand> {
        render_attitude_sphere(roll, pitch, &spec, center(), 300.0, &palette)
            .unwrap()
            .into_iter()
            .filter(|c| matches!(c, DrawCommand::Rect { .. }) || matches!(c, DrawCommand::Circle { fill: Some(f), .. } if *f == palette.aircraft_dot))
            .collect()
    };
    assert_eq!(fixed(0.0, 0.0), fixed(0.5, -0.3));
    assert_eq!(fixed(0.0, 0.0).len(), 3);
}

#[test]
fn test_too_small_viewport_rejected() {
    let result = render_attitude_sphere(0.0, 0.0, &AttitudeSpec::default(), center(), 20.0, &Palette::default());
    assert!(result.is_err());
}
