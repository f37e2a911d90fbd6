use cgmath::Deg;
use harborview::camera::Projection;

#[test]
fn should_match_aspect_to_dimensions() {
    let mut projection = Projection::new(800, 600, Deg(75.0), 0.1, 1000.0);
    assert!((projection.aspect - 800.0 / 600.0).abs() < f32::EPSILON);

    for (width, height) in [(400, 300), (1, 1), (1920, 1080), (333, 777)] {
        projection.resize(width, height);
        assert!(
            (projection.aspect - width as f32 / height as f32).abs() < f32::EPSILON,
            "aspect must track {}x{}",
            width,
            height
        );
    }
}

#[test]
fn should_keep_ratio_across_proportional_resize() {
    // 800x600 and 400x300 share the same ratio; only the surface changes
    let mut projection = Projection::new(800, 600, Deg(75.0), 0.1, 1000.0);
    let before = projection.aspect;
    projection.resize(400, 300);
    assert_eq!(projection.aspect, before);
}

#[test]
fn should_not_drift_on_repeated_identical_resize() {
    let mut projection = Projection::new(1024, 768, Deg(75.0), 0.1, 1000.0);
    projection.resize(640, 480);
    let aspect = projection.aspect;
    let matrix = projection.calc_matrix();

    projection.resize(640, 480);
    assert_eq!(projection.aspect, aspect);
    assert_eq!(projection.calc_matrix(), matrix);
}
