use std::time::Duration;

use cgmath::{Deg, InnerSpace, Point3, Vector3};
use harborview::camera::{Camera, OrbitController};
use winit::event::MouseScrollDelta;

const FRAME: Duration = Duration::from_millis(16);

fn mk_orbit() -> (Camera, OrbitController) {
    let mut camera = Camera::new((5.0, 10.0, 5.0), Deg(0.0), Deg(0.0));
    let mut controller =
        OrbitController::from_camera(&camera, Point3::new(0.0, 0.0, 0.0), 0.6, 0.1);
    controller.update(&mut camera, Duration::ZERO);
    (camera, controller)
}

fn view_direction(camera: &Camera) -> Vector3<f32> {
    let (sin_pitch, cos_pitch) = camera.pitch.0.sin_cos();
    let (sin_yaw, cos_yaw) = camera.yaw.0.sin_cos();
    Vector3::new(cos_pitch * cos_yaw, sin_pitch, cos_pitch * sin_yaw).normalize()
}

#[test]
fn should_keep_the_camera_on_the_orbit_radius() {
    let (mut camera, mut controller) = mk_orbit();
    let radius = controller.distance();
    assert!((radius - 150.0_f32.sqrt()).abs() < 1e-3);

    controller.handle_mouse(120.0, -40.0);
    controller.update(&mut camera, FRAME);

    let distance = (camera.position - controller.target()).magnitude();
    assert!((distance - radius).abs() < 1e-3);
}

#[test]
fn should_face_the_focal_point() {
    let (mut camera, mut controller) = mk_orbit();
    controller.handle_mouse(60.0, 25.0);
    controller.update(&mut camera, FRAME);

    let to_target = (controller.target() - camera.position).normalize();
    assert!((view_direction(&camera) - to_target).magnitude() < 1e-4);
}

#[test]
fn should_clamp_pitch_short_of_the_poles() {
    let (mut camera, mut controller) = mk_orbit();
    controller.handle_mouse(0.0, 1.0e6);
    controller.update(&mut camera, FRAME);

    let radius = (camera.position - controller.target()).magnitude();
    let max_sin = (std::f32::consts::FRAC_PI_2 - 0.05).sin();
    assert!(camera.position.y / radius <= max_sin + 1e-4);
}

#[test]
fn should_clamp_zoom_to_the_distance_bounds() {
    let (mut camera, mut controller) = mk_orbit();

    controller.handle_scroll(&MouseScrollDelta::LineDelta(0.0, 1.0e6));
    controller.update(&mut camera, FRAME);
    assert_eq!(controller.distance(), OrbitController::MIN_DISTANCE);

    controller.handle_scroll(&MouseScrollDelta::LineDelta(0.0, -1.0e6));
    controller.update(&mut camera, FRAME);
    assert_eq!(controller.distance(), OrbitController::MAX_DISTANCE);
}

#[test]
fn should_zoom_in_on_forward_scroll() {
    let (mut camera, mut controller) = mk_orbit();
    let before = controller.distance();

    controller.handle_scroll(&MouseScrollDelta::LineDelta(0.0, 1.0));
    controller.update(&mut camera, FRAME);

    assert!(controller.distance() < before);
}

#[test]
fn should_ignore_all_input_after_release() {
    let (mut camera, mut controller) = mk_orbit();
    let pose = camera.position;

    controller.release();
    assert!(controller.is_released());

    controller.handle_mouse(500.0, 500.0);
    controller.handle_scroll(&MouseScrollDelta::LineDelta(0.0, 10.0));
    controller.update(&mut camera, FRAME);

    assert_eq!(camera.position, pose);
}
