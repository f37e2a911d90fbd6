use cgmath::{InnerSpace, Vector3};
use harborview::{
    content,
    data_structures::scene_graph::{MeshNode, Scene},
    resources::CancelToken,
};

#[test]
fn should_start_with_an_empty_scene() {
    let scene = Scene::new();
    assert_eq!(scene.object_count(), 0);
    assert_eq!(scene.descendant_count(), 0);
    assert!(scene.hemisphere_light().is_none());
}

#[test]
fn should_add_exactly_two_static_objects() {
    let mut scene = Scene::new();
    content::populate(&mut scene);

    assert_eq!(scene.object_count(), 2);
    assert_eq!(scene.descendant_count(), 2);
    assert!(scene.contains_node("ground_plane"));

    let light = scene.hemisphere_light().expect("populate adds the light");
    assert_eq!(light.intensity, 1.0);
    // sky #87cefa, ground #4db8ff
    assert!((light.sky_color[0] - 0x87 as f32 / 255.0).abs() < 1e-6);
    assert!((light.sky_color[1] - 0xce as f32 / 255.0).abs() < 1e-6);
    assert!((light.sky_color[2] - 0xfa as f32 / 255.0).abs() < 1e-6);
    assert!((light.ground_color[0] - 0x4d as f32 / 255.0).abs() < 1e-6);
    assert!((light.ground_color[1] - 0xb8 as f32 / 255.0).abs() < 1e-6);
    assert!((light.ground_color[2] - 0xff as f32 / 255.0).abs() < 1e-6);
}

#[test]
fn should_lay_the_ground_plane_flat() {
    let plane = content::ground_plane();

    // the quad is authored facing +Z; its transform must tip it to face up
    let normal = plane.transform.rotation * Vector3::unit_z();
    assert!((normal - Vector3::unit_y()).magnitude() < 1e-6);

    let primitive = &plane.primitives[0];
    assert_eq!(primitive.geometry.vertices.len(), 4);
    assert_eq!(primitive.geometry.indices.len(), 6);
    let extent = primitive
        .geometry
        .vertices
        .iter()
        .map(|v| v.position[0].abs().max(v.position[1].abs()))
        .fold(0.0f32, f32::max);
    assert_eq!(extent * 2.0, content::PLANE_SIZE);
}

#[test]
fn should_attach_a_loaded_subtree_as_descendant() {
    let mut scene = Scene::new();
    content::populate(&mut scene);
    let before = scene.descendant_count();

    let mut boat = MeshNode::group("boat");
    boat.add_child(MeshNode::group("hull"));
    boat.add_child(MeshNode::group("funnel"));
    let added = boat.descendant_count();
    assert_eq!(added, 3);

    scene.attach_model(boat);

    assert_eq!(scene.object_count(), 3);
    assert_eq!(scene.descendant_count(), before + added);
    assert!(scene.contains_node("boat"));
    assert!(scene.contains_node("funnel"));
}

#[test]
fn should_count_an_empty_subtree_as_a_single_node() {
    let mut scene = Scene::new();
    content::populate(&mut scene);
    let before = scene.descendant_count();

    scene.attach_model(MeshNode::group("empty"));

    assert_eq!(scene.descendant_count(), before + 1);
}

#[test]
fn should_leave_the_scene_unchanged_when_no_subtree_arrives() {
    // the failure path never touches the scene
    let mut scene = Scene::new();
    content::populate(&mut scene);
    assert_eq!(scene.object_count(), 2);
    assert_eq!(scene.descendant_count(), 2);
}

#[test]
fn should_drop_a_late_subtree_once_cancelled() {
    let mut scene = Scene::new();
    content::populate(&mut scene);
    let before = scene.descendant_count();

    // the viewer's attach guard: a completion racing teardown is dropped
    let token = CancelToken::new();
    let task_token = token.clone();
    token.cancel();

    let late = MeshNode::group("late_arrival");
    if !task_token.is_cancelled() {
        scene.attach_model(late);
    }

    assert_eq!(scene.descendant_count(), before);
    assert!(!scene.contains_node("late_arrival"));
}
