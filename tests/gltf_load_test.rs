use harborview::resources::{self, CancelToken};

#[tokio::test]
async fn should_load_the_bundled_model() {
    let token = CancelToken::new();
    let mut reports = Vec::new();

    let model = resources::load_model_gltf("models/Tugboat.gltf", &token, &mut |loaded, total| {
        reports.push((loaded, total))
    })
    .await
    .expect("the bundled model should load");

    assert_eq!(model.name, "Tugboat");
    assert_eq!(model.descendant_count(), 1);
    assert_eq!(model.primitives.len(), 1);

    let primitive = &model.primitives[0];
    assert_eq!(primitive.geometry.vertices.len(), 24);
    assert_eq!(primitive.geometry.indices.len(), 36);
    // every vertex carries a decoded normal
    assert!(primitive
        .geometry
        .vertices
        .iter()
        .all(|v| v.normal.iter().any(|c| *c != 0.0)));

    // untextured hull: base color factor only
    assert!(primitive.material.image.is_none());
    assert!((primitive.material.base_color[0] - 0.70).abs() < 1e-6);
    assert!((primitive.material.base_color[3] - 1.0).abs() < 1e-6);
}

#[tokio::test]
async fn should_report_monotonic_byte_progress() {
    let token = CancelToken::new();
    let mut reports = Vec::new();

    resources::load_model_gltf("models/Tugboat.gltf", &token, &mut |loaded, total| {
        reports.push((loaded, total))
    })
    .await
    .expect("the bundled model should load");

    assert!(reports.len() >= 2, "root document and buffer each report");
    assert!(reports.windows(2).all(|w| w[0].0 <= w[1].0));
    assert!(reports.iter().all(|(loaded, total)| loaded <= total));
    let (loaded, total) = *reports.last().unwrap();
    assert_eq!(loaded, total, "a finished load has fetched every byte");
}

#[tokio::test]
async fn should_fail_on_a_missing_asset() {
    let token = CancelToken::new();
    let result =
        resources::load_model_gltf("models/DoesNotExist.gltf", &token, &mut |_, _| {}).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn should_abort_a_cancelled_load() {
    let token = CancelToken::new();
    token.cancel();

    let err = resources::load_model_gltf("models/Tugboat.gltf", &token, &mut |_, _| {})
        .await
        .expect_err("a cancelled load must not produce a model");
    assert!(err.to_string().contains("cancelled"));
}

#[test]
fn should_share_cancellation_across_clones() {
    let token = CancelToken::new();
    let task_side = token.clone();
    assert!(!task_side.is_cancelled());

    token.cancel();
    assert!(task_side.is_cancelled());
}
