use super::*;
use crate::state::test_helpers;

// =========================================================================
// Status mapping
// =========================================================================

#[test]
fn project_error_to_status_maps_not_found() {
    let err = ProjectError::NotFound(Uuid::nil());
    assert_eq!(project_error_to_status(&err), StatusCode::NOT_FOUND);
}

#[test]
fn export_error_to_status_maps_render_failure() {
    let err = ExportError::Task("pool gone".into());
    assert_eq!(export_error_to_status(&err), StatusCode::INTERNAL_SERVER_ERROR);
}

#[test]
fn generate_error_to_status_maps_bad_designated_element() {
    let err = GenerateError::BadIconElement(Uuid::nil());
    assert_eq!(generate_error_to_status(&err), StatusCode::UNPROCESSABLE_ENTITY);
}

#[test]
fn storage_error_to_status_maps_not_configured_to_503() {
    assert_eq!(
        storage_error_to_status(&StorageError::NotConfigured),
        StatusCode::SERVICE_UNAVAILABLE
    );
}

// =========================================================================
// Body shapes
// =========================================================================

#[test]
fn background_body_distinguishes_null_image_from_absent() {
    let cleared: BackgroundBody = serde_json::from_str(r#"{"image": null}"#).unwrap();
    assert_eq!(cleared.image, Some(None));

    let untouched: BackgroundBody = serde_json::from_str(r##"{"color": "#102030"}"##).unwrap();
    assert!(untouched.image.is_none());
    assert_eq!(untouched.color.as_deref(), Some("#102030"));
}

#[test]
fn add_element_body_flattens_placement_options() {
    let body: AddElementBody =
        serde_json::from_str(r#"{"kind": "image", "x": 90.0, "width": 40.0}"#).unwrap();
    assert_eq!(body.kind, ElementKind::Image);
    assert_eq!(body.options.x, Some(90.0));
    assert_eq!(body.options.width, Some(40.0));
}

#[test]
fn selection_body_accepts_null_id() {
    let body: SelectionBody = serde_json::from_str(r#"{"id": null}"#).unwrap();
    assert!(body.id.is_none());
}

// =========================================================================
// Handlers
// =========================================================================

#[tokio::test]
async fn create_then_get_round_trips_an_empty_document() {
    let state = test_helpers::test_app_state();

    let (status, Json(created)) = create_project(
        State(state.clone()),
        Json(CreateProjectBody { name: Some("Launch Video".into()) }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created.name, "Launch Video");

    let Json(doc) = get_project(State(state), Path(created.id)).await.unwrap();
    assert!(doc.is_empty());
}

#[tokio::test]
async fn get_unknown_project_is_not_found() {
    let state = test_helpers::test_app_state();
    let (status, Json(body)) = get_project(State(state), Path(Uuid::new_v4())).await.unwrap_err();
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body.code, "E_PROJECT_NOT_FOUND");
}

#[tokio::test]
async fn add_element_clamps_placement_into_bounds() {
    let state = test_helpers::test_app_state();
    let project_id = test_helpers::seed_project(&state).await;

    let body: AddElementBody =
        serde_json::from_str(r#"{"kind": "image", "x": 90.0, "width": 40.0}"#).unwrap();
    let (status, Json(created)) = add_element(State(state.clone()), Path(project_id), Json(body))
        .await
        .unwrap();
    assert_eq!(status, StatusCode::CREATED);

    let Json(doc) = get_project(State(state), Path(project_id)).await.unwrap();
    let element = doc.get(created.id).unwrap();
    assert!((element.x - 60.0).abs() < f64::EPSILON);
    assert_eq!(doc.selected(), Some(created.id));
}

#[tokio::test]
async fn update_unknown_element_is_not_found() {
    let state = test_helpers::test_app_state();
    let project_id = test_helpers::seed_project(&state).await;

    let result = update_element(
        State(state),
        Path((project_id, Uuid::new_v4())),
        Json(ElementPatch::default()),
    )
    .await;
    let (status, Json(body)) = result.unwrap_err();
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body.code, "E_ELEMENT_NOT_FOUND");
}

#[tokio::test]
async fn delete_element_returns_no_content() {
    let state = test_helpers::test_app_state();
    let project_id = test_helpers::seed_project(&state).await;
    let body: AddElementBody = serde_json::from_str(r#"{"kind": "text"}"#).unwrap();
    let (_, Json(created)) = add_element(State(state.clone()), Path(project_id), Json(body))
        .await
        .unwrap();

    let status = delete_element(State(state.clone()), Path((project_id, created.id)))
        .await
        .unwrap();
    assert_eq!(status, StatusCode::NO_CONTENT);

    let Json(doc) = get_project(State(state), Path(project_id)).await.unwrap();
    assert!(doc.is_empty());
}

#[tokio::test]
async fn reorder_applies_z_order_command() {
    let state = test_helpers::test_app_state();
    let project_id = test_helpers::seed_project(&state).await;
    let first: AddElementBody = serde_json::from_str(r#"{"kind": "text"}"#).unwrap();
    let (_, Json(bottom)) = add_element(State(state.clone()), Path(project_id), Json(first))
        .await
        .unwrap();
    let second: AddElementBody = serde_json::from_str(r#"{"kind": "shape"}"#).unwrap();
    add_element(State(state.clone()), Path(project_id), Json(second)).await.unwrap();

    reorder_element(
        State(state.clone()),
        Path((project_id, bottom.id)),
        Json(ReorderBody { op: ReorderOp::ToFront }),
    )
    .await
    .unwrap();

    let Json(doc) = get_project(State(state), Path(project_id)).await.unwrap();
    assert_eq!(doc.index_of(bottom.id), Some(1));
}

#[tokio::test]
async fn background_put_sets_color_and_clears_image() {
    let state = test_helpers::test_app_state();
    let project_id = test_helpers::seed_project(&state).await;

    let set_image: BackgroundBody =
        serde_json::from_str(r#"{"image": "data:image/png;base64,AA=="}"#).unwrap();
    set_background(State(state.clone()), Path(project_id), Json(set_image)).await.unwrap();

    let clear: BackgroundBody =
        serde_json::from_str(r##"{"color": "#FF0000", "image": null}"##).unwrap();
    set_background(State(state.clone()), Path(project_id), Json(clear)).await.unwrap();

    let Json(doc) = get_project(State(state), Path(project_id)).await.unwrap();
    assert_eq!(doc.background_color(), "#FF0000");
    assert!(doc.background_image().is_none());
}

#[tokio::test]
async fn export_serves_attachment_with_format_extension() {
    let state = test_helpers::test_app_state();
    let project_id = test_helpers::seed_project(&state).await;

    let response = export_project(
        State(state),
        Path(project_id),
        Query(ExportQuery { format: ExportFormat::Png, filename: None }),
    )
    .await
    .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(CONTENT_TYPE).and_then(|v| v.to_str().ok()),
        Some("image/png")
    );
    assert_eq!(
        response.headers().get(CONTENT_DISPOSITION).and_then(|v| v.to_str().ok()),
        Some("attachment; filename=\"thumbnail.png\"")
    );
}

#[tokio::test]
async fn save_without_storage_dir_is_service_unavailable() {
    let state = test_helpers::test_app_state();
    let project_id = test_helpers::seed_project(&state).await;

    let (status, Json(body)) = save_project(State(state), Path(project_id)).await.unwrap_err();
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body.code, "E_STORAGE_NOT_CONFIGURED");
}
