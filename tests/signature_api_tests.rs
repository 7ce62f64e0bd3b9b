mod common;

use actix_web::http::{header, StatusCode};
use actix_web::{test, web, App};
use base64::{engine::general_purpose::STANDARD, Engine};
use serde_json::{json, Value};

use common::*;
use iclub_eventtool::{json_config, routes};

macro_rules! init_app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data($state.clone())
                .app_data(json_config())
                .service(web::scope("/api").configure(routes)),
        )
        .await
    };
}

/// Black stroke on a transparent 4x2 canvas.
fn canvas_capture() -> String {
    let mut rgba = vec![0u8; 4 * 2 * 4];
    for pixel in rgba.chunks_mut(4).take(4) {
        pixel.copy_from_slice(&[0, 0, 0, 255]);
    }
    STANDARD.encode(rgba)
}

fn png_upload() -> Vec<u8> {
    let image = image::RgbaImage::from_pixel(3, 3, image::Rgba([10, 20, 30, 255]));
    let mut png = Vec::new();
    image::DynamicImage::ImageRgba8(image)
        .write_to(&mut std::io::Cursor::new(&mut png), image::ImageOutputFormat::Png)
        .unwrap();
    png
}

#[actix_web::test]
async fn test_kiosk_flow() {
    let ctx = test_context();
    let app = init_app!(ctx.state);
    let kiosk = format!("/api/sign/{}/participants", SHEET_ID);

    let resp = test::call_service(&app, test::TestRequest::get().uri(&kiosk).to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["names"], json!(["Erika Musterfrau", "Lea Lang", "Max Mustermann"]));

    let req = test::TestRequest::post()
        .uri("/api/signatures")
        .set_json(json!({
            "name": "Max Mustermann",
            "width": 4,
            "height": 2,
            "rgba_base64": canvas_capture()
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["file"], "Max_Mustermann.png");
    assert!(ctx.dir.path().join("signatures/Max_Mustermann.png").is_file());

    // the cached sheet is reused, the signature files are not
    let resp = test::call_service(&app, test::TestRequest::get().uri(&kiosk).to_request()).await;
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["names"], json!(["Erika Musterfrau", "Lea Lang"]));
    assert_eq!(ctx.sheets.calls(), 1);

    let req = test::TestRequest::get()
        .uri("/api/signatures/Max%20Mustermann")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers().get(header::CONTENT_TYPE).unwrap(), "image/png");
    let stored = image::load_from_memory(&test::read_body(resp).await).unwrap().to_rgb8();
    assert_eq!(stored.dimensions(), (4, 2));
    assert_eq!(stored.get_pixel(0, 0).0, [0, 0, 0]);
    assert_eq!(stored.get_pixel(3, 1).0, [255, 255, 255]);
}

#[actix_web::test]
async fn test_unsigned_names_for_session() {
    let ctx = test_context();
    let app = init_app!(ctx.state);

    let resp = test::call_service(&app, test::TestRequest::post().uri("/api/sessions").to_request()).await;
    let body: Value = test::read_body_json(resp).await;
    let id = body["session_id"].as_str().unwrap().to_string();
    let req = test::TestRequest::post()
        .uri(&format!("/api/sessions/{}/participants/sheet", id))
        .set_json(json!({ "sheet_url": sheet_url() }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let upload = multipart_body(&[("name", "Lea Lang")], &[("file", "signature.png", &png_upload())]);
    let req = test::TestRequest::post()
        .uri("/api/signatures/upload")
        .insert_header((header::CONTENT_TYPE, multipart_content_type()))
        .set_payload(upload)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let req = test::TestRequest::get()
        .uri(&format!("/api/sessions/{}/signatures/unsigned", id))
        .to_request();
    let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(body["names"], json!(["Erika Musterfrau", "Max Mustermann"]));
}

#[actix_web::test]
async fn test_signature_input_errors() {
    let ctx = test_context();
    let app = init_app!(ctx.state);

    let cases = [
        json!({ "name": "Max", "width": 4, "height": 2, "rgba_base64": "***" }),
        json!({ "name": "Max", "width": 5, "height": 2, "rgba_base64": canvas_capture() }),
        json!({ "name": "Max", "width": 0, "height": 0, "rgba_base64": "" }),
        json!({ "name": "???", "width": 4, "height": 2, "rgba_base64": canvas_capture() }),
        json!({ "name": "Max", "width": u32::MAX, "height": u32::MAX, "rgba_base64": canvas_capture() }),
    ];
    for case in cases {
        let req = test::TestRequest::post()
            .uri("/api/signatures")
            .set_json(&case)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "case {}", case);
    }

    let upload = multipart_body(&[("name", "Max")], &[("file", "signature.png", b"not a png")]);
    let req = test::TestRequest::post()
        .uri("/api/signatures/upload")
        .insert_header((header::CONTENT_TYPE, multipart_content_type()))
        .set_payload(upload)
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::get().uri("/api/signatures/Nobody").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "NotFound");
}
