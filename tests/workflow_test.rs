//! Status workflows and cross-entity effects against a live database

mod helpers;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use helpers::*;
use mp_tourify::models::admin::Role;
use serde_json::json;
use serial_test::serial;
use tower::ServiceExt;

/// Admin and RTC sessions over one district the RTC covers
async fn staff(ctx: &TestContext) -> (String, String, uuid::Uuid) {
    ctx.create_admin(ADMIN_EMAIL, Role::Admin, vec![]).await;
    let admin_token = ctx.login(ADMIN_EMAIL).await;
    let district = ctx.create_district(&admin_token, "Ashoknagar").await;

    ctx.create_admin(RTC_EMAIL, Role::Rtc, vec![district]).await;
    let rtc_token = ctx.login(RTC_EMAIL).await;

    (admin_token, rtc_token, district)
}

#[tokio::test]
#[serial]
async fn test_panchayat_review_cycle() {
    let Some(ctx) = TestContext::try_new().await else { return };
    let (admin_token, rtc_token, district) = staff(&ctx).await;

    let panchayat = ctx.create_panchayat(&rtc_token, "Chanderi", district).await;
    let uri = format!("/api/panchayats/{}", id_of(&panchayat));
    assert_eq!(panchayat["status"], "Pending");
    assert!(panchayat["createdBy"].is_string());

    let self_verify = ctx
        .request(Method::PUT, &format!("{}/status", uri), Some(&rtc_token), Some(json!({ "status": "Verified" })))
        .await;
    assert_eq!(self_verify.status, StatusCode::FORBIDDEN);

    let verified = ctx
        .request(Method::PUT, &format!("{}/status", uri), Some(&admin_token), Some(json!({ "status": "Verified" })))
        .await;
    assert_eq!(verified.body["status"], "Verified");

    // A field report on a verified entry sends it back for review
    let report = ctx
        .request(
            Method::PUT,
            &format!("{}/rtc-report", uri),
            Some(&rtc_token),
            Some(json!({
                "summary": "Weaver clusters open to visitors",
                "attractions": ["Koshak Mahal", "  ", "Badal Mahal"],
            })),
        )
        .await;
    assert_eq!(report.status, StatusCode::OK, "{:?}", report.body);
    assert_eq!(report.body["status"], "Pending");
    assert_eq!(report.body["rtcReport"]["attractions"], json!(["Koshak Mahal", "Badal Mahal"]));
    assert!(report.body["rtcReport"]["submittedAt"].is_string());

    ctx.request(Method::PUT, &format!("{}/status", uri), Some(&admin_token), Some(json!({ "status": "Verified" })))
        .await;

    // An RTC may withdraw a verified entry back to draft
    let rtc_to_draft = ctx
        .request(Method::PUT, &format!("{}/status", uri), Some(&rtc_token), Some(json!({ "status": "Draft" })))
        .await;
    assert_eq!(rtc_to_draft.status, StatusCode::OK, "{:?}", rtc_to_draft.body);
    assert_eq!(rtc_to_draft.body["status"], "Draft");
    let public = ctx.request(Method::GET, &uri, None, None).await;
    assert_eq!(public.status, StatusCode::NOT_FOUND);

    ctx.request(Method::PUT, &format!("{}/status", uri), Some(&admin_token), Some(json!({ "status": "Verified" })))
        .await;

    // Plain edits by an RTC demote as well; admin edits keep the status
    let edited = ctx
        .request(Method::PUT, &uri, Some(&rtc_token), Some(json!({ "population": 5100 })))
        .await;
    assert_eq!(edited.body["status"], "Pending");
    assert_eq!(edited.body["population"], 5100);

    ctx.request(Method::PUT, &format!("{}/status", uri), Some(&admin_token), Some(json!({ "status": "Verified" })))
        .await;
    let admin_edit = ctx
        .request(Method::PUT, &uri, Some(&admin_token), Some(json!({ "block": "Isagarh" })))
        .await;
    assert_eq!(admin_edit.body["status"], "Verified");
}

#[tokio::test]
#[serial]
async fn test_panchayat_validation_and_slugs() {
    let Some(ctx) = TestContext::try_new().await else { return };
    let (admin_token, _, district) = staff(&ctx).await;

    let first = ctx.create_panchayat(&admin_token, "Pranpur", district).await;
    let second = ctx.create_panchayat(&admin_token, "Pranpur", district).await;
    assert_eq!(first["slug"], "pranpur");
    assert_ne!(second["slug"], "pranpur");
    assert!(second["slug"].as_str().unwrap().starts_with("pranpur-"));

    let mut bad_coordinates = panchayat_body("Thubon", district);
    bad_coordinates["latitude"] = json!(123.0);
    let response = ctx
        .request(Method::POST, "/api/panchayats", Some(&admin_token), Some(bad_coordinates))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let mut unknown_gallery = panchayat_body("Thubon", district);
    unknown_gallery["gallery"] = json!([uuid::Uuid::new_v4()]);
    let response = ctx
        .request(Method::POST, "/api/panchayats", Some(&admin_token), Some(unknown_gallery))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let renamed = ctx
        .request(
            Method::PUT,
            &format!("/api/panchayats/{}", id_of(&first)),
            Some(&admin_token),
            Some(json!({ "name": "Pranpur Village" })),
        )
        .await;
    assert_eq!(renamed.body["slug"], "pranpur-village");

    // Resending the unchanged name keeps a suffixed slug stable
    let suffixed = second["slug"].as_str().unwrap().to_string();
    let resent = ctx
        .request(
            Method::PUT,
            &format!("/api/panchayats/{}", id_of(&second)),
            Some(&admin_token),
            Some(json!({ "name": "Pranpur", "population": 4200 })),
        )
        .await;
    assert_eq!(resent.status, StatusCode::OK, "{:?}", resent.body);
    assert_eq!(resent.body["slug"], suffixed);
    let by_slug = ctx
        .request(Method::GET, &format!("/api/panchayats/{}", suffixed), Some(&admin_token), None)
        .await;
    assert_eq!(by_slug.status, StatusCode::OK);
}

#[tokio::test]
#[serial]
async fn test_gallery_edits_move_media_links() {
    let Some(ctx) = TestContext::try_new().await else { return };
    let (admin_token, rtc_token, district) = staff(&ctx).await;
    let other_district = ctx.create_district(&admin_token, "Dhar").await;

    let panchayat = ctx.create_panchayat(&admin_token, "Chanderi", district).await;
    let panchayat_id = id_of(&panchayat);
    let panchayat_uri = format!("/api/panchayats/{}", panchayat_id);
    let gallery_query = format!("/api/media?panchayat={}", panchayat_id);

    let linked = ctx
        .request(Method::POST, "/api/media", Some(&admin_token), Some(media_body("Fort", None, Some(panchayat_id))))
        .await;
    let linked_id = id_of(&linked.body);
    let loose = ctx
        .request(Method::POST, "/api/media", Some(&admin_token), Some(media_body("Lake", Some(district), None)))
        .await;
    let loose_id = id_of(&loose.body);

    // Dropping media from the gallery detaches it
    let cleared = ctx
        .request(Method::PUT, &panchayat_uri, Some(&admin_token), Some(json!({ "gallery": [] })))
        .await;
    assert_eq!(cleared.status, StatusCode::OK, "{:?}", cleared.body);
    let listing = ctx.request(Method::GET, &gallery_query, Some(&admin_token), None).await;
    assert_eq!(listing.body["total"], 0);
    let detached = ctx
        .request(Method::GET, &format!("/api/media/{}", linked_id), Some(&admin_token), None)
        .await;
    assert!(detached.body["gramPanchayatId"].is_null());

    // Adding media through the gallery links it
    let added = ctx
        .request(Method::PUT, &panchayat_uri, Some(&admin_token), Some(json!({ "gallery": [loose_id] })))
        .await;
    assert_eq!(added.body["gallery"], json!([loose_id]));
    let listing = ctx.request(Method::GET, &gallery_query, Some(&admin_token), None).await;
    assert_eq!(listing.body["total"], 1);
    assert_eq!(listing.body["items"][0]["id"], loose_id.to_string());

    // Claiming the media for a second panchayat takes it out of the first gallery
    let second = ctx.create_panchayat(&admin_token, "Pranpur", district).await;
    let claimed = ctx
        .request(
            Method::PUT,
            &format!("/api/panchayats/{}", id_of(&second)),
            Some(&admin_token),
            Some(json!({ "gallery": [loose_id] })),
        )
        .await;
    assert_eq!(claimed.status, StatusCode::OK);
    let first = ctx.request(Method::GET, &panchayat_uri, Some(&admin_token), None).await;
    assert_eq!(first.body["gallery"], json!([]));
    let moved = ctx
        .request(Method::GET, &format!("/api/media/{}", loose_id), Some(&admin_token), None)
        .await;
    assert_eq!(moved.body["gramPanchayatId"], id_of(&second).to_string());

    // Media from another district or rejected media cannot join the gallery
    let foreign = ctx
        .request(Method::POST, "/api/media", Some(&admin_token), Some(media_body("Jahaz Mahal", Some(other_district), None)))
        .await;
    let foreign_id = id_of(&foreign.body);
    let response = ctx
        .request(Method::PUT, &panchayat_uri, Some(&admin_token), Some(json!({ "gallery": [foreign_id] })))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let mut rejected_body = media_body("Blurred", Some(district), None);
    rejected_body["status"] = json!("rejected");
    let rejected = ctx.request(Method::POST, "/api/media", Some(&admin_token), Some(rejected_body)).await;
    let response = ctx
        .request(Method::PUT, &panchayat_uri, Some(&admin_token), Some(json!({ "gallery": [id_of(&rejected.body)] })))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = ctx
        .request(Method::PUT, &panchayat_uri, Some(&rtc_token), Some(json!({ "gallery": [foreign_id] })))
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    // Deleting a panchayat keeps its media but detaches them
    let relinked = ctx
        .request(Method::PUT, &panchayat_uri, Some(&admin_token), Some(json!({ "gallery": [linked_id] })))
        .await;
    assert_eq!(relinked.status, StatusCode::OK);
    let deleted = ctx.request(Method::DELETE, &panchayat_uri, Some(&admin_token), None).await;
    assert_eq!(deleted.status, StatusCode::NO_CONTENT);
    let orphan = ctx
        .request(Method::GET, &format!("/api/media/{}", linked_id), Some(&admin_token), None)
        .await;
    assert_eq!(orphan.status, StatusCode::OK);
    assert!(orphan.body["gramPanchayatId"].is_null());
    assert_eq!(orphan.body["districtId"], district.to_string());
}

#[tokio::test]
#[serial]
async fn test_media_gallery_follows_links() {
    let Some(ctx) = TestContext::try_new().await else { return };
    let (admin_token, _, district) = staff(&ctx).await;
    let other_district = ctx.create_district(&admin_token, "Guna").await;

    let panchayat = ctx.create_panchayat(&admin_token, "Chanderi", district).await;
    let panchayat_uri = format!("/api/panchayats/{}", id_of(&panchayat));

    let created = ctx
        .request(
            Method::POST,
            "/api/media",
            Some(&admin_token),
            Some(media_body("Koshak Mahal", None, Some(id_of(&panchayat)))),
        )
        .await;
    assert_eq!(created.status, StatusCode::CREATED, "{:?}", created.body);
    assert_eq!(created.body["status"], "approved");
    assert_eq!(created.body["districtId"], district.to_string());
    assert_eq!(created.body["tags"], json!(["heritage", "craft"]));
    let media_id = id_of(&created.body);

    let panchayat = ctx.request(Method::GET, &panchayat_uri, Some(&admin_token), None).await;
    assert_eq!(panchayat.body["gallery"], json!([media_id]));

    let conflicting = ctx
        .request(
            Method::POST,
            "/api/media",
            Some(&admin_token),
            Some(media_body("Mismatch", Some(other_district), Some(id_of(&panchayat.body)))),
        )
        .await;
    assert_eq!(conflicting.status, StatusCode::BAD_REQUEST);

    // Moving the media to another district detaches it from the panchayat
    let moved = ctx
        .request(
            Method::PUT,
            &format!("/api/media/{}", media_id),
            Some(&admin_token),
            Some(json!({ "districtId": other_district })),
        )
        .await;
    assert_eq!(moved.status, StatusCode::OK);
    assert!(moved.body["gramPanchayatId"].is_null());
    let panchayat = ctx.request(Method::GET, &panchayat_uri, Some(&admin_token), None).await;
    assert_eq!(panchayat.body["gallery"], json!([]));

    let relinked = ctx
        .request(
            Method::PUT,
            &format!("/api/media/{}", media_id),
            Some(&admin_token),
            Some(json!({ "gramPanchayatId": id_of(&panchayat.body) })),
        )
        .await;
    assert_eq!(relinked.body["districtId"], district.to_string());

    let deleted = ctx
        .request(Method::DELETE, &format!("/api/media/{}", media_id), Some(&admin_token), None)
        .await;
    assert_eq!(deleted.status, StatusCode::NO_CONTENT);
    let panchayat = ctx.request(Method::GET, &panchayat_uri, Some(&admin_token), None).await;
    assert_eq!(panchayat.body["gallery"], json!([]));
}

#[tokio::test]
#[serial]
async fn test_rtc_media_moderation() {
    let Some(ctx) = TestContext::try_new().await else { return };
    let (admin_token, rtc_token, district) = staff(&ctx).await;

    let mut body = media_body("Handloom street", Some(district), None);
    body["status"] = json!("approved");
    let created = ctx.request(Method::POST, "/api/media", Some(&rtc_token), Some(body)).await;
    assert_eq!(created.status, StatusCode::CREATED);
    assert_eq!(created.body["status"], "pending");
    let uri = format!("/api/media/{}", id_of(&created.body));

    let no_location = ctx
        .request(Method::POST, "/api/media", Some(&rtc_token), Some(media_body("Nowhere", None, None)))
        .await;
    assert_eq!(no_location.status, StatusCode::BAD_REQUEST);

    let public_before = ctx.request(Method::GET, &uri, None, None).await;
    assert_eq!(public_before.status, StatusCode::NOT_FOUND);

    let rtc_approve = ctx
        .request(Method::PUT, &format!("{}/status", uri), Some(&rtc_token), Some(json!({ "status": "approved" })))
        .await;
    assert_eq!(rtc_approve.status, StatusCode::FORBIDDEN);

    let approved = ctx
        .request(Method::PUT, &format!("{}/status", uri), Some(&admin_token), Some(json!({ "status": "approved" })))
        .await;
    assert_eq!(approved.body["status"], "approved");

    let public_list = ctx.request(Method::GET, "/api/media?file_type=image", None, None).await;
    assert_eq!(public_list.body["total"], 1);

    let delete_approved = ctx.request(Method::DELETE, &uri, Some(&rtc_token), None).await;
    assert_eq!(delete_approved.status, StatusCode::FORBIDDEN);

    // An RTC edit sends approved media back to moderation
    let edited = ctx
        .request(Method::PUT, &uri, Some(&rtc_token), Some(json!({ "title": "Handloom lane" })))
        .await;
    assert_eq!(edited.body["status"], "pending");

    let withdrawn = ctx.request(Method::DELETE, &uri, Some(&rtc_token), None).await;
    assert_eq!(withdrawn.status, StatusCode::NO_CONTENT);
}

#[tokio::test]
#[serial]
async fn test_district_lifecycle() {
    let Some(ctx) = TestContext::try_new().await else { return };
    ctx.create_admin(ADMIN_EMAIL, Role::Admin, vec![]).await;
    let token = ctx.login(ADMIN_EMAIL).await;

    let district = ctx.create_district(&token, "Shivpuri").await;
    let by_slug = ctx.request(Method::GET, "/api/districts/shivpuri", None, None).await;
    assert_eq!(by_slug.status, StatusCode::OK);
    assert_eq!(id_of(&by_slug.body), district);

    let featured = ctx
        .request(
            Method::PUT,
            &format!("/api/districts/{}", district),
            Some(&token),
            Some(json!({ "isFeatured": true })),
        )
        .await;
    assert_eq!(featured.body["isFeatured"], true);
    let listing = ctx.request(Method::GET, "/api/districts?featured=true", None, None).await;
    assert_eq!(listing.body["total"], 1);

    ctx.create_panchayat(&token, "Narwar", district).await;
    let blocked = ctx
        .request(Method::DELETE, &format!("/api/districts/{}", district), Some(&token), None)
        .await;
    assert_eq!(blocked.status, StatusCode::CONFLICT);

    let empty = ctx.create_district(&token, "Sheopur").await;
    let rtc = ctx.create_admin(RTC_EMAIL, Role::Rtc, vec![empty, district]).await;
    let deleted = ctx
        .request(Method::DELETE, &format!("/api/districts/{}", empty), Some(&token), None)
        .await;
    assert_eq!(deleted.status, StatusCode::NO_CONTENT);
    assert_eq!(ctx.database.count_records("districts").await.unwrap(), 1);

    // The deleted district is gone from every assignment
    let account = ctx
        .request(Method::GET, &format!("/api/admins/{}", rtc.id), Some(&token), None)
        .await;
    assert_eq!(account.body["assignedDistricts"], json!([district]));

    // A rename that resends the same name keeps the slug
    let same_name = ctx
        .request(
            Method::PUT,
            &format!("/api/districts/{}", district),
            Some(&token),
            Some(json!({ "name": "Shivpuri", "headquarters": "Shivpuri" })),
        )
        .await;
    assert_eq!(same_name.body["slug"], "shivpuri");
}

#[tokio::test]
#[serial]
async fn test_news_publication() {
    let Some(ctx) = TestContext::try_new().await else { return };
    ctx.create_admin(ADMIN_EMAIL, Role::Admin, vec![]).await;
    let token = ctx.login(ADMIN_EMAIL).await;

    let created = ctx
        .request(Method::POST, "/api/news", Some(&token), Some(news_body("Chanderi Utsav 2024")))
        .await;
    assert_eq!(created.status, StatusCode::CREATED);
    assert_eq!(created.body["status"], "draft");
    assert!(created.body["publishedAt"].is_null());
    let slug = created.body["slug"].as_str().unwrap().to_string();
    let uri = format!("/api/news/{}", id_of(&created.body));

    let hidden = ctx.request(Method::GET, &format!("/api/news/{}", slug), None, None).await;
    assert_eq!(hidden.status, StatusCode::NOT_FOUND);

    let published = ctx
        .request(Method::PUT, &format!("{}/status", uri), Some(&token), Some(json!({ "status": "published" })))
        .await;
    let published_at = published.body["publishedAt"].clone();
    assert!(published_at.is_string());

    let public = ctx.request(Method::GET, &format!("/api/news/{}", slug), None, None).await;
    assert_eq!(public.status, StatusCode::OK);

    let unpublished = ctx
        .request(Method::PUT, &format!("{}/status", uri), Some(&token), Some(json!({ "status": "draft" })))
        .await;
    assert_eq!(unpublished.body["publishedAt"], published_at);

    let republished = ctx
        .request(Method::PUT, &format!("{}/status", uri), Some(&token), Some(json!({ "status": "published" })))
        .await;
    assert_eq!(republished.body["publishedAt"], published_at);

    let public_list = ctx.request(Method::GET, "/api/news?search=utsav", None, None).await;
    assert_eq!(public_list.body["total"], 1);

    let deleted = ctx.request(Method::DELETE, &uri, Some(&token), None).await;
    assert_eq!(deleted.status, StatusCode::NO_CONTENT);
}

#[tokio::test]
#[serial]
async fn test_contact_resolution() {
    let Some(ctx) = TestContext::try_new().await else { return };
    ctx.create_admin(ADMIN_EMAIL, Role::Admin, vec![]).await;
    let token = ctx.login(ADMIN_EMAIL).await;

    let submitted = ctx.request(Method::POST, "/api/contacts", None, Some(contact_body())).await;
    assert_eq!(submitted.status, StatusCode::CREATED);
    assert_eq!(submitted.body["status"], "new");
    assert_eq!(submitted.body["email"], "asha@example.org");
    let uri = format!("/api/contacts/{}", id_of(&submitted.body));

    let resolved = ctx
        .request(Method::PUT, &format!("{}/status", uri), Some(&token), Some(json!({ "status": "resolved" })))
        .await;
    assert_eq!(resolved.body["status"], "resolved");
    assert!(resolved.body["resolvedAt"].is_string());

    let open = ctx.request(Method::GET, "/api/contacts?status=new", Some(&token), None).await;
    assert_eq!(open.body["total"], 0);

    let reopened = ctx
        .request(Method::PUT, &format!("{}/status", uri), Some(&token), Some(json!({ "status": "new" })))
        .await;
    assert!(reopened.body["resolvedAt"].is_null());

    let deleted = ctx.request(Method::DELETE, &uri, Some(&token), None).await;
    assert_eq!(deleted.status, StatusCode::NO_CONTENT);
    let missing = ctx.request(Method::GET, &uri, Some(&token), None).await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
#[serial]
async fn test_upload_forwards_to_storage() {
    let storage = StorageMockServer::new().await;
    storage.mock_upload_success("image", "mp-tourify/fort", 1).await;

    let Some(ctx) = TestContext::try_with_settings(test_settings_with_storage(storage.config())).await else {
        return;
    };
    ctx.create_admin(ADMIN_EMAIL, Role::Admin, vec![]).await;
    let token = ctx.login(ADMIN_EMAIL).await;

    let boundary = "tourify-boundary";
    let mut body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"caption\"\r\n\r\nFort at dawn\r\n\
         --{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"fort.jpg\"\r\n\
         Content-Type: image/jpeg\r\n\r\n",
        b = boundary
    )
    .into_bytes();
    body.extend_from_slice(&[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10]);
    body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/upload")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={}", boundary))
        .body(Body::from(body))
        .unwrap();
    let response = into_test_response(ctx.router.clone().oneshot(request).await.unwrap()).await;

    assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
    assert_eq!(response.body["url"], "https://cdn.example.org/image/mp-tourify/fort");
    assert_eq!(response.body["public_id"], "mp-tourify/fort");
    assert_eq!(response.body["resource_type"], "image");
}
