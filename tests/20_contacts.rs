mod common;

use anyhow::Result;
use axum::http::{Method, StatusCode};
use serde_json::{json, Value};

use common::{bearer, sample_address, sample_others, TestApp, SECRET};
use hr_desk_api::config::AppConfig;
use hr_desk_api::database::ObjectId;
use hr_desk_api::models::{Address, Contact, ContactKind, Others};

fn address_body() -> Value {
    json!({
        "type": "address",
        "address": {
            "addressLine1": "221B Baker Street",
            "addressType": "office",
            "city": "London",
            "state": "Greater London",
            "postalCode": "NW1 6XE",
            "country": "UK"
        }
    })
}

fn others_body() -> Value {
    json!({
        "type": "others",
        "others": {"contactType": "personal", "channelType": "email", "value": "sherlock@example.com"}
    })
}

#[tokio::test]
async fn get_existing_contact() -> Result<()> {
    let app = TestApp::new();
    let contact = app
        .seed_contact(Contact {
            id: ObjectId::parse("614f1c2e9b1e8a3d4c5b6a79")?,
            ..Contact::with_address(sample_address())
        })
        .await?;

    let (status, body) = app
        .send(Method::GET, "/contact/614f1c2e9b1e8a3d4c5b6a79", Some(&bearer(None)), None)
        .await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Contact fetched successfully");
    assert_eq!(body["data"]["_id"], "614f1c2e9b1e8a3d4c5b6a79");
    assert_eq!(body["data"]["type"], "address");
    assert_eq!(body["data"]["address"]["city"], "Bengaluru");
    assert_eq!(body["data"]["others"], json!({}));
    assert_eq!(serde_json::from_value::<Contact>(body["data"].clone())?, contact);
    Ok(())
}

#[tokio::test]
async fn get_unknown_contact_is_404() -> Result<()> {
    let app = TestApp::new();
    let (status, body) = app
        .send(Method::GET, &format!("/contact/{}", ObjectId::new()), Some(&bearer(None)), None)
        .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Contact does not exist");
    assert_eq!(body["code"], "NOT_FOUND");
    Ok(())
}

#[tokio::test]
async fn malformed_or_missing_id_is_400() -> Result<()> {
    let app = TestApp::new();
    let token = bearer(None);

    let (status, body) = app.send(Method::GET, "/contact/not-an-id", Some(&token), None).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid Contact ID");

    for uri in ["/contact", "/contact/"] {
        let (status, body) = app.send(Method::GET, uri, Some(&token), None).await?;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
        assert_eq!(body["message"], "Contact ID is required");
    }

    // Token is checked before the id
    let (status, body) = app.send(Method::GET, "/contact/", None, None).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Token is Missing");
    Ok(())
}

#[tokio::test]
async fn switching_address_to_others_clears_address() -> Result<()> {
    let app = TestApp::new();
    let contact = app.seed_contact(Contact::with_address(sample_address())).await?;
    let uri = format!("/contact/{}", contact.id);

    let (status, body) = app.send(Method::PUT, &uri, Some(&bearer(None)), Some(others_body())).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Contact details updated successfully.");
    assert_eq!(body["data"]["type"], "others");
    assert_eq!(body["data"]["address"], json!({}));

    let stored = app.contacts().find_by_id(&contact.id).await?.expect("contact kept");
    assert_eq!(stored.kind, ContactKind::Others);
    assert!(stored.address.is_empty());
    assert_eq!(
        stored.others,
        Others {
            contact_type: Some("personal".into()),
            channel_type: Some("email".into()),
            value: Some("sherlock@example.com".into()),
        }
    );
    assert_eq!(stored.created_at, contact.created_at);
    assert!(stored.updated_at >= contact.updated_at);
    Ok(())
}

#[tokio::test]
async fn switching_others_to_address_clears_others() -> Result<()> {
    let app = TestApp::new();
    let contact = app.seed_contact(Contact::with_others(sample_others())).await?;
    let uri = format!("/contact/{}", contact.id);

    let (status, _) = app.send(Method::PATCH, &uri, Some(&bearer(None)), Some(address_body())).await?;
    assert_eq!(status, StatusCode::OK);

    let stored = app.contacts().find_by_id(&contact.id).await?.expect("contact kept");
    assert_eq!(stored.kind, ContactKind::Address);
    assert!(stored.others.is_empty());
    assert_eq!(
        stored.address,
        Address {
            address_line1: Some("221B Baker Street".into()),
            address_line2: None,
            address_type: Some("office".into()),
            city: Some("London".into()),
            state: Some("Greater London".into()),
            postal_code: Some("NW1 6XE".into()),
            country: Some("UK".into()),
        }
    );
    Ok(())
}

#[tokio::test]
async fn put_and_patch_behave_identically() -> Result<()> {
    let app = TestApp::new();
    let a = app.seed_contact(Contact::with_others(sample_others())).await?;
    let b = app.seed_contact(Contact::with_others(sample_others())).await?;

    let (put_status, put_body) = app
        .send(Method::PUT, &format!("/contact/{}", a.id), Some(&bearer(None)), Some(address_body()))
        .await?;
    let (patch_status, patch_body) = app
        .send(Method::PATCH, &format!("/contact/{}", b.id), Some(&bearer(None)), Some(address_body()))
        .await?;

    assert_eq!(put_status, patch_status);
    assert_eq!(put_body["message"], patch_body["message"]);
    assert_eq!(put_body["data"]["address"], patch_body["data"]["address"]);
    assert_eq!(put_body["data"]["others"], patch_body["data"]["others"]);
    Ok(())
}

#[tokio::test]
async fn update_validation_failures() -> Result<()> {
    let app = TestApp::new();
    let contact = app.seed_contact(Contact::with_address(sample_address())).await?;
    let uri = format!("/contact/{}", contact.id);
    let token = bearer(None);

    let (status, body) = app.send(Method::PUT, &uri, Some(&token), Some(json!({}))).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Type is required.");

    let (status, body) = app
        .send(Method::PUT, &uri, Some(&token), Some(json!({"type": "pager"})))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid type specified.");

    let mut partial = address_body();
    partial["address"]["country"] = json!("");
    let (status, body) = app.send(Method::PUT, &uri, Some(&token), Some(partial)).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Please provide all required fields for address.");
    assert_eq!(body["field_errors"]["country"], "This field is required");

    let (status, body) = app
        .send(Method::PATCH, &uri, Some(&token), Some(json!({"type": "others", "others": {"value": "x"}})))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Please provide all required fields for others type.");
    assert!(body["field_errors"].get("value").is_none());

    // Nothing above reached the store
    assert_eq!(app.contacts().find_by_id(&contact.id).await?, Some(contact));
    Ok(())
}

#[tokio::test]
async fn unparsable_body_is_400() -> Result<()> {
    let app = TestApp::new();
    let contact = app.seed_contact(Contact::with_address(sample_address())).await?;

    let (status, body) = app
        .send_raw(
            Method::PUT,
            &format!("/contact/{}", contact.id),
            Some(&bearer(None)),
            Some("application/json"),
            "{\"type\": ".to_string(),
        )
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_JSON");
    assert_eq!(app.contacts().find_by_id(&contact.id).await?, Some(contact));
    Ok(())
}

#[tokio::test]
async fn body_without_json_content_type_is_415() -> Result<()> {
    let app = TestApp::new();
    let contact = app.seed_contact(Contact::with_address(sample_address())).await?;
    let uri = format!("/contact/{}", contact.id);

    let (status, body) = app.send(Method::PUT, &uri, Some(&bearer(None)), None).await?;
    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(body["code"], "UNSUPPORTED_MEDIA_TYPE");
    assert!(body["message"].is_string());

    let (status, _) = app
        .send_raw(Method::PATCH, &uri, Some(&bearer(None)), Some("text/plain"), others_body().to_string())
        .await?;
    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(app.contacts().find_by_id(&contact.id).await?, Some(contact));
    Ok(())
}

#[tokio::test]
async fn oversized_body_is_413() -> Result<()> {
    let mut config = AppConfig::for_testing(SECRET);
    config.api.max_request_size_bytes = 64;
    let app = TestApp::with_config(config);
    let contact = app.seed_contact(Contact::with_address(sample_address())).await?;

    let mut body = others_body();
    body["others"]["value"] = json!("x".repeat(256));
    let (status, resp) = app
        .send(Method::PUT, &format!("/contact/{}", contact.id), Some(&bearer(None)), Some(body))
        .await?;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(resp["code"], "PAYLOAD_TOO_LARGE");
    assert_eq!(app.contacts().find_by_id(&contact.id).await?, Some(contact));
    Ok(())
}

#[tokio::test]
async fn update_unknown_contact_is_404() -> Result<()> {
    let app = TestApp::new();
    let (status, body) = app
        .send(
            Method::PUT,
            &format!("/contact/{}", ObjectId::new()),
            Some(&bearer(None)),
            Some(others_body()),
        )
        .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Contact does not exist");
    assert_eq!(app.store.len("contacts").await, 0);
    Ok(())
}

#[tokio::test]
async fn delete_twice_reports_not_found_second_time() -> Result<()> {
    let app = TestApp::new();
    let contact = app.seed_contact(Contact::with_others(sample_others())).await?;
    let other = app.seed_contact(Contact::with_address(sample_address())).await?;
    let uri = format!("/contact/{}", contact.id);

    let (status, body) = app.send(Method::DELETE, &uri, Some(&bearer(None)), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Contact deleted successfully");
    assert_eq!(body["data"]["_id"], contact.id.to_hex());
    assert_eq!(app.store.len("contacts").await, 1);

    let (status, body) = app.send(Method::DELETE, &uri, Some(&bearer(None)), None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Contact does not exist");

    assert_eq!(app.store.len("contacts").await, 1);
    assert_eq!(app.contacts().find_by_id(&other.id).await?, Some(other));
    Ok(())
}
