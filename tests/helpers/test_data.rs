//! Test data generators and sample payloads

use serde_json::{json, Value};
use uuid::Uuid;
use mp_tourify::config::{Settings, StorageConfig};

pub const TEST_JWT_SECRET: &str = "tourify-test-secret-that-is-long-enough";
pub const TEST_PASSWORD: &str = "correct-horse-42";
pub const ADMIN_EMAIL: &str = "admin@mptourify.test";
pub const RTC_EMAIL: &str = "rtc@mptourify.test";

/// Settings for tests: cheap hashing and a generous login limit
pub fn test_settings() -> Settings {
    let mut settings = Settings::default();
    settings.auth.jwt_secret = TEST_JWT_SECRET.to_string();
    settings.auth.password_cost = 4;
    settings.auth.login_attempts_per_minute = 100;
    settings
}

pub fn test_settings_with_storage(storage: StorageConfig) -> Settings {
    let mut settings = test_settings();
    settings.storage = Some(storage);
    settings
}

pub fn district_body(name: &str) -> Value {
    json!({
        "name": name,
        "description": format!("{} district", name),
        "headquarters": name,
        "isFeatured": false,
    })
}

pub fn panchayat_body(name: &str, district_id: Uuid) -> Value {
    json!({
        "name": name,
        "districtId": district_id,
        "block": "Block A",
        "description": "Village known for handloom",
        "population": 4200,
        "latitude": 23.25,
        "longitude": 77.41,
    })
}

pub fn media_body(title: &str, district_id: Option<Uuid>, panchayat_id: Option<Uuid>) -> Value {
    json!({
        "title": title,
        "fileUrl": format!("https://cdn.example.org/image/{}.jpg", Uuid::new_v4()),
        "fileType": "image",
        "districtId": district_id,
        "gramPanchayatId": panchayat_id,
        "tags": ["Heritage", " heritage ", "Craft"],
    })
}

pub fn news_body(title: &str) -> Value {
    json!({
        "title": title,
        "summary": "Short summary",
        "content": "Full story about rural tourism in Madhya Pradesh.",
        "tags": ["festival"],
    })
}

pub fn contact_body() -> Value {
    json!({
        "name": "Asha Verma",
        "email": "Asha@Example.org",
        "phone": "+91 98765 43210",
        "subject": "Homestay enquiry",
        "message": "Are homestays in Chanderi open during the monsoon?",
    })
}

/// Pull a uuid field out of a JSON response
pub fn id_of(value: &Value) -> Uuid {
    value["id"]
        .as_str()
        .and_then(|id| id.parse().ok())
        .expect("response has no id")
}
