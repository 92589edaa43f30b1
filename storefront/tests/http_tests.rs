// tests/http_tests.rs
mod common;
use common::*;

use actix_web::cookie::Cookie;
use actix_web::dev::ServiceResponse;
use actix_web::http::{header, StatusCode};
use actix_web::test;
use serde_json::{json, Value};
use storefront::session::SESSION_COOKIE;

const BOUNDARY: &str = "storefront-test-boundary";

fn session_cookie<B>(resp: &ServiceResponse<B>) -> Option<Cookie<'static>> {
  resp
    .response()
    .cookies()
    .find(|c| c.name() == SESSION_COOKIE)
    .map(|c| c.into_owned())
}

fn location<B>(resp: &ServiceResponse<B>) -> &str {
  resp
    .headers()
    .get(header::LOCATION)
    .and_then(|v| v.to_str().ok())
    .unwrap_or_default()
}

fn flash_messages(page: &Value) -> Vec<String> {
  page["flashes"]
    .as_array()
    .map(|flashes| {
      flashes
        .iter()
        .filter_map(|f| f["message"].as_str().map(str::to_string))
        .collect()
    })
    .unwrap_or_default()
}

fn multipart_body(fields: &[(&str, &str)], file: Option<(&str, &[u8])>) -> Vec<u8> {
  let mut body = Vec::new();
  for (name, value) in fields {
    body.extend_from_slice(
      format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
      )
      .as_bytes(),
    );
  }
  if let Some((filename, bytes)) = file {
    body.extend_from_slice(
      format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
      )
      .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(b"\r\n");
  }
  body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
  body
}

#[actix_rt::test]
async fn test_health_check() {
  let env = TestEnv::new().await;
  let app = storefront_app!(env.state.clone());

  let resp = test::call_service(&app, test::TestRequest::get().uri("/health").to_request()).await;
  assert_eq!(resp.status(), StatusCode::OK);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body, json!({ "status": "ok" }));
}

#[actix_rt::test]
async fn test_register_logs_in_and_flashes() {
  let env = TestEnv::new().await;
  let app = storefront_app!(env.state.clone());

  let req = test::TestRequest::post()
    .uri("/register")
    .set_form([
      ("username", "marta"),
      ("email", "marta@example.com"),
      ("password", "freestyle"),
      ("role", "user"),
    ])
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::SEE_OTHER);
  assert_eq!(location(&resp), "/");
  let cookie = session_cookie(&resp).expect("a session cookie");

  let req = test::TestRequest::get().uri("/").cookie(cookie.clone()).to_request();
  let page: Value = test::call_and_read_body_json(&app, req).await;
  assert_eq!(page["template"], "index.html");
  assert_eq!(page["current_user"]["username"], "marta");
  assert_eq!(flash_messages(&page), vec!["Registration was successful!"]);

  // Flashes are read once.
  let req = test::TestRequest::get().uri("/").cookie(cookie).to_request();
  let page: Value = test::call_and_read_body_json(&app, req).await;
  assert!(flash_messages(&page).is_empty());
}

#[actix_rt::test]
async fn test_duplicate_email_rerenders_register_form() {
  let env = TestEnv::new().await;
  env.user("marta").await;
  let app = storefront_app!(env.state.clone());

  let req = test::TestRequest::post()
    .uri("/register")
    .set_form([
      ("username", "someone"),
      ("email", "marta@example.com"),
      ("password", "pw"),
      ("role", "user"),
    ])
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::CONFLICT);
  let page: Value = test::read_body_json(resp).await;
  assert_eq!(page["template"], "register.html");
  assert_eq!(flash_messages(&page), vec!["Email is already registered!"]);
  assert_eq!(page["context"]["form"]["username"], "someone");
  assert!(page["context"]["form"].get("password").is_none());
}

#[actix_rt::test]
async fn test_login_required_redirects_with_flash() {
  let env = TestEnv::new().await;
  let app = storefront_app!(env.state.clone());

  let resp = test::call_service(&app, test::TestRequest::get().uri("/cart").to_request()).await;
  assert_eq!(resp.status(), StatusCode::SEE_OTHER);
  assert_eq!(location(&resp), "/login");
  let cookie = session_cookie(&resp).expect("a session cookie");

  let req = test::TestRequest::get().uri("/login").cookie(cookie).to_request();
  let page: Value = test::call_and_read_body_json(&app, req).await;
  assert_eq!(page["template"], "login.html");
  assert_eq!(flash_messages(&page), vec!["Please log in to access this page."]);
}

#[actix_rt::test]
async fn test_forged_session_cookie_is_ignored() {
  let env = TestEnv::new().await;
  let app = storefront_app!(env.state.clone());

  let forged = Cookie::new(SESSION_COOKIE, "not-a-signed-session");
  let req = test::TestRequest::get().uri("/cart").cookie(forged).to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::SEE_OTHER);
  assert!(session_cookie(&resp).is_some(), "a fresh session is issued");
}

#[actix_rt::test]
async fn test_cookieless_reads_store_no_session() {
  let env = TestEnv::new().await;
  env.product("MP cap", 50, None).await;
  let app = storefront_app!(env.state.clone());

  for uri in ["/health", "/", "/shop", "/about-us"] {
    let resp = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK, "{}", uri);
    assert!(session_cookie(&resp).is_none(), "{} should not issue a cookie", uri);
  }
  assert_eq!(env.state.sessions.len(), 0);
}

#[actix_rt::test]
async fn test_login_replaces_a_session_issued_before_it() {
  let env = TestEnv::new().await;
  env.user("ana").await;
  let app = storefront_app!(env.state.clone());

  // An anonymous visit that gets a session, e.g. one handed to the victim.
  let resp = test::call_service(&app, test::TestRequest::get().uri("/cart").to_request()).await;
  let planted = session_cookie(&resp).expect("a session cookie");

  let req = test::TestRequest::post()
    .uri("/login")
    .cookie(planted.clone())
    .set_form([("username", "ana"), ("password", TEST_PASSWORD)])
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::SEE_OTHER);
  let fresh = session_cookie(&resp).expect("login issues a new cookie");
  assert_ne!(fresh.value(), planted.value());

  let req = test::TestRequest::get().uri("/").cookie(planted).to_request();
  let page: Value = test::call_and_read_body_json(&app, req).await;
  assert_eq!(page["current_user"], Value::Null);

  let req = test::TestRequest::get().uri("/").cookie(fresh).to_request();
  let page: Value = test::call_and_read_body_json(&app, req).await;
  assert_eq!(page["current_user"]["username"], "ana");
  assert_eq!(env.state.sessions.len(), 1);
}

/// Logs in through the form and returns the session cookie, with the login
/// flash already drained.
macro_rules! login_cookie {
  ($app:expr, $identifier:expr, $password:expr) => {{
    let req = test::TestRequest::post()
      .uri("/login")
      .set_form([("username", $identifier), ("password", $password)])
      .to_request();
    let resp = test::call_service($app, req).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER, "login should succeed");
    let cookie = session_cookie(&resp).expect("a session cookie");
    let req = test::TestRequest::get().uri("/").cookie(cookie.clone()).to_request();
    test::call_service($app, req).await;
    cookie
  }};
}

#[actix_rt::test]
async fn test_cart_flow() {
  let env = TestEnv::new().await;
  env.user("ana").await;
  let goggles = env.product("MP XCEED", 100, None).await;
  let cap = env.product("MP cap", 50, None).await;
  let app = storefront_app!(env.state.clone());
  let cookie = login_cookie!(&app, "ana", TEST_PASSWORD);

  let req = test::TestRequest::get()
    .uri(&format!("/add_to_cart/{}", goggles.id))
    .insert_header((header::REFERER, "/details/1"))
    .cookie(cookie.clone())
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::SEE_OTHER);
  assert_eq!(location(&resp), "/details/1");

  let product_id = goggles.id.to_string();
  let req = test::TestRequest::post()
    .uri("/cart")
    .set_form([("product_id", product_id.as_str())])
    .cookie(cookie.clone())
    .to_request();
  assert_eq!(location(&test::call_service(&app, req).await), "/cart");

  let cap_id = cap.id.to_string();
  let req = test::TestRequest::post()
    .uri("/cart")
    .set_form([("product_id", cap_id.as_str())])
    .cookie(cookie.clone())
    .to_request();
  test::call_service(&app, req).await;

  let req = test::TestRequest::get().uri("/cart").cookie(cookie.clone()).to_request();
  let page: Value = test::call_and_read_body_json(&app, req).await;
  assert_eq!(page["template"], "cart.html");
  assert_eq!(page["context"]["total_cart_price"], 250);
  assert_eq!(page["context"]["cart_items"].as_array().unwrap().len(), 2);
  assert_eq!(
    flash_messages(&page),
    vec!["Item added to cart", "Item quantity updated", "Item added to cart"]
  );

  let req = test::TestRequest::post()
    .uri(&format!("/remove_from_cart/{}", cap.id))
    .cookie(cookie.clone())
    .to_request();
  test::call_service(&app, req).await;
  let req = test::TestRequest::post()
    .uri(&format!("/remove_from_cart/{}", cap.id))
    .cookie(cookie.clone())
    .to_request();
  test::call_service(&app, req).await;

  let req = test::TestRequest::get().uri("/cart").cookie(cookie).to_request();
  let page: Value = test::call_and_read_body_json(&app, req).await;
  assert_eq!(page["context"]["total_cart_price"], 200);
  assert_eq!(
    flash_messages(&page),
    vec!["Item removed from cart", "Item not found in cart"]
  );
}

#[actix_rt::test]
async fn test_like_product_api() {
  let env = TestEnv::new().await;
  env.user("ana").await;
  let cap = env.product("MP cap", 50, None).await;
  let app = storefront_app!(env.state.clone());

  let req = test::TestRequest::post()
    .uri("/like_product")
    .set_json(json!({ "product_id": cap.id }))
    .to_request();
  assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);

  let cookie = login_cookie!(&app, "ana", TEST_PASSWORD);
  let like = |product_id: i64| {
    test::TestRequest::post()
      .uri("/like_product")
      .set_json(json!({ "product_id": product_id }))
      .cookie(cookie.clone())
      .to_request()
  };

  let body: Value = test::call_and_read_body_json(&app, like(cap.id)).await;
  assert_eq!(body, json!({ "message": "Product liked", "liked": true }));
  let body: Value = test::call_and_read_body_json(&app, like(cap.id)).await;
  assert_eq!(body, json!({ "message": "Product unliked", "liked": false }));

  let resp = test::call_service(&app, like(cap.id + 100)).await;
  assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body, json!({ "error": "Product not found" }));
}

#[actix_rt::test]
async fn test_admin_pages_are_forbidden_for_regular_users() {
  let env = TestEnv::new().await;
  env.user("ana").await;
  let cap = env.product("MP cap", 50, None).await;
  let app = storefront_app!(env.state.clone());
  let cookie = login_cookie!(&app, "ana", TEST_PASSWORD);

  for uri in ["/addproduct".to_string(), "/uploadfile".to_string(), format!("/edit/{}", cap.id), format!("/delete/{}", cap.id)] {
    let req = test::TestRequest::get().uri(&uri).cookie(cookie.clone()).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN, "{}", uri);
  }
  assert_eq!(env.count("products").await, 1);
}

#[actix_rt::test]
async fn test_admin_uploads_product_and_image_is_served() {
  let env = TestEnv::new().await;
  let caps = env.category("Caps").await;
  let app = storefront_app!(env.state.clone());

  let req = test::TestRequest::post()
    .uri("/register")
    .set_form([
      ("username", "coach"),
      ("email", "coach@example.com"),
      ("password", ADMIN_SECRET),
      ("role", "admin"),
    ])
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::SEE_OTHER);
  let cookie = session_cookie(&resp).expect("a session cookie");

  let category_id = caps.id.to_string();
  let body = multipart_body(
    &[("name", "Silicone cap"), ("price", "25"), ("category", category_id.as_str())],
    Some(("silicone cap.png", &b"\x89PNG fake image"[..])),
  );
  let req = test::TestRequest::post()
    .uri("/addproduct")
    .insert_header((header::CONTENT_TYPE, format!("multipart/form-data; boundary={}", BOUNDARY)))
    .cookie(cookie.clone())
    .set_payload(body)
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::SEE_OTHER);
  assert_eq!(location(&resp), "/shop");

  let req = test::TestRequest::get().uri("/shop?q=Silicone").cookie(cookie).to_request();
  let page: Value = test::call_and_read_body_json(&app, req).await;
  assert_eq!(page["context"]["products"][0]["file"], "/static/silicone_cap.png");

  let resp = test::call_service(&app, test::TestRequest::get().uri("/static/silicone_cap.png").to_request()).await;
  assert_eq!(resp.status(), StatusCode::OK);
  assert_eq!(resp.headers().get(header::CONTENT_TYPE).unwrap(), "image/png");
  assert_eq!(test::read_body(resp).await.as_ref(), b"\x89PNG fake image");
}

#[actix_rt::test]
async fn test_admin_form_errors_are_reported() {
  let env = TestEnv::new().await;
  env.admin("coach").await;
  let app = storefront_app!(env.state.clone());
  let cookie = login_cookie!(&app, "coach", TEST_PASSWORD);

  let body = multipart_body(&[("name", "X"), ("price", "lots")], None);
  let req = test::TestRequest::post()
    .uri("/uploadfile")
    .insert_header((header::CONTENT_TYPE, format!("multipart/form-data; boundary={}", BOUNDARY)))
    .cookie(cookie)
    .set_payload(body)
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  let page: Value = test::read_body_json(resp).await;
  assert_eq!(page["template"], "addproduct.html");
  let fields: Vec<_> = page["errors"]
    .as_array()
    .unwrap()
    .iter()
    .map(|e| e["field"].as_str().unwrap().to_string())
    .collect();
  assert_eq!(fields, vec!["name", "price", "category", "file"]);
  assert_eq!(env.count("products").await, 0);
}

#[actix_rt::test]
async fn test_delete_in_cart_product_is_a_conflict() {
  let env = TestEnv::new().await;
  env.admin("coach").await;
  let swimmer = env.user("swimmer").await;
  let cap = env.product("MP cap", 50, None).await;
  let suit = env.product("MP Tech suit", 200, None).await;
  env.put_in_cart(&swimmer, &cap).await;
  let app = storefront_app!(env.state.clone());
  let cookie = login_cookie!(&app, "coach", TEST_PASSWORD);

  let req = test::TestRequest::get()
    .uri(&format!("/delete/{}", cap.id))
    .cookie(cookie.clone())
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::CONFLICT);
  let body: Value = test::read_body_json(resp).await;
  assert!(body["error"].as_str().unwrap().contains("probably someone has it in cart"));

  let req = test::TestRequest::get()
    .uri(&format!("/delete/{}", suit.id))
    .cookie(cookie)
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::SEE_OTHER);
  assert_eq!(location(&resp), "/shop");
  assert_eq!(env.count("products").await, 1);
}

#[actix_rt::test]
async fn test_catalog_pages() {
  let env = TestEnv::new().await;
  let caps = env.category("Caps").await;
  let cap = env.product("MP cap", 50, Some(caps.id)).await;
  let app = storefront_app!(env.state.clone());

  let req = test::TestRequest::get().uri(&format!("/category/{}", caps.id)).to_request();
  let page: Value = test::call_and_read_body_json(&app, req).await;
  assert_eq!(page["template"], "shop.html");
  assert_eq!(page["context"]["category"]["name"], "Caps");
  assert_eq!(page["current_user"], Value::Null);

  let req = test::TestRequest::get().uri(&format!("/details/{}", cap.id)).to_request();
  let page: Value = test::call_and_read_body_json(&app, req).await;
  assert_eq!(page["context"]["product"]["name"], "MP cap");

  for uri in ["/details/999", "/category/999", "/static/missing.png"] {
    let resp = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{}", uri);
  }

  for (uri, template) in [("/charity", "charity.html"), ("/about-us", "about.html")] {
    let page: Value = test::call_and_read_body_json(&app, test::TestRequest::get().uri(uri).to_request()).await;
    assert_eq!(page["template"], template);
  }
}
