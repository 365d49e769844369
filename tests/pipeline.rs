// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Integration tests for the authenticated request pipeline using wiremock.

use std::sync::Arc;

use cloudlink_lib::auth::Authenticator;
use cloudlink_lib::config::{BridgeConfig, Endpoints, RecoveryPolicy};
use cloudlink_lib::protocol::{ApiRequest, Pipeline};
use cloudlink_lib::session::{Credential, Session};
use cloudlink_lib::{CommunicationError, Error, Vendor};
use serde_json::{Value, json};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn envi_pipeline(server: &MockServer) -> Pipeline {
    let config = BridgeConfig::new(Vendor::Envi, "me@example.com", "secret")
        .with_endpoints(Endpoints::local(&server.uri()));
    let http = reqwest::Client::new();
    let authenticator = Authenticator::for_config(&config).unwrap();
    let session = Session::new(http.clone(), authenticator, RecoveryPolicy::FullLogin);
    Pipeline::new(http, Arc::new(session))
}

fn list_request(server: &MockServer) -> ApiRequest {
    let url = Endpoints::local(&server.uri()).envi("device/list").unwrap();
    ApiRequest::get(url)
}

async fn mount_login(server: &MockServer, token: &str, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path("/envi/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success",
            "data": { "token": token }
        })))
        .expect(expected_calls)
        .mount(server)
        .await;
}

mod login {
    use super::*;
    use wiremock::matchers::body_string_contains;

    #[tokio::test]
    async fn first_request_logs_in_and_carries_token() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/envi/auth/login"))
            .and(header("content-type", "application/x-www-form-urlencoded"))
            .and(body_string_contains("username=me%40example.com"))
            .and(body_string_contains("login_type=1"))
            .and(body_string_contains("device_type=ios"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "token": "T1" }
            })))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/envi/device/list"))
            .and(header("authorization", "Bearer T1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [] })))
            .expect(2)
            .mount(&server)
            .await;

        let pipeline = envi_pipeline(&server);
        let request = list_request(&server);

        let devices: Vec<Value> = pipeline.send_json(&request, "device list").await.unwrap();
        assert!(devices.is_empty());
        // Token is reused.
        let _: Vec<Value> = pipeline.send_json(&request, "device list").await.unwrap();

        let credential = pipeline.session().credential();
        assert_eq!(credential.access_token(), "T1");
        assert!(credential.issued_implicitly());
        assert_eq!(pipeline.session().login_count(), 1);
    }

    #[tokio::test]
    async fn rejected_login_is_an_authentication_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/envi/auth/login"))
            .respond_with(ResponseTemplate::new(422).set_body_string("bad credentials"))
            .mount(&server)
            .await;

        let pipeline = envi_pipeline(&server);
        let err = pipeline.send(&list_request(&server)).await.unwrap_err();
        assert!(matches!(err, Error::Authentication(_)), "got {err}");
        assert!(!pipeline.session().credential().has_access_token());
    }

    #[tokio::test]
    async fn malformed_login_envelope_is_an_authentication_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/envi/auth/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token": "T1" })))
            .mount(&server)
            .await;

        let pipeline = envi_pipeline(&server);
        let err = pipeline.send(&list_request(&server)).await.unwrap_err();
        assert!(matches!(err, Error::Authentication(_)), "got {err}");
    }
}

mod retry {
    use super::*;

    #[tokio::test]
    async fn unauthorized_triggers_one_login_and_one_retry() {
        let server = MockServer::start().await;
        mount_login(&server, "fresh", 1).await;

        Mock::given(method("GET"))
            .and(path("/envi/device/list"))
            .and(header("authorization", "Bearer stale"))
            .respond_with(ResponseTemplate::new(401))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/envi/device/list"))
            .and(header("authorization", "Bearer fresh"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [] })))
            .expect(1)
            .mount(&server)
            .await;

        let pipeline = envi_pipeline(&server);
        pipeline.session().replace(Credential::implicit("stale"));

        let response = pipeline.send(&list_request(&server)).await.unwrap();
        assert_eq!(response.status(), 200);
        assert_eq!(pipeline.session().credential().access_token(), "fresh");
        assert_eq!(pipeline.session().login_count(), 1);
    }

    #[tokio::test]
    async fn second_unauthorized_surfaces_authorization_error() {
        let server = MockServer::start().await;
        mount_login(&server, "also-rejected", 1).await;

        Mock::given(method("GET"))
            .and(path("/envi/device/list"))
            .respond_with(ResponseTemplate::new(401))
            .expect(2)
            .mount(&server)
            .await;

        let pipeline = envi_pipeline(&server);
        pipeline.session().replace(Credential::implicit("stale"));

        let err = pipeline.send(&list_request(&server)).await.unwrap_err();
        assert!(matches!(err, Error::Authorization), "got {err}");
        assert_eq!(pipeline.session().login_count(), 1);
    }

    #[tokio::test]
    async fn bad_request_unauthenticated_behaves_like_401() {
        let server = MockServer::start().await;
        mount_login(&server, "fresh", 1).await;

        Mock::given(method("GET"))
            .and(path("/envi/device/list"))
            .and(header("authorization", "Bearer stale"))
            .respond_with(
                ResponseTemplate::new(400).set_body_json(json!({ "message": "Unauthenticated." })),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/envi/device/list"))
            .and(header("authorization", "Bearer fresh"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [] })))
            .expect(1)
            .mount(&server)
            .await;

        let pipeline = envi_pipeline(&server);
        pipeline.session().replace(Credential::implicit("stale"));

        let devices: Vec<Value> = pipeline
            .send_json(&list_request(&server), "device list")
            .await
            .unwrap();
        assert!(devices.is_empty());
    }

    #[tokio::test]
    async fn other_bad_request_is_not_retried() {
        let server = MockServer::start().await;
        mount_login(&server, "fresh", 0).await;

        Mock::given(method("GET"))
            .and(path("/envi/device/list"))
            .respond_with(
                ResponseTemplate::new(400).set_body_json(json!({ "message": "invalid page" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let pipeline = envi_pipeline(&server);
        pipeline.session().replace(Credential::implicit("valid"));

        let err = pipeline.send(&list_request(&server)).await.unwrap_err();
        assert!(
            matches!(
                err,
                Error::Communication(CommunicationError::Status { status: 400, .. })
            ),
            "got {err}"
        );
    }

    #[tokio::test]
    async fn server_error_is_a_status_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/envi/device/list"))
            .respond_with(ResponseTemplate::new(503))
            .expect(1)
            .mount(&server)
            .await;

        let pipeline = envi_pipeline(&server);
        pipeline.session().replace(Credential::implicit("valid"));

        let err = pipeline.send(&list_request(&server)).await.unwrap_err();
        match err {
            Error::Communication(CommunicationError::Status { status, url }) => {
                assert_eq!(status, 503);
                assert!(url.ends_with("/envi/device/list"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn malformed_envelope_is_a_protocol_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/envi/device/list"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "devices": [] })))
            .mount(&server)
            .await;

        let pipeline = envi_pipeline(&server);
        pipeline.session().replace(Credential::implicit("valid"));

        let err = pipeline
            .send_json::<Vec<Value>>(&list_request(&server), "device list")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Protocol(_)), "got {err}");
        assert!(err.to_string().contains("device list"));
    }
}

mod concurrency {
    use std::time::Duration;

    use super::*;

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_unauthorized_requests_share_one_login() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/envi/auth/login"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "data": { "token": "fresh" } }))
                    .set_delay(Duration::from_millis(200)),
            )
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/envi/device/list"))
            .and(header("authorization", "Bearer fresh"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [] })))
            .with_priority(1)
            .mount(&server)
            .await;
        // Stale or missing token.
        Mock::given(method("GET"))
            .and(path("/envi/device/list"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let pipeline = envi_pipeline(&server);
        pipeline.session().replace(Credential::implicit("stale"));
        let request = list_request(&server);

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let pipeline = pipeline.clone();
                let request = request.clone();
                tokio::spawn(async move { pipeline.send(&request).await.map(|r| r.status()) })
            })
            .collect();

        for task in tasks {
            let status = task.await.unwrap().unwrap();
            assert_eq!(status, 200);
        }
        assert_eq!(pipeline.session().login_count(), 1);
        assert_eq!(pipeline.session().credential().access_token(), "fresh");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_requests_share_one_failed_login() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/envi/auth/login"))
            .respond_with(ResponseTemplate::new(503).set_delay(Duration::from_millis(200)))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/envi/device/list"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let pipeline = envi_pipeline(&server);
        pipeline.session().replace(Credential::implicit("stale"));
        let request = list_request(&server);

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let pipeline = pipeline.clone();
                let request = request.clone();
                tokio::spawn(async move { pipeline.send(&request).await.map(|r| r.status()) })
            })
            .collect();

        let mut shared = 0;
        for task in tasks {
            let err = task.await.unwrap().unwrap_err();
            match err {
                Error::Authentication(_) => {}
                Error::RenewalFailed(reason) => {
                    assert!(reason.contains("authentication failed"), "got {reason}");
                    shared += 1;
                }
                other => panic!("unexpected error: {other}"),
            }
        }
        assert_eq!(shared, 7);
        assert_eq!(pipeline.session().login_count(), 1);
        assert!(!pipeline.session().credential().has_access_token());
    }

    #[tokio::test]
    async fn login_is_retried_after_a_failed_attempt_completes() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/envi/auth/login"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(1)
            .with_priority(1)
            .mount(&server)
            .await;
        mount_login(&server, "fresh", 1).await;
        Mock::given(method("GET"))
            .and(path("/envi/device/list"))
            .and(header("authorization", "Bearer fresh"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [] })))
            .expect(1)
            .mount(&server)
            .await;

        let pipeline = envi_pipeline(&server);
        let request = list_request(&server);

        let err = pipeline.send(&request).await.unwrap_err();
        assert!(matches!(err, Error::Authentication(_)), "got {err}");

        let response = pipeline.send(&request).await.unwrap();
        assert_eq!(response.status(), 200);
        assert_eq!(pipeline.session().login_count(), 2);
    }
}
