//! Scheme classification over the wire: anonymous, unknown and bearer requests.

#[cfg(test)]
mod tests {
    use crate::{TEST_TOKEN, endpoint_url, http_client};

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_report_healthy() {
        let resp = http_client()
            .get(format!("{}/_health", endpoint_url()))
            .send()
            .await
            .unwrap();

        assert_eq!(resp.status(), reqwest::StatusCode::OK);
        assert_eq!(
            resp.headers().get("server").and_then(|v| v.to_str().ok()),
            Some("BucketGuard")
        );
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_forward_anonymous_request() {
        let resp = http_client()
            .get(format!("{}/bucket/public.txt", endpoint_url()))
            .send()
            .await
            .unwrap();

        assert_eq!(resp.status(), reqwest::StatusCode::OK);
        assert!(resp.headers().contains_key("x-amz-request-id"));
        let json: serde_json::Value = resp.json().await.unwrap();
        assert_eq!(json["authType"], "anonymous");
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_reject_basic_auth_with_xml_error() {
        let resp = http_client()
            .get(format!("{}/bucket/key", endpoint_url()))
            .header("Authorization", "Basic dXNlcjpwYXNz")
            .send()
            .await
            .unwrap();

        assert_eq!(resp.status(), reqwest::StatusCode::BAD_REQUEST);
        assert_eq!(
            resp.headers()
                .get("content-type")
                .and_then(|v| v.to_str().ok()),
            Some("application/xml")
        );
        let body = resp.text().await.unwrap();
        assert!(body.contains("<Code>SignatureVersionNotSupported</Code>"));
        assert!(body.contains("<Resource>/bucket/key</Resource>"));
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_reject_invalid_bearer_token() {
        let resp = http_client()
            .get(format!("{}/bucket/key", endpoint_url()))
            .header("Authorization", "Bearer abc.def.ghi")
            .send()
            .await
            .unwrap();

        assert_eq!(resp.status(), reqwest::StatusCode::UNAUTHORIZED);
        assert!(resp.bytes().await.unwrap().is_empty());
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_forward_valid_bearer_token() {
        let resp = http_client()
            .get(format!("{}/bucket/key", endpoint_url()))
            .header("Authorization", format!("Bearer {TEST_TOKEN}"))
            .send()
            .await
            .unwrap();

        assert_eq!(resp.status(), reqwest::StatusCode::OK);
        let json: serde_json::Value = resp.json().await.unwrap();
        assert_eq!(json["authType"], "token");
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_forward_multipart_post_policy() {
        let resp = http_client()
            .post(format!("{}/bucket", endpoint_url()))
            .header("Content-Type", "multipart/form-data; boundary=xyz")
            .body("--xyz--\r\n")
            .send()
            .await
            .unwrap();

        assert_eq!(resp.status(), reqwest::StatusCode::OK);
        let json: serde_json::Value = resp.json().await.unwrap();
        assert_eq!(json["authType"], "post-policy");
    }
}
