//! SigV4 header and presigned URL requests produced by the AWS SDK.

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use aws_sdk_s3::presigning::PresigningConfig;
    use aws_sdk_s3::primitives::ByteStream;

    use crate::{http_client, s3_client, s3_client_with_secret, test_key};

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_accept_sdk_signed_put() {
        let client = s3_client();

        let result = client
            .put_object()
            .bucket("guarded")
            .key(test_key("put"))
            .body(ByteStream::from_static(b"signed payload"))
            .send()
            .await;

        assert!(result.is_ok(), "signed put should pass: {result:?}");
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_report_signed_get() {
        let client = s3_client();

        let resp = client
            .get_object()
            .bucket("guarded")
            .key(test_key("get"))
            .send()
            .await
            .unwrap();

        let body = resp.body.collect().await.unwrap().into_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["authType"], "signed");
        assert_eq!(json["method"], "GET");
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_reject_wrong_secret() {
        let client = s3_client_with_secret("not-the-secret");

        let result = client
            .put_object()
            .bucket("guarded")
            .key(test_key("forged"))
            .body(ByteStream::from_static(b"forged"))
            .send()
            .await;

        let err = result.expect_err("wrong secret should be rejected");
        let status = err.raw_response().map(|r| r.status().as_u16());
        assert_eq!(status, Some(403));
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_accept_presigned_url() {
        let client = s3_client();
        let presigned = client
            .get_object()
            .bucket("guarded")
            .key(test_key("presigned"))
            .presigned(PresigningConfig::expires_in(Duration::from_secs(300)).unwrap())
            .await
            .unwrap();

        let resp = http_client().get(presigned.uri()).send().await.unwrap();

        assert_eq!(resp.status(), reqwest::StatusCode::OK);
        let json: serde_json::Value = resp.json().await.unwrap();
        assert_eq!(json["authType"], "presigned");
    }
}
