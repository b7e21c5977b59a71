use aws_config::BehaviorVersion;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::primitives::ByteStream;
use retroinsta_common::errors::RetroInstaError;
use std::env;
use uuid::Uuid;

/**
 * Thin wrapper over S3-compatible object storage (MinIO locally, hosted S3
 * in production). Uploads one object per image and hands back a URL the
 * client can resolve directly.
 */
pub struct MediaStore {
    client: aws_sdk_s3::Client,
    bucket: String,
    public_host: String,
    path_style: bool,
}

/// Replace everything outside [A-Za-z0-9.-_] so the original filename can
/// survive inside an object key
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Object key shape: `{uuid}-{sanitized basename}{ext}`
pub fn object_key(original_filename: &str) -> String {
    let sanitized = sanitize_filename(original_filename);
    let (base, ext) = match sanitized.rfind('.') {
        Some(index) if index > 0 => sanitized.split_at(index),
        _ => (sanitized.as_str(), ""),
    };
    format!("{}-{}{}", Uuid::new_v4(), base, ext)
}

/// Hosted deployments expose objects at the host root; local MinIO uses
/// path-style URLs that include the bucket
pub fn format_public_url(host: &str, bucket: &str, key: &str, path_style: bool) -> String {
    if path_style {
        format!("{}/{}/{}", host, bucket, key)
    } else {
        format!("{}/{}", host, key)
    }
}

impl MediaStore {
    /**
     * Builds the storage client from the environment. A missing bucket is
     * fatal here, at startup, rather than on the first upload.
     */
    pub async fn init() -> Result<Self, RetroInstaError> {
        let bucket = env::var("MEDIA_BUCKET")
            .map_err(|_| RetroInstaError::StorageError(String::from("MEDIA_BUCKET is not set")))?;
        let public_host = env::var("STORAGE_PUBLIC_HOST")
            .unwrap_or_else(|_| String::from("http://localhost:9000"));
        let region = env::var("STORAGE_REGION").unwrap_or_else(|_| String::from("us-east-1"));
        let path_style = env::var("STORAGE_PATH_STYLE")
            .map(|v| v != "false")
            .unwrap_or(true);

        let mut loader = aws_config::defaults(BehaviorVersion::latest()).region(Region::new(region));
        if let Ok(endpoint) = env::var("STORAGE_ENDPOINT") {
            loader = loader.endpoint_url(endpoint);
        }
        let sdk_config = loader.load().await;
        let mut builder = aws_sdk_s3::config::Builder::from(&sdk_config);
        if path_style {
            builder = builder.force_path_style(true);
        }
        let client = aws_sdk_s3::Client::from_conf(builder.build());

        Ok(Self {
            client,
            bucket,
            public_host,
            path_style,
        })
    }

    /**
     * Write the image bytes under a fresh object key and return the public
     * URL recorded on the post. Storage errors propagate unmodified.
     */
    pub async fn store_image(
        &self,
        bytes: Vec<u8>,
        original_filename: &str,
        content_type: &str,
    ) -> Result<String, RetroInstaError> {
        let key = object_key(original_filename);
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(ByteStream::from(bytes))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| RetroInstaError::StorageError(e.to_string()))?;
        tracing::info!(key = %key, bucket = %self.bucket, "stored image");
        Ok(format_public_url(
            &self.public_host,
            &self.bucket,
            &key,
            self.path_style,
        ))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn sanitization_keeps_safe_chars_only() {
        assert_eq!(sanitize_filename("my cat pic.png"), "my_cat_pic.png");
        assert_eq!(sanitize_filename("weird/$name!.jpg"), "weird__name_.jpg");
        assert_eq!(sanitize_filename("plain-name_1.webp"), "plain-name_1.webp");
    }

    #[test]
    fn object_keys_keep_the_extension() {
        let key = object_key("holiday photo.jpeg");
        assert!(key.ends_with(".jpeg"));
        assert!(key.contains("-holiday_photo"));
        // uuid prefix means two uploads of the same file never collide
        assert_ne!(object_key("a.png"), object_key("a.png"));
    }

    #[test]
    fn extensionless_uploads_still_get_a_key() {
        let key = object_key("rawimage");
        assert!(key.ends_with("-rawimage"));
    }

    #[test]
    fn url_shape_depends_on_deployment_mode() {
        assert_eq!(
            format_public_url("http://localhost:9000", "media", "k.png", true),
            "http://localhost:9000/media/k.png"
        );
        assert_eq!(
            format_public_url("https://cdn.example.com", "media", "k.png", false),
            "https://cdn.example.com/k.png"
        );
    }
}
