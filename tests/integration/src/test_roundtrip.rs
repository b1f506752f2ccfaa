//! Whole-object lifecycle integration tests.

#[cfg(test)]
mod tests {
    use blazefs_core::{ObjectStorageAdapter, WriteOptions};
    use bytes::Bytes;

    use crate::{filesystem, test_key};

    #[tokio::test]
    #[ignore = "requires B2 credentials"]
    async fn test_should_round_trip_one_object() {
        let fs = filesystem();
        let path = format!("{}/hello.txt", test_key("roundtrip"));

        let record = fs
            .write(
                &path,
                Bytes::from_static(b"hello blazefs"),
                &WriteOptions::builder().content_type("text/plain").build(),
            )
            .await
            .expect("write");
        assert_eq!(record.path, path);
        assert_eq!(record.size, 13);

        assert!(fs.exists(&path).await.expect("exists"));
        assert_eq!(fs.size(&path).await.expect("size"), Some(13));
        assert_eq!(
            fs.mime_type(&path).await.expect("mime_type").as_deref(),
            Some("text/plain")
        );

        let body = fs.read(&path).await.expect("read");
        assert_eq!(&body[..], b"hello blazefs");

        fs.delete(&path).await.expect("delete");
        assert!(!fs.exists(&path).await.expect("exists after delete"));
    }

    #[tokio::test]
    #[ignore = "requires B2 credentials"]
    async fn test_should_record_source_modification_time() {
        let fs = filesystem();
        let path = format!("{}/stamped.bin", test_key("mtime"));
        let millis = 1_700_000_005_000_i64;

        fs.write(
            &path,
            Bytes::from_static(b"stamped"),
            &WriteOptions::builder().last_modified_millis(millis).build(),
        )
        .await
        .expect("write");

        assert_eq!(
            fs.modified_time(&path).await.expect("modified_time"),
            Some(millis / 1000)
        );

        fs.delete(&path).await.expect("delete");
    }

    #[tokio::test]
    #[ignore = "requires B2 credentials"]
    async fn test_should_report_missing_objects_as_absent() {
        let fs = filesystem();
        let path = format!("{}/never-written.bin", test_key("absent"));

        assert!(!fs.exists(&path).await.expect("exists"));
        assert_eq!(fs.stat(&path).await.expect("stat"), None);
        assert_eq!(fs.size(&path).await.expect("size"), None);
        assert_eq!(fs.mime_type(&path).await.expect("mime_type"), None);
    }
}
