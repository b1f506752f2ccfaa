//! Large-file chunked upload integration tests.
//!
//! The 12 MB body is above the 10 MB part threshold, so these writes go
//! through `b2_start_large_file` / `b2_upload_part` / `b2_finish_large_file`
//! rather than the single-shot path.

#[cfg(test)]
mod tests {
    use blazefs_core::{ObjectStorageAdapter, WriteOptions};
    use bytes::Bytes;
    use futures::TryStreamExt;

    use crate::{filesystem, test_key};

    const TOTAL: usize = 12_000_000;
    const CHUNK: usize = 256 * 1024;

    fn body() -> Bytes {
        let mut data = Vec::with_capacity(TOTAL);
        for i in 0..TOTAL {
            data.push((i % 251) as u8);
        }
        Bytes::from(data)
    }

    fn chunks(body: &Bytes) -> Vec<Result<Bytes, anyhow::Error>> {
        let mut rest = body.clone();
        let mut out = Vec::new();
        while !rest.is_empty() {
            let take = rest.len().min(CHUNK);
            out.push(Ok(rest.split_to(take)));
        }
        out
    }

    #[tokio::test]
    #[ignore = "requires B2 credentials"]
    async fn test_should_stream_a_large_upload_in_parts() {
        let fs = filesystem();
        let path = format!("{}/large.bin", test_key("chunked"));
        let body = body();

        let record = fs
            .write_stream(
                &path,
                futures::stream::iter(chunks(&body)),
                Some(body.len() as u64),
                &WriteOptions::default(),
            )
            .await
            .expect("write_stream");
        assert_eq!(record.path, path);
        assert_eq!(record.size, body.len() as u64);

        let mut stream = fs.read_stream(&path).await.expect("read_stream");
        let mut downloaded = Vec::with_capacity(TOTAL);
        while let Some(chunk) = stream.try_next().await.expect("next chunk") {
            downloaded.extend_from_slice(&chunk);
        }
        assert_eq!(downloaded.len(), TOTAL);
        assert_eq!(downloaded[..], body[..]);

        fs.delete(&path).await.expect("delete");
    }

    #[tokio::test]
    #[ignore = "requires B2 credentials"]
    async fn test_should_reject_a_stream_shorter_than_declared() {
        let fs = filesystem();
        let path = format!("{}/short.bin", test_key("chunked"));
        let body = body();

        // Declare one byte more than the stream will deliver.
        let declared = body.len() as u64 + 1;
        let error = fs
            .write_stream(
                &path,
                futures::stream::iter(chunks(&body)),
                Some(declared),
                &WriteOptions::default(),
            )
            .await
            .expect_err("upload should fail");
        assert_eq!(error.kind(), "invalid_state");

        assert!(!fs.exists(&path).await.expect("exists"));
    }
}
