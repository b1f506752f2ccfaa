//! Directory emulation, rename, and bulk delete integration tests.

#[cfg(test)]
mod tests {
    use blazefs_core::{B2Filesystem, BlazeFsError, ObjectStorageAdapter, WriteOptions};
    use bytes::Bytes;

    use crate::{filesystem, test_key};

    async fn seed(fs: &B2Filesystem, path: &str) {
        fs.write(path, Bytes::from_static(b"x"), &WriteOptions::default())
            .await
            .unwrap_or_else(|e| panic!("seed {path}: {e}"));
    }

    #[tokio::test]
    #[ignore = "requires B2 credentials"]
    async fn test_should_list_and_clean_a_directory_tree() {
        let fs = filesystem();
        let root = test_key("tree");

        seed(&fs, &format!("{root}/a.txt")).await;
        seed(&fs, &format!("{root}/sub/b.txt")).await;
        seed(&fs, &format!("{root}/sub/deep/c.txt")).await;

        let mut shallow: Vec<String> = fs
            .list(&root, false)
            .await
            .expect("shallow list")
            .into_iter()
            .map(|r| r.path)
            .collect();
        shallow.sort();
        assert_eq!(shallow, [format!("{root}/a.txt"), format!("{root}/sub")]);

        let mut deep: Vec<String> = fs
            .list(&root, true)
            .await
            .expect("recursive list")
            .into_iter()
            .map(|r| r.path)
            .collect();
        deep.sort();
        assert_eq!(
            deep,
            [
                format!("{root}/a.txt"),
                format!("{root}/sub"),
                format!("{root}/sub/b.txt"),
                format!("{root}/sub/deep"),
                format!("{root}/sub/deep/c.txt"),
            ]
        );

        let removed = fs.delete_directory(&root).await.expect("rmdir");
        assert_eq!(removed, 3);

        let error = fs.delete_directory(&root).await.expect_err("second rmdir");
        assert!(matches!(error, BlazeFsError::InvalidState { .. }));
    }

    #[tokio::test]
    #[ignore = "requires B2 credentials"]
    async fn test_should_rename_and_copy_server_side() {
        let fs = filesystem();
        let root = test_key("move");
        let original = format!("{root}/orig.txt");
        let renamed = format!("{root}/renamed.txt");
        let duplicate = format!("{root}/dup.txt");

        seed(&fs, &original).await;

        fs.rename(&original, &renamed).await.expect("rename");
        assert!(!fs.exists(&original).await.expect("source gone"));
        assert!(fs.exists(&renamed).await.expect("target exists"));

        fs.copy(&renamed, &duplicate).await.expect("copy");
        assert!(fs.exists(&renamed).await.expect("copy source stays"));
        assert!(fs.exists(&duplicate).await.expect("copy target exists"));

        let removed = fs.delete_directory(&root).await.expect("cleanup");
        assert_eq!(removed, 2);
    }
}
