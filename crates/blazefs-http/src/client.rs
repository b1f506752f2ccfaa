//! reqwest-backed implementation of the [`B2Client`] contract.
//!
//! One [`B2HttpClient`] holds one authorized account state, fetched lazily on
//! the first call and cached for the client's lifetime. Every trait method
//! maps onto a single `b2api/v2` endpoint; pagination in version listings is
//! the only place a call fans out into several requests.

use async_trait::async_trait;
use bytes::Bytes;
use futures::{StreamExt, TryStreamExt};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use reqwest::header;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;
use tracing::debug;

use blazefs_core::client::{B2Client, ByteStream, ListQuery, UploadFileParams};
use blazefs_core::{B2Config, BlazeFsError, BlazeFsResult};
use blazefs_model::{
    CopyFileRequest, DeleteFileVersionRequest, ErrorResponse, FileRecord, FinishLargeFileRequest,
    GetUploadPartUrlRequest, GetUploadUrlRequest, LAST_MODIFIED_INFO_KEY, ListBucketsRequest,
    ListBucketsResponse, ListFileVersionsRequest, ListFileVersionsResponse, PartRecord,
    StartLargeFileRequest, UploadPartUrl, UploadUrl,
};

/// Characters that survive percent-encoding in file names. B2 wants the
/// RFC 3986 unreserved set, and `/` must stay literal so keys keep their
/// directory shape in download URLs and `X-Bz-File-Name` headers.
const FILE_NAME_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~')
    .remove(b'/');

/// Page size for version listings (the service maximum).
const MAX_FILE_COUNT: u32 = 1_000;

/// The subset of the `b2_authorize_account` response the client keeps.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuthState {
    account_id: String,
    authorization_token: String,
    api_url: String,
    download_url: String,
}

/// Authenticated HTTPS client for one B2 account.
///
/// Cheap to share behind an [`std::sync::Arc`]; the underlying connection
/// pool and the cached authorization are reused across calls.
#[derive(Debug)]
pub struct B2HttpClient {
    http: reqwest::Client,
    config: B2Config,
    auth: OnceCell<AuthState>,
}

impl B2HttpClient {
    /// Build a client for the account in `config`. No network traffic
    /// happens until the first operation.
    #[must_use]
    pub fn new(config: B2Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
            auth: OnceCell::new(),
        }
    }

    /// The authorized account state, performing `b2_authorize_account` on
    /// first use.
    async fn auth(&self) -> BlazeFsResult<&AuthState> {
        self.auth
            .get_or_try_init(|| async {
                if self.config.key_id.is_empty() || self.config.application_key.is_empty() {
                    return Err(BlazeFsError::InvalidState {
                        message: "application key id or secret is empty".to_owned(),
                    });
                }
                let url = format!(
                    "{}/b2api/v2/b2_authorize_account",
                    self.config.api_url.trim_end_matches('/')
                );
                let response = self
                    .http
                    .get(url)
                    .basic_auth(&self.config.key_id, Some(&self.config.application_key))
                    .send()
                    .await
                    .map_err(transport_error)?;
                let state: AuthState = parse_json(response).await?;
                debug!(account_id = %state.account_id, api_url = %state.api_url, "authorized account");
                Ok(state)
            })
            .await
    }

    /// POST a JSON request to a `b2api/v2` operation on the account API URL.
    async fn api_call<Req, Resp>(&self, operation: &str, body: &Req) -> BlazeFsResult<Resp>
    where
        Req: Serialize + Sync,
        Resp: DeserializeOwned,
    {
        let auth = self.auth().await?;
        let url = format!("{}/b2api/v2/{operation}", auth.api_url.trim_end_matches('/'));
        let response = self
            .http
            .post(url)
            .header(header::AUTHORIZATION, auth.authorization_token.as_str())
            .json(body)
            .send()
            .await
            .map_err(transport_error)?;
        parse_json(response).await
    }

    /// GET an object from the download URL, with 404 mapped to [`BlazeFsError::NotFound`].
    async fn download_response(
        &self,
        bucket_name: &str,
        file_name: &str,
    ) -> BlazeFsResult<reqwest::Response> {
        let auth = self.auth().await?;
        let encoded = utf8_percent_encode(file_name, FILE_NAME_ENCODE_SET).to_string();
        let url = format!(
            "{}/file/{bucket_name}/{encoded}",
            auth.download_url.trim_end_matches('/')
        );
        let response = self
            .http
            .get(url)
            .header(header::AUTHORIZATION, auth.authorization_token.as_str())
            .send()
            .await
            .map_err(transport_error)?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(BlazeFsError::NotFound {
                key: file_name.to_owned(),
            });
        }
        if !response.status().is_success() {
            return Err(read_api_error(response).await);
        }
        Ok(response)
    }
}

#[async_trait]
impl B2Client for B2HttpClient {
    async fn bucket_id(&self, bucket_name: &str) -> BlazeFsResult<String> {
        let auth = self.auth().await?;
        let request = ListBucketsRequest {
            account_id: auth.account_id.clone(),
            bucket_name: Some(bucket_name.to_owned()),
        };
        let response: ListBucketsResponse = self.api_call("b2_list_buckets", &request).await?;
        let bucket = response
            .buckets
            .into_iter()
            .find(|bucket| bucket.bucket_name == bucket_name)
            .ok_or_else(|| BlazeFsError::Api {
                status: 400,
                code: "bad_request".to_owned(),
                message: format!("no bucket named {bucket_name}"),
            })?;
        debug!(bucket_name, bucket_id = %bucket.bucket_id, "resolved bucket");
        Ok(bucket.bucket_id)
    }

    async fn list_file_versions(
        &self,
        bucket_id: &str,
        query: &ListQuery,
    ) -> BlazeFsResult<Vec<FileRecord>> {
        // An exact-name query starts the listing at the name and prefixes on
        // it; prefix-only matches ("name.txt.bak" for "name.txt") are dropped
        // after the loop.
        let exact = query.file_name.as_deref();
        let prefix = match exact {
            Some(name) => Some(name.to_owned()),
            None => query.prefix.clone(),
        };
        let mut request = ListFileVersionsRequest {
            bucket_id: bucket_id.to_owned(),
            start_file_name: exact.map(str::to_owned),
            start_file_id: None,
            max_file_count: Some(MAX_FILE_COUNT),
            prefix,
        };

        let mut newest = Vec::new();
        loop {
            let response: ListFileVersionsResponse =
                self.api_call("b2_list_file_versions", &request).await?;
            let more = response.has_more();
            request.start_file_name = response.next_file_name.clone();
            request.start_file_id = response.next_file_id.clone();
            push_newest(&mut newest, response.files);
            if !more {
                break;
            }
        }

        if let Some(name) = exact {
            newest.retain(|file| file.file_name == name);
        }
        Ok(newest)
    }

    async fn upload_file(
        &self,
        bucket_id: &str,
        params: UploadFileParams,
    ) -> BlazeFsResult<FileRecord> {
        let request = GetUploadUrlRequest {
            bucket_id: bucket_id.to_owned(),
        };
        let target: UploadUrl = self.api_call("b2_get_upload_url", &request).await?;

        let encoded = utf8_percent_encode(&params.key, FILE_NAME_ENCODE_SET).to_string();
        let mut builder = self
            .http
            .post(&target.upload_url)
            .header(header::AUTHORIZATION, target.authorization_token.as_str())
            .header("X-Bz-File-Name", encoded)
            .header(header::CONTENT_TYPE, params.content_type.as_str())
            .header("X-Bz-Content-Sha1", params.sha1_hex.as_str());
        if let Some(millis) = params.last_modified_millis {
            builder = builder.header(
                format!("X-Bz-Info-{LAST_MODIFIED_INFO_KEY}"),
                millis.to_string(),
            );
        }
        let response = builder
            .body(params.body)
            .send()
            .await
            .map_err(transport_error)?;

        let record: FileRecord = parse_json(response).await?;
        debug!(key = %record.file_name, file_id = %record.file_id, "uploaded object");
        Ok(record)
    }

    async fn start_large_file(
        &self,
        request: StartLargeFileRequest,
    ) -> BlazeFsResult<FileRecord> {
        self.api_call("b2_start_large_file", &request).await
    }

    async fn get_upload_part_url(&self, file_id: &str) -> BlazeFsResult<UploadPartUrl> {
        let request = GetUploadPartUrlRequest {
            file_id: file_id.to_owned(),
        };
        self.api_call("b2_get_upload_part_url", &request).await
    }

    async fn upload_part(
        &self,
        target: &UploadPartUrl,
        part_number: u32,
        sha1_hex: &str,
        body: Bytes,
    ) -> BlazeFsResult<PartRecord> {
        let response = self
            .http
            .post(&target.upload_url)
            .header(header::AUTHORIZATION, target.authorization_token.as_str())
            .header("X-Bz-Part-Number", part_number.to_string())
            .header("X-Bz-Content-Sha1", sha1_hex)
            .body(body)
            .send()
            .await
            .map_err(transport_error)?;
        if response.status().is_success() {
            response.json::<PartRecord>().await.map_err(transport_error)
        } else {
            Err(as_hash_mismatch(
                read_api_error(response).await,
                &target.file_id,
                part_number,
            ))
        }
    }

    async fn finish_large_file(
        &self,
        file_id: &str,
        part_sha1_array: Vec<String>,
    ) -> BlazeFsResult<FileRecord> {
        let request = FinishLargeFileRequest {
            file_id: file_id.to_owned(),
            part_sha1_array,
        };
        self.api_call("b2_finish_large_file", &request)
            .await
            .map_err(|error| as_hash_mismatch(error, file_id, 0))
    }

    async fn copy_file(
        &self,
        source_file_id: &str,
        destination_key: &str,
    ) -> BlazeFsResult<FileRecord> {
        let request = CopyFileRequest {
            source_file_id: source_file_id.to_owned(),
            file_name: destination_key.to_owned(),
        };
        self.api_call("b2_copy_file", &request).await
    }

    async fn delete_file_version(&self, file_name: &str, file_id: &str) -> BlazeFsResult<()> {
        let request = DeleteFileVersionRequest {
            file_name: file_name.to_owned(),
            file_id: file_id.to_owned(),
        };
        let _: serde_json::Value = self.api_call("b2_delete_file_version", &request).await?;
        Ok(())
    }

    async fn download_file(&self, bucket_name: &str, file_name: &str) -> BlazeFsResult<Bytes> {
        let response = self.download_response(bucket_name, file_name).await?;
        response.bytes().await.map_err(transport_error)
    }

    async fn download_stream(
        &self,
        bucket_name: &str,
        file_name: &str,
    ) -> BlazeFsResult<ByteStream> {
        let response = self.download_response(bucket_name, file_name).await?;
        Ok(response
            .bytes_stream()
            .map_err(anyhow::Error::from)
            .boxed())
    }
}

/// Wrap a reqwest failure (connect, TLS, timeout, body decode) as a
/// transport error.
fn transport_error(error: reqwest::Error) -> BlazeFsError {
    BlazeFsError::Transport {
        message: error.to_string(),
    }
}

/// Decode a success body, or turn a non-2xx response into an API error.
async fn parse_json<T: DeserializeOwned>(response: reqwest::Response) -> BlazeFsResult<T> {
    if response.status().is_success() {
        response.json::<T>().await.map_err(transport_error)
    } else {
        Err(read_api_error(response).await)
    }
}

/// Read a B2 error document off a failed response. The HTTP status wins over
/// whatever status the document claims.
async fn read_api_error(response: reqwest::Response) -> BlazeFsError {
    let status = response.status().as_u16();
    let document = response
        .json::<ErrorResponse>()
        .await
        .unwrap_or_else(|_| ErrorResponse {
            status,
            code: "unknown".to_owned(),
            message: "error document was not parseable".to_owned(),
        });
    BlazeFsError::Api {
        status,
        code: document.code,
        message: document.message,
    }
}

/// Reinterpret an API rejection that complains about a SHA-1 as a hash
/// mismatch for `session`. Part number 0 marks a rejected finalize list.
fn as_hash_mismatch(error: BlazeFsError, session: &str, part_number: u32) -> BlazeFsError {
    match error {
        BlazeFsError::Api { message, .. }
            if message.to_ascii_lowercase().contains("sha1") =>
        {
            BlazeFsError::HashMismatch {
                key: session.to_owned(),
                part_number,
                message,
            }
        }
        other => other,
    }
}

/// Append one listing page, keeping only the first (newest) version of each
/// name. Pages arrive ordered by name then newest-first, so a run of equal
/// names is always consecutive, including across page boundaries.
fn push_newest(newest: &mut Vec<FileRecord>, files: Vec<FileRecord>) {
    for file in files {
        if newest
            .last()
            .is_some_and(|kept| kept.file_name == file.file_name)
        {
            continue;
        }
        newest.push(file);
    }
}
