//! Command-line client for a Backblaze B2 bucket, presented as a filesystem.
//!
//! Each invocation performs one operation through [`B2Filesystem`] and exits.
//! Uploads stream from disk and go through the chunked large-file path when
//! the source is big enough, so a `put` of a multi-gigabyte file never
//! buffers it in memory; ctrl-c abandons the session at the next part
//! boundary and leaves it for the service to expire.
//!
//! # Usage
//!
//! ```text
//! B2_KEY_ID=... B2_APPLICATION_KEY=... B2_BUCKET=backups blazefs ls reports -r
//! ```
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `B2_KEY_ID` | *(empty)* | Application key id |
//! | `B2_APPLICATION_KEY` | *(empty)* | Application key secret |
//! | `B2_BUCKET` | *(empty)* | Bucket every path lives in |
//! | `B2_PREFIX` | *(empty)* | Key prefix scoping every path |
//! | `B2_API_URL` | `https://api.backblazeb2.com` | Authorization endpoint |
//! | `LOG_LEVEL` | `info` | Log level filter |
//! | `RUST_LOG` | *(unset)* | Fine-grained tracing filter (overrides `LOG_LEVEL`) |

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::DateTime;
use futures::TryStreamExt;
use tokio::fs::File;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio_util::io::ReaderStream;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use blazefs_core::{
    B2Config, B2Filesystem, ByteStream, ObjectRecord, ObjectStorageAdapter, WriteOptions,
};
use blazefs_http::B2HttpClient;

const USAGE: &str = concat!(
    "blazefs ",
    env!("CARGO_PKG_VERSION"),
    " - a Backblaze B2 bucket as a filesystem

Usage:
  blazefs ls [directory] [-r]    list objects (-r recurses into subdirectories)
  blazefs stat <path>            print metadata for one object
  blazefs put <local> <path>     upload a local file
  blazefs get <path> [local]     download an object (stdout when no target)
  blazefs cp <from> <to>         copy an object server-side
  blazefs mv <from> <to>         move an object to a new path
  blazefs rm <path>              delete the newest version of an object
  blazefs rmdir <directory>      delete every object under a directory

Connection settings come from B2_KEY_ID, B2_APPLICATION_KEY, B2_BUCKET,
B2_PREFIX, B2_API_URL and LOG_LEVEL."
);

/// What the process was asked to do.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    List { directory: String, recursive: bool },
    Stat { path: String },
    Put { local: String, path: String },
    Get { path: String, local: Option<String> },
    Copy { from: String, to: String },
    Move { from: String, to: String },
    Remove { path: String },
    RemoveDirectory { directory: String },
}

/// Parse the raw argument list (program name already stripped). `None`
/// means the caller should print usage and exit.
fn parse_command(args: &[String]) -> Option<Command> {
    let (verb, rest) = args.split_first()?;
    match (verb.as_str(), rest) {
        ("ls", rest) => {
            let recursive = rest.iter().any(|a| a == "-r" || a == "--recursive");
            let directory = rest
                .iter()
                .find(|a| !a.starts_with('-'))
                .cloned()
                .unwrap_or_default();
            Some(Command::List {
                directory,
                recursive,
            })
        }
        ("stat", [path]) => Some(Command::Stat { path: path.clone() }),
        ("put", [local, path]) => Some(Command::Put {
            local: local.clone(),
            path: path.clone(),
        }),
        ("get", [path]) => Some(Command::Get {
            path: path.clone(),
            local: None,
        }),
        ("get", [path, local]) => Some(Command::Get {
            path: path.clone(),
            local: Some(local.clone()),
        }),
        ("cp", [from, to]) => Some(Command::Copy {
            from: from.clone(),
            to: to.clone(),
        }),
        ("mv", [from, to]) => Some(Command::Move {
            from: from.clone(),
            to: to.clone(),
        }),
        ("rm", [path]) => Some(Command::Remove { path: path.clone() }),
        ("rmdir", [directory]) => Some(Command::RemoveDirectory {
            directory: directory.clone(),
        }),
        _ => None,
    }
}

/// Initialize the tracing subscriber on stderr, keeping stdout for output.
///
/// Uses `RUST_LOG` if set, otherwise falls back to the `LOG_LEVEL` config
/// value.
fn init_tracing(log_level: &str) -> Result<()> {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::try_new(log_level)
            .with_context(|| format!("invalid log level filter: {log_level}"))?
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();

    Ok(())
}

/// One `ls` row: size, time, path, with directories marked by a trailing `/`.
fn format_record(record: &ObjectRecord) -> String {
    if record.is_dir() {
        return format!("{:>12}  {:>19}  {}/", "-", "-", record.path);
    }
    format!(
        "{:>12}  {:>19}  {}",
        record.size,
        format_timestamp(record.timestamp),
        record.path
    )
}

fn format_timestamp(seconds: i64) -> String {
    DateTime::from_timestamp(seconds, 0).map_or_else(
        || seconds.to_string(),
        |t| t.format("%Y-%m-%d %H:%M:%S").to_string(),
    )
}

fn print_stat(record: &ObjectRecord) {
    println!("path:          {}", record.path);
    println!("size:          {}", record.size);
    println!(
        "content-type:  {}",
        record.content_type.as_deref().unwrap_or("-")
    );
    println!("modified:      {}", format_timestamp(record.timestamp));
}

/// Millis-since-epoch mtime of a local file, when the platform reports one.
fn file_modified_millis(metadata: &std::fs::Metadata) -> Option<i64> {
    let modified = metadata.modified().ok()?;
    let elapsed = modified.duration_since(std::time::UNIX_EPOCH).ok()?;
    i64::try_from(elapsed.as_millis()).ok()
}

/// Copy every chunk of `source` into `sink`, returning the byte count.
async fn drain<W>(source: &mut ByteStream, sink: &mut W) -> Result<u64>
where
    W: AsyncWrite + Unpin,
{
    let mut written = 0u64;
    while let Some(chunk) = source.try_next().await? {
        sink.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }
    Ok(written)
}

async fn put(fs: &B2Filesystem, local: &str, path: &str) -> Result<()> {
    let file = File::open(local)
        .await
        .with_context(|| format!("cannot open {local}"))?;
    let metadata = file.metadata().await?;
    let options = match file_modified_millis(&metadata) {
        Some(millis) => WriteOptions::builder().last_modified_millis(millis).build(),
        None => WriteOptions::default(),
    };

    let source = ReaderStream::new(file).map_err(anyhow::Error::from);
    let record = fs
        .write_stream(path, source, Some(metadata.len()), &options)
        .await?;
    println!("uploaded {} ({} bytes)", record.path, record.size);
    Ok(())
}

async fn get(fs: &B2Filesystem, path: &str, local: Option<&str>) -> Result<()> {
    let mut source = fs.read_stream(path).await?;
    match local {
        Some(target) => {
            let mut file = File::create(target)
                .await
                .with_context(|| format!("cannot create {target}"))?;
            let written = drain(&mut source, &mut file).await?;
            file.flush().await?;
            println!("downloaded {path} to {target} ({written} bytes)");
        }
        None => {
            let mut out = tokio::io::stdout();
            drain(&mut source, &mut out).await?;
            out.flush().await?;
        }
    }
    Ok(())
}

async fn run(fs: &B2Filesystem, command: Command) -> Result<()> {
    match command {
        Command::List {
            directory,
            recursive,
        } => {
            for record in fs.list(&directory, recursive).await? {
                println!("{}", format_record(&record));
            }
        }
        Command::Stat { path } => {
            let Some(record) = fs.stat(&path).await? else {
                anyhow::bail!("no such object: {path}");
            };
            print_stat(&record);
        }
        Command::Put { local, path } => put(fs, &local, &path).await?,
        Command::Get { path, local } => get(fs, &path, local.as_deref()).await?,
        Command::Copy { from, to } => {
            fs.copy(&from, &to).await?;
            println!("copied {from} to {to}");
        }
        Command::Move { from, to } => {
            fs.rename(&from, &to).await?;
            println!("moved {from} to {to}");
        }
        Command::Remove { path } => {
            fs.delete(&path).await?;
            println!("deleted {path}");
        }
        Command::RemoveDirectory { directory } => {
            let removed = fs.delete_directory(&directory).await?;
            println!("deleted {removed} objects under {directory}");
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(command) = parse_command(&args) else {
        eprintln!("{USAGE}");
        std::process::exit(2);
    };

    let config = B2Config::from_env();
    init_tracing(&config.log_level)?;
    tracing::debug!(bucket = %config.bucket_name, prefix = %config.path_prefix, "using bucket");

    let cancellation = CancellationToken::new();
    let client = Arc::new(B2HttpClient::new(config.clone()));
    let fs = B2Filesystem::new(client, config).with_cancellation(cancellation.clone());

    // Ctrl-c stops a chunked upload at the next part boundary.
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancellation.cancel();
        }
    });

    run(&fs, command).await
}

#[cfg(test)]
mod tests {
    use super::*;

    use blazefs_core::RecordKind;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| (*s).to_owned()).collect()
    }

    #[test]
    fn test_should_parse_listing_flags_in_any_position() {
        assert_eq!(
            parse_command(&args(&["ls", "reports", "-r"])),
            Some(Command::List {
                directory: "reports".to_owned(),
                recursive: true,
            })
        );
        assert_eq!(
            parse_command(&args(&["ls", "--recursive", "reports"])),
            Some(Command::List {
                directory: "reports".to_owned(),
                recursive: true,
            })
        );
        assert_eq!(
            parse_command(&args(&["ls"])),
            Some(Command::List {
                directory: String::new(),
                recursive: false,
            })
        );
    }

    #[test]
    fn test_should_reject_malformed_invocations() {
        assert_eq!(parse_command(&args(&[])), None);
        assert_eq!(parse_command(&args(&["frobnicate"])), None);
        assert_eq!(parse_command(&args(&["put", "only-one-arg"])), None);
        assert_eq!(parse_command(&args(&["rm"])), None);
    }

    #[test]
    fn test_should_parse_optional_download_target() {
        assert_eq!(
            parse_command(&args(&["get", "a/b.txt"])),
            Some(Command::Get {
                path: "a/b.txt".to_owned(),
                local: None,
            })
        );
        assert_eq!(
            parse_command(&args(&["get", "a/b.txt", "out.txt"])),
            Some(Command::Get {
                path: "a/b.txt".to_owned(),
                local: Some("out.txt".to_owned()),
            })
        );
    }

    #[test]
    fn test_should_format_listing_rows() {
        let file = ObjectRecord {
            path: "reports/2026/q1.pdf".to_owned(),
            kind: RecordKind::File,
            size: 1_572_864,
            timestamp: 1_756_000_000,
            content_type: Some("application/pdf".to_owned()),
            dirname: "reports/2026".to_owned(),
        };
        assert_eq!(
            format_record(&file),
            "     1572864  2025-08-24 01:46:40  reports/2026/q1.pdf"
        );

        let dir = ObjectRecord::directory("reports/2026");
        assert_eq!(
            format_record(&dir),
            "           -                    -  reports/2026/"
        );
    }
}
