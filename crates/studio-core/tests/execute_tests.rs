use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use mockito::Matcher;
use tempfile::TempDir;

use studio_core::client::{SessionClient, Transport, TransportConfig};
use studio_core::config::JsonFileStore;
use studio_core::error::ExecError;
use studio_core::execute::{CallArgs, execute};
use studio_core::parse;
use studio_core::render::{RenderOptions, TableFormat};
use studio_core::transform::CommandRegistry;

const STUDIO: &str = include_str!("fixtures/studio-apidocs.json");

struct Harness {
    dir: TempDir,
    server: mockito::ServerGuard,
    registry: CommandRegistry,
}

impl Harness {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("config.json"),
            r#"{"access_token":"a1","client_id":"cid","client_secret":"secret","refresh_token":"r1","subdomain":"school"}"#,
        )
        .unwrap();
        let registry = CommandRegistry::build(&parse::from_json(STUDIO).unwrap()).unwrap();
        Self {
            dir,
            server: mockito::Server::new(),
            registry,
        }
    }

    fn client(&self) -> SessionClient {
        let transport = Transport::new(TransportConfig {
            max_retries: 1,
            retry_delay: Duration::ZERO,
            ..TransportConfig::default()
        })
        .unwrap();
        SessionClient::new(
            Box::new(JsonFileStore::new(self.dir.path().join("config.json"))),
            transport,
        )
        .unwrap()
        .with_origin(self.server.url())
    }

    fn options(&self) -> RenderOptions {
        RenderOptions {
            table_format: None,
            output_dir: self.dir.path().to_path_buf(),
        }
    }

    fn run(&self, name: &str, pairs: &[(&str, &str)]) -> Result<String, ExecError> {
        self.run_with(name, pairs, &self.options())
    }

    fn run_with(
        &self,
        name: &str,
        pairs: &[(&str, &str)],
        options: &RenderOptions,
    ) -> Result<String, ExecError> {
        let command = self.registry.get(name).unwrap();
        let args: CallArgs = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        execute(&mut self.client(), command, &args, options)
    }

    fn downloads(&self) -> Vec<PathBuf> {
        fs::read_dir(self.dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .filter(|p| p.file_name().is_some_and(|n| n != "config.json"))
            .collect()
    }
}

#[test]
fn json_response_is_pretty_printed() {
    let mut h = Harness::new();
    let mock = h
        .server
        .mock("GET", "/api/public/v1/collections/3/media")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("page".into(), "2".into()),
            Matcher::UrlEncoded("sort".into(), "title".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json; charset=utf-8")
        .with_body(r#"{"media":[{"id":9}]}"#)
        .create();

    let out = h
        .run(
            "show_collections_media",
            &[("collection_id", "3"), ("page", "2"), ("sort", "title")],
        )
        .unwrap();

    insta::assert_snapshot!(out, @r#"
    {
      "media": [
        {
          "id": 9
        }
      ]
    }
    "#);
    mock.assert();
}

#[test]
fn server_error_is_retried_then_reported() {
    let mut h = Harness::new();
    let mock = h
        .server
        .mock("GET", "/api/public/v1/ping")
        .with_status(502)
        .with_body("bad gateway")
        .expect(2)
        .create();

    let err = h.run("ping", &[]).unwrap_err();
    match err {
        ExecError::UndecodableApiError { status, body } => {
            assert_eq!(status, 502);
            assert_eq!(body, "bad gateway");
        }
        other => panic!("expected UndecodableApiError, got {other:?}"),
    }
    mock.assert();
}

#[test]
fn api_error_message_is_surfaced() {
    let mut h = Harness::new();
    let _mock = h
        .server
        .mock("GET", "/api/public/v1/media/404")
        .with_status(404)
        .with_header("content-type", "application/json")
        .with_body(r#"{"error":"Media not found"}"#)
        .create();

    let err = h.run("show_media", &[("media_id", "404")]).unwrap_err();
    assert!(matches!(
        &err,
        ExecError::Api { status: 404, message } if message == "Media not found"
    ));
    assert_eq!(err.to_string(), "404: Media not found");
}

#[test]
fn empty_delete_reports_declared_description() {
    let mut h = Harness::new();
    let mock = h
        .server
        .mock("DELETE", "/api/public/v1/media/7/permissions")
        .match_query(Matcher::UrlEncoded(
            "user_email".into(),
            "ada@example.test".into(),
        ))
        .with_status(204)
        .create();

    let out = h
        .run(
            "delete_media_permissions",
            &[("media_id", "7"), ("user_email", "ada@example.test")],
        )
        .unwrap();
    assert_eq!(out, "204: Permission removed");
    mock.assert();
}

#[test]
fn media_download_is_saved_as_mp4() {
    let mut h = Harness::new();
    let _mock = h
        .server
        .mock("GET", "/api/public/v1/media/5/download")
        .with_status(200)
        .with_header("content-type", "video/mp4")
        .with_body([0u8, 0, 0, 24, b'f', b't', b'y', b'p'])
        .create();

    let out = h.run("download_media", &[("media_id", "5")]).unwrap();

    let files = h.downloads();
    assert_eq!(files.len(), 1);
    let file = &files[0];
    assert_eq!(file.extension().unwrap(), "mp4");
    assert_eq!(fs::read(file).unwrap(), vec![0u8, 0, 0, 24, b'f', b't', b'y', b'p']);
    assert_eq!(
        out,
        format!("Downloaded video/mp4 content to {}", file.display())
    );
}

#[test]
fn caption_download_is_saved_as_str() {
    let mut h = Harness::new();
    let _mock = h
        .server
        .mock("GET", "/api/public/v1/media/5/captions/8/download")
        .with_status(200)
        .with_header("content-type", "text/plain")
        .with_body("1\n00:00:01,000 --> 00:00:02,000\nHello\n")
        .create();

    let out = h
        .run(
            "download_media_captions",
            &[("media_id", "5"), ("caption_file_id", "8")],
        )
        .unwrap();

    let files = h.downloads();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].extension().unwrap(), "str");
    assert!(out.starts_with("Downloaded text/plain content to "));
    assert!(fs::read_to_string(&files[0]).unwrap().contains("Hello"));
}

#[test]
fn insights_csv_as_table() {
    let mut h = Harness::new();
    let _mock = h
        .server
        .mock("GET", "/api/public/v1/perspectives/p1/insights/users")
        .with_status(200)
        .with_header("content-type", "text/csv")
        .with_body("user,views\nada,3\n")
        .create();

    let options = RenderOptions {
        table_format: Some(TableFormat::Github),
        ..h.options()
    };
    let out = h
        .run_with(
            "show_perspectives_insights_users",
            &[("perspective_id", "p1")],
            &options,
        )
        .unwrap();

    assert!(out.contains("| user"));
    assert!(out.contains("| ada"));
}

#[test]
fn post_without_query() {
    let mut h = Harness::new();
    let mock = h
        .server
        .mock("POST", "/api/public/v1/uploads/u-42/complete")
        .with_status(200)
        .with_body("done")
        .create();

    let out = h.run("complete_uploads", &[("upload_id", "u-42")]).unwrap();
    assert_eq!(out, "done");
    mock.assert();
}
