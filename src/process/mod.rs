// src/process/mod.rs
use anyhow::Result;
use futures::future::try_join_all;
use std::{collections::BTreeMap, io, sync::Arc};
use tracing::{debug, error, info};

use crate::fetch::TextSource;

pub mod record;
pub mod split;
pub mod utils;

use record::{Dataset, Header, Record};
use split::{non_empty_lines, split_row};

/// Parse CSV text into records:
/// - blank lines are skipped anywhere in the text
/// - the first remaining line is the header (split on every comma)
/// - each later line is split on commas outside quotes and paired with
///   the header by position
///
/// Text without a header line gives an empty dataset. Ragged rows and
/// stray quotes are never errors.
pub fn parse_csv(text: &str) -> Dataset {
    let mut lines = non_empty_lines(text);
    let Some(header_line) = lines.next() else {
        return Vec::new();
    };
    let header = Arc::new(Header::parse(header_line));

    lines
        .map(|line| Record::from_fields(Arc::clone(&header), &split_row(line)))
        .collect()
}

/// Fetch `location` through `source` and parse it. Retrieval errors are
/// returned unchanged; nothing is cached between calls.
#[tracing::instrument(level = "debug", skip(source))]
pub async fn load_csv<S: TextSource>(source: &S, location: &str) -> Result<Dataset> {
    let text = source.fetch_text(location).await?;
    let dataset = parse_csv(&text);
    debug!(records = dataset.len(), "parsed");
    Ok(dataset)
}

/// Load every `(name, location)` pair concurrently into a map keyed by name.
///
/// A resource that does not exist is logged and stands in as an empty
/// dataset. Any other failure fails the whole batch.
#[tracing::instrument(level = "info", skip_all, fields(count = entries.len()))]
pub async fn load_all<S, N, L>(source: &S, entries: &[(N, L)]) -> Result<BTreeMap<String, Dataset>>
where
    S: TextSource,
    N: AsRef<str>,
    L: AsRef<str>,
{
    let loads = entries.iter().map(|(name, location)| async move {
        let name = name.as_ref();
        let dataset = match load_csv(source, location.as_ref()).await {
            Ok(dataset) => dataset,
            Err(err) if is_not_found(&err) => {
                error!(name, error = %err, "missing resource, using empty dataset");
                Dataset::new()
            }
            Err(err) => return Err(err.context(format!("loading dataset {}", name))),
        };
        info!(name, records = dataset.len(), "loaded");
        Ok::<_, anyhow::Error>((name.to_string(), dataset))
    });

    Ok(try_join_all(loads).await?.into_iter().collect())
}

fn is_not_found(err: &anyhow::Error) -> bool {
    err.downcast_ref::<io::Error>()
        .is_some_and(|e| e.kind() == io::ErrorKind::NotFound)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::{http::tests::serve_once, AutoSource, FileSource};
    use crate::process::utils::clean_number;
    use anyhow::Context;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;
    use tracing_subscriber::{EnvFilter, FmtSubscriber};

    fn init_test_logging() {
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| EnvFilter::new("info,csvrecords::process=debug")),
            )
            .with_test_writer()
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    }

    /// In-memory resources keyed by locator.
    struct StaticSource(HashMap<&'static str, &'static str>);

    impl TextSource for StaticSource {
        async fn fetch_text(&self, location: &str) -> Result<String> {
            self.0
                .get(location)
                .map(|s| s.to_string())
                .with_context(|| format!("no resource at {}", location))
        }
    }

    fn values(rec: &Record) -> Vec<(&str, Option<&str>)> {
        rec.iter().collect()
    }

    #[test]
    fn well_formed_rows() {
        let ds = parse_csv("a,b,c\n1,2,3\n4,5,6\n");
        assert_eq!(ds.len(), 2);
        assert_eq!(
            values(&ds[0]),
            vec![("a", Some("1")), ("b", Some("2")), ("c", Some("3"))]
        );
        assert_eq!(
            values(&ds[1]),
            vec![("a", Some("4")), ("b", Some("5")), ("c", Some("6"))]
        );
    }

    #[test]
    fn quoted_comma_is_one_field() {
        let ds = parse_csv("name,amount\n\"Smith, J\",100\n");
        assert_eq!(ds.len(), 1);
        assert_eq!(ds[0].get("name"), Some("Smith, J"));
        assert_eq!(ds[0].get("amount"), Some("100"));
    }

    #[test]
    fn short_row_has_absent_trailing_keys() {
        let ds = parse_csv("a,b,c\n1\n");
        assert_eq!(
            values(&ds[0]),
            vec![("a", Some("1")), ("b", None), ("c", None)]
        );
    }

    #[test]
    fn blank_lines_never_become_records() {
        let ds = parse_csv("\n\na,b\n\n1,2\n\n\n3,4\n");
        assert_eq!(ds.len(), 2);
        assert_eq!(ds[1].get("a"), Some("3"));
    }

    #[test]
    fn every_record_shares_the_header_keys() {
        let ds = parse_csv("x,y\n1\n1,2\n1,2,3\n");
        for rec in &ds {
            assert_eq!(rec.keys().collect::<Vec<_>>(), vec!["x", "y"]);
        }
    }

    #[test]
    fn crlf_input_is_trimmed() {
        let ds = parse_csv("equipe,points\r\nMaroc,7\r\n");
        assert_eq!(
            values(&ds[0]),
            vec![("equipe", Some("Maroc")), ("points", Some("7"))]
        );
    }

    #[test]
    fn empty_text_and_header_only() {
        assert!(parse_csv("").is_empty());
        assert!(parse_csv("\n\n").is_empty());
        assert!(parse_csv("a,b\n").is_empty());
    }

    #[test]
    fn cleaned_numbers_from_records() {
        let ds = parse_csv("stade,capacite\nMohammed V,\"45 000\"\nAdrar,\"45,480\"\n");
        let caps: Vec<i64> = ds.iter().map(|r| clean_number(r.get("capacite"))).collect();
        assert_eq!(caps, vec![45_000, 45_480]);
        assert_eq!(clean_number(ds[0].get("missing")), 0);
    }

    #[tokio::test]
    async fn load_from_static_source() -> Result<()> {
        init_test_logging();
        let source = StaticSource(HashMap::from([("groups.csv", "groupe,equipe\nA,Maroc\n")]));

        let ds = load_csv(&source, "groups.csv").await?;
        assert_eq!(ds.len(), 1);
        assert_eq!(ds[0].get("equipe"), Some("Maroc"));
        Ok(())
    }

    #[tokio::test]
    async fn each_load_builds_a_fresh_dataset() -> Result<()> {
        let source = StaticSource(HashMap::from([("t.csv", "a\n1\n")]));
        let first = load_csv(&source, "t.csv").await?;
        let second = load_csv(&source, "t.csv").await?;
        assert_eq!(first, second);
        Ok(())
    }

    #[tokio::test]
    async fn load_from_file() -> Result<()> {
        init_test_logging();
        let mut tmp = NamedTempFile::new()?;
        tmp.write_all("nom,ville\nStade Adrar,Agadir\n".as_bytes())?;
        let location = tmp.path().to_string_lossy().to_string();

        let ds = load_csv(&FileSource, &location).await?;
        assert_eq!(ds[0].get("ville"), Some("Agadir"));
        Ok(())
    }

    #[tokio::test]
    async fn load_from_file_with_byte_order_mark() -> Result<()> {
        let mut tmp = NamedTempFile::new()?;
        tmp.write_all("\u{feff}equipe,points\nMaroc,7\n".as_bytes())?;
        let location = tmp.path().to_string_lossy().to_string();

        let ds = load_csv(&FileSource, &location).await?;
        assert_eq!(ds[0].keys().collect::<Vec<_>>(), vec!["equipe", "points"]);
        assert_eq!(ds[0].get("equipe"), Some("Maroc"));
        Ok(())
    }

    #[tokio::test]
    async fn load_over_http() -> Result<()> {
        let url = serve_once("200 OK", "a,b\n1,2\n").await?;
        let source = AutoSource::with_http(crate::fetch::http::tests::local_http()?);

        let ds = load_csv(&source, &url).await?;
        assert_eq!(values(&ds[0]), vec![("a", Some("1")), ("b", Some("2"))]);
        Ok(())
    }

    #[tokio::test]
    async fn retrieval_failure_propagates() {
        let err = load_csv(&FileSource, "/no/such/dir/data.csv")
            .await
            .unwrap_err();
        assert!(err.downcast_ref::<std::io::Error>().is_some());
    }

    #[tokio::test]
    async fn load_all_keys_by_name() -> Result<()> {
        init_test_logging();
        let source = StaticSource(HashMap::from([
            ("data/groupes.csv", "groupe,equipe\nA,Maroc\nA,Mali\n"),
            ("data/stades.csv", "nom,capacite\nAdrar,45480\n"),
        ]));
        let entries = [("groupes", "data/groupes.csv"), ("stades", "data/stades.csv")];

        let all = load_all(&source, &entries).await?;
        assert_eq!(all.keys().collect::<Vec<_>>(), vec!["groupes", "stades"]);
        assert_eq!(all["groupes"].len(), 2);
        assert_eq!(all["stades"][0].get("capacite"), Some("45480"));
        Ok(())
    }

    #[tokio::test]
    async fn load_all_missing_file_is_empty() -> Result<()> {
        init_test_logging();
        let mut tmp = NamedTempFile::new()?;
        tmp.write_all(b"a\n1\n")?;
        let ok = tmp.path().to_string_lossy().to_string();
        let entries = [("ok", ok.as_str()), ("gone", "/no/such/dir/gone.csv")];

        let all = load_all(&FileSource, &entries).await?;
        assert_eq!(all["ok"].len(), 1);
        assert!(all["gone"].is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn load_all_fails_on_other_errors() -> Result<()> {
        let url = serve_once("404 Not Found", "missing").await?;
        let source = AutoSource::with_http(crate::fetch::http::tests::local_http()?);
        let mut tmp = NamedTempFile::new()?;
        tmp.write_all(b"a\n1\n")?;
        let ok = tmp.path().to_string_lossy().to_string();

        let entries = [("ok", ok.as_str()), ("remote", url.as_str())];
        let err = load_all(&source, &entries).await.unwrap_err();
        assert!(format!("{:#}", err).contains("loading dataset remote"));

        let entries = [("ok", ok.as_str()), ("ftp", "ftp://example.com/x.csv")];
        let err = load_all(&source, &entries).await.unwrap_err();
        assert!(format!("{:#}", err).contains("loading dataset ftp"));
        Ok(())
    }
}
