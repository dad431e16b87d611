//! File output for extracted URLs and reports.

use crate::normalize::ResultSet;
use crate::types::{PageReport, Result};
use std::fs;
use std::path::Path;

/// Write URLs as a pretty JSON array of strings.
pub fn write_json(path: &Path, urls: &ResultSet) -> Result<()> {
    let json = serde_json::to_string_pretty(urls)?;
    fs::write(path, json)?;
    Ok(())
}

/// Write URLs one per line.
pub fn write_text(path: &Path, urls: &ResultSet) -> Result<()> {
    let mut text = String::new();
    for url in urls {
        text.push_str(url.as_str());
        text.push('\n');
    }
    fs::write(path, text)?;
    Ok(())
}

/// Write full per-page reports as pretty JSON.
pub fn write_reports(path: &Path, reports: &[PageReport]) -> Result<()> {
    let json = serde_json::to_string_pretty(reports)?;
    fs::write(path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn sample() -> ResultSet {
        let base = Url::parse("https://example.com/").unwrap();
        let mut urls = ResultSet::new();
        urls.admit("/b", &base);
        urls.admit("https://cdn.example.com/a.js", &base);
        urls
    }

    #[test]
    fn test_write_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("output.json");
        write_json(&path, &sample()).unwrap();

        let parsed: Vec<String> =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(
            parsed,
            vec!["https://cdn.example.com/a.js", "https://example.com/b"]
        );
    }

    #[test]
    fn test_write_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("output.txt");
        write_text(&path, &sample()).unwrap();

        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "https://cdn.example.com/a.js\nhttps://example.com/b\n"
        );
    }

    #[test]
    fn test_write_reports() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        let mut report = PageReport::new("https://example.com/");
        report.urls = sample();
        write_reports(&path, &[report]).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value[0]["target"], "https://example.com/");
        assert_eq!(value[0]["urls"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_write_to_missing_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope").join("output.json");
        assert!(write_json(&path, &sample()).is_err());
    }
}
