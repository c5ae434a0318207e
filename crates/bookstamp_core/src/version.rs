use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};

pub const VERSION_FILE_NAME: &str = "version.json";
pub const STAMP_DATE_FORMAT: &str = "%d.%m.%Y";

/// Persisted shape of the version file.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct VersionRecord {
    pub version: String,
}

/// Local date rendered the way it appears in the version table.
pub fn format_stamp_date(now: DateTime<Local>) -> String {
    now.format(STAMP_DATE_FORMAT).to_string()
}

/// Build `1.1.<release>.<digest>` where the digest is the SHA-1 of the
/// formatted stamp date, rendered as lowercase hex.
pub fn compute_version(release: &str, now: DateTime<Local>) -> String {
    let digest = Sha1::digest(format_stamp_date(now).as_bytes());
    let mut suffix = String::with_capacity(digest.len() * 2);
    for byte in digest.iter() {
        suffix.push_str(&format!("{byte:02x}"));
    }
    format!("1.1.{release}.{suffix}")
}

/// Reuse the stored version when the file exists; otherwise compute a
/// fresh one and persist it as pretty-printed JSON. The flag reports
/// whether a write happened.
pub fn load_or_init_version(
    path: &Path,
    release: &str,
    now: DateTime<Local>,
) -> Result<(VersionRecord, bool)> {
    if path.exists() {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let record: VersionRecord = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        return Ok((record, false));
    }

    let record = VersionRecord {
        version: compute_version(release, now),
    };
    let rendered =
        serde_json::to_string_pretty(&record).context("failed to serialize version record")?;
    fs::write(path, rendered).with_context(|| format!("failed to write {}", path.display()))?;
    Ok((record, true))
}

#[cfg(test)]
mod tests {
    use std::fs;

    use chrono::{Local, TimeZone};
    use tempfile::tempdir;

    use super::{VersionRecord, compute_version, format_stamp_date, load_or_init_version};

    fn fixed_now() -> chrono::DateTime<Local> {
        Local.with_ymd_and_hms(2024, 5, 12, 9, 30, 0).unwrap()
    }

    #[test]
    fn stamp_date_uses_dotted_day_month_year() {
        assert_eq!(format_stamp_date(fixed_now()), "12.05.2024");
    }

    #[test]
    fn computed_version_embeds_release_and_hex_digest() {
        let version = compute_version("3", fixed_now());
        let suffix = version.strip_prefix("1.1.3.").expect("version prefix");
        assert_eq!(suffix.len(), 40);
        assert!(suffix.chars().all(|ch| ch.is_ascii_hexdigit()));
    }

    #[test]
    fn same_date_yields_same_version() {
        assert_eq!(
            compute_version("3", fixed_now()),
            compute_version("3", Local.with_ymd_and_hms(2024, 5, 12, 23, 59, 59).unwrap())
        );
    }

    #[test]
    fn missing_file_is_created_with_computed_version() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("version.json");

        let (record, wrote) = load_or_init_version(&path, "3", fixed_now()).expect("init");
        assert!(wrote);
        assert!(record.version.starts_with("1.1.3."));

        let content = fs::read_to_string(&path).expect("read version file");
        let stored: VersionRecord = serde_json::from_str(&content).expect("decode version file");
        assert_eq!(stored, record);
    }

    #[test]
    fn existing_file_is_reused_without_rewrite() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("version.json");
        fs::write(&path, "{\n  \"version\": \"1.1.2.cafe\"\n}").expect("seed version file");

        let (record, wrote) = load_or_init_version(&path, "3", fixed_now()).expect("load");
        assert!(!wrote);
        assert_eq!(record.version, "1.1.2.cafe");
    }

    #[test]
    fn corrupt_file_is_a_hard_error() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("version.json");
        fs::write(&path, "{not json").expect("seed version file");

        let error = load_or_init_version(&path, "3", fixed_now()).expect_err("must fail");
        assert!(error.to_string().contains("failed to parse"));
    }
}
