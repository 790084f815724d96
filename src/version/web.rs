use std::time::Duration;

use anyhow::{Context, Result};

pub const DEFAULT_VERSION_URL: &str = "http://cn.patch.battlenet.com.cn:1119/hsb/versions";
pub const REGION: &str = "cn";

const TIMEOUT: Duration = Duration::from_secs(30);
/// `Region!STRING:0|BuildConfig|CDNConfig|KeyRing|BuildId|VersionsName|ProductConfig`
const VERSIONS_NAME: usize = 5;

pub fn fetch_versions_table(url: &str) -> Result<String> {
    let agent = ureq::AgentBuilder::new().timeout(TIMEOUT).build();
    let response = agent
        .get(url)
        .call()
        .with_context(|| format!("could not fetch version table from {url}"))?;
    response
        .into_string()
        .with_context(|| format!("could not read version table from {url}"))
}

/// `VersionsName` of the first row for `region` that has enough columns.
pub fn parse_versions_table<'a>(text: &'a str, region: &str) -> Option<&'a str> {
    text.lines().find_map(|line| {
        let mut columns = line.trim().split('|');
        if columns.next()? != region {
            return None;
        }
        columns.nth(VERSIONS_NAME - 1)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = "\
Region!STRING:0|BuildConfig!HEX:16|CDNConfig!HEX:16|KeyRing!HEX:16|BuildId!DEC:4|VersionsName!String:0|ProductConfig!HEX:16
## seqn = 2934855
us|4f1b|a0c2||231720|34.2.0.231720|53c0
cn|88aa|77bb||231500|34.0.2.231500|1122
";

    #[test]
    fn finds_region_row() {
        assert_eq!(parse_versions_table(TABLE, "cn"), Some("34.0.2.231500"));
        assert_eq!(parse_versions_table(TABLE, "us"), Some("34.2.0.231720"));
    }

    #[test]
    fn missing_region() {
        assert_eq!(parse_versions_table(TABLE, "kr"), None);
    }

    #[test]
    fn skips_short_rows() {
        let table = "cn|a|b\ncn|1|2|3|4|5.6.7|8\n";
        assert_eq!(parse_versions_table(table, "cn"), Some("5.6.7"));
    }

    #[test]
    fn region_must_be_whole_column() {
        assert_eq!(parse_versions_table("cnx|1|2|3|4|9.9|x\n", "cn"), None);
    }
}
