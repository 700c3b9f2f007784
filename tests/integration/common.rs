//! Shared fixtures for the integration tests

use lyngsat_wayback::config::{
    ArchiveConfig, Config, CrawlerConfig, HttpConfig, OutputConfig, SiteProfile,
};
use std::path::Path;

/// Creates a test configuration rooted at `roots`, writing everything under `dir`
pub fn create_test_config(roots: Vec<String>, dir: &Path) -> Config {
    let path = |name: &str| dir.join(name).to_string_lossy().into_owned();

    Config {
        crawler: CrawlerConfig {
            concurrency: 4,
            ..CrawlerConfig::default()
        },
        http: HttpConfig {
            timeout_secs: 5,
            max_retries: 0,
            retry_base_delay_ms: 1,
            retry_max_delay_ms: 5,
            ..HttpConfig::default()
        },
        proxy: None,
        archive: ArchiveConfig {
            host: "http://www.lyngsat.com".to_string(),
            from: "20100101".to_string(),
            to: Some("20201231".to_string()),
            cdx_endpoint: "http://127.0.0.1:9/cdx/search/cdx".to_string(),
            roots,
            index_cache: None,
        },
        site: SiteProfile::default(),
        output: OutputConfig {
            database_path: path("wayback.db"),
            csv_path: path("channels.csv"),
            summary_path: path("summary.md"),
            json_dir: Some(path("snapshots")),
        },
    }
}

pub const ROOT_PAGE: &str = r#"<html><head><title>LyngSat</title></head><body>
    <a href="/packages/index.html">Packages</a>
    <a href="/free/index.html">Free TV Guide</a>
</body></html>"#;

pub const FREE_INDEX_PAGE: &str = r#"<html><body>
    <b>Free TV: <a href="/free/Asia.html">Asia</a></b>
    <b>Pay TV: <a href="/pay/Asia.html">Asia</a></b>
</body></html>"#;

pub const ASIA_PAGE: &str = r#"<html><body><table>
    <tr>
        <td><a href="/free/Japan.html">Japan</a></td>
        <td><a href="/free/Korea.html">Korea</a></td>
        <td></td><td></td><td></td><td></td>
    </tr>
</table></body></html>"#;

/// NHK-G has a continuation row and a detail page; Japan Wake has neither
pub const JAPAN_PAGE: &str = r#"<html><body><table>
    <tr><td>Logo</td><td>Channel Name</td><td>Position</td><td>Satellite</td><td>Beam</td></tr>
    <tr>
        <td><a href="/logo/nhk.html"><img src="/logo/nhk.gif"></a></td>
        <td><a href="/tvchannels/jp/NHK.html">NHK-G</a></td>
        <td>110.0°E</td><td>BSAT 3A</td><td>Japan</td>
    </tr>
    <tr><td>JCSAT 4B</td><td>Asia</td></tr>
    <tr><td colspan="5">LyngSat Stream</td></tr>
    <tr><td></td><td>Japan Wake</td><td>128.0°E</td><td>JCSAT 3A</td><td>Japan</td></tr>
</table></body></html>"#;

pub const KOREA_PAGE: &str = r#"<html><body><table>
    <tr><td>Logo</td><td>Channel Name</td><td>Position</td><td>Beam</td></tr>
    <tr><td></td><td>KBS 1</td><td>116.0°E</td><td>Korea</td></tr>
</table></body></html>"#;

pub const NHK_DETAIL_PAGE: &str = r#"<html><body><table>
    <tr><td>Position</td><td>Satellite</td><td>Frequency</td></tr>
    <tr><td colspan="3">Colour</td></tr>
    <tr><td>110.0°E</td><td>BSAT 3A</td><td>11727 R</td></tr>
    <tr><td>124.0°E</td><td>JCSAT 4B</td><td>12523 H</td></tr>
    <tr><td>www.lyngsat.com</td><td>Home</td><td>Contact</td></tr>
</table></body></html>"#;
