//! Preview extraction from the public track embed page.
//!
//! Client-credentials tokens often get `preview_url: null` from the Web API,
//! while the embed player page for the same track still carries the clip URL
//! inside its Next.js data block:
//!
//! ```text
//! <script id="__NEXT_DATA__" type="application/json">{"props":{"pageProps":{"state":
//!   {"data":{"entity":{"audioPreview":{"url":"https://p.scdn.co/mp3-preview/..."}}}}}}}</script>
//! ```

use crate::catalog::domain::CatalogError;

const DATA_BLOCK_OPEN: &str = r#"<script id="__NEXT_DATA__" type="application/json">"#;
const DATA_BLOCK_CLOSE: &str = "</script>";

/// JSON pointer to the preview clip inside the data block.
const AUDIO_PREVIEW_POINTER: &str = "/props/pageProps/state/data/entity/audioPreview/url";

/// Extract the preview clip URL from an embed page.
///
/// Returns `Ok(None)` when the page has no data block or the block has no
/// preview, and `Err(Parse)` when the block is not valid JSON.
pub fn extract_preview_url(html: &str) -> Result<Option<String>, CatalogError> {
    let Some(json) = data_block(html) else {
        return Ok(None);
    };

    let data: serde_json::Value =
        serde_json::from_str(json).map_err(|e| CatalogError::Parse(e.to_string()))?;

    Ok(data
        .pointer(AUDIO_PREVIEW_POINTER)
        .and_then(|v| v.as_str())
        .filter(|url| !url.is_empty())
        .map(str::to_string))
}

/// Slice out the contents of the `__NEXT_DATA__` script tag.
fn data_block(html: &str) -> Option<&str> {
    let start = html.find(DATA_BLOCK_OPEN)? + DATA_BLOCK_OPEN.len();
    let len = html[start..].find(DATA_BLOCK_CLOSE)?;
    Some(&html[start..start + len])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(block: &str) -> String {
        format!(
            "<!DOCTYPE html><html><head><script src=\"/app.js\"></script></head><body>\
             <div id=\"__next\"></div>{}{}{}</body></html>",
            DATA_BLOCK_OPEN, block, DATA_BLOCK_CLOSE
        )
    }

    #[test]
    fn test_extracts_nested_preview() {
        let html = page(
            r#"{"props":{"pageProps":{"state":{"data":{"entity":{
                "name":"Get Lucky","audioPreview":{"url":"https://p.scdn.co/mp3-preview/xyz","format":"MP3_96"}
            }}}}}}"#,
        );
        assert_eq!(
            extract_preview_url(&html).unwrap().as_deref(),
            Some("https://p.scdn.co/mp3-preview/xyz")
        );
    }

    #[test]
    fn test_missing_preview_is_none() {
        let html = page(r#"{"props":{"pageProps":{"state":{"data":{"entity":{"name":"x"}}}}}}"#);
        assert_eq!(extract_preview_url(&html).unwrap(), None);
    }

    #[test]
    fn test_page_without_data_block() {
        let html = "<html><body><script>var x = 1;</script></body></html>";
        assert_eq!(extract_preview_url(html).unwrap(), None);
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        let html = page("{not json");
        assert!(matches!(
            extract_preview_url(&html),
            Err(CatalogError::Parse(_))
        ));
    }

    #[test]
    fn test_unterminated_block_is_none() {
        let html = format!("<html>{}{{\"props\":{{}}}}", DATA_BLOCK_OPEN);
        assert_eq!(extract_preview_url(&html).unwrap(), None);
    }
}
